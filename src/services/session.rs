use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::quantity::Quantity;
use crate::domain::session::{AuthResponse, Credentials, RefreshRequest, UserProfile};
use crate::services::data_source::SourceError;
use crate::services::kv_store::{
    ACCESS_TOKEN, KeyValueStore, LOGIN_EXPIRY, REFRESH_TOKEN, StoreError, USER,
};

/// How long a login stays valid without re-entering credentials.
pub const LOGIN_LIFETIME_HOURS: i64 = 24;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("auth response did not contain an access token")]
    MissingToken,
}

/// Client for the backend's `/auth` endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    base_url: String,
    client: Client,
}

impl AuthApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, SourceError> {
        self.post_json("/auth/login", credentials).await
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, SourceError> {
        self.post_json("/auth/register", credentials).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, SourceError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.post_json("/auth/refresh", &body).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse, SourceError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    SourceError::Auth(message.unwrap_or_else(|| "invalid credentials".to_string()))
                }
                _ => SourceError::Network(
                    message.unwrap_or_else(|| format!("{path} returned {status}")),
                ),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(AuthResponse::default());
        }
        serde_json::from_str(&text).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

/// Extracts the backend's `{"message": ...}` error text, if any.
pub(crate) async fn error_message(response: reqwest::Response) -> Option<String> {
    let body = response.json::<Value>().await.ok()?;
    body.get("message")
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}

/// Bearer-token session persisted in the client store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    auth: AuthApi,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>, auth: AuthApi) -> Self {
        Self { store, auth }
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN)
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, SessionError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.auth.login(&credentials).await?;
        let access_token = response.access_token.ok_or(SessionError::MissingToken)?;

        self.store.set(ACCESS_TOKEN, &access_token)?;
        if let Some(refresh_token) = &response.refresh_token {
            self.store.set(REFRESH_TOKEN, refresh_token)?;
        }
        let expiry = now + Duration::hours(LOGIN_LIFETIME_HOURS);
        self.store
            .set(LOGIN_EXPIRY, &expiry.timestamp_millis().to_string())?;

        let user = response.user.unwrap_or(UserProfile {
            username: username.to_string(),
        });
        self.store.set(USER, &serde_json::to_string(&user).map_err(StoreError::from)?)?;
        log::info!("Logged in as {}", user.username);
        Ok(user)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.auth.register(&credentials).await?;
        log::info!("Registered user {username}");
        Ok(())
    }

    /// Exchanges the refresh token for a new token pair. Any failure ends the
    /// session.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let Some(refresh_token) = self.store.get(REFRESH_TOKEN) else {
            self.logout()?;
            return Err(SourceError::Auth("no refresh token stored".to_string()).into());
        };

        let response = match self.auth.refresh(&refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Token refresh failed: {e}");
                self.logout()?;
                return Err(e.into());
            }
        };

        let Some(access_token) = response.access_token else {
            self.logout()?;
            return Err(SessionError::MissingToken);
        };
        self.store.set(ACCESS_TOKEN, &access_token)?;
        if let Some(refresh_token) = response.refresh_token {
            self.store.set(REFRESH_TOKEN, &refresh_token)?;
        }
        log::debug!("Access token refreshed");
        Ok(())
    }

    /// The logged-in user, unless the session is missing or has expired.
    /// Expired sessions are cleared.
    pub fn restore(&self, now: DateTime<Utc>) -> Result<Option<UserProfile>, SessionError> {
        let expired = self
            .store
            .get(LOGIN_EXPIRY)
            .and_then(|value| value.trim().parse::<i64>().ok())
            .is_some_and(|expiry| now.timestamp_millis() > expiry);
        if expired {
            log::info!("Session expired, logging out");
            self.logout()?;
            return Ok(None);
        }

        if self.access_token().is_none() {
            return Ok(None);
        }
        Ok(self
            .store
            .get(USER)
            .and_then(|value| serde_json::from_str::<UserProfile>(&value).ok()))
    }

    /// Clears tokens, profile and threshold settings in one store operation.
    pub fn logout(&self) -> Result<(), StoreError> {
        let mut keys = vec![ACCESS_TOKEN, REFRESH_TOKEN, USER, LOGIN_EXPIRY];
        for quantity in Quantity::ALL {
            let threshold_keys = quantity.threshold_keys();
            keys.extend([threshold_keys.min, threshold_keys.max, threshold_keys.valid_until]);
        }
        self.store.remove_all(&keys)
    }
}
