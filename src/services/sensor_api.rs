use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::quantity::Quantity;
use crate::domain::reading::{Reading, sort_by_timestamp};
use crate::domain::report::{DateLimits, OptimalRange};
use crate::services::clock::Clock;
use crate::services::data_source::{SensorSource, SourceError};
use crate::services::report::api_date_limits;
use crate::services::session::{SessionManager, error_message};

/// Window searched when looking for the reading before the latest one.
const PREVIOUS_LOOKBACK_HOURS: i64 = 24;
/// Minimum age gap between the latest reading and the one reported as previous.
const PREVIOUS_MIN_GAP_SECS: i64 = 30;

/// Sensor data served by the warehouse backend.
pub struct SensorApiClient {
    base_url: String,
    client: Client,
    session: SessionManager,
    clock: Arc<dyn Clock>,
}

impl SensorApiClient {
    pub fn new(
        base_url: &str,
        session: SessionManager,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SourceError> {
        if base_url.trim().is_empty() {
            return Err(SourceError::Network(
                "sensor api base_url is not configured".to_string(),
            ));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            session,
            clock,
        })
    }

    /// GETs `path`, refreshing the session and replaying once on 401. A
    /// second rejection ends the session.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.send(&url, params).await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            log::info!("Access token rejected for {path}, refreshing session");
            self.session
                .refresh()
                .await
                .map_err(|e| SourceError::Auth(e.to_string()))?;
            let replayed = self.send(&url, params).await?;
            if replayed.status() == StatusCode::UNAUTHORIZED {
                if let Err(e) = self.session.logout() {
                    log::warn!("Failed to clear rejected session: {e}");
                }
                return Err(SourceError::Auth(
                    "session rejected after token refresh".to_string(),
                ));
            }
            replayed
        } else {
            response
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound);
        }
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(SourceError::Network(
                message.unwrap_or_else(|| format!("{path} returned {status}")),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }

    async fn send(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, SourceError> {
        let mut request = self.client.get(url).query(params);
        if let Some(token) = self.session.access_token() {
            request = request.bearer_auth(token);
        }
        request
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))
    }
}

#[async_trait]
impl SensorSource for SensorApiClient {
    fn kind(&self) -> &'static str {
        "api"
    }

    async fn current(&self, quantity: Quantity) -> Result<f64, SourceError> {
        self.fetch_json(&format!("/sensors/{quantity}/current"), &[])
            .await
    }

    async fn previous(&self, quantity: Quantity) -> Result<Option<f64>, SourceError> {
        let to = self.clock.now();
        let from = to - Duration::hours(PREVIOUS_LOOKBACK_HOURS);
        let readings = self.readings_between(from, to).await?;
        Ok(previous_reading(readings).map(|reading| quantity.value_of(&reading)))
    }

    async fn day_average(&self, quantity: Quantity, date: NaiveDate) -> Result<f64, SourceError> {
        let params = [("date", date.format("%Y-%m-%d").to_string())];
        self.fetch_json(&format!("/sensors/{quantity}/averageByDay"), &params)
            .await
    }

    async fn average_between_days(
        &self,
        quantity: Quantity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, SourceError> {
        let params = [
            ("start", start.format("%Y-%m-%d").to_string()),
            ("end", end.format("%Y-%m-%d").to_string()),
        ];
        self.fetch_json(&format!("/sensors/{quantity}/averageBetweenDays"), &params)
            .await
    }

    async fn readings_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Reading>, SourceError> {
        let params = [
            ("from", from.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("to", to.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ];
        self.fetch_json("/sensors/between", &params).await
    }

    fn optimal_range(&self, quantity: Quantity) -> OptimalRange {
        let (optimal_min, optimal_max) = quantity.api_optimal_range();
        OptimalRange::new(optimal_min, optimal_max)
    }

    fn date_limits(&self, today: NaiveDate) -> DateLimits {
        api_date_limits(today)
    }
}

/// The newest reading at least thirty seconds older than the latest one.
fn previous_reading(mut readings: Vec<Reading>) -> Option<Reading> {
    sort_by_timestamp(&mut readings);
    let latest = readings.last()?.timestamp;
    let target = latest - Duration::seconds(PREVIOUS_MIN_GAP_SECS);
    readings
        .into_iter()
        .rev()
        .find(|reading| reading.timestamp <= target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::FixedClock;
    use crate::services::kv_store::{ACCESS_TOKEN, KeyValueStore, MemoryStore, REFRESH_TOKEN, USER};
    use crate::services::session::AuthApi;
    use crate::test_support::{at_hour, on_date, reading_at};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use warp::Filter;

    fn bearer_is(header: &Option<String>, token: &str) -> bool {
        header.as_deref() == Some(format!("Bearer {token}").as_str())
    }

    /// Serves sensor endpoints that only accept `access-2`, plus a refresh
    /// endpoint that hands it out.
    async fn start_sensor_server(refresh_calls: Arc<AtomicUsize>) -> String {
        let current = warp::path!("sensors" / "temperature" / "current")
            .and(warp::get())
            .and(warp::header::optional::<String>("authorization"))
            .map(|auth: Option<String>| {
                if bearer_is(&auth, "access-2") {
                    warp::reply::with_status(warp::reply::json(&19.4), warp::http::StatusCode::OK)
                } else {
                    warp::reply::with_status(
                        warp::reply::json(&serde_json::json!({"message": "expired"})),
                        warp::http::StatusCode::UNAUTHORIZED,
                    )
                }
            });
        let average = warp::path!("sensors" / "humidity" / "averageByDay")
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .map(|query: HashMap<String, String>| {
                if query.get("date").map(String::as_str) == Some("2025-05-01") {
                    warp::reply::with_status(warp::reply::json(&41.2), warp::http::StatusCode::OK)
                } else {
                    warp::reply::with_status(
                        warp::reply::json(&serde_json::json!({})),
                        warp::http::StatusCode::NOT_FOUND,
                    )
                }
            });
        let between = warp::path!("sensors" / "between")
            .and(warp::get())
            .and(warp::query::<HashMap<String, String>>())
            .map(|query: HashMap<String, String>| {
                if query.get("from").map(String::as_str) != Some("2025-05-01T00:00:00.000Z") {
                    return warp::reply::json(&serde_json::json!([]));
                }
                warp::reply::json(&serde_json::json!([
                    {"id": 2, "timestamp": "2025-05-01T10:30:00Z", "temperature": 19.1, "humidity": 36.0, "sensorId": "1"},
                    {"id": 1, "timestamp": "2025-05-01T10:00:00Z", "temperature": 18.9, "humidity": 36.4, "sensorId": "1"}
                ]))
            });
        let refresh = warp::path!("auth" / "refresh").and(warp::post()).map(move || {
            refresh_calls.fetch_add(1, Ordering::SeqCst);
            warp::reply::json(&serde_json::json!({
                "accessToken": "access-2",
                "refreshToken": "refresh-2"
            }))
        });

        let routes = current.or(average).or(between).or(refresh);
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        format!("http://{addr}")
    }

    fn client(base_url: &str, access_token: &str) -> (Arc<MemoryStore>, SensorApiClient) {
        client_at(base_url, access_token, at_hour(on_date(2025, 5, 1), 12))
    }

    fn client_at(
        base_url: &str,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> (Arc<MemoryStore>, SensorApiClient) {
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN, access_token).unwrap();
        store.set(REFRESH_TOKEN, "refresh-1").unwrap();
        store.set(USER, r#"{"username":"cellar"}"#).unwrap();
        let session = SessionManager::new(store.clone(), AuthApi::new(base_url));
        let api = SensorApiClient::new(base_url, session, Arc::new(FixedClock(now))).unwrap();
        (store, api)
    }

    /// Rejects every sensor request while still handing out fresh tokens.
    async fn start_rejecting_server(refresh_calls: Arc<AtomicUsize>) -> String {
        let current = warp::path!("sensors" / "temperature" / "current")
            .and(warp::get())
            .map(|| {
                warp::reply::with_status(
                    warp::reply::json(&serde_json::json!({"message": "revoked"})),
                    warp::http::StatusCode::UNAUTHORIZED,
                )
            });
        let refresh = warp::path!("auth" / "refresh").and(warp::post()).map(move || {
            refresh_calls.fetch_add(1, Ordering::SeqCst);
            warp::reply::json(&serde_json::json!({
                "accessToken": "access-2",
                "refreshToken": "refresh-2"
            }))
        });

        let (addr, server) = warp::serve(current.or(refresh)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn current_refreshes_and_replays_once_on_401() {
        let refresh_calls = Arc::new(AtomicUsize::new(0));
        let base_url = start_sensor_server(refresh_calls.clone()).await;
        let (store, api) = client(&base_url, "access-1");

        let value = api.current(Quantity::Temperature).await.unwrap();

        assert_eq!(value, 19.4);
        assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get(ACCESS_TOKEN).as_deref(), Some("access-2"));
    }

    #[tokio::test]
    async fn second_401_after_refresh_ends_session() {
        let refresh_calls = Arc::new(AtomicUsize::new(0));
        let base_url = start_rejecting_server(refresh_calls.clone()).await;
        let (store, api) = client(&base_url, "access-1");

        let result = api.current(Quantity::Temperature).await;

        assert!(matches!(result, Err(SourceError::Auth(_))));
        assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get(ACCESS_TOKEN), None);
        assert_eq!(store.get(REFRESH_TOKEN), None);
        assert_eq!(store.get(USER), None);
    }

    #[tokio::test]
    async fn previous_looks_back_a_day_from_clock() {
        let base_url = start_sensor_server(Arc::new(AtomicUsize::new(0))).await;
        // The mock backend only answers for a window starting 2025-05-01T00:00Z.
        let (_, api) = client_at(&base_url, "access-2", at_hour(on_date(2025, 5, 2), 0));

        let previous = api.previous(Quantity::Temperature).await.unwrap();
        assert_eq!(previous, Some(18.9));

        let (_, later) = client_at(&base_url, "access-2", at_hour(on_date(2025, 5, 2), 1));
        assert_eq!(later.previous(Quantity::Temperature).await.unwrap(), None);
    }

    #[tokio::test]
    async fn current_with_valid_token_does_not_refresh() {
        let refresh_calls = Arc::new(AtomicUsize::new(0));
        let base_url = start_sensor_server(refresh_calls.clone()).await;
        let (_, api) = client(&base_url, "access-2");

        assert_eq!(api.current(Quantity::Temperature).await.unwrap(), 19.4);
        assert_eq!(refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn day_average_sends_date_and_maps_not_found() {
        let base_url = start_sensor_server(Arc::new(AtomicUsize::new(0))).await;
        let (_, api) = client(&base_url, "access-2");

        let average = api.day_average(Quantity::Humidity, on_date(2025, 5, 1)).await.unwrap();
        assert_eq!(average, 41.2);

        let missing = api.day_average(Quantity::Humidity, on_date(2025, 5, 2)).await;
        assert!(matches!(missing, Err(SourceError::NotFound)));
    }

    #[tokio::test]
    async fn readings_between_parses_backend_readings() {
        let base_url = start_sensor_server(Arc::new(AtomicUsize::new(0))).await;
        let (_, api) = client(&base_url, "access-2");
        let (from, to) = crate::services::report::day_bounds(on_date(2025, 5, 1), on_date(2025, 5, 1));

        let readings = api.readings_between(from, to).await.unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].id, 2);
        assert_eq!(readings[1].temperature, 18.9);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let (_, api) = client("http://127.0.0.1:9", "access-2");
        let result = api.current(Quantity::Temperature).await;
        assert!(matches!(result, Err(SourceError::Network(_))));
    }

    #[test]
    fn new_rejects_empty_base_url() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = SessionManager::new(store, AuthApi::new(""));
        let clock = Arc::new(FixedClock(at_hour(on_date(2025, 5, 1), 12)));
        assert!(SensorApiClient::new("  ", session, clock).is_err());
    }

    #[test]
    fn previous_reading_skips_readings_within_thirty_seconds() {
        let date = on_date(2025, 5, 1);
        let latest = reading_at(3, date, 10, 19.5, 35.0);
        let mut close = reading_at(2, date, 10, 19.4, 35.0);
        close.timestamp = at_hour(date, 10) - Duration::seconds(10);
        let mut older = reading_at(1, date, 10, 19.0, 35.0);
        older.timestamp = at_hour(date, 10) - Duration::minutes(30);

        let previous = previous_reading(vec![latest, older, close]).unwrap();
        assert_eq!(previous.id, 1);
    }

    #[test]
    fn previous_reading_of_single_reading_is_none() {
        let readings = vec![reading_at(1, on_date(2025, 5, 1), 10, 19.5, 35.0)];
        assert!(previous_reading(readings).is_none());
        assert!(previous_reading(Vec::new()).is_none());
    }
}
