use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::quantity::Quantity;
use crate::domain::thresholds::Thresholds;
use crate::services::kv_store::{KeyValueStore, StoreError};
use crate::services::validation::ValidationError;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-quantity acceptable ranges persisted in the client store.
#[derive(Clone)]
pub struct ThresholdSettings {
    store: Arc<dyn KeyValueStore>,
}

impl ThresholdSettings {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored thresholds for `quantity`, or the defaults. Thresholds whose
    /// validity date has been reached are wiped and replaced by the defaults.
    pub fn load(&self, quantity: Quantity, today: NaiveDate) -> Result<Thresholds, StoreError> {
        let keys = quantity.threshold_keys();
        let valid_until = self
            .store
            .get(keys.valid_until)
            .and_then(|value| parse_stored_date(&value));

        if let Some(valid_until) = valid_until {
            if today >= valid_until {
                log::info!("{} thresholds expired on {valid_until}, restoring defaults", quantity.label());
                self.reset(quantity)?;
                return Ok(Thresholds::defaults_for(quantity));
            }
        }

        let defaults = Thresholds::defaults_for(quantity);
        Ok(Thresholds {
            min: self.stored_number(keys.min).unwrap_or(defaults.min),
            max: self.stored_number(keys.max).unwrap_or(defaults.max),
            valid_until,
        })
    }

    pub fn save(
        &self,
        quantity: Quantity,
        thresholds: &Thresholds,
        today: NaiveDate,
    ) -> Result<(), SettingsError> {
        validate_thresholds(quantity, thresholds, today)?;
        let keys = quantity.threshold_keys();
        self.store.set(keys.min, &thresholds.min.to_string())?;
        self.store.set(keys.max, &thresholds.max.to_string())?;
        match thresholds.valid_until {
            Some(date) => self
                .store
                .set(keys.valid_until, &date.format("%Y-%m-%d").to_string())?,
            None => self.store.remove(keys.valid_until)?,
        }
        Ok(())
    }

    pub fn reset(&self, quantity: Quantity) -> Result<(), StoreError> {
        let keys = quantity.threshold_keys();
        self.store.remove_all(&[keys.min, keys.max, keys.valid_until])
    }

    // A stored zero or garbage falls back to the default.
    fn stored_number(&self, key: &str) -> Option<f64> {
        self.store
            .get(key)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| *value != 0.0 && value.is_finite())
    }
}

pub fn validate_thresholds(
    quantity: Quantity,
    thresholds: &Thresholds,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    let (lower, upper) = quantity.threshold_bounds();
    for (field, value) in [("minimum", thresholds.min), ("maximum", thresholds.max)] {
        if !(lower..=upper).contains(&value) {
            return Err(ValidationError::ThresholdOutOfBounds {
                field,
                value,
                lower,
                upper,
            });
        }
    }
    if thresholds.min >= thresholds.max {
        return Err(ValidationError::InvertedThresholds {
            min: thresholds.min,
            max: thresholds.max,
        });
    }
    if let Some(valid_until) = thresholds.valid_until {
        if valid_until <= today {
            return Err(ValidationError::ValidityDateNotInFuture(valid_until));
        }
    }
    Ok(())
}

// Accepts plain dates as well as full timestamps.
fn parse_stored_date(value: &str) -> Option<NaiveDate> {
    let date = value.split_once('T').map_or(value, |(date, _)| date);
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}
