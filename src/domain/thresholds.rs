use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::quantity::Quantity;

/// User-configured acceptable range for one quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub min: f64,
    pub max: f64,
    pub valid_until: Option<NaiveDate>,
}

impl Thresholds {
    pub fn defaults_for(quantity: Quantity) -> Self {
        let (min, max) = quantity.default_thresholds();
        Self {
            min,
            max,
            valid_until: None,
        }
    }
}
