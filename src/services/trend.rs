use serde::Serialize;

/// Where a value sits relative to the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeStatus {
    Low,
    Optimal,
    High,
}

impl RangeStatus {
    pub fn classify(current: f64, min: f64, max: f64) -> Self {
        if current < min {
            RangeStatus::Low
        } else if current > max {
            RangeStatus::High
        } else {
            RangeStatus::Optimal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RangeStatus::Low => "low",
            RangeStatus::Optimal => "optimal",
            RangeStatus::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
    Unchanged,
}

impl Trend {
    pub fn between(current: f64, previous: f64) -> Self {
        let difference = current - previous;
        if difference > 0.0 {
            Trend::Increase
        } else if difference < 0.0 {
            Trend::Decrease
        } else {
            Trend::Unchanged
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Increase => "↑",
            Trend::Decrease => "↓",
            Trend::Unchanged => "→",
        }
    }
}

/// `current - previous` to one decimal, with a leading `+` when positive.
pub fn format_difference(current: f64, previous: f64) -> String {
    let difference = current - previous;
    // Avoid "-0.0" for differences that round to zero.
    let rounded = (difference * 10.0).round() / 10.0;
    if rounded > 0.0 {
        format!("+{rounded:.1}")
    } else if rounded < 0.0 {
        format!("{rounded:.1}")
    } else {
        "0.0".to_string()
    }
}
