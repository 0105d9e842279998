use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped observation from a warehouse sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(default)]
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub sensor_id: String,
}

/// Sorts ascending by timestamp. The sort is stable, so readings sharing a
/// timestamp keep their source order.
pub fn sort_by_timestamp(readings: &mut [Reading]) {
    readings.sort_by_key(|reading| reading.timestamp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(id: u64, hour: u32) -> Reading {
        Reading {
            id,
            timestamp: Utc.with_ymd_and_hms(2025, 5, 1, hour, 0, 0).unwrap(),
            temperature: 19.0,
            humidity: 35.0,
            sensor_id: "1".to_string(),
        }
    }

    #[test]
    fn sort_by_timestamp_keeps_source_order_for_ties() {
        let mut readings = vec![reading(1, 10), reading(2, 8), reading(3, 10), reading(4, 8)];
        sort_by_timestamp(&mut readings);
        let ids: Vec<u64> = readings.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn deserializes_backend_payload() {
        let json = r#"{"id":7,"timestamp":"2025-05-01T10:30:00Z","temperature":19.2,"humidity":36.5,"sensorId":"1"}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.id, 7);
        assert_eq!(reading.sensor_id, "1");
        assert_eq!(reading.timestamp, Utc.with_ymd_and_hms(2025, 5, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn deserializes_payload_without_optional_fields() {
        let json = r#"{"timestamp":"2025-05-01T10:30:00.000+02:00","temperature":19.2,"humidity":36.5}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.id, 0);
        assert_eq!(reading.sensor_id, "");
        assert_eq!(reading.timestamp, Utc.with_ymd_and_hms(2025, 5, 1, 8, 30, 0).unwrap());
    }
}
