use chrono::{NaiveDate, NaiveTime, Utc};

use crate::domain::reading::Reading;

pub fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn at_hour(date: NaiveDate, hour: u32) -> chrono::DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap()).and_utc()
}

pub fn reading_at(id: u64, date: NaiveDate, hour: u32, temperature: f64, humidity: f64) -> Reading {
    Reading {
        id,
        timestamp: at_hour(date, hour),
        temperature,
        humidity,
        sensor_id: "1".to_string(),
    }
}
