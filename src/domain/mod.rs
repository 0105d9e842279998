pub mod quantity;
pub mod reading;
pub mod report;
pub mod session;
pub mod thresholds;
