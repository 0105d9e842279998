use crate::domain::quantity::Quantity;
use crate::domain::report::ReportResult;
use crate::domain::thresholds::Thresholds;
use crate::services::poller::DashboardSnapshot;

pub fn format_report(report: &ReportResult) -> String {
    let quantity = report.quantity;

    let mut lines = Vec::new();
    lines.push(format!("{} Report", quantity.label()));
    lines.push(format!("Data source: {}", report.data_source));
    lines.push(format!(
        "Period: {} - {}",
        report.start_date.format("%Y-%m-%d"),
        report.end_date.format("%Y-%m-%d")
    ));
    lines.push(format!("Readings: {}", report.readings.len()));
    lines.push(format!("Average: {}", quantity.format_value(report.average)));
    lines.push(format!("Minimum: {}", quantity.format_value(report.min_value)));
    lines.push(format!("Maximum: {}", quantity.format_value(report.max_value)));
    lines.push(format!(
        "Optimal range: {} - {}",
        quantity.format_value(report.optimal_min),
        quantity.format_value(report.optimal_max)
    ));

    lines.join("\n")
}

pub fn format_snapshot(snapshot: &DashboardSnapshot) -> String {
    let quantity = snapshot.quantity;
    let change = match (&snapshot.trend, &snapshot.difference) {
        (Some(trend), Some(difference)) => format!(" {} {difference}", trend.arrow()),
        _ => String::new(),
    };
    format!(
        "{label}: {current}{change} [{status}] (thresholds {min} - {max}, at {at})",
        label = quantity.label(),
        current = quantity.format_value(snapshot.current),
        status = snapshot.status.label(),
        min = quantity.format_value(snapshot.thresholds.min),
        max = quantity.format_value(snapshot.thresholds.max),
        at = snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

pub fn format_thresholds(quantity: Quantity, thresholds: &Thresholds) -> String {
    let valid_until = match thresholds.valid_until {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "no expiry".to_string(),
    };
    format!(
        "{}: min {} max {} ({valid_until})",
        quantity.label(),
        quantity.format_value(thresholds.min),
        quantity.format_value(thresholds.max)
    )
}
