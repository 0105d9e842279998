use std::io::{self, Write};

use crate::domain::report::ReportResult;

pub fn csv_header(report: &ReportResult) -> String {
    format!(
        "Date,Time,{} ({})",
        report.quantity.label(),
        report.quantity.unit()
    )
}

/// Writes one row per report reading. Fields are dates, times and numbers,
/// so no quoting is applied.
pub fn write_report_csv<W: Write>(writer: &mut W, report: &ReportResult) -> io::Result<()> {
    let mut lines = Vec::with_capacity(report.readings.len() + 1);
    lines.push(csv_header(report));
    lines.extend(
        report
            .readings
            .iter()
            .map(|reading| format!("{},{},{}", reading.date, reading.time, reading.value)),
    );
    writer.write_all(lines.join("\n").as_bytes())
}

/// `temperature_report_2025-05-01_2025-05-07.csv`
pub fn report_file_name(report: &ReportResult) -> String {
    format!(
        "{}_report_{}_{}.csv",
        report.quantity.as_str(),
        report.start_date.format("%Y-%m-%d"),
        report.end_date.format("%Y-%m-%d")
    )
}
