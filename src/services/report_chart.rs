use plotters::prelude::*;
use thiserror::Error;

use crate::domain::report::ReportResult;

#[derive(Error, Debug)]
pub enum ReportChartError {
    #[error("report has no readings to plot")]
    EmptyReport,
    #[error("failed to render report chart: {0}")]
    Plot(String),
}

pub async fn write_report_chart_png(
    output_path: &str,
    report: &ReportResult,
) -> Result<(), ReportChartError> {
    if report.readings.is_empty() {
        return Err(ReportChartError::EmptyReport);
    }
    let output_path = output_path.to_string();
    let report = report.clone();
    tokio::task::spawn_blocking(move || render_chart_png(&output_path, &report))
        .await
        .map_err(|e| ReportChartError::Plot(e.to_string()))??;
    Ok(())
}

fn render_chart_png(output_path: &str, report: &ReportResult) -> Result<(), ReportChartError> {
    let values: Vec<f64> = report.readings.iter().map(|item| item.value).collect();
    let lowest = values
        .iter()
        .copied()
        .fold(report.optimal_min, f64::min);
    let highest = values
        .iter()
        .copied()
        .fold(report.optimal_max, f64::max);
    let padding = ((highest - lowest) * 0.1).max(0.5);
    let max_x = report.readings.len().max(2) as i32 - 1;

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ReportChartError::Plot(e.to_string()))?;

    let caption = format!(
        "{} {} - {}",
        report.quantity.label(),
        report.start_date.format("%Y-%m-%d"),
        report.end_date.format("%Y-%m-%d")
    );
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(caption, ("sans-serif", 30))
        .x_label_area_size(55)
        .y_label_area_size(65)
        .build_cartesian_2d(0..max_x, (lowest - padding)..(highest + padding))
        .map_err(|e| ReportChartError::Plot(e.to_string()))?;

    let readings = &report.readings;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Date")
        .y_desc(format!("{} ({})", report.quantity.label(), report.quantity.unit()))
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 22))
        .x_labels(readings.len().clamp(1, 8))
        .x_label_formatter(&|index| {
            if *index < 0 {
                return String::new();
            }
            readings
                .get(*index as usize)
                .map(|item| item.date.clone())
                .unwrap_or_default()
        })
        .draw()
        .map_err(|e| ReportChartError::Plot(e.to_string()))?;

    let line_color = RGBColor(30, 122, 204);
    chart
        .draw_series(LineSeries::new(
            values.iter().enumerate().map(|(idx, value)| (idx as i32, *value)),
            line_color.stroke_width(2),
        ))
        .map_err(|e| ReportChartError::Plot(e.to_string()))?
        .label(report.quantity.label())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color));

    let limit_color = RGBColor(211, 47, 47);
    for (label, limit) in [("Optimal min", report.optimal_min), ("Optimal max", report.optimal_max)] {
        chart
            .draw_series(LineSeries::new(
                vec![(0, limit), (max_x, limit)],
                limit_color.stroke_width(1),
            ))
            .map_err(|e| ReportChartError::Plot(e.to_string()))?
            .label(format!("{label} ({limit})"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], limit_color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| ReportChartError::Plot(e.to_string()))?;

    root.present()
        .map_err(|e| ReportChartError::Plot(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quantity::Quantity;
    use crate::domain::report::OptimalRange;
    use crate::services::report::build_report;
    use crate::test_support::{on_date, reading_at};
    use predicates::prelude::*;

    #[tokio::test]
    async fn write_report_chart_png_writes_file() {
        let readings: Vec<_> = (0..24)
            .map(|hour| reading_at(hour as u64 + 1, on_date(2025, 5, 1), hour, 18.0 + hour as f64 * 0.1, 35.0))
            .collect();
        let report = build_report(
            &readings,
            Quantity::Temperature,
            on_date(2025, 5, 1),
            on_date(2025, 5, 1),
            OptimalRange::new(16.0, 22.0),
            "mock",
        )
        .unwrap();
        let output_file = assert_fs::NamedTempFile::new("report.png").unwrap();

        write_report_chart_png(output_file.path().to_str().unwrap(), &report)
            .await
            .unwrap();

        assert!(predicate::path::exists().eval(output_file.path()));
        assert!(std::fs::metadata(output_file.path()).unwrap().len() > 0);
    }
}
