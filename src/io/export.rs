//! Export rendered page data.
//!
//! - CSV: one row per `(chart, series, category)`, easy to load in a spreadsheet
//! - JSON: the full `PageView`, charts and all

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::PageView;
use crate::error::AppError;

/// Write every series (and trendline) of `view` as long-format CSV.
pub fn write_series_csv(path: &Path, view: &PageView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series_csv_to(file, view)
}

pub fn write_series_csv_to<W: Write>(writer: W, view: &PageView) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(writer);
    let err = |e: csv::Error| AppError::export(format!("Failed to write export CSV row: {e}"));

    w.write_record(["chart", "series", "key", "value"]).map_err(err)?;
    for chart in &view.charts {
        for series in &chart.series {
            for (key, value) in chart.categories.iter().zip(&series.values) {
                let Some(v) = value else { continue };
                let v = format!("{v:.4}");
                w.write_record([chart.title.as_str(), series.name.as_str(), key.as_str(), v.as_str()])
                    .map_err(err)?;
            }
        }
        if let Some(trend) = &chart.trend {
            for (key, v) in chart.categories.iter().zip(&trend.values) {
                let v = format!("{v:.4}");
                w.write_record([chart.title.as_str(), "Trendline", key.as_str(), v.as_str()])
                    .map_err(err)?;
            }
        }
    }

    w.flush()
        .map_err(|e| AppError::export(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write `view` as pretty JSON.
pub fn write_page_json(path: &Path, view: &PageView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, view)
        .map_err(|e| AppError::export(format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartKind, ChartSpec, Trendline};
    use crate::pipeline::aggregate::AggregatedSeries;

    fn view() -> PageView {
        let a = AggregatedSeries::from_points(vec![(1u32, 1.0), (2, 3.0)]);
        let b = AggregatedSeries::from_points(vec![(2u32, 5.0)]);
        let chart = ChartSpec::from_series(
            "Chart",
            ChartKind::Line,
            "k",
            "v",
            &[("A".to_string(), a), ("B".to_string(), b)],
        )
        .with_trend(Some(Trendline {
            intercept: 0.0,
            slope: 1.0,
            values: vec![1.0, 2.0],
        }));
        PageView {
            title: "Page".to_string(),
            lines: vec![],
            charts: vec![chart],
            rows_in_view: 3,
        }
    }

    #[test]
    fn csv_skips_gaps_and_includes_trend() {
        let mut buf = Vec::new();
        write_series_csv_to(&mut buf, &view()).unwrap();
        let txt = String::from_utf8(buf).unwrap();
        let expected = concat!(
            "chart,series,key,value\n",
            "Chart,A,1,1.0000\n",
            "Chart,A,2,3.0000\n",
            "Chart,B,2,5.0000\n",
            "Chart,Trendline,1,1.0000\n",
            "Chart,Trendline,2,2.0000\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn json_contains_chart_kind_and_gaps() {
        let json = serde_json::to_value(view()).unwrap();
        assert_eq!(json["charts"][0]["kind"], "line");
        assert!(json["charts"][0]["series"][1]["values"][0].is_null());
    }
}
