//! Formatted terminal output for the headless subcommands.

use crate::domain::{ChartSpec, DatasetStats, PageView};
use crate::io::ingest::LoadedData;
use crate::plot::render_ascii_chart;

/// Page title, description lines, then each chart as plot + table.
pub fn format_page(app_name: &str, page_name: &str, view: &PageView, width: usize, height: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {app_name} / {page_name} ===\n"));
    out.push_str(&format!("{}\n", view.title));
    for line in &view.lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!("rows in view: {}\n", view.rows_in_view));

    for chart in &view.charts {
        out.push('\n');
        out.push_str(&render_ascii_chart(chart, width, height));
        out.push_str(&format_series_table(chart));
    }

    out
}

/// Category/value table, one column per series (plus the trendline if any).
pub fn format_series_table(chart: &ChartSpec) -> String {
    if chart.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let key_width = chart
        .categories
        .iter()
        .map(String::len)
        .chain(std::iter::once(chart.x_label.len()))
        .max()
        .unwrap_or(0);

    out.push_str(&format!("{:<key_width$}", chart.x_label));
    for s in &chart.series {
        out.push_str(&format!(" {:>16}", s.name));
    }
    if chart.trend.is_some() {
        out.push_str(&format!(" {:>16}", "Trendline"));
    }
    out.push('\n');

    for (i, key) in chart.categories.iter().enumerate() {
        out.push_str(&format!("{key:<key_width$}"));
        for s in &chart.series {
            match s.values.get(i).copied().flatten() {
                Some(v) => out.push_str(&format!(" {v:>16.2}")),
                None => out.push_str(&format!(" {:>16}", "-")),
            }
        }
        if let Some(v) = chart.trend.as_ref().and_then(|t| t.values.get(i)) {
            out.push_str(&format!(" {v:>16.2}"));
        }
        out.push('\n');
    }

    if let Some(trend) = &chart.trend {
        out.push_str(&format!(
            "trend: y = {:.4} + {:.6} * day_ordinal\n",
            trend.intercept, trend.slope
        ));
    }

    out
}

/// Dataset summary for `dash summary`.
pub fn format_summary(source: &str, loaded: &LoadedData) -> String {
    let stats: DatasetStats = loaded.dataset.stats();
    let mut out = String::new();

    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Rows: read={} used={} rejected={}\n",
        loaded.rows_read,
        loaded.rows_used(),
        loaded.row_errors.len()
    ));
    out.push_str(&format!("Stores: {} | Departments: {}\n", stats.n_stores, stats.n_depts));
    out.push_str(&format!(
        "Dates: {} .. {}\n",
        stats.date_min.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
        stats.date_max.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
    ));
    let years: Vec<String> = loaded.dataset.years().iter().map(ToString::to_string).collect();
    out.push_str(&format!("Years: {}\n", years.join(", ")));

    if !loaded.row_errors.is_empty() {
        out.push_str("\nFirst rejected rows:\n");
        for e in loaded.row_errors.iter().take(10) {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartKind, Dataset};
    use crate::io::ingest::RowError;
    use crate::pipeline::aggregate::AggregatedSeries;

    #[test]
    fn series_table_marks_gaps() {
        let a = AggregatedSeries::from_points(vec![(1u32, 1.5), (2, 2.0)]);
        let b = AggregatedSeries::from_points(vec![(2u32, 4.0)]);
        let chart = ChartSpec::from_series(
            "t",
            ChartKind::Line,
            "k",
            "v",
            &[("A".to_string(), a), ("B".to_string(), b)],
        );
        let table = format_series_table(&chart);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with('1'));
        assert!(lines[1].trim_end().ends_with('-'));
        assert!(lines[2].contains("4.00"));
    }

    #[test]
    fn summary_reports_rejected_rows() {
        let loaded = LoadedData {
            dataset: Dataset::default(),
            row_errors: vec![RowError {
                line: 3,
                message: "Invalid Store 'x'".to_string(),
            }],
            rows_read: 1,
        };
        let txt = format_summary("test.csv", &loaded);
        assert!(txt.contains("Rows: read=1 used=0 rejected=1"));
        assert!(txt.contains("line 3: Invalid Store 'x'"));
    }
}
