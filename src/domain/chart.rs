//! Render-only chart and page descriptions.
//!
//! Pages produce these; the TUI widget and the ASCII renderer consume them.
//! Nothing here knows how to draw.

use std::collections::BTreeSet;
use std::fmt::Display;

use serde::Serialize;

use crate::pipeline::aggregate::AggregatedSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// One named series aligned to `ChartSpec::categories`.
///
/// `None` marks a category where the series has no aggregated row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    /// Maximal runs of consecutive present values as `(category index, value)`.
    ///
    /// Line renderers draw one polyline per run so a missing category shows
    /// as a break in the line.
    pub fn runs(&self) -> Vec<Vec<(usize, f64)>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for (idx, value) in self.values.iter().enumerate() {
            match value {
                Some(v) => current.push((idx, *v)),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

/// Ordinary least squares trendline evaluated at each category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trendline {
    pub intercept: f64,
    pub slope: f64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    /// X-axis category labels, ascending by their grouping key.
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub trend: Option<Trendline>,
}

impl ChartSpec {
    /// Build a chart from one or more aggregated series sharing a key type.
    ///
    /// Categories are the sorted union of all series keys.
    pub fn from_series<K>(
        title: impl Into<String>,
        kind: ChartKind,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        named: &[(String, AggregatedSeries<K>)],
    ) -> Self
    where
        K: Ord + Clone + Display,
    {
        let keys: BTreeSet<K> = named
            .iter()
            .flat_map(|(_, s)| s.keys().cloned())
            .collect();
        let keys: Vec<K> = keys.into_iter().collect();

        let series = named
            .iter()
            .map(|(name, s)| Series {
                name: name.clone(),
                values: keys.iter().map(|k| s.get(k)).collect(),
            })
            .collect();

        Self {
            title: title.into(),
            kind,
            x_label: x_label.into(),
            y_label: y_label.into(),
            categories: keys.iter().map(ToString::to_string).collect(),
            series,
            trend: None,
        }
    }

    pub fn with_trend(mut self, trend: Option<Trendline>) -> Self {
        self.trend = trend;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Min/max over every plotted value (bars always include the zero baseline).
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        let values = self
            .series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .chain(self.trend.iter().flat_map(|t| t.values.iter().copied()));
        for v in values {
            min_y = min_y.min(v);
            max_y = max_y.max(v);
        }

        if !(min_y.is_finite() && max_y.is_finite()) {
            return None;
        }
        if self.kind == ChartKind::Bar {
            min_y = min_y.min(0.0);
            max_y = max_y.max(0.0);
        }
        Some((min_y, max_y))
    }
}

/// Output of one page render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub title: String,
    pub lines: Vec<String>,
    pub charts: Vec<ChartSpec>,
    /// Number of records left after filtering.
    pub rows_in_view: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_union_of_keys_with_gaps_as_none() {
        let a = AggregatedSeries::from_points(vec![(1u32, 10.0), (3, 30.0)]);
        let b = AggregatedSeries::from_points(vec![(2u32, 5.0)]);
        let chart = ChartSpec::from_series(
            "t",
            ChartKind::Line,
            "x",
            "y",
            &[("a".to_string(), a), ("b".to_string(), b)],
        );
        assert_eq!(chart.categories, vec!["1", "2", "3"]);
        assert_eq!(chart.series[0].values, vec![Some(10.0), None, Some(30.0)]);
        assert_eq!(chart.series[1].values, vec![None, Some(5.0), None]);
    }

    #[test]
    fn runs_split_at_missing_categories() {
        let s = Series {
            name: "s".to_string(),
            values: vec![None, Some(1.0), Some(2.0), None, None, Some(3.0)],
        };
        assert_eq!(s.runs(), vec![vec![(1, 1.0), (2, 2.0)], vec![(5, 3.0)]]);

        let empty = Series {
            name: "e".to_string(),
            values: vec![None, None],
        };
        assert!(empty.runs().is_empty());
    }

    #[test]
    fn bar_range_includes_zero_baseline() {
        let s = AggregatedSeries::from_points(vec![(1u32, 10.0), (2, 20.0)]);
        let chart = ChartSpec::from_series("t", ChartKind::Bar, "x", "y", &[("s".to_string(), s)]);
        assert_eq!(chart.value_range(), Some((0.0, 20.0)));
    }

    #[test]
    fn empty_chart_has_no_range() {
        let chart = ChartSpec::from_series::<u32>("t", ChartKind::Line, "x", "y", &[]);
        assert!(chart.is_empty());
        assert_eq!(chart.value_range(), None);
    }
}
