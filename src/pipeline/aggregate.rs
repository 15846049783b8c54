//! Group-and-sum stages.
//!
//! Grouping goes through a `BTreeMap`, so every `AggregatedSeries` comes out
//! with strictly ascending, unique keys.
//!
//! Null policy: a measure that returns `None` for a record is skipped for that
//! record. A group in which every record is `None` produces no row at all
//! (rather than a zero-valued row), which shows up as a gap in the chart.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{DatasetView, MARKDOWN_COLUMNS, MonthKey, SalesRecord, Trendline};
use crate::math::fit_linear_trend;

/// Ordered `(key, sum)` pairs produced by one grouping pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSeries<K> {
    points: Vec<(K, f64)>,
}

impl<K: Ord> AggregatedSeries<K> {
    /// Build from arbitrary points; duplicate keys are summed.
    pub fn from_points(points: impl IntoIterator<Item = (K, f64)>) -> Self {
        let mut groups = BTreeMap::new();
        for (k, v) in points {
            *groups.entry(k).or_insert(0.0) += v;
        }
        Self {
            points: groups.into_iter().collect(),
        }
    }

    pub fn points(&self) -> &[(K, f64)] {
        &self.points
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.points.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    pub fn get(&self, key: &K) -> Option<f64> {
        self.points
            .binary_search_by(|(k, _)| k.cmp(key))
            .ok()
            .map(|idx| self.points[idx].1)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Group `view` by `key` and sum `measure`, skipping `None` measures.
pub fn sum_by<K, F, M>(view: &DatasetView<'_>, key: F, measure: M) -> AggregatedSeries<K>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
    M: Fn(&SalesRecord) -> Option<f64>,
{
    AggregatedSeries::from_points(view.iter().filter_map(|r| measure(r).map(|v| (key(r), v))))
}

/// Σ Weekly_Sales per calendar month.
pub fn sales_by_month(view: &DatasetView<'_>) -> AggregatedSeries<MonthKey> {
    let series = sum_by(view, SalesRecord::month_key, |r| Some(r.weekly_sales));
    debug!(rows = view.len(), groups = series.len(), "sales by month");
    series
}

/// Σ Weekly_Sales per department.
pub fn sales_by_dept(view: &DatasetView<'_>) -> AggregatedSeries<u32> {
    let series = sum_by(view, |r| r.dept, |r| Some(r.weekly_sales));
    debug!(rows = view.len(), groups = series.len(), "sales by dept");
    series
}

/// Σ MarkDown1..=MarkDown5 per calendar month, one series per column.
pub fn markdowns_by_month(view: &DatasetView<'_>) -> Vec<(String, AggregatedSeries<MonthKey>)> {
    MARKDOWN_COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let series = sum_by(view, SalesRecord::month_key, |r| r.markdown(idx));
            (name.to_string(), series)
        })
        .collect()
}

/// Linear trend over a monthly series, with x = ordinal day of each month's
/// first day. Needs at least two months.
pub fn monthly_trend(series: &AggregatedSeries<MonthKey>) -> Option<Trendline> {
    let mut xs = Vec::with_capacity(series.len());
    let mut ys = Vec::with_capacity(series.len());
    for (key, value) in series.points() {
        let day = key.first_day()?;
        xs.push(f64::from(chrono::Datelike::num_days_from_ce(&day)));
        ys.push(*value);
    }

    let fit = fit_linear_trend(&xs, &ys)?;
    Some(Trendline {
        intercept: fit.intercept,
        slope: fit.slope,
        values: xs.iter().map(|&x| fit.predict(x)).collect(),
    })
}
