//! "Retail Sales Predictions": monthly sales for the selected stores.

use crate::domain::{ChartKind, ChartSpec, Dataset, FilterSelection, PageView};
use crate::pages::registry::{Control, Page};
use crate::pipeline::aggregate::sales_by_month;
use crate::pipeline::filter::filter_by_store;

pub const NAME: &str = "Retail Sales Predictions";

pub struct RetailSalesPredictions;

impl Page for RetailSalesPredictions {
    fn controls(&self) -> &'static [Control] {
        &[Control::Store]
    }

    // Only the store control applies here; the year choice is ignored.
    fn render(&self, dataset: &Dataset, selection: &FilterSelection) -> PageView {
        let view = filter_by_store(dataset.view(), &selection.store);
        let monthly = sales_by_month(&view);

        let chart = ChartSpec::from_series(
            "Sales by Month",
            ChartKind::Line,
            "Date",
            "Weekly_Sales",
            &[("Weekly_Sales".to_string(), monthly)],
        );

        PageView {
            title: "Dashboard".to_string(),
            lines: vec![
                "This is the dashboard page".to_string(),
                format!(
                    "Monthly total of weekly sales, {} {}.",
                    selection.store.mode.display_name(),
                    selection.store.value
                ),
            ],
            charts: vec![chart],
            rows_in_view: view.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SalesRecord, StoreSelection, YearChoice};
    use chrono::NaiveDate;

    fn record(store: u32, ymd: (i32, u32, u32), sales: f64) -> SalesRecord {
        SalesRecord {
            store,
            dept: 1,
            date: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
            weekly_sales: sales,
            markdowns: [None; 5],
        }
    }

    #[test]
    fn sums_sales_per_month_above_threshold() {
        let ds = Dataset::new(vec![
            record(1, (2010, 2, 5), 100.0),
            record(2, (2010, 2, 12), 10.0),
            record(3, (2010, 2, 19), 20.0),
            record(3, (2011, 3, 4), 5.0),
        ]);
        let sel = FilterSelection {
            store: StoreSelection::above(1),
            // Ignored on this page.
            year: YearChoice::Year(2010),
        };

        let view = RetailSalesPredictions.render(&ds, &sel);
        assert_eq!(view.rows_in_view, 3);
        let chart = &view.charts[0];
        assert_eq!(chart.kind, ChartKind::Line);
        assert_eq!(chart.categories, vec!["2010-02", "2011-03"]);
        assert_eq!(chart.series[0].values, vec![Some(30.0), Some(5.0)]);
    }

    #[test]
    fn empty_selection_renders_empty_chart() {
        let ds = Dataset::new(vec![record(1, (2010, 2, 5), 100.0)]);
        let sel = FilterSelection {
            store: StoreSelection::above(44),
            year: YearChoice::AllYears,
        };
        let view = RetailSalesPredictions.render(&ds, &sel);
        assert_eq!(view.rows_in_view, 0);
        assert!(view.charts[0].is_empty());
    }
}
