//! "Store Department Overview": department totals, a monthly sales trend and
//! the markdown measures, for the selected stores and year.

use crate::domain::{ChartKind, ChartSpec, Dataset, FilterSelection, PageView};
use crate::pages::registry::{Control, Page};
use crate::pipeline::aggregate::{markdowns_by_month, monthly_trend, sales_by_dept, sales_by_month};
use crate::pipeline::filter;

pub const NAME: &str = "Store Department Overview";

pub struct StoreDepartmentOverview;

impl Page for StoreDepartmentOverview {
    fn controls(&self) -> &'static [Control] {
        &[Control::Store, Control::Year]
    }

    fn render(&self, dataset: &Dataset, selection: &FilterSelection) -> PageView {
        let view = filter::apply(dataset, selection);

        let by_dept = ChartSpec::from_series(
            "Weekly Sales by Department",
            ChartKind::Bar,
            "Dept",
            "Weekly_Sales",
            &[("Weekly_Sales".to_string(), sales_by_dept(&view))],
        );

        let monthly = sales_by_month(&view);
        let trend = monthly_trend(&monthly);
        let forecast = ChartSpec::from_series(
            "Sales Forecast",
            ChartKind::Line,
            "Date",
            "Sales",
            &[("Weekly Sales".to_string(), monthly)],
        )
        .with_trend(trend);

        let markdowns = ChartSpec::from_series(
            "Markdown Values Over Time",
            ChartKind::Line,
            "Month",
            "Markdown Value",
            &markdowns_by_month(&view),
        );

        PageView {
            title: "Store Performance".to_string(),
            lines: vec![format!(
                "{} {} | year: {}",
                selection.store.mode.display_name(),
                selection.store.value,
                selection.year
            )],
            charts: vec![by_dept, forecast, markdowns],
            rows_in_view: view.len(),
        }
    }
}
