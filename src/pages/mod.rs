//! Dashboard pages, their registry, and the dispatcher that runs them.

pub mod dispatch;
pub mod overview;
pub mod registry;
pub mod sales;

pub use dispatch::Navigator;
pub use registry::{Control, Page, PageEntry, PageRegistry};

/// Shown in the header of every page.
pub const APP_NAME: &str = "Dashboard App";

/// The dashboard's pages, in navigation order.
pub fn default_registry() -> Result<PageRegistry, crate::error::AppError> {
    let mut registry = PageRegistry::new();
    registry.register(sales::NAME, sales::RetailSalesPredictions)?;
    registry.register(overview::NAME, overview::StoreDepartmentOverview)?;
    Ok(registry)
}
