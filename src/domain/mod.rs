//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the loaded dataset (`SalesRecord`, `Dataset`, `DatasetView`)
//! - filter selections (`StoreSelection`, `YearChoice`, `FilterSelection`)
//! - render outputs (`ChartSpec`, `PageView`)

pub mod chart;
pub mod types;

pub use chart::*;
pub use types::*;
