//! Filter → aggregate stages shared by every page.

pub mod aggregate;
pub mod filter;

pub use aggregate::{AggregatedSeries, sum_by};
pub use filter::{apply, filter_by_store, filter_by_year};
