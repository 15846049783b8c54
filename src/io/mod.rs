//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - page exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
