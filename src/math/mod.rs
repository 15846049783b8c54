//! Mathematical utilities: least squares and linear trends.

pub mod ols;

pub use ols::*;
