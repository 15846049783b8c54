//! `retail-dash` library crate.
//!
//! The binary (`dash`) is a thin wrapper around this library so that:
//!
//! - pages, filters and aggregations are testable without a terminal
//! - the CLI and the TUI share one session/render path

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod pages;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod tui;
