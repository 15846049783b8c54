//! Shared domain types.
//!
//! The dataset is loaded once and never mutated afterwards. Everything derived
//! from a record (its year, its year-month bucket) is computed on demand so the
//! source `date` field always keeps its original meaning.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;

use crate::error::AppError;

/// Display names of the five promotional markdown measures, in column order.
pub const MARKDOWN_COLUMNS: [&str; 5] = ["MarkDown1", "MarkDown2", "MarkDown3", "MarkDown4", "MarkDown5"];

/// Upper bound of the store control (the control ranges over `0..=44`).
pub const STORE_CONTROL_MAX: u32 = 44;

/// Label of the "no year filter" choice.
pub const ALL_YEARS_LABEL: &str = "All Years";

/// One row of the cleaned sales dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub store: u32,
    pub dept: u32,
    pub date: NaiveDate,
    pub weekly_sales: f64,
    /// `MarkDown1..=MarkDown5`; `None` when the cell was empty.
    pub markdowns: [Option<f64>; 5],
}

impl SalesRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }

    /// Markdown measure by zero-based column index.
    pub fn markdown(&self, idx: usize) -> Option<f64> {
        self.markdowns.get(idx).copied().flatten()
    }
}

/// Calendar month bucket (`%Y-%m`), ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The in-memory dataset plus a few facts computed once at load time.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<SalesRecord>,
    years: Vec<i32>,
}

impl Dataset {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        let years: BTreeSet<i32> = records.iter().map(SalesRecord::year).collect();
        Self {
            records,
            years: years.into_iter().collect(),
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Distinct years present in the data, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow every record as an (unfiltered) view.
    pub fn view(&self) -> DatasetView<'_> {
        DatasetView {
            rows: self.records.iter().collect(),
        }
    }

    pub fn stats(&self) -> DatasetStats {
        let stores: BTreeSet<u32> = self.records.iter().map(|r| r.store).collect();
        let depts: BTreeSet<u32> = self.records.iter().map(|r| r.dept).collect();
        DatasetStats {
            n_rows: self.records.len(),
            n_stores: stores.len(),
            n_depts: depts.len(),
            date_min: self.records.iter().map(|r| r.date).min(),
            date_max: self.records.iter().map(|r| r.date).max(),
        }
    }
}

/// Summary stats shown in the header and by `dash summary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub n_stores: usize,
    pub n_depts: usize,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
}

/// A read-only, possibly filtered, borrow of a `Dataset`.
#[derive(Debug, Clone, Default)]
pub struct DatasetView<'a> {
    pub rows: Vec<&'a SalesRecord>,
}

impl<'a> DatasetView<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How the store control is compared against `SalesRecord::store`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StoreMatch {
    /// Keep stores strictly greater than the selected value.
    #[default]
    Above,
    /// Keep only the selected store.
    Exact,
}

impl StoreMatch {
    pub fn toggle(self) -> Self {
        match self {
            StoreMatch::Above => StoreMatch::Exact,
            StoreMatch::Exact => StoreMatch::Above,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StoreMatch::Above => "store >",
            StoreMatch::Exact => "store =",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreSelection {
    pub value: u32,
    pub mode: StoreMatch,
}

impl StoreSelection {
    pub fn above(value: u32) -> Self {
        Self {
            value,
            mode: StoreMatch::Above,
        }
    }

    pub fn exact(value: u32) -> Self {
        Self {
            value,
            mode: StoreMatch::Exact,
        }
    }

    pub fn matches(&self, store: u32) -> bool {
        match self.mode {
            StoreMatch::Above => store > self.value,
            StoreMatch::Exact => store == self.value,
        }
    }
}

/// Year control value: the `All Years` sentinel or one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearChoice {
    #[default]
    AllYears,
    Year(i32),
}

impl YearChoice {
    pub fn matches(&self, year: i32) -> bool {
        match self {
            YearChoice::AllYears => true,
            YearChoice::Year(y) => *y == year,
        }
    }
}

impl fmt::Display for YearChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearChoice::AllYears => f.write_str(ALL_YEARS_LABEL),
            YearChoice::Year(y) => write!(f, "{y}"),
        }
    }
}

impl FromStr for YearChoice {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(ALL_YEARS_LABEL) || s.eq_ignore_ascii_case("all") {
            return Ok(YearChoice::AllYears);
        }
        s.parse::<i32>()
            .map(YearChoice::Year)
            .map_err(|_| AppError::config(format!("Invalid year '{s}'. Expected a year like 2011 or 'All Years'.")))
    }
}

/// Year control options: the sentinel first, then every year in the data.
pub fn year_options(dataset: &Dataset) -> Vec<YearChoice> {
    std::iter::once(YearChoice::AllYears)
        .chain(dataset.years().iter().map(|&y| YearChoice::Year(y)))
        .collect()
}

/// Everything the sidebar controls produce for one render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub store: StoreSelection,
    pub year: YearChoice,
}
