//! Store/year filters.
//!
//! Each filter narrows a `DatasetView` by one independent predicate, so the
//! order in which they are applied does not change the result. An empty
//! output is a normal outcome, not an error.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{Dataset, DatasetView, FilterSelection, SalesRecord, StoreSelection, YearChoice};

/// Keep records whose store satisfies the selection (`>` or `==`).
pub fn filter_by_store<'a>(view: DatasetView<'a>, selection: &StoreSelection) -> DatasetView<'a> {
    retain(view, |r| selection.matches(r.store))
}

/// Keep records from `year`; `AllYears` passes everything through.
pub fn filter_by_year(view: DatasetView<'_>, year: YearChoice) -> DatasetView<'_> {
    match year {
        YearChoice::AllYears => view,
        YearChoice::Year(_) => retain(view, |r| year.matches(r.year())),
    }
}

/// Apply both filters (logical AND).
pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> DatasetView<'a> {
    let view = filter_by_store(dataset.view(), &selection.store);
    let view = filter_by_year(view, selection.year);
    debug!(
        rows_in = dataset.len(),
        rows_out = view.len(),
        store = selection.store.value,
        mode = ?selection.store.mode,
        year = %selection.year,
        "filter applied"
    );
    view
}

fn retain<'a, P>(view: DatasetView<'a>, pred: P) -> DatasetView<'a>
where
    P: Fn(&SalesRecord) -> bool + Sync,
{
    // Parallel collect into a Vec keeps the input order.
    let rows = view.rows.into_par_iter().filter(|r| pred(*r)).collect();
    DatasetView { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StoreMatch, STORE_CONTROL_MAX};
    use chrono::NaiveDate;

    fn record(store: u32, year: i32, month: u32) -> SalesRecord {
        SalesRecord {
            store,
            dept: 1,
            date: NaiveDate::from_ymd_opt(year, month, 5).unwrap(),
            weekly_sales: 100.0,
            markdowns: [None; 5],
        }
    }

    fn three_store_dataset() -> Dataset {
        Dataset::new(vec![
            record(1, 2010, 2),
            record(2, 2010, 3),
            record(3, 2010, 4),
            record(1, 2011, 2),
            record(2, 2011, 3),
            record(3, 2011, 4),
        ])
    }

    #[test]
    fn store_threshold_is_strictly_greater_than() {
        let ds = three_store_dataset();
        let out = filter_by_store(ds.view(), &StoreSelection::above(2));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.store == 3));
    }

    #[test]
    fn store_exact_match_selects_one_store() {
        let ds = three_store_dataset();
        let out = filter_by_store(ds.view(), &StoreSelection::exact(2));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.store == 2));
    }

    #[test]
    fn every_threshold_keeps_only_larger_stores() {
        let ds = Dataset::new((1..=45).map(|s| record(s, 2010, 2)).collect());
        for t in 0..=STORE_CONTROL_MAX {
            let out = filter_by_store(ds.view(), &StoreSelection::above(t));
            assert!(out.iter().all(|r| r.store > t));
            assert_eq!(out.len(), (45 - t) as usize);
        }
    }

    #[test]
    fn threshold_at_max_store_is_empty_not_error() {
        let ds = Dataset::new((1..=44).map(|s| record(s, 2010, 2)).collect());
        let out = filter_by_store(ds.view(), &StoreSelection::above(STORE_CONTROL_MAX));
        assert!(out.is_empty());
    }

    #[test]
    fn all_years_is_identity() {
        let ds = three_store_dataset();
        let out = filter_by_year(ds.view(), YearChoice::AllYears);
        assert_eq!(out.len(), ds.len());
        for (a, b) in out.iter().zip(ds.records()) {
            assert!(std::ptr::eq(a, b));
        }
    }

    #[test]
    fn specific_year_keeps_only_that_year() {
        let ds = three_store_dataset();
        let out = filter_by_year(ds.view(), YearChoice::Year(2010));
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.year() == 2010));

        let missing = filter_by_year(ds.view(), YearChoice::Year(1999));
        assert!(missing.is_empty());
    }

    #[test]
    fn filters_commute() {
        let ds = three_store_dataset();
        let store = StoreSelection { value: 1, mode: StoreMatch::Above };
        let a = filter_by_year(filter_by_store(ds.view(), &store), YearChoice::Year(2011));
        let b = filter_by_store(filter_by_year(ds.view(), YearChoice::Year(2011)), &store);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn apply_preserves_input_order() {
        let ds = three_store_dataset();
        let sel = FilterSelection {
            store: StoreSelection::above(0),
            year: YearChoice::AllYears,
        };
        let out = apply(&ds, &sel);
        let dates: Vec<_> = out.iter().map(|r| (r.store, r.date)).collect();
        let expected: Vec<_> = ds.records().iter().map(|r| (r.store, r.date)).collect();
        assert_eq!(dates, expected);
    }
}
