//! Synthetic, Walmart-shaped sales data.
//!
//! Used by `--demo` (no CSV needed) and by tests that want a realistic dataset
//! without touching the filesystem. Output is fully determined by the seed.

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Dataset, SalesRecord};
use crate::error::AppError;

/// Markdown data only exists from this date on (as in the public dataset).
const MARKDOWN_START: (i32, u32, u32) = (2011, 11, 11);

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub seed: u64,
    pub stores: u32,
    pub depts: u32,
    pub weeks: u32,
    pub start: NaiveDate,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            stores: 45,
            depts: 12,
            weeks: 143,
            // First week of the public dataset.
            start: NaiveDate::from_ymd_opt(2010, 2, 5).unwrap_or_default(),
        }
    }
}

/// Generate a dataset with one record per `(store, dept, week)`.
pub fn generate_sample(config: &SampleConfig) -> Result<Dataset, AppError> {
    if config.stores == 0 || config.depts == 0 || config.weeks == 0 {
        return Err(AppError::config("Sample stores, depts and weeks must all be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, 0.08)
        .map_err(|e| AppError::config(format!("Noise distribution error: {e}")))?;
    let markdown_start = NaiveDate::from_ymd_opt(MARKDOWN_START.0, MARKDOWN_START.1, MARKDOWN_START.2)
        .ok_or_else(|| AppError::config("Invalid markdown start date."))?;

    // Fixed per-store and per-dept scale so the bar chart has structure.
    let store_scale: Vec<f64> = (0..config.stores).map(|_| rng.gen_range(0.4..1.6)).collect();
    let dept_base: Vec<f64> = (0..config.depts).map(|_| rng.gen_range(2_000.0..40_000.0)).collect();

    let n = (config.stores * config.depts * config.weeks) as usize;
    let mut records = Vec::with_capacity(n);

    for week in 0..config.weeks {
        let date = config.start + Duration::weeks(i64::from(week));
        let season = seasonal_factor(date);
        let growth = 1.0 + 0.0005 * f64::from(week);

        for store in 0..config.stores {
            let markdowns = if date >= markdown_start {
                sample_markdowns(&mut rng, store_scale[store as usize])
            } else {
                [None; 5]
            };

            for dept in 0..config.depts {
                let base = dept_base[dept as usize] * store_scale[store as usize];
                let z: f64 = noise.sample(&mut rng);
                let weekly_sales = (base * season * growth * (1.0 + z) * 100.0).round() / 100.0;

                records.push(SalesRecord {
                    store: store + 1,
                    dept: dept + 1,
                    date,
                    weekly_sales,
                    markdowns,
                });
            }
        }
    }

    Ok(Dataset::new(records))
}

/// Holiday-season bump in Nov/Dec, mild dip in January.
fn seasonal_factor(date: NaiveDate) -> f64 {
    match date.month() {
        11 => 1.15,
        12 => 1.35,
        1 => 0.9,
        _ => 1.0,
    }
}

/// Each markdown column is present ~70% of the time.
fn sample_markdowns(rng: &mut StdRng, scale: f64) -> [Option<f64>; 5] {
    let mut out = [None; 5];
    for (idx, slot) in out.iter_mut().enumerate() {
        if rng.gen_bool(0.7) {
            let magnitude = 1_000.0 * (idx as f64 + 1.0) * scale;
            *slot = Some((rng.gen_range(0.2..1.0) * magnitude * 100.0).round() / 100.0);
        }
    }
    out
}
