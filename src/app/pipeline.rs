//! Session setup shared by the CLI and TUI front-ends.
//!
//! load dataset (CSV or demo) -> validate page registry -> dispatch pages

use crate::cli::SourceArgs;
use crate::data::{SampleConfig, generate_sample};
use crate::domain::{Dataset, FilterSelection, PageView};
use crate::error::AppError;
use crate::io::ingest::{LoadedData, load_dataset};
use crate::pages::{Navigator, default_registry};

/// Everything a front-end needs for repeated render cycles.
pub struct Session {
    /// Human-readable dataset origin (path or `demo(seed=N)`).
    pub source: String,
    pub loaded: LoadedData,
    pub navigator: Navigator,
}

impl Session {
    /// Load the dataset once and register the pages.
    pub fn open(args: &SourceArgs) -> Result<Self, AppError> {
        let (source, loaded) = load_source(args)?;
        Self::with_loaded(source, loaded)
    }

    pub fn with_loaded(source: String, loaded: LoadedData) -> Result<Self, AppError> {
        let navigator = Navigator::new(default_registry()?);
        Ok(Self {
            source,
            loaded,
            navigator,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.loaded.dataset
    }

    pub fn page_names(&self) -> Vec<&str> {
        self.navigator.registry().list_names()
    }

    /// One render cycle: dispatch `page` against the loaded dataset.
    pub fn render(&self, page: &str, selection: &FilterSelection) -> Result<PageView, AppError> {
        self.navigator.run(page, &self.loaded.dataset, selection)
    }
}

fn load_source(args: &SourceArgs) -> Result<(String, LoadedData), AppError> {
    if args.demo {
        let dataset = generate_sample(&SampleConfig {
            seed: args.seed,
            ..SampleConfig::default()
        })?;
        let rows = dataset.len();
        let loaded = LoadedData {
            dataset,
            row_errors: Vec::new(),
            rows_read: rows,
        };
        return Ok((format!("demo(seed={})", args.seed), loaded));
    }

    let path = if args.pick {
        crate::cli::picker::prompt_for_csv_path()?
    } else {
        args.data.clone()
    };
    let loaded = load_dataset(&path)?;
    Ok((path.display().to_string(), loaded))
}
