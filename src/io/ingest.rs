//! CSV ingest.
//!
//! Turns the cleaned sales CSV into an immutable `Dataset`.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear `DataLoad` errors)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - Extra columns (`IsHoliday`, `Temperature`, ...) are ignored

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{Dataset, SalesRecord};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 4] = ["store", "dept", "date", "weekly_sales"];
const MARKDOWN_KEYS: [&str; 5] = ["markdown1", "markdown2", "markdown3", "markdown4", "markdown5"];

/// How many row errors are logged individually before we only count them.
const MAX_LOGGED_ROW_ERRORS: usize = 10;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the dataset plus what was skipped on the way.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub dataset: Dataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl LoadedData {
    pub fn rows_used(&self) -> usize {
        self.dataset.len()
    }
}

/// Load the sales CSV at `path`.
pub fn load_dataset(path: &Path) -> Result<LoadedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::data_load(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let loaded = load_dataset_from_reader(file)?;
    info!(
        path = %path.display(),
        rows_read = loaded.rows_read,
        rows_used = loaded.rows_used(),
        row_errors = loaded.row_errors.len(),
        "dataset loaded"
    );
    Ok(loaded)
}

/// Load sales CSV content from any reader (files, in-memory buffers in tests).
pub fn load_dataset_from_reader<R: Read>(reader: R) -> Result<LoadedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::data_load(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = Columns::resolve(&headers)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &columns));

        match parsed {
            Ok(r) => records.push(r),
            Err(message) => {
                if row_errors.len() < MAX_LOGGED_ROW_ERRORS {
                    warn!(line, %message, "skipping row");
                }
                row_errors.push(RowError { line, message });
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::data_load(format!(
            "No valid rows in CSV ({rows_read} read, {} rejected).",
            row_errors.len()
        )));
    }

    Ok(LoadedData {
        dataset: Dataset::new(records),
        row_errors,
        rows_read,
    })
}

/// True when the file's header row carries every required sales column.
pub fn has_sales_header(path: &Path) -> bool {
    let Ok(mut reader) = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path) else {
        return false;
    };
    reader
        .headers()
        .is_ok_and(|headers| Columns::resolve(headers).is_ok())
}

/// Column indices resolved from the header row.
struct Columns {
    store: usize,
    dept: usize,
    date: usize,
    weekly_sales: usize,
    markdowns: [Option<usize>; 5],
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, AppError> {
        let map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header_name(name), idx))
            .collect();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !map.contains_key(*c))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::data_load(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            store: map["store"],
            dept: map["dept"],
            date: map["date"],
            weekly_sales: map["weekly_sales"],
            markdowns: MARKDOWN_KEYS.map(|k| map.get(k).copied()),
        })
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<SalesRecord, String> {
    let store = parse_id(required(record, columns.store, "Store")?, "Store")?;
    let dept = parse_id(required(record, columns.dept, "Dept")?, "Dept")?;
    let date = parse_date(required(record, columns.date, "Date")?)?;

    let raw_sales = required(record, columns.weekly_sales, "Weekly_Sales")?;
    let weekly_sales = parse_opt_f64(Some(raw_sales))
        .ok_or_else(|| format!("Invalid Weekly_Sales '{raw_sales}'"))?;

    let markdowns = columns
        .markdowns
        .map(|col| parse_opt_f64(col.and_then(|idx| record.get(idx))));

    Ok(SalesRecord {
        store,
        dept,
        date,
        weekly_sales,
        markdowns,
    })
}

fn required<'r>(record: &'r StringRecord, idx: usize, name: &str) -> Result<&'r str, String> {
    match record.get(idx).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(format!("Missing value for `{name}`")),
    }
}

/// Integer identifiers; accepts `"3.0"` since some cleaning steps emit floats.
fn parse_id(s: &str, name: &str) -> Result<u32, String> {
    if let Ok(v) = s.parse::<u32>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        _ => Err(format!("Invalid {name} '{s}'")),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY-MM-DD HH:MM:SS, DD/MM/YYYY, YYYY/MM/DD, DD-MM-YYYY."
    ))
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SAMPLE: &str = "\
Store,Dept,Date,Weekly_Sales,IsHoliday,MarkDown1,MarkDown2,MarkDown3,MarkDown4,MarkDown5
1,1,2010-02-05,24924.5,False,,,,,
1,2,2010-02-12,50605.27,True,10.5,,3,,
2,1,2011-11-11,1000,False,1.0,2.0,3.0,4.0,5.0
";

    #[test]
    fn loads_rows_and_nullable_markdowns() {
        let loaded = load_dataset_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(loaded.rows_read, 3);
        assert_eq!(loaded.rows_used(), 3);
        assert!(loaded.row_errors.is_empty());

        let recs = loaded.dataset.records();
        assert_eq!(recs[0].store, 1);
        assert_eq!(recs[0].date, NaiveDate::from_ymd_opt(2010, 2, 5).unwrap());
        assert_eq!(recs[0].markdowns, [None; 5]);
        assert_eq!(recs[1].markdowns, [Some(10.5), None, Some(3.0), None, None]);
        assert_eq!(loaded.dataset.years(), &[2010, 2011]);
    }

    #[test]
    fn headers_are_case_insensitive_and_bom_tolerant() {
        let csv = "\u{feff}store,DEPT,date,weekly_sales\n4,7,2012-01-06,12.5\n";
        let loaded = load_dataset_from_reader(csv.as_bytes()).unwrap();
        let r = &loaded.dataset.records()[0];
        assert_eq!((r.store, r.dept), (4, 7));
        assert_eq!(r.markdowns, [None; 5]);
    }

    #[test]
    fn missing_required_column_is_data_load_error() {
        let csv = "Store,Date,Weekly_Sales\n1,2010-02-05,1.0\n";
        let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataLoad);
        assert!(err.to_string().contains("dept"));
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let csv = "\
Store,Dept,Date,Weekly_Sales
1,1,2010-02-05,10
x,1,2010-02-05,10
1,1,not-a-date,10
1,1,2010-02-05,
2,3.0,05/02/2010,7
";
        let loaded = load_dataset_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(loaded.rows_read, 5);
        assert_eq!(loaded.rows_used(), 2);
        let lines: Vec<usize> = loaded.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        let last = &loaded.dataset.records()[1];
        assert_eq!(last.dept, 3);
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2010, 2, 5).unwrap());
    }

    #[test]
    fn no_valid_rows_is_data_load_error() {
        let csv = "Store,Dept,Date,Weekly_Sales\nx,y,z,w\n";
        let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataLoad);
    }

    #[test]
    fn missing_file_is_data_load_error() {
        let err = load_dataset(Path::new("definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataLoad);
    }

    #[test]
    fn parses_timestamp_dates() {
        assert_eq!(
            parse_date("2010-02-05 00:00:00").unwrap(),
            NaiveDate::from_ymd_opt(2010, 2, 5).unwrap()
        );
    }

    #[test]
    fn every_listed_date_format_parses() {
        let want = NaiveDate::from_ymd_opt(2011, 11, 25).unwrap();
        for s in ["2011-11-25", "25/11/2011", "2011/11/25", "25-11-2011"] {
            assert_eq!(parse_date(s).unwrap(), want, "{s}");
        }
        let err = parse_date("Nov 25 2011").unwrap_err();
        assert!(err.contains("DD-MM-YYYY"));
    }
}
