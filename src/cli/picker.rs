//! Interactive CSV picker (`dash --pick`).
//!
//! Lists `*.csv` files under the working directory. Files whose header has
//! the sales columns are listed first and tagged; the rest are still
//! selectable so the loader can report what is missing.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;
use crate::io::ingest::has_sales_header;

const SEARCH_DEPTH: usize = 4;
const SKIPPED_DIRS: [&str; 4] = [".git", "target", "node_modules", "examples"];

/// A CSV file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    path: PathBuf,
    sales_header: bool,
}

pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let candidates = rank(discover(Path::new("."), SEARCH_DEPTH));
    if candidates.is_empty() {
        return Err(AppError::data_load(
            "No .csv files found. Provide one with `dash --data <file.csv>`.",
        ));
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    choose(&candidates, &mut stdin.lock(), &mut stdout)
}

/// Prompt loop over any reader/writer pair. A number picks from the list,
/// anything else is treated as a path, `q` cancels.
fn choose<R: BufRead, W: Write>(candidates: &[Candidate], input: &mut R, out: &mut W) -> Result<PathBuf, AppError> {
    let io_err = |e: io::Error| AppError::terminal(format!("Picker I/O error: {e}"));

    writeln!(out, "CSV files ({} found, * = sales columns present):", candidates.len()).map_err(io_err)?;
    for (idx, c) in candidates.iter().enumerate() {
        let tag = if c.sales_header { '*' } else { ' ' };
        writeln!(out, "{:>3}){tag} {}", idx + 1, display(&c.path)).map_err(io_err)?;
    }

    loop {
        write!(out, "Pick 1-{} or type a path (q quits): ", candidates.len()).map_err(io_err)?;
        out.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(AppError::data_load("No selection made (end of input)."));
        }
        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }
        if answer.eq_ignore_ascii_case("q") {
            return Err(AppError::data_load("Canceled."));
        }

        let picked = match answer.parse::<usize>() {
            Ok(n) if (1..=candidates.len()).contains(&n) => validate_csv_path(&candidates[n - 1].path),
            Ok(n) => {
                writeln!(out, "{n} is not in the list.").map_err(io_err)?;
                continue;
            }
            Err(_) => validate_csv_path(Path::new(answer)),
        };

        match picked {
            Ok(path) => {
                debug!(path = %path.display(), "picked csv");
                return Ok(path);
            }
            Err(err) => writeln!(out, "{err}").map_err(io_err)?,
        }
    }
}

/// Existing, non-directory path with a `.csv` extension.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if path.is_dir() {
        return Err(AppError::data_load(format!("{} is a directory.", path.display())));
    }
    if !is_csv(path) {
        return Err(AppError::data_load(format!("{} is not a .csv file.", path.display())));
    }
    if !path.is_file() {
        return Err(AppError::data_load(format!("CSV file not found: {}", path.display())));
    }
    Ok(path.to_path_buf())
}

fn discover(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![(root.to_path_buf(), 0usize)];

    while let Some((dir, depth)) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(kind) = entry.file_type() else {
                continue;
            };
            if kind.is_dir() {
                let skip = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| SKIPPED_DIRS.contains(&n));
                if !skip && depth < max_depth {
                    stack.push((path, depth + 1));
                }
            } else if kind.is_file() && is_csv(&path) {
                found.push(path);
            }
        }
    }
    found
}

/// Sales-shaped files first, then by path.
fn rank(paths: Vec<PathBuf>) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = paths
        .into_iter()
        .map(|path| Candidate {
            sales_header: has_sales_header(&path),
            path,
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.sales_header
            .cmp(&a.sales_header)
            .then_with(|| display(&a.path).cmp(&display(&b.path)))
    });
    candidates
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn display(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}
