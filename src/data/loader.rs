use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::config::DateRange;

use super::store::TransactionStore;

/// Kind of input file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// `*.tsv`: transaction records.
    Transactions,
    /// `*.csv`: portfolio directory.
    Portfolios,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("tsv") {
            Some(InputKind::Transactions)
        } else if ext.eq_ignore_ascii_case("csv") {
            Some(InputKind::Portfolios)
        } else {
            None
        }
    }
}

/// List the input files of `dir` (non-recursive), sorted by file name so that
/// replay order does not depend on the platform's directory listing.
pub fn list_input_files(dir: &Path) -> Result<Vec<(PathBuf, InputKind)>, AppError> {
    if !dir.is_dir() {
        return Err(AppError::DirectoryNotFound(dir.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(kind) = InputKind::from_path(&path) {
            files.push((path, kind));
        }
    }
    files.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
    Ok(files)
}

/// Load every transaction and portfolio file in `dir` into a fresh store.
/// Any malformed file aborts the load.
pub fn load_directory(dir: &Path, range: &DateRange) -> Result<TransactionStore, AppError> {
    let files = list_input_files(dir)?;
    if files.is_empty() {
        warn!("No .tsv or .csv files found in {}", dir.display());
    }

    let mut store = TransactionStore::new();
    for (path, kind) in &files {
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)
            .map_err(|e| AppError::FileRead(format!("{}: {}", path.display(), e)))?;
        let reader = BufReader::new(file);
        match kind {
            InputKind::Transactions => {
                store.load_transactions(reader, &source_name, range)?;
            }
            InputKind::Portfolios => {
                store.load_portfolios(reader, &source_name)?;
            }
        }
    }

    info!(
        "Loaded {} transactions across {} portfolio groups from {}",
        store.len(),
        store.portfolios().len(),
        dir.display()
    );
    if store.portfolios().is_empty() && !store.is_empty() {
        warn!("No portfolio groups found in {}", dir.display());
    }
    for group in store.unmapped_groups() {
        warn!("Group '{}' has transactions but no portfolio target", group);
    }
    Ok(store)
}
