//! Loading [`MemorySource`] fixtures from JSON files.
//!
//! A fixture file holds either a JSON array of result items or one item per
//! line (JSON Lines). Blank lines in JSON Lines files are skipped.

use std::fs;
use std::path::Path;

use crate::document::ResultItem;
use crate::error::{FedSearchError, Result};
use crate::source::memory::MemorySource;

/// Read the result items stored in `path`.
pub fn load_items<P: AsRef<Path>>(path: P) -> Result<Vec<ResultItem>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| {
                FedSearchError::invalid_argument(format!("{}:{}: {e}", path.display(), n + 1))
            })
        })
        .collect()
}

/// Build a [`MemorySource`] from a fixture file. The source id defaults to
/// the file stem.
pub fn load_source<P: AsRef<Path>>(path: P, id: Option<&str>) -> Result<MemorySource> {
    let path = path.as_ref();
    let id = match id {
        Some(id) => id.to_string(),
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| {
                FedSearchError::invalid_argument(format!(
                    "cannot derive a source id from {}",
                    path.display()
                ))
            })?,
    };

    let items = load_items(path)?;
    log::info!("loaded {} items for source '{id}' from {}", items.len(), path.display());
    Ok(MemorySource::new(id, items))
}
