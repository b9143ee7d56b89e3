use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::storage::StoreHandle;
use crate::study::classification::status_key;
use crate::study::session::{mode_key, ViewMode};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("could not write {0}")]
    Export(PathBuf, #[source] csv::Error),
    #[error("could not read {0}")]
    Import(PathBuf, #[source] csv::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferRow {
    set_id: u32,
    status_data: String,
    view_mode: Option<String>,
}

// One quoted row per set that has a persisted status, written to a
// timestamped file so repeated exports never clobber each other.
pub fn export(
    catalog: &Catalog,
    store: &StoreHandle,
    dir: &Path,
) -> Result<PathBuf, TransferError> {
    let filename = format!(
        "flashdeck-export-{}.csv",
        Local::now().format("%Y%m%d-%H%M%S")
    );
    let path = dir.join(filename);
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_path(&path)
        .map_err(|e| TransferError::Export(path.clone(), e))?;

    for set in catalog.list() {
        let status_data = match store.read().get(&status_key(set.id))? {
            Some(raw) => raw,
            None => continue,
        };
        let view_mode = store
            .read()
            .get(&mode_key(set.id))?
            .unwrap_or_else(|| ViewMode::Card.token().to_owned());
        writer
            .serialize(TransferRow {
                set_id: set.id,
                status_data,
                view_mode: Some(view_mode),
            })
            .map_err(|e| TransferError::Export(path.clone(), e))?;
    }
    writer
        .flush()
        .map_err(|e| TransferError::Export(path.clone(), e.into()))?;
    Ok(path)
}

// Applies rows whose ID names a known set; everything else is ignored.
// Status strings are persisted verbatim, with no length check against the
// set: a mismatch is repaired by the resize-on-load correction the next
// time the set is opened.
pub fn import(catalog: &Catalog, store: &StoreHandle, path: &Path) -> Result<usize, TransferError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| TransferError::Import(path.to_path_buf(), e))?;

    let mut applied = 0;
    for row in reader.deserialize() {
        let row: TransferRow = row.map_err(|e| TransferError::Import(path.to_path_buf(), e))?;
        if catalog.get(row.set_id).is_none() {
            continue;
        }
        store.write().put(&status_key(row.set_id), &row.status_data)?;
        let view_mode = row
            .view_mode
            .unwrap_or_else(|| ViewMode::Card.token().to_owned());
        store.write().put(&mode_key(row.set_id), &view_mode)?;
        applied += 1;
    }
    Ok(applied)
}
