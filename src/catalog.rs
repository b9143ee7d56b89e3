use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::source::{self, SourceError};
use crate::storage::StoreHandle;
use crate::study::classification::{ClassificationStore, Counts};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("no valid question sets in {0}")]
    NoValidSets(PathBuf),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone, Debug)]
pub struct QuestionSet {
    pub id: u32,
    pub title: String,
    pub source_file: String,
    pub question_count: usize,
    pub counts: Counts,
}

pub struct Catalog {
    path: PathBuf,
    sets: Vec<QuestionSet>,
}

impl Catalog {
    // Rows are [id, title, sourceFile, questionCount]. A row is valid only
    // if title, source file, and a positive question count are all present;
    // invalid rows are skipped. A missing id falls back to the 1-based row
    // position. Counts come from the persisted status of each set, so
    // rebuilding the catalog picks up external edits.
    pub fn load(path: &Path, store: &StoreHandle) -> Result<Catalog, CatalogError> {
        let rows = source::read_rows(path)?;
        let status_store = ClassificationStore::new(store.clone());

        let mut sets = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            if row.len() < 4 {
                continue;
            }
            let id = row[0]
                .parse()
                .ok()
                .filter(|&n| n > 0)
                .unwrap_or(index as u32 + 1);
            let title = row[1].clone();
            let source_file = row[2].clone();
            let question_count = match row[3].parse::<usize>() {
                Ok(count) if count > 0 => count,
                _ => continue,
            };
            if title.is_empty() || source_file.is_empty() {
                continue;
            }
            let counts = ClassificationStore::aggregate(&status_store.load(id, question_count)?);
            sets.push(QuestionSet {
                id,
                title,
                source_file,
                question_count,
                counts,
            });
        }

        if sets.is_empty() {
            return Err(CatalogError::NoValidSets(path.to_path_buf()));
        }
        Ok(Catalog {
            path: path.to_path_buf(),
            sets,
        })
    }

    pub fn list(&self) -> &[QuestionSet] {
        &self.sets
    }

    pub fn get(&self, set_id: u32) -> Option<&QuestionSet> {
        self.sets.iter().find(|s| s.id == set_id)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Question files live next to the catalog file.
    pub fn resolve_source(&self, set: &QuestionSet) -> PathBuf {
        match self.path.parent() {
            Some(dir) => dir.join(&set.source_file),
            None => PathBuf::from(&set.source_file),
        }
    }
}
