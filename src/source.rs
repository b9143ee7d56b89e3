use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not read {0}")]
    Unreadable(PathBuf, #[source] std::io::Error),
    #[error("could not parse {0}")]
    Unparseable(PathBuf, #[source] csv::Error),
}

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b'\t', b'|', b';'];

// Reads a row-oriented text file into untyped string fields. The delimiter
// is guessed from the file contents; blank lines are dropped. Row shape
// validation is the caller's business.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, SourceError> {
    let text =
        fs::read_to_string(path).map_err(|e| SourceError::Unreadable(path.to_path_buf(), e))?;
    parse_rows(&text).map_err(|e| SourceError::Unparseable(path.to_path_buf(), e))
}

fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(text))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let fields: Vec<String> = record.iter().map(|f| f.trim().to_owned()).collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        rows.push(fields);
    }
    Ok(rows)
}

// Counts each candidate on the first non-empty line and keeps the most
// frequent one. Ties go to the earlier candidate, comma first.
fn sniff_delimiter(sample: &str) -> u8 {
    let line = sample.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut best = b',';
    let mut best_count = 0;
    for candidate in CANDIDATE_DELIMITERS {
        let count = line.bytes().filter(|&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}
