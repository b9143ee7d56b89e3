use std::path::PathBuf;

use crate::study::classification::Classification;

pub mod terminal;

#[cfg(test)]
pub mod mock;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Message {
    AllQuestionsClassified,
    FilterSwitched(Classification),
    NothingToImport,
    ImportApplied(usize),
    ExportComplete(PathBuf),
    StatusReset(u32),
}

// Seam between the study core and whatever surface displays it. The core
// pushes notices through here; rendering reads session state directly.
pub trait StudyOutput {
    fn say(&mut self, message: &Message);
}
