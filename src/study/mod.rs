use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::catalog::{Catalog, CatalogError};
use crate::output::{Message, StudyOutput};
use crate::storage::StoreHandle;
use crate::study::classification::{Classification, ClassificationStore};
use crate::study::session::{load_view_mode, save_view_mode, Reclassified, Session, ViewMode};
use crate::study::set::SetLoadError;
use crate::transfer;

pub mod classification;
pub mod session;
pub mod set;

pub enum Phase<O: StudyOutput> {
    Catalog,
    Viewing(Session<O>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpenOutcome {
    Entered,
    NoMatches,
}

// Owns the whole application state: the catalog, the persisted store, and
// the active session if one is open. Every user intent funnels through
// here; the UI only reads state back out to draw it.
pub struct Study<O: StudyOutput + Clone> {
    catalog: Catalog,
    store: StoreHandle,
    output: O,
    phase: Phase<O>,
}

impl<O: StudyOutput + Clone> Study<O> {
    pub fn new(catalog_path: &Path, store: StoreHandle, output: O) -> Result<Self, CatalogError> {
        let catalog = Catalog::load(catalog_path, &store)?;
        Ok(Study {
            catalog,
            store,
            output,
            phase: Phase::Catalog,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> Option<&Session<O>> {
        match &self.phase {
            Phase::Viewing(session) => Some(session),
            Phase::Catalog => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session<O>> {
        match &mut self.phase {
            Phase::Viewing(session) => Some(session),
            Phase::Catalog => None,
        }
    }

    // Loads the set's questions and statuses and enters the view in the
    // set's remembered mode. When nothing matches the filter the screen
    // does not change; only a stderr trace records that it happened.
    pub fn open_set(
        &mut self,
        set_id: u32,
        filter: Classification,
    ) -> Result<OpenOutcome, SetLoadError> {
        let set = self
            .catalog
            .get(set_id)
            .ok_or(SetLoadError::UnknownSet(set_id))?
            .clone();
        let questions = set::load_questions(&self.catalog.resolve_source(&set))?;
        match Session::begin(
            set,
            questions,
            filter,
            self.store.clone(),
            self.output.clone(),
        )? {
            Some(session) => {
                self.phase = Phase::Viewing(session);
                Ok(OpenOutcome::Entered)
            }
            None => {
                eprintln!(
                    "set {}: no questions match filter {}",
                    set_id,
                    filter.label()
                );
                Ok(OpenOutcome::NoMatches)
            }
        }
    }

    pub fn reclassify(&mut self, position: usize, status: Classification) -> Result<()> {
        let outcome = match &mut self.phase {
            Phase::Viewing(session) => session.reclassify(position, status)?,
            Phase::Catalog => return Ok(()),
        };
        if outcome == Reclassified::Exhausted {
            self.close_session()
                .context("could not rebuild the catalog")?;
        }
        Ok(())
    }

    pub fn close_session(&mut self) -> Result<(), CatalogError> {
        self.phase = Phase::Catalog;
        self.reload_catalog()
    }

    // Rebuilding from the persisted store is what makes counts reflect
    // session edits and imports alike.
    pub fn reload_catalog(&mut self) -> Result<(), CatalogError> {
        let path = self.catalog.path().to_path_buf();
        self.catalog = Catalog::load(&path, &self.store)?;
        Ok(())
    }

    // The mode a set will open in, for catalog display.
    pub fn set_mode(&self, set_id: u32) -> ViewMode {
        load_view_mode(&self.store, set_id)
    }

    // Catalog-screen toggle of the mode a set will open in next time.
    pub fn toggle_set_mode(&mut self, set_id: u32) -> Result<ViewMode> {
        let mode = load_view_mode(&self.store, set_id).toggled();
        save_view_mode(&self.store, set_id, mode)?;
        Ok(mode)
    }

    // The confirmation prompt happens in the UI before this is called.
    pub fn reset_set(&mut self, set_id: u32) -> Result<()> {
        let question_count = self
            .catalog
            .get(set_id)
            .with_context(|| format!("question set {} does not exist", set_id))?
            .question_count;
        ClassificationStore::new(self.store.clone()).reset(set_id, question_count)?;
        self.output.say(&Message::StatusReset(set_id));
        self.reload_catalog()
            .context("could not rebuild the catalog")?;
        Ok(())
    }

    pub fn export_to(&mut self, dir: &Path) -> Result<PathBuf> {
        let path = transfer::export(&self.catalog, &self.store, dir)?;
        self.output.say(&Message::ExportComplete(path.clone()));
        Ok(path)
    }

    pub fn import_from(&mut self, path: &Path) -> Result<usize> {
        let applied = transfer::import(&self.catalog, &self.store, path)?;
        if applied > 0 {
            self.reload_catalog()
                .context("could not rebuild the catalog")?;
            self.output.say(&Message::ImportApplied(applied));
        } else {
            self.output.say(&Message::NothingToImport);
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::mock::MockStudyOutput;
    use crate::storage::mock::memory_store;

    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "flashdeck-study-{}-{}-{}",
            std::process::id(),
            name,
            DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn build_study(name: &str) -> (Study<MockStudyOutput>, MockStudyOutput) {
        let dir = scratch_dir(name);
        fs::write(dir.join("catalog.csv"), "1,Biology,bio.csv,3\n").unwrap();
        fs::write(
            dir.join("bio.csv"),
            "1,What is a cell?,The unit of life\n2,What is DNA?,Genetic code\n3,What is RNA?,Messenger\n",
        )
        .unwrap();
        let output = MockStudyOutput::new();
        let study = Study::new(&dir.join("catalog.csv"), memory_store(), output.clone()).unwrap();
        (study, output)
    }

    #[test]
    fn opening_an_unknown_set_fails() {
        let (mut study, _) = build_study("unknown");
        assert!(matches!(
            study.open_set(42, Classification::Unclassified),
            Err(SetLoadError::UnknownSet(42))
        ));
    }

    #[test]
    fn opening_with_no_matches_stays_on_the_catalog() {
        let (mut study, _) = build_study("nomatch");
        let outcome = study.open_set(1, Classification::Mastered).unwrap();
        assert_eq!(OpenOutcome::NoMatches, outcome);
        assert!(study.session().is_none());
    }

    #[test]
    fn closing_a_session_refreshes_catalog_counts() {
        let (mut study, _) = build_study("close");
        study.open_set(1, Classification::Unclassified).unwrap();
        let position = study.session().unwrap().current_position().unwrap();
        study.reclassify(position, Classification::Hard).unwrap();
        study.close_session().unwrap();
        let counts = study.catalog().get(1).unwrap().counts;
        assert_eq!(2, counts.unclassified);
        assert_eq!(1, counts.hard);
    }

    #[test]
    fn reset_rewrites_status_and_announces() {
        let (mut study, output) = build_study("reset");
        study.open_set(1, Classification::Unclassified).unwrap();
        study.reclassify(0, Classification::Mastered).unwrap();
        study.close_session().unwrap();

        study.reset_set(1).unwrap();
        assert!(output.contains_message(&Message::StatusReset(1)));
        let counts = study.catalog().get(1).unwrap().counts;
        assert_eq!(3, counts.unclassified);
    }

    #[test]
    fn import_applies_rows_and_refreshes_counts() {
        let (mut study, output) = build_study("import");
        let dir = scratch_dir("import-input");
        let input = dir.join("import.csv");
        fs::write(&input, "setId,statusData,viewMode\n1,\"1,1,1\",\"list\"\n").unwrap();

        assert_eq!(1, study.import_from(&input).unwrap());
        assert!(output.contains_message(&Message::ImportApplied(1)));
        assert_eq!(3, study.catalog().get(1).unwrap().counts.hard);
    }

    #[test]
    fn empty_import_reports_nothing_to_do() {
        let (mut study, output) = build_study("import-empty");
        let dir = scratch_dir("import-empty-input");
        let input = dir.join("import.csv");
        fs::write(&input, "setId,statusData,viewMode\n99,\"1,1\",\"card\"\n").unwrap();

        assert_eq!(0, study.import_from(&input).unwrap());
        assert!(output.contains_message(&Message::NothingToImport));
    }

    #[test]
    fn export_produces_an_artifact_for_import() {
        let (mut study, output) = build_study("export");
        study.open_set(1, Classification::Unclassified).unwrap();
        study.reclassify(0, Classification::AlmostOk).unwrap();
        study.close_session().unwrap();

        let dir = scratch_dir("export-output");
        let path = study.export_to(&dir).unwrap();
        assert!(output.contains_message(&Message::ExportComplete(path.clone())));

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("1,\"2,0,0\""));
    }

    #[test]
    fn toggle_set_mode_flips_the_persisted_preference() {
        let (mut study, _) = build_study("mode");
        assert_eq!(ViewMode::List, study.toggle_set_mode(1).unwrap());
        assert_eq!(ViewMode::Card, study.toggle_set_mode(1).unwrap());
    }

    #[test]
    fn catalog_bootstrap_initializes_fresh_status() {
        let (study, _) = build_study("bootstrap");
        let counts = study.catalog().get(1).unwrap().counts;
        assert_eq!(3, counts.unclassified);
        assert_eq!(3, counts.total());
    }
}
