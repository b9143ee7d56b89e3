use anyhow::{anyhow, Result};

use crate::catalog::QuestionSet;
use crate::output::{Message, StudyOutput};
use crate::storage::StoreHandle;
use crate::study::classification::{Classification, ClassificationStore, Counts};
use crate::study::set::Question;


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ViewMode {
    Card,
    List,
}

impl ViewMode {
    pub fn token(self) -> &'static str {
        match self {
            ViewMode::Card => "card",
            ViewMode::List => "list",
        }
    }

    // Unrecognized tokens default to card mode.
    pub fn from_token(token: &str) -> ViewMode {
        match token.trim() {
            "list" => ViewMode::List,
            _ => ViewMode::Card,
        }
    }

    pub fn toggled(self) -> ViewMode {
        match self {
            ViewMode::Card => ViewMode::List,
            ViewMode::List => ViewMode::Card,
        }
    }
}

pub fn mode_key(set_id: u32) -> String {
    format!("set-{}.mode", set_id)
}

pub fn load_view_mode(store: &StoreHandle, set_id: u32) -> ViewMode {
    match store.read().get(&mode_key(set_id)) {
        Ok(Some(token)) => ViewMode::from_token(&token),
        _ => ViewMode::Card,
    }
}

pub fn save_view_mode(store: &StoreHandle, set_id: u32, mode: ViewMode) -> Result<()> {
    store.write().put(&mode_key(set_id), mode.token())
}

// What a reclassification did to the visible subset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reclassified {
    Kept,
    FilterSwitched(Classification),
    Exhausted,
}

pub struct Session<O: StudyOutput> {
    set: QuestionSet,
    questions: Vec<Question>,
    statuses: Vec<Classification>,
    counts: Counts,
    filter: Classification,
    filtered: Vec<usize>,
    focus: usize,
    mode: ViewMode,
    status_store: ClassificationStore,
    store: StoreHandle,
    output: O,
}

impl<O: StudyOutput> Session<O> {
    // Returns None when no question matches the requested filter: the view
    // is not entered and the caller stays where it was.
    pub fn begin(
        set: QuestionSet,
        questions: Vec<Question>,
        filter: Classification,
        store: StoreHandle,
        output: O,
    ) -> Result<Option<Session<O>>> {
        let status_store = ClassificationStore::new(store.clone());
        let statuses = status_store.load(set.id, questions.len())?;
        let filtered = filtered_positions(&statuses, filter);
        if filtered.is_empty() {
            return Ok(None);
        }
        let counts = ClassificationStore::aggregate(&statuses);
        let mode = load_view_mode(&store, set.id);
        Ok(Some(Session {
            set,
            questions,
            statuses,
            counts,
            filter,
            filtered,
            focus: 0,
            mode,
            status_store,
            store,
            output,
        }))
    }

    // The central operation. Writes the new status at the given load
    // position, persists the whole array, then reconciles the filtered
    // subset and the card focus with the unchanged filter:
    // - subset emptied: the first classification with a nonzero count (in
    //   priority order) becomes the active filter and the view re-enters at
    //   its first question; with no populated classification at all the
    //   session is over.
    // - subset still nonempty: if the question still matches, focus follows
    //   it to its index in the subset; otherwise focus stays put, clamped to
    //   the last index when it fell off the end.
    pub fn reclassify(
        &mut self,
        position: usize,
        status: Classification,
    ) -> Result<Reclassified> {
        if position >= self.statuses.len() {
            return Err(anyhow!("question position {} out of range", position));
        }
        self.statuses[position] = status;
        self.status_store.save(self.set.id, &self.statuses)?;
        self.counts = ClassificationStore::aggregate(&self.statuses);
        self.filtered = filtered_positions(&self.statuses, self.filter);

        if self.filtered.is_empty() {
            return Ok(match self.counts.first_populated() {
                Some(next) => {
                    self.filter = next;
                    self.filtered = filtered_positions(&self.statuses, next);
                    self.focus = 0;
                    self.output.say(&Message::FilterSwitched(next));
                    Reclassified::FilterSwitched(next)
                }
                None => {
                    self.output.say(&Message::AllQuestionsClassified);
                    Reclassified::Exhausted
                }
            });
        }

        if self.mode == ViewMode::Card {
            if let Some(index) = self.filtered.iter().position(|&p| p == position) {
                self.focus = index;
            } else if self.focus >= self.filtered.len() {
                self.focus = self.filtered.len() - 1;
            }
        }
        Ok(Reclassified::Kept)
    }

    // Card mode only; boundary moves are no-ops regardless of what the UI
    // disables.
    pub fn navigate(&mut self, step: isize) -> bool {
        if self.mode != ViewMode::Card {
            return false;
        }
        let target = self.focus as isize + step;
        if target < 0 || target as usize >= self.filtered.len() {
            return false;
        }
        self.focus = target as usize;
        true
    }

    // Same subset, other presentation. The chosen mode becomes the set's
    // remembered preference. Entering card mode starts at the first
    // question of the subset.
    pub fn change_view_mode(&mut self, mode: ViewMode) -> Result<()> {
        if mode == self.mode {
            return Ok(());
        }
        self.mode = mode;
        save_view_mode(&self.store, self.set.id, mode)?;
        if mode == ViewMode::Card {
            self.focus = 0;
        }
        Ok(())
    }

    pub fn set(&self) -> &QuestionSet {
        &self.set
    }

    pub fn filter(&self) -> Classification {
        self.filter
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn current_position(&self) -> Option<usize> {
        self.filtered.get(self.focus).copied()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_position().map(|p| &self.questions[p])
    }

    pub fn question_at(&self, position: usize) -> Option<&Question> {
        self.questions.get(position)
    }

    pub fn status_at(&self, position: usize) -> Option<Classification> {
        self.statuses.get(position).copied()
    }
}

fn filtered_positions(statuses: &[Classification], filter: Classification) -> Vec<usize> {
    statuses
        .iter()
        .enumerate()
        .filter(|&(_, &status)| status == filter)
        .map(|(position, _)| position)
        .collect()
}
