use anyhow::Result;
use itertools::Itertools;

use crate::storage::StoreHandle;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Classification {
    Unclassified,
    Hard,
    AlmostOk,
    Mastered,
}

// Scan order used when an emptied filter has to pick a successor.
pub const PRIORITY_ORDER: [Classification; 4] = [
    Classification::Unclassified,
    Classification::Hard,
    Classification::AlmostOk,
    Classification::Mastered,
];

impl Classification {
    pub fn code(self) -> u8 {
        match self {
            Classification::Unclassified => 0,
            Classification::Hard => 1,
            Classification::AlmostOk => 2,
            Classification::Mastered => 3,
        }
    }

    // Out-of-range and non-numeric tokens fold into Unclassified.
    pub fn from_token(token: &str) -> Classification {
        match token.trim() {
            "1" => Classification::Hard,
            "2" => Classification::AlmostOk,
            "3" => Classification::Mastered,
            _ => Classification::Unclassified,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::Unclassified => "unclassified",
            Classification::Hard => "hard",
            Classification::AlmostOk => "almost ok",
            Classification::Mastered => "mastered",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counts {
    pub unclassified: usize,
    pub hard: usize,
    pub almost_ok: usize,
    pub mastered: usize,
}

impl Counts {
    pub fn of(&self, classification: Classification) -> usize {
        match classification {
            Classification::Unclassified => self.unclassified,
            Classification::Hard => self.hard,
            Classification::AlmostOk => self.almost_ok,
            Classification::Mastered => self.mastered,
        }
    }

    pub fn total(&self) -> usize {
        self.unclassified + self.hard + self.almost_ok + self.mastered
    }

    pub fn first_populated(&self) -> Option<Classification> {
        PRIORITY_ORDER.into_iter().find(|&c| self.of(c) > 0)
    }
}

pub fn status_key(set_id: u32) -> String {
    format!("set-{}.status", set_id)
}

fn encode(statuses: &[Classification]) -> String {
    statuses.iter().map(|s| s.code()).join(",")
}

fn decode(raw: &str) -> Vec<Classification> {
    raw.split(',').map(Classification::from_token).collect()
}

pub struct ClassificationStore {
    store: StoreHandle,
}

impl ClassificationStore {
    pub fn new(store: StoreHandle) -> ClassificationStore {
        ClassificationStore { store }
    }

    // Absent entries are initialized to all-Unclassified and persisted right
    // away. A wrong-length entry is truncated or zero-padded and the
    // corrected array persisted before returning; callers never observe a
    // mismatch.
    pub fn load(&self, set_id: u32, question_count: usize) -> Result<Vec<Classification>> {
        let raw = self.store.read().get(&status_key(set_id))?;
        let mut statuses = match raw {
            Some(raw) => decode(&raw),
            None => {
                let fresh = vec![Classification::Unclassified; question_count];
                self.save(set_id, &fresh)?;
                return Ok(fresh);
            }
        };
        if statuses.len() != question_count {
            statuses.resize(question_count, Classification::Unclassified);
            self.save(set_id, &statuses)?;
        }
        Ok(statuses)
    }

    pub fn save(&self, set_id: u32, statuses: &[Classification]) -> Result<()> {
        self.store
            .write()
            .put(&status_key(set_id), &encode(statuses))
    }

    pub fn aggregate(statuses: &[Classification]) -> Counts {
        let mut counts = Counts::default();
        for status in statuses {
            match status {
                Classification::Unclassified => counts.unclassified += 1,
                Classification::Hard => counts.hard += 1,
                Classification::AlmostOk => counts.almost_ok += 1,
                Classification::Mastered => counts.mastered += 1,
            }
        }
        counts
    }

    pub fn reset(&self, set_id: u32, question_count: usize) -> Result<Vec<Classification>> {
        let fresh = vec![Classification::Unclassified; question_count];
        self.save(set_id, &fresh)?;
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::mock::memory_store;

    fn raw_entry(store: &StoreHandle, set_id: u32) -> Option<String> {
        store.read().get(&status_key(set_id)).unwrap()
    }

    #[test]
    fn fresh_key_initializes_and_persists() {
        let store = memory_store();
        let statuses = ClassificationStore::new(store.clone()).load(1, 4).unwrap();
        assert_eq!(vec![Classification::Unclassified; 4], statuses);
        assert_eq!(Some("0,0,0,0".to_owned()), raw_entry(&store, 1));
    }

    #[test]
    fn load_decodes_persisted_statuses() {
        let store = memory_store();
        store.write().put(&status_key(1), "0,1,2").unwrap();
        let statuses = ClassificationStore::new(store).load(1, 3).unwrap();
        assert_eq!(
            vec![
                Classification::Unclassified,
                Classification::Hard,
                Classification::AlmostOk,
            ],
            statuses
        );
    }

    #[test]
    fn short_entry_is_padded_and_rewritten() {
        let store = memory_store();
        store.write().put(&status_key(1), "0,1").unwrap();
        let statuses = ClassificationStore::new(store.clone()).load(1, 4).unwrap();
        assert_eq!(
            vec![
                Classification::Unclassified,
                Classification::Hard,
                Classification::Unclassified,
                Classification::Unclassified,
            ],
            statuses
        );
        assert_eq!(Some("0,1,0,0".to_owned()), raw_entry(&store, 1));
    }

    #[test]
    fn long_entry_is_truncated_and_rewritten() {
        let store = memory_store();
        store.write().put(&status_key(1), "3,2,1,0").unwrap();
        let statuses = ClassificationStore::new(store.clone()).load(1, 2).unwrap();
        assert_eq!(
            vec![Classification::Mastered, Classification::AlmostOk],
            statuses
        );
        assert_eq!(Some("3,2".to_owned()), raw_entry(&store, 1));
    }

    #[test]
    fn load_is_idempotent() {
        let store = memory_store();
        store.write().put(&status_key(1), "0,3,1").unwrap();
        let status_store = ClassificationStore::new(store);
        let first = status_store.load(1, 3).unwrap();
        let second = status_store.load(1, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_tokens_fold_into_unclassified() {
        let store = memory_store();
        store.write().put(&status_key(1), "0,9,banana,2").unwrap();
        let statuses = ClassificationStore::new(store).load(1, 4).unwrap();
        assert_eq!(
            vec![
                Classification::Unclassified,
                Classification::Unclassified,
                Classification::Unclassified,
                Classification::AlmostOk,
            ],
            statuses
        );
        let counts = ClassificationStore::aggregate(&statuses);
        assert_eq!(4, counts.total());
        assert_eq!(3, counts.unclassified);
    }

    #[test]
    fn aggregate_counts_sum_to_length() {
        let statuses = vec![
            Classification::Unclassified,
            Classification::Hard,
            Classification::AlmostOk,
        ];
        let counts = ClassificationStore::aggregate(&statuses);
        assert_eq!(1, counts.unclassified);
        assert_eq!(1, counts.hard);
        assert_eq!(1, counts.almost_ok);
        assert_eq!(0, counts.mastered);
        assert_eq!(statuses.len(), counts.total());
    }

    #[test]
    fn first_populated_follows_priority_order() {
        let counts = Counts {
            unclassified: 0,
            hard: 2,
            almost_ok: 1,
            mastered: 5,
        };
        assert_eq!(Some(Classification::Hard), counts.first_populated());
        assert_eq!(None, Counts::default().first_populated());
    }

    #[test]
    fn reset_overwrites_with_unclassified() {
        let store = memory_store();
        store.write().put(&status_key(1), "3,3,3").unwrap();
        let statuses = ClassificationStore::new(store.clone()).reset(1, 3).unwrap();
        assert_eq!(vec![Classification::Unclassified; 3], statuses);
        assert_eq!(Some("0,0,0".to_owned()), raw_entry(&store, 1));
    }
}
