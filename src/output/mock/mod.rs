use std::sync::Arc;

use parking_lot::RwLock;

use crate::output::{Message, StudyOutput};

// Records every notice so tests can assert on what the core announced.
// Clones share the same buffer, letting a test keep a handle while the
// session owns another.
#[derive(Clone, Default)]
pub struct MockStudyOutput {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MockStudyOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn flush(&mut self) -> Vec<Message> {
        std::mem::take(&mut *self.messages.write())
    }

    pub fn contains_message(&self, message: &Message) -> bool {
        self.messages.read().iter().any(|m| m == message)
    }
}

impl StudyOutput for MockStudyOutput {
    fn say(&mut self, message: &Message) {
        self.messages.write().push(message.clone());
    }
}
