use std::sync::Arc;

use parking_lot::RwLock;

use crate::output::{Message, StudyOutput};

// Buffers notices for the UI to drain into its status line on the next
// draw. Clones share the buffer, so notices pushed from inside a session
// reach the UI's handle.
#[derive(Clone, Default)]
pub struct TerminalOutput {
    pending: Arc<RwLock<Vec<String>>>,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut *self.pending.write())
    }
}

impl StudyOutput for TerminalOutput {
    fn say(&mut self, message: &Message) {
        self.pending.write().push(format_message(message));
    }
}

fn format_message(message: &Message) -> String {
    match message {
        Message::AllQuestionsClassified => "All questions classified.".into(),
        Message::FilterSwitched(filter) => {
            format!("No more matches here, showing {} questions.", filter.label())
        }
        Message::NothingToImport => "Nothing to import.".into(),
        Message::ImportApplied(count) => format!("Imported status for {} set(s).", count),
        Message::ExportComplete(path) => format!("Exported to {}.", path.display()),
        Message::StatusReset(set_id) => format!("Set {} reset to unclassified.", set_id),
    }
}
