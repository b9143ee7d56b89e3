use std::collections::HashSet;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal;

use crate::output::terminal::TerminalOutput;
use crate::study::classification::Classification;
use crate::study::session::ViewMode;
use crate::study::Study;

mod render;

pub fn run(study: Study<TerminalOutput>, output: TerminalOutput) -> Result<()> {
    terminal::enable_raw_mode()?;
    let result = Ui::new(study, output).event_loop();
    terminal::disable_raw_mode()?;
    result
}

// Screen-local state the core does not track: cursors, reveal toggles, the
// status line. Everything durable lives in Study.
struct Ui {
    study: Study<TerminalOutput>,
    output: TerminalOutput,
    catalog_cursor: usize,
    list_cursor: usize,
    answer_shown: bool,
    explanation_shown: bool,
    revealed_rows: HashSet<usize>,
    explained_rows: HashSet<usize>,
    notice: Option<String>,
    error: Option<String>,
}

impl Ui {
    fn new(study: Study<TerminalOutput>, output: TerminalOutput) -> Ui {
        Ui {
            study,
            output,
            catalog_cursor: 0,
            list_cursor: 0,
            answer_shown: false,
            explanation_shown: false,
            revealed_rows: HashSet::new(),
            explained_rows: HashSet::new(),
            notice: None,
            error: None,
        }
    }

    fn event_loop(&mut self) -> Result<()> {
        loop {
            self.collect_notices();
            render::draw(self)?;
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.handle_key(key)? {
                        return Ok(());
                    }
                }
                _ => (),
            }
        }
    }

    fn collect_notices(&mut self) {
        let pending = self.output.drain();
        if let Some(last) = pending.into_iter().last() {
            self.notice = Some(last);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        self.notice = None;
        match self.study.session().map(|s| s.mode()) {
            None => self.handle_catalog_key(key),
            Some(ViewMode::Card) => {
                self.handle_card_key(key)?;
                Ok(false)
            }
            Some(ViewMode::List) => {
                self.handle_list_key(key)?;
                Ok(false)
            }
        }
    }

    fn handle_catalog_key(&mut self, key: KeyEvent) -> Result<bool> {
        let set_count = self.study.catalog().list().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up | KeyCode::Char('k') => {
                self.catalog_cursor = self.catalog_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.catalog_cursor + 1 < set_count {
                    self.catalog_cursor += 1;
                }
            }
            KeyCode::Char(c @ '1'..='4') => {
                let set_id = self.selected_set_id();
                self.open_set(set_id, classification_for(c));
            }
            KeyCode::Char('m') => {
                let set_id = self.selected_set_id();
                if let Err(e) = self.study.toggle_set_mode(set_id) {
                    self.alert(format!("{:#}", e));
                }
            }
            KeyCode::Char('e') => {
                if let Err(e) = self.study.export_to(Path::new(".")) {
                    self.alert(format!("{:#}", e));
                }
            }
            KeyCode::Char('i') => self.import_with_prompt()?,
            KeyCode::Char('r') => self.reset_with_prompt()?,
            _ => (),
        }
        Ok(false)
    }

    fn handle_card_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('b') | KeyCode::Esc => self.leave_session(),
            KeyCode::Left | KeyCode::Char('p') => {
                if self.session_navigate(-1) {
                    self.hide_card();
                }
            }
            KeyCode::Right | KeyCode::Char('n') => {
                if self.session_navigate(1) {
                    self.hide_card();
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.answer_shown = !self.answer_shown;
                if !self.answer_shown {
                    self.explanation_shown = false;
                }
            }
            KeyCode::Char('x') => {
                let has_explanation = self
                    .study
                    .session()
                    .and_then(|s| s.current_question())
                    .map(|q| q.has_explanation())
                    .unwrap_or(false);
                if self.answer_shown && has_explanation {
                    self.explanation_shown = !self.explanation_shown;
                }
            }
            KeyCode::Char(c @ '1'..='4') => {
                if let Some(position) = self.study.session().and_then(|s| s.current_position()) {
                    self.reclassify(position, classification_for(c));
                    self.hide_card();
                }
            }
            KeyCode::Char('v') => self.switch_mode(ViewMode::List),
            _ => (),
        }
        Ok(())
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Result<()> {
        let row_count = self.study.session().map(|s| s.filtered().len()).unwrap_or(0);
        match key.code {
            KeyCode::Char('b') | KeyCode::Esc => self.leave_session(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.list_cursor = self.list_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.list_cursor + 1 < row_count {
                    self.list_cursor += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(position) = self.selected_row_position() {
                    if !self.revealed_rows.insert(position) {
                        self.revealed_rows.remove(&position);
                        self.explained_rows.remove(&position);
                    }
                }
            }
            KeyCode::Char('x') => {
                if let Some(position) = self.selected_row_position() {
                    let has_explanation = self
                        .study
                        .session()
                        .and_then(|s| s.question_at(position))
                        .map(|q| q.has_explanation())
                        .unwrap_or(false);
                    if self.revealed_rows.contains(&position)
                        && has_explanation
                        && !self.explained_rows.insert(position)
                    {
                        self.explained_rows.remove(&position);
                    }
                }
            }
            KeyCode::Char(c @ '1'..='4') => {
                if let Some(position) = self.selected_row_position() {
                    self.reclassify(position, classification_for(c));
                }
            }
            KeyCode::Char('v') => self.switch_mode(ViewMode::Card),
            _ => (),
        }
        Ok(())
    }

    fn selected_set_id(&self) -> u32 {
        self.study.catalog().list()[self.catalog_cursor.min(
            self.study.catalog().list().len() - 1,
        )]
        .id
    }

    fn selected_row_position(&self) -> Option<usize> {
        self.study
            .session()
            .and_then(|s| s.filtered().get(self.list_cursor).copied())
    }

    fn open_set(&mut self, set_id: u32, filter: Classification) {
        match self.study.open_set(set_id, filter) {
            Ok(_) => {
                self.error = None;
                self.enter_session();
            }
            Err(e) => self.alert(e.to_string()),
        }
    }

    fn enter_session(&mut self) {
        self.list_cursor = 0;
        self.hide_card();
        self.revealed_rows.clear();
        self.explained_rows.clear();
    }

    fn leave_session(&mut self) {
        match self.study.close_session() {
            Ok(()) => self.error = None,
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn session_navigate(&mut self, step: isize) -> bool {
        self.study
            .session_mut()
            .map(|s| s.navigate(step))
            .unwrap_or(false)
    }

    fn reclassify(&mut self, position: usize, status: Classification) {
        if let Err(e) = self.study.reclassify(position, status) {
            self.alert(format!("{:#}", e));
            return;
        }
        // The subset changed shape; collapse reveals and re-clamp cursors.
        self.revealed_rows.clear();
        self.explained_rows.clear();
        if let Some(session) = self.study.session() {
            let row_count = session.filtered().len();
            if row_count > 0 && self.list_cursor >= row_count {
                self.list_cursor = row_count - 1;
            }
        } else {
            // Session ended; the next draw is the catalog.
            self.catalog_cursor = 0;
        }
    }

    fn switch_mode(&mut self, mode: ViewMode) {
        let result = match self.study.session_mut() {
            Some(session) => session.change_view_mode(mode),
            None => return,
        };
        if let Err(e) = result {
            self.alert(format!("{:#}", e));
            return;
        }
        self.enter_session();
    }

    fn import_with_prompt(&mut self) -> Result<()> {
        let path = self.prompt_line("Import file path:")?;
        if path.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.study.import_from(Path::new(&path)) {
            self.alert(format!("{:#}", e));
        }
        Ok(())
    }

    fn reset_with_prompt(&mut self) -> Result<()> {
        let set_id = self.selected_set_id();
        let title = self
            .study
            .catalog()
            .get(set_id)
            .map(|s| s.title.clone())
            .unwrap_or_default();
        let answer = self.prompt_line(&format!("Reset all progress for \"{}\"? [y/N]", title))?;
        if answer.eq_ignore_ascii_case("y") {
            if let Err(e) = self.study.reset_set(set_id) {
                self.alert(format!("{:#}", e));
            }
        }
        Ok(())
    }

    // Drops out of raw mode for one cooked-mode line read.
    fn prompt_line(&mut self, prompt: &str) -> Result<String> {
        terminal::disable_raw_mode()?;
        let mut stdout = io::stdout();
        write!(stdout, "\n{} ", prompt)?;
        stdout.flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        terminal::enable_raw_mode()?;
        Ok(line.trim().to_owned())
    }

    fn hide_card(&mut self) {
        self.answer_shown = false;
        self.explanation_shown = false;
    }

    fn alert(&mut self, message: String) {
        eprintln!("{}", message);
        self.notice = Some(format!("Error: {}", message));
    }
}

fn classification_for(key: char) -> Classification {
    match key {
        '2' => Classification::Hard,
        '3' => Classification::AlmostOk,
        '4' => Classification::Mastered,
        _ => Classification::Unclassified,
    }
}
