use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{StyledContent, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use itertools::Itertools;

use super::Ui;
use crate::output::terminal::TerminalOutput;
use crate::study::classification::{Classification, Counts, PRIORITY_ORDER};
use crate::study::session::{Session, ViewMode};

const CATALOG_KEYS: &str =
    "up/down select · 1 unclassified 2 hard 3 almost-ok 4 mastered · m mode · e export · i import · r reset · q quit";
const CARD_KEYS: &str = "left/right move · space answer · x note · 1-4 classify · v list view · b back";
const LIST_KEYS: &str = "up/down select · enter answer · x note · 1-4 classify · v card view · b back";

pub(super) fn draw(ui: &Ui) -> io::Result<()> {
    let mut out = io::stdout();
    out.queue(Clear(ClearType::All))?;
    out.queue(MoveTo(0, 0))?;
    match ui.study.session() {
        None => draw_catalog(&mut out, ui)?,
        Some(session) if session.mode() == ViewMode::Card => draw_card(&mut out, ui, session)?,
        Some(session) => draw_list(&mut out, ui, session)?,
    }
    if let Some(notice) = &ui.notice {
        write!(out, "\r\n{}\r\n", notice.as_str().yellow())?;
    }
    out.flush()
}

fn draw_catalog(out: &mut impl Write, ui: &Ui) -> io::Result<()> {
    let catalog = ui.study.catalog();
    write!(
        out,
        "{}   {}\r\n\r\n",
        "FLASHDECK".bold(),
        catalog.path().display()
    )?;
    if let Some(error) = &ui.error {
        write!(out, "{}\r\n\r\n", error.as_str().red())?;
    }
    for (index, set) in catalog.list().iter().enumerate() {
        let marker = if index == ui.catalog_cursor { ">" } else { " " };
        write!(
            out,
            "{} {}. {}   {}   [{}]\r\n",
            marker,
            set.id,
            set.title.as_str().bold(),
            counts_line(&set.counts),
            ui.study.set_mode(set.id).token()
        )?;
    }
    write!(out, "\r\n{}\r\n", CATALOG_KEYS.dark_grey())?;
    Ok(())
}

fn draw_card(
    out: &mut impl Write,
    ui: &Ui,
    session: &Session<TerminalOutput>,
) -> io::Result<()> {
    write!(
        out,
        "{} · {} questions   card {}/{}\r\n",
        session.set().title.as_str().bold(),
        styled_label(session.filter()),
        session.focus() + 1,
        session.filtered().len()
    )?;
    write!(out, "{}\r\n\r\n", counts_line(&session.counts()))?;

    if let Some(question) = session.current_question() {
        write!(
            out,
            "{} {}\r\n\r\n",
            format!("Q{}.", question.ordinal).bold(),
            question.prompt
        )?;
        if ui.answer_shown {
            write!(out, "A: {}\r\n", question.answer.as_str().green())?;
            if question.has_explanation() {
                if ui.explanation_shown {
                    write!(out, "Note: {}\r\n", question.explanation)?;
                } else {
                    write!(out, "{}\r\n", "press x for the note".dark_grey())?;
                }
            }
        } else {
            write!(
                out,
                "{}\r\n",
                "press space to see the answer, then classify".dark_grey()
            )?;
        }
        if let Some(status) = session.current_position().and_then(|p| session.status_at(p)) {
            write!(out, "\r\nclassified: {}\r\n", styled_label(status))?;
        }
    }
    write!(out, "\r\n{}\r\n", CARD_KEYS.dark_grey())?;
    Ok(())
}

fn draw_list(
    out: &mut impl Write,
    ui: &Ui,
    session: &Session<TerminalOutput>,
) -> io::Result<()> {
    write!(
        out,
        "{} · {} questions   list of {}\r\n",
        session.set().title.as_str().bold(),
        styled_label(session.filter()),
        session.filtered().len()
    )?;
    write!(out, "{}\r\n\r\n", counts_line(&session.counts()))?;

    for (row, &position) in session.filtered().iter().enumerate() {
        let question = match session.question_at(position) {
            Some(question) => question,
            None => continue,
        };
        let marker = if row == ui.list_cursor { ">" } else { " " };
        let status = session
            .status_at(position)
            .unwrap_or(Classification::Unclassified);
        write!(
            out,
            "{} {}. {}   [{}]\r\n",
            marker,
            question.ordinal,
            question.prompt,
            styled_label(status)
        )?;
        if ui.revealed_rows.contains(&position) {
            write!(out, "     A: {}\r\n", question.answer.as_str().green())?;
            if ui.explained_rows.contains(&position) && question.has_explanation() {
                write!(out, "     Note: {}\r\n", question.explanation)?;
            }
        }
    }
    write!(out, "\r\n{}\r\n", LIST_KEYS.dark_grey())?;
    Ok(())
}

fn counts_line(counts: &Counts) -> String {
    let per_class = PRIORITY_ORDER
        .iter()
        .map(|&c| format!("{} {}", c.label(), styled_value(c, counts.of(c))))
        .join(" · ");
    format!("{} · total {}", per_class, counts.total())
}

fn styled_value(classification: Classification, count: usize) -> StyledContent<String> {
    let count = count.to_string();
    match classification {
        Classification::Unclassified => count.white(),
        Classification::Hard => count.red(),
        Classification::AlmostOk => count.yellow(),
        Classification::Mastered => count.green(),
    }
}

fn styled_label(classification: Classification) -> StyledContent<&'static str> {
    match classification {
        Classification::Unclassified => classification.label().white(),
        Classification::Hard => classification.label().red(),
        Classification::AlmostOk => classification.label().yellow(),
        Classification::Mastered => classification.label().green(),
    }
}
