use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::source::{self, SourceError};

#[derive(Debug, Error)]
pub enum SetLoadError {
    #[error("question set {0} does not exist")]
    UnknownSet(u32),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("no questions in {0}")]
    NoQuestions(PathBuf),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Question {
    pub ordinal: u32,
    pub prompt: String,
    pub answer: String,
    pub explanation: String,
}

impl Question {
    pub fn has_explanation(&self) -> bool {
        !self.explanation.is_empty()
    }
}

// Rows are [ordinal, prompt, answer, explanation?]. Rows with fewer than
// three fields are skipped; a missing or unusable ordinal falls back to the
// 1-based row position. Ordinals are display text only, lookups go by load
// position.
pub fn load_questions(path: &Path) -> Result<Vec<Question>, SetLoadError> {
    let rows = source::read_rows(path)?;
    let mut questions = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if row.len() < 3 {
            continue;
        }
        let ordinal = row[0]
            .parse()
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(index as u32 + 1);
        questions.push(Question {
            ordinal,
            prompt: row[1].clone(),
            answer: row[2].clone(),
            explanation: row.get(3).cloned().unwrap_or_default(),
        });
    }
    if questions.is_empty() {
        return Err(SetLoadError::NoQuestions(path.to_path_buf()));
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("flashdeck-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_questions_in_row_order() {
        let path = write_fixture(
            "set-basic.csv",
            "1,What is 2+2?,4\n2,Capital of France?,Paris,It is not Lyon\n",
        );
        let questions = load_questions(&path).unwrap();
        assert_eq!(2, questions.len());
        assert_eq!(1, questions[0].ordinal);
        assert_eq!("What is 2+2?", questions[0].prompt);
        assert_eq!("4", questions[0].answer);
        assert!(!questions[0].has_explanation());
        assert_eq!("It is not Lyon", questions[1].explanation);
        assert!(questions[1].has_explanation());
    }

    #[test]
    fn skips_short_rows() {
        let path = write_fixture("set-short.csv", "1,only a prompt\n2,q,a\n");
        let questions = load_questions(&path).unwrap();
        assert_eq!(1, questions.len());
        assert_eq!("q", questions[0].prompt);
    }

    #[test]
    fn missing_ordinal_falls_back_to_row_position() {
        let path = write_fixture("set-ordinal.csv", "x,q1,a1\n7,q2,a2\n");
        let questions = load_questions(&path).unwrap();
        assert_eq!(1, questions[0].ordinal);
        assert_eq!(7, questions[1].ordinal);
    }

    #[test]
    fn empty_file_is_an_error() {
        let path = write_fixture("set-empty.csv", "\n\n");
        assert!(matches!(
            load_questions(&path),
            Err(SetLoadError::NoQuestions(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_questions(Path::new("/nonexistent/questions.csv")).unwrap_err();
        assert!(matches!(err, SetLoadError::Source(_)));
    }
}
