use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

mod catalog;
mod output;
mod source;
mod storage;
mod study;
mod transfer;
mod ui;

use crate::output::terminal::TerminalOutput;
use crate::study::Study;

fn main() {
    if let Err(e) = run() {
        eprintln!("flashdeck: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let catalog_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("catalog.csv"));
    let store = storage::file_store(storage::FileStore::default_dir()?)?;
    let output = TerminalOutput::new();
    let study = Study::new(&catalog_path, store, output.clone()).with_context(|| {
        format!(
            "could not load question sets from {}",
            catalog_path.display()
        )
    })?;
    ui::run(study, output)
}
