use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories_next::BaseDirs;
use parking_lot::RwLock;

// Whole-value string store, one entry per key. Writes replace the entire
// value, so a mutation is persisted or it isn't; there is no partial state.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
}

pub type StoreHandle = Arc<RwLock<dyn Store>>;

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: PathBuf) -> Result<FileStore> {
        fs::create_dir_all(&root)
            .with_context(|| format!("could not create store directory {}", root.display()))?;
        Ok(FileStore { root })
    }

    pub fn default_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("FLASHDECK_DATA_DIR") {
            return Ok(PathBuf::from(dir));
        }
        let mut dir = BaseDirs::new()
            .context("could not locate system directories")?
            .data_dir()
            .to_path_buf();
        dir.push("flashdeck");
        Ok(dir)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)
            .with_context(|| format!("could not read store entry {}", key))?;
        Ok(Some(value))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        fs::write(self.entry_path(key), value)
            .with_context(|| format!("could not write store entry {}", key))
    }
}

pub fn file_store(root: PathBuf) -> Result<StoreHandle> {
    Ok(Arc::new(RwLock::new(FileStore::open(root)?)))
}
