use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::models::RepositoryResult;

/// String-keyed durable storage, the local-storage contract the cart needs
///
/// Reads and writes are synchronous. A write either fully replaces the value
/// under `key` or fails without changing it.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`
    fn get_item(&self, key: &str) -> RepositoryResult<Option<String>>;

    /// Overwrite the value stored under `key`
    fn set_item(&self, key: &str, value: &str) -> RepositoryResult<()>;
}

/// Process-local storage, lost on exit
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get_item(&self, key: &str) -> RepositoryResult<Option<String>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a JSON object file mapping keys to string values
///
/// The whole file is rewritten on every `set_item`, through a sibling
/// temporary file renamed over the original.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file at `path`. A missing file is an empty store.
    ///
    /// A file that does not parse is renamed to `<path>.corrupt` and the
    /// store starts empty.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref().to_path_buf();

        let items = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => HashMap::new(),
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(items) => items,
                Err(e) => {
                    let quarantine = sibling(&path, ".corrupt");
                    warn!(
                        moved_to = %quarantine.display(),
                        "Storage file is unreadable, starting empty: {}", e
                    );
                    fs::rename(&path, &quarantine)?;
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Storage file not found, starting empty");
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Opened storage with {} keys", items.len());
        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    fn flush(&self, items: &HashMap<String, String>) -> RepositoryResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = sibling(&self.path, ".tmp");

        fs::write(&tmp_path, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// `path` with `suffix` appended to its file name
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> RepositoryResult<Option<String>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);

        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;

        *items = next;
        Ok(())
    }
}
