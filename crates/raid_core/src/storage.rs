use std::{io::ErrorKind, sync::Arc, sync::Mutex};

use cap_std::fs_utf8::Dir;
use indexmap::IndexMap;
use miette::{Context, IntoDiagnostic, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, trace};

/// Bytes escaped in file names. `%` is escaped too, so distinct keys never share a file.
const KEY_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-').remove(b'.');

/// Durable string storage keyed by name, the native equivalent of the browser `localStorage`.
/// Reads and writes are synchronous and block the caller.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Reads a json value from the store.
/// Anything that cannot be read or parsed is logged and reported as absent.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            error!(?e, key, "failed to read from storage");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            error!(?e, key, "malformed json in storage, ignoring it");
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let serialized = serde_json::to_string(value)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to serialize value for {key}"))?;
    store.set(key, &serialized)
}

/// One file per key inside a directory. The file name is the sanitized key with a `.json` extension.
pub struct DirStore {
    dir: Arc<Dir>,
}

impl DirStore {
    pub const FILE_EXTENSION: &'static str = "json";

    pub fn new(dir: Arc<Dir>) -> Self {
        Self { dir }
    }

    /// Opens (and creates if needed) a sub directory of `root` to hold the values.
    pub fn open_in(root: &Dir, dir_name: &str) -> Result<Self> {
        root.create_dir_all(dir_name)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to create storage directory {dir_name}"))?;
        let dir = root
            .open_dir(dir_name)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to open storage directory {dir_name}"))?;
        Ok(Self::new(Arc::new(dir)))
    }

    /// `<percent encoded key>.json`, never containing a path separator
    pub fn file_name(key: &str) -> String {
        format!(
            "{}.{}",
            utf8_percent_encode(key, KEY_ESCAPES),
            Self::FILE_EXTENSION
        )
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let file_name = Self::file_name(key);
        match self.dir.read_to_string(&file_name) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to read {file_name}")),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file_name = Self::file_name(key);
        trace!(%file_name, "writing storage value");
        self.dir
            .write(&file_name, value.as_bytes())
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {file_name}"))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let file_name = Self::file_name(key);
        match self.dir.remove_file(&file_name) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to remove {file_name}")),
        }
    }
}

/// Volatile store, used when no data directory is available and in tests.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<IndexMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
    fn values(&self) -> std::sync::MutexGuard<'_, IndexMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
    pub fn len(&self) -> usize {
        self.values().len()
    }
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
    fn remove(&self, key: &str) -> Result<()> {
        self.values().shift_remove(key);
        Ok(())
    }
}
