use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::domain::WeekStore;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    JsonDecode(serde_json::Error),
    JsonEncode(serde_json::Error),
    InvalidWeek(u32),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::JsonDecode(err) => write!(f, "failed to parse week data: {err}"),
            StorageError::JsonEncode(err) => write!(f, "failed to encode week data: {err}"),
            StorageError::InvalidWeek(week) => write!(f, "invalid week number: {week}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Reads the whole store. A missing or blank file is an empty store.
pub fn load_store(path: &Path) -> Result<WeekStore, StorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no data file, starting empty");
            return Ok(WeekStore::new());
        }
        Err(err) => return Err(StorageError::Io(err)),
    };

    if raw.trim().is_empty() {
        return Ok(WeekStore::new());
    }

    let store: WeekStore = serde_json::from_str(&raw).map_err(StorageError::JsonDecode)?;
    if store.contains(0) {
        return Err(StorageError::InvalidWeek(0));
    }

    info!(
        path = %path.display(),
        weeks = store.len(),
        latest = ?store.week_numbers().last(),
        "loaded week data"
    );
    Ok(store)
}

/// Overwrites the file with the whole store.
pub fn save_store(path: &Path, store: &WeekStore) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }
    }

    let body = serde_json::to_string_pretty(store).map_err(StorageError::JsonEncode)?;
    let mut file = fs::File::create(path).map_err(StorageError::Io)?;
    file.write_all(body.as_bytes()).map_err(StorageError::Io)?;
    file.write_all(b"\n").map_err(StorageError::Io)?;

    debug!(path = %path.display(), weeks = store.len(), "saved week data");
    Ok(())
}
