use crate::error::Result;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub const CARS_FILE: &str = "db.json";
pub const SALES_FILE: &str = "sales.json";
pub const FAVORITES_FILE: &str = "favorites.json";
pub const USERS_FILE: &str = "users.json";

/// JSON file database rooted at one directory
///
/// Each collection lives in its own pretty-printed JSON file. A missing file
/// reads as an empty collection and is created on first write.
/// Read-modify-write sequences hold [`Database::lock`] for their duration.
#[derive(Debug)]
pub struct Database {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl Database {
    /// Open (and create if needed) the database directory
    ///
    /// # Errors
    /// * Returns an IO error if the directory cannot be created
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            create_dir_all(&root)?;
        }
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the collections
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serialize writers for the duration of a read-modify-write
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        // a poisoned lock guards no data, keep going
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read a collection, returning its default value when the file is absent
    pub fn read<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        let path = self.root.join(file);
        if !path.exists() {
            return Ok(T::default());
        }
        let contents = fs::read_to_string(&path)?;
        if contents.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Replace a collection on disk
    pub fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        let path = self.root.join(file);
        fs::write(&path, json)?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}
