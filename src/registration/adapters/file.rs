//! File-backed registration store.
//!
//! The record is stored as a small JSON document. Saves write a temporary
//! sibling, sync it, and rename it over the live file so a crash leaves
//! either the old record or the new one.

use std::io::Write;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::registration::{
    domain::RegistrationRecord,
    ports::{RegistrationStore, StoreError, StoreResult},
};

/// File name of the live record inside the store directory.
pub const RECORD_FILE_NAME: &str = "openpush_registration.json";

const TEMP_FILE_NAME: &str = "openpush_registration.json.tmp";

/// [`RegistrationStore`] persisting to a directory on disk.
#[derive(Debug)]
pub struct FileRegistrationStore {
    dir: Dir,
}

impl FileRegistrationStore {
    /// Opens the store rooted at `path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] when the directory cannot be
    /// created or opened.
    pub fn open(path: &Utf8Path) -> StoreResult<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority()).map_err(StoreError::persistence)?;
        let dir =
            Dir::open_ambient_dir(path, ambient_authority()).map_err(StoreError::persistence)?;
        Ok(Self { dir })
    }

    /// Wraps an already opened directory handle.
    #[must_use]
    pub const fn from_dir(dir: Dir) -> Self {
        Self { dir }
    }
}

impl RegistrationStore for FileRegistrationStore {
    fn load(&self) -> StoreResult<RegistrationRecord> {
        let contents = match self.dir.read_to_string(RECORD_FILE_NAME) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(RegistrationRecord::default());
            }
            Err(err) => return Err(StoreError::persistence(err)),
        };
        serde_json::from_str(&contents).map_err(StoreError::invalid_persisted_data)
    }

    fn save(&self, record: &RegistrationRecord) -> StoreResult<()> {
        let encoded = serde_json::to_vec_pretty(record).map_err(StoreError::persistence)?;
        let mut file = self
            .dir
            .create(TEMP_FILE_NAME)
            .map_err(StoreError::persistence)?;
        file.write_all(&encoded).map_err(StoreError::persistence)?;
        file.sync_all().map_err(StoreError::persistence)?;
        drop(file);
        self.dir
            .rename(TEMP_FILE_NAME, &self.dir, RECORD_FILE_NAME)
            .map_err(StoreError::persistence)
    }

    fn clear(&self) -> StoreResult<()> {
        match self.dir.remove_file(RECORD_FILE_NAME) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::persistence(err)),
        }
    }
}
