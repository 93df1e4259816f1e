use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parse_display::Display;

use crate::database::Database;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display("{0}")]
    Io(std::io::Error),
    #[display("{0}")]
    Encode(serde_json::Error),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err)
    }
}

/// File-backed snapshot storage. One file holds exactly one snapshot of the
/// whole database; every persist rewrites it in place.
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn persist(&self, database: &Database) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(database)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }

    /// `Ok(None)` when nothing has been persisted yet.
    pub fn restore(&self) -> Result<Option<Database>, StoreError> {
        let encoded = match fs::read_to_string(&self.path) {
            Ok(encoded) => encoded,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(Some(serde_json::from_str(&encoded)?))
    }
}
