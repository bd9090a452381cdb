use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use course_core::model::{CourseCatalog, UiSettings};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::repository::{
    AutosaveDocument, AutosaveRepository, SettingsRepository, Storage, StorageError,
};

/// File name of the autosave document inside a data directory.
pub const AUTOSAVE_FILE: &str = "autosave.json";
/// File name of the settings blob inside a data directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Whole-file JSON persistence rooted at a data directory.
///
/// Every save serializes the complete document and overwrites the file;
/// every load re-reads and re-parses it. The files are pretty-printed so
/// they stay hand-inspectable.
#[derive(Clone, Debug)]
pub struct JsonFileRepository {
    data_dir: PathBuf,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsonInitError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl JsonFileRepository {
    /// Open a repository rooted at `data_dir`, creating the directory when
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `JsonInitError` if the directory cannot be created.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, JsonInitError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn autosave_path(&self) -> PathBuf {
        self.data_dir.join(AUTOSAVE_FILE)
    }

    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }
}

impl AutosaveRepository for JsonFileRepository {
    fn load_autosave(&self) -> Result<Option<AutosaveDocument>, StorageError> {
        read_json(&self.autosave_path())
    }

    fn save_autosave(&self, document: &AutosaveDocument) -> Result<(), StorageError> {
        let path = self.autosave_path();
        write_json(&path, document)?;
        debug!(
            path = %path.display(),
            statuses = document.statuses().len(),
            "wrote autosave"
        );
        Ok(())
    }
}

impl SettingsRepository for JsonFileRepository {
    fn load_settings(&self) -> Result<Option<UiSettings>, StorageError> {
        read_json(&self.settings_path())
    }

    fn save_settings(&self, settings: &UiSettings) -> Result<(), StorageError> {
        let path = self.settings_path();
        write_json(&path, settings)?;
        debug!(path = %path.display(), "wrote settings");
        Ok(())
    }
}

/// Loads a raw curriculum export, the file an exporter produces before any
/// status has ever been tracked. Absent file is `None`, matching the
/// repository contracts.
///
/// # Errors
///
/// Returns `StorageError` when the file exists but cannot be read or parsed.
pub fn read_catalog_file(path: &Path) -> Result<Option<CourseCatalog>, StorageError> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no persisted file");
            return Ok(None);
        }
        Err(err) => return Err(StorageError::Io(err)),
    };
    let value = serde_json::from_str(&raw)?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let rendered = serde_json::to_string_pretty(value)?;
    fs::write(path, rendered)?;
    Ok(())
}

impl Storage {
    /// Build a `Storage` backed by JSON files under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `JsonInitError` if the data directory cannot be created.
    pub fn json_dir(data_dir: impl Into<PathBuf>) -> Result<Self, JsonInitError> {
        let repo = JsonFileRepository::open(data_dir)?;
        let autosaves: Arc<dyn AutosaveRepository> = Arc::new(repo.clone());
        let settings: Arc<dyn SettingsRepository> = Arc::new(repo);
        Ok(Self {
            autosaves,
            settings,
        })
    }
}
