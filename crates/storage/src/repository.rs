use course_core::model::{CourseCatalog, StatusLedger, UiSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
///
/// Absence of a persisted file is not an error; load operations report it as
/// `Ok(None)` so callers can fall back to defaults.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("lock poisoned: {0}")]
    Lock(String),
}

/// Persisted shape of a tracker workspace.
///
/// The wire format is exactly two top-level fields: `json_data` holds the
/// catalog tree as the exporter produced it, `statuses` holds every ledger
/// entry with plain status spellings. Older files may carry `null` or omit
/// either field; both degrade to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutosaveDocument {
    #[serde(default, rename = "json_data")]
    catalog: Option<CourseCatalog>,
    #[serde(default)]
    statuses: BTreeMap<String, String>,
}

impl AutosaveDocument {
    /// Snapshots live session state into the persisted shape.
    #[must_use]
    pub fn from_state(catalog: &CourseCatalog, ledger: &StatusLedger) -> Self {
        Self {
            catalog: Some(catalog.clone()),
            statuses: ledger.to_persisted_form(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&CourseCatalog> {
        self.catalog.as_ref()
    }

    #[must_use]
    pub fn statuses(&self) -> &BTreeMap<String, String> {
        &self.statuses
    }

    /// Decomposes the document, substituting an empty catalog for a missing
    /// or `null` one.
    #[must_use]
    pub fn into_parts(self) -> (CourseCatalog, BTreeMap<String, String>) {
        (self.catalog.unwrap_or_default(), self.statuses)
    }
}

/// Repository contract for the autosave document.
pub trait AutosaveRepository: Send + Sync {
    /// Fetch the persisted document, `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when a document exists but cannot be read or
    /// parsed.
    fn load_autosave(&self) -> Result<Option<AutosaveDocument>, StorageError>;

    /// Replace the persisted document wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    fn save_autosave(&self, document: &AutosaveDocument) -> Result<(), StorageError>;
}

/// Repository contract for the UI settings blob.
pub trait SettingsRepository: Send + Sync {
    /// Fetch persisted settings, `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when settings exist but cannot be read or
    /// parsed.
    fn load_settings(&self) -> Result<Option<UiSettings>, StorageError>;

    /// Replace persisted settings wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be written.
    fn save_settings(&self, settings: &UiSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    autosave: Arc<Mutex<Option<AutosaveDocument>>>,
    settings: Arc<Mutex<Option<UiSettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AutosaveRepository for InMemoryRepository {
    fn load_autosave(&self) -> Result<Option<AutosaveDocument>, StorageError> {
        let guard = self
            .autosave
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save_autosave(&self, document: &AutosaveDocument) -> Result<(), StorageError> {
        let mut guard = self
            .autosave
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        *guard = Some(document.clone());
        Ok(())
    }
}

impl SettingsRepository for InMemoryRepository {
    fn load_settings(&self) -> Result<Option<UiSettings>, StorageError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save_settings(&self, settings: &UiSettings) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        *guard = Some(settings.clone());
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub autosaves: Arc<dyn AutosaveRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let autosaves: Arc<dyn AutosaveRepository> = Arc::new(repo.clone());
        let settings: Arc<dyn SettingsRepository> = Arc::new(repo);
        Self {
            autosaves,
            settings,
        }
    }
}
