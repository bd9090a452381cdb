#![forbid(unsafe_code)]

pub mod json;
pub mod repository;

pub use json::{AUTOSAVE_FILE, JsonFileRepository, JsonInitError, SETTINGS_FILE, read_catalog_file};
pub use repository::{
    AutosaveDocument, AutosaveRepository, InMemoryRepository, SettingsRepository, Storage,
    StorageError,
};
