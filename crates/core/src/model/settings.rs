use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::status::StatusFilter;

//
// ─── UI SETTINGS ──────────────────────────────────────────────────────────────
//

/// The small persisted blob of presentation preferences.
///
/// Every field is individually defaulted, so a missing file, an empty object
/// and a partially populated one all load cleanly. Unrecognized fields are
/// carried through a save untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    #[serde(default)]
    favorites: BTreeMap<String, bool>,
    #[serde(default = "default_preload")]
    preload: bool,
    #[serde(default, rename = "autosave_setting")]
    autosave: bool,
    #[serde(default)]
    filter: StatusFilter,
    #[serde(default)]
    selected_course: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

fn default_preload() -> bool {
    true
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            favorites: BTreeMap::new(),
            preload: true,
            autosave: false,
            filter: StatusFilter::All,
            selected_course: None,
            extra: BTreeMap::new(),
        }
    }
}

impl UiSettings {
    #[must_use]
    pub fn is_favorite(&self, course_id: &str) -> bool {
        self.favorites.get(course_id).copied().unwrap_or(false)
    }

    /// Records the flag as given. Unfavorited courses keep an explicit
    /// `false` entry, the shape older files already have.
    pub fn set_favorite(&mut self, course_id: impl Into<String>, favorite: bool) {
        self.favorites.insert(course_id.into(), favorite);
    }

    /// Flips the favorite flag and returns the new value.
    pub fn toggle_favorite(&mut self, course_id: &str) -> bool {
        let flipped = !self.is_favorite(course_id);
        self.favorites.insert(course_id.to_string(), flipped);
        flipped
    }

    /// Whether to load the bundled catalog when no autosave exists.
    #[must_use]
    pub fn preload(&self) -> bool {
        self.preload
    }

    pub fn set_preload(&mut self, preload: bool) {
        self.preload = preload;
    }

    /// Whether every mutating action should be followed by a save.
    #[must_use]
    pub fn autosave(&self) -> bool {
        self.autosave
    }

    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    #[must_use]
    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    #[must_use]
    pub fn selected_course(&self) -> Option<&str> {
        self.selected_course.as_deref()
    }

    pub fn set_selected_course(&mut self, course_id: Option<String>) {
        self.selected_course = course_id;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
