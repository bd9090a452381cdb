use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use course_core::model::{
    CourseCatalog, LectureKey, MasterSelection, Status, StatusCounts, StatusFilter, StatusLedger,
    StatusVocabulary, UiSettings,
};

/// Exclusively-owned in-memory state of one tracker session.
///
/// The session holds the catalog (read-only once installed), the status
/// ledger annotating it, the UI settings, and the vocabulary used to
/// interpret raw spellings. Nothing here touches storage; the workflow layer
/// owns repositories and drives this state through explicit actions.
#[derive(Debug, Clone)]
pub struct TrackerSession {
    vocabulary: StatusVocabulary,
    catalog: CourseCatalog,
    ledger: StatusLedger,
    settings: UiSettings,
    last_saved_at: Option<DateTime<Utc>>,
}

impl TrackerSession {
    #[must_use]
    pub fn new(vocabulary: StatusVocabulary) -> Self {
        Self {
            vocabulary,
            catalog: CourseCatalog::default(),
            ledger: StatusLedger::new(),
            settings: UiSettings::default(),
            last_saved_at: None,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: UiSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn vocabulary(&self) -> &StatusVocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn ledger(&self) -> &StatusLedger {
        &self.ledger
    }

    #[must_use]
    pub fn settings(&self) -> &UiSettings {
        &self.settings
    }

    #[must_use]
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    //
    // ─── CATALOG LIFECYCLE ────────────────────────────────────────────────
    //

    /// Replaces the catalog wholesale and resets the ledger with it.
    ///
    /// The ledger annotates exactly one catalog; whatever was tracked
    /// against the previous one does not carry over.
    pub fn install_catalog(&mut self, catalog: CourseCatalog) {
        self.catalog = catalog;
        self.ledger.clear();
        debug!(courses = self.catalog.len(), "installed catalog");
    }

    /// Folds the top-level persisted status block into the ledger.
    pub fn merge_autosave_statuses(&mut self, entries: &BTreeMap<String, String>) -> usize {
        self.ledger.merge_from_persisted(
            entries.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            &self.vocabulary,
        )
    }

    /// Folds every course's embedded status block into the ledger, in
    /// course order. Runs after the top-level block so embedded entries win.
    pub fn merge_embedded_statuses(&mut self) -> usize {
        let Self {
            vocabulary,
            catalog,
            ledger,
            ..
        } = self;
        let mut merged = 0;
        for (_, course) in catalog.iter() {
            if let Some(block) = course.embedded_statuses() {
                merged += ledger.merge_from_persisted(
                    block.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                    vocabulary,
                );
            }
        }
        merged
    }

    /// Installs a freshly uploaded catalog: wholesale replace, then embedded
    /// blocks. Returns the number of embedded entries folded in.
    pub fn load_catalog(&mut self, catalog: CourseCatalog) -> usize {
        self.install_catalog(catalog);
        self.merge_embedded_statuses()
    }

    //
    // ─── STATUS OPERATIONS ────────────────────────────────────────────────
    //

    /// Resolved status for a lecture key. Pure read.
    #[must_use]
    pub fn status_of(&self, key: &LectureKey) -> Status {
        self.ledger.get(&key.encode())
    }

    /// Records a status for one lecture.
    pub fn set_status(&mut self, key: &LectureKey, status: Status) {
        self.ledger.set(key.encode(), status);
    }

    /// Stamps a selection onto every section of `course_id` carrying
    /// `section_title`. Duplicate-titled sections derive identical keys, so
    /// applying to all of them equals applying to one.
    pub fn apply_master(
        &mut self,
        course_id: &str,
        section_title: &str,
        selection: MasterSelection,
    ) {
        let Self {
            catalog, ledger, ..
        } = self;
        let Some(course) = catalog.course(course_id) else {
            return;
        };
        for section in course
            .sections()
            .iter()
            .filter(|section| section.title() == section_title)
        {
            ledger.apply_to_section(course_id, section, selection);
        }
    }

    /// Per-status tallies for one course.
    #[must_use]
    pub fn course_counts(&self, course_id: &str) -> StatusCounts {
        self.ledger.course_counts(course_id)
    }

    //
    // ─── SETTINGS OPERATIONS ──────────────────────────────────────────────
    //

    /// Flips a course's favorite flag and returns the new value.
    pub fn toggle_favorite(&mut self, course_id: &str) -> bool {
        self.settings.toggle_favorite(course_id)
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.settings.set_filter(filter);
    }

    pub fn set_autosave(&mut self, enabled: bool) {
        self.settings.set_autosave(enabled);
    }

    /// Remembers the selected course. Returns whether the selection changed,
    /// which is what decides an immediate settings save.
    pub fn select_course(&mut self, course_id: Option<String>) -> bool {
        if self.settings.selected_course() == course_id.as_deref() {
            return false;
        }
        self.settings.set_selected_course(course_id);
        true
    }

    /// Stamps the moment the session state last reached storage.
    pub fn mark_saved(&mut self, at: DateTime<Utc>) {
        self.last_saved_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(value: serde_json::Value) -> CourseCatalog {
        serde_json::from_value(value).unwrap()
    }

    fn session_with(value: serde_json::Value) -> TrackerSession {
        let mut session = TrackerSession::new(StatusVocabulary::standard());
        session.install_catalog(catalog(value));
        session
    }

    #[test]
    fn installing_a_catalog_resets_the_ledger() {
        let mut session = session_with(json!({ "1": {} }));
        session.set_status(&LectureKey::new("1", "s", "t", "0"), Status::Done);
        assert_eq!(session.ledger().len(), 1);

        session.install_catalog(catalog(json!({ "2": {} })));
        assert!(session.ledger().is_empty());
        assert!(session.catalog().contains("2"));
    }

    fn catalog_with_embedded(key: &LectureKey, raw_status: &str) -> CourseCatalog {
        let raw = format!(
            r#"{{ "1": {{ "statuses": {{ "{}": "{}" }} }} }}"#,
            key.encode(),
            raw_status
        );
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn merge_order_lets_embedded_blocks_win() {
        let key = LectureKey::new("1", "s", "t", "0");
        let mut session = TrackerSession::new(StatusVocabulary::standard());
        session.install_catalog(catalog_with_embedded(&key, "⭐ Important"));

        let mut top_level = BTreeMap::new();
        top_level.insert(key.encode(), "Done".to_string());
        session.merge_autosave_statuses(&top_level);
        assert_eq!(session.status_of(&key), Status::Done);

        session.merge_embedded_statuses();
        assert_eq!(session.status_of(&key), Status::Important);
    }

    #[test]
    fn load_catalog_merges_embedded_blocks_in_one_step() {
        let key = LectureKey::new("1", "s", "t", "0");
        let mut session = TrackerSession::new(StatusVocabulary::standard());
        let merged = session.load_catalog(catalog_with_embedded(&key, "skip"));

        assert_eq!(merged, 1);
        assert_eq!(session.status_of(&key), Status::Skip);
    }

    #[test]
    fn master_apply_reaches_every_section_with_the_title() {
        let mut session = session_with(json!({
            "1": { "curriculum_context": { "data": { "sections": [
                { "title": "S", "items": [ { "title": "a" } ] },
                { "title": "S", "items": [ { "title": "b" } ] },
                { "title": "Other", "items": [ { "title": "c" } ] }
            ] } } }
        }));

        session.apply_master("1", "S", MasterSelection::Selected(Status::Done));

        assert_eq!(session.status_of(&LectureKey::new("1", "S", "a", "0")), Status::Done);
        assert_eq!(session.status_of(&LectureKey::new("1", "S", "b", "0")), Status::Done);
        assert_eq!(
            session.status_of(&LectureKey::new("1", "Other", "c", "0")),
            Status::NotDone
        );
    }

    #[test]
    fn master_apply_on_an_unknown_course_is_inert() {
        let mut session = session_with(json!({ "1": {} }));
        session.apply_master("missing", "S", MasterSelection::Selected(Status::Done));
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn select_course_reports_actual_changes_only() {
        let mut session = session_with(json!({ "1": {}, "2": {} }));
        assert!(session.select_course(Some("1".to_string())));
        assert!(!session.select_course(Some("1".to_string())));
        assert!(session.select_course(Some("2".to_string())));
        assert_eq!(session.settings().selected_course(), Some("2"));
    }
}
