use std::sync::Arc;

use tracing::{debug, info};

use course_core::Clock;
use course_core::model::{
    CourseCatalog, LectureKey, MasterSelection, Status, StatusFilter, StatusVocabulary,
};
use storage::repository::{AutosaveDocument, AutosaveRepository, SettingsRepository};

use super::service::TrackerSession;
use crate::error::SessionError;

/// One presentation-originated event.
///
/// The presentation layer translates a control interaction into an action
/// and hands it to [`TrackerService::apply`]; it then re-reads the session
/// for whatever it renders next. There is no implicit propagation.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Record a status for one lecture.
    SetStatus { key: LectureKey, status: Status },
    /// Stamp a master selection onto a whole section.
    ApplyToSection {
        course_id: String,
        section_title: String,
        selection: MasterSelection,
    },
    /// Remember which course is open.
    SelectCourse { course_id: String },
    /// Flip a course's favorite flag.
    ToggleFavorite { course_id: String },
    /// Change the lecture filter.
    SetFilter { filter: StatusFilter },
    /// Enable or disable save-after-every-edit.
    SetAutosave { enabled: bool },
    /// Persist catalog and ledger now.
    Save,
    /// Persist the settings blob now.
    SaveSettings,
}

/// What handling one action did beyond mutating the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionOutcome {
    /// The autosave document reached storage.
    pub saved: bool,
    /// The settings blob reached storage.
    pub settings_saved: bool,
}

/// Orchestrates session lifecycle and persistence around [`TrackerSession`].
///
/// Owns the clock and the repositories; the session itself stays pure. Every
/// action runs to completion before the next one starts.
#[derive(Clone)]
pub struct TrackerService {
    clock: Clock,
    autosaves: Arc<dyn AutosaveRepository>,
    settings: Arc<dyn SettingsRepository>,
    vocabulary: StatusVocabulary,
}

impl TrackerService {
    #[must_use]
    pub fn new(
        clock: Clock,
        autosaves: Arc<dyn AutosaveRepository>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            clock,
            autosaves,
            settings,
            vocabulary: StatusVocabulary::standard(),
        }
    }

    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: StatusVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    #[must_use]
    pub fn vocabulary(&self) -> &StatusVocabulary {
        &self.vocabulary
    }

    /// Open a session from persisted state.
    ///
    /// Precedence: a saved autosave document wins; otherwise the preload
    /// catalog is installed when settings allow it; otherwise the session
    /// starts empty and waits for an upload.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when persisted state exists but
    /// cannot be read.
    pub fn open_session(
        &self,
        preload: Option<CourseCatalog>,
    ) -> Result<TrackerSession, SessionError> {
        let settings = self.settings.load_settings()?.unwrap_or_default();
        let mut session = TrackerSession::new(self.vocabulary.clone()).with_settings(settings);

        match self.autosaves.load_autosave()? {
            Some(document) => {
                let (catalog, statuses) = document.into_parts();
                session.install_catalog(catalog);
                let top_level = session.merge_autosave_statuses(&statuses);
                let embedded = session.merge_embedded_statuses();
                info!(top_level, embedded, "restored autosave");
            }
            None => {
                if session.settings().preload() {
                    if let Some(catalog) = preload {
                        let embedded = session.load_catalog(catalog);
                        info!(embedded, "installed preload catalog");
                    }
                } else {
                    debug!("preload disabled; session starts empty");
                }
            }
        }
        Ok(session)
    }

    /// Parse an uploaded export and install it as the session's catalog.
    ///
    /// Returns the number of embedded status entries folded in.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Parse` when the payload is not a catalog
    /// document.
    pub fn load_upload(
        &self,
        session: &mut TrackerSession,
        raw: &str,
    ) -> Result<usize, SessionError> {
        let catalog: CourseCatalog = serde_json::from_str(raw)?;
        let embedded = session.load_catalog(catalog);
        info!(embedded, "installed uploaded catalog");
        Ok(embedded)
    }

    /// Run one action to completion.
    ///
    /// Every mutating action, whether it touches the ledger or the
    /// settings, is followed by an automatic save while the autosave
    /// setting is on and a catalog is loaded, so enabling autosave also
    /// flushes whatever edits were made before it. Selecting a different
    /// course persists the settings immediately; other settings edits stay
    /// in memory until an explicit [`Action::SaveSettings`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownCourse` for actions naming a course the
    /// catalog does not have, and `SessionError::Storage` when a triggered
    /// save fails.
    pub fn apply(
        &self,
        session: &mut TrackerSession,
        action: Action,
    ) -> Result<ActionOutcome, SessionError> {
        let mut outcome = ActionOutcome::default();
        let mut mutated = false;

        match action {
            Action::SetStatus { key, status } => {
                session.set_status(&key, status);
                mutated = true;
            }
            Action::ApplyToSection {
                course_id,
                section_title,
                selection,
            } => {
                if !session.catalog().contains(&course_id) {
                    return Err(SessionError::UnknownCourse(course_id));
                }
                session.apply_master(&course_id, &section_title, selection);
                mutated = matches!(selection, MasterSelection::Selected(_));
            }
            Action::SelectCourse { course_id } => {
                if !session.catalog().contains(&course_id) {
                    return Err(SessionError::UnknownCourse(course_id));
                }
                if session.select_course(Some(course_id)) {
                    self.save_settings(session)?;
                    outcome.settings_saved = true;
                    mutated = true;
                }
            }
            Action::ToggleFavorite { course_id } => {
                let favorite = session.toggle_favorite(&course_id);
                debug!(course_id, favorite, "toggled favorite");
                mutated = true;
            }
            Action::SetFilter { filter } => {
                session.set_filter(filter);
                mutated = true;
            }
            Action::SetAutosave { enabled } => {
                session.set_autosave(enabled);
                mutated = true;
            }
            Action::Save => {
                self.save(session)?;
                outcome.saved = true;
            }
            Action::SaveSettings => {
                self.save_settings(session)?;
                outcome.settings_saved = true;
            }
        }

        // Gate mirrors the interactive flow: once the flag is on, every
        // edit ends with a flush, but only while a catalog is loaded.
        if mutated && session.settings().autosave() && !session.catalog().is_empty() {
            self.save(session)?;
            outcome.saved = true;
        }
        Ok(outcome)
    }

    /// Persist catalog and ledger as one autosave document.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the document cannot be written.
    pub fn save(&self, session: &mut TrackerSession) -> Result<(), SessionError> {
        let document = AutosaveDocument::from_state(session.catalog(), session.ledger());
        self.autosaves.save_autosave(&document)?;
        session.mark_saved(self.clock.now());
        debug!(entries = session.ledger().len(), "saved tracker state");
        Ok(())
    }

    /// Persist the settings blob.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the blob cannot be written.
    pub fn save_settings(&self, session: &TrackerSession) -> Result<(), SessionError> {
        self.settings.save_settings(session.settings())?;
        Ok(())
    }
}
