use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── STATUS ───────────────────────────────────────────────────────────────────
//

/// Tracking state of a single lecture item.
///
/// The vocabulary is closed: every ledger entry holds exactly one of these
/// eight values. The plain spelling (`"Not Done"`, `"Done"`, …) is the
/// canonical persisted form; decorated display spellings and badge colors
/// live in [`StatusVocabulary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Status {
    /// Not started. The default for any key with no entry.
    #[default]
    NotDone,
    /// Started but not finished.
    InProgress,
    /// Finished.
    Done,
    /// Finished and flagged as worth revisiting.
    Important,
    /// Deliberately deferred.
    ComeBackLater,
    /// Skipped on purpose; still counts against completion.
    Skip,
    /// Undecided. Excluded from the completion denominator.
    Maybe,
    /// Out of scope. Excluded from the completion denominator.
    Ignore,
}

impl Status {
    /// Every status in canonical order. The first element is the default.
    pub const ALL: [Status; 8] = [
        Status::NotDone,
        Status::InProgress,
        Status::Done,
        Status::Important,
        Status::ComeBackLater,
        Status::Skip,
        Status::Maybe,
        Status::Ignore,
    ];

    /// Canonical plain spelling, the form written to persisted files.
    #[must_use]
    pub fn plain(self) -> &'static str {
        match self {
            Status::NotDone => "Not Done",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
            Status::Important => "Important",
            Status::ComeBackLater => "Come Back Later",
            Status::Skip => "Skip",
            Status::Maybe => "Maybe",
            Status::Ignore => "Ignore",
        }
    }

    /// Exact-match lookup of a plain spelling.
    #[must_use]
    pub fn from_plain(value: &str) -> Option<Self> {
        Status::ALL.into_iter().find(|s| s.plain() == value)
    }

    /// Position in [`Status::ALL`].
    pub(crate) fn ordinal(self) -> usize {
        match self {
            Status::NotDone => 0,
            Status::InProgress => 1,
            Status::Done => 2,
            Status::Important => 3,
            Status::ComeBackLater => 4,
            Status::Skip => 5,
            Status::Maybe => 6,
            Status::Ignore => 7,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plain())
    }
}

//
// ─── VOCABULARY ───────────────────────────────────────────────────────────────
//

/// Display spelling and badge color for one status.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusStyle {
    display: String,
    color: String,
}

/// Immutable mapping between the canonical statuses and their decorated
/// display spellings.
///
/// Constructed once at startup and passed by reference to every component
/// that converts between spellings; there is no ambient global table. The
/// conversions here are the single chokepoint for turning raw strings from
/// persisted files or UI controls into [`Status`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusVocabulary {
    styles: [StatusStyle; 8],
}

/// Display spelling and badge color per status, in canonical order.
const STANDARD_STYLES: [(&str, &str); 8] = [
    ("❌ Not Done", "#e74c3c"),
    ("⏳ In Progress", "#f39c12"),
    ("✅ Done", "#27ae60"),
    ("⭐ Important", "#f1c40f"),
    ("⏰ Come Back Later", "#f1c40f"),
    ("⏭ Skip", "#7f8c8d"),
    ("⏳ Maybe", "#3498db"),
    ("🚫 Ignore", "#95a5a6"),
];

impl StatusVocabulary {
    /// The standard emoji-decorated vocabulary.
    ///
    /// Display spellings are pairwise distinct and distinct from every plain
    /// spelling after folding, so `normalize` never has two candidates.
    #[must_use]
    pub fn standard() -> Self {
        let styles = STANDARD_STYLES.map(|(display, color)| StatusStyle {
            display: display.to_string(),
            color: color.to_string(),
        });
        Self { styles }
    }

    /// Decorated display spelling for a status.
    #[must_use]
    pub fn display(&self, status: Status) -> &str {
        &self.styles[status.ordinal()].display
    }

    /// Badge color (hex) for a status.
    #[must_use]
    pub fn color(&self, status: Status) -> &str {
        &self.styles[status.ordinal()].color
    }

    /// Display spellings in canonical order, as offered by selection controls.
    pub fn display_options(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(|style| style.display.as_str())
    }

    /// Converts a plain spelling to its display spelling.
    ///
    /// Unrecognized input is returned unchanged so that forward-compatible
    /// statuses already present in older data survive a direct conversion.
    #[must_use]
    pub fn to_display(&self, plain: &str) -> String {
        match Status::from_plain(plain) {
            Some(status) => self.display(status).to_string(),
            None => plain.to_string(),
        }
    }

    /// Converts a display spelling back to its plain spelling.
    ///
    /// Unrecognized input is returned unchanged, mirroring `to_display`.
    #[must_use]
    pub fn to_plain(&self, display: &str) -> String {
        match self.parse_display(display) {
            Some(status) => status.plain().to_string(),
            None => display.to_string(),
        }
    }

    /// Exact-match lookup of a display spelling.
    #[must_use]
    pub fn parse_display(&self, display: &str) -> Option<Status> {
        Status::ALL
            .into_iter()
            .find(|s| self.display(*s) == display)
    }

    /// Resolves an arbitrary raw value to a status.
    ///
    /// Trims and lowercases for comparison only, matches against both the
    /// plain and the display spelling of every status, and falls back to
    /// [`Status::NotDone`] when nothing matches. Every load and merge path
    /// funnels raw strings through here, which keeps the ledger canonical.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> Status {
        let folded = raw.trim().to_lowercase();
        Status::ALL
            .into_iter()
            .find(|s| {
                s.plain().to_lowercase() == folded
                    || self.display(*s).to_lowercase() == folded
            })
            .unwrap_or_default()
    }
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

//
// ─── MASTER SELECTION ─────────────────────────────────────────────────────────
//

/// State of a section-wide bulk control.
///
/// Bulk controls offer the status list behind a leading `"---"` entry; while
/// that entry is selected the control is inert and applying it must not touch
/// the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterSelection {
    /// The `"---"` placeholder: apply is a no-op.
    NoSelection,
    /// A concrete status to stamp onto every item of the section.
    Selected(Status),
}

impl MasterSelection {
    /// The placeholder label shown before any choice is made.
    pub const NO_SELECTION_LABEL: &'static str = "---";

    /// Parses a raw control value: the placeholder maps to `NoSelection`,
    /// anything else is normalized.
    #[must_use]
    pub fn parse(vocabulary: &StatusVocabulary, raw: &str) -> Self {
        if raw.trim() == Self::NO_SELECTION_LABEL {
            MasterSelection::NoSelection
        } else {
            MasterSelection::Selected(vocabulary.normalize(raw))
        }
    }
}

//
// ─── STATUS FILTER ────────────────────────────────────────────────────────────
//

/// Persisted sidebar filter: show everything, or only one status.
///
/// The wire form is `"All"` or a display spelling; unrecognized values
/// degrade to `All` so an old or hand-edited settings file never fails.
/// Wire spellings are fixed to the standard vocabulary: the serde path
/// carries no vocabulary argument, so sessions running a custom vocabulary
/// still read and write filters in the standard spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    /// The wire value for the unfiltered state.
    pub const ALL_LABEL: &'static str = "All";

    /// Whether a row with this status passes the filter.
    #[must_use]
    pub fn admits(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == wanted,
        }
    }
}

impl From<String> for StatusFilter {
    fn from(value: String) -> Self {
        let vocabulary = StatusVocabulary::standard();
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case(Self::ALL_LABEL) {
            return StatusFilter::All;
        }
        match vocabulary.parse_display(trimmed) {
            Some(status) => StatusFilter::Only(status),
            None => match Status::from_plain(trimmed) {
                Some(status) => StatusFilter::Only(status),
                None => StatusFilter::All,
            },
        }
    }
}

impl From<StatusFilter> for String {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::All => StatusFilter::ALL_LABEL.to_string(),
            StatusFilter::Only(status) => {
                StatusVocabulary::standard().display(status).to_string()
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
