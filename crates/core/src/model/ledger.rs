use std::collections::{BTreeMap, HashMap};

use crate::model::catalog::Section;
use crate::model::key::LectureKey;
use crate::model::status::{MasterSelection, Status, StatusVocabulary};

//
// ─── STATUS LEDGER ────────────────────────────────────────────────────────────
//

/// The mutable per-lecture progress record: opaque string key → status.
///
/// Keys are normally encoded [`LectureKey`]s, but the ledger accepts any
/// string so entries from older files round-trip untouched whatever scheme
/// produced them. Entries materialize lazily: only `set`, a bulk apply, or a
/// merge creates one. Reads never do.
///
/// The ledger lives exactly as long as the catalog it annotates; installing
/// a new catalog replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusLedger {
    entries: HashMap<String, Status>,
}

impl StatusLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Status recorded under `key`, or the default when there is no entry.
    ///
    /// A pure read: an absent key stays absent afterwards.
    #[must_use]
    pub fn get(&self, key: &str) -> Status {
        self.entries.get(key).copied().unwrap_or_default()
    }

    /// Records `status` under `key`, overwriting any previous entry.
    pub fn set(&mut self, key: impl Into<String>, status: Status) {
        self.entries.insert(key.into(), status);
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Status)> {
        self.entries.iter().map(|(key, status)| (key.as_str(), *status))
    }

    /// Stamps one status onto every item of a section.
    ///
    /// Keys are derived per item with the positional fallback, identical to
    /// what an individual `set` against that item would use. The placeholder
    /// selection is an exact no-op.
    pub fn apply_to_section(
        &mut self,
        course_id: &str,
        section: &Section,
        selection: MasterSelection,
    ) {
        let status = match selection {
            MasterSelection::NoSelection => return,
            MasterSelection::Selected(status) => status,
        };
        for (position, item) in section.items().iter().enumerate() {
            let key = LectureKey::derive(course_id, section, position, item);
            self.set(key.encode(), status);
        }
    }

    /// The persisted rendition: every key as-is, every status as its plain
    /// spelling, in deterministic key order.
    #[must_use]
    pub fn to_persisted_form(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(key, status)| (key.clone(), status.plain().to_string()))
            .collect()
    }

    /// Folds persisted entries into the ledger.
    ///
    /// Every raw value passes through [`StatusVocabulary::normalize`], so
    /// whatever spelling (or garbage) a file holds, the ledger stays
    /// canonical. Keys are taken verbatim; an entry already present is
    /// overwritten, which is what gives later sources precedence. Returns
    /// the number of entries folded in.
    pub fn merge_from_persisted<'a, I>(
        &mut self,
        entries: I,
        vocabulary: &StatusVocabulary,
    ) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut merged = 0;
        for (key, raw) in entries {
            self.entries.insert(key.to_string(), vocabulary.normalize(raw));
            merged += 1;
        }
        merged
    }

    /// Per-status tallies over the entries of one course.
    ///
    /// Membership is decided by the unambiguous encoded course prefix, so
    /// only keys produced by the current scheme aggregate; foreign keys kept
    /// from older files are deliberately left out.
    #[must_use]
    pub fn course_counts(&self, course_id: &str) -> StatusCounts {
        let prefix = LectureKey::course_prefix(course_id);
        let mut counts = StatusCounts::default();
        for (key, status) in &self.entries {
            if key.starts_with(&prefix) {
                counts.counts[status.ordinal()] += 1;
            }
        }
        counts
    }
}

//
// ─── STATUS COUNTS ────────────────────────────────────────────────────────────
//

/// Per-status tallies for one course, in canonical status order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    counts: [usize; 8],
}

impl StatusCounts {
    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        self.counts[status.ordinal()]
    }

    /// Total tracked entries, whatever their status.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Completion percentage.
    ///
    /// `Done` and `Important` count as achieved. `Maybe` and `Ignore` are
    /// excluded from the denominator entirely: undecided or out-of-scope
    /// items neither help nor hurt. An empty denominator yields `0.0`.
    #[must_use]
    pub fn completion_percent(&self) -> f64 {
        let achieved = self.count(Status::Done) + self.count(Status::Important);
        let denominator = achieved
            + self.count(Status::InProgress)
            + self.count(Status::Skip)
            + self.count(Status::ComeBackLater)
            + self.count(Status::NotDone);
        if denominator == 0 {
            0.0
        } else {
            achieved as f64 / denominator as f64 * 100.0
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
