use std::fmt;
use thiserror::Error;

use crate::model::catalog::{LectureItem, Section};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while decoding an encoded key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("missing ':' after length prefix at byte {0}")]
    MissingSeparator(usize),
    #[error("invalid length prefix at byte {0}")]
    InvalidLength(usize),
    #[error("component at byte {0} runs past the end of the key")]
    Truncated(usize),
    #[error("component at byte {0} is not valid UTF-8")]
    NotUtf8(usize),
    #[error("expected four components, found {0}")]
    WrongComponentCount(usize),
    #[error("trailing bytes after the last component")]
    TrailingBytes,
}

/// Number of components in a lecture key.
const COMPONENT_COUNT: usize = 4;

//
// ─── LECTURE KEY ──────────────────────────────────────────────────────────────
//

/// Identity of one lecture's status slot.
///
/// A key is the composite of course identifier, section title, lecture title
/// and item index. Derivation is deterministic and total: every item yields a
/// key, with documented defaults standing in for absent fields. Two items
/// with identical components share a slot on purpose; the later write wins.
///
/// The encoded form length-prefixes every component (`{byte_len}:{bytes}`),
/// so component boundaries survive arbitrary punctuation in titles. Distinct
/// keys never encode equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LectureKey {
    course_id: String,
    section_title: String,
    lecture_title: String,
    item_index: String,
}

impl LectureKey {
    /// Section title used when the catalog has none.
    pub const DEFAULT_SECTION_TITLE: &'static str = "Untitled Section";
    /// Lecture title used when the catalog has none.
    pub const DEFAULT_LECTURE_TITLE: &'static str = "Untitled";

    #[must_use]
    pub fn new(
        course_id: impl Into<String>,
        section_title: impl Into<String>,
        lecture_title: impl Into<String>,
        item_index: impl Into<String>,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            section_title: section_title.into(),
            lecture_title: lecture_title.into(),
            item_index: item_index.into(),
        }
    }

    /// Derives the key for one item of a section.
    ///
    /// `position` is the zero-based index of the item within the section and
    /// stands in when the item carries no usable `object_index`.
    #[must_use]
    pub fn derive(
        course_id: &str,
        section: &Section,
        position: usize,
        item: &LectureItem,
    ) -> Self {
        Self::new(
            course_id,
            section.title(),
            item.key_title(),
            item.index_or(position),
        )
    }

    #[must_use]
    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    #[must_use]
    pub fn section_title(&self) -> &str {
        &self.section_title
    }

    #[must_use]
    pub fn lecture_title(&self) -> &str {
        &self.lecture_title
    }

    #[must_use]
    pub fn item_index(&self) -> &str {
        &self.item_index
    }

    /// Encoded ledger form: four length-prefixed components, concatenated.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for component in [
            &self.course_id,
            &self.section_title,
            &self.lecture_title,
            &self.item_index,
        ] {
            push_component(&mut out, component);
        }
        out
    }

    /// Inverse of [`LectureKey::encode`].
    ///
    /// Byte-wise parsing: hostile or legacy input yields a [`KeyError`],
    /// never a panic.
    ///
    /// # Errors
    ///
    /// Returns `KeyError` when the input is not exactly four well-formed
    /// length-prefixed components.
    pub fn decode(encoded: &str) -> Result<Self, KeyError> {
        let mut components = Vec::with_capacity(COMPONENT_COUNT);
        let mut rest = Cursor::new(encoded);
        while !rest.at_end() {
            if components.len() == COMPONENT_COUNT {
                return Err(KeyError::TrailingBytes);
            }
            components.push(rest.take_component()?);
        }
        if components.len() != COMPONENT_COUNT {
            return Err(KeyError::WrongComponentCount(components.len()));
        }
        let mut parts = components.into_iter();
        // Four items by the check above.
        Ok(Self {
            course_id: parts.next().unwrap_or_default(),
            section_title: parts.next().unwrap_or_default(),
            lecture_title: parts.next().unwrap_or_default(),
            item_index: parts.next().unwrap_or_default(),
        })
    }

    /// Encoded first component of every key belonging to `course_id`.
    ///
    /// The length tag makes string prefix filtering unambiguous: keys of
    /// course `"ab"` start `2:ab` and can never be shadowed by keys of a
    /// course whose identifier merely starts with `"ab"`.
    #[must_use]
    pub fn course_prefix(course_id: &str) -> String {
        let mut out = String::new();
        push_component(&mut out, course_id);
        out
    }
}

impl fmt::Display for LectureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

//
// ─── SECTION MASTER KEY ───────────────────────────────────────────────────────
//

/// Identity of a section-wide bulk control.
///
/// Master keys name controls, not ledger slots; the ledger never stores one.
/// The encoded form is the course and section components followed by the bare
/// literal `master`, which no lecture key can produce: after a lecture key's
/// second component the next byte is always a length digit, never `m`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionMasterKey {
    course_id: String,
    section_title: String,
}

impl SectionMasterKey {
    /// Fixed suffix marking a master key.
    pub const SUFFIX: &'static str = "master";

    #[must_use]
    pub fn new(course_id: impl Into<String>, section_title: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            section_title: section_title.into(),
        }
    }

    /// Derives the master key for a section of a course.
    #[must_use]
    pub fn derive(course_id: &str, section: &Section) -> Self {
        Self::new(course_id, section.title())
    }

    #[must_use]
    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    #[must_use]
    pub fn section_title(&self) -> &str {
        &self.section_title
    }

    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        push_component(&mut out, &self.course_id);
        push_component(&mut out, &self.section_title);
        out.push_str(Self::SUFFIX);
        out
    }
}

impl fmt::Display for SectionMasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

//
// ─── ENCODING HELPERS ─────────────────────────────────────────────────────────
//

fn push_component(out: &mut String, component: &str) {
    out.push_str(&component.len().to_string());
    out.push(':');
    out.push_str(component);
}

/// Byte cursor over an encoded key.
struct Cursor<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> Cursor<'a> {
    fn new(encoded: &'a str) -> Self {
        Self {
            bytes: encoded.as_bytes(),
            at: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.at >= self.bytes.len()
    }

    fn take_component(&mut self) -> Result<String, KeyError> {
        let start = self.at;
        let mut len: usize = 0;
        let mut digits = 0;
        while let Some(byte) = self.bytes.get(self.at) {
            match byte {
                b'0'..=b'9' => {
                    len = len
                        .checked_mul(10)
                        .and_then(|l| l.checked_add(usize::from(byte - b'0')))
                        .ok_or(KeyError::InvalidLength(start))?;
                    digits += 1;
                    self.at += 1;
                }
                b':' => {
                    if digits == 0 {
                        return Err(KeyError::InvalidLength(start));
                    }
                    self.at += 1;
                    let body_start = self.at;
                    let body_end = body_start
                        .checked_add(len)
                        .filter(|end| *end <= self.bytes.len())
                        .ok_or(KeyError::Truncated(body_start))?;
                    let body = std::str::from_utf8(&self.bytes[body_start..body_end])
                        .map_err(|_| KeyError::NotUtf8(body_start))?;
                    self.at = body_end;
                    return Ok(body.to_string());
                }
                _ => return Err(KeyError::MissingSeparator(self.at)),
            }
        }
        Err(KeyError::MissingSeparator(self.at))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
