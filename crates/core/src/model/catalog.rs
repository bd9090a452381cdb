use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

//
// ─── CATALOG ──────────────────────────────────────────────────────────────────
//

/// Externally produced course tree: courses keyed by identifier.
///
/// The catalog is read-only input. Every field below is optional and every
/// accessor substitutes a documented default, because the producing exporter
/// omits fields freely and a malformed record must degrade, never fail.
/// Unrecognized fields are captured and written back on save, so a document
/// that merely passes through the tracker keeps everything the exporter put
/// in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseCatalog {
    courses: BTreeMap<String, Course>,
}

impl CourseCatalog {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    #[must_use]
    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.get(course_id)
    }

    #[must_use]
    pub fn contains(&self, course_id: &str) -> bool {
        self.courses.contains_key(course_id)
    }

    /// Courses in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Course)> {
        self.courses.iter().map(|(id, course)| (id.as_str(), course))
    }
}

//
// ─── COURSE ───────────────────────────────────────────────────────────────────
//

/// One course record: metadata, curriculum, and optionally a block of
/// statuses embedded by whatever produced the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    instructor: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_nested",
        skip_serializing_if = "Option::is_none"
    )]
    curriculum_context: Option<CurriculumContext>,
    #[serde(
        default,
        deserialize_with = "lenient_status_block",
        skip_serializing_if = "Option::is_none"
    )]
    statuses: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl Course {
    #[must_use]
    pub fn instructor(&self) -> &str {
        self.instructor.as_deref().unwrap_or("Unknown")
    }

    /// Raw status entries embedded in the course record, if any.
    ///
    /// These merge into the ledger after the top-level autosave block and are
    /// otherwise carried along untouched.
    #[must_use]
    pub fn embedded_statuses(&self) -> Option<&BTreeMap<String, String>> {
        self.statuses.as_ref()
    }

    #[must_use]
    pub fn curriculum(&self) -> Option<&Curriculum> {
        self.curriculum_context.as_ref().and_then(|ctx| ctx.data.as_ref())
    }

    /// Course title, `"Untitled"` when the record has none.
    #[must_use]
    pub fn title(&self) -> &str {
        self.curriculum()
            .and_then(Curriculum::raw_title)
            .unwrap_or("Untitled")
    }

    /// Course landing URL, `"#"` when the record has none. Opaque
    /// passthrough; nothing here validates it.
    #[must_use]
    pub fn url(&self) -> &str {
        self.curriculum()
            .and_then(Curriculum::raw_url)
            .unwrap_or("#")
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        self.curriculum().map_or(&[], Curriculum::sections)
    }

    #[must_use]
    pub fn published_lecture_count(&self) -> u32 {
        self.curriculum()
            .map_or(0, Curriculum::published_lecture_count)
    }

    /// Human-readable total length, `"Unknown"` when absent.
    #[must_use]
    pub fn estimated_length(&self) -> &str {
        self.curriculum()
            .map_or("Unknown", Curriculum::estimated_length)
    }
}

/// Wrapper level the exporter emits between a course and its curriculum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurriculumContext {
    #[serde(
        default,
        deserialize_with = "lenient_nested",
        skip_serializing_if = "Option::is_none"
    )]
    data: Option<Curriculum>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

//
// ─── CURRICULUM ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    course_title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    course_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    num_of_published_lectures: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    estimated_content_length_text: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_rows",
        skip_serializing_if = "Option::is_none"
    )]
    sections: Option<Vec<Section>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl Curriculum {
    fn raw_title(&self) -> Option<&str> {
        self.course_title.as_deref()
    }

    fn raw_url(&self) -> Option<&str> {
        self.course_url.as_deref()
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        self.sections.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn published_lecture_count(&self) -> u32 {
        self.num_of_published_lectures.unwrap_or(0)
    }

    #[must_use]
    pub fn estimated_length(&self) -> &str {
        self.estimated_content_length_text
            .as_deref()
            .unwrap_or("Unknown")
    }
}

//
// ─── SECTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    content_length_text: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    lecture_count: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_rows",
        skip_serializing_if = "Option::is_none"
    )]
    items: Option<Vec<LectureItem>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl Section {
    /// Section title, `"Untitled Section"` when absent. Used both for
    /// display and as a key component, so the default is part of identity.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled Section")
    }

    /// Human-readable section length, `"Unknown"` when absent.
    #[must_use]
    pub fn length_text(&self) -> &str {
        self.content_length_text.as_deref().unwrap_or("Unknown")
    }

    /// Lecture count as claimed by the exporter, zero when absent. Not
    /// derived from `items`; the exporter's number is reported as-is.
    #[must_use]
    pub fn lecture_count(&self) -> u32 {
        self.lecture_count.unwrap_or(0)
    }

    #[must_use]
    pub fn items(&self) -> &[LectureItem] {
        self.items.as_deref().unwrap_or(&[])
    }
}

//
// ─── LECTURE ITEM ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LectureItem {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    content_summary: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    learn_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object_index: Option<Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl LectureItem {
    /// Display title, `"Untitled Item"` when absent.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled Item")
    }

    /// Title component used in identity keys, `"Untitled"` when absent.
    ///
    /// The key default deliberately differs from the display default; both
    /// are part of the established on-disk identity of older data.
    #[must_use]
    pub fn key_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// Duration text, `"Unknown"` when absent.
    #[must_use]
    pub fn duration(&self) -> &str {
        self.content_summary.as_deref().unwrap_or("Unknown")
    }

    /// Link target, `"#"` when absent. Opaque passthrough.
    #[must_use]
    pub fn link(&self) -> &str {
        self.learn_url.as_deref().unwrap_or("#")
    }

    /// Index component used in identity keys.
    ///
    /// The exporter's `object_index` wins when it is a string or a number;
    /// anything else falls back to the item's zero-based position within its
    /// section, rendered as a string.
    #[must_use]
    pub fn index_or(&self, position: usize) -> String {
        match &self.object_index {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => position.to_string(),
        }
    }
}

//
// ─── LENIENT FIELDS ───────────────────────────────────────────────────────────
//

// Exports in the wild carry wrong-typed values as freely as missing ones,
// and a field-level mismatch must degrade like absence instead of failing
// the whole document. Every declared field funnels through one of these.

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => {
            number.as_u64().and_then(|n| u32::try_from(n).ok())
        }
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_status_block<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(entries)) = value else {
        return Ok(None);
    };
    let block = entries
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            Value::Number(number) => Some((key, number.to_string())),
            _ => None,
        })
        .collect();
    Ok(Some(block))
}

fn lenient_nested<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

fn lenient_rows<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(elements)) = value else {
        return Ok(None);
    };
    Ok(Some(
        elements
            .into_iter()
            .filter_map(|element| serde_json::from_value(element).ok())
            .collect(),
    ))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog_from(value: Value) -> CourseCatalog {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let catalog = catalog_from(json!({ "101": {} }));
        let course = catalog.course("101").unwrap();

        assert_eq!(course.title(), "Untitled");
        assert_eq!(course.url(), "#");
        assert_eq!(course.instructor(), "Unknown");
        assert_eq!(course.estimated_length(), "Unknown");
        assert_eq!(course.published_lecture_count(), 0);
        assert!(course.sections().is_empty());
        assert!(course.embedded_statuses().is_none());
    }

    #[test]
    fn wrong_typed_fields_degrade_like_missing_ones() {
        let catalog = catalog_from(json!({
            "101": {
                "instructor": 5,
                "statuses": ["not", "a", "map"],
                "curriculum_context": {
                    "data": {
                        "course_title": true,
                        "num_of_published_lectures": "12",
                        "sections": [
                            {
                                "title": 3,
                                "lecture_count": { "total": 4 },
                                "items": [
                                    { "title": 7, "learn_url": ["nope"] },
                                    "stray"
                                ]
                            }
                        ]
                    }
                }
            }
        }));
        let course = catalog.course("101").unwrap();

        // Numbers read as their string rendition; anything else is absent.
        assert_eq!(course.instructor(), "5");
        assert!(course.embedded_statuses().is_none());
        assert_eq!(course.title(), "Untitled");
        assert_eq!(course.published_lecture_count(), 12);

        let section = &course.sections()[0];
        assert_eq!(section.title(), "3");
        assert_eq!(section.lecture_count(), 0);
        assert_eq!(section.items().len(), 1);
        assert_eq!(section.items()[0].title(), "7");
        assert_eq!(section.items()[0].link(), "#");
    }

    #[test]
    fn wrong_typed_wrappers_read_as_empty_courses() {
        let catalog = catalog_from(json!({
            "a": { "curriculum_context": "trimmed" },
            "b": { "curriculum_context": { "data": 9 } }
        }));

        assert_eq!(catalog.course("a").unwrap().title(), "Untitled");
        assert!(catalog.course("b").unwrap().sections().is_empty());
    }

    #[test]
    fn embedded_status_values_tolerate_numbers() {
        let catalog = catalog_from(json!({
            "c": { "statuses": { "a": "Done", "b": 2, "c": [1] } }
        }));
        let statuses = catalog.course("c").unwrap().embedded_statuses().unwrap();

        assert_eq!(statuses.get("a").map(String::as_str), Some("Done"));
        assert_eq!(statuses.get("b").map(String::as_str), Some("2"));
        assert!(!statuses.contains_key("c"));
    }

    #[test]
    fn nested_fields_resolve_through_the_context_wrapper() {
        let catalog = catalog_from(json!({
            "101": {
                "instructor": "Ada",
                "curriculum_context": {
                    "data": {
                        "course_title": "Rust Basics",
                        "course_url": "https://example.test/rust",
                        "num_of_published_lectures": 12,
                        "estimated_content_length_text": "3h 20m",
                        "sections": [
                            {
                                "title": "Intro",
                                "content_length_text": "12min",
                                "lecture_count": 2,
                                "items": [
                                    { "title": "Welcome", "object_index": 1 },
                                    { "content_summary": "04:10" }
                                ]
                            }
                        ]
                    }
                }
            }
        }));
        let course = catalog.course("101").unwrap();

        assert_eq!(course.title(), "Rust Basics");
        assert_eq!(course.instructor(), "Ada");
        assert_eq!(course.published_lecture_count(), 12);
        let section = &course.sections()[0];
        assert_eq!(section.title(), "Intro");
        assert_eq!(section.length_text(), "12min");
        assert_eq!(section.lecture_count(), 2);
        assert_eq!(section.items()[0].title(), "Welcome");
        assert_eq!(section.items()[1].title(), "Untitled Item");
        assert_eq!(section.items()[1].key_title(), "Untitled");
        assert_eq!(section.items()[1].duration(), "04:10");
    }

    #[test]
    fn object_index_prefers_the_exporter_value() {
        let catalog = catalog_from(json!({
            "c": { "curriculum_context": { "data": { "sections": [ { "items": [
                { "object_index": 7 },
                { "object_index": "a-b" },
                { "object_index": null },
                {}
            ] } ] } } }
        }));
        let items = catalog.course("c").unwrap().sections()[0].items();

        assert_eq!(items[0].index_or(0), "7");
        assert_eq!(items[1].index_or(1), "a-b");
        assert_eq!(items[2].index_or(2), "2");
        assert_eq!(items[3].index_or(3), "3");
    }

    #[test]
    fn embedded_status_blocks_are_exposed() {
        let catalog = catalog_from(json!({
            "c": { "statuses": { "some-key": "Done" } }
        }));
        let statuses = catalog.course("c").unwrap().embedded_statuses().unwrap();
        assert_eq!(statuses.get("some-key").map(String::as_str), Some("Done"));
    }

    #[test]
    fn foreign_fields_survive_a_round_trip() {
        let original = json!({
            "101": {
                "price": "free",
                "curriculum_context": {
                    "locale": "en",
                    "data": {
                        "rating": 4.7,
                        "sections": [
                            { "id": 9, "items": [ { "kind": "video", "title": "A" } ] }
                        ]
                    }
                }
            }
        });
        let catalog = catalog_from(original.clone());
        let written = serde_json::to_value(&catalog).unwrap();
        assert_eq!(written, original);
    }

    #[test]
    fn absent_collections_stay_absent_on_save() {
        let original = json!({ "101": { "instructor": "Ada" } });
        let catalog = catalog_from(original.clone());
        assert_eq!(serde_json::to_value(&catalog).unwrap(), original);
    }
}
