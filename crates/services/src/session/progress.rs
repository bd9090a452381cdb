use course_core::model::{Status, StatusCounts};

use super::service::TrackerSession;

/// Per-course progress rollup.
///
/// Presentation-agnostic: identifiers, tallies, and a percentage. The UI
/// decides how to render them; nothing here is pre-formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseProgress {
    pub course_id: String,
    pub title: String,
    pub counts: StatusCounts,
}

impl CourseProgress {
    /// Aggregate the ledger for one catalog course.
    ///
    /// Returns `None` when the catalog has no such course. Ledger entries
    /// whose keys belong to no catalog course are not reachable from here;
    /// they persist but never aggregate.
    #[must_use]
    pub fn for_course(session: &TrackerSession, course_id: &str) -> Option<Self> {
        let course = session.catalog().course(course_id)?;
        Some(Self {
            course_id: course_id.to_string(),
            title: course.title().to_string(),
            counts: session.course_counts(course_id),
        })
    }

    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        self.counts.count(status)
    }

    /// Tracked entries for this course, whatever their status.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.total()
    }

    /// Completion percentage over the actionable statuses.
    #[must_use]
    pub fn completion_percent(&self) -> f64 {
        self.counts.completion_percent()
    }
}

/// Progress for every catalog course, in identifier order.
#[must_use]
pub fn progress_overview(session: &TrackerSession) -> Vec<CourseProgress> {
    session
        .catalog()
        .iter()
        .map(|(course_id, course)| CourseProgress {
            course_id: course_id.to_string(),
            title: course.title().to_string(),
            counts: session.course_counts(course_id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{LectureKey, StatusVocabulary};
    use serde_json::json;

    fn session_with_two_courses() -> TrackerSession {
        let catalog = serde_json::from_value(json!({
            "1": { "curriculum_context": { "data": {
                "course_title": "Alpha",
                "sections": [ { "title": "S", "items": [
                    { "title": "a" }, { "title": "b" }, { "title": "c" }, { "title": "d" }
                ] } ]
            } } },
            "2": { "curriculum_context": { "data": { "course_title": "Beta" } } }
        }))
        .unwrap();
        let mut session = TrackerSession::new(StatusVocabulary::standard());
        session.load_catalog(catalog);
        session
    }

    #[test]
    fn half_done_course_reads_fifty_percent() {
        let mut session = session_with_two_courses();
        for (item, status) in [
            ("a", Status::Done),
            ("b", Status::Done),
            ("c", Status::InProgress),
            ("d", Status::NotDone),
        ] {
            session.set_status(&LectureKey::new("1", "S", item, "0"), status);
        }

        let progress = CourseProgress::for_course(&session, "1").unwrap();
        assert_eq!(progress.title, "Alpha");
        assert_eq!(progress.total(), 4);
        assert_eq!(progress.count(Status::Done), 2);
        assert!((progress.completion_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_course_has_no_progress() {
        let session = session_with_two_courses();
        assert!(CourseProgress::for_course(&session, "missing").is_none());
    }

    #[test]
    fn overview_walks_courses_in_identifier_order() {
        let mut session = session_with_two_courses();
        session.set_status(&LectureKey::new("1", "S", "a", "0"), Status::Done);

        let overview = progress_overview(&session);
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].course_id, "1");
        assert_eq!(overview[0].total(), 1);
        assert_eq!(overview[1].course_id, "2");
        assert_eq!(overview[1].total(), 0);
        assert_eq!(overview[1].completion_percent(), 0.0);
    }
}
