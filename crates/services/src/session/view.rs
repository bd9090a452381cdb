use course_core::model::{LectureKey, Status, StatusFilter};

use super::service::TrackerSession;

/// Characters that break filenames on at least one supported platform.
const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Sidebar entry for one course.
///
/// Presentation-agnostic: identifiers and flags, no pre-formatted strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseListItem {
    pub course_id: String,
    pub title: String,
    pub favorite: bool,
}

/// Courses for the sidebar: favorites pinned first, identifier order within
/// each group.
#[must_use]
pub fn course_list(session: &TrackerSession) -> Vec<CourseListItem> {
    let settings = session.settings();
    let mut items: Vec<CourseListItem> = session
        .catalog()
        .iter()
        .map(|(course_id, course)| CourseListItem {
            course_id: course_id.to_string(),
            title: course.title().to_string(),
            favorite: settings.is_favorite(course_id),
        })
        .collect();
    // Catalog iteration is already in identifier order; the stable sort
    // only lifts favorites above the rest.
    items.sort_by_key(|item| !item.favorite);
    items
}

/// One lecture as the presentation layer renders it.
///
/// `key` is the encoded ledger key for this row, ready to hand back in a
/// status change. `status` is always resolved; untouched lectures read as
/// the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureRow {
    pub key: String,
    pub title: String,
    pub status: Status,
    pub duration: String,
    pub link: String,
}

/// One section with its surviving rows.
///
/// `done_count` is counted over every item of the section, not just the
/// rows the filter admits; the header stays honest while rows are hidden.
/// `lecture_count` is the exporter's claim, passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRows {
    pub title: String,
    pub length_text: String,
    pub lecture_count: u32,
    pub done_count: usize,
    pub rows: Vec<LectureRow>,
}

/// Header data plus section rows for one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseView {
    pub course_id: String,
    pub title: String,
    pub url: String,
    pub instructor: String,
    pub section_count: usize,
    pub published_lecture_count: u32,
    pub estimated_length: String,
    pub sections: Vec<SectionRows>,
}

/// Build the full view of one course under a row filter.
///
/// Returns `None` when the catalog has no such course.
#[must_use]
pub fn course_view(
    session: &TrackerSession,
    course_id: &str,
    filter: StatusFilter,
) -> Option<CourseView> {
    let course = session.catalog().course(course_id)?;

    let sections = course
        .sections()
        .iter()
        .map(|section| {
            let mut done_count = 0;
            let mut rows = Vec::new();
            for (position, item) in section.items().iter().enumerate() {
                let key = LectureKey::derive(course_id, section, position, item);
                let status = session.status_of(&key);
                if status == Status::Done {
                    done_count += 1;
                }
                if filter.admits(status) {
                    rows.push(LectureRow {
                        key: key.encode(),
                        title: item.title().to_string(),
                        status,
                        duration: item.duration().to_string(),
                        link: item.link().to_string(),
                    });
                }
            }
            SectionRows {
                title: section.title().to_string(),
                length_text: section.length_text().to_string(),
                lecture_count: section.lecture_count(),
                done_count,
                rows,
            }
        })
        .collect();

    Some(CourseView {
        course_id: course_id.to_string(),
        title: course.title().to_string(),
        url: course.url().to_string(),
        instructor: course.instructor().to_string(),
        section_count: course.sections().len(),
        published_lecture_count: course.published_lecture_count(),
        estimated_length: course.estimated_length().to_string(),
        sections,
    })
}

/// File stem for a per-course report: `"{id} - {title}"` with characters
/// that break filenames removed. The caller appends its own extension.
#[must_use]
pub fn report_file_stem(course_id: &str, title: &str) -> String {
    format!("{course_id} - {title}")
        .chars()
        .filter(|c| !FORBIDDEN_FILENAME_CHARS.contains(c))
        .collect()
}
