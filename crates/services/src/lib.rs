#![forbid(unsafe_code)]

pub mod error;
pub mod session;

pub use course_core::Clock;

pub use error::SessionError;

pub use session::{
    Action, ActionOutcome, CourseListItem, CourseProgress, CourseView, LectureRow, SectionRows,
    TrackerService, TrackerSession, course_list, course_view, progress_overview, report_file_stem,
};
