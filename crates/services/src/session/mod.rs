mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::{CourseProgress, progress_overview};
pub use service::TrackerSession;
pub use view::{
    CourseListItem, CourseView, LectureRow, SectionRows, course_list, course_view,
    report_file_stem,
};
pub use workflow::{Action, ActionOutcome, TrackerService};
