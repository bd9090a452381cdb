#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod time;

pub use error::Error;
pub use time::{Clock, test_clock, test_instant};

pub use model::{
    Course, CourseCatalog, Curriculum, CurriculumContext, KeyError, LectureItem, LectureKey,
    MasterSelection, Section, SectionMasterKey, Status, StatusCounts, StatusFilter, StatusLedger,
    StatusVocabulary, UiSettings,
};
