mod catalog;
mod key;
mod ledger;
mod settings;
mod status;

pub use catalog::{Course, CourseCatalog, Curriculum, CurriculumContext, LectureItem, Section};
pub use key::{KeyError, LectureKey, SectionMasterKey};
pub use ledger::{StatusCounts, StatusLedger};
pub use settings::UiSettings;
pub use status::{MasterSelection, Status, StatusFilter, StatusVocabulary};
