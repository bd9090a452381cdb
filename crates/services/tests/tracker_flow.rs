use std::sync::Arc;

use course_core::model::{LectureKey, MasterSelection, Status, StatusFilter};
use course_core::test_clock;
use services::{Action, TrackerService, course_view, progress_overview};
use storage::repository::InMemoryRepository;

fn tracker(repo: &InMemoryRepository) -> TrackerService {
    TrackerService::new(
        test_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
}

fn export_with_embedded(status: &str) -> String {
    let embedded_key = LectureKey::new("101", "Basics", "Intro", "0").encode();
    format!(
        r#"{{
            "101": {{
                "instructor": "Ada",
                "statuses": {{ "{embedded_key}": "{status}" }},
                "curriculum_context": {{ "data": {{
                    "course_title": "Rust Basics",
                    "sections": [ {{
                        "title": "Basics",
                        "lecture_count": 4,
                        "items": [
                            {{ "title": "Intro" }},
                            {{ "title": "Setup" }},
                            {{ "title": "Borrowing" }},
                            {{ "title": "Traits" }}
                        ]
                    }} ]
                }} }}
            }}
        }}"#
    )
}

#[test]
fn upload_track_save_reload_round_trip() {
    let repo = InMemoryRepository::new();
    let service = tracker(&repo);

    let mut session = service.open_session(None).expect("open empty session");
    assert!(session.catalog().is_empty());

    let embedded = service
        .load_upload(&mut session, &export_with_embedded("in progress"))
        .expect("upload export");
    assert_eq!(embedded, 1);

    let intro = LectureKey::new("101", "Basics", "Intro", "0");
    let setup = LectureKey::new("101", "Basics", "Setup", "1");
    assert_eq!(session.status_of(&intro), Status::InProgress);
    assert_eq!(session.status_of(&setup), Status::NotDone);

    service
        .apply(
            &mut session,
            Action::ApplyToSection {
                course_id: "101".to_string(),
                section_title: "Basics".to_string(),
                selection: MasterSelection::Selected(Status::Done),
            },
        )
        .expect("stamp section");
    service
        .apply(
            &mut session,
            Action::SetStatus {
                key: setup.clone(),
                status: Status::Important,
            },
        )
        .expect("mark one lecture important");

    let overview = progress_overview(&session);
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].total(), 4);
    assert_eq!(overview[0].count(Status::Done), 3);
    assert!((overview[0].completion_percent() - 100.0).abs() < f64::EPSILON);

    let outcome = service
        .apply(&mut session, Action::Save)
        .expect("explicit save");
    assert!(outcome.saved);
    assert!(session.last_saved_at().is_some());

    // Reload. The uploaded course still embeds its own status block, and
    // embedded entries outrank the saved top-level ones on every load.
    let reopened = service.open_session(None).expect("reopen from autosave");
    assert_eq!(reopened.status_of(&intro), Status::InProgress);
    assert_eq!(reopened.status_of(&setup), Status::Important);
    assert_eq!(
        reopened.status_of(&LectureKey::new("101", "Basics", "Traits", "3")),
        Status::Done
    );

    let progress = progress_overview(&reopened);
    assert_eq!(progress[0].total(), 4);
    assert!((progress[0].completion_percent() - 75.0).abs() < f64::EPSILON);

    let view = course_view(&reopened, "101", StatusFilter::All).expect("course view");
    assert_eq!(view.title, "Rust Basics");
    assert_eq!(view.instructor, "Ada");
    assert_eq!(view.sections[0].done_count, 2);
    assert_eq!(view.sections[0].rows.len(), 4);

    let only_done = course_view(&reopened, "101", StatusFilter::Only(Status::Done))
        .expect("filtered view");
    assert_eq!(only_done.sections[0].rows.len(), 2);
    assert_eq!(only_done.sections[0].done_count, 2);
}
