use std::sync::Arc;

use course_core::model::{CourseCatalog, Status, StatusFilter, UiSettings};
use course_core::test_clock;
use services::{Action, TrackerService, course_list};
use storage::repository::{InMemoryRepository, SettingsRepository};

fn tracker(repo: &InMemoryRepository) -> TrackerService {
    TrackerService::new(
        test_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
}

fn catalog() -> CourseCatalog {
    serde_json::from_value(serde_json::json!({
        "1": { "curriculum_context": { "data": { "course_title": "Alpha" } } },
        "2": { "curriculum_context": { "data": { "course_title": "Beta" } } }
    }))
    .expect("catalog fixture")
}

#[test]
fn settings_persist_only_when_asked() {
    let repo = InMemoryRepository::new();
    let service = tracker(&repo);
    let mut session = service.open_session(Some(catalog())).expect("open session");

    // Selecting a course is the one edit that persists by itself.
    service
        .apply(
            &mut session,
            Action::SelectCourse {
                course_id: "2".to_string(),
            },
        )
        .expect("select course");
    let persisted = repo.load_settings().expect("load").expect("saved blob");
    assert_eq!(persisted.selected_course(), Some("2"));
    assert!(!persisted.is_favorite("1"));

    // Favorites, filter, and the autosave flag stay in memory until an
    // explicit settings save.
    service
        .apply(
            &mut session,
            Action::ToggleFavorite {
                course_id: "1".to_string(),
            },
        )
        .expect("toggle favorite");
    service
        .apply(
            &mut session,
            Action::SetFilter {
                filter: StatusFilter::Only(Status::Done),
            },
        )
        .expect("set filter");
    service
        .apply(&mut session, Action::SetAutosave { enabled: true })
        .expect("enable autosave");

    let persisted = repo.load_settings().expect("load").expect("saved blob");
    assert!(!persisted.is_favorite("1"));
    assert_eq!(persisted.filter(), StatusFilter::All);
    assert!(!persisted.autosave());

    let outcome = service
        .apply(&mut session, Action::SaveSettings)
        .expect("save settings");
    assert!(outcome.settings_saved);

    let persisted = repo.load_settings().expect("load").expect("saved blob");
    assert!(persisted.is_favorite("1"));
    assert_eq!(persisted.filter(), StatusFilter::Only(Status::Done));
    assert!(persisted.autosave());

    // A fresh session comes back with the persisted settings applied.
    let reopened = service.open_session(Some(catalog())).expect("reopen");
    assert_eq!(reopened.settings().selected_course(), Some("2"));
    assert!(reopened.settings().autosave());
    let items = course_list(&reopened);
    assert_eq!(items[0].course_id, "1");
    assert!(items[0].favorite);
}

#[test]
fn preload_flag_controls_the_initial_catalog() {
    let repo = InMemoryRepository::new();
    let mut settings = UiSettings::default();
    settings.set_preload(false);
    repo.save_settings(&settings).expect("seed settings");

    let service = tracker(&repo);
    let session = service.open_session(Some(catalog())).expect("open session");
    assert!(session.catalog().is_empty());

    // Flipping preload back on picks the catalog up on the next open.
    let mut settings = UiSettings::default();
    settings.set_preload(true);
    repo.save_settings(&settings).expect("update settings");
    let session = service.open_session(Some(catalog())).expect("reopen");
    assert!(session.catalog().contains("1"));
}
