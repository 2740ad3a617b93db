mod common;

use access_engine::{EngineError, Operation, UserRoleEditor};
use common::{FakeBackend, FakeState, role};
use std::collections::{BTreeSet, HashMap};

fn backend() -> std::sync::Arc<FakeBackend> {
    FakeBackend::with_state(FakeState {
        roles: vec![
            role(1, "Admin", true),
            role(2, "Clerk", true),
            role(3, "Auditor", false),
        ],
        user_roles: HashMap::from([(42, vec![2])]),
        ..Default::default()
    })
}

fn ids(items: &[i64]) -> BTreeSet<i64> {
    items.iter().copied().collect()
}

#[tokio::test]
async fn test_open_reads_catalog_and_assignment_concurrently() {
    let backend = backend();
    let editor = UserRoleEditor::open(backend.clone(), 42).await.unwrap();

    assert!(backend.max_concurrent_reads() >= 2);
    assert_eq!(editor.roles().len(), 3);
    assert_eq!(editor.selected_ids(), ids(&[2]));
    assert!(editor.is_selected(2));
    assert!(!editor.has_unsaved_changes());
}

#[tokio::test]
async fn test_filtered_by_name() {
    let editor = UserRoleEditor::open(backend(), 42).await.unwrap();
    let names: Vec<_> = editor.filtered(" AUD ").into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Auditor"]);
    assert_eq!(editor.filtered("").len(), 3);
}

#[tokio::test]
async fn test_save_replaces_user_roles() {
    let backend = backend();
    let editor = UserRoleEditor::open(backend.clone(), 42).await.unwrap();

    editor.toggle(3, true).unwrap();
    editor.toggle(2, false).unwrap();
    assert!(editor.has_unsaved_changes());

    let saved = editor.save().await.unwrap();
    assert_eq!(saved.role_ids, vec![3]);
    assert!(!editor.has_unsaved_changes());
    assert_eq!(backend.state.lock().saved_user_roles, vec![(42, vec![3])]);
}

#[tokio::test]
async fn test_unknown_role_cannot_be_picked() {
    let editor = UserRoleEditor::open(backend(), 42).await.unwrap();
    assert!(matches!(editor.toggle(99, true), Err(EngineError::UnknownRole(99))));
}

#[tokio::test]
async fn test_failed_or_rejected_save_keeps_picks() {
    let backend = backend();
    let editor = UserRoleEditor::open(backend.clone(), 42).await.unwrap();
    editor.toggle(1, true).unwrap();

    backend.fail("save_user_roles");
    assert!(editor.save().await.unwrap_err().is_transient());
    assert_eq!(editor.selected_ids(), ids(&[1, 2]));
    assert!(editor.has_unsaved_changes());

    backend.recover("save_user_roles");
    backend.reject("save_user_roles");
    assert!(matches!(editor.save().await, Err(EngineError::Backend(_))));
    assert!(editor.has_unsaved_changes());
    assert!(backend.state.lock().saved_user_roles.is_empty());
}

#[tokio::test]
async fn test_second_save_while_in_flight_is_busy() {
    let backend = backend();
    let editor = UserRoleEditor::open(backend.clone(), 42).await.unwrap();
    editor.toggle(1, true).unwrap();

    backend.hold_saves();
    let (first, second, ()) = tokio::join!(editor.save(), editor.save(), async {
        tokio::task::yield_now().await;
        assert!(editor.is_saving());
        backend.release_saves();
    });
    first.unwrap();
    assert!(matches!(second, Err(EngineError::Busy(Operation::Save))));
}

#[tokio::test]
async fn test_failed_assignment_read_aborts_open() {
    let backend = backend();
    backend.fail("fetch_user_roles");
    let result = UserRoleEditor::open(backend, 42).await;
    assert!(result.err().unwrap().is_transient());
}
