mod common;

use access_engine::{EngineError, ModulePrivilegeEditor};
use common::{FakeBackend, FakeState};
use shared::models::PrivilegeItem;

fn item(id: i64, name: &str) -> PrivilegeItem {
    PrivilegeItem {
        id,
        name: name.to_string(),
        description: None,
    }
}

fn backend() -> std::sync::Arc<FakeBackend> {
    FakeBackend::with_state(FakeState {
        module_catalog: vec![item(1, "Create"), item(2, "Approve"), item(3, "Export")],
        assigned_privileges: vec![2],
        ..Default::default()
    })
}

#[tokio::test]
async fn test_open_marks_assigned_entries() {
    let backend = backend();
    let editor = ModulePrivilegeEditor::open(backend.clone(), 7, 11).await.unwrap();

    assert!(backend.max_concurrent_reads() >= 2);
    let checked: Vec<bool> = editor.entries().iter().map(|e| e.checked).collect();
    assert_eq!(checked, vec![false, true, false]);
    assert_eq!(editor.selected(), vec![2]);
    assert!(!editor.all_checked());
    assert!(!editor.has_unsaved_changes());
}

#[tokio::test]
async fn test_toggle_all_and_save() {
    let backend = backend();
    let editor = ModulePrivilegeEditor::open(backend.clone(), 7, 11).await.unwrap();

    editor.toggle_all(true).unwrap();
    assert!(editor.all_checked());
    assert!(editor.has_unsaved_changes());

    editor.toggle(3, false).unwrap();
    editor.save().await.unwrap();
    assert!(!editor.has_unsaved_changes());
    assert_eq!(backend.state.lock().saved_privileges, vec![vec![1, 2]]);
}

#[tokio::test]
async fn test_unknown_privilege_is_rejected() {
    let editor = ModulePrivilegeEditor::open(backend(), 7, 11).await.unwrap();
    assert!(matches!(editor.toggle(99, true), Err(EngineError::Validation(_))));
}

#[tokio::test]
async fn test_empty_catalog_is_never_all_checked() {
    let editor = ModulePrivilegeEditor::open(FakeBackend::new(), 7, 11)
        .await
        .unwrap();
    editor.toggle_all(true).unwrap();
    assert!(!editor.all_checked());
}

#[tokio::test]
async fn test_rejected_save_keeps_edits() {
    let backend = backend();
    backend.reject("save_module_privileges");
    let editor = ModulePrivilegeEditor::open(backend.clone(), 7, 11).await.unwrap();

    editor.toggle(1, true).unwrap();
    assert!(editor.save().await.is_err());
    assert_eq!(editor.selected(), vec![1, 2]);
    assert!(editor.has_unsaved_changes());
    assert!(backend.state.lock().saved_privileges.is_empty());
}
