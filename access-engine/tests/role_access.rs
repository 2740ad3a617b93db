mod common;

use access_engine::{
    EngineError, FailureKind, NotEditableReason, Operation, RoleAccessSession,
};
use common::{FakeBackend, FakeState, sample_role_tree};
use shared::models::{ModuleLevel, PrivilegeItem, RoleInfo, RoleModuleNode};
use std::collections::BTreeSet;

fn backend_with_role_tree(role_tree: Vec<RoleModuleNode>) -> std::sync::Arc<FakeBackend> {
    FakeBackend::with_state(FakeState {
        role: Some(RoleInfo {
            name: Some("Clerk".into()),
            active: true,
        }),
        role_tree,
        ..Default::default()
    })
}

fn ids(items: &[i64]) -> BTreeSet<i64> {
    items.iter().copied().collect()
}

#[tokio::test]
async fn test_open_loads_tree_and_infers_levels() {
    let backend = backend_with_role_tree(sample_role_tree());
    let session = RoleAccessSession::open(backend, 7, 1).await.unwrap();

    assert_eq!(session.role().name.as_deref(), Some("Clerk"));
    session.with_tree(|tree| {
        assert_eq!(tree.roots(), &[11, 12]);
        assert_eq!(tree.get(11).unwrap().level, ModuleLevel::Feature);
        assert_eq!(tree.get(112).unwrap().level, ModuleLevel::SubFeature);
    });
    assert!(session.checked_ids().is_empty());
    assert!(!session.has_unsaved_changes());
}

/// Scenario A: root with two children
#[tokio::test]
async fn test_cascade_and_bubble_scenario() {
    let backend = backend_with_role_tree(vec![
        RoleModuleNode::new(1, "M1").with_children(vec![
            RoleModuleNode::new(2, "M1.1"),
            RoleModuleNode::new(3, "M1.2"),
        ]),
    ]);
    let session = RoleAccessSession::open(backend, 7, 1).await.unwrap();

    session.toggle_local(1, true).unwrap();
    assert_eq!(session.checked_ids(), ids(&[1, 2, 3]));

    session.toggle_local(2, false).unwrap();
    assert_eq!(session.checked_ids(), ids(&[1, 3]));
}

#[tokio::test]
async fn test_loaded_state_is_not_recomputed() {
    // parent unchecked although a child is checked: kept as delivered
    let backend = backend_with_role_tree(vec![
        RoleModuleNode::new(11, "Roles")
            .with_children(vec![RoleModuleNode::new(111, "Role List").checked(true)]),
    ]);
    let session = RoleAccessSession::open(backend, 7, 1).await.unwrap();
    assert_eq!(session.checked_ids(), ids(&[111]));
}

#[tokio::test]
async fn test_optimistic_toggle_persists_selection() {
    let backend = backend_with_role_tree(sample_role_tree());
    let session = RoleAccessSession::open(backend.clone(), 7, 1).await.unwrap();

    session.toggle(111, true).await.unwrap();
    assert_eq!(session.checked_ids(), ids(&[11, 111]));
    assert!(!session.has_unsaved_changes());
    assert_eq!(backend.state.lock().saved_role_modules, vec![vec![11, 111]]);
}

#[tokio::test]
async fn test_optimistic_toggle_rolls_back_on_failure() {
    let backend = backend_with_role_tree(sample_role_tree());
    let session = RoleAccessSession::open(backend.clone(), 7, 1).await.unwrap();
    session.toggle(12, true).await.unwrap();
    let before = session.with_tree(|t| t.clone());

    backend.fail("save_role_modules");
    let err = session.toggle(11, true).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transient);
    assert_eq!(session.with_tree(|t| t.clone()), before);
    assert!(!session.is_saving());
}

#[tokio::test]
async fn test_rejected_ack_rolls_back() {
    let backend = backend_with_role_tree(sample_role_tree());
    backend.reject("save_role_modules");
    let session = RoleAccessSession::open(backend, 7, 1).await.unwrap();

    let err = session.toggle(12, true).await.unwrap_err();
    assert!(matches!(err, EngineError::Backend(_)));
    assert!(session.checked_ids().is_empty());
}

#[tokio::test]
async fn test_save_failure_keeps_local_edits() {
    let backend = backend_with_role_tree(sample_role_tree());
    let session = RoleAccessSession::open(backend.clone(), 7, 1).await.unwrap();

    session.check_all(true).unwrap();
    backend.fail("save_role_modules");
    assert!(session.save().await.is_err());
    assert_eq!(session.checked_ids(), ids(&[11, 12, 111, 112]));
    assert!(session.has_unsaved_changes());

    backend.recover("save_role_modules");
    let count = session.save().await.unwrap();
    assert_eq!(count, 4);
    assert!(!session.has_unsaved_changes());
}

#[tokio::test]
async fn test_second_save_while_in_flight_is_busy() {
    let backend = backend_with_role_tree(sample_role_tree());
    let session = RoleAccessSession::open(backend.clone(), 7, 1).await.unwrap();
    session.toggle_local(12, true).unwrap();

    backend.hold_saves();
    let (first, second, ()) = tokio::join!(session.save(), session.save(), async {
        tokio::task::yield_now().await;
        backend.release_saves();
    });

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(EngineError::Busy(Operation::Save))))
    );
    assert_eq!(backend.state.lock().saved_role_modules.len(), 1);
}

#[tokio::test]
async fn test_pending_toggle_does_not_block_save() {
    let backend = backend_with_role_tree(sample_role_tree());
    let session = RoleAccessSession::open(backend.clone(), 7, 1).await.unwrap();

    backend.hold_saves();
    let (toggled, second_toggle, saved, ()) = tokio::join!(
        session.toggle(12, true),
        session.toggle(111, true),
        session.save(),
        async {
            tokio::task::yield_now().await;
            assert!(session.is_saving());
            backend.release_saves();
        }
    );

    toggled.unwrap();
    assert!(matches!(
        second_toggle,
        Err(EngineError::Busy(Operation::Toggle))
    ));
    assert_eq!(saved.unwrap(), 1);
    assert_eq!(session.checked_ids(), ids(&[12]));
    assert!(!session.has_unsaved_changes());
    assert!(!session.is_saving());
    assert_eq!(
        backend.state.lock().saved_role_modules,
        vec![vec![12], vec![12]]
    );
}

/// Scenario C: a deleted module takes its descendants out of the selection
#[tokio::test]
async fn test_forget_deleted_module() {
    let backend = backend_with_role_tree(vec![
        RoleModuleNode::new(5, "Inventory")
            .checked(true)
            .with_children(vec![
                RoleModuleNode::new(51, "Stock")
                    .checked(true)
                    .with_children(vec![RoleModuleNode::new(511, "Counts").checked(true)]),
                RoleModuleNode::new(52, "Transfers"),
            ]),
    ]);
    let session = RoleAccessSession::open(backend, 7, 5).await.unwrap();
    session.with_tree(|tree| assert_eq!(tree.get(511).unwrap().level, ModuleLevel::SubFeature));

    let removed = session.forget_module(51);
    assert_eq!(removed, vec![51, 511]);
    // parent keeps its state even with no checked child left
    assert_eq!(session.checked_ids(), ids(&[5]));
    assert!(!session.has_unsaved_changes());
}

#[tokio::test]
async fn test_privileges_gate() {
    let backend = backend_with_role_tree(sample_role_tree());
    backend.state.lock().module_catalog = vec![PrivilegeItem {
        id: 900,
        name: "Approve".into(),
        description: None,
    }];
    let session = RoleAccessSession::open(backend, 7, 1).await.unwrap();

    let err = session.open_privileges(11).await.err().unwrap();
    assert!(matches!(
        err,
        EngineError::NotEditable {
            module_id: 11,
            reason: NotEditableReason::NotAssigned
        }
    ));

    session.toggle_local(12, true).unwrap();
    let err = session.open_privileges(12).await.err().unwrap();
    assert!(matches!(
        err,
        EngineError::NotEditable {
            reason: NotEditableReason::NoCatalog,
            ..
        }
    ));

    session.toggle_local(11, true).unwrap();
    let editor = session.open_privileges(11).await.unwrap();
    assert_eq!(editor.module_id(), 11);
    assert_eq!(editor.entries().len(), 1);
}

#[tokio::test]
async fn test_closed_session_rejects_calls() {
    let backend = backend_with_role_tree(sample_role_tree());
    let session = RoleAccessSession::open(backend.clone(), 7, 1).await.unwrap();
    session.close();

    assert!(matches!(
        session.toggle_local(11, true),
        Err(EngineError::SessionClosed)
    ));
    assert!(matches!(session.save().await, Err(EngineError::SessionClosed)));
    assert!(backend.state.lock().saved_role_modules.is_empty());
}

#[tokio::test]
async fn test_late_toggle_result_after_close_is_discarded() {
    let backend = backend_with_role_tree(sample_role_tree());
    let session = RoleAccessSession::open(backend.clone(), 7, 1).await.unwrap();

    backend.hold_saves();
    let (result, ()) = tokio::join!(session.toggle(12, true), async {
        tokio::task::yield_now().await;
        session.close();
        backend.release_saves();
    });
    assert!(matches!(result, Err(EngineError::SessionClosed)));
    assert!(session.is_closed());
}

#[tokio::test]
async fn test_unknown_module_is_structural() {
    let backend = backend_with_role_tree(sample_role_tree());
    let session = RoleAccessSession::open(backend.clone(), 7, 1).await.unwrap();

    let err = session.toggle(404, true).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Structural);
    assert!(backend.state.lock().saved_role_modules.is_empty());
}
