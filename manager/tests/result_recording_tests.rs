//! Result recording: one immutable result per (action, host)

mod common;

use std::sync::Arc;

use action_manager::actions::{create_action, ActionDetails, ActionType, NetworkState};
use action_manager::{ActionError, Database, DispatchRequest};
use common::fixtures::*;
use futures::future::join_all;
use tempfile::TempDir;

async fn standard_app() -> TestApp {
    TestApp::new(TestConfigBuilder::standard().build()).await
}

async fn apply_on_both(app: &TestApp) -> i64 {
    app.service
        .apply_states(&[hosts::HYPERVISOR, hosts::MINION], &names(&[states::SSH]))
        .await
        .expect("Apply states should be created")
}

#[tokio::test]
async fn test_duplicate_result_rejected_and_first_kept() {
    let app = standard_app().await;
    let action_id = apply_on_both(&app).await;

    app.service
        .record_result(action_id, hosts::MINION, true, "first".to_string(), Some(0))
        .await
        .unwrap();

    let err = app
        .service
        .record_result(action_id, hosts::MINION, false, "second".to_string(), Some(2))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ActionError::DuplicateResult {
            action_id,
            host_id: hosts::MINION
        }
    );

    let stored = app
        .database
        .get_action_result(action_id, hosts::MINION)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.success);
    assert_eq!(stored.output, "first");
}

#[tokio::test]
async fn test_concurrent_duplicates_store_exactly_one() {
    let app = standard_app().await;
    let action_id = apply_on_both(&app).await;

    let attempts = (0..8).map(|i| {
        let service = app.service.clone();
        async move {
            service
                .record_result(action_id, hosts::HYPERVISOR, true, format!("attempt {}", i), Some(0))
                .await
        }
    });
    let outcomes = join_all(attempts).await;

    let stored = outcomes.iter().filter(|o| o.is_ok()).count();
    let duplicates = outcomes
        .iter()
        .filter(|o| matches!(o, Err(ActionError::DuplicateResult { .. })))
        .count();
    assert_eq!(stored, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(app.database.get_action_results(action_id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_reports_on_file_database_store_exactly_one() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("actions.db");
    let database = Arc::new(
        Database::new(&path.to_string_lossy())
            .await
            .expect("Failed to open file database"),
    );

    let mut action = create_action(ActionType::ApplyStates);
    action.details = ActionDetails::StateApplication {
        states: names(&[states::SSH]),
    };
    action.name = "Apply states: services.ssh".to_string();
    action.targets = vec![hosts::HYPERVISOR];
    let action_id = database.insert_action(&action).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let database = database.clone();
            tokio::spawn(async move {
                let result = result_for(action_id, hosts::HYPERVISOR, true, &format!("report {}", i));
                database.insert_action_result(&result).await
            })
        })
        .collect();

    let mut stored = 0;
    let mut duplicates = 0;
    let mut other = Vec::new();
    for handle in handles {
        match handle.await.expect("Insert task panicked") {
            Ok(()) => stored += 1,
            Err(ActionError::DuplicateResult { .. }) => duplicates += 1,
            Err(e) => other.push(e),
        }
    }

    assert_eq!(stored, 1);
    assert_eq!(duplicates, 15);
    assert!(other.is_empty(), "Unexpected errors: {:?}", other);
    assert_eq!(database.get_action_results(action_id).await.unwrap().len(), 1);

    database.close().await;
}

#[tokio::test]
async fn test_unknown_action_and_foreign_host_rejected() {
    let app = standard_app().await;
    let outcome = app
        .service
        .change_network_state(
            hosts::HYPERVISOR,
            &DispatchRequest {
                names: names(&[networks::DEFAULT]),
                definition: None,
            },
            NetworkState::Stop,
        )
        .await
        .unwrap();
    let action_id = outcome.created[0];

    let missing = app
        .service
        .record_result(action_id + 100, hosts::HYPERVISOR, true, String::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(missing, ActionError::TargetNotFound { .. }));

    // Configured, but never targeted by this action
    let foreign = app
        .service
        .record_result(action_id, hosts::MINION, true, String::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(foreign, ActionError::TargetNotFound { .. }));

    let unconfigured = app
        .service
        .record_result(action_id, hosts::UNKNOWN, true, String::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(unconfigured, ActionError::TargetNotFound { .. }));
}

#[tokio::test]
async fn test_progress_resolves_when_every_host_reported() {
    let app = standard_app().await;
    let action_id = apply_on_both(&app).await;

    let view = app.service.action_view(action_id).await.unwrap();
    assert_eq!(view.progress.pending, 2);
    assert!(!view.progress.resolved);

    app.service
        .record_result(action_id, hosts::HYPERVISOR, true, "ok".to_string(), Some(0))
        .await
        .unwrap();
    app.service
        .record_result(action_id, hosts::MINION, false, "failed".to_string(), Some(1))
        .await
        .unwrap();

    let view = app.service.action_view(action_id).await.unwrap();
    assert_eq!(view.progress.completed, 1);
    assert_eq!(view.progress.failed, 1);
    assert!(view.progress.resolved);
}

#[tokio::test]
async fn test_successful_network_results_update_inventory() {
    let app = standard_app().await;

    let created = app
        .service
        .create_networks(
            hosts::HYPERVISOR,
            &DispatchRequest {
                names: names(&["lab"]),
                definition: Some(networks::DEFINITION.to_string()),
            },
        )
        .await
        .unwrap();
    app.service
        .record_result(created.created[0], hosts::HYPERVISOR, true, String::new(), Some(0))
        .await
        .unwrap();
    assert!(app.inventory.contains(hosts::HYPERVISOR, "lab").await);

    let deleted = app
        .service
        .change_network_state(
            hosts::HYPERVISOR,
            &DispatchRequest {
                names: names(&[networks::ISOLATED]),
                definition: None,
            },
            NetworkState::Delete,
        )
        .await
        .unwrap();

    // A failed delete leaves the network in place
    app.service
        .record_result(deleted.created[0], hosts::HYPERVISOR, false, "busy".to_string(), Some(1))
        .await
        .unwrap();
    assert!(app.inventory.contains(hosts::HYPERVISOR, networks::ISOLATED).await);
}

#[tokio::test]
async fn test_deleting_action_removes_results() {
    let app = standard_app().await;
    let action_id = apply_on_both(&app).await;
    app.service
        .record_result(action_id, hosts::MINION, true, "ok".to_string(), Some(0))
        .await
        .unwrap();

    app.service.delete_action(action_id).await.unwrap();

    assert!(app.database.get_action_results(action_id).await.unwrap().is_empty());
    assert!(matches!(
        app.service.delete_action(action_id).await,
        Err(ActionError::TargetNotFound { .. })
    ));
}
