// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the reconciliation sweep.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use triago_config::model::SweepConfig;
use triago_core::{Actor, ConversationStatus, Event, StorageAdapter};
use triago_lifecycle::ConversationService;
use triago_sweep::{ReconciliationSweep, SweepStats};
use triago_test_utils::TestHarness;

struct SweepFixture {
    harness: TestHarness,
    conversations: Arc<ConversationService>,
    sweep: ReconciliationSweep,
}

async fn fixture() -> SweepFixture {
    let harness = TestHarness::new().await;
    let storage: Arc<dyn StorageAdapter + Send + Sync> = harness.storage.clone();
    let conversations = Arc::new(ConversationService::new(
        storage.clone(),
        harness.bus.clone(),
    ));
    let sweep = ReconciliationSweep::new(
        storage,
        conversations.clone(),
        SweepConfig::default(),
    );
    SweepFixture {
        harness,
        conversations,
        sweep,
    }
}

/// Backdate a conversation's activity timestamps by `minutes`.
async fn backdate_activity(harness: &TestHarness, id: &str, minutes: i64) {
    let mut conv = harness.storage.get_conversation(id).await.unwrap().unwrap();
    let then = (chrono::Utc::now() - chrono::TimeDelta::minutes(minutes)).to_rfc3339();
    conv.last_message_at = Some(then.clone());
    conv.updated_at = then;
    harness.storage.update_conversation(&conv).await.unwrap();
}

/// Backdate a conversation's resolution timestamp by `hours`.
async fn backdate_resolution(harness: &TestHarness, id: &str, hours: i64) {
    let mut conv = harness.storage.get_conversation(id).await.unwrap().unwrap();
    conv.resolved_at =
        Some((chrono::Utc::now() - chrono::TimeDelta::hours(hours)).to_rfc3339());
    harness.storage.update_conversation(&conv).await.unwrap();
}

#[tokio::test]
async fn stale_assignment_is_released_through_the_guarded_path() {
    let f = fixture().await;
    let conv = f
        .conversations
        .ensure_conversation("cust-1", "chat")
        .await
        .unwrap();
    f.conversations
        .assign(&conv.id, "jo", &Actor::System, None)
        .await
        .unwrap();
    // 16 minutes of silence against a 15-minute threshold.
    backdate_activity(&f.harness, &conv.id, 16).await;

    let mut events = f.harness.bus.subscribe();
    let stats = f.sweep.sweep_once().await.unwrap();
    assert_eq!(stats, SweepStats { released: 1, closed: 0 });

    let conv = f.harness.storage.get_conversation(&conv.id).await.unwrap().unwrap();
    assert_eq!(conv.status, ConversationStatus::Open);
    assert!(conv.assigned_operator.is_none());
    assert!(conv.assistant_enabled);

    // The release went through the service: the change notification proves
    // it did not poke storage directly.
    match events.recv().await.unwrap() {
        Event::ConversationUpdated { previous, conversation } => {
            assert_eq!(previous, ConversationStatus::Assigned);
            assert_eq!(conversation.status, ConversationStatus::Open);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn fresh_assignment_is_left_alone() {
    let f = fixture().await;
    let conv = f
        .conversations
        .ensure_conversation("cust-1", "chat")
        .await
        .unwrap();
    f.conversations
        .assign(&conv.id, "jo", &Actor::System, None)
        .await
        .unwrap();
    backdate_activity(&f.harness, &conv.id, 2).await;

    let stats = f.sweep.sweep_once().await.unwrap();
    assert_eq!(stats, SweepStats::default());

    let conv = f.harness.storage.get_conversation(&conv.id).await.unwrap().unwrap();
    assert_eq!(conv.status, ConversationStatus::Assigned);
    assert_eq!(conv.assigned_operator.as_deref(), Some("jo"));
}

#[tokio::test]
async fn unconfirmed_resolution_is_closed_after_timeout() {
    let f = fixture().await;
    let conv = f
        .conversations
        .ensure_conversation("cust-1", "chat")
        .await
        .unwrap();
    f.conversations
        .transition(
            &conv.id,
            ConversationStatus::Resolved,
            &Actor::Operator("jo".to_string()),
            None,
        )
        .await
        .unwrap();
    // 25 hours against a 24-hour confirmation timeout.
    backdate_resolution(&f.harness, &conv.id, 25).await;

    let stats = f.sweep.sweep_once().await.unwrap();
    assert_eq!(stats, SweepStats { released: 0, closed: 1 });

    let conv = f.harness.storage.get_conversation(&conv.id).await.unwrap().unwrap();
    assert_eq!(conv.status, ConversationStatus::Closed);
    assert!(conv.closed_at.is_some());
}

#[tokio::test]
async fn recent_resolution_waits_for_confirmation() {
    let f = fixture().await;
    let conv = f
        .conversations
        .ensure_conversation("cust-1", "chat")
        .await
        .unwrap();
    f.conversations
        .transition(
            &conv.id,
            ConversationStatus::Resolved,
            &Actor::Operator("jo".to_string()),
            None,
        )
        .await
        .unwrap();
    backdate_resolution(&f.harness, &conv.id, 2).await;

    let stats = f.sweep.sweep_once().await.unwrap();
    assert_eq!(stats, SweepStats::default());
}

#[tokio::test]
async fn unparseable_timestamps_are_skipped_not_fatal() {
    let f = fixture().await;
    let conv = f
        .conversations
        .ensure_conversation("cust-1", "chat")
        .await
        .unwrap();
    f.conversations
        .assign(&conv.id, "jo", &Actor::System, None)
        .await
        .unwrap();

    let mut stored = f.harness.storage.get_conversation(&conv.id).await.unwrap().unwrap();
    stored.last_message_at = Some("not-a-timestamp".to_string());
    stored.updated_at = "also-not-a-timestamp".to_string();
    f.harness.storage.update_conversation(&stored).await.unwrap();

    let stats = f.sweep.sweep_once().await.unwrap();
    assert_eq!(stats, SweepStats::default());

    let conv = f.harness.storage.get_conversation(&conv.id).await.unwrap().unwrap();
    assert_eq!(conv.status, ConversationStatus::Assigned);
}

#[tokio::test]
async fn empty_store_sweeps_cleanly() {
    let f = fixture().await;
    assert_eq!(f.sweep.sweep_once().await.unwrap(), SweepStats::default());
}

#[tokio::test(start_paused = true)]
async fn run_loop_sweeps_on_interval_and_stops_on_cancel() {
    let f = fixture().await;
    let conv = f
        .conversations
        .ensure_conversation("cust-1", "chat")
        .await
        .unwrap();
    f.conversations
        .assign(&conv.id, "jo", &Actor::System, None)
        .await
        .unwrap();
    backdate_activity(&f.harness, &conv.id, 20).await;

    let cancel = CancellationToken::new();
    let sweep = Arc::new(f.sweep);
    let runner = {
        let sweep = Arc::clone(&sweep);
        let cancel = cancel.clone();
        tokio::spawn(async move { sweep.run(cancel).await })
    };

    // The first tick fires immediately; give the loop a chance to run it.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let stored = f.harness.storage.get_conversation(&conv.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ConversationStatus::Open);

    cancel.cancel();
    runner.await.unwrap();
}
