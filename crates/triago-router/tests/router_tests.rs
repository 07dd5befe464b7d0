// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the assignment router over real storage and
//! mock channel/assistant adapters.

use std::sync::Arc;

use triago_config::model::{RoutingConfig, TicketConfig};
use triago_core::types::now_rfc3339;
use triago_core::{
    Actor, ConversationStatus, StorageAdapter, TicketStatus, Turn,
};
use triago_lifecycle::{ConversationService, CreateTicketRequest, TicketService};
use triago_router::{AssignmentRouter, RouteOutcome};
use triago_test_utils::{MockChannel, TestHarness};

struct RouterFixture {
    harness: TestHarness,
    conversations: Arc<ConversationService>,
    tickets: Arc<TicketService>,
    operator_channel: Arc<MockChannel>,
    router: AssignmentRouter,
}

fn routing_config() -> RoutingConfig {
    RoutingConfig {
        retry_base_ms: 10,
        retry_max_ms: 50,
        ..RoutingConfig::default()
    }
}

async fn fixture_with(config: RoutingConfig) -> RouterFixture {
    let harness = TestHarness::new().await;
    let storage: Arc<dyn StorageAdapter + Send + Sync> = harness.storage.clone();
    let conversations = Arc::new(ConversationService::new(
        storage.clone(),
        harness.bus.clone(),
    ));
    let tickets = Arc::new(TicketService::new(
        storage.clone(),
        harness.bus.clone(),
        TicketConfig::default(),
    ));
    let operator_channel = Arc::new(MockChannel::new());
    let router = AssignmentRouter::new(
        storage,
        conversations.clone(),
        tickets.clone(),
        harness.assistant.clone(),
        harness.channel.clone(),
        operator_channel.clone(),
        config,
    );
    RouterFixture {
        harness,
        conversations,
        tickets,
        operator_channel,
        router,
    }
}

async fn fixture() -> RouterFixture {
    fixture_with(routing_config()).await
}

fn turn(sender: &str, text: &str) -> Turn {
    Turn {
        sender_id: sender.to_string(),
        channel: "chat".to_string(),
        text: text.to_string(),
        message_count: 1,
        started_at: now_rfc3339(),
    }
}

#[tokio::test]
async fn open_conversation_goes_to_assistant() {
    let f = fixture().await;

    let outcome = f.router.route_turn(&turn("cust-1", "where is my order?")).await.unwrap();
    assert_eq!(outcome, RouteOutcome::Assistant);

    let sent = f.harness.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient_id, "cust-1");
    assert_eq!(sent[0].text, "echo: where is my order?");
    assert_eq!(f.operator_channel.sent_count().await, 0);

    let conv = f
        .harness
        .storage
        .latest_conversation_for_customer("cust-1")
        .await
        .unwrap()
        .unwrap();
    assert!(conv.last_customer_message_at.is_some());
    assert!(conv.last_agent_message_at.is_some());
}

#[tokio::test]
async fn handoff_trigger_claims_and_forwards() {
    let f = fixture().await;

    let outcome = f
        .router
        .route_turn(&turn("cust-1", "I want to talk to a HUMAN"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        RouteOutcome::Operator {
            operator: "dispatch".to_string()
        }
    );

    // Forwarded to the operator channel, nothing to the customer.
    let forwarded = f.operator_channel.sent_messages().await;
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].recipient_id, "dispatch");
    assert!(forwarded[0].text.contains("cust-1"));
    assert_eq!(f.harness.channel.sent_count().await, 0);
    assert_eq!(f.harness.assistant.call_count(), 0);

    let conv = f
        .harness
        .storage
        .latest_conversation_for_customer("cust-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conv.status, ConversationStatus::Assigned);
    assert_eq!(conv.assigned_operator.as_deref(), Some("dispatch"));
    assert!(!conv.assistant_enabled);
}

#[tokio::test]
async fn assigned_conversation_forwards_without_assistant() {
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

    let outcome = f.router.route_turn(&turn("cust-1", "any update?")).await.unwrap();
    assert_eq!(
        outcome,
        RouteOutcome::Operator {
            operator: "jo".to_string()
        }
    );
    assert_eq!(f.harness.assistant.call_count(), 0);
    assert_eq!(f.operator_channel.sent_count().await, 1);
    assert_eq!(f.harness.channel.sent_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn run_conflicts_are_retried_with_backoff() {
    let f = fixture().await;
    f.harness.assistant.fail_with_conflicts(2);

    let outcome = f.router.route_turn(&turn("cust-1", "hi")).await.unwrap();
    assert_eq!(outcome, RouteOutcome::Assistant);
    assert_eq!(f.harness.assistant.call_count(), 3);

    let sent = f.harness.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "echo: hi");
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_send_fallback() {
    let f = fixture().await;
    f.harness.assistant.fail_with_conflicts(10);

    let outcome = f.router.route_turn(&turn("cust-1", "hi")).await.unwrap();
    assert_eq!(outcome, RouteOutcome::Fallback);
    assert_eq!(
        f.harness.assistant.call_count(),
        routing_config().max_assistant_attempts
    );

    let sent = f.harness.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, RoutingConfig::default().fallback_message);
}

#[tokio::test]
async fn customer_activity_reopens_closed_conversation() {
    let f = fixture().await;
    let conv = f
        .conversations
        .ensure_conversation("cust-1", "chat")
        .await
        .unwrap();
    let operator = Actor::Operator("jo".to_string());
    f.conversations
        .transition(&conv.id, ConversationStatus::Resolved, &operator, None)
        .await
        .unwrap();
    f.conversations
        .transition(&conv.id, ConversationStatus::Closed, &operator, None)
        .await
        .unwrap();

    let outcome = f.router.route_turn(&turn("cust-1", "it broke again")).await.unwrap();
    assert_eq!(outcome, RouteOutcome::Assistant);

    let conv = f.harness.storage.get_conversation(&conv.id).await.unwrap().unwrap();
    assert_eq!(conv.status, ConversationStatus::Open);
    assert!(conv.assistant_enabled);
}

#[tokio::test]
async fn followup_on_resolved_ticket_auto_reopens_it() {
    let f = fixture().await;
    let conv = f
        .conversations
        .ensure_conversation("cust-1", "chat")
        .await
        .unwrap();
    let ticket = f
        .tickets
        .create_ticket(CreateTicketRequest {
            customer_id: "cust-1".to_string(),
            conversation_id: Some(conv.id.clone()),
            subject: "broken login".to_string(),
            description: None,
            category: "account".to_string(),
            priority: "high".to_string(),
        })
        .await
        .unwrap();
    let operator = Actor::Operator("jo".to_string());
    f.tickets
        .transition(&ticket.id, TicketStatus::Open, &operator, None)
        .await
        .unwrap();
    f.tickets
        .transition(&ticket.id, TicketStatus::InProgress, &operator, None)
        .await
        .unwrap();
    f.tickets
        .transition(&ticket.id, TicketStatus::Resolved, &operator, Some("fixed"))
        .await
        .unwrap();

    let outcome = f.router.route_turn(&turn("cust-1", "still broken")).await.unwrap();
    assert_eq!(outcome, RouteOutcome::Assistant);

    let ticket = f.harness.storage.get_ticket(&ticket.id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.reopen_count, 1);
}

#[tokio::test]
async fn followup_beyond_window_leaves_ticket_resolved() {
    let f = fixture().await;
    let conv = f
        .conversations
        .ensure_conversation("cust-1", "chat")
        .await
        .unwrap();
    let ticket = f
        .tickets
        .create_ticket(CreateTicketRequest {
            customer_id: "cust-1".to_string(),
            conversation_id: Some(conv.id.clone()),
            subject: "broken login".to_string(),
            description: None,
            category: "account".to_string(),
            priority: "high".to_string(),
        })
        .await
        .unwrap();
    let operator = Actor::Operator("jo".to_string());
    f.tickets
        .transition(&ticket.id, TicketStatus::Open, &operator, None)
        .await
        .unwrap();
    f.tickets
        .transition(&ticket.id, TicketStatus::InProgress, &operator, None)
        .await
        .unwrap();
    f.tickets
        .transition(&ticket.id, TicketStatus::Resolved, &operator, Some("fixed"))
        .await
        .unwrap();

    // Backdate the resolution past the 48h window.
    let mut stored = f.harness.storage.get_ticket(&ticket.id).await.unwrap().unwrap();
    stored.resolution.as_mut().unwrap().resolved_at =
        (chrono::Utc::now() - chrono::TimeDelta::hours(72)).to_rfc3339();
    f.harness.storage.update_ticket(&stored).await.unwrap();

    let outcome = f.router.route_turn(&turn("cust-1", "still broken")).await.unwrap();
    assert_eq!(outcome, RouteOutcome::Assistant, "routing proceeds normally");

    let ticket = f.harness.storage.get_ticket(&ticket.id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Resolved, "no auto-reopen");
    assert_eq!(ticket.reopen_count, 0);
}

#[tokio::test]
async fn handoff_on_already_assigned_conversation_stays_with_operator() {
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

    // "human" in the text must not re-assign to the default operator.
    let outcome = f.router.route_turn(&turn("cust-1", "human please")).await.unwrap();
    assert_eq!(
        outcome,
        RouteOutcome::Operator {
            operator: "jo".to_string()
        }
    );
}
