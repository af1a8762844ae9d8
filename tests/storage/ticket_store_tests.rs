//! TicketStore interface tests.
//!
//! These tests verify the contract of the TicketStore trait.
//! Each storage implementation should run these tests.

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use rewards_ledger::model::Ticket;
use rewards_ledger::storage::{StorageError, TicketStore};

fn unique_event(prefix: &str) -> String {
    format!("test_{}_{}", prefix, Uuid::new_v4().simple())
}

fn ids(tickets: &[Ticket]) -> Vec<String> {
    tickets.iter().map(|t| t.id.clone()).collect()
}

// =============================================================================
// Storing and listing
// =============================================================================

pub async fn test_empty_event<S: TicketStore>(store: &S) {
    let tickets = store
        .tickets_for_event(&unique_event("empty"))
        .await
        .expect("list should succeed");
    assert!(tickets.is_empty());
}

pub async fn test_store_and_list_in_order<S: TicketStore>(store: &S) {
    let event = unique_event("order");
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let batch: Vec<Ticket> = (0..3)
        .map(|i| Ticket::mint("alice", &event, at + Duration::seconds(i)))
        .collect();
    store.store_tickets(&batch).await.expect("store should succeed");

    let single = Ticket::mint("bob", &event, at + Duration::seconds(10));
    store.store_ticket(&single).await.expect("store should succeed");

    let listed = store.tickets_for_event(&event).await.expect("list should succeed");
    let mut expected = ids(&batch);
    expected.push(single.id.clone());
    assert_eq!(ids(&listed), expected, "tickets come back in purchase order");
    assert_eq!(listed[3].user_id, "bob");
    assert_eq!(listed[3].event_id, event);
    assert_eq!(listed[3].purchase_date, at + Duration::seconds(10));
}

pub async fn test_events_are_isolated<S: TicketStore>(store: &S) {
    let first = unique_event("iso_a");
    let second = unique_event("iso_b");
    store
        .store_ticket(&Ticket::mint("alice", &first, Utc::now()))
        .await
        .unwrap();
    store
        .store_tickets(&[
            Ticket::mint("alice", &second, Utc::now()),
            Ticket::mint("bob", &second, Utc::now()),
        ])
        .await
        .unwrap();

    assert_eq!(store.tickets_for_event(&first).await.unwrap().len(), 1);
    assert_eq!(store.tickets_for_event(&second).await.unwrap().len(), 2);
}

pub async fn test_duplicate_ticket_rejects_batch<S: TicketStore>(store: &S) {
    let event = unique_event("dup");
    let existing = Ticket::mint("alice", &event, Utc::now());
    store.store_ticket(&existing).await.unwrap();

    let fresh = Ticket::mint("alice", &event, Utc::now());
    let result = store.store_tickets(&[fresh, existing.clone()]).await;
    assert!(matches!(result, Err(StorageError::DuplicateTicket(id)) if id == existing.id));

    let listed = store.tickets_for_event(&event).await.unwrap();
    assert_eq!(ids(&listed), vec![existing.id], "no ticket of a failed batch is kept");
}

// =============================================================================
// Draw results
// =============================================================================

pub async fn test_winner_absent_before_draw<S: TicketStore>(store: &S) {
    let winner = store
        .winner(&unique_event("undrawn"))
        .await
        .expect("winner should succeed");
    assert!(winner.is_none());
}

pub async fn test_first_winner_is_kept<S: TicketStore>(store: &S) {
    let event = unique_event("winner");
    let first = Ticket::mint("alice", &event, Utc::now());
    let second = Ticket::mint("bob", &event, Utc::now());
    store
        .store_tickets(&[first.clone(), second.clone()])
        .await
        .unwrap();

    let recorded = store
        .record_winner(&event, &first, Utc::now())
        .await
        .expect("record should succeed");
    assert_eq!(recorded.id, first.id);

    let again = store
        .record_winner(&event, &second, Utc::now())
        .await
        .expect("record should succeed");
    assert_eq!(again.id, first.id, "a recorded winner is never replaced");

    let stored = store.winner(&event).await.unwrap().expect("winner should exist");
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.user_id, "alice");
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all TicketStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_ticket_store_tests {
    ($store:expr) => {
        use $crate::storage::ticket_store_tests::*;

        test_empty_event($store).await;
        println!("  test_empty_event: PASSED");

        test_store_and_list_in_order($store).await;
        println!("  test_store_and_list_in_order: PASSED");

        test_events_are_isolated($store).await;
        println!("  test_events_are_isolated: PASSED");

        test_duplicate_ticket_rejects_batch($store).await;
        println!("  test_duplicate_ticket_rejects_batch: PASSED");

        test_winner_absent_before_draw($store).await;
        println!("  test_winner_absent_before_draw: PASSED");

        test_first_winner_is_kept($store).await;
        println!("  test_first_winner_is_kept: PASSED");
    };
}
