//! In-memory storage contract tests.
//!
//! Run with: cargo test --test storage_mock

mod storage;

use rewards_ledger::storage::MockLedgerStore;

#[tokio::test]
async fn test_mock_ledger_store() {
    println!("=== Mock LedgerStore Tests ===");

    let store = MockLedgerStore::new();
    run_ledger_store_tests!(&store);

    println!("=== All Mock LedgerStore tests PASSED ===");
}

#[tokio::test]
async fn test_mock_ticket_store() {
    println!("=== Mock TicketStore Tests ===");

    let store = MockLedgerStore::new();
    run_ticket_store_tests!(&store);

    println!("=== All Mock TicketStore tests PASSED ===");
}
