//! Shared storage integration tests.
//!
//! Tests the LedgerStore and TicketStore interfaces against all implementations.
//! Each implementation module imports these test functions and runs them.

pub mod ledger_store_tests;
pub mod ticket_store_tests;
