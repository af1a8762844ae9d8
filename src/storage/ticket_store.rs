//! TicketStore trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Result;
use crate::model::Ticket;

/// Interface for lucky-draw ticket persistence.
///
/// Tickets are grouped by `event_id`, append-only and immutable once stored.
///
/// # Implementations
///
/// - `SqliteLedgerStore`: SQLite storage
/// - `MockLedgerStore`: In-memory store for tests and the `memory` backend
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Append tickets to their events as one write.
    ///
    /// Fails with `DuplicateTicket` (storing none of them) if any id is
    /// already present.
    async fn store_tickets(&self, tickets: &[Ticket]) -> Result<()>;

    /// Append a single ticket.
    async fn store_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.store_tickets(std::slice::from_ref(ticket)).await
    }

    /// All tickets sold for an event, in purchase order.
    async fn tickets_for_event(&self, event_id: &str) -> Result<Vec<Ticket>>;

    /// Record the winning ticket of an event.
    ///
    /// First write wins: if a winner is already recorded it is returned
    /// unchanged and `ticket` is ignored.
    async fn record_winner(
        &self,
        event_id: &str,
        ticket: &Ticket,
        drawn_at: DateTime<Utc>,
    ) -> Result<Ticket>;

    /// The recorded winner of an event, if it has been drawn.
    async fn winner(&self, event_id: &str) -> Result<Option<Ticket>>;
}
