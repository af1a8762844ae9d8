//! Ticket ledger helpers and winner selection.

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::{Rng, TryRngCore};

use crate::model::Ticket;

/// Mint `quantity` distinct tickets for one user and event.
pub fn mint_tickets(
    user_id: &str,
    event_id: &str,
    quantity: u32,
    at: DateTime<Utc>,
) -> Vec<Ticket> {
    (0..quantity)
        .map(|_| Ticket::mint(user_id, event_id, at))
        .collect()
}

/// Pick a winner uniformly at random using the operating system CSPRNG.
///
/// Returns `None` when no tickets were sold.
pub fn select_winner(tickets: &[Ticket]) -> Option<&Ticket> {
    select_winner_with(tickets, &mut OsRng.unwrap_err())
}

/// Pick a winner uniformly at random from `rng`. Each ticket has
/// probability `1/N` regardless of position.
pub fn select_winner_with<'a, R: Rng>(
    tickets: &'a [Ticket],
    rng: &mut R,
) -> Option<&'a Ticket> {
    if tickets.is_empty() {
        return None;
    }
    tickets.get(rng.random_range(0..tickets.len()))
}
