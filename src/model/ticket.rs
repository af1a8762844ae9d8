//! Lucky-draw tickets.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One entry into a lucky-draw event. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub purchase_date: DateTime<Utc>,
}

impl Ticket {
    /// Mint a ticket with a random v4 UUID id (122 random bits).
    pub fn mint(
        user_id: impl Into<String>,
        event_id: impl Into<String>,
        purchase_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            event_id: event_id.into(),
            purchase_date,
        }
    }
}
