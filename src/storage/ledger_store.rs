//! LedgerStore trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Result;
use crate::model::{Earning, RewardEntry, Ticket, UserAccount};

/// Everything persisted by one reel-completion event.
///
/// Applied as a single write: view total, tier, reel count, the point reward
/// with its history entry, and the optional earning.
#[derive(Debug, Clone)]
pub struct ReelUpdate {
    pub views: u64,
    pub points: i64,
    pub reason: String,
    pub earning: Option<Earning>,
    pub at: DateTime<Utc>,
}

/// A coin-paid ticket purchase: deduct `cost` points and store `tickets`.
#[derive(Debug, Clone)]
pub struct CoinPurchase {
    pub user_id: String,
    pub cost: i64,
    pub reason: String,
    pub tickets: Vec<Ticket>,
    pub at: DateTime<Utc>,
}

/// Interface for the per-user points and earnings ledger.
///
/// Every method is atomic: a concurrent reader never observes a balance
/// without its history entry, or a view total without its re-derived tier.
///
/// # Implementations
///
/// - `SqliteLedgerStore`: SQLite storage
/// - `MockLedgerStore`: In-memory store for tests and the `memory` backend
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create a user with an empty ledger.
    ///
    /// Idempotent: returns the existing account if the user is already known.
    async fn create_user(&self, user_id: &str) -> Result<UserAccount>;

    /// Load a user's ledger fields. Returns `None` for an unknown user.
    async fn get_user(&self, user_id: &str) -> Result<Option<UserAccount>>;

    /// Apply a signed point delta and append the matching history entry.
    ///
    /// Returns the new balance. Fails with `UserNotFound` for an unknown user
    /// and `InsufficientBalance` if the balance would go negative.
    async fn add_reward_points(
        &self,
        user_id: &str,
        delta: i64,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<i64>;

    /// Reward history in insertion order.
    async fn reward_history(&self, user_id: &str) -> Result<Vec<RewardEntry>>;

    /// Apply a reel-completion event and return the updated account.
    async fn record_reel(&self, user_id: &str, update: &ReelUpdate) -> Result<UserAccount>;

    /// Persist a new earning. Fails with `UserNotFound` for an unknown owner.
    async fn add_earning(&self, earning: &Earning) -> Result<Earning>;

    /// All earnings of a user in insertion order.
    async fn earnings(&self, user_id: &str) -> Result<Vec<Earning>>;

    /// Mark an unpaid earning as paid.
    ///
    /// Fails with `EarningAlreadyPaid` if it was paid before.
    async fn mark_earning_paid(&self, earning_id: Uuid) -> Result<Earning>;

    /// Deduct points and mint tickets as one transaction.
    ///
    /// On any failure nothing is written. Returns the new balance.
    async fn purchase_tickets(&self, purchase: &CoinPurchase) -> Result<i64>;
}
