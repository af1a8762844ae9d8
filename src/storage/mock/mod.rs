//! In-memory storage implementation.
//!
//! Backs unit tests and the `memory` storage type. All state sits behind one
//! lock, so every trait method is atomic with respect to the others.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CoinPurchase, LedgerStore, ReelUpdate, Result, StorageError, TicketStore};
use crate::model::{Earning, RewardEntry, Ticket, UserAccount};
use crate::rewards::tier;

#[derive(Default)]
struct LedgerState {
    users: HashMap<String, UserAccount>,
    history: HashMap<String, Vec<RewardEntry>>,
    earnings: Vec<Earning>,
    tickets: HashMap<String, Vec<Ticket>>,
    ticket_ids: HashSet<String>,
    winners: HashMap<String, Ticket>,
}

impl LedgerState {
    fn user_mut(&mut self, user_id: &str) -> Result<&mut UserAccount> {
        self.users
            .get_mut(user_id)
            .ok_or_else(|| StorageError::UserNotFound(user_id.to_string()))
    }

    fn require_user(&self, user_id: &str) -> Result<()> {
        if self.users.contains_key(user_id) {
            Ok(())
        } else {
            Err(StorageError::UserNotFound(user_id.to_string()))
        }
    }

    fn apply_points(
        &mut self,
        user_id: &str,
        delta: i64,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<i64> {
        let user = self.user_mut(user_id)?;
        let balance = user.reward_points;
        let new_balance = balance
            .checked_add(delta)
            .filter(|b| *b >= 0)
            .ok_or_else(|| StorageError::InsufficientBalance {
                user_id: user_id.to_string(),
                balance,
                required: delta.saturating_neg(),
            })?;
        user.reward_points = new_balance;
        self.history
            .entry(user_id.to_string())
            .or_default()
            .push(RewardEntry {
                amount: delta,
                reason: reason.to_string(),
                timestamp: at,
            });
        Ok(new_balance)
    }

    fn check_new_tickets(&self, tickets: &[Ticket]) -> Result<()> {
        let mut batch = HashSet::new();
        for ticket in tickets {
            if self.ticket_ids.contains(&ticket.id) || !batch.insert(ticket.id.as_str()) {
                return Err(StorageError::DuplicateTicket(ticket.id.clone()));
            }
        }
        Ok(())
    }

    fn insert_tickets(&mut self, tickets: &[Ticket]) {
        for ticket in tickets {
            self.ticket_ids.insert(ticket.id.clone());
            self.tickets
                .entry(ticket.event_id.clone())
                .or_default()
                .push(ticket.clone());
        }
    }
}

/// Mock ledger store that keeps everything in memory.
#[derive(Default)]
pub struct MockLedgerStore {
    state: RwLock<LedgerState>,
    pending_conflicts: AtomicU32,
}

impl MockLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` mutating calls fail with a write conflict.
    pub fn inject_conflicts(&self, count: u32) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    pub async fn ticket_count(&self) -> usize {
        self.state.read().await.ticket_ids.len()
    }

    fn take_conflict(&self) -> Result<()> {
        let took = self
            .pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if took {
            Err(StorageError::Conflict("injected write conflict".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LedgerStore for MockLedgerStore {
    async fn create_user(&self, user_id: &str) -> Result<UserAccount> {
        self.take_conflict()?;
        let mut state = self.state.write().await;
        Ok(state
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| UserAccount::new(user_id))
            .clone())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserAccount>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn add_reward_points(
        &self,
        user_id: &str,
        delta: i64,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<i64> {
        self.take_conflict()?;
        self.state
            .write()
            .await
            .apply_points(user_id, delta, reason, at)
    }

    async fn reward_history(&self, user_id: &str) -> Result<Vec<RewardEntry>> {
        let state = self.state.read().await;
        state.require_user(user_id)?;
        Ok(state.history.get(user_id).cloned().unwrap_or_default())
    }

    async fn record_reel(&self, user_id: &str, update: &ReelUpdate) -> Result<UserAccount> {
        self.take_conflict()?;
        let mut state = self.state.write().await;

        // Validate everything before the first mutation
        let mut account = state
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StorageError::UserNotFound(user_id.to_string()))?;
        tier::advance(&mut account, update.views);
        if let Some(earning) = &update.earning {
            super::helpers::to_cents(earning.amount)?;
        }

        state.apply_points(user_id, update.points, &update.reason, update.at)?;
        let user = state.user_mut(user_id)?;
        user.total_views = account.total_views;
        user.creator_level = account.creator_level;
        user.reels_count = account.reels_count;
        let updated = user.clone();

        if let Some(earning) = &update.earning {
            state.earnings.push(earning.clone());
        }
        Ok(updated)
    }

    async fn add_earning(&self, earning: &Earning) -> Result<Earning> {
        self.take_conflict()?;
        super::helpers::to_cents(earning.amount)?;
        let mut state = self.state.write().await;
        state.require_user(&earning.user_id)?;
        state.earnings.push(earning.clone());
        Ok(earning.clone())
    }

    async fn earnings(&self, user_id: &str) -> Result<Vec<Earning>> {
        let state = self.state.read().await;
        state.require_user(user_id)?;
        Ok(state
            .earnings
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_earning_paid(&self, earning_id: Uuid) -> Result<Earning> {
        self.take_conflict()?;
        let mut state = self.state.write().await;
        let earning = state
            .earnings
            .iter_mut()
            .find(|e| e.id == earning_id)
            .ok_or(StorageError::EarningNotFound(earning_id))?;
        if earning.is_paid {
            return Err(StorageError::EarningAlreadyPaid(earning_id));
        }
        earning.is_paid = true;
        Ok(earning.clone())
    }

    async fn purchase_tickets(&self, purchase: &CoinPurchase) -> Result<i64> {
        self.take_conflict()?;
        let mut state = self.state.write().await;
        state.check_new_tickets(&purchase.tickets)?;
        let balance = state.apply_points(
            &purchase.user_id,
            purchase.cost.saturating_neg(),
            &purchase.reason,
            purchase.at,
        )?;
        state.insert_tickets(&purchase.tickets);
        Ok(balance)
    }
}

#[async_trait]
impl TicketStore for MockLedgerStore {
    async fn store_tickets(&self, tickets: &[Ticket]) -> Result<()> {
        self.take_conflict()?;
        let mut state = self.state.write().await;
        state.check_new_tickets(tickets)?;
        state.insert_tickets(tickets);
        Ok(())
    }

    async fn tickets_for_event(&self, event_id: &str) -> Result<Vec<Ticket>> {
        Ok(self
            .state
            .read()
            .await
            .tickets
            .get(event_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_winner(
        &self,
        event_id: &str,
        ticket: &Ticket,
        _drawn_at: DateTime<Utc>,
    ) -> Result<Ticket> {
        self.take_conflict()?;
        let mut state = self.state.write().await;
        Ok(state
            .winners
            .entry(event_id.to_string())
            .or_insert_with(|| ticket.clone())
            .clone())
    }

    async fn winner(&self, event_id: &str) -> Result<Option<Ticket>> {
        Ok(self.state.read().await.winners.get(event_id).cloned())
    }
}
