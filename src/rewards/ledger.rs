//! RewardsLedger: the facade that applies reward rules against the stores.
//!
//! Every mutation is a single store call, so atomicity comes from the store.
//! Writes that lose a race with another writer are retried as a whole with
//! exponential backoff; anything else is surfaced unchanged.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use backon::Retryable;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::earnings::{self, EarningsSummary};
use super::engagement::EngagementEvent;
use super::error::LedgerError;
use super::lucky_draw::{calculate_lucky_draw_amount, LuckyDrawAmount};
use super::tickets::{mint_tickets, select_winner};
use super::tier;
use crate::config::{LuckyDrawConfig, RetryConfig, RewardsConfig};
use crate::model::{
    CreatorTier, Earning, EngagementAction, PaymentEvent, PaymentMethod, PaymentPurpose,
    RewardEntry, Ticket, UnknownAction, UserAccount,
};
use crate::storage::{CoinPurchase, LedgerStore, ReelUpdate, StorageError, TicketStore};
use crate::utils::retry::ledger_backoff;

type Result<T> = std::result::Result<T, LedgerError>;

/// History reason for coin ticket purchases.
pub const TICKET_PURCHASE_REASON: &str = "ticket purchase";

/// Result of completing a reel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReelOutcome {
    /// Cash value of this reel alone.
    pub earnings_awarded: Decimal,
    /// The unpaid earning stored for the reel, if any.
    pub earning: Option<Earning>,
    pub new_tier: CreatorTier,
    pub total_views: u64,
    pub reels_count: u64,
    pub points_awarded: i64,
    pub reward_points: i64,
}

/// Tickets minted by a purchase and the balance after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketReceipt {
    pub tickets: Vec<Ticket>,
    pub reward_points: i64,
}

/// History/earning source for ticket payments that could not be honoured.
pub const UNAPPLIED_PAYMENT_SOURCE: &str = "Unapplied payment";

/// Ledger effect of a successful payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Tickets(Vec<Ticket>),
    Credited(Earning),
    /// The tickets could not be issued; the settled amount is held as an
    /// unpaid earning so it can be paid back.
    Unapplied(Earning),
}

/// Rewards ledger over a [`LedgerStore`] and a [`TicketStore`].
///
/// Clones share the underlying stores.
#[derive(Clone)]
pub struct RewardsLedger {
    store: Arc<dyn LedgerStore>,
    tickets: Arc<dyn TicketStore>,
    rewards: RewardsConfig,
    lucky_draw: LuckyDrawConfig,
    retry: RetryConfig,
}

impl RewardsLedger {
    /// Create a ledger with default rule, pricing and retry settings.
    pub fn new(store: Arc<dyn LedgerStore>, tickets: Arc<dyn TicketStore>) -> Self {
        Self {
            store,
            tickets,
            rewards: RewardsConfig::default(),
            lucky_draw: LuckyDrawConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_rewards_config(mut self, rewards: RewardsConfig) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_lucky_draw_config(mut self, lucky_draw: LuckyDrawConfig) -> Self {
        self.lucky_draw = lucky_draw;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Run a store operation, retrying it while it reports a write conflict.
    async fn with_retry<T, F, Fut>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, StorageError>>,
    {
        f.retry(ledger_backoff(&self.retry))
            .when(StorageError::is_conflict)
            .notify(|err: &StorageError, dur: Duration| {
                warn!(operation, error = %err, delay = ?dur, "Write conflict, retrying");
            })
            .await
            .map_err(LedgerError::from)
    }

    // ========================================================================
    // Points
    // ========================================================================

    /// Register a user with an empty ledger. Returns the existing account if
    /// the user is already registered.
    pub async fn register_user(&self, user_id: &str) -> Result<UserAccount> {
        require_id("user id", user_id)?;
        let account = self
            .with_retry("register_user", || async move {
                self.store.create_user(user_id).await
            })
            .await?;
        debug!(user_id, "User registered");
        Ok(account)
    }

    /// Reward-point balance. Zero for an unknown or fresh user.
    pub async fn balance(&self, user_id: &str) -> Result<i64> {
        Ok(self
            .store
            .get_user(user_id)
            .await?
            .map(|user| user.reward_points)
            .unwrap_or(0))
    }

    /// Reward history in insertion order.
    pub async fn history(&self, user_id: &str) -> Result<Vec<RewardEntry>> {
        Ok(self.store.reward_history(user_id).await?)
    }

    /// Apply a signed point delta with its history reason. Returns the new
    /// balance.
    pub async fn add_reward_points(&self, user_id: &str, points: i64, reason: &str) -> Result<i64> {
        let now = Utc::now();
        let balance = self
            .with_retry("add_reward_points", || async move {
                self.store
                    .add_reward_points(user_id, points, reason, now)
                    .await
            })
            .await?;
        debug!(user_id, points, balance, reason, "Reward points applied");
        Ok(balance)
    }

    /// Award the points for one engagement event. Not idempotent: the same
    /// event recorded twice is rewarded twice.
    pub async fn record_engagement(&self, user_id: &str, event: EngagementEvent) -> Result<i64> {
        let reason = event.reason();
        self.add_reward_points(user_id, event.points(), &reason)
            .await
    }

    /// Award the points for an engagement action named by string.
    pub async fn record_action(&self, user_id: &str, action: &str) -> Result<i64> {
        let action: EngagementAction = action
            .parse()
            .map_err(|e: UnknownAction| LedgerError::InvalidArgument(e.to_string()))?;
        self.record_engagement(user_id, EngagementEvent::Action(action))
            .await
    }

    pub async fn claim_daily_login(&self, user_id: &str) -> Result<i64> {
        self.record_engagement(user_id, EngagementEvent::DailyLogin)
            .await
    }

    // ========================================================================
    // Reels and earnings
    // ========================================================================

    /// Complete a reel with `views` views.
    ///
    /// Advances the creator's view total, tier and reel count, awards the reel
    /// points and, when enabled, stores the reel's cash value as an unpaid
    /// earning. All of it is one store write.
    pub async fn complete_reel(&self, user_id: &str, views: u64) -> Result<ReelOutcome> {
        let event = EngagementEvent::ReelCreated { views };
        let points = event.points();
        let reason = event.reason();
        let earnings_awarded = tier::reel_earnings(views);
        let now = Utc::now();

        let earning = (self.rewards.persist_reel_earnings && earnings_awarded > Decimal::ZERO)
            .then(|| {
                Earning::unpaid(
                    user_id,
                    earnings_awarded,
                    format!("Reel earnings: {} views", views),
                    now,
                )
            });

        let update = ReelUpdate {
            views,
            points,
            reason,
            earning: earning.clone(),
            at: now,
        };
        let update = &update;
        let account = self
            .with_retry("complete_reel", || async move {
                self.store.record_reel(user_id, update).await
            })
            .await?;

        info!(
            user_id,
            views,
            tier = %account.creator_level,
            earnings = %earnings_awarded,
            "Reel completed"
        );

        Ok(ReelOutcome {
            earnings_awarded,
            earning,
            new_tier: account.creator_level,
            total_views: account.total_views,
            reels_count: account.reels_count,
            points_awarded: points,
            reward_points: account.reward_points,
        })
    }

    /// Record an unpaid earning. The amount must be non-negative with at most
    /// two fractional digits.
    pub async fn add_earning(&self, user_id: &str, amount: Decimal, source: &str) -> Result<Earning> {
        validate_money("earning amount", amount)?;
        let earning = Earning::unpaid(user_id, amount, source, Utc::now());
        let earning = &earning;
        let stored = self
            .with_retry("add_earning", || async move {
                self.store.add_earning(earning).await
            })
            .await?;
        info!(user_id, amount = %amount, source, "Earning recorded");
        Ok(stored)
    }

    /// Lifetime earnings, newest first, with their total.
    pub async fn earnings_summary(&self, user_id: &str) -> Result<EarningsSummary> {
        let earnings = self.store.earnings(user_id).await?;
        Ok(earnings::summarize(earnings))
    }

    /// Sum of unpaid earnings. Zero when everything has been paid.
    pub async fn pending_payouts(&self, user_id: &str) -> Result<Decimal> {
        let earnings = self.store.earnings(user_id).await?;
        Ok(earnings::pending_total(&earnings))
    }

    /// Mark an earning as paid out. Fails with `AlreadyPaid` on a second call.
    pub async fn mark_earning_paid(&self, earning_id: Uuid) -> Result<Earning> {
        let earning = self
            .with_retry("mark_earning_paid", || async move {
                self.store.mark_earning_paid(earning_id).await
            })
            .await?;
        info!(earning_id = %earning_id, user_id = %earning.user_id, "Earning paid");
        Ok(earning)
    }

    // ========================================================================
    // Lucky draw
    // ========================================================================

    /// Prize pool for `user_id` from their earnings in `now`'s calendar month.
    ///
    /// `base_amount` falls back to the configured base when `None`.
    pub async fn lucky_draw_pool(
        &self,
        user_id: &str,
        base_amount: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<LuckyDrawAmount> {
        let base_amount = base_amount.unwrap_or(self.lucky_draw.base_amount);
        if base_amount < Decimal::ZERO {
            return Err(LedgerError::InvalidArgument(format!(
                "base amount {} is negative",
                base_amount
            )));
        }
        let earnings = self.store.earnings(user_id).await?;
        let monthly = earnings::monthly_total(&earnings, &earnings::month_key(now));
        Ok(calculate_lucky_draw_amount(base_amount, monthly))
    }

    /// Buy `quantity` tickets for `event_id` with reward points.
    ///
    /// The coin path deducts `ticket_coin_price * quantity` points and mints
    /// the tickets in one transaction. Cash tickets are only issued by
    /// [`handle_payment`](Self::handle_payment) from a settled payment, so a
    /// cash request here fails with `PaymentRequired`.
    pub async fn purchase_tickets(
        &self,
        user_id: &str,
        event_id: &str,
        quantity: u32,
        method: PaymentMethod,
    ) -> Result<TicketReceipt> {
        require_id("event id", event_id)?;
        self.check_quantity(quantity)?;

        match method {
            PaymentMethod::Coins => self.purchase_with_coins(user_id, event_id, quantity).await,
            PaymentMethod::Cash => {
                warn!(user_id, event_id, quantity, "Cash ticket request without a settled payment");
                Err(LedgerError::PaymentRequired(
                    "cash tickets are issued only from settled payments".to_string(),
                ))
            }
        }
    }

    async fn purchase_with_coins(
        &self,
        user_id: &str,
        event_id: &str,
        quantity: u32,
    ) -> Result<TicketReceipt> {
        let cost = self
            .lucky_draw
            .ticket_coin_price
            .checked_mul(i64::from(quantity))
            .ok_or_else(|| LedgerError::InvalidArgument("ticket cost overflows".to_string()))?;

        let (tickets, reward_points) = self
            .with_retry("purchase_tickets", || async move {
                let now = Utc::now();
                let purchase = CoinPurchase {
                    user_id: user_id.to_string(),
                    cost,
                    reason: TICKET_PURCHASE_REASON.to_string(),
                    tickets: mint_tickets(user_id, event_id, quantity, now),
                    at: now,
                };
                let balance = self.store.purchase_tickets(&purchase).await?;
                Ok::<_, StorageError>((purchase.tickets, balance))
            })
            .await
            .inspect_err(|err| {
                if let LedgerError::InsufficientFunds { balance, required } = err {
                    info!(user_id, event_id, balance, required, "Ticket purchase declined");
                }
            })?;

        info!(user_id, event_id, quantity, cost, reward_points, "Tickets bought with coins");
        Ok(TicketReceipt {
            tickets,
            reward_points,
        })
    }

    /// Issue the tickets a settled cash payment was for.
    ///
    /// A payment that cannot buy them (bad event id, quantity out of bounds,
    /// amount short of `ticket_cash_price * quantity`) is kept as an unpaid
    /// earning instead of being dropped.
    async fn apply_ticket_payment(
        &self,
        user_id: &str,
        event_id: &str,
        quantity: u32,
        paid: Decimal,
    ) -> Result<PaymentOutcome> {
        if self.store.get_user(user_id).await?.is_none() {
            return Err(LedgerError::NotFound(format!("user {}", user_id)));
        }

        let covered = require_id("event id", event_id)
            .and_then(|()| self.check_quantity(quantity))
            .and_then(|()| self.check_cash_payment(quantity, paid));
        if let Err(rejected) = covered {
            warn!(user_id, event_id, paid = %paid, reason = %rejected, "Ticket payment not honoured");
            let source = format!("{}: {}", UNAPPLIED_PAYMENT_SOURCE, event_id);
            let earning = self.add_earning(user_id, paid, &source).await?;
            return Ok(PaymentOutcome::Unapplied(earning));
        }

        let tickets = self
            .with_retry("store_tickets", || async move {
                let tickets = mint_tickets(user_id, event_id, quantity, Utc::now());
                self.tickets.store_tickets(&tickets).await?;
                Ok::<_, StorageError>(tickets)
            })
            .await?;

        info!(user_id, event_id, quantity, paid = %paid, "Tickets bought with cash");
        Ok(PaymentOutcome::Tickets(tickets))
    }

    /// Apply a settled payment from the payment gateway.
    ///
    /// Events are assumed verified and delivered once; a redelivered event is
    /// applied again.
    pub async fn handle_payment(&self, user_id: &str, event: PaymentEvent) -> Result<PaymentOutcome> {
        match event {
            PaymentEvent::Failed { reason } => {
                warn!(user_id, reason = %reason, "Payment failed upstream");
                Err(LedgerError::UpstreamPaymentError(reason))
            }
            PaymentEvent::Succeeded { amount, purpose } => {
                validate_money("payment amount", amount)?;
                match purpose {
                    PaymentPurpose::LuckyDrawTickets { event_id, quantity } => {
                        self.apply_ticket_payment(user_id, &event_id, quantity, amount)
                            .await
                    }
                    PaymentPurpose::Credit { source } => {
                        let earning = self.add_earning(user_id, amount, &source).await?;
                        Ok(PaymentOutcome::Credited(earning))
                    }
                }
            }
        }
    }

    /// All tickets sold for an event, in purchase order.
    pub async fn tickets_for_event(&self, event_id: &str) -> Result<Vec<Ticket>> {
        Ok(self.tickets.tickets_for_event(event_id).await?)
    }

    /// Tickets held by one user for an event.
    pub async fn tickets_for_user(&self, user_id: &str, event_id: &str) -> Result<Vec<Ticket>> {
        let tickets = self.tickets.tickets_for_event(event_id).await?;
        Ok(tickets
            .into_iter()
            .filter(|ticket| ticket.user_id == user_id)
            .collect())
    }

    /// Draw the winner of an event.
    ///
    /// The first draw is recorded; later draws return the recorded winner.
    pub async fn draw(&self, event_id: &str) -> Result<Ticket> {
        require_id("event id", event_id)?;
        if let Some(winner) = self.tickets.winner(event_id).await? {
            debug!(event_id, ticket_id = %winner.id, "Event already drawn");
            return Ok(winner);
        }

        let sold = self.tickets.tickets_for_event(event_id).await?;
        let picked = select_winner(&sold)
            .ok_or_else(|| LedgerError::NoTicketsSold(event_id.to_string()))?;

        let drawn_at = Utc::now();
        let winner = self
            .with_retry("record_winner", || async move {
                self.tickets.record_winner(event_id, picked, drawn_at).await
            })
            .await?;

        info!(
            event_id,
            ticket_id = %winner.id,
            user_id = %winner.user_id,
            tickets_sold = sold.len(),
            "Lucky draw winner selected"
        );
        Ok(winner)
    }

    fn check_quantity(&self, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(LedgerError::InvalidArgument(
                "ticket quantity must be at least 1".to_string(),
            ));
        }
        if quantity > self.lucky_draw.max_tickets_per_purchase {
            return Err(LedgerError::InvalidArgument(format!(
                "ticket quantity {} exceeds the limit of {}",
                quantity, self.lucky_draw.max_tickets_per_purchase
            )));
        }
        Ok(())
    }

    fn check_cash_payment(&self, quantity: u32, paid: Decimal) -> Result<()> {
        let price = self.lucky_draw.ticket_cash_price * Decimal::from(quantity);
        if paid < price {
            return Err(LedgerError::InvalidArgument(format!(
                "paid {} does not cover {} tickets at {}",
                paid, quantity, self.lucky_draw.ticket_cash_price
            )));
        }
        Ok(())
    }
}

fn require_id(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::InvalidArgument(format!("{} is required", what)));
    }
    Ok(())
}

fn validate_money(what: &str, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::InvalidArgument(format!(
            "{} {} is negative",
            what, amount
        )));
    }
    if amount.normalize().scale() > 2 {
        return Err(LedgerError::InvalidArgument(format!(
            "{} {} has more than two fractional digits",
            what, amount
        )));
    }
    Ok(())
}
