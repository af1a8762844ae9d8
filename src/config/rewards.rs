//! Reward rule, lucky-draw and retry configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Reward rule switches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    /// Store every non-zero reel cash amount as an unpaid earning in the same
    /// write as the reel. When false, callers record earnings explicitly.
    pub persist_reel_earnings: bool,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            persist_reel_earnings: true,
        }
    }
}

/// Lucky-draw pricing and pool settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LuckyDrawConfig {
    /// Reward points per ticket on the coin path.
    pub ticket_coin_price: i64,
    /// Cash price per ticket on the cash path.
    pub ticket_cash_price: Decimal,
    /// Upper bound on tickets minted by one purchase.
    pub max_tickets_per_purchase: u32,
    /// Base amount used when a pool request does not supply one.
    pub base_amount: Decimal,
}

impl Default for LuckyDrawConfig {
    fn default() -> Self {
        Self {
            ticket_coin_price: 100,
            ticket_cash_price: Decimal::ONE,
            max_tickets_per_purchase: 100,
            base_amount: Decimal::ZERO,
        }
    }
}

/// Backoff for retrying operations that hit a concurrent write.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Retries after the first attempt.
    pub max_times: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 10,
            max_delay_ms: 500,
            max_times: 5,
        }
    }
}
