//! Creator tier engine.
//!
//! Advances a creator's cumulative view count, reel count and tier on each
//! completed reel, and prices the reel in cash from its own view count.

use rust_decimal::Decimal;

use crate::model::{CreatorTier, UserAccount};

/// Flat per-reel cash prices, highest first: `(min views, dollars)`.
///
/// Only the highest matching price applies.
pub const REEL_CASH_TIERS: [(u64, i64); 3] = [(20_000, 30), (5_000, 15), (1_000, 5)];

/// Views at which a reel counts as viral.
pub const VIRAL_VIEWS: u64 = 100_000;

/// Bonus added on top of the flat price for a viral reel.
pub const VIRAL_BONUS_DOLLARS: i64 = 50;

/// Record one completed reel with `views` views on the account.
///
/// Adds to the cumulative views, re-derives the tier from the new total and
/// counts the reel. Points are not touched.
pub fn advance(account: &mut UserAccount, views: u64) {
    account.total_views = account.total_views.saturating_add(views);
    account.creator_level = CreatorTier::for_total_views(account.total_views);
    account.reels_count = account.reels_count.saturating_add(1);
}

/// Cash earned by a single reel, from that reel's views only.
pub fn reel_earnings(views: u64) -> Decimal {
    let flat = REEL_CASH_TIERS
        .iter()
        .find(|(min_views, _)| views >= *min_views)
        .map(|(_, dollars)| *dollars)
        .unwrap_or(0);
    let viral = if views >= VIRAL_VIEWS {
        VIRAL_BONUS_DOLLARS
    } else {
        0
    };
    Decimal::new(flat + viral, 0)
}
