//! User ledger fields and the creator tier ladder.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Creator tier derived from cumulative lifetime views.
///
/// Variants are declared in ascending order so `Ord` follows the ladder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CreatorTier {
    #[default]
    Beginner,
    Bronze,
    Silver,
    Gold,
}

impl CreatorTier {
    /// All tiers, lowest first.
    pub const ALL: [CreatorTier; 4] = [
        CreatorTier::Beginner,
        CreatorTier::Bronze,
        CreatorTier::Silver,
        CreatorTier::Gold,
    ];

    /// Minimum cumulative views (inclusive) required to hold this tier.
    pub const fn threshold(self) -> u64 {
        match self {
            CreatorTier::Beginner => 0,
            CreatorTier::Bronze => 1_000,
            CreatorTier::Silver => 5_000,
            CreatorTier::Gold => 20_000,
        }
    }

    /// Highest tier whose threshold `total_views` has reached.
    pub fn for_total_views(total_views: u64) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|tier| total_views >= tier.threshold())
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CreatorTier::Beginner => "beginner",
            CreatorTier::Bronze => "bronze",
            CreatorTier::Silver => "silver",
            CreatorTier::Gold => "gold",
        }
    }
}

impl fmt::Display for CreatorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored tier name that matches no known tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown creator tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for CreatorTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| UnknownTier(s.to_string()))
    }
}

/// Ledger-relevant fields of a user.
///
/// `creator_level` is a cached value of [`CreatorTier::for_total_views`] and is
/// only ever rewritten together with `total_views`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: String,
    pub reward_points: i64,
    pub total_views: u64,
    pub creator_level: CreatorTier,
    pub reels_count: u64,
}

impl UserAccount {
    /// A freshly registered user: no points, no views, beginner tier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reward_points: 0,
            total_views: 0,
            creator_level: CreatorTier::Beginner,
            reels_count: 0,
        }
    }
}

/// One reward history entry. `amount` is the signed delta, not the balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardEntry {
    pub amount: i64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}
