//! Cash earnings credited to a user.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A cash earning with two fractional digits, never negative.
///
/// `is_paid` moves from false to true once, when the earning is paid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Earning {
    pub id: Uuid,
    pub user_id: String,
    pub amount: Decimal,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub is_paid: bool,
}

impl Earning {
    /// New unpaid earning with a fresh id.
    pub fn unpaid(
        user_id: impl Into<String>,
        amount: Decimal,
        source: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            amount,
            source: source.into(),
            created_at,
            is_paid: false,
        }
    }
}
