//! Lucky-draw prize pool calculator.

use rust_decimal::Decimal;

/// Share of base amount plus monthly earnings that funds the pool (0.3).
pub const POOL_SHARE: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

/// Accumulation is reported in whole steps of this size.
pub const ACCUMULATION_STEP: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Result of a pool calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuckyDrawAmount {
    pub lucky_draw_pool: Decimal,
    /// Pool truncated down to a multiple of [`ACCUMULATION_STEP`].
    pub total_accumulation: Decimal,
    pub monthly_earnings: Decimal,
}

/// Compute the monthly prize pool. Pure: same inputs, same output.
pub fn calculate_lucky_draw_amount(base_amount: Decimal, monthly_earnings: Decimal) -> LuckyDrawAmount {
    let lucky_draw_pool = (base_amount + monthly_earnings) * POOL_SHARE;
    let total_accumulation = (lucky_draw_pool / ACCUMULATION_STEP).trunc() * ACCUMULATION_STEP;
    LuckyDrawAmount {
        lucky_draw_pool,
        total_accumulation,
        monthly_earnings,
    }
}
