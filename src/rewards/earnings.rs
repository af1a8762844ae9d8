//! Earnings aggregator: read-side totals over a user's earnings.
//!
//! Totals are computed at query time from the stored records.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;

use crate::model::Earning;

/// Lifetime earnings of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarningsSummary {
    pub total: Decimal,
    /// Newest first.
    pub earnings: Vec<Earning>,
}

/// Build the summary from earnings in insertion order.
///
/// Earnings with equal timestamps keep newest-inserted first.
pub fn summarize(mut earnings: Vec<Earning>) -> EarningsSummary {
    earnings.reverse();
    earnings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    EarningsSummary {
        total: earnings.iter().map(|e| e.amount).sum(),
        earnings,
    }
}

/// Sum of earnings not yet paid out. Zero when there are none.
pub fn pending_total(earnings: &[Earning]) -> Decimal {
    earnings
        .iter()
        .filter(|e| !e.is_paid)
        .map(|e| e.amount)
        .sum()
}

/// Calendar month key, `YYYY-MM`.
pub fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

/// Sum of earnings created in the month identified by `month`.
pub fn monthly_total(earnings: &[Earning], month: &str) -> Decimal {
    earnings
        .iter()
        .filter(|e| month_key(e.created_at) == month)
        .map(|e| e.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn earning(cents: i64, day: u32, paid: bool) -> Earning {
        let mut e = Earning::unpaid(
            "u",
            Decimal::new(cents, 2),
            "test",
            Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap(),
        );
        e.is_paid = paid;
        e
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        let summary = summarize(vec![]);
        assert_eq!(summary.total, Decimal::ZERO);
        assert!(summary.earnings.is_empty());
    }

    #[test]
    fn test_summary_sorted_newest_first() {
        let summary = summarize(vec![
            earning(500, 1, false),
            earning(1500, 20, true),
            earning(250, 10, false),
        ]);
        assert_eq!(summary.total, Decimal::new(2250, 2));
        let days: Vec<u32> = summary.earnings.iter().map(|e| e.created_at.day()).collect();
        assert_eq!(days, vec![20, 10, 1]);
    }

    #[test]
    fn test_pending_excludes_paid() {
        let all_paid = vec![earning(500, 1, true), earning(700, 2, true)];
        assert_eq!(pending_total(&all_paid), Decimal::ZERO);

        let mixed = vec![earning(500, 1, true), earning(725, 2, false)];
        assert_eq!(pending_total(&mixed), Decimal::new(725, 2));
    }

    #[test]
    fn test_monthly_total_filters_by_month() {
        let mut april = earning(900, 1, false);
        april.created_at = Utc.with_ymd_and_hms(2024, 4, 30, 23, 59, 59).unwrap();
        let earnings = vec![april, earning(100, 1, false), earning(200, 31, true)];

        assert_eq!(monthly_total(&earnings, "2024-05"), Decimal::new(300, 2));
        assert_eq!(monthly_total(&earnings, "2024-04"), Decimal::new(900, 2));
        assert_eq!(monthly_total(&earnings, "2023-05"), Decimal::ZERO);
    }

    #[test]
    fn test_month_key_is_zero_padded() {
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(month_key(at), "2025-03");
    }
}
