//! Conversions between ledger types and their proto messages.
//!
//! Money crosses the wire as decimal strings with two fractional digits and
//! timestamps as `google.protobuf.Timestamp`. Inbound conversions validate and
//! fail with [`LedgerError::InvalidArgument`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::model::{
    CreatorTier, Earning, EngagementAction, PaymentEvent, PaymentMethod, PaymentPurpose,
    RewardEntry, Ticket, UserAccount,
};
use crate::proto;
use crate::rewards::{EarningsSummary, LedgerError, LuckyDrawAmount, ReelOutcome};

/// Convert a UTC timestamp to its proto form.
pub fn to_proto_timestamp(at: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

/// Render an amount with exactly two fractional digits.
pub fn format_money(amount: Decimal) -> String {
    let mut amount = amount.round_dp(2);
    amount.rescale(2);
    amount.to_string()
}

/// Parse a decimal string; `field` names it in the error.
pub fn parse_money(field: &str, value: &str) -> Result<Decimal, LedgerError> {
    Decimal::from_str(value.trim()).map_err(|e| {
        LedgerError::InvalidArgument(format!("{} {:?} is not a decimal: {}", field, value, e))
    })
}

/// Parse an optional decimal string: empty means "not supplied".
pub fn parse_optional_money(field: &str, value: &str) -> Result<Option<Decimal>, LedgerError> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_money(field, value).map(Some)
    }
}

/// Reject negative view counts.
pub fn views_from_proto(views: i64) -> Result<u64, LedgerError> {
    u64::try_from(views)
        .map_err(|_| LedgerError::InvalidArgument(format!("views {} is negative", views)))
}

pub fn engagement_action_from_proto(action: i32) -> Result<EngagementAction, LedgerError> {
    match proto::EngagementAction::try_from(action) {
        Ok(proto::EngagementAction::Like) => Ok(EngagementAction::Like),
        Ok(proto::EngagementAction::Comment) => Ok(EngagementAction::Comment),
        Ok(proto::EngagementAction::Share) => Ok(EngagementAction::Share),
        Ok(proto::EngagementAction::Unspecified) | Err(_) => Err(LedgerError::InvalidArgument(
            format!("unknown engagement action {}", action),
        )),
    }
}

pub fn payment_method_from_proto(method: i32) -> Result<PaymentMethod, LedgerError> {
    match proto::PaymentMethod::try_from(method) {
        Ok(proto::PaymentMethod::Coins) => Ok(PaymentMethod::Coins),
        Ok(proto::PaymentMethod::Cash) => Ok(PaymentMethod::Cash),
        Ok(proto::PaymentMethod::Unspecified) | Err(_) => Err(LedgerError::InvalidArgument(
            format!("unknown payment method {}", method),
        )),
    }
}

impl TryFrom<proto::PaymentEvent> for PaymentEvent {
    type Error = LedgerError;

    fn try_from(event: proto::PaymentEvent) -> Result<Self, Self::Error> {
        use proto::payment_event::Kind;
        use proto::payment_succeeded::Purpose;

        match event.kind {
            Some(Kind::Failed(failed)) => Ok(PaymentEvent::Failed {
                reason: failed.reason,
            }),
            Some(Kind::Succeeded(succeeded)) => {
                let amount = parse_money("amount", &succeeded.amount)?;
                let purpose = match succeeded.purpose {
                    Some(Purpose::LuckyDrawTickets(tickets)) => PaymentPurpose::LuckyDrawTickets {
                        event_id: tickets.event_id,
                        quantity: tickets.quantity,
                    },
                    Some(Purpose::Credit(credit)) => PaymentPurpose::Credit {
                        source: credit.source,
                    },
                    None => {
                        return Err(LedgerError::InvalidArgument(
                            "payment purpose is required".to_string(),
                        ))
                    }
                };
                Ok(PaymentEvent::Succeeded { amount, purpose })
            }
            None => Err(LedgerError::InvalidArgument(
                "payment event kind is required".to_string(),
            )),
        }
    }
}

impl From<CreatorTier> for proto::CreatorTier {
    fn from(tier: CreatorTier) -> Self {
        match tier {
            CreatorTier::Beginner => proto::CreatorTier::Beginner,
            CreatorTier::Bronze => proto::CreatorTier::Bronze,
            CreatorTier::Silver => proto::CreatorTier::Silver,
            CreatorTier::Gold => proto::CreatorTier::Gold,
        }
    }
}

impl From<UserAccount> for proto::UserAccount {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            reward_points: account.reward_points,
            total_views: account.total_views,
            creator_level: proto::CreatorTier::from(account.creator_level).into(),
            reels_count: account.reels_count,
        }
    }
}

impl From<RewardEntry> for proto::RewardEntry {
    fn from(entry: RewardEntry) -> Self {
        Self {
            amount: entry.amount,
            reason: entry.reason,
            timestamp: Some(to_proto_timestamp(entry.timestamp)),
        }
    }
}

impl From<Earning> for proto::Earning {
    fn from(earning: Earning) -> Self {
        Self {
            id: earning.id.to_string(),
            user_id: earning.user_id,
            amount: format_money(earning.amount),
            source: earning.source,
            created_at: Some(to_proto_timestamp(earning.created_at)),
            is_paid: earning.is_paid,
        }
    }
}

impl From<Ticket> for proto::Ticket {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            user_id: ticket.user_id,
            event_id: ticket.event_id,
            purchase_date: Some(to_proto_timestamp(ticket.purchase_date)),
        }
    }
}

impl From<EarningsSummary> for proto::EarningsSummary {
    fn from(summary: EarningsSummary) -> Self {
        Self {
            total: format_money(summary.total),
            earnings: summary.earnings.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<LuckyDrawAmount> for proto::LuckyDrawPool {
    fn from(amount: LuckyDrawAmount) -> Self {
        Self {
            lucky_draw_pool: format_money(amount.lucky_draw_pool),
            total_accumulation: format_money(amount.total_accumulation),
            monthly_earnings: format_money(amount.monthly_earnings),
        }
    }
}

impl From<ReelOutcome> for proto::ReelOutcome {
    fn from(outcome: ReelOutcome) -> Self {
        Self {
            earnings_awarded: format_money(outcome.earnings_awarded),
            new_tier: proto::CreatorTier::from(outcome.new_tier).into(),
            total_views: outcome.total_views,
            reels_count: outcome.reels_count,
            points_awarded: outcome.points_awarded,
            reward_points: outcome.reward_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::new(80, 0)), "80.00");
        assert_eq!(format_money(Decimal::new(15, 1)), "1.50");
        assert_eq!(format_money(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("amount", " 12.50 ").unwrap(), Decimal::new(1250, 2));
        assert!(matches!(
            parse_money("amount", "twelve"),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert_eq!(parse_optional_money("base", "").unwrap(), None);
    }

    #[test]
    fn test_views_must_be_non_negative() {
        assert_eq!(views_from_proto(6000).unwrap(), 6000);
        assert!(matches!(
            views_from_proto(-1),
            Err(LedgerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_engagement_action_from_proto() {
        assert_eq!(
            engagement_action_from_proto(proto::EngagementAction::Share as i32).unwrap(),
            EngagementAction::Share
        );
        assert!(engagement_action_from_proto(proto::EngagementAction::Unspecified as i32).is_err());
        assert!(engagement_action_from_proto(42).is_err());
    }

    #[test]
    fn test_payment_method_from_proto() {
        assert_eq!(
            payment_method_from_proto(proto::PaymentMethod::Coins as i32).unwrap(),
            PaymentMethod::Coins
        );
        assert_eq!(
            payment_method_from_proto(proto::PaymentMethod::Cash as i32).unwrap(),
            PaymentMethod::Cash
        );
        assert!(payment_method_from_proto(proto::PaymentMethod::Unspecified as i32).is_err());
        assert!(payment_method_from_proto(9).is_err());
    }

    #[test]
    fn test_payment_event_requires_kind_and_purpose() {
        let empty = PaymentEvent::try_from(proto::PaymentEvent { kind: None });
        assert!(matches!(empty, Err(LedgerError::InvalidArgument(_))));

        let no_purpose = PaymentEvent::try_from(proto::PaymentEvent {
            kind: Some(proto::payment_event::Kind::Succeeded(proto::PaymentSucceeded {
                amount: "1.00".to_string(),
                purpose: None,
            })),
        });
        assert!(matches!(no_purpose, Err(LedgerError::InvalidArgument(_))));

        let credit = PaymentEvent::try_from(proto::PaymentEvent {
            kind: Some(proto::payment_event::Kind::Succeeded(proto::PaymentSucceeded {
                amount: "19.99".to_string(),
                purpose: Some(proto::payment_succeeded::Purpose::Credit(proto::Credit {
                    source: "Referral".to_string(),
                })),
            })),
        })
        .unwrap();
        assert_eq!(
            credit,
            PaymentEvent::Succeeded {
                amount: Decimal::new(1999, 2),
                purpose: PaymentPurpose::Credit {
                    source: "Referral".to_string()
                },
            }
        );
    }

    #[test]
    fn test_user_account_to_proto() {
        let mut account = UserAccount::new("alice");
        account.creator_level = CreatorTier::Silver;
        let message = proto::UserAccount::from(account);
        assert_eq!(message.creator_level, proto::CreatorTier::Silver as i32);
    }
}
