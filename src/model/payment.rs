//! Payment methods and settled payment events from the payment gateway.

use rust_decimal::Decimal;

/// How a ticket purchase is paid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Deducted from the reward-point balance.
    Coins,
    /// Settled by the payment gateway. Cash tickets are only issued from a
    /// successful payment event, never from a client request.
    Cash,
}

/// What a successful payment was for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentPurpose {
    LuckyDrawTickets { event_id: String, quantity: u32 },
    Credit { source: String },
}

/// Payment event delivered after upstream signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    Succeeded {
        amount: Decimal,
        purpose: PaymentPurpose,
    },
    Failed {
        reason: String,
    },
}
