//! Rewards core: the rules that turn engagement into points and cash, and the
//! lucky-draw mechanics.
//!
//! The rule modules are pure. [`RewardsLedger`] wires them to the stores.

pub mod earnings;
pub mod engagement;
mod error;
mod ledger;
pub mod lucky_draw;
pub mod tickets;
pub mod tier;

pub use earnings::EarningsSummary;
pub use engagement::EngagementEvent;
pub use error::LedgerError;
pub use ledger::{
    PaymentOutcome, ReelOutcome, RewardsLedger, TicketReceipt, UNAPPLIED_PAYMENT_SOURCE,
};
pub use lucky_draw::LuckyDrawAmount;
