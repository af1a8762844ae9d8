//! Ledger data model.
//!
//! Plain value types shared by the rule engine, the storage backends and the
//! gRPC layer. None of these types perform I/O.

mod earning;
mod engagement;
mod payment;
mod ticket;
mod user;

pub use earning::Earning;
pub use engagement::{EngagementAction, UnknownAction};
pub use payment::{PaymentEvent, PaymentMethod, PaymentPurpose};
pub use ticket::Ticket;
pub use user::{CreatorTier, RewardEntry, UnknownTier, UserAccount};
