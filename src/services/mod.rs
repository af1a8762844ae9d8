//! gRPC service implementations.

pub mod rewards;

pub use rewards::RewardsService;
