//! Rewards Ledger
//!
//! Reward points, creator tiers, cash earnings and lucky-draw tickets for a
//! consumer rewards app, served over gRPC.

pub mod config;
pub mod model;
pub mod proto_ext;
pub mod rewards;
pub mod services;
pub mod storage;
pub mod transport;
pub mod utils;

pub mod proto {
    tonic::include_proto!("rewards");
}
