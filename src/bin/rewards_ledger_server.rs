//! rewards-ledger-server
//!
//! Serves the rewards ledger over gRPC.
//!
//! ## Configuration
//!
//! Reads `config.yaml` from the working directory, the file given by
//! `--config <path>` or `REWARDS_CONFIG`, then `REWARDS__*` environment
//! variables. Log filtering follows `REWARDS_LOG`.
//!
//! ## Example
//!
//! ```yaml
//! server:
//!   port: 50061
//! storage:
//!   type: sqlite
//!   sqlite:
//!     path: data/rewards.db
//! lucky_draw:
//!   ticket_coin_price: 100
//!   ticket_cash_price: "1.00"
//! ```

use std::net::SocketAddr;

use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::{error, info};

use rewards_ledger::config::Config;
use rewards_ledger::proto::rewards_ledger_server::RewardsLedgerServer;
use rewards_ledger::rewards::RewardsLedger;
use rewards_ledger::services::RewardsService;
use rewards_ledger::storage::init_storage;
use rewards_ledger::transport::grpc_trace_layer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rewards_ledger::utils::bootstrap::init_tracing();

    let config_path = rewards_ledger::utils::bootstrap::parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Starting rewards-ledger-server");

    let (ledger_store, ticket_store) = init_storage(&config.storage).await?;
    info!("Storage initialized");

    let ledger = RewardsLedger::new(ledger_store, ticket_store)
        .with_rewards_config(config.rewards.clone())
        .with_lucky_draw_config(config.lucky_draw.clone())
        .with_retry_config(config.retry.clone());

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<RewardsLedgerServer<RewardsService>>()
        .await;

    let addr: SocketAddr = config.server.addr().parse()?;
    info!(%addr, "Rewards ledger listening");

    Server::builder()
        .layer(grpc_trace_layer())
        .add_service(health_service)
        .add_service(RewardsLedgerServer::new(RewardsService::new(ledger)))
        .serve_with_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
