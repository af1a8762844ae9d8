//! Storage implementations.
//!
//! Two traits cover persistence: [`LedgerStore`] for user balances, reward
//! history and earnings, and [`TicketStore`] for lucky-draw tickets and draw
//! results. Each backend implements both on one struct so that a coin ticket
//! purchase can deduct points and mint tickets in a single transaction.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::config::{StorageConfig, StorageType};

pub mod helpers;
pub mod ledger_store;
pub mod mock;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod ticket_store;

pub use ledger_store::{CoinPurchase, LedgerStore, ReelUpdate};
pub use mock::MockLedgerStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteLedgerStore;
pub use ticket_store::TicketStore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Earning not found: {0}")]
    EarningNotFound(Uuid),

    #[error("Earning already paid: {0}")]
    EarningAlreadyPaid(Uuid),

    #[error("Insufficient balance: user={user_id}, balance={balance}, required={required}")]
    InsufficientBalance {
        user_id: String,
        balance: i64,
        required: i64,
    },

    #[error("Ticket already stored: {0}")]
    DuplicateTicket(String),

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Counter {column} out of range: {value}")]
    CounterOutOfRange { column: &'static str, value: String },

    #[error("Amount not representable in cents: {0}")]
    InvalidAmount(Decimal),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("Invalid stored tier: {0}")]
    InvalidTier(#[from] crate::model::UnknownTier),

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Whether the failure came from a racing writer and the whole operation
    /// may succeed if retried.
    pub fn is_conflict(&self) -> bool {
        match self {
            StorageError::Conflict(_) => true,
            #[cfg(feature = "sqlite")]
            StorageError::Database(sqlx::Error::Database(db)) => db
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                // SQLITE_BUSY (5) and SQLITE_LOCKED (6), including extended codes
                .map(|code| matches!(code & 0xff, 5 | 6))
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Initialize storage based on configuration.
///
/// Returns the same backend behind both store interfaces.
pub async fn init_storage(
    config: &StorageConfig,
) -> std::result::Result<(Arc<dyn LedgerStore>, Arc<dyn TicketStore>), Box<dyn std::error::Error>>
{
    match config.storage_type {
        StorageType::Memory => {
            info!("Storage: in-memory (state is lost on shutdown)");
            let store = Arc::new(MockLedgerStore::new());
            Ok((store.clone(), store))
        }
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            info!(
                path = %config.sqlite.path,
                max_connections = config.sqlite.max_connections,
                "Storage: sqlite"
            );
            if let Some(parent) = std::path::Path::new(&config.sqlite.path).parent() {
                std::fs::create_dir_all(parent)?;
            }

            let pool = sqlx::sqlite::SqlitePoolOptions::new()
                .max_connections(config.sqlite.max_connections)
                .connect(&format!("sqlite:{}?mode=rwc", config.sqlite.path))
                .await?;

            let store = Arc::new(SqliteLedgerStore::new(pool));
            store.init().await?;

            Ok((store.clone(), store))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageType::Sqlite => {
            tracing::error!("SQLite storage requested but 'sqlite' feature is not enabled");
            Err("SQLite feature not enabled".into())
        }
    }
}
