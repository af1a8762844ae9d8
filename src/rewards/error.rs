//! Ledger error taxonomy.

use tonic::Status;

use crate::storage::StorageError;

/// Errors surfaced by [`RewardsLedger`](super::RewardsLedger) operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient funds: balance {balance}, cost {required}")]
    InsufficientFunds { balance: i64, required: i64 },

    #[error("Concurrent update conflict, retry the operation: {0}")]
    ConcurrencyConflict(String),

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Payment failed upstream: {0}")]
    UpstreamPaymentError(String),

    #[error("No tickets sold for event {0}")]
    NoTicketsSold(String),

    #[error("Earning already paid: {0}")]
    AlreadyPaid(uuid::Uuid),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for LedgerError {
    fn from(err: StorageError) -> Self {
        if err.is_conflict() {
            return LedgerError::ConcurrencyConflict(err.to_string());
        }
        match err {
            StorageError::UserNotFound(user_id) => {
                LedgerError::NotFound(format!("user {}", user_id))
            }
            StorageError::EarningNotFound(id) => LedgerError::NotFound(format!("earning {}", id)),
            StorageError::EarningAlreadyPaid(id) => LedgerError::AlreadyPaid(id),
            StorageError::InsufficientBalance {
                balance, required, ..
            } => LedgerError::InsufficientFunds { balance, required },
            StorageError::CounterOutOfRange { column, value } => {
                LedgerError::InvalidArgument(format!("{} {} is out of range", column, value))
            }
            StorageError::InvalidAmount(amount) => {
                LedgerError::InvalidArgument(format!("amount {} is not a whole number of cents", amount))
            }
            other => LedgerError::Storage(other),
        }
    }
}

impl From<LedgerError> for Status {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::NotFound(_) => Status::not_found(message),
            LedgerError::InvalidArgument(_) => Status::invalid_argument(message),
            LedgerError::InsufficientFunds { .. }
            | LedgerError::PaymentRequired(_)
            | LedgerError::NoTicketsSold(_)
            | LedgerError::AlreadyPaid(_) => Status::failed_precondition(message),
            LedgerError::ConcurrencyConflict(_) => Status::aborted(message),
            LedgerError::UpstreamPaymentError(_) => Status::unavailable(message),
            LedgerError::Storage(_) => Status::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_storage_errors_are_classified() {
        let err = LedgerError::from(StorageError::UserNotFound("ghost".to_string()));
        assert!(matches!(err, LedgerError::NotFound(_)));

        let err = LedgerError::from(StorageError::InsufficientBalance {
            user_id: "u".to_string(),
            balance: 50,
            required: 100,
        });
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds {
                balance: 50,
                required: 100
            }
        ));

        let err = LedgerError::from(StorageError::Conflict("busy".to_string()));
        assert!(matches!(err, LedgerError::ConcurrencyConflict(_)));

        let err = LedgerError::from(StorageError::CounterOutOfRange {
            column: "total_views",
            value: u64::MAX.to_string(),
        });
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (LedgerError::NotFound("x".into()), Code::NotFound),
            (LedgerError::InvalidArgument("x".into()), Code::InvalidArgument),
            (
                LedgerError::InsufficientFunds {
                    balance: 0,
                    required: 1,
                },
                Code::FailedPrecondition,
            ),
            (LedgerError::NoTicketsSold("e".into()), Code::FailedPrecondition),
            (LedgerError::PaymentRequired("x".into()), Code::FailedPrecondition),
            (LedgerError::ConcurrencyConflict("x".into()), Code::Aborted),
            (LedgerError::UpstreamPaymentError("x".into()), Code::Unavailable),
        ];
        for (err, code) in cases {
            assert_eq!(Status::from(err).code(), code);
        }
    }
}
