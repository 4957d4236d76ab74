//! Error types for the bank ledger engine.

use crate::account::AccountId;
use crate::decimal::Decimal2;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur during engine operation.
///
/// Business failures (`Validation`, `AccountNotFound`, `InsufficientFunds`) are
/// returned to the caller with the store untouched; `Store` indicates an atomic
/// unit that could not commit and is safe to retry.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or non-positive request input, rejected before any store access
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Unknown account ID, rejected before fraud scoring or mutation
    #[error("Account not found with ID {0}")]
    AccountNotFound(AccountId),

    /// Withdrawal or transfer leg would drive the balance negative
    #[error("Insufficient funds for withdrawal. Current balance: {balance}")]
    InsufficientFunds {
        /// Balance at the time the operation was rejected
        balance: Decimal2,
    },

    /// Underlying store unavailable or the atomic unit could not commit
    #[error("Store failure: {0}")]
    Store(String),

    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: bank-ledger <commands.csv>")]
    MissingArgument,
}
