//! Account model and balance/average arithmetic.
//!
//! This is the pure data layer: all methods operate on an in-hand `Account`
//! value and perform no I/O. The transaction processor decides when results
//! are committed.

use crate::decimal::Decimal2;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Opaque account identifier, assigned by the ledger store on first save.
pub type AccountId = u32;

/// A customer account with its balance and running transaction statistics.
///
/// # Invariants
///
/// - `balance` never goes negative as the post-state of a debit; [`Account::debit`]
///   rejects the operation instead.
/// - `avg_transaction` is the mean of all unflagged transaction amounts, rounded
///   half-up to 2 decimal places. Flagged transactions move the balance but are
///   never folded into the average.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Unique account identifier. Zero until the store assigns one.
    pub id: AccountId,

    /// Customer the account belongs to. Never empty.
    pub customer_name: String,

    /// Free-form account type, e.g. "Savings" or "Checking".
    pub kind: String,

    /// Current balance.
    pub balance: Decimal2,

    /// Running average of unflagged transaction amounts.
    pub avg_transaction: Decimal2,

    /// Set once when the account is opened.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Opens a new account.
    ///
    /// A positive initial balance seeds the running average; otherwise the
    /// average starts at zero. Recording the opening balance on the ledger is
    /// the transaction processor's job, not this constructor's.
    pub fn open(customer_name: impl Into<String>, kind: impl Into<String>, balance: Decimal2) -> Self {
        let avg_transaction = if balance.is_positive() {
            balance
        } else {
            Decimal2::ZERO
        };

        Account {
            id: 0,
            customer_name: customer_name.into(),
            kind: kind.into(),
            balance,
            avg_transaction,
            created_at: Utc::now(),
        }
    }

    /// Credits funds to the account. Cannot fail.
    pub fn credit(&mut self, amount: Decimal2) {
        self.balance += amount;
    }

    /// Debits funds from the account.
    ///
    /// Fails with [`EngineError::InsufficientFunds`] if the debit would drive
    /// the balance negative; the account is left unchanged in that case.
    pub fn debit(&mut self, amount: Decimal2) -> Result<(), EngineError> {
        if self.balance < amount {
            return Err(EngineError::InsufficientFunds {
                balance: self.balance,
            });
        }

        self.balance -= amount;
        Ok(())
    }

    /// Folds one new unflagged transaction amount into the running average.
    ///
    /// `unflagged_count` is the number of prior unflagged transactions for this
    /// account. The new average is `(avg * count + amount) / (count + 1)`,
    /// rounded half-up to 2 decimal places.
    pub fn recompute_average(&mut self, amount: Decimal2, unflagged_count: u64) {
        let count = rust_decimal::Decimal::from(unflagged_count);
        let total = self.avg_transaction.inner() * count + amount.inner();
        let average = total / (count + rust_decimal::Decimal::ONE);

        self.avg_transaction = Decimal2::new(average);
    }
}
