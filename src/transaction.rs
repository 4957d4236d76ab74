//! Ledger transaction records.
//!
//! A transaction is immutable once appended to the store: corrections are
//! modeled as new transactions, never as updates.

use crate::account::AccountId;
use crate::decimal::Decimal2;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Opaque transaction identifier, assigned by the ledger store on append.
pub type TxId = u64;

/// The two ledger transaction kinds. The kind determines the sign of the
/// amount's effect on the balance; the stored amount itself is always a
/// positive magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxKind {
    /// Credit funds to the account.
    Deposit,

    /// Debit funds from the account.
    Withdrawal,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxKind::Deposit => write!(f, "DEPOSIT"),
            TxKind::Withdrawal => write!(f, "WITHDRAWAL"),
        }
    }
}

/// A single committed (or candidate) ledger transaction.
///
/// Candidates are built by the transaction processor with `id == 0`; the store
/// assigns the real ID on append. `flagged`/`flag_reason` are set by the fraud
/// engine before the record is persisted and never change afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    /// Unique transaction identifier. Zero until the store assigns one.
    pub id: TxId,

    /// The account this transaction belongs to.
    pub account_id: AccountId,

    /// Deposit or withdrawal.
    pub kind: TxKind,

    /// Positive magnitude of the transaction.
    pub amount: Decimal2,

    /// Whether the fraud engine marked this transaction for review.
    pub flagged: bool,

    /// Reason for the flag; present iff `flagged`.
    pub flag_reason: Option<String>,

    /// Set at creation; orders the per-account ledger and drives the
    /// frequency-window fraud rule.
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Builds an unflagged candidate transaction stamped with the current time.
    pub fn new(account_id: AccountId, kind: TxKind, amount: Decimal2) -> Self {
        Transaction {
            id: 0,
            account_id,
            kind,
            amount,
            flagged: false,
            flag_reason: None,
            timestamp: Utc::now(),
        }
    }

    /// Marks the transaction as flagged with the given reason.
    pub fn flag(&mut self, reason: impl Into<String>) {
        self.flagged = true;
        self.flag_reason = Some(reason.into());
    }

    /// The signed effect of this transaction on the balance: positive for
    /// deposits, negative for withdrawals.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TxKind::Deposit => self.amount.inner(),
            TxKind::Withdrawal => -self.amount.inner(),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tx {} [{}] account={} amount={} flagged={}",
            self.id, self.kind, self.account_id, self.amount, self.flagged
        )?;
        if let Some(reason) = &self.flag_reason {
            write!(f, " reason={reason:?}")?;
        }
        Ok(())
    }
}
