//! # Bank Ledger
//!
//! A transaction-processing engine that maintains per-account balances and an
//! immutable transaction ledger, screening every deposit, withdrawal, and
//! transfer leg against fraud heuristics before it is committed.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: monetary values use 2 decimal places via
//!   `rust_decimal`; averages round half-up
//! - **Atomic units**: the account mutation and its transaction record commit
//!   together or not at all; failed transfers roll back both legs
//! - **Advisory fraud flags**: flagged transactions still move money but are
//!   excluded from the running average and marked for review
//! - **Injected storage**: the engine talks to an abstract [`LedgerStore`]
//!   handed to it at construction; no global state
//!
//! ## Example
//!
//! ```
//! use bank_ledger::{BankEngine, Decimal2, MemoryStore};
//! use std::str::FromStr;
//!
//! let engine = BankEngine::new(MemoryStore::new());
//! let alice = engine
//!     .create_account("Alice", "Savings", Decimal2::from_str("1000.00").unwrap())
//!     .unwrap();
//! engine.deposit(alice.id, Decimal2::from_str("200.00").unwrap()).unwrap();
//! ```

pub mod account;
pub mod cli;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod fraud;
pub mod store;
pub mod transaction;

pub use account::{Account, AccountId};
pub use decimal::Decimal2;
pub use engine::BankEngine;
pub use error::{EngineError, Result};
pub use fraud::{FraudConfig, FraudDetector, FraudVerdict};
pub use store::{LedgerStore, LedgerTxn, MemoryStore};
pub use transaction::{Transaction, TxId, TxKind};
