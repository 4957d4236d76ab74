//! The ledger store abstraction and its in-memory reference implementation.
//!
//! The engine only ever talks to [`LedgerStore`]: every operation runs as one
//! atomic unit of work against the primitives of [`LedgerTxn`], and either all
//! of its reads/writes commit or none of them are visible.

use crate::account::{Account, AccountId};
use crate::error::EngineError;
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// The read/write primitives available inside one atomic unit.
///
/// All reads observe a consistent snapshot: nothing another caller commits
/// mid-unit is ever visible here.
pub trait LedgerTxn {
    /// Looks up an account by ID.
    fn get_account(&self, id: AccountId) -> Option<Account>;

    /// Inserts or updates an account. Inserting (ID zero) assigns the ID;
    /// the saved account is returned either way.
    fn save_account(&mut self, account: Account) -> Account;

    /// Appends a transaction to the ledger, assigning its ID. Insert-only:
    /// committed transactions are never updated or deleted.
    fn append_transaction(&mut self, tx: Transaction) -> Transaction;

    /// All transactions for an account, newest first (timestamp descending,
    /// ties by transaction ID descending).
    fn list_transactions(&self, account_id: AccountId) -> Vec<Transaction>;

    /// Transactions for an account with `timestamp >= since`, in chronological
    /// order.
    fn list_transactions_since(&self, account_id: AccountId, since: DateTime<Utc>)
        -> Vec<Transaction>;

    /// Count of unflagged transactions for an account; the denominator of the
    /// running-average recomputation.
    fn count_unflagged_transactions(&self, account_id: AccountId) -> u64;
}

/// A unit of work executed atomically against the store.
///
/// Returning an error aborts the unit: none of its writes become visible.
pub type UnitOfWork<'a> = dyn FnMut(&mut dyn LedgerTxn) -> Result<(), EngineError> + 'a;

/// Durable keyed storage for accounts and transactions.
///
/// Implementations must make [`LedgerStore::run_atomic`] all-or-nothing and
/// give each unit a consistent snapshot of the data it reads.
pub trait LedgerStore: Send + Sync {
    /// Executes the unit of work atomically. On `Err` the store is left
    /// exactly as it was before the unit began.
    fn run_atomic(&self, work: &mut UnitOfWork<'_>) -> Result<(), EngineError>;
}

/// Everything the in-memory store holds. Cloneable so a unit of work can run
/// against the live state while a snapshot stands by for rollback.
#[derive(Debug, Default, Clone)]
struct MemoryState {
    accounts: BTreeMap<AccountId, Account>,
    transactions: Vec<Transaction>,
    next_account_id: AccountId,
    next_tx_id: u64,
}

impl LedgerTxn for MemoryState {
    fn get_account(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id).cloned()
    }

    fn save_account(&mut self, mut account: Account) -> Account {
        if account.id == 0 {
            self.next_account_id += 1;
            account.id = self.next_account_id;
        }
        self.accounts.insert(account.id, account.clone());
        account
    }

    fn append_transaction(&mut self, mut tx: Transaction) -> Transaction {
        self.next_tx_id += 1;
        tx.id = self.next_tx_id;
        self.transactions.push(tx.clone());
        tx
    }

    fn list_transactions(&self, account_id: AccountId) -> Vec<Transaction> {
        let mut txs: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.account_id == account_id)
            .cloned()
            .collect();
        txs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        txs
    }

    fn list_transactions_since(
        &self,
        account_id: AccountId,
        since: DateTime<Utc>,
    ) -> Vec<Transaction> {
        let mut txs: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.account_id == account_id && tx.timestamp >= since)
            .cloned()
            .collect();
        txs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        txs
    }

    fn count_unflagged_transactions(&self, account_id: AccountId) -> u64 {
        self.transactions
            .iter()
            .filter(|tx| tx.account_id == account_id && !tx.flagged)
            .count() as u64
    }
}

/// In-memory [`LedgerStore`] backed by plain maps behind a mutex.
///
/// Atomicity is by snapshot: the unit of work runs against the live state
/// under the lock, and a pre-unit clone is restored if it fails. Holding the
/// lock for the whole unit also serializes units against each other.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn run_atomic(&self, work: &mut UnitOfWork<'_>) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        let snapshot = state.clone();

        match work(&mut *state) {
            Ok(()) => Ok(()),
            Err(e) => {
                *state = snapshot;
                Err(e)
            }
        }
    }
}
