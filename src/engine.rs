//! The transaction processor.
//!
//! Orchestrates each logical monetary operation end-to-end: validate the
//! request, take the per-account lock(s), and run one atomic store unit that
//! loads the account, asks the fraud detector for a verdict, applies the
//! balance change, conditionally folds the amount into the running average,
//! and persists the account mutation together with the transaction record.
//! Any failure before commit leaves the store exactly as it was.

use crate::account::{Account, AccountId};
use crate::decimal::Decimal2;
use crate::error::{EngineError, Result};
use crate::fraud::{FraudConfig, FraudDetector, FraudVerdict};
use crate::store::{LedgerStore, LedgerTxn};
use crate::transaction::{Transaction, TxKind};
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// The banking engine.
///
/// Generic over the ledger store so callers construct it with an explicitly
/// injected handle; there is no process-wide state. All methods take `&self`,
/// so one engine can be shared across threads (e.g. behind an `Arc`).
///
/// # Concurrency
///
/// Mutations against one account are serialized through a per-account mutex
/// held for the whole atomic unit. Transfers touch two accounts and acquire
/// both locks in ascending account-ID order, so two opposed transfers between
/// the same pair can never deadlock.
pub struct BankEngine<S> {
    store: S,
    fraud: FraudDetector,

    /// Per-account mutexes, created lazily on first use.
    locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl<S: LedgerStore> BankEngine<S> {
    /// Creates an engine with default fraud thresholds.
    pub fn new(store: S) -> Self {
        Self::with_config(store, FraudConfig::default())
    }

    /// Creates an engine with custom fraud thresholds.
    pub fn with_config(store: S, config: FraudConfig) -> Self {
        BankEngine {
            store,
            fraud: FraudDetector::new(config),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The injected store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Opens a new account and returns it with its assigned ID.
    ///
    /// A positive initial balance seeds the running average and is recorded as
    /// an opening deposit, so the balance always equals the sum of the
    /// account's committed signed amounts. The opening deposit is not
    /// fraud-scored: a brand-new account has neither history nor an anomaly
    /// baseline, so neither rule can apply.
    pub fn create_account(
        &self,
        customer_name: &str,
        kind: &str,
        initial_balance: Decimal2,
    ) -> Result<Account> {
        if customer_name.trim().is_empty() {
            return Err(EngineError::Validation(
                "customer name must not be empty".to_string(),
            ));
        }
        if initial_balance < Decimal2::ZERO {
            return Err(EngineError::Validation(
                "initial balance must not be negative".to_string(),
            ));
        }

        let mut created = None;
        self.store.run_atomic(&mut |txn| {
            let account = txn.save_account(Account::open(customer_name, kind, initial_balance));
            if initial_balance.is_positive() {
                txn.append_transaction(Transaction::new(
                    account.id,
                    TxKind::Deposit,
                    initial_balance,
                ));
            }
            created = Some(account);
            Ok(())
        })?;

        let account = Self::committed(created)?;
        debug!(
            "opened account {} for {:?} with balance {}",
            account.id, account.customer_name, account.balance
        );
        Ok(account)
    }

    /// Deposits funds into an account and returns the updated account.
    pub fn deposit(&self, account_id: AccountId, amount: Decimal2) -> Result<Account> {
        ensure_positive_amount(amount)?;

        let lock = self.account_lock(account_id);
        let _guard = lock.lock();

        let mut updated = None;
        self.store.run_atomic(&mut |txn| {
            updated = Some(self.deposit_leg(txn, account_id, amount)?);
            Ok(())
        })?;
        Self::committed(updated)
    }

    /// Withdraws funds from an account and returns the updated account.
    ///
    /// Insufficient funds reject the operation before fraud scoring and
    /// before any persistence: no transaction record is created, so the
    /// attempt never occupies a slot in the frequency window.
    pub fn withdraw(&self, account_id: AccountId, amount: Decimal2) -> Result<Account> {
        ensure_positive_amount(amount)?;

        let lock = self.account_lock(account_id);
        let _guard = lock.lock();

        let mut updated = None;
        self.store.run_atomic(&mut |txn| {
            updated = Some(self.withdraw_leg(txn, account_id, amount)?);
            Ok(())
        })?;
        Self::committed(updated)
    }

    /// Moves funds between two accounts as a single atomic pair of legs.
    ///
    /// The withdraw leg runs first; if either leg fails, the whole unit rolls
    /// back and neither account changes. Each leg is fraud-scored
    /// independently against its own account's history.
    pub fn transfer(&self, from: AccountId, to: AccountId, amount: Decimal2) -> Result<()> {
        ensure_positive_amount(amount)?;
        if from == to {
            return Err(EngineError::Validation(
                "source and destination accounts must differ".to_string(),
            ));
        }

        // Fixed total lock order regardless of direction.
        let (low, high) = if from < to { (from, to) } else { (to, from) };
        let low_lock = self.account_lock(low);
        let high_lock = self.account_lock(high);
        let _low_guard = low_lock.lock();
        let _high_guard = high_lock.lock();

        self.store.run_atomic(&mut |txn| {
            self.withdraw_leg(txn, from, amount)?;
            self.deposit_leg(txn, to, amount)?;
            Ok(())
        })?;

        debug!("transferred {} from account {} to account {}", amount, from, to);
        Ok(())
    }

    /// Looks up an account's current state.
    pub fn get_account(&self, account_id: AccountId) -> Result<Account> {
        let mut found = None;
        self.store.run_atomic(&mut |txn| {
            found = txn.get_account(account_id);
            Ok(())
        })?;
        found.ok_or(EngineError::AccountNotFound(account_id))
    }

    /// All transactions for an account, newest first.
    pub fn transaction_history(&self, account_id: AccountId) -> Result<Vec<Transaction>> {
        let mut history = None;
        self.store.run_atomic(&mut |txn| {
            if txn.get_account(account_id).is_none() {
                return Err(EngineError::AccountNotFound(account_id));
            }
            history = Some(txn.list_transactions(account_id));
            Ok(())
        })?;
        Self::committed(history)
    }

    /// One deposit leg inside an already-running atomic unit.
    fn deposit_leg(
        &self,
        txn: &mut dyn LedgerTxn,
        account_id: AccountId,
        amount: Decimal2,
    ) -> Result<Account> {
        let mut account = txn
            .get_account(account_id)
            .ok_or(EngineError::AccountNotFound(account_id))?;

        let candidate = Transaction::new(account_id, TxKind::Deposit, amount);
        let verdict = self.fraud.evaluate(&account, &candidate, txn);

        account.credit(amount);
        self.finish_leg(txn, account, candidate, verdict)
    }

    /// One withdrawal leg inside an already-running atomic unit.
    fn withdraw_leg(
        &self,
        txn: &mut dyn LedgerTxn,
        account_id: AccountId,
        amount: Decimal2,
    ) -> Result<Account> {
        let mut account = txn
            .get_account(account_id)
            .ok_or(EngineError::AccountNotFound(account_id))?;

        // The funds check comes before fraud scoring: a rejected withdrawal
        // writes nothing and is never part of any account's history.
        account.debit(amount)?;

        let candidate = Transaction::new(account_id, TxKind::Withdrawal, amount);
        let verdict = self.fraud.evaluate(&account, &candidate, txn);

        self.finish_leg(txn, account, candidate, verdict)
    }

    /// Applies the fraud verdict, updates the running average for clean
    /// transactions, and persists the account and transaction together.
    fn finish_leg(
        &self,
        txn: &mut dyn LedgerTxn,
        mut account: Account,
        mut candidate: Transaction,
        verdict: FraudVerdict,
    ) -> Result<Account> {
        match verdict.reason() {
            Some(reason) => {
                candidate.flag(reason);
                warn!(
                    "account {}: {} of {} flagged: {}",
                    account.id, candidate.kind, candidate.amount, reason
                );
            }
            None => {
                let unflagged = txn.count_unflagged_transactions(account.id);
                account.recompute_average(candidate.amount, unflagged);
            }
        }

        let committed = txn.append_transaction(candidate);
        let account = txn.save_account(account);
        debug!("account {}: committed {}", account.id, committed);
        Ok(account)
    }

    /// Fetches (creating if needed) the mutex guarding an account.
    fn account_lock(&self, account_id: AccountId) -> Arc<Mutex<()>> {
        let mut table = self.locks.lock();
        table.entry(account_id).or_default().clone()
    }

    /// Unwraps a value the atomic unit must have produced on success.
    fn committed<T>(value: Option<T>) -> Result<T> {
        value.ok_or_else(|| EngineError::Store("atomic unit committed without a result".to_string()))
    }
}

fn ensure_positive_amount(amount: Decimal2) -> Result<()> {
    if !amount.is_positive() {
        return Err(EngineError::Validation(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}
