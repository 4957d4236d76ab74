//! Fraud detection heuristics.
//!
//! Classification is pure and deterministic: given the account, the candidate
//! transaction, and a consistent snapshot of the account's history, the
//! detector decides flagged-or-clean with a single reason. It never mutates
//! anything and never fails. Flagging is advisory at this layer: the balance
//! still moves, but flagged amounts stay out of the running average and the
//! record is marked for downstream review.

use crate::account::Account;
use crate::store::LedgerTxn;
use crate::transaction::Transaction;
use chrono::Duration;
use rust_decimal::Decimal;

/// Reason attached to transactions caught by the frequency rule.
pub const HIGH_FREQUENCY_REASON: &str = "High transaction frequency detected.";

/// Reason attached to transactions caught by the amount-anomaly rule.
pub const AMOUNT_ANOMALY_REASON: &str = "Transaction amount is significantly higher than average.";

/// Thresholds for the fraud rules.
#[derive(Debug, Clone)]
pub struct FraudConfig {
    /// Number of in-window transactions at which the next one is flagged.
    pub frequency_limit: usize,

    /// Look-back window for the frequency rule.
    pub frequency_window: Duration,

    /// A transaction above `running average * multiplier` is anomalous.
    pub amount_multiplier: Decimal,
}

impl Default for FraudConfig {
    fn default() -> Self {
        FraudConfig {
            frequency_limit: 10,
            frequency_window: Duration::minutes(5),
            amount_multiplier: Decimal::from(5),
        }
    }
}

/// Outcome of classifying one candidate transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudVerdict {
    /// No rule matched.
    Clean,

    /// The first matching rule's reason. A transaction is never flagged for
    /// more than one reason.
    Flagged(&'static str),
}

impl FraudVerdict {
    /// Returns `true` if the candidate was flagged.
    pub fn is_flagged(&self) -> bool {
        matches!(self, FraudVerdict::Flagged(_))
    }

    /// The flag reason, if any.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            FraudVerdict::Clean => None,
            FraudVerdict::Flagged(reason) => Some(reason),
        }
    }
}

/// Classifies candidate transactions against an account's recent history.
#[derive(Debug, Clone, Default)]
pub struct FraudDetector {
    config: FraudConfig,
}

impl FraudDetector {
    /// Creates a detector with the given thresholds.
    pub fn new(config: FraudConfig) -> Self {
        FraudDetector { config }
    }

    /// Evaluates one candidate transaction.
    ///
    /// Rules run in fixed order and the first match wins:
    ///
    /// 1. **Frequency**: the candidate's account already has
    ///    `frequency_limit` or more transactions inside the look-back window.
    ///    The count is taken over history as it stands before the candidate is
    ///    persisted, so the check asks whether this transaction would be the
    ///    `limit + 1`-th or later inside the window.
    /// 2. **Amount anomaly**: the account has a positive running average and
    ///    the candidate amount is strictly greater than
    ///    `average * amount_multiplier`. With no baseline (zero average) this
    ///    rule never fires.
    ///
    /// The window is anchored at the candidate's own timestamp, so the same
    /// candidate and history always classify the same way.
    pub fn evaluate(
        &self,
        account: &Account,
        candidate: &Transaction,
        history: &dyn LedgerTxn,
    ) -> FraudVerdict {
        if self.is_frequency_too_high(account, candidate, history) {
            return FraudVerdict::Flagged(HIGH_FREQUENCY_REASON);
        }

        if self.is_amount_anomalous(account, candidate) {
            return FraudVerdict::Flagged(AMOUNT_ANOMALY_REASON);
        }

        FraudVerdict::Clean
    }

    fn is_frequency_too_high(
        &self,
        account: &Account,
        candidate: &Transaction,
        history: &dyn LedgerTxn,
    ) -> bool {
        let window_start = candidate.timestamp - self.config.frequency_window;
        let recent = history.list_transactions_since(account.id, window_start);

        log::debug!(
            "account {}: {} transactions in the last {} minutes",
            account.id,
            recent.len(),
            self.config.frequency_window.num_minutes()
        );

        recent.len() >= self.config.frequency_limit
    }

    fn is_amount_anomalous(&self, account: &Account, candidate: &Transaction) -> bool {
        let average = account.avg_transaction;
        if !average.is_positive() {
            return false;
        }

        let limit = average.inner() * self.config.amount_multiplier;
        log::debug!(
            "account {}: checking amount {} against limit {} (avg: {})",
            account.id,
            candidate.amount,
            limit,
            average
        );

        candidate.amount.inner() > limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal2;
    use crate::store::{LedgerStore, MemoryStore};
    use crate::transaction::TxKind;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal2 {
        Decimal2::from_str(s).unwrap()
    }

    /// Seeds `count` deposits for the account at the given age and evaluates a
    /// fresh candidate against that history.
    fn verdict_with_history(
        account: Account,
        history_count: usize,
        history_age: Duration,
        candidate_amount: Decimal2,
    ) -> FraudVerdict {
        let store = MemoryStore::new();
        let detector = FraudDetector::default();
        let mut verdict = FraudVerdict::Clean;

        store
            .run_atomic(&mut |txn| {
                let account = txn.save_account(account.clone());
                for _ in 0..history_count {
                    let tx = Transaction {
                        timestamp: Utc::now() - history_age,
                        ..Transaction::new(account.id, TxKind::Deposit, dec("1.00"))
                    };
                    txn.append_transaction(tx);
                }

                let candidate = Transaction::new(account.id, TxKind::Deposit, candidate_amount);
                verdict = detector.evaluate(&account, &candidate, txn);
                Ok(())
            })
            .unwrap();

        verdict
    }

    #[test]
    fn test_ten_recent_transactions_flag_the_next() {
        let account = Account::open("Fraudster", "Checking", Decimal2::ZERO);
        let verdict = verdict_with_history(account, 10, Duration::seconds(30), dec("1.00"));

        assert!(verdict.is_flagged());
        assert_eq!(verdict.reason(), Some(HIGH_FREQUENCY_REASON));
    }

    #[test]
    fn test_nine_recent_transactions_do_not_flag() {
        let account = Account::open("Regular", "Checking", Decimal2::ZERO);
        let verdict = verdict_with_history(account, 9, Duration::seconds(30), dec("1.00"));

        assert!(!verdict.is_flagged());
        assert_eq!(verdict, FraudVerdict::Clean);
    }

    #[test]
    fn test_old_transactions_fall_out_of_the_window() {
        let account = Account::open("Regular", "Checking", Decimal2::ZERO);
        let verdict = verdict_with_history(account, 10, Duration::minutes(10), dec("1.00"));

        assert_eq!(verdict, FraudVerdict::Clean);
    }

    #[test]
    fn test_amount_over_five_times_average_is_flagged() {
        let account = Account::open("Saver", "Savings", dec("100.00"));
        let verdict = verdict_with_history(account, 0, Duration::zero(), dec("500.01"));

        assert_eq!(verdict, FraudVerdict::Flagged(AMOUNT_ANOMALY_REASON));
    }

    #[test]
    fn test_amount_at_exactly_five_times_average_is_clean() {
        // The boundary is strict: 5x the average is allowed.
        let account = Account::open("Saver", "Savings", dec("100.00"));
        let verdict = verdict_with_history(account, 0, Duration::zero(), dec("500.00"));

        assert_eq!(verdict, FraudVerdict::Clean);
    }

    #[test]
    fn test_zero_average_never_triggers_amount_rule() {
        let account = Account::open("NewUser", "Checking", Decimal2::ZERO);
        let verdict = verdict_with_history(account, 0, Duration::zero(), dec("1000000.00"));

        assert_eq!(verdict, FraudVerdict::Clean);
    }

    #[test]
    fn test_frequency_rule_wins_over_amount_rule() {
        // Both rules would match; only the first reason is ever reported.
        let account = Account::open("Fraudster", "Checking", dec("100.00"));
        let verdict = verdict_with_history(account, 10, Duration::seconds(30), dec("9999.00"));

        assert_eq!(verdict, FraudVerdict::Flagged(HIGH_FREQUENCY_REASON));
    }

    #[test]
    fn test_custom_thresholds() {
        let detector = FraudDetector::new(FraudConfig {
            frequency_limit: 1,
            frequency_window: Duration::minutes(1),
            amount_multiplier: Decimal::from(2),
        });

        let store = MemoryStore::new();
        store
            .run_atomic(&mut |txn| {
                let account = txn.save_account(Account::open("Edge", "Checking", dec("10.00")));

                // No history: frequency clean, but 2x multiplier catches 20.01.
                let candidate = Transaction::new(account.id, TxKind::Deposit, dec("20.01"));
                assert_eq!(
                    detector.evaluate(&account, &candidate, txn),
                    FraudVerdict::Flagged(AMOUNT_ANOMALY_REASON)
                );

                // One prior transaction trips a limit of one.
                txn.append_transaction(Transaction::new(account.id, TxKind::Deposit, dec("1.00")));
                let candidate = Transaction::new(account.id, TxKind::Deposit, dec("1.00"));
                assert_eq!(
                    detector.evaluate(&account, &candidate, txn),
                    FraudVerdict::Flagged(HIGH_FREQUENCY_REASON)
                );
                Ok(())
            })
            .unwrap();
    }
}
