//! CSV command front end.
//!
//! Processes a script of banking commands in streaming fashion and writes the
//! final account states as CSV. Commands that fail business validation are
//! logged at warn level and skipped; the script keeps going, mirroring how a
//! teller would handle a rejected request.
//!
//! # Command format
//!
//! ```csv
//! op,account,to,amount,name,kind
//! open,,,1000.00,Alice,Savings
//! deposit,1,,200.00,,
//! withdraw,1,,300.00,,
//! transfer,1,2,50.00,,
//! history,1,,,,
//! ```
//!
//! `history` rows are echoed to the output as `tx,...` lines as they are
//! requested; after the script, every opened account is written as an
//! `account,...` row sorted by account ID for deterministic output.

use crate::account::AccountId;
use crate::decimal::Decimal2;
use crate::engine::BankEngine;
use crate::error::Result;
use crate::store::LedgerStore;
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use serde::Deserialize;
use std::io::{Read, Write};
use std::str::FromStr;

/// Raw command row as read from CSV.
///
/// All columns after `op` are optional; each command kind picks the ones it
/// needs during [`CommandRecord::parse`].
#[derive(Debug, Deserialize)]
pub struct CommandRecord {
    /// Command name: open, deposit, withdraw, transfer, history
    pub op: String,

    /// Acting account ID (source account for transfers)
    pub account: Option<AccountId>,

    /// Destination account ID (transfers only)
    pub to: Option<AccountId>,

    /// Monetary amount; the initial balance for `open`
    pub amount: Option<String>,

    /// Customer name (`open` only)
    pub name: Option<String>,

    /// Account type (`open` only)
    pub kind: Option<String>,
}

impl CommandRecord {
    /// Parses the raw CSV record into a typed command.
    ///
    /// Returns `None` if the record is invalid (unknown op, missing fields,
    /// unparseable amount).
    pub fn parse(&self) -> Option<Command> {
        let op = self.op.trim().to_lowercase();

        match op.as_str() {
            "open" => {
                let name = self.name.as_deref()?.trim();
                if name.is_empty() {
                    return None;
                }
                let kind = self.kind.as_deref().unwrap_or("").trim();
                Some(Command::Open {
                    name: name.to_string(),
                    kind: kind.to_string(),
                    initial_balance: self.parse_amount()?,
                })
            }
            "deposit" => Some(Command::Deposit {
                account: self.account?,
                amount: self.parse_amount()?,
            }),
            "withdraw" => Some(Command::Withdraw {
                account: self.account?,
                amount: self.parse_amount()?,
            }),
            "transfer" => Some(Command::Transfer {
                from: self.account?,
                to: self.to?,
                amount: self.parse_amount()?,
            }),
            "history" => Some(Command::History {
                account: self.account?,
            }),
            _ => None,
        }
    }

    /// Parses the amount field into a `Decimal2`.
    fn parse_amount(&self) -> Option<Decimal2> {
        let amount_str = self.amount.as_ref()?;
        let trimmed = amount_str.trim();
        if trimmed.is_empty() {
            return None;
        }
        Decimal2::from_str(trimmed).ok()
    }
}

/// A parsed and validated command ready for dispatch.
#[derive(Debug, Clone)]
pub enum Command {
    /// Open a new account.
    Open {
        name: String,
        kind: String,
        initial_balance: Decimal2,
    },

    /// Deposit funds.
    Deposit { account: AccountId, amount: Decimal2 },

    /// Withdraw funds.
    Withdraw { account: AccountId, amount: Decimal2 },

    /// Move funds between two accounts.
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal2,
    },

    /// Print the account's transaction history.
    History { account: AccountId },
}

/// Processes a command script from a CSV reader in streaming fashion.
///
/// Records are read one at a time. Invalid records and rejected operations
/// are logged at warn level and skipped. After the script completes, the
/// final state of every account opened by it is written to `writer`.
pub fn run_script<S, R, W>(engine: &BankEngine<S>, reader: R, mut writer: W) -> Result<()>
where
    S: LedgerStore,
    R: Read,
    W: Write,
{
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut opened: Vec<AccountId> = Vec::new();

    for (row_idx, result) in csv_reader.deserialize::<CommandRecord>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Row {}: CSV parse error: {}", row_num, e);
                continue;
            }
        };

        let command = match record.parse() {
            Some(command) => command,
            None => {
                warn!("Row {}: Failed to parse command record", row_num);
                continue;
            }
        };

        if let Err(e) = execute(engine, &command, &mut opened, &mut writer) {
            warn!("Row {}: {}", row_num, e);
        }
    }

    write_accounts(engine, &opened, &mut writer)
}

/// Executes a single command against the engine.
fn execute<S, W>(
    engine: &BankEngine<S>,
    command: &Command,
    opened: &mut Vec<AccountId>,
    writer: &mut W,
) -> Result<()>
where
    S: LedgerStore,
    W: Write,
{
    match command {
        Command::Open {
            name,
            kind,
            initial_balance,
        } => {
            let account = engine.create_account(name, kind, *initial_balance)?;
            opened.push(account.id);
            debug!("Opened account {} for {}", account.id, name);
        }
        Command::Deposit { account, amount } => {
            let updated = engine.deposit(*account, *amount)?;
            debug!("Deposited {} to account {}", amount, updated.id);
        }
        Command::Withdraw { account, amount } => {
            let updated = engine.withdraw(*account, *amount)?;
            debug!("Withdrew {} from account {}", amount, updated.id);
        }
        Command::Transfer { from, to, amount } => {
            engine.transfer(*from, *to, *amount)?;
            debug!("Transferred {} from account {} to account {}", amount, from, to);
        }
        Command::History { account } => {
            for tx in engine.transaction_history(*account)? {
                writeln!(
                    writer,
                    "tx,{},{},{},{},{},{}",
                    account,
                    tx.id,
                    tx.kind,
                    tx.amount,
                    tx.flagged,
                    tx.flag_reason.as_deref().unwrap_or("")
                )?;
            }
        }
    }

    Ok(())
}

/// Writes final account states to CSV.
///
/// Output is sorted by account ID in ascending order for deterministic
/// results. Monetary values are formatted with exactly 2 decimal places.
fn write_accounts<S, W>(engine: &BankEngine<S>, opened: &[AccountId], writer: &mut W) -> Result<()>
where
    S: LedgerStore,
    W: Write,
{
    writeln!(writer, "account,name,kind,balance,avg_amount")?;

    let mut ids: Vec<AccountId> = opened.to_vec();
    ids.sort_unstable();

    for id in ids {
        let account = engine.get_account(id)?;
        writeln!(
            writer,
            "{},{},{},{},{}",
            account.id, account.customer_name, account.kind, account.balance, account.avg_transaction
        )?;
    }

    writer.flush()?;
    Ok(())
}
