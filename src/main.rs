//! Bank Ledger CLI
//!
//! Processes a CSV command script against a fresh in-memory ledger and
//! outputs the final account states.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > accounts.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use bank_ledger::{cli, BankEngine, EngineError, MemoryStore, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(EngineError::MissingArgument);
    }

    let input_path = &args[1];
    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let engine = BankEngine::new(MemoryStore::new());

    let stdout = io::stdout();
    let handle = stdout.lock();
    cli::run_script(&engine, reader, handle)?;

    Ok(())
}
