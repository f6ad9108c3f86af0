//! # CLI Interface
//!
//! Defines the command-line argument structure for `ledger` using `clap`
//! derive. Global flags select the chain; subcommands act on it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ledger_core::config::{DEFAULT_DIFFICULTY, DEFAULT_LOOKBACK};
use ledger_core::{LedgerConfig, Payload};
use serde_json::Value;

use crate::logging::LogFormat;

/// File-backed, hash-chained ledger.
///
/// Every block is a JSON file under `<data-dir>/<name>/`, linked to its
/// predecessor by hash and mined to the configured difficulty.
#[derive(Parser, Debug)]
#[command(
    name = "ledger",
    about = "File-backed, hash-chained ledger",
    version,
    propagate_version = true
)]
pub struct LedgerCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory holding one sub-directory per chain.
    #[arg(long, short = 'd', env = "LEDGER_DATA_DIR", default_value = "./data", global = true)]
    pub data_dir: PathBuf,

    /// Chain name (ASCII letters, digits and '-').
    #[arg(long, short = 'n', env = "LEDGER_NAME", default_value = "main", global = true)]
    pub name: String,

    /// Leading hex zeros required of new block hashes.
    #[arg(long, env = "LEDGER_DIFFICULTY", default_value_t = DEFAULT_DIFFICULTY, global = true)]
    pub difficulty: u32,

    /// Number of recent blocks scanned for duplicate transactions.
    #[arg(long, env = "LEDGER_LOOKBACK", default_value_t = DEFAULT_LOOKBACK, global = true)]
    pub lookback: u64,

    /// Write block files pretty-printed instead of compact.
    #[arg(long, global = true)]
    pub pretty_files: bool,

    /// Log output format.
    #[arg(
        long,
        env = "LEDGER_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty,
        global = true
    )]
    pub log_format: LogFormat,
}

impl GlobalArgs {
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig::default()
            .with_difficulty(self.difficulty)
            .with_lookback(self.lookback)
            .with_pretty_json(self.pretty_files)
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the genesis block.
    Init(TxArgs),
    /// Seal a new block onto the chain.
    Append(TxArgs),
    /// Print block <INDEX>.
    Show {
        index: u64,
    },
    /// Print the most recent block.
    Last,
    /// List the most recent block numbers and hashes, newest first.
    List {
        #[arg(long, short = 'c', default_value_t = 10)]
        count: usize,
    },
    /// Print the block with hash <HASH>.
    Find {
        hash: String,
    },
    /// Print the number of blocks, genesis included.
    Count,
    /// Check every block and every link. Exits non-zero on failure.
    Validate,
    /// Print a freshly generated address.
    Address,
    /// Build a chain of blocks filled with random transfers.
    Demo(DemoArgs),
}

/// Transactions for `init` and `append`.
#[derive(Args, Debug)]
pub struct TxArgs {
    /// A transaction payload as a JSON object; repeat for more.
    ///
    /// Example: --tx '{"from":"tony","to":"jon","amount":500}'
    #[arg(long = "tx", required = true, value_parser = parse_payload)]
    pub transactions: Vec<Payload>,
}

/// Arguments for the `demo` subcommand.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Number of blocks to add after genesis.
    #[arg(long, default_value_t = 5)]
    pub blocks: u64,
}

/// Parse a `--tx` value. Only JSON objects are payloads.
fn parse_payload(raw: &str) -> Result<Payload, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {other}")),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        LedgerCli::command().debug_assert();
    }

    #[test]
    fn append_collects_payloads_in_order() {
        let cli = LedgerCli::try_parse_from([
            "ledger",
            "--difficulty",
            "0",
            "append",
            "--tx",
            r#"{"to":"jon","amount":1}"#,
            "--tx",
            r#"{"from":"tony"}"#,
        ])
        .unwrap();

        assert_eq!(cli.global.difficulty, 0);
        match cli.command {
            Commands::Append(args) => {
                assert_eq!(args.transactions.len(), 2);
                let keys: Vec<&String> = args.transactions[0].keys().collect();
                assert_eq!(keys, ["to", "amount"]);
            }
            other => panic!("parsed as {other:?}"),
        }
    }

    #[test]
    fn non_object_payload_is_rejected() {
        for bad in ["[1,2]", "42", "{broken"] {
            assert!(LedgerCli::try_parse_from(["ledger", "append", "--tx", bad]).is_err());
        }
    }

    #[test]
    fn append_requires_a_transaction() {
        assert!(LedgerCli::try_parse_from(["ledger", "append"]).is_err());
    }

    #[test]
    fn global_flags_build_config() {
        let cli = LedgerCli::try_parse_from([
            "ledger",
            "count",
            "--lookback",
            "3",
            "--pretty-files",
        ])
        .unwrap();
        let config = cli.global.ledger_config();
        assert_eq!(config.lookback, 3);
        assert!(config.pretty_json);
        assert_eq!(config.difficulty, DEFAULT_DIFFICULTY);
    }
}
