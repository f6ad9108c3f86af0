// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger CLI
//!
//! Entry point for the `ledger` binary. Parses CLI arguments, initializes
//! logging, opens the selected chain and runs one subcommand against it.
//!
//! - `init`     — create the genesis block
//! - `append`   — seal a block of transactions onto the chain
//! - `show`, `last`, `find` — print blocks as JSON
//! - `list`, `count` — inspect the index
//! - `validate` — check the whole chain
//! - `address`  — generate an address
//! - `demo`     — build a chain of random transfers

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::Rng;

use ledger_core::{BlockDraft, Insertion, Ledger, Payload, Transaction, TransactionBuilder};

use cli::{Commands, DemoArgs, GlobalArgs, LedgerCli, TxArgs};

fn main() -> Result<()> {
    let cli = LedgerCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.global.log_format);
    run(cli)
}

fn run(cli: LedgerCli) -> Result<()> {
    if let Commands::Address = cli.command {
        println!("{}", Ledger::generate_address());
        return Ok(());
    }

    let mut ledger = open_ledger(&cli.global)?;

    match cli.command {
        Commands::Init(args) => init_chain(&mut ledger, args),
        Commands::Append(args) => append_block(&mut ledger, args),
        Commands::Show { index } => {
            let block = ledger
                .get(index)
                .with_context(|| format!("failed to load block #{index}"))?;
            println!("{}", block.to_json(true));
            Ok(())
        }
        Commands::Last => {
            let block = ledger.last().context("failed to load the tip")?;
            println!("{}", block.to_json(true));
            Ok(())
        }
        Commands::List { count } => {
            for entry in ledger.list(count).context("failed to read the index")? {
                println!("{entry}");
            }
            Ok(())
        }
        Commands::Find { hash } => {
            let block = ledger
                .find(&hash)
                .with_context(|| format!("failed to find block {hash}"))?;
            println!("{}", block.to_json(true));
            Ok(())
        }
        Commands::Count => {
            println!("{}", ledger.count().context("failed to count blocks")?);
            Ok(())
        }
        Commands::Validate => validate_chain(&ledger),
        Commands::Demo(args) => run_demo(&mut ledger, args),
        Commands::Address => Ok(()),
    }
}

fn open_ledger(global: &GlobalArgs) -> Result<Ledger> {
    Ledger::open(&global.name, &global.data_dir, global.ledger_config()).with_context(|| {
        format!(
            "failed to open ledger {:?} in {}",
            global.name,
            global.data_dir.display()
        )
    })
}

fn build_draft(payloads: Vec<Payload>) -> Result<BlockDraft> {
    let mut draft = BlockDraft::new();
    for (i, payload) in payloads.into_iter().enumerate() {
        draft
            .add_transaction(Transaction::new(payload))
            .with_context(|| format!("transaction #{} repeats an earlier one", i + 1))?;
    }
    Ok(draft)
}

/// Insert `draft` and print the new block's number and hash.
fn seal(ledger: &mut Ledger, draft: BlockDraft) -> Result<()> {
    match ledger.insert(draft).context("failed to insert block")? {
        Insertion::Appended(block) => {
            println!("{},{}", block.index(), block.hash());
            Ok(())
        }
        Insertion::Rejected { reason, .. } => bail!("block rejected: {reason}"),
    }
}

fn init_chain(ledger: &mut Ledger, args: TxArgs) -> Result<()> {
    if ledger.is_initialized() {
        bail!("ledger already initialized at {}", ledger.path().display());
    }
    seal(ledger, build_draft(args.transactions)?)
}

fn append_block(ledger: &mut Ledger, args: TxArgs) -> Result<()> {
    if !ledger.is_initialized() {
        bail!(
            "no genesis block at {}; run `ledger init` first",
            ledger.path().display()
        );
    }
    seal(ledger, build_draft(args.transactions)?)
}

fn validate_chain(ledger: &Ledger) -> Result<()> {
    let count = ledger.count().context("failed to count blocks")?;
    if ledger.validate().context("failed to read the chain")? {
        println!("valid ({count} blocks)");
        Ok(())
    } else {
        bail!("chain {} failed validation", ledger.name())
    }
}

/// A transfer between two fresh addresses, timestamped now.
fn random_transfer(rng: &mut impl Rng) -> Transaction {
    TransactionBuilder::new()
        .field(
            "date",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        )
        .field("from", Ledger::generate_address())
        .field("to", Ledger::generate_address())
        .field("amount", rng.gen_range(1..=10_000u64))
        .build()
}

/// Genesis (if needed) plus `args.blocks` blocks of 1 to 5 random
/// transfers, then a full validation pass.
fn run_demo(ledger: &mut Ledger, args: DemoArgs) -> Result<()> {
    let mut rng = rand::thread_rng();
    let blocks = args.blocks + u64::from(!ledger.is_initialized());

    for _ in 0..blocks {
        let mut draft = BlockDraft::new();
        for _ in 0..rng.gen_range(1..=5) {
            // Fresh addresses make every transfer unique.
            draft
                .add_transaction(random_transfer(&mut rng))
                .context("demo generated a duplicate transaction")?;
        }
        seal(ledger, draft)?;
    }

    validate_chain(ledger)
}
