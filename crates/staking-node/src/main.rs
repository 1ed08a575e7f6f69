#![forbid(unsafe_code)]

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use staking_core::{
    parse_address, parse_tx_hash, tx_id, FixedTokenAddress, TokenAddressSource,
};
use staking_mapping::{audit, query, Indexer};
use staking_node::{
    ingest_lines, init_logging, load_config, IndexerConfig, RpcTokenAddressSource, CONFIG_ENV,
};
use staking_storage::SledEntityStore;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Staking and token event indexer")]
struct Args {
    /// Path to a TOML config file. If omitted, uses `STAKING_INDEXER_CONFIG`.
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Overrides `storage.path`.
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON-lines file of decoded events.
    Ingest {
        #[arg(long)]
        events: PathBuf,
    },
    /// Show one user by address.
    User { address: String },
    /// Show a transaction and every record logged under it.
    Tx { hash: String },
    /// Show the global statistics record.
    Stats,
    /// List a user's staking activities.
    Activities { address: String },
    /// List transfers a user sent or received.
    Transfers { address: String },
    /// Recompute totals and report inconsistencies. Exits non-zero on failure.
    Audit,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = match &args.config {
        Some(path) => load_config(path).map_err(anyhow::Error::msg)?,
        None => IndexerConfig::default(),
    };
    init_logging(&cfg.logging);

    let db_path = args
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.storage.path));
    let store = SledEntityStore::open(&db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))?;
    info!(node = %cfg.node.label, db = %db_path.display(), "store opened");

    match args.command {
        Command::Ingest { events } => {
            let tokens = token_source(&cfg)?;
            let indexer = Indexer::new(&store, tokens.as_ref());
            let file = File::open(&events)
                .with_context(|| format!("failed to open {}", events.display()))?;
            let result = ingest_lines(BufReader::new(file), &indexer);
            // Events before a failing line are committed; make them durable either way.
            store.flush().context("failed to flush store")?;
            let summary =
                result.with_context(|| format!("ingest of {} stopped", events.display()))?;
            print_json(&summary)?;
        }
        Command::User { address } => {
            let address = parse_address(&address)?;
            print_json(&query::user(&store, &address)?)?;
        }
        Command::Tx { hash } => {
            let id = tx_id(&parse_tx_hash(&hash)?);
            let Some(tx) = query::transaction(&store, &id)? else {
                bail!("transaction {id} not indexed");
            };
            let records = query::records_for_transaction(&store, &id)?;
            print_json(&TxView {
                transaction: tx,
                records,
            })?;
        }
        Command::Stats => print_json(&query::global_stats(&store)?)?,
        Command::Activities { address } => {
            let address = parse_address(&address)?;
            print_json(&query::activities_for_user(&store, &address)?)?;
        }
        Command::Transfers { address } => {
            let address = parse_address(&address)?;
            print_json(&query::transfers_for_user(&store, &address)?)?;
        }
        Command::Audit => {
            let report = audit(&store)?;
            print_json(&report)?;
            if !report.is_consistent() {
                bail!("audit found inconsistencies");
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct TxView {
    transaction: staking_core::Transaction,
    #[serde(flatten)]
    records: staking_mapping::TransactionRecords,
}

fn token_source(cfg: &IndexerConfig) -> anyhow::Result<Box<dyn TokenAddressSource>> {
    if let Some(raw) = &cfg.ethereum.token_address {
        let token = parse_address(raw).context("ethereum.token_address")?;
        return Ok(Box::new(FixedTokenAddress(token)));
    }
    let rpc = RpcTokenAddressSource::new(
        cfg.ethereum.rpc_url.clone(),
        Duration::from_millis(cfg.ethereum.timeout_ms),
    )?;
    Ok(Box::new(rpc))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
