#![forbid(unsafe_code)]
#![deny(clippy::float_arithmetic)]
#![deny(clippy::float_cmp)]

//! Operator-side pieces of the staking indexer: configuration, logging,
//! the JSON-RPC token lookup and JSON-lines ingestion.

pub mod config;
pub mod ingest;
pub mod logging;
pub mod rpc;

pub use config::{load_config, parse_config, IndexerConfig, CONFIG_ENV};
pub use ingest::{ingest_lines, IngestError, IngestSummary};
pub use logging::init_logging;
pub use rpc::RpcTokenAddressSource;
