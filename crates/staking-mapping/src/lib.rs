#![forbid(unsafe_code)]
#![deny(clippy::float_arithmetic)]
#![deny(clippy::float_cmp)]

//! Event handlers for the staking indexer.
//!
//! Each event is reduced inside an [`EventScope`]: handlers read and stage
//! entity writes there, and the [`Indexer`] commits the staged batch plus
//! the new cursor in one store write. A failing handler leaves no trace.

pub mod accumulators;
pub mod audit;
mod diagnostics;
pub mod error;
pub mod indexer;
pub mod outcome;
pub mod query;
pub mod scope;
pub mod staking;
pub mod token;

pub use audit::{audit, AuditReport};
pub use error::ApplyError;
pub use indexer::{handle_event, ApplyOutcome, ApplyReceipt, Indexer};
pub use outcome::HandlerOutput;
pub use query::TransactionRecords;
pub use scope::EventScope;
