//! JSON-lines event ingestion: one `IndexedEvent` object per line.

use serde::Serialize;
use staking_core::{EntityStore, IndexedEvent, TokenAddressSource};
use staking_mapping::{ApplyError, ApplyOutcome, Indexer};
use std::io::BufRead;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("read error at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid event at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("event at line {line} failed: {source}")]
    Apply {
        line: usize,
        #[source]
        source: ApplyError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub applied: usize,
    pub skipped: usize,
}

/// Applies events in file order and stops at the first bad line. Events
/// before it stay committed; rerunning resumes after the stored cursor.
pub fn ingest_lines<R, S, T>(reader: R, indexer: &Indexer<S, T>) -> Result<IngestSummary, IngestError>
where
    R: BufRead,
    S: EntityStore,
    T: TokenAddressSource,
{
    let mut summary = IngestSummary::default();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| IngestError::Io {
            line: line_no,
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event: IndexedEvent =
            serde_json::from_str(trimmed).map_err(|source| IngestError::Parse {
                line: line_no,
                source,
            })?;
        let receipt = indexer.apply(&event).map_err(|source| {
            warn!(line = line_no, tx_hash = %event.tx_hash, log_index = event.log_index, error = %source, "event failed");
            IngestError::Apply {
                line: line_no,
                source,
            }
        })?;
        match receipt.outcome {
            ApplyOutcome::Applied => summary.applied += 1,
            ApplyOutcome::AlreadyApplied => summary.skipped += 1,
        }
    }
    info!(applied = summary.applied, skipped = summary.skipped, "ingest finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use staking_core::{Address, FixedTokenAddress};
    use staking_storage::MemoryEntityStore;

    const STAKE: &str = r#"{"block_number":"12","block_timestamp":"1000","tx_hash":"0x1111111111111111111111111111111111111111111111111111111111111111","log_index":"0","contract":"0x5151515151515151515151515151515151515151","event":{"type":"staked","user":"0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA","amount":"100"}}"#;

    fn indexer(store: &MemoryEntityStore) -> Indexer<&MemoryEntityStore, FixedTokenAddress> {
        Indexer::new(store, FixedTokenAddress(Address::repeat_byte(0x70)))
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let store = MemoryEntityStore::new();
        let input = format!("# replay\n\n{STAKE}\n{STAKE}\n");
        let summary = ingest_lines(input.as_bytes(), &indexer(&store)).unwrap();
        assert_eq!(summary, IngestSummary { applied: 1, skipped: 1 });
    }

    #[test]
    fn parse_errors_carry_the_line_number() {
        let store = MemoryEntityStore::new();
        let input = format!("{STAKE}\n{{\"block_number\":\"13\"}}\n");
        let err = ingest_lines(input.as_bytes(), &indexer(&store)).unwrap_err();
        assert!(matches!(err, IngestError::Parse { line: 2, .. }), "{err}");
        assert!(store.cursor().unwrap().is_some());
    }
}
