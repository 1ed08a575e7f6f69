use staking_core::{ArithmeticError, ContractReadError, EntityKind, EventCursor, StoreError};

/// Why an event could not be applied. Every variant aborts the event and
/// leaves the store as it was before the event.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
    #[error("contract read failed: {0}")]
    ContractRead(#[from] ContractReadError),
    #[error("{kind} record {id} already exists")]
    RecordExists { kind: EntityKind, id: String },
    /// A never-applied event sorting at or before the last applied one.
    #[error("event at {event} arrived after {cursor} was already applied")]
    OutOfOrder {
        cursor: EventCursor,
        event: EventCursor,
    },
}
