//! Error types for the `ringflow-store` crate.

use ringflow_types::{BlockId, ScenarioId};

/// Result type for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("store lock poisoned during {operation}")]
    LockPoisoned {
        /// The operation that observed the poisoned lock.
        operation: &'static str,
    },

    /// A scenario with the same id was already committed.
    #[error("scenario already committed: {0}")]
    DuplicateScenario(ScenarioId),

    /// The requested scenario does not exist.
    #[error("scenario not found: {0}")]
    ScenarioNotFound(ScenarioId),

    /// A referenced block does not exist.
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),

    /// An edge handed to a level rebuild touches a block on another level.
    #[error("edge endpoint {block} is not on level {level}")]
    ForeignLevel {
        /// The level being rebuilt.
        level: i32,
        /// The offending endpoint.
        block: BlockId,
    },
}
