//! Error types for the `ringflow-graph` crate.
//!
//! All fallible operations in this crate return [`GraphError`].

use ringflow_store::StoreError;
use ringflow_types::{Bearing, BlockId};

/// Errors that can occur while building or querying the block graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A block was not found in the graph.
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),

    /// An edge references a block that is not an active block of the graph.
    #[error("edge from {block} references unknown block {missing}")]
    DanglingEdge {
        /// Source block of the edge.
        block: BlockId,
        /// The endpoint that could not be found.
        missing: BlockId,
    },

    /// Two edges share the same source block and bearing.
    #[error("block {block} has more than one edge on bearing {bearing}")]
    DuplicateEdge {
        /// Source block.
        block: BlockId,
        /// Bearing carrying more than one edge.
        bearing: Bearing,
    },

    /// No mining direction can be resolved for a drive.
    #[error("no mining direction for drive {drive}: {reason}")]
    NoMiningDirection {
        /// The drive name.
        drive: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The underlying store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}
