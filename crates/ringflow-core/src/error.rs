//! Error types for the `ringflow-core` crate.

use ringflow_graph::GraphError;
use ringflow_store::StoreError;
use ringflow_types::BlockId;

/// Errors raised while advancing fronts through a schedule.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Graph lookup or direction resolution failed.
    #[error("graph error: {source}")]
    Graph {
        /// The underlying graph error.
        #[from]
        source: GraphError,
    },

    /// A store read failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// A block expected in the graph snapshot was missing.
    #[error("block {0} is not in the graph")]
    UnknownBlock(BlockId),
}

/// Errors that abort a whole scenario. Nothing is committed when one is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// A schedule row names a block identifier that matches no active block.
    #[error("unresolvable block identifier in schedule: {identifier}")]
    UnresolvedBlock {
        /// The identifier as written in the schedule.
        identifier: String,
    },

    /// The simulation failed.
    #[error("simulation failed: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },

    /// Reading inputs or committing results failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

impl From<GraphError> for ScenarioError {
    fn from(source: GraphError) -> Self {
        Self::Simulation {
            source: SimulationError::Graph { source },
        }
    }
}
