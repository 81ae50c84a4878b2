//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and scenario
//! execution so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ringflow_core::ConfigError,
    },

    /// Loading the dataset into the store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: ringflow_store::StoreError,
    },

    /// Adjacency rebuild or graph load failed.
    #[error("graph error: {source}")]
    Graph {
        /// The underlying graph error.
        #[from]
        source: ringflow_graph::GraphError,
    },

    /// A scenario run failed.
    #[error("scenario error: {source}")]
    Scenario {
        /// The underlying scenario error.
        #[from]
        source: ringflow_core::ScenarioError,
    },

    /// Reading the dataset file failed.
    #[error("failed to read dataset: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The dataset or report JSON was malformed.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// A scenario worker panicked or was cancelled.
    #[error("scenario worker failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}
