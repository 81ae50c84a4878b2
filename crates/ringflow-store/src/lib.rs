//! Repository interfaces and an in-memory store for the ringflow simulator.
//!
//! The simulator never talks to a database directly. It reads blocks,
//! edges, rings, and sequencing hints through the traits in [`repository`]
//! and writes adjacency edges, direction records, and finished scenarios
//! back through them.
//!
//! # Modules
//!
//! - [`error`] -- [`StoreError`] and the [`StoreResult`] alias.
//! - [`repository`] -- One trait per table plus the [`MineStore`] bundle.
//! - [`memory`] -- [`MemoryStore`], a lock-guarded in-memory implementation.

pub mod error;
pub mod memory;
pub mod repository;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repository::{
    AdjacencyRepository, BlockRepository, DirectionRepository, MineStore, RingRepository,
    ScenarioRepository, SequenceLinkRepository,
};
