//! Schedule simulation for the ringflow engine.
//!
//! Given a block graph and an uploaded schedule of block-completion dates,
//! this crate advances every drive's charge and drill fronts through time,
//! holds drill fronts back from neighbouring drives' charges, tallies the
//! rings and metres consumed, and aggregates them into a report.
//!
//! # Modules
//!
//! - [`config`] -- [`EngineConfig`], YAML-backed settings with defaults.
//! - [`schedule`] -- Row collapsing, block resolution, processing order.
//! - [`rings`] -- Ring totals per block and live fronts per drive.
//! - [`simulator`] -- [`Simulator`], the per-row front advance.
//! - [`interference`] -- Cross-drive drill clamping and neighbour seeding.
//! - [`tally`] -- Rings and metres between two fronts.
//! - [`report`] -- Drive by period matrix.
//! - [`scenario`] -- [`run_scenario`], the all-or-nothing runner.
//! - [`warnings`] -- Recoverable conditions.
//! - [`error`] -- Fatal conditions.

pub mod config;
pub mod error;
pub mod interference;
pub mod report;
pub mod rings;
pub mod scenario;
pub mod schedule;
pub mod simulator;
pub mod tally;
pub mod warnings;

pub use config::{ConfigError, EngineConfig};
pub use error::{ScenarioError, SimulationError};
pub use report::{Cell, DriveRow, PeriodKey, ProductionReport, build_report};
pub use rings::{LiveFronts, RingIndex};
pub use scenario::{ScenarioOutcome, ScenarioRequest, delete_scenario, run_scenario};
pub use schedule::{ResolvedRow, collapse_duplicates, resolve_rows};
pub use simulator::{FrontSnapshot, SimulationRun, Simulator};
pub use tally::{Tally, tally_span};
pub use warnings::{Front, SimulationWarning, Warnings};
