//! Tyre strategy simulation and search.
//!
//! A lap-time model reacting to compound, wear, fuel, weather and safety events,
//! and an exhaustive search over one- and two-stop strategies ranked by race time.

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod report;
pub mod rng;
pub mod search;
pub mod simulation;
pub mod strategy;
pub mod tyre;

pub use config::{RaceConfig, SafetyEvent, Weather};
pub use error::{ConfigError, SearchError};
pub use rng::{Calm, RandomSource, SeededRandom};
pub use search::{search_strategies, RankedStrategy, SearchOutcome};
pub use simulation::{RaceSimulator, SimulationResult};
pub use strategy::{Stint, Strategy};
pub use tyre::{Compound, TyreTable};
