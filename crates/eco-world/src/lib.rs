//! World simulation engine.
//!
//! This crate implements the bounded 2D grid where plants, sheep and wolves
//! age, move, eat, reproduce, and die.

pub mod grid;
pub mod organism;
pub mod simulation;
pub mod stats;

pub use grid::Grid;
pub use organism::{DeathCause, Organism};
pub use simulation::{roll, Meeting, MovePolicy, PopulationSnapshot, RandomWalk, Simulation};
pub use stats::{SimulationStats, SpeciesTally};
