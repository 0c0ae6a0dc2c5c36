//! Core types and utilities for the Eco-Grid predator-prey simulation.

pub mod types;
pub mod config;
pub mod error;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
