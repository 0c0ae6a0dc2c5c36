//! Error types for the simulation.

use crate::types::{OrganismId, Position};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Position {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("Cell {0} is already occupied")]
    CellOccupied(Position),

    #[error("Unknown organism: {0}")]
    UnknownOrganism(OrganismId),

    #[error("Inconsistent grid state: {0}")]
    Inconsistent(String),
}

impl Error {
    /// Whether the error means the grid invariant was broken, as opposed to bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Error::OutOfBounds(_)
                | Error::CellOccupied(_)
                | Error::UnknownOrganism(_)
                | Error::Inconsistent(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
