//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Slack allowed when checking that the occupancy probabilities sum to one
pub const PROBABILITY_EPSILON: f64 = 1e-12;

/// Fixed per-species life-history parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesTraits {
    /// Age after which the organism dies
    pub max_age: u32,
    /// Starting energy for newborn animals (unused for plants)
    pub initial_energy: i32,
    /// Metabolic cost paid at the start of every step (animals only)
    pub energy_cost_per_step: i32,
    /// Energy gained from the species' main food
    pub energy_gain: i32,
    /// Minimum age to take part in a mating meeting
    pub min_reproduction_age: u32,
    /// Minimum energy to take part in a mating meeting
    pub min_reproduction_energy: i32,
    /// Chance of an offspring per eligible plant or meeting
    pub reproduction_probability: f64,
}

pub const PLANT_TRAITS: SpeciesTraits = SpeciesTraits {
    max_age: 20,
    initial_energy: 0,
    energy_cost_per_step: 0,
    energy_gain: 0,
    min_reproduction_age: 0,
    min_reproduction_energy: 0,
    reproduction_probability: 0.10,
};

pub const SHEEP_TRAITS: SpeciesTraits = SpeciesTraits {
    max_age: 30,
    initial_energy: 10,
    energy_cost_per_step: 1,
    energy_gain: 5,
    min_reproduction_age: 5,
    min_reproduction_energy: 20,
    reproduction_probability: 0.30,
};

pub const WOLF_TRAITS: SpeciesTraits = SpeciesTraits {
    max_age: 40,
    initial_energy: 20,
    energy_cost_per_step: 1,
    energy_gain: 10,
    min_reproduction_age: 8,
    min_reproduction_energy: 25,
    reproduction_probability: 0.25,
};

/// World configuration parameters.
///
/// Always valid once constructed: go through [`WorldConfig::new`] or
/// deserialization, both of which run [`WorldConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWorldConfig")]
pub struct WorldConfig {
    width: i32,
    height: i32,
    wolf_prob: f64,
    sheep_prob: f64,
    plant_prob: f64,
}

#[derive(Deserialize)]
struct RawWorldConfig {
    width: i32,
    height: i32,
    wolf_prob: f64,
    sheep_prob: f64,
    plant_prob: f64,
}

impl TryFrom<RawWorldConfig> for WorldConfig {
    type Error = Error;

    fn try_from(raw: RawWorldConfig) -> Result<Self> {
        WorldConfig::new(
            raw.width,
            raw.height,
            raw.wolf_prob,
            raw.sheep_prob,
            raw.plant_prob,
        )
    }
}

impl WorldConfig {
    pub fn new(
        width: i32,
        height: i32,
        wolf_prob: f64,
        sheep_prob: f64,
        plant_prob: f64,
    ) -> Result<Self> {
        let config = Self {
            width,
            height,
            wolf_prob,
            sheep_prob,
            plant_prob,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(Error::InvalidConfig(format!(
                "grid of {}x{} cells is too large",
                self.width, self.height
            )));
        }

        for (name, p) in [
            ("wolf_prob", self.wolf_prob),
            ("sheep_prob", self.sheep_prob),
            ("plant_prob", self.plant_prob),
        ] {
            if !p.is_finite() || p < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, p
                )));
            }
        }

        let total = self.wolf_prob + self.sheep_prob + self.plant_prob;
        if total > 1.0 + PROBABILITY_EPSILON {
            return Err(Error::InvalidConfig(format!(
                "occupancy probabilities sum to {}, which exceeds 1.0",
                total
            )));
        }

        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn wolf_prob(&self) -> f64 {
        self.wolf_prob
    }

    pub fn sheep_prob(&self) -> f64 {
        self.sheep_prob
    }

    pub fn plant_prob(&self) -> f64 {
        self.plant_prob
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            wolf_prob: 0.04,
            sheep_prob: 0.12,
            plant_prob: 0.75,
        }
    }
}

/// How the runner decides when to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Run exactly `steps` steps, stopping early on extinction
    Steps,
    /// Run until any species dies out, at most `steps` steps
    UntilExtinction,
}

/// Runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Random seed for reproducibility; drawn at startup when absent
    pub seed: Option<u64>,
    /// Step budget
    pub steps: u64,
    pub mode: RunMode,
    /// Log a population summary every this many steps (0 disables it)
    pub log_every: u64,
    /// Print the grid after the run
    pub render: bool,
    pub world: WorldConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            steps: 100,
            mode: RunMode::Steps,
            log_every: 10,
            render: true,
            world: WorldConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
