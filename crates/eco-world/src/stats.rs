//! Event counters for a simulation run.

use crate::grid::Grid;
use crate::organism::DeathCause;
use eco_core::Species;
use serde::{Deserialize, Serialize};

/// Per-species event counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesTally {
    /// Present when the run started
    pub initial: u64,
    /// Born through reproduction
    pub born: u64,
    /// Killed by an animal moving into their cell
    pub eaten: u64,
    pub died_of_age: u64,
    pub died_of_starvation: u64,
}

impl SpeciesTally {
    pub fn total_created(&self) -> u64 {
        self.initial + self.born
    }

    pub fn total_died(&self) -> u64 {
        self.eaten + self.died_of_age + self.died_of_starvation
    }

    /// Births minus deaths since the run started
    pub fn net_change(&self) -> i64 {
        self.born as i64 - self.total_died() as i64
    }
}

/// Monotonic counters of births, deaths and predation.
///
/// Built once per run and only ever incremented by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    tallies: [SpeciesTally; 3],
    plants_eaten_by_sheep: u64,
    sheep_eaten_by_wolves: u64,
    plants_trampled_by_wolves: u64,
}

impl SimulationStats {
    /// Seed the initial counts from the live population of `grid`
    pub fn from_grid(grid: &Grid) -> Self {
        let mut stats = Self::default();
        for species in Species::all() {
            stats.tallies[species.index()].initial = grid.count_species(species) as u64;
        }
        stats
    }

    pub fn tally(&self, species: Species) -> &SpeciesTally {
        &self.tallies[species.index()]
    }

    pub fn record_birth(&mut self, species: Species) {
        self.tallies[species.index()].born += 1;
    }

    pub fn record_death(&mut self, species: Species, cause: DeathCause) {
        let tally = &mut self.tallies[species.index()];
        match cause {
            DeathCause::OldAge => tally.died_of_age += 1,
            DeathCause::Starvation => tally.died_of_starvation += 1,
            DeathCause::Predation => tally.eaten += 1,
        }
    }

    /// `predator` moved into a cell held by `prey`
    pub fn record_predation(&mut self, predator: Species, prey: Species) {
        match (predator, prey) {
            (Species::Sheep, Species::Plant) => self.plants_eaten_by_sheep += 1,
            (Species::Wolf, Species::Sheep) => self.sheep_eaten_by_wolves += 1,
            (Species::Wolf, Species::Plant) => self.plants_trampled_by_wolves += 1,
            _ => {}
        }
        self.record_death(prey, DeathCause::Predation);
    }

    pub fn plants_eaten_by_sheep(&self) -> u64 {
        self.plants_eaten_by_sheep
    }

    pub fn sheep_eaten_by_wolves(&self) -> u64 {
        self.sheep_eaten_by_wolves
    }

    pub fn plants_trampled_by_wolves(&self) -> u64 {
        self.plants_trampled_by_wolves
    }

    pub fn total_created(&self, species: Species) -> u64 {
        self.tally(species).total_created()
    }

    pub fn total_died(&self, species: Species) -> u64 {
        self.tally(species).total_died()
    }

    pub fn net_change(&self, species: Species) -> i64 {
        self.tally(species).net_change()
    }
}
