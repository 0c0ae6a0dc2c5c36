//! Organism state and per-species behavior.

use crate::grid::Grid;
use eco_core::{OrganismId, Position, Species};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Why an organism stopped being alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    OldAge,
    Starvation,
    /// Eaten or trampled by an animal moving into its cell
    Predation,
}

/// An organism in the simulation.
///
/// Behavior is dispatched on `species`; animals additionally carry energy.
/// The position is only ever written by the [`Grid`] placement primitives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    id: OrganismId,
    species: Species,
    position: Position,
    age: u32,
    max_age: u32,
    energy: Option<i32>,
    death: Option<DeathCause>,
}

impl Organism {
    pub fn new(id: OrganismId, species: Species, position: Position) -> Self {
        let traits = species.traits();
        Self {
            id,
            species,
            position,
            age: 0,
            max_age: traits.max_age,
            energy: species.is_animal().then_some(traits.initial_energy),
            death: None,
        }
    }

    pub fn id(&self) -> OrganismId {
        self.id
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn symbol(&self) -> char {
        self.species.symbol()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    /// Current energy, `None` for plants
    pub fn energy(&self) -> Option<i32> {
        self.energy
    }

    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death
    }

    /// Mark the organism dead. The first cause sticks; death is permanent.
    pub fn kill(&mut self, cause: DeathCause) {
        if self.death.is_none() {
            self.death = Some(cause);
        }
    }

    /// Age by one step and pay the metabolic cost.
    ///
    /// Must run exactly once per step on a live organism: a second call ages
    /// and charges it again.
    pub fn on_step_start(&mut self) {
        self.age += 1;
        if self.age > self.max_age {
            self.kill(DeathCause::OldAge);
            return;
        }

        if let Some(energy) = self.energy.as_mut() {
            *energy -= self.species.traits().energy_cost_per_step;
            if *energy <= 0 {
                self.kill(DeathCause::Starvation);
            }
        }
    }

    pub fn requires_mate_for_reproduction(&self) -> bool {
        self.species.is_animal()
    }

    pub fn is_adult_for_reproduction(&self) -> bool {
        match self.energy {
            None => true,
            Some(energy) => {
                let traits = self.species.traits();
                self.age >= traits.min_reproduction_age
                    && energy >= traits.min_reproduction_energy
            }
        }
    }

    pub fn reproduction_probability(&self) -> f64 {
        self.species.traits().reproduction_probability
    }

    /// A fresh organism of the same species with default attributes
    pub fn create_offspring(&self, id: OrganismId, position: Position) -> Organism {
        Organism::new(id, self.species, position)
    }

    /// Pick a destination for this step: a random enterable neighbor, or the
    /// current cell when boxed in. Plants never move.
    pub fn choose_move_target(&self, grid: &Grid, rng: &mut ChaCha8Rng) -> Position {
        if !self.species.is_animal() {
            return self.position;
        }

        let mut candidates = grid.adjacent4(self.position);
        candidates.shuffle(rng);

        candidates
            .into_iter()
            .find(|&pos| {
                self.species
                    .can_enter(grid.get_at(pos).map(Organism::species))
            })
            .unwrap_or(self.position)
    }

    /// Pick a random empty neighbor for a seedling, if any.
    pub fn choose_reproduction_target(
        &self,
        grid: &Grid,
        rng: &mut ChaCha8Rng,
    ) -> Option<Position> {
        grid.random_empty_adjacent(self.position, rng)
    }

    /// Gain the energy for eating `prey`; returns the amount gained.
    pub fn feed_on(&mut self, prey: Species) -> i32 {
        let gain = self.species.energy_from(prey).unwrap_or(0);
        if let Some(energy) = self.energy.as_mut() {
            *energy += gain;
        }
        gain
    }
}
