//! Simulation engine: advances the ecosystem one discrete step at a time.
//!
//! Every step runs five phases in a fixed order:
//!
//! 1. aging and metabolism for every organism alive at the start of the step
//! 2. removal of organisms that died of age or starvation
//! 3. movement, sheep fully resolved before any wolf picks a destination
//! 4. reproduction: plants alone, then sheep and wolves from their meetings
//! 5. a final sweep of anything left dead on the roster
//!
//! Randomness is drawn from a single [`ChaCha8Rng`] in a fixed order: roster
//! snapshots are visited by ascending [`OrganismId`], destination groups by
//! row-major cell order. The same seed therefore always yields the same run.

use crate::grid::Grid;
use crate::organism::{DeathCause, Organism};
use crate::stats::SimulationStats;
use eco_core::{Error, OrganismId, Position, Result, Species, WorldConfig};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument, trace, warn};

/// Chooses where an animal wants to move this step.
pub trait MovePolicy {
    fn choose_target(
        &mut self,
        organism: &Organism,
        grid: &Grid,
        rng: &mut ChaCha8Rng,
    ) -> Position;
}

/// The species' own movement rule: a random enterable neighbor, else stay.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomWalk;

impl MovePolicy for RandomWalk {
    fn choose_target(
        &mut self,
        organism: &Organism,
        grid: &Grid,
        rng: &mut ChaCha8Rng,
    ) -> Position {
        organism.choose_move_target(grid, rng)
    }
}

/// A cell claimed by two or more animals of one species in the same step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    pub species: Species,
    pub cell: Position,
    pub claimants: Vec<OrganismId>,
}

/// Live counts at a given step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub step: u64,
    pub plants: usize,
    pub sheep: usize,
    pub wolves: usize,
}

/// `true` with probability `p`. Certain outcomes do not consume randomness.
pub fn roll(rng: &mut ChaCha8Rng, p: f64) -> bool {
    if p <= 0.0 {
        false
    } else if p >= 1.0 {
        true
    } else {
        rng.gen::<f64>() < p
    }
}

pub struct Simulation {
    grid: Grid,
    rng: ChaCha8Rng,
    stats: SimulationStats,
    step: u64,
}

impl Simulation {
    /// Take ownership of a populated grid; its current population becomes the
    /// initial counts.
    pub fn new(grid: Grid, rng: ChaCha8Rng) -> Self {
        let stats = SimulationStats::from_grid(&grid);
        Self {
            grid,
            rng,
            stats,
            step: 0,
        }
    }

    pub fn from_config(config: &WorldConfig, seed: u64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = Grid::from_config(config, &mut rng)?;
        Ok(Self::new(grid, rng))
    }

    /// Re-populate the grid and start counting from scratch
    pub fn reset(&mut self, config: &WorldConfig) -> Result<()> {
        self.grid.initialize_random(config, &mut self.rng)?;
        self.stats = SimulationStats::from_grid(&self.grid);
        self.step = 0;
        debug!(
            plants = self.count(Species::Plant),
            sheep = self.count(Species::Sheep),
            wolves = self.count(Species::Wolf),
            "World reset"
        );
        Ok(())
    }

    pub fn step_number(&self) -> u64 {
        self.step
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn count(&self, species: Species) -> usize {
        self.grid.count_species(species)
    }

    pub fn population_snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            step: self.step,
            plants: self.count(Species::Plant),
            sheep: self.count(Species::Sheep),
            wolves: self.count(Species::Wolf),
        }
    }

    pub fn any_extinct(&self) -> bool {
        Species::all().into_iter().any(|s| self.count(s) == 0)
    }

    /// Advance one step using each species' own movement rule
    pub fn step(&mut self) -> Result<()> {
        self.step_with(&mut RandomWalk)
    }

    /// Advance one step, asking `policy` for every animal's destination.
    ///
    /// An `Err` means the grid invariant was broken; the step is abandoned
    /// part-way and the world should not be stepped again.
    #[instrument(skip(self, policy), fields(step = self.step + 1))]
    pub fn step_with<P: MovePolicy + ?Sized>(&mut self, policy: &mut P) -> Result<()> {
        self.step += 1;

        self.age_all();
        self.sweep_dead();

        let sheep_meetings = self.move_species(Species::Sheep, policy)?;
        let wolf_meetings = self.move_species(Species::Wolf, policy)?;

        self.reproduce_solitary()?;
        self.reproduce_from_meetings(&sheep_meetings)?;
        self.reproduce_from_meetings(&wolf_meetings)?;

        self.sweep_dead();

        debug!(
            plants = self.count(Species::Plant),
            sheep = self.count(Species::Sheep),
            wolves = self.count(Species::Wolf),
            "Step complete"
        );
        Ok(())
    }

    fn age_all(&mut self) {
        for id in self.grid.snapshot() {
            if let Some(organism) = self.grid.organism_mut(id) {
                if organism.is_alive() {
                    organism.on_step_start();
                }
            }
        }
    }

    /// Remove every dead organism still on the roster and record its cause.
    fn sweep_dead(&mut self) {
        let dead: Vec<OrganismId> = self
            .grid
            .organisms()
            .filter(|o| !o.is_alive())
            .map(Organism::id)
            .collect();

        for id in dead {
            let Some(organism) = self.grid.remove(id) else {
                continue;
            };
            if let Some(cause) = organism.death_cause() {
                self.stats.record_death(organism.species(), cause);
                debug!(
                    organism_id = %id,
                    species = %organism.species(),
                    age = organism.age(),
                    cause = ?cause,
                    "Organism died"
                );
            }
        }
    }

    /// Collect intents for `species`, pick one winner per destination, and
    /// apply the winners' moves. Returns the contested cells.
    fn move_species<P: MovePolicy + ?Sized>(
        &mut self,
        species: Species,
        policy: &mut P,
    ) -> Result<Vec<Meeting>> {
        let mut intents: BTreeMap<Position, Vec<OrganismId>> = BTreeMap::new();

        for id in self.grid.snapshot() {
            let Some(organism) = self.grid.organism(id) else {
                continue;
            };
            if organism.species() != species || !organism.is_alive() {
                continue;
            }

            let mut target = policy.choose_target(organism, &self.grid, &mut self.rng);
            if !self.grid.is_inside(target) {
                target = organism.position();
            }
            trace!(
                organism_id = %id,
                from = %organism.position(),
                to = %target,
                "Move intent"
            );
            intents.entry(target).or_default().push(id);
        }

        let meetings: Vec<Meeting> = intents
            .iter()
            .filter(|(_, claimants)| claimants.len() >= 2)
            .map(|(cell, claimants)| Meeting {
                species,
                cell: *cell,
                claimants: claimants.clone(),
            })
            .collect();

        let mut winners = Vec::with_capacity(intents.len());
        for (cell, claimants) in &intents {
            let winner = match claimants.as_slice() {
                [only] => *only,
                _ => claimants[self.rng.gen_range(0..claimants.len())],
            };
            if claimants.len() > 1 {
                trace!(
                    cell = %cell,
                    claimants = claimants.len(),
                    winner = %winner,
                    "Contested destination resolved"
                );
            }
            winners.push((*cell, winner));
        }

        for (dest, winner) in winners {
            self.apply_move(winner, dest)?;
        }

        Ok(meetings)
    }

    fn apply_move(&mut self, id: OrganismId, dest: Position) -> Result<()> {
        let (species, origin) = match self.grid.organism(id) {
            Some(o) if o.is_alive() => (o.species(), o.position()),
            _ => return Ok(()),
        };
        if origin == dest {
            return Ok(());
        }

        let occupant = self.grid.get_at(dest).map(Organism::species);
        match occupant {
            None => self.grid.move_to_empty(id, dest)?,
            Some(prey) if species.can_eat(prey) => {
                let Some(mut victim) = self.grid.move_into(id, dest)? else {
                    return Ok(());
                };

                match victim.death_cause() {
                    None => {
                        victim.kill(DeathCause::Predation);
                        self.stats.record_predation(species, prey);
                        let gained = self
                            .grid
                            .organism_mut(id)
                            .map_or(0, |mover| mover.feed_on(prey));
                        debug!(
                            predator_id = %id,
                            prey_id = %victim.id(),
                            predator = %species,
                            prey = %prey,
                            cell = %dest,
                            energy_gained = gained,
                            "Organism eaten"
                        );
                    }
                    // Already dead: it leaves the grid here, so count it here
                    Some(cause) => self.stats.record_death(prey, cause),
                }
            }
            Some(occupant) => {
                warn!(
                    organism_id = %id,
                    species = %species,
                    occupant = %occupant,
                    cell = %dest,
                    "Move blocked by an occupant that cannot be entered"
                );
            }
        }

        Ok(())
    }

    /// Every live organism that reproduces without a mate rolls once and, on
    /// success, seeds a random empty neighbor.
    fn reproduce_solitary(&mut self) -> Result<()> {
        for id in self.grid.snapshot() {
            let Some(parent) = self.grid.organism(id) else {
                continue;
            };
            if !parent.is_alive() || parent.requires_mate_for_reproduction() {
                continue;
            }
            if !roll(&mut self.rng, parent.reproduction_probability()) {
                continue;
            }

            let target = parent.choose_reproduction_target(&self.grid, &mut self.rng);
            if let Some(target) = target {
                self.give_birth(id, target)?;
            }
        }
        Ok(())
    }

    /// At most one offspring per meeting, and only if two claimants are still
    /// alive and adult.
    fn reproduce_from_meetings(&mut self, meetings: &[Meeting]) -> Result<()> {
        for meeting in meetings {
            let adults: Vec<OrganismId> = meeting
                .claimants
                .iter()
                .copied()
                .filter(|&id| {
                    self.grid
                        .organism(id)
                        .map_or(false, |o| o.is_alive() && o.is_adult_for_reproduction())
                })
                .collect();

            if adults.len() < 2 {
                trace!(
                    species = %meeting.species,
                    cell = %meeting.cell,
                    adults = adults.len(),
                    "Meeting without enough adults"
                );
                continue;
            }

            if !roll(&mut self.rng, meeting.species.traits().reproduction_probability) {
                continue;
            }

            match self.grid.random_empty_adjacent(meeting.cell, &mut self.rng) {
                Some(target) => self.give_birth(adults[0], target)?,
                None => trace!(
                    species = %meeting.species,
                    cell = %meeting.cell,
                    "No room for offspring"
                ),
            }
        }
        Ok(())
    }

    fn give_birth(&mut self, parent: OrganismId, pos: Position) -> Result<()> {
        let id = self.grid.allocate_id();
        let offspring = self
            .grid
            .organism(parent)
            .ok_or(Error::UnknownOrganism(parent))?
            .create_offspring(id, pos);
        let species = offspring.species();

        self.grid.place(offspring, pos)?;
        self.stats.record_birth(species);
        debug!(
            organism_id = %id,
            parent_id = %parent,
            species = %species,
            cell = %pos,
            "Organism born"
        );
        Ok(())
    }
}
