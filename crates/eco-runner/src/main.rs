//! Command-line runner for the predator-prey simulation.
//!
//! Usage: `eco-runner [config.json]`. Without a file the default 20x20 world
//! runs for 100 steps. `ECO_SEED` overrides the configured seed.

mod report;
mod telemetry;

use anyhow::{Context, Result};
use eco_core::{RunConfig, RunMode, Species};
use eco_world::{PopulationSnapshot, Simulation};
use rand::Rng;
use tracing::{info, warn};

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let mut config = match std::env::args().nth(1) {
        Some(path) => RunConfig::load(&path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => RunConfig::default(),
    };

    if let Ok(seed) = std::env::var("ECO_SEED") {
        let seed = seed
            .trim()
            .parse()
            .context("ECO_SEED must be an unsigned integer")?;
        config.seed = Some(seed);
    }
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());

    info!(
        seed,
        width = config.world.width(),
        height = config.world.height(),
        steps = config.steps,
        mode = ?config.mode,
        "Starting simulation"
    );

    let mut sim = Simulation::from_config(&config.world, seed)?;
    let history = run(&mut sim, &config)?;

    if config.render {
        for line in report::render(&sim) {
            println!("{}", line);
        }
    }

    let extinct = report::extinction_messages(&sim);
    for line in &extinct {
        println!("{}", line);
    }
    if extinct.is_empty() && config.mode == RunMode::UntilExtinction {
        println!(
            "Stopped after reaching the step limit of {} without an extinction.",
            config.steps
        );
    }

    for line in report::evolution_table(&history) {
        println!("{}", line);
    }

    info!(
        final_step = sim.step_number(),
        plants_born = sim.stats().tally(Species::Plant).born,
        sheep_born = sim.stats().tally(Species::Sheep).born,
        wolves_born = sim.stats().tally(Species::Wolf).born,
        "Simulation finished"
    );
    Ok(())
}

/// Step until the budget runs out or a species disappears, recording the
/// population after every step.
fn run(sim: &mut Simulation, config: &RunConfig) -> Result<Vec<PopulationSnapshot>> {
    let mut history = vec![sim.population_snapshot()];

    for _ in 0..config.steps {
        if sim.any_extinct() {
            break;
        }

        sim.step()
            .with_context(|| format!("step {} failed", sim.step_number()))?;

        let snapshot = sim.population_snapshot();
        if config.log_every > 0 && snapshot.step % config.log_every == 0 {
            info!(
                step = snapshot.step,
                plants = snapshot.plants,
                sheep = snapshot.sheep,
                wolves = snapshot.wolves,
                "Population"
            );
        }
        history.push(snapshot);
    }

    if sim.any_extinct() {
        warn!(step = sim.step_number(), "A species went extinct");
    }

    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::WorldConfig;

    #[test]
    fn test_run_skips_extinct_world() {
        let config = RunConfig {
            steps: 10,
            world: WorldConfig::new(10, 10, 0.0, 0.0, 0.5).unwrap(),
            ..Default::default()
        };
        let mut sim = Simulation::from_config(&config.world, 1).unwrap();

        // No animals: extinct from the start, so nothing runs
        let history = run(&mut sim, &config).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].step, 0);
    }

    #[test]
    fn test_run_stops_at_budget() {
        let config = RunConfig {
            steps: 3,
            world: WorldConfig::new(30, 30, 0.02, 0.2, 0.6).unwrap(),
            ..Default::default()
        };
        let mut sim = Simulation::from_config(&config.world, 2).unwrap();

        // Wolves are too few to clear the sheep in three steps
        let history = run(&mut sim, &config).unwrap();
        assert_eq!(history.len() as u64, config.steps + 1);
        assert_eq!(sim.step_number(), config.steps);
        assert!(history.iter().enumerate().all(|(i, p)| p.step == i as u64));
    }
}
