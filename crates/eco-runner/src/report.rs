//! Human-readable output: grid, counters, and population history.

use eco_core::Species;
use eco_world::{PopulationSnapshot, Simulation};

/// Histories up to this length are printed in full
const FULL_TABLE_LIMIT: usize = 50;
const HEAD_ROWS: usize = 5;
const TAIL_ROWS: usize = 5;
const MIDDLE_ROWS: usize = 25;

/// Step header, bordered grid, live counts and event counters
pub fn render(sim: &Simulation) -> Vec<String> {
    let stats = sim.stats();
    let plants = stats.tally(Species::Plant);
    let sheep = stats.tally(Species::Sheep);
    let wolves = stats.tally(Species::Wolf);

    let mut lines = vec![String::new(), format!("Step {}", sim.step_number())];
    lines.extend(sim.grid().to_text_lines());
    lines.push(format!(
        "Alive -> Plants(*): {} | Sheep(O): {} | Wolves(W): {}",
        sim.count(Species::Plant),
        sim.count(Species::Sheep),
        sim.count(Species::Wolf)
    ));
    lines.push(format!(
        "Born -> *(+): {} | O(+): {} | W(+): {}",
        plants.born, sheep.born, wolves.born
    ));
    lines.push(format!(
        "Interactions -> plants eaten by O: {} | sheep eaten by W: {} | plants trampled by W: {}",
        stats.plants_eaten_by_sheep(),
        stats.sheep_eaten_by_wolves(),
        stats.plants_trampled_by_wolves()
    ));
    lines.push(format!(
        "Natural deaths -> plants (age): {} | sheep (age): {}, starvation: {} | wolves (age): {}, starvation: {}",
        plants.died_of_age,
        sheep.died_of_age,
        sheep.died_of_starvation,
        wolves.died_of_age,
        wolves.died_of_starvation
    ));
    lines.push(String::new());
    lines
}

pub fn extinction_messages(sim: &Simulation) -> Vec<String> {
    Species::all()
        .into_iter()
        .filter(|&species| sim.count(species) == 0)
        .map(|species| {
            format!(
                "Extinction: {} ({}) disappeared.",
                plural(species),
                species.symbol()
            )
        })
        .collect()
}

fn plural(species: Species) -> &'static str {
    match species {
        Species::Plant => "plants",
        Species::Sheep => "sheep",
        Species::Wolf => "wolves",
    }
}

/// Population table over time. Long histories show the first and last rows
/// with an evenly sampled middle.
pub fn evolution_table(history: &[PopulationSnapshot]) -> Vec<String> {
    if history.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![
        String::new(),
        "Population over time (steps):".to_string(),
        " Step | Plants(*) | Sheep(O) | Wolves(W)".to_string(),
        "-----------------------------------------".to_string(),
    ];

    if history.len() <= FULL_TABLE_LIMIT {
        lines.extend(history.iter().map(table_row));
    } else {
        let ellipsis = "  ... |    ...    |   ...    |   ...".to_string();
        let middle_end = history.len() - TAIL_ROWS;
        let stride = ((middle_end - HEAD_ROWS) / MIDDLE_ROWS).max(1);

        lines.extend(history[..HEAD_ROWS].iter().map(table_row));
        lines.push(ellipsis.clone());
        lines.extend(
            history[HEAD_ROWS..middle_end]
                .iter()
                .step_by(stride)
                .map(table_row),
        );
        lines.push(ellipsis);
        lines.extend(history[middle_end..].iter().map(table_row));
    }

    lines.push(String::new());
    lines
}

fn table_row(point: &PopulationSnapshot) -> String {
    format!(
        "{:5} | {:9} | {:8} | {:9}",
        point.step, point.plants, point.sheep, point.wolves
    )
}
