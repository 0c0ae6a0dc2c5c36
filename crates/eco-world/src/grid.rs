//! 2D bounded grid: the only owner of organism placement.

use crate::organism::Organism;
use eco_core::{
    Direction, Error, OrganismId, Position, Result, Species, WorldConfig, EMPTY_SYMBOL,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// A rectangular grid holding at most one organism per cell.
///
/// Cells store handles into the roster; the roster owns the organisms. The
/// roster is keyed by [`OrganismId`], so iterating it visits organisms in
/// placement order.
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Option<OrganismId>>,
    organisms: BTreeMap<OrganismId, Organism>,
    next_id: u64,
}

/// Number of cells in a `width` x `height` grid, rejecting sizes that do not fit
fn cell_count(width: i32, height: i32) -> Result<usize> {
    if width <= 0 || height <= 0 {
        return Err(Error::InvalidConfig(format!(
            "grid dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    width
        .checked_mul(height)
        .map(|area| area as usize)
        .ok_or_else(|| {
            Error::InvalidConfig(format!("grid of {}x{} cells is too large", width, height))
        })
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let area = cell_count(width, height)?;

        Ok(Self {
            width,
            height,
            cells: vec![None; area],
            organisms: BTreeMap::new(),
            next_id: 0,
        })
    }

    /// Create a randomly populated grid from world configuration
    pub fn from_config(config: &WorldConfig, rng: &mut ChaCha8Rng) -> Result<Self> {
        let mut grid = Self::new(config.width(), config.height())?;
        grid.initialize_random(config, rng)?;
        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_inside(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index_of(&self, pos: Position) -> Option<usize> {
        self.is_inside(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Occupant of `pos`; `None` for empty or out-of-bounds cells
    pub fn get_at(&self, pos: Position) -> Option<&Organism> {
        let id = self.occupant_id(pos)?;
        self.organisms.get(&id)
    }

    pub fn occupant_id(&self, pos: Position) -> Option<OrganismId> {
        self.index_of(pos).and_then(|index| self.cells[index])
    }

    /// True for in-bounds cells with no occupant
    pub fn is_empty(&self, pos: Position) -> bool {
        self.index_of(pos)
            .map_or(false, |index| self.cells[index].is_none())
    }

    /// In-bounds axis neighbors, always in north, south, east, west order
    pub fn adjacent4(&self, pos: Position) -> Vec<Position> {
        if !self.is_inside(pos) {
            return Vec::new();
        }

        Direction::all()
            .into_iter()
            .map(|direction| pos.step(direction))
            .filter(|&neighbor| self.is_inside(neighbor))
            .collect()
    }

    /// A uniformly random empty neighbor of `pos`, if there is one.
    pub fn random_empty_adjacent(&self, pos: Position, rng: &mut ChaCha8Rng) -> Option<Position> {
        let mut candidates = self.adjacent4(pos);
        candidates.shuffle(rng);
        candidates.into_iter().find(|&p| self.is_empty(p))
    }

    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.get(&id)
    }

    pub fn organism_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        self.organisms.get_mut(&id)
    }

    /// Iterator over the roster in placement order
    pub fn organisms(&self) -> impl Iterator<Item = &Organism> + '_ {
        self.organisms.values()
    }

    /// Number of organisms on the roster, including dead ones not yet swept
    pub fn population(&self) -> usize {
        self.organisms.len()
    }

    /// Point-in-time copy of the roster, safe to iterate while mutating the grid.
    pub fn snapshot(&self) -> Vec<OrganismId> {
        self.organisms.keys().copied().collect()
    }

    /// Live organisms of `species`; dead ones awaiting cleanup are not counted.
    pub fn count_species(&self, species: Species) -> usize {
        self.organisms
            .values()
            .filter(|o| o.is_alive() && o.species() == species)
            .count()
    }

    /// Reserve a fresh handle for an organism about to be placed
    pub fn allocate_id(&mut self) -> OrganismId {
        let id = OrganismId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create an organism of `species` and place it at `pos`
    pub fn spawn(&mut self, species: Species, pos: Position) -> Result<OrganismId> {
        let id = self.allocate_id();
        self.place(Organism::new(id, species, pos), pos)
    }

    /// Put `organism` into the empty cell `pos` and onto the roster.
    pub fn place(&mut self, mut organism: Organism, pos: Position) -> Result<OrganismId> {
        let index = self.index_of(pos).ok_or(Error::OutOfBounds(pos))?;
        if self.cells[index].is_some() {
            return Err(Error::CellOccupied(pos));
        }

        let id = organism.id();
        if self.organisms.contains_key(&id) {
            return Err(Error::Inconsistent(format!(
                "organism {} is already on the grid",
                id
            )));
        }

        organism.set_position(pos);
        self.cells[index] = Some(id);
        self.organisms.insert(id, organism);
        self.next_id = self.next_id.max(id.0 + 1);
        Ok(id)
    }

    /// Cell index of `id`'s recorded position, checked against the cell contents
    fn origin_index(&self, id: OrganismId) -> Result<usize> {
        let organism = self.organisms.get(&id).ok_or(Error::UnknownOrganism(id))?;
        let pos = organism.position();
        match self.index_of(pos) {
            Some(index) if self.cells[index] == Some(id) => Ok(index),
            _ => Err(Error::Inconsistent(format!(
                "organism {} is not in its recorded cell {}",
                id, pos
            ))),
        }
    }

    /// Relocate `id` to the empty cell `new_pos`.
    pub fn move_to_empty(&mut self, id: OrganismId, new_pos: Position) -> Result<()> {
        let dest = self.index_of(new_pos).ok_or(Error::OutOfBounds(new_pos))?;
        if self.cells[dest].is_some() {
            return Err(Error::CellOccupied(new_pos));
        }
        let origin = self.origin_index(id)?;

        self.cells[origin] = None;
        self.cells[dest] = Some(id);
        if let Some(organism) = self.organisms.get_mut(&id) {
            organism.set_position(new_pos);
        }
        Ok(())
    }

    /// Relocate `mover` to `new_pos`, detaching whatever occupies it.
    ///
    /// The displaced organism is removed from the grid and roster and handed
    /// back; recording its death is up to the caller. Moving onto the mover's
    /// own cell is a no-op.
    pub fn move_into(&mut self, mover: OrganismId, new_pos: Position) -> Result<Option<Organism>> {
        let dest = self.index_of(new_pos).ok_or(Error::OutOfBounds(new_pos))?;
        let current = self
            .organisms
            .get(&mover)
            .ok_or(Error::UnknownOrganism(mover))?
            .position();
        if current == new_pos {
            return Ok(None);
        }
        let origin = self.origin_index(mover)?;

        let displaced = match self.cells[dest] {
            Some(occupant) => Some(self.organisms.remove(&occupant).ok_or_else(|| {
                Error::Inconsistent(format!(
                    "cell {} holds {} which is not on the roster",
                    new_pos, occupant
                ))
            })?),
            None => None,
        };

        self.cells[origin] = None;
        self.cells[dest] = Some(mover);
        if let Some(organism) = self.organisms.get_mut(&mover) {
            organism.set_position(new_pos);
        }
        Ok(displaced)
    }

    /// Take `id` off the grid and roster. Unknown ids are ignored.
    pub fn remove(&mut self, id: OrganismId) -> Option<Organism> {
        let organism = self.organisms.remove(&id)?;
        if let Some(index) = self.index_of(organism.position()) {
            if self.cells[index] == Some(id) {
                self.cells[index] = None;
            }
        }
        Some(organism)
    }

    pub fn clear_all(&mut self) {
        self.organisms.clear();
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    /// Clear the grid, resize it to `config`, and fill every cell independently:
    /// wolf band first, then sheep, then plant, remainder empty.
    pub fn initialize_random(&mut self, config: &WorldConfig, rng: &mut ChaCha8Rng) -> Result<()> {
        let area = cell_count(config.width(), config.height())?;
        self.width = config.width();
        self.height = config.height();
        self.cells = vec![None; area];
        self.clear_all();

        let wolf_band = config.wolf_prob();
        let sheep_band = wolf_band + config.sheep_prob();
        let plant_band = sheep_band + config.plant_prob();

        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                let roll = rng.gen::<f64>();

                let species = if roll < wolf_band {
                    Some(Species::Wolf)
                } else if roll < sheep_band {
                    Some(Species::Sheep)
                } else if roll < plant_band {
                    Some(Species::Plant)
                } else {
                    None
                };

                if let Some(species) = species {
                    self.spawn(species, pos)?;
                }
            }
        }

        Ok(())
    }

    /// Verify that cells and roster agree about every occupant.
    pub fn check_invariants(&self) -> Result<()> {
        let positions = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Position::new(x, y)));
        for (pos, cell) in positions.zip(&self.cells) {
            if let Some(id) = cell {
                match self.organisms.get(id) {
                    Some(organism) if organism.position() == pos => {}
                    Some(organism) => {
                        return Err(Error::Inconsistent(format!(
                            "cell {} holds {} which records position {}",
                            pos,
                            id,
                            organism.position()
                        )))
                    }
                    None => {
                        return Err(Error::Inconsistent(format!(
                            "cell {} holds {} which is not on the roster",
                            pos, id
                        )))
                    }
                }
            }
        }

        for (id, organism) in &self.organisms {
            if self.occupant_id(organism.position()) != Some(*id) {
                return Err(Error::Inconsistent(format!(
                    "{} is on the roster but not in cell {}",
                    id,
                    organism.position()
                )));
            }
        }

        Ok(())
    }

    /// One row per grid line, each cell its species symbol or `.`
    pub fn to_char_matrix(&self) -> Vec<Vec<char>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        self.get_at(Position::new(x, y))
                            .map_or(EMPTY_SYMBOL, Organism::symbol)
                    })
                    .collect()
            })
            .collect()
    }

    /// Bordered text rendering, cells separated by single spaces
    pub fn to_text_lines(&self) -> Vec<String> {
        let border = format!("+{}+", "-".repeat(self.width as usize * 2 + 1));

        let mut lines = Vec::with_capacity(self.height as usize + 2);
        lines.push(border.clone());
        for row in self.to_char_matrix() {
            let cells: Vec<String> = row.iter().map(char::to_string).collect();
            lines.push(format!("| {} |", cells.join(" ")));
        }
        lines.push(border);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organism::DeathCause;
    use rand::SeedableRng;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 8).unwrap();
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 8);
        assert_eq!(grid.cells.len(), 80);
        assert_eq!(grid.population(), 0);

        assert!(Grid::new(0, 5).is_err());
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        assert!(matches!(
            Grid::new(50_000, 50_000),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Grid::new(i32::MAX, 2),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::new(3, 2).unwrap();
        assert!(grid.is_inside(Position::new(2, 1)));
        assert!(!grid.is_inside(Position::new(3, 0)));
        assert!(!grid.is_inside(Position::new(0, -1)));
        assert!(grid.get_at(Position::new(-1, 0)).is_none());
        assert!(!grid.is_empty(Position::new(5, 5)));
    }

    #[test]
    fn test_adjacent4() {
        let grid = Grid::new(3, 3).unwrap();
        assert_eq!(grid.adjacent4(Position::new(1, 1)).len(), 4);
        assert_eq!(
            grid.adjacent4(Position::new(0, 0)),
            vec![Position::new(0, 1), Position::new(1, 0)]
        );
        assert!(grid.adjacent4(Position::new(7, 7)).is_empty());
    }

    #[test]
    fn test_place_rejects_occupied_and_outside() {
        let mut grid = Grid::new(3, 3).unwrap();
        let id = grid.spawn(Species::Plant, Position::new(1, 1)).unwrap();
        assert_eq!(grid.get_at(Position::new(1, 1)).unwrap().id(), id);

        assert!(matches!(
            grid.spawn(Species::Sheep, Position::new(1, 1)),
            Err(Error::CellOccupied(_))
        ));
        assert!(matches!(
            grid.spawn(Species::Sheep, Position::new(3, 1)),
            Err(Error::OutOfBounds(_))
        ));
        assert_eq!(grid.population(), 1);
        grid.check_invariants().unwrap();
    }

    #[test]
    fn test_move_to_empty() {
        let mut grid = Grid::new(3, 3).unwrap();
        let sheep = grid.spawn(Species::Sheep, Position::new(0, 0)).unwrap();
        grid.spawn(Species::Plant, Position::new(1, 0)).unwrap();

        assert!(matches!(
            grid.move_to_empty(sheep, Position::new(1, 0)),
            Err(Error::CellOccupied(_))
        ));

        grid.move_to_empty(sheep, Position::new(0, 1)).unwrap();
        assert!(grid.is_empty(Position::new(0, 0)));
        assert_eq!(grid.organism(sheep).unwrap().position(), Position::new(0, 1));
        grid.check_invariants().unwrap();
    }

    #[test]
    fn test_move_into_displaces_occupant() {
        let mut grid = Grid::new(3, 3).unwrap();
        let wolf = grid.spawn(Species::Wolf, Position::new(0, 0)).unwrap();
        let sheep = grid.spawn(Species::Sheep, Position::new(0, 1)).unwrap();

        let displaced = grid.move_into(wolf, Position::new(0, 1)).unwrap().unwrap();
        assert_eq!(displaced.id(), sheep);
        assert!(grid.organism(sheep).is_none());
        assert_eq!(grid.occupant_id(Position::new(0, 1)), Some(wolf));
        assert!(grid.is_empty(Position::new(0, 0)));
        assert_eq!(grid.population(), 1);
        grid.check_invariants().unwrap();
    }

    #[test]
    fn test_move_into_own_cell_is_noop() {
        let mut grid = Grid::new(2, 2).unwrap();
        let wolf = grid.spawn(Species::Wolf, Position::new(1, 1)).unwrap();
        assert!(grid.move_into(wolf, Position::new(1, 1)).unwrap().is_none());
        assert_eq!(grid.occupant_id(Position::new(1, 1)), Some(wolf));
    }

    #[test]
    fn test_move_into_detects_inconsistency() {
        let mut grid = Grid::new(3, 3).unwrap();
        let wolf = grid.spawn(Species::Wolf, Position::new(0, 0)).unwrap();
        grid.cells[0] = None;

        let result = grid.move_into(wolf, Position::new(1, 0));
        assert!(matches!(result, Err(Error::Inconsistent(_))));
        assert!(grid.check_invariants().is_err());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut grid = Grid::new(2, 2).unwrap();
        let plant = grid.spawn(Species::Plant, Position::new(0, 0)).unwrap();

        assert!(grid.remove(plant).is_some());
        assert!(grid.remove(plant).is_none());
        assert!(grid.is_empty(Position::new(0, 0)));
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn test_snapshot_is_decoupled() {
        let mut grid = Grid::new(3, 3).unwrap();
        let a = grid.spawn(Species::Plant, Position::new(0, 0)).unwrap();
        let b = grid.spawn(Species::Plant, Position::new(1, 0)).unwrap();

        let snapshot = grid.snapshot();
        grid.remove(a);
        grid.spawn(Species::Plant, Position::new(2, 0)).unwrap();

        assert_eq!(snapshot, vec![a, b]);
    }

    #[test]
    fn test_count_species_skips_dead() {
        let mut grid = Grid::new(3, 3).unwrap();
        let sheep = grid.spawn(Species::Sheep, Position::new(0, 0)).unwrap();
        grid.spawn(Species::Sheep, Position::new(1, 0)).unwrap();
        grid.spawn(Species::Wolf, Position::new(2, 0)).unwrap();

        assert_eq!(grid.count_species(Species::Sheep), 2);
        grid.organism_mut(sheep).unwrap().kill(DeathCause::Starvation);
        assert_eq!(grid.count_species(Species::Sheep), 1);
        assert_eq!(grid.count_species(Species::Wolf), 1);
        assert_eq!(grid.count_species(Species::Plant), 0);
    }

    #[test]
    fn test_random_empty_adjacent() {
        let mut grid = Grid::new(3, 1).unwrap();
        grid.spawn(Species::Plant, Position::new(0, 0)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        assert_eq!(
            grid.random_empty_adjacent(Position::new(1, 0), &mut rng),
            Some(Position::new(2, 0))
        );

        grid.spawn(Species::Plant, Position::new(2, 0)).unwrap();
        assert_eq!(grid.random_empty_adjacent(Position::new(1, 0), &mut rng), None);
    }

    #[test]
    fn test_grid_from_config() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = WorldConfig::new(20, 15, 0.1, 0.2, 0.3).unwrap();

        let grid = Grid::from_config(&config, &mut rng).unwrap();
        assert_eq!(grid.width(), 20);
        assert_eq!(grid.height(), 15);
        grid.check_invariants().unwrap();

        let wolves = grid.count_species(Species::Wolf);
        let sheep = grid.count_species(Species::Sheep);
        let plants = grid.count_species(Species::Plant);
        assert!(wolves > 0 && sheep > 0 && plants > 0);
        assert!(wolves + sheep + plants < 300);
    }

    #[test]
    fn test_full_occupancy_config() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = WorldConfig::new(6, 6, 0.0, 0.0, 1.0).unwrap();
        let grid = Grid::from_config(&config, &mut rng).unwrap();
        assert_eq!(grid.count_species(Species::Plant), 36);
    }

    #[test]
    fn test_text_rendering() {
        let mut grid = Grid::new(3, 2).unwrap();
        grid.spawn(Species::Wolf, Position::new(0, 0)).unwrap();
        grid.spawn(Species::Sheep, Position::new(2, 0)).unwrap();
        grid.spawn(Species::Plant, Position::new(1, 1)).unwrap();

        assert_eq!(
            grid.to_char_matrix(),
            vec![vec!['W', '.', 'O'], vec!['.', '*', '.']]
        );
        assert_eq!(
            grid.to_text_lines(),
            vec![
                "+-------+".to_string(),
                "| W . O |".to_string(),
                "| . * . |".to_string(),
                "+-------+".to_string(),
            ]
        );
    }
}
