//! Core type definitions for the simulation.

use crate::config::{SpeciesTraits, PLANT_TRAITS, SHEEP_TRAITS, WOLF_TRAITS};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Symbol used when rendering an empty cell
pub const EMPTY_SYMBOL: char = '.';

/// Stable handle to an organism placed on the grid.
///
/// Handles are allocated in increasing order and never reused, so ordering by
/// id is ordering by placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganismId(pub u64);

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The neighboring position one cell away in `direction`
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.translate(dx, dy)
    }

    /// Manhattan distance to another position
    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

// Row-major: the same order the grid stores its cells in.
impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned direction for movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}

/// The three kinds of organism living on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Plant,
    Sheep,
    Wolf,
}

impl Species {
    pub fn all() -> [Species; 3] {
        [Species::Plant, Species::Sheep, Species::Wolf]
    }

    /// Dense index, usable for per-species arrays
    pub fn index(self) -> usize {
        match self {
            Species::Plant => 0,
            Species::Sheep => 1,
            Species::Wolf => 2,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Species::Plant => '*',
            Species::Sheep => 'O',
            Species::Wolf => 'W',
        }
    }

    pub fn traits(self) -> &'static SpeciesTraits {
        match self {
            Species::Plant => &PLANT_TRAITS,
            Species::Sheep => &SHEEP_TRAITS,
            Species::Wolf => &WOLF_TRAITS,
        }
    }

    /// Animals carry energy, move, and need a mate to reproduce.
    pub fn is_animal(self) -> bool {
        !matches!(self, Species::Plant)
    }

    /// Energy gained by `self` when it enters a cell held by `prey`, or `None`
    /// if `self` cannot enter such a cell at all.
    pub fn energy_from(self, prey: Species) -> Option<i32> {
        match (self, prey) {
            (Species::Sheep, Species::Plant) => Some(SHEEP_TRAITS.energy_gain),
            (Species::Wolf, Species::Sheep) => Some(WOLF_TRAITS.energy_gain),
            // Wolves trample plants without feeding on them
            (Species::Wolf, Species::Plant) => Some(0),
            _ => None,
        }
    }

    pub fn can_eat(self, prey: Species) -> bool {
        self.energy_from(prey).is_some()
    }

    /// Whether an organism of this species may move into a cell with `occupant`.
    pub fn can_enter(self, occupant: Option<Species>) -> bool {
        occupant.map_or(true, |other| self.can_eat(other))
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Species::Plant => "plant",
            Species::Sheep => "sheep",
            Species::Wolf => "wolf",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering_is_row_major() {
        let mut cells = vec![
            Position::new(1, 1),
            Position::new(0, 1),
            Position::new(2, 0),
            Position::new(0, 0),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                Position::new(0, 0),
                Position::new(2, 0),
                Position::new(0, 1),
                Position::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_manhattan_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.manhattan_distance(&pos2), 7);
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::North.to_delta(), (0, -1));
        assert_eq!(Direction::South.to_delta(), (0, 1));
        assert_eq!(Direction::East.to_delta(), (1, 0));
        assert_eq!(Direction::West.to_delta(), (-1, 0));
        assert_eq!(Position::new(2, 2).step(Direction::West), Position::new(1, 2));
    }

    #[test]
    fn test_species_symbols() {
        assert_eq!(Species::Plant.symbol(), '*');
        assert_eq!(Species::Sheep.symbol(), 'O');
        assert_eq!(Species::Wolf.symbol(), 'W');
        assert_eq!(EMPTY_SYMBOL, '.');
    }

    #[test]
    fn test_diet() {
        assert!(Species::Sheep.can_enter(None));
        assert!(Species::Sheep.can_enter(Some(Species::Plant)));
        assert!(!Species::Sheep.can_enter(Some(Species::Sheep)));
        assert!(!Species::Sheep.can_enter(Some(Species::Wolf)));

        assert!(Species::Wolf.can_enter(Some(Species::Sheep)));
        assert!(Species::Wolf.can_enter(Some(Species::Plant)));
        assert!(!Species::Wolf.can_enter(Some(Species::Wolf)));

        assert_eq!(Species::Wolf.energy_from(Species::Plant), Some(0));
        assert_eq!(
            Species::Wolf.energy_from(Species::Sheep),
            Some(WOLF_TRAITS.energy_gain)
        );
        assert_eq!(Species::Plant.energy_from(Species::Plant), None);
    }
}
