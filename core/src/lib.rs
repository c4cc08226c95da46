#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tanks Grid World environment.
//!
//! This crate defines the vocabulary that connects the simulation world, the
//! lifecycle layer, and the rendering adapters: the cell taxonomy encoding
//! terrain and entities as small integer codes, grid dimensions, positions on
//! the playfield, and the discrete action handed to each step. Raw integers
//! entering from outside the typed world are converted at the boundary via
//! [`Cell::from_code`] and [`Action::from_index`]; past that boundary,
//! invalid codes and out-of-range actions are unrepresentable.

use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};

/// Display name shared by the window title and diagnostics.
pub const ENVIRONMENT_NAME: &str = "Tanks Grid World";

/// Number of rows in the playfield grid.
pub const GRID_ROWS: usize = 13;

/// Number of columns in the playfield grid.
pub const GRID_COLUMNS: usize = 13;

/// Dense row-major matrix of cell codes covering the whole playfield.
pub type CellGrid = [[Cell; GRID_COLUMNS]; GRID_ROWS];

/// Content of a single grid cell, identified by its canonical integer code.
///
/// Codes `0..=4` describe static terrain; codes `5..=7` are entity overlays
/// written on top of terrain when composing an observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    /// Open ground, freely traversable.
    Empty = 0,
    /// Destructible brick wall.
    Brick = 1,
    /// Forest canopy that conceals entities positioned beneath it.
    Forest = 2,
    /// Indestructible metal wall.
    Metal = 3,
    /// Impassable water.
    Water = 4,
    /// The player-controlled tank.
    Tank = 5,
    /// The opposing tank.
    Enemy = 6,
    /// A bullet in flight.
    Bullet = 7,
}

impl Cell {
    /// Number of distinct cell codes in the taxonomy.
    pub const COUNT: u8 = 8;

    /// Canonical integer code of the cell.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a raw integer code into a cell.
    ///
    /// Returns an error for any value outside the taxonomy; codes are never
    /// clamped or remapped.
    pub fn from_code(code: u8) -> Result<Self, UnknownCellCode> {
        match code {
            0 => Ok(Self::Empty),
            1 => Ok(Self::Brick),
            2 => Ok(Self::Forest),
            3 => Ok(Self::Metal),
            4 => Ok(Self::Water),
            5 => Ok(Self::Tank),
            6 => Ok(Self::Enemy),
            7 => Ok(Self::Bullet),
            _ => Err(UnknownCellCode { code }),
        }
    }

    /// Returns `true` when the cell is static terrain rather than an entity.
    #[must_use]
    pub const fn is_terrain(self) -> bool {
        matches!(
            self,
            Self::Empty | Self::Brick | Self::Forest | Self::Metal | Self::Water
        )
    }

    /// Returns `true` when the cell is an entity overlay drawn over terrain.
    #[must_use]
    pub const fn is_entity_overlay(self) -> bool {
        matches!(self, Self::Tank | Self::Enemy | Self::Bullet)
    }
}

/// Raw value outside the cell taxonomy reached a decode boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownCellCode {
    code: u8,
}

impl UnknownCellCode {
    /// The rejected raw code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        self.code
    }
}

impl fmt::Display for UnknownCellCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cell code must be below {} (received {})",
            Cell::COUNT,
            self.code
        )
    }
}

impl Error for UnknownCellCode {}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: u32,
    column: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Returns `true` when the position lies within the playfield grid.
    #[must_use]
    pub const fn is_in_bounds(&self) -> bool {
        (self.row as usize) < GRID_ROWS && (self.column as usize) < GRID_COLUMNS
    }
}

/// Discrete choice submitted to each simulation step.
///
/// The eight categories carry no defined semantics yet; callers must treat an
/// action as an opaque selection until the combat rules assign meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Action(u8);

impl Action {
    /// Number of discrete action categories.
    pub const COUNT: u8 = 8;

    /// Validates a raw index into an action.
    ///
    /// Returns an error for indices at or above [`Action::COUNT`]; invalid
    /// indices never reach the simulation.
    pub fn from_index(index: u8) -> Result<Self, ActionOutOfRange> {
        if index < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(ActionOutOfRange { index })
        }
    }

    /// Zero-based index of the selected action category.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }

    /// Enumerates every action category in index order.
    #[must_use]
    pub const fn all() -> [Self; Self::COUNT as usize] {
        [
            Self(0),
            Self(1),
            Self(2),
            Self(3),
            Self(4),
            Self(5),
            Self(6),
            Self(7),
        ]
    }
}

/// Raw action index outside the declared action space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionOutOfRange {
    index: u8,
}

impl ActionOutOfRange {
    /// The rejected raw index.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.index
    }
}

impl fmt::Display for ActionOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "action index must be below {} (received {})",
            Action::COUNT,
            self.index
        )
    }
}

impl Error for ActionOutOfRange {}

#[cfg(test)]
mod tests {
    use super::{Action, Cell, Position, GRID_COLUMNS, GRID_ROWS};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn cell_codes_round_trip_through_decode() {
        for code in 0..Cell::COUNT {
            let cell = Cell::from_code(code).expect("codes below COUNT are valid");
            assert_eq!(cell.code(), code);
        }
    }

    #[test]
    fn decode_rejects_codes_outside_taxonomy() {
        for code in [Cell::COUNT, 9, 100, u8::MAX] {
            let error = Cell::from_code(code).expect_err("codes at or above COUNT are invalid");
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn taxonomy_splits_into_terrain_and_entity_overlays() {
        let terrain = [Cell::Empty, Cell::Brick, Cell::Forest, Cell::Metal, Cell::Water];
        let overlays = [Cell::Tank, Cell::Enemy, Cell::Bullet];

        for cell in terrain {
            assert!(cell.is_terrain(), "{cell:?} should classify as terrain");
            assert!(!cell.is_entity_overlay());
        }
        for cell in overlays {
            assert!(cell.is_entity_overlay(), "{cell:?} should classify as overlay");
            assert!(!cell.is_terrain());
        }
    }

    #[test]
    fn action_accepts_every_declared_category() {
        for index in 0..Action::COUNT {
            let action = Action::from_index(index).expect("indices below COUNT are valid");
            assert_eq!(action.index(), index);
        }
    }

    #[test]
    fn action_enumeration_covers_every_category_in_order() {
        let actions = Action::all();
        assert_eq!(actions.len(), Action::COUNT as usize);
        for (expected, action) in actions.iter().enumerate() {
            assert_eq!(action.index() as usize, expected);
        }
    }

    #[test]
    fn action_rejects_out_of_range_indices() {
        for index in [Action::COUNT, 9, u8::MAX] {
            let error = Action::from_index(index).expect_err("indices at or above COUNT fail");
            assert_eq!(error.index(), index);
        }
    }

    #[test]
    fn position_bounds_check_matches_grid_dimensions() {
        assert!(Position::new(0, 0).is_in_bounds());
        assert!(Position::new(GRID_ROWS as u32 - 1, GRID_COLUMNS as u32 - 1).is_in_bounds());
        assert!(!Position::new(GRID_ROWS as u32, 0).is_in_bounds());
        assert!(!Position::new(0, GRID_COLUMNS as u32).is_in_bounds());
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_round_trips_through_bincode() {
        for code in 0..Cell::COUNT {
            assert_round_trip(&Cell::from_code(code).expect("valid code"));
        }
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(12, 4));
    }

    #[test]
    fn action_round_trips_through_bincode() {
        assert_round_trip(&Action::from_index(3).expect("valid index"));
    }
}
