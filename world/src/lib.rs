#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tanks Grid World.

use tanks_grid_world_core::{Action, Cell, CellGrid, Position};

const TANK_START: Position = Position::new(12, 4);
const ENEMY_START: Position = Position::new(0, 6);
const BULLET_STARTS: [Position; 1] = [Position::new(0, 2)];

const STEP_REWARD: i32 = 1;

/// Static terrain layout of the playfield.
///
/// The layout is fixed for the lifetime of an episode and rebuilt identically
/// on every reset; entities never modify it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    cells: CellGrid,
}

impl GridMap {
    /// Returns the canonical playfield layout as a fresh, independently owned
    /// copy.
    #[must_use]
    pub const fn canonical() -> Self {
        Self {
            cells: CANONICAL_TERRAIN,
        }
    }

    /// Terrain at the provided position, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<Cell> {
        cell_indices(position).map(|(row, column)| self.cells[row][column])
    }

    /// Dense row-major terrain matrix.
    #[must_use]
    pub const fn cells(&self) -> &CellGrid {
        &self.cells
    }
}

/// Positions of every entity tracked by the simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entities {
    tank: Position,
    enemy: Position,
    bullets: Vec<Position>,
}

impl Entities {
    /// Returns the canonical starting positions as a fresh, independently
    /// owned copy.
    #[must_use]
    pub fn starting_positions() -> Self {
        Self {
            tank: TANK_START,
            enemy: ENEMY_START,
            bullets: BULLET_STARTS.to_vec(),
        }
    }

    /// Current position of the player tank.
    #[must_use]
    pub const fn tank(&self) -> Position {
        self.tank
    }

    /// Current position of the enemy tank.
    #[must_use]
    pub const fn enemy(&self) -> Position {
        self.enemy
    }

    /// Bullets currently in flight, in insertion order.
    #[must_use]
    pub fn bullets(&self) -> &[Position] {
        &self.bullets
    }
}

/// Snapshot of the playfield combining terrain with visible entities.
///
/// Observations are derived on request and never alias the terrain map;
/// mutating world state after composition leaves existing observations
/// untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    cells: CellGrid,
}

impl Observation {
    /// Dense row-major matrix of observed cell codes.
    #[must_use]
    pub const fn cells(&self) -> &CellGrid {
        &self.cells
    }

    /// Observed cell at the provided position, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<Cell> {
        cell_indices(position).map(|(row, column)| self.cells[row][column])
    }
}

/// Result of advancing the simulation by a single action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// Reward granted for the completed step.
    pub reward: i32,
    /// Indicates whether the episode reached a defined ending condition.
    pub terminated: bool,
    /// Indicates whether an external limit cut the episode short.
    pub truncated: bool,
}

/// Represents the authoritative Tanks Grid World state.
#[derive(Debug)]
pub struct World {
    map: GridMap,
    entities: Entities,
}

impl World {
    /// Creates a new world at the canonical starting state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: GridMap::canonical(),
            entities: Entities::starting_positions(),
        }
    }

    /// Restores the canonical starting state.
    ///
    /// The rebuild is fully deterministic; episode seeds have no influence on
    /// world content.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advances the simulation by one action and reports the outcome.
    #[must_use]
    pub fn advance(&mut self, action: Action) -> StepOutcome {
        advance_entities(&mut self.entities, action)
    }
}

/// Composes the observation for the provided terrain and entity positions.
///
/// Terrain is copied first, then entity overlays are written in a fixed
/// order: tank, enemy, bullets in registry order. Each overlay consults the
/// underlying terrain, never earlier overlays, so an entity standing on
/// forest stays concealed while later overlays replace earlier ones on any
/// shared non-forest cell.
#[must_use]
pub fn build_observation(map: &GridMap, entities: &Entities) -> Observation {
    let mut cells = *map.cells();
    overlay_entity(&mut cells, map, entities.tank(), Cell::Tank);
    overlay_entity(&mut cells, map, entities.enemy(), Cell::Enemy);
    for bullet in entities.bullets() {
        overlay_entity(&mut cells, map, *bullet, Cell::Bullet);
    }
    Observation { cells }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{build_observation, GridMap, Observation, World};
    use tanks_grid_world_core::Position;

    /// Provides read-only access to the static terrain layout.
    #[must_use]
    pub fn grid_map(world: &World) -> &GridMap {
        &world.map
    }

    /// Current position of the player tank.
    #[must_use]
    pub fn tank(world: &World) -> Position {
        world.entities.tank()
    }

    /// Current position of the enemy tank.
    #[must_use]
    pub fn enemy(world: &World) -> Position {
        world.entities.enemy()
    }

    /// Bullets currently in flight, in insertion order.
    #[must_use]
    pub fn bullets(world: &World) -> &[Position] {
        world.entities.bullets()
    }

    /// Composes the current observation from terrain and visible entities.
    #[must_use]
    pub fn observation(world: &World) -> Observation {
        build_observation(&world.map, &world.entities)
    }
}

fn advance_entities(entities: &mut Entities, action: Action) -> StepOutcome {
    // Combat rules are not defined yet, so the action selects nothing and the
    // episode never ends. The only motion is the tank advancing one row
    // toward row zero, stopping at the edge.
    let _ = action;
    entities.tank = Position::new(
        entities.tank.row().saturating_sub(1),
        entities.tank.column(),
    );

    StepOutcome {
        reward: STEP_REWARD,
        terminated: false,
        truncated: false,
    }
}

fn overlay_entity(cells: &mut CellGrid, map: &GridMap, position: Position, overlay: Cell) {
    debug_assert!(
        position.is_in_bounds(),
        "entity position {position:?} escaped the playfield"
    );
    let Some((row, column)) = cell_indices(position) else {
        return;
    };

    if map.cells()[row][column] != Cell::Forest {
        cells[row][column] = overlay;
    }
}

fn cell_indices(position: Position) -> Option<(usize, usize)> {
    if position.is_in_bounds() {
        Some((position.row() as usize, position.column() as usize))
    } else {
        None
    }
}

const CANONICAL_TERRAIN: CellGrid = {
    use Cell::{Brick as B, Empty as E, Forest as F, Metal as M, Water as W};

    [
        [E, E, E, E, E, E, E, E, E, E, E, E, E],
        [E, B, B, B, E, E, E, E, E, E, B, B, B],
        [B, B, E, E, B, E, F, F, E, B, E, E, B],
        [B, E, E, E, B, F, F, F, F, B, E, E, B],
        [B, E, E, B, B, F, M, M, F, B, B, E, B],
        [B, B, B, B, W, W, W, W, W, W, B, B, B],
        [E, B, B, B, M, M, B, M, M, B, B, B, B],
        [E, E, B, B, M, E, B, E, M, B, B, B, E],
        [E, E, B, B, B, B, B, B, B, B, B, B, E],
        [B, F, B, B, B, M, M, B, B, B, B, F, B],
        [B, F, F, F, F, F, F, F, F, F, F, F, B],
        [E, E, F, F, F, B, B, B, F, F, F, F, E],
        [E, E, E, B, E, B, E, B, E, E, B, E, E],
    ]
};

#[cfg(test)]
mod tests {
    use super::{build_observation, query, Entities, GridMap, Position, World};
    use tanks_grid_world_core::{Action, Cell, GRID_COLUMNS, GRID_ROWS};

    fn entities_at(tank: Position, enemy: Position, bullets: Vec<Position>) -> Entities {
        Entities {
            tank,
            enemy,
            bullets,
        }
    }

    #[test]
    fn canonical_layout_contains_only_terrain() {
        let map = GridMap::canonical();
        for row in map.cells() {
            for cell in row {
                assert!(cell.is_terrain(), "{cell:?} is not terrain");
            }
        }
    }

    #[test]
    fn canonical_layout_matches_known_landmarks() {
        let map = GridMap::canonical();
        assert_eq!(map.cell(Position::new(0, 0)), Some(Cell::Empty));
        assert_eq!(map.cell(Position::new(2, 6)), Some(Cell::Forest));
        assert_eq!(map.cell(Position::new(4, 6)), Some(Cell::Metal));
        assert_eq!(map.cell(Position::new(5, 4)), Some(Cell::Water));
        assert_eq!(map.cell(Position::new(12, 3)), Some(Cell::Brick));
        assert_eq!(map.cell(Position::new(13, 0)), None);
    }

    #[test]
    fn canonical_layout_is_identical_between_calls() {
        assert_eq!(GridMap::canonical(), GridMap::canonical());
    }

    #[test]
    fn starting_positions_match_canonical_defaults() {
        let entities = Entities::starting_positions();
        assert_eq!(entities.tank(), Position::new(12, 4));
        assert_eq!(entities.enemy(), Position::new(0, 6));
        assert_eq!(entities.bullets(), &[Position::new(0, 2)]);
        assert!(entities.tank().is_in_bounds());
        assert!(entities.enemy().is_in_bounds());
    }

    #[test]
    fn observation_overlays_entities_on_visible_terrain() {
        let world = World::new();
        let observation = query::observation(&world);

        assert_eq!(observation.cell(Position::new(12, 4)), Some(Cell::Tank));
        assert_eq!(observation.cell(Position::new(0, 6)), Some(Cell::Enemy));
        assert_eq!(observation.cell(Position::new(0, 2)), Some(Cell::Bullet));
    }

    #[test]
    fn observation_preserves_terrain_away_from_entities() {
        let world = World::new();
        let observation = query::observation(&world);
        let map = query::grid_map(&world);

        let entity_cells = [Position::new(12, 4), Position::new(0, 6), Position::new(0, 2)];
        for row in 0..GRID_ROWS as u32 {
            for column in 0..GRID_COLUMNS as u32 {
                let position = Position::new(row, column);
                if entity_cells.contains(&position) {
                    continue;
                }
                assert_eq!(observation.cell(position), map.cell(position));
            }
        }
    }

    #[test]
    fn forest_conceals_every_entity_kind() {
        let map = GridMap::canonical();
        let tank = Position::new(10, 1);
        let enemy = Position::new(10, 2);
        let bullet = Position::new(10, 3);
        assert_eq!(map.cell(tank), Some(Cell::Forest));
        assert_eq!(map.cell(enemy), Some(Cell::Forest));
        assert_eq!(map.cell(bullet), Some(Cell::Forest));

        let observation = build_observation(&map, &entities_at(tank, enemy, vec![bullet]));

        assert_eq!(observation.cell(tank), Some(Cell::Forest));
        assert_eq!(observation.cell(enemy), Some(Cell::Forest));
        assert_eq!(observation.cell(bullet), Some(Cell::Forest));
    }

    #[test]
    fn enemy_inside_forest_patch_stays_hidden() {
        let map = GridMap::canonical();
        let hidden = Position::new(2, 6);
        let entities = entities_at(Position::new(12, 4), hidden, Vec::new());

        let observation = build_observation(&map, &entities);

        assert_eq!(observation.cell(hidden), Some(Cell::Forest));
    }

    #[test]
    fn later_overlays_replace_earlier_ones_on_shared_cells() {
        let map = GridMap::canonical();
        let shared = Position::new(0, 0);
        assert_eq!(map.cell(shared), Some(Cell::Empty));

        let tank_and_enemy = entities_at(shared, shared, Vec::new());
        assert_eq!(
            build_observation(&map, &tank_and_enemy).cell(shared),
            Some(Cell::Enemy)
        );

        let enemy_and_bullet = entities_at(Position::new(12, 4), shared, vec![shared]);
        assert_eq!(
            build_observation(&map, &enemy_and_bullet).cell(shared),
            Some(Cell::Bullet)
        );

        let all_three = entities_at(shared, shared, vec![shared]);
        assert_eq!(
            build_observation(&map, &all_three).cell(shared),
            Some(Cell::Bullet)
        );
    }

    #[test]
    fn occlusion_consults_terrain_rather_than_earlier_overlays() {
        let map = GridMap::canonical();
        let shared = Position::new(10, 5);
        assert_eq!(map.cell(shared), Some(Cell::Forest));

        let observation = build_observation(&map, &entities_at(shared, shared, vec![shared]));

        assert_eq!(observation.cell(shared), Some(Cell::Forest));
    }

    #[test]
    fn composing_observations_leaves_terrain_untouched() {
        let world = World::new();
        let before = query::grid_map(&world).clone();
        let _ = query::observation(&world);
        assert_eq!(query::grid_map(&world), &before);
    }

    #[test]
    fn advancing_grants_unit_reward_without_ending_episode() {
        for index in 0..Action::COUNT {
            let mut world = World::new();
            let action = Action::from_index(index).expect("valid action index");
            let outcome = world.advance(action);

            assert_eq!(outcome.reward, 1, "action {index} changed the reward");
            assert!(!outcome.terminated, "action {index} terminated the episode");
            assert!(!outcome.truncated, "action {index} truncated the episode");
        }
    }

    #[test]
    fn advancing_moves_tank_one_row_toward_top() {
        let mut world = World::new();
        let action = Action::from_index(0).expect("valid action index");
        let _ = world.advance(action);

        assert_eq!(query::tank(&world), Position::new(11, 4));
        assert_eq!(query::enemy(&world), Position::new(0, 6));
        assert_eq!(query::bullets(&world), &[Position::new(0, 2)]);
    }

    #[test]
    fn tank_stops_at_top_row() {
        let mut world = World::new();
        world.entities.tank = Position::new(0, 4);
        let action = Action::from_index(0).expect("valid action index");
        let _ = world.advance(action);

        assert_eq!(query::tank(&world), Position::new(0, 4));
        assert!(query::tank(&world).is_in_bounds());
    }

    #[test]
    fn reset_restores_canonical_state() {
        let mut world = World::new();
        let action = Action::from_index(0).expect("valid action index");
        let _ = world.advance(action);
        let _ = world.advance(action);
        world.reset();

        let fresh = World::new();
        assert_eq!(query::tank(&world), query::tank(&fresh));
        assert_eq!(query::enemy(&world), query::enemy(&fresh));
        assert_eq!(query::bullets(&world), query::bullets(&fresh));
        assert_eq!(query::observation(&world), query::observation(&fresh));
    }

    #[test]
    fn every_observation_cell_stays_within_taxonomy() {
        let mut world = World::new();
        let action = Action::from_index(0).expect("valid action index");
        for _ in 0..3 {
            let observation = query::observation(&world);
            for row in observation.cells() {
                for cell in row {
                    assert!(cell.code() < Cell::COUNT);
                }
            }
            let _ = world.advance(action);
        }
    }
}
