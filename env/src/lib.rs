#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Environment lifecycle for Tanks Grid World.
//!
//! This crate wraps the authoritative world in the standard
//! reset/step/close contract: callers construct an environment explicitly,
//! reset it to the canonical starting state, submit one discrete action per
//! step, and receive the composed observation together with the step
//! outcome. Rendering is opt-in at construction and never required for
//! simulation.

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use tanks_grid_world_core::{Action, ActionOutOfRange, Cell, GRID_COLUMNS, GRID_ROWS};
use tanks_grid_world_rendering::{GridRenderer, RenderingError};
use tanks_grid_world_world::{query, Observation, World};

/// Lifecycle contract that every variant of the environment satisfies
/// identically.
pub trait Environment {
    /// Declared shape of every observation the environment emits.
    fn observation_space(&self) -> ObservationSpace;

    /// Declared shape of the actions the environment accepts.
    fn action_space(&self) -> ActionSpace;

    /// Rebuilds the canonical starting state and returns the fresh
    /// observation.
    ///
    /// Seed and options are accepted to satisfy the standard lifecycle shape
    /// but have no influence on world content; every reset yields the same
    /// state.
    fn reset(&mut self, seed: Option<u64>, options: Option<Info>) -> (Observation, Info);

    /// Advances the simulation by one action and reports the full step
    /// outcome.
    fn step(&mut self, action: Action) -> Result<Step, EnvError>;

    /// Releases presentation resources held by the environment.
    ///
    /// Safe to call before any frame was rendered and safe to call
    /// repeatedly.
    fn close(&mut self);
}

/// Full outcome of a single environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Observation composed after the transition.
    pub observation: Observation,
    /// Reward granted for the step.
    pub reward: i32,
    /// Indicates whether the episode reached a defined ending condition.
    pub terminated: bool,
    /// Indicates whether an external limit cut the episode short.
    pub truncated: bool,
    /// Auxiliary diagnostic entries attached to the step.
    pub info: Info,
}

/// Auxiliary key-value entries attached to lifecycle results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Info {
    entries: Vec<(String, InfoValue)>,
}

impl Info {
    /// Creates an empty info map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts an entry, replacing any previous value stored under the key.
    pub fn insert<K>(&mut self, key: K, value: InfoValue)
    where
        K: Into<String>,
    {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Retrieves the value stored under the key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Returns `true` when the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterator over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, InfoValue)> {
        self.entries.iter()
    }
}

/// Value stored in an [`Info`] map.
#[derive(Clone, Debug, PartialEq)]
pub enum InfoValue {
    /// Integer payload.
    Int(i64),
    /// Floating point payload.
    Float(f64),
    /// Text payload.
    Text(String),
    /// Boolean payload.
    Bool(bool),
}

/// Declared shape of the environment's observations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObservationSpace {
    rows: usize,
    columns: usize,
    code_count: u8,
}

impl ObservationSpace {
    /// Observation space of the canonical playfield.
    #[must_use]
    pub const fn canonical() -> Self {
        Self {
            rows: GRID_ROWS,
            columns: GRID_COLUMNS,
            code_count: Cell::COUNT,
        }
    }

    /// Number of observed rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of observed columns.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Exclusive upper bound on observed cell codes.
    #[must_use]
    pub const fn code_count(&self) -> u8 {
        self.code_count
    }

    /// Reports whether the observation lies within the declared space.
    #[must_use]
    pub fn contains(&self, observation: &Observation) -> bool {
        let cells = observation.cells();
        cells.len() == self.rows
            && cells.iter().all(|row| {
                row.len() == self.columns && row.iter().all(|cell| cell.code() < self.code_count)
            })
    }
}

/// Declared shape of the environment's actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSpace {
    count: u8,
}

impl ActionSpace {
    /// Action space of the canonical environment.
    #[must_use]
    pub const fn canonical() -> Self {
        Self {
            count: Action::COUNT,
        }
    }

    /// Number of discrete action categories.
    #[must_use]
    pub const fn count(&self) -> u8 {
        self.count
    }

    /// Reports whether the raw index lies within the action space.
    #[must_use]
    pub fn contains(&self, index: u8) -> bool {
        index < self.count
    }

    /// Draws a uniformly distributed action from the space.
    pub fn sample<R>(&self, rng: &mut R) -> Action
    where
        R: Rng,
    {
        let actions = Action::all();
        actions[rng.gen_range(0..actions.len())]
    }
}

/// Rendering behavior selected when constructing an environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Headless stepping with no presentation.
    Disabled,
    /// A window presents the observation after every step.
    Human,
}

/// Errors surfaced by environment lifecycle calls.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A raw action index outside the declared action space reached the
    /// lifecycle boundary.
    #[error("action rejected: {0}")]
    Action(#[from] ActionOutOfRange),
    /// Presenting a frame through the rendering adapter failed.
    #[error("rendering failed: {0}")]
    Rendering(#[from] RenderingError),
}

/// Tanks Grid World environment driving the authoritative world through the
/// standard lifecycle.
#[derive(Debug)]
pub struct TanksGridWorld {
    world: World,
    render_mode: RenderMode,
    renderer: Option<GridRenderer>,
}

impl TanksGridWorld {
    /// Creates a headless environment at the canonical starting state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            world: World::new(),
            render_mode: RenderMode::Disabled,
            renderer: None,
        }
    }

    /// Creates an environment that presents every step through the provided
    /// renderer.
    #[must_use]
    pub fn with_renderer(renderer: GridRenderer) -> Self {
        Self {
            world: World::new(),
            render_mode: RenderMode::Human,
            renderer: Some(renderer),
        }
    }

    /// Rendering behavior selected at construction.
    #[must_use]
    pub const fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Validates a raw action index at the lifecycle boundary, then steps.
    ///
    /// Rejected indices leave the simulation untouched.
    pub fn step_index(&mut self, index: u8) -> Result<Step, EnvError> {
        let action = Action::from_index(index)?;
        self.step(action)
    }
}

impl Environment for TanksGridWorld {
    fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::canonical()
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::canonical()
    }

    fn reset(&mut self, seed: Option<u64>, options: Option<Info>) -> (Observation, Info) {
        let _ = options;
        debug!(?seed, "environment reset to canonical state");
        self.world.reset();
        (query::observation(&self.world), Info::new())
    }

    fn step(&mut self, action: Action) -> Result<Step, EnvError> {
        let outcome = self.world.advance(action);
        let observation = query::observation(&self.world);

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.draw_frame(observation.cells())?;
        }

        Ok(Step {
            observation,
            reward: outcome.reward,
            terminated: outcome.terminated,
            truncated: outcome.truncated,
            info: Info::new(),
        })
    }

    fn close(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.release();
        }
        debug!("environment closed");
    }
}
