//! Be Mine - a valentine mini-game in four stages
//!
//! Core modules:
//! - `sim`: Deterministic simulation (prompt, catch game, reveal grid, maze, sequencer)
//! - `config`: Data-driven variants (phrases, targets, grid size, maze layout, UI text)

pub mod config;
pub mod sim;

pub use config::{ConfigError, GameConfig, Variant};
pub use sim::{GameEvent, GameState, Stage, tick};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one display frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Spawner period in ticks (~900 ms)
    pub const SPAWN_INTERVAL_TICKS: u32 = 54;
    /// Delay between the last catch and the reveal grid (~350 ms)
    pub const CATCH_WIN_DELAY_TICKS: u32 = 21;

    /// Default catch area before the host reports its real size
    pub const DEFAULT_AREA_WIDTH: f32 = 360.0;
    pub const DEFAULT_AREA_HEIGHT: f32 = 420.0;

    /// Falling item geometry
    pub const ITEM_SIZE: f32 = 30.0;
    pub const ITEM_SPAWN_Y: f32 = -40.0;
    /// Items below `height + ITEM_EXIT_MARGIN` are discarded
    pub const ITEM_EXIT_MARGIN: f32 = 60.0;
    pub const ITEM_MIN_SPEED: f32 = 1.0;
    pub const ITEM_MAX_SPEED: f32 = 1.6;
    /// Pixels fallen per tick per unit of speed
    pub const FALL_SCALE: f32 = 3.2;

    /// Collector geometry (sits on the bottom edge of the area)
    pub const COLLECTOR_WIDTH: f32 = 80.0;
    pub const COLLECTOR_HEIGHT: f32 = 44.0;
    pub const COLLECTOR_BOTTOM_GAP: f32 = 8.0;

    /// Swipes shorter than this on both axes are ignored
    pub const SWIPE_THRESHOLD: f32 = 20.0;
}
