//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod catch;
pub mod collision;
pub mod input;
pub mod maze;
pub mod prompt;
pub mod reveal;
pub mod state;
pub mod tick;

pub use catch::{CatchPhase, CatchStage, Collector, FallingItem, PlayArea};
pub use collision::Rect;
pub use input::{Direction, InputAdapter};
pub use maze::{Cell, Maze, MazeCell, MazeLayout, MoveOutcome};
pub use prompt::PromptStage;
pub use reveal::{RevealCell, RevealGrid, RevealOutcome};
pub use state::{ActiveStage, GameEvent, GameState, PendingTransition, Stage};
pub use tick::{TickInput, tick};
