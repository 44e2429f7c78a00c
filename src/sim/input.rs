//! Input adapters
//!
//! Hosts translate raw pointer/touch/keyboard events into these calls so the
//! stages can be driven without a real event source. Pointer positions are
//! relative to the stage's own play surface.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Per-stage input sink. Every method defaults to ignoring the event.
pub trait InputAdapter {
    fn on_pointer_down(&mut self, _pos: Vec2) {}
    fn on_pointer_move(&mut self, _pos: Vec2) {}
    fn on_pointer_up(&mut self, _pos: Vec2) {}
    fn on_key(&mut self, _key: &str) {}
}

/// Grid direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (row, col) delta
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Arrow keys and WASD, case-insensitive
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "arrowup" | "w" => Some(Direction::Up),
            "arrowdown" | "s" => Some(Direction::Down),
            "arrowleft" | "a" => Some(Direction::Left),
            "arrowright" | "d" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Classify a swipe by its dominant axis.
    ///
    /// Swipes shorter than `threshold` on both axes are ignored; ties go vertical.
    pub fn from_swipe(delta: Vec2, threshold: f32) -> Option<Self> {
        let (abs_x, abs_y) = (delta.x.abs(), delta.y.abs());
        if abs_x < threshold && abs_y < threshold {
            return None;
        }
        if abs_x > abs_y {
            Some(if delta.x > 0.0 { Direction::Right } else { Direction::Left })
        } else {
            Some(if delta.y > 0.0 { Direction::Down } else { Direction::Up })
        }
    }
}
