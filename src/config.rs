//! Game variants and data-driven tuning
//!
//! Both shipped variants run the same engine; they differ only in the data
//! below (phrases, UI language, and whether the heart maze follows the grid).
//! A JSON override may be stored in LocalStorage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::maze::MazeLayout;

/// Errors raised while validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("maze layout has no rows")]
    EmptyLayout,
    #[error("maze row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown maze glyph {glyph:?} at row {row}, col {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
    #[error("maze layout needs exactly one start cell, found {0}")]
    StartCount(usize),
    #[error("maze layout needs exactly one goal cell, found {0}")]
    GoalCount(usize),
    #[error("reveal grid needs at least one prize")]
    NoPrizes,
    #[error("{prizes} prizes do not fit in a {cells}-cell grid")]
    TooManyPrizes { prizes: usize, cells: usize },
    #[error("catch target must be at least 1")]
    ZeroCatchTarget,
    #[error("prompt needs at least one phrase")]
    NoPhrases,
    #[error("reject floor {0} must be in (0, 1]")]
    RejectFloor(f32),
    #[error("accept ceiling {0} must be at least 1")]
    AcceptCeiling(f32),
    #[error("prompt scale steps must not be negative")]
    NegativeScaleStep,
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which flavour of the game to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Prompt, catch, reveal grid, then a closing message (English)
    Classic,
    /// Prompt, catch, reveal grid, then the heart maze (German UI)
    #[default]
    HeartMaze,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::HeartMaze => "maze",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "3" => Some(Variant::Classic),
            "maze" | "heart-maze" | "4" => Some(Variant::HeartMaze),
            _ => None,
        }
    }

    /// Number of stages the player walks through
    pub fn stage_count(&self) -> usize {
        match self {
            Variant::Classic => 3,
            Variant::HeartMaze => 4,
        }
    }
}

/// Escalating "no" button
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Labels shown on the reject button, one per rejection
    pub phrases: Vec<String>,
    /// Rejections past the end of `phrases` before the button is disabled
    pub extra_rejections: u32,
    /// Rejection count at which the buttons start to rescale
    pub scale_from: u32,
    pub shrink_step: f32,
    pub reject_floor: f32,
    pub grow_step: f32,
    pub accept_ceiling: f32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            phrases: HEART_MAZE_PHRASES.iter().map(|s| s.to_string()).collect(),
            extra_rejections: 2,
            scale_from: 2,
            shrink_step: 0.08,
            reject_floor: 0.65,
            grow_step: 0.18,
            accept_ceiling: 1.9,
        }
    }
}

/// Falling item catch game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchConfig {
    pub target: u32,
    pub spawn_interval_ticks: u32,
    pub win_delay_ticks: u32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub fall_scale: f32,
    pub item_size: f32,
    pub collector_width: f32,
    pub collector_height: f32,
}

impl Default for CatchConfig {
    fn default() -> Self {
        Self {
            target: 10,
            spawn_interval_ticks: SPAWN_INTERVAL_TICKS,
            win_delay_ticks: CATCH_WIN_DELAY_TICKS,
            min_speed: ITEM_MIN_SPEED,
            max_speed: ITEM_MAX_SPEED,
            fall_scale: FALL_SCALE,
            item_size: ITEM_SIZE,
            collector_width: COLLECTOR_WIDTH,
            collector_height: COLLECTOR_HEIGHT,
        }
    }
}

/// Hidden prize grid
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub columns: usize,
    pub rows: usize,
    pub prize_count: usize,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 4,
            prize_count: 5,
        }
    }
}

impl RevealConfig {
    pub fn cell_count(&self) -> usize {
        self.columns * self.rows
    }
}

/// Heart maze layout
///
/// Glyphs: `#` wall, `.` open, `S` start, `G` goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeConfig {
    pub layout: Vec<String>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            layout: HEART_MAZE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// User-facing strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiText {
    pub accept_label: String,
    pub reject_label: String,
    pub tile_label: String,
    pub moves_label: String,
    pub final_message: String,
    pub maze_win_message: String,
    pub item_glyph: String,
    pub prize_marker: String,
    pub blank_marker: String,
    pub goal_marker: String,
    pub token_marker: String,
}

impl Default for UiText {
    fn default() -> Self {
        Self {
            accept_label: "Ja 💖".into(),
            reject_label: "Nein".into(),
            tile_label: "Kachel".into(),
            moves_label: "Züge".into(),
            final_message: "Alle Robben gefunden! Alles Liebe zum Valentinstag! 💕".into(),
            maze_win_message: "Geschafft! Das Herz ist am Ziel! 💖".into(),
            item_glyph: "🫛".into(),
            prize_marker: "🦭".into(),
            blank_marker: "💟".into(),
            goal_marker: "🎯".into(),
            token_marker: "❤️".into(),
        }
    }
}

impl UiText {
    fn english() -> Self {
        Self {
            accept_label: "Yes 💖".into(),
            reject_label: "No".into(),
            tile_label: "Tile".into(),
            moves_label: "moves".into(),
            final_message: "You found every seal! Happy Valentine's Day! 💕".into(),
            maze_win_message: "You did it! The heart reached the goal! 💖".into(),
            ..Self::default()
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub variant: Variant,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub catch: CatchConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    /// Present when the maze follows the reveal grid
    #[serde(default)]
    pub maze: Option<MazeConfig>,
    #[serde(default)]
    pub text: UiText,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_variant(Variant::default())
    }
}

impl GameConfig {
    /// Preset configuration for a variant
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self {
                variant,
                prompt: PromptConfig {
                    phrases: CLASSIC_PHRASES.iter().map(|s| s.to_string()).collect(),
                    ..PromptConfig::default()
                },
                catch: CatchConfig::default(),
                reveal: RevealConfig::default(),
                maze: None,
                text: UiText::english(),
            },
            Variant::HeartMaze => Self {
                variant,
                prompt: PromptConfig::default(),
                catch: CatchConfig::default(),
                reveal: RevealConfig::default(),
                maze: Some(MazeConfig::default()),
                text: UiText::default(),
            },
        }
    }

    /// Whether completing the grid leads into the maze
    pub fn maze_follows_reveal(&self) -> bool {
        self.maze.is_some()
    }

    /// Check every precondition the stages rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prompt.phrases.is_empty() {
            return Err(ConfigError::NoPhrases);
        }
        let prompt = &self.prompt;
        if !(prompt.reject_floor > 0.0 && prompt.reject_floor <= 1.0) {
            return Err(ConfigError::RejectFloor(prompt.reject_floor));
        }
        if !(prompt.accept_ceiling >= 1.0) {
            return Err(ConfigError::AcceptCeiling(prompt.accept_ceiling));
        }
        if !(prompt.shrink_step >= 0.0 && prompt.grow_step >= 0.0) {
            return Err(ConfigError::NegativeScaleStep);
        }
        if self.catch.target == 0 {
            return Err(ConfigError::ZeroCatchTarget);
        }
        if self.reveal.prize_count == 0 {
            return Err(ConfigError::NoPrizes);
        }
        let cells = self.reveal.cell_count();
        if self.reveal.prize_count > cells {
            return Err(ConfigError::TooManyPrizes {
                prizes: self.reveal.prize_count,
                cells,
            });
        }
        if let Some(maze) = &self.maze {
            MazeLayout::parse(maze.layout.as_slice())?;
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    ///
    /// The JSON is laid over the preset of its `variant` (HeartMaze when
    /// absent), so anything it leaves out keeps that variant's value.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let overrides: serde_json::Value = serde_json::from_str(json)?;
        let variant = match overrides.get("variant") {
            Some(value) => Variant::deserialize(value)?,
            None => Variant::default(),
        };
        let mut merged = serde_json::to_value(Self::for_variant(variant))?;
        merge_json(&mut merged, overrides);

        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// LocalStorage key for a JSON override
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "be_mine_config";

    /// Load config: `?variant=` query picks the preset, LocalStorage may override it (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let window = web_sys::window();

        let variant = window
            .as_ref()
            .and_then(|w| w.location().search().ok())
            .and_then(|query| {
                query
                    .trim_start_matches('?')
                    .split('&')
                    .filter_map(|pair| pair.strip_prefix("variant="))
                    .find_map(Variant::from_str)
            })
            .unwrap_or_default();

        let storage = window.and_then(|w| w.local_storage().ok()).flatten();
        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded {} config from LocalStorage", config.variant.as_str());
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using {} preset", variant.as_str());
        Self::for_variant(variant)
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

/// Recursively lay `overrides` over `base`. Objects merge key by key, anything else replaces.
fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base.as_object_mut(), overrides) {
        (Some(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge_json(base.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (_, value) => *base = value,
    }
}

const HEART_MAZE_PHRASES: &[&str] = &[
    "Are you sure?",
    "Like, really sure?",
    "Super sure?",
    "100% sure??",
    "Think again... 🤨",
    "Pretty please?",
    "I’ll bring flowers! 🌹",
    "There will be chocolate! 🍫",
    "A playlist is ready! 🎵",
    "We would be cute together!",
    "Okay, now you’re teasing me!",
    "Final final chance! 💕",
];

const CLASSIC_PHRASES: &[&str] = &[
    "Are you sure?",
    "Really sure?",
    "Think again!",
    "Last chance!",
    "Surely not?",
    "You might regret this!",
    "Give it another thought.",
    "Are you absolutely certain?",
    "This could be a mistake!",
    "Have a heart!",
    "Don't be so cold!",
    "You're breaking my heart 💔",
];

const HEART_MAZE_LAYOUT: &[&str] = &[
    "#######",
    "#S...G#",
    "#.#.#.#",
    "#.#...#",
    "#.###.#",
    "#.....#",
    "#######",
];
