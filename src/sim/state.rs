//! Game state and level sequencing
//!
//! Exactly one stage is active at a time. Each stage's state lives inside the
//! `ActiveStage` variant, so it is created when the stage is activated and
//! dropped when the sequencer moves on. A dropped catch stage takes its
//! spawner timer and frame step with it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catch::{CatchStage, PlayArea};
use super::input::InputAdapter;
use super::maze::{Maze, MazeLayout};
use super::prompt::PromptStage;
use super::reveal::{RevealGrid, RevealOutcome};
use crate::config::{ConfigError, GameConfig};

/// The four stages, in play order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Prompt,
    Catch,
    RevealGrid,
    Maze,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Prompt, Stage::Catch, Stage::RevealGrid, Stage::Maze];

    /// 1-based level number, matching the page's `level{n}` sections
    pub fn level(self) -> usize {
        match self {
            Stage::Prompt => 1,
            Stage::Catch => 2,
            Stage::RevealGrid => 3,
            Stage::Maze => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Prompt => "prompt",
            Stage::Catch => "catch",
            Stage::RevealGrid => "reveal-grid",
            Stage::Maze => "maze",
        }
    }
}

/// Things that happened during a call, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    StageActivated(Stage),
    Rejected { count: u32 },
    Accepted,
    ItemCaught { collected: u32 },
    ItemMissed { id: u32 },
    CatchWon,
    CellRevealed { index: usize, prize: bool },
    AllPrizesFound,
    /// Terminal message shown (no maze follows)
    Finished,
    MazeMoved { moves: u32 },
    MazeWon { moves: u32 },
    MazeReset,
}

/// State of whichever stage is currently active
#[derive(Debug, Clone)]
pub enum ActiveStage {
    Prompt(PromptStage),
    Catch(CatchStage),
    RevealGrid(RevealGrid),
    Maze(Maze),
}

impl ActiveStage {
    pub fn stage(&self) -> Stage {
        match self {
            ActiveStage::Prompt(_) => Stage::Prompt,
            ActiveStage::Catch(_) => Stage::Catch,
            ActiveStage::RevealGrid(_) => Stage::RevealGrid,
            ActiveStage::Maze(_) => Stage::Maze,
        }
    }
}

/// Stage switch waiting on a cosmetic delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    pub to: Stage,
    pub ticks_left: u32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    config: GameConfig,
    rng: Pcg32,
    area: PlayArea,
    maze_layout: Option<MazeLayout>,
    active: ActiveStage,
    pub(crate) pending: Option<PendingTransition>,
    finished: bool,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Validate the config and start at the prompt
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let maze_layout = config
            .maze
            .as_ref()
            .map(|m| MazeLayout::parse(m.layout.as_slice()))
            .transpose()?;

        let active = ActiveStage::Prompt(PromptStage::new(&config.prompt));
        log::info!(
            "New {} game ({} stages) with seed {}",
            config.variant.as_str(),
            config.variant.stage_count(),
            seed
        );
        Ok(Self {
            seed,
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            area: PlayArea::default(),
            maze_layout,
            active,
            pending: None,
            finished: false,
            events: vec![GameEvent::StageActivated(Stage::Prompt)],
            config,
        })
    }

    /// Make `stage` the only active stage, building fresh state for it.
    ///
    /// Returns false (and changes nothing) when the maze is requested but the
    /// config has none.
    pub fn activate(&mut self, stage: Stage) -> bool {
        let next = match stage {
            Stage::Prompt => ActiveStage::Prompt(PromptStage::new(&self.config.prompt)),
            Stage::Catch => {
                let mut catch = CatchStage::new(&self.config.catch, self.area, self.rng.random());
                catch.start();
                ActiveStage::Catch(catch)
            }
            Stage::RevealGrid => {
                ActiveStage::RevealGrid(RevealGrid::new(&self.config.reveal, &mut self.rng))
            }
            Stage::Maze => match &self.maze_layout {
                Some(layout) => ActiveStage::Maze(Maze::new(layout.clone())),
                None => {
                    log::warn!("No maze configured, staying on {}", self.stage().as_str());
                    return false;
                }
            },
        };

        self.pending = None;
        self.finished = false;
        self.active = next;
        self.events.push(GameEvent::StageActivated(stage));
        log::info!("Stage {} active", stage.as_str());
        true
    }

    /// Currently active stage
    pub fn stage(&self) -> Stage {
        self.active.stage()
    }

    pub fn active(&self) -> &ActiveStage {
        &self.active
    }

    /// Accept button. Moves to the catch stage, once.
    pub fn accept(&mut self) -> bool {
        let ActiveStage::Prompt(prompt) = &mut self.active else {
            return false;
        };
        if !prompt.accept() {
            return false;
        }
        self.events.push(GameEvent::Accepted);
        self.activate(Stage::Catch)
    }

    /// Reject button
    pub fn reject(&mut self) -> bool {
        let ActiveStage::Prompt(prompt) = &mut self.active else {
            return false;
        };
        if !prompt.reject() {
            return false;
        }
        self.events.push(GameEvent::Rejected {
            count: prompt.rejections(),
        });
        true
    }

    /// Click on a reveal-grid cell. Ignored once the closing message shows.
    pub fn reveal(&mut self, index: usize) -> RevealOutcome {
        if self.finished {
            return RevealOutcome::Ignored;
        }
        let ActiveStage::RevealGrid(grid) = &mut self.active else {
            return RevealOutcome::Ignored;
        };
        let outcome = grid.reveal(index);
        self.collect_stage_events();

        if outcome == RevealOutcome::Complete {
            if self.config.maze_follows_reveal() {
                self.activate(Stage::Maze);
            } else {
                self.finished = true;
                self.events.push(GameEvent::Finished);
                log::info!("Game finished");
            }
        }
        outcome
    }

    /// Maze reset control
    pub fn reset_maze(&mut self) -> bool {
        let ActiveStage::Maze(maze) = &mut self.active else {
            return false;
        };
        maze.reset();
        self.collect_stage_events();
        true
    }

    /// Input sink of the active stage, if it takes pointer/key input
    fn input(&mut self) -> Option<&mut dyn InputAdapter> {
        match &mut self.active {
            ActiveStage::Catch(catch) => Some(catch),
            ActiveStage::Maze(maze) => Some(maze),
            ActiveStage::Prompt(_) | ActiveStage::RevealGrid(_) => None,
        }
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        if let Some(input) = self.input() {
            input.on_pointer_down(pos);
        }
        self.collect_stage_events();
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        if let Some(input) = self.input() {
            input.on_pointer_move(pos);
        }
        self.collect_stage_events();
    }

    pub fn pointer_up(&mut self, pos: Vec2) {
        if let Some(input) = self.input() {
            input.on_pointer_up(pos);
        }
        self.collect_stage_events();
    }

    pub fn key(&mut self, key: &str) {
        let stage = self.stage();
        match self.input() {
            Some(input) => input.on_key(key),
            None => log::trace!("Key {:?} ignored on {}", key, stage.as_str()),
        }
        self.collect_stage_events();
    }

    /// The catch surface changed size. Game state is untouched apart from the collector clamp.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.area = PlayArea { width, height };
        if let ActiveStage::Catch(catch) = &mut self.active {
            catch.resize(self.area);
        }
    }

    /// Move stage-local events into the shared queue
    pub(crate) fn collect_stage_events(&mut self) {
        match &mut self.active {
            ActiveStage::Prompt(_) => {}
            ActiveStage::Catch(catch) => self.events.extend(catch.drain_events()),
            ActiveStage::RevealGrid(grid) => self.events.extend(grid.drain_events()),
            ActiveStage::Maze(maze) => self.events.extend(maze.drain_events()),
        }
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn active_mut(&mut self) -> &mut ActiveStage {
        &mut self.active
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn area(&self) -> PlayArea {
        self.area
    }

    pub fn pending(&self) -> Option<PendingTransition> {
        self.pending
    }

    /// True once the closing message is showing
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn final_message(&self) -> Option<&str> {
        self.finished.then_some(self.config.text.final_message.as_str())
    }

    pub fn prompt(&self) -> Option<&PromptStage> {
        match &self.active {
            ActiveStage::Prompt(prompt) => Some(prompt),
            _ => None,
        }
    }

    pub fn catch(&self) -> Option<&CatchStage> {
        match &self.active {
            ActiveStage::Catch(catch) => Some(catch),
            _ => None,
        }
    }

    pub fn reveal_grid(&self) -> Option<&RevealGrid> {
        match &self.active {
            ActiveStage::RevealGrid(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn maze(&self) -> Option<&Maze> {
        match &self.active {
            ActiveStage::Maze(maze) => Some(maze),
            _ => None,
        }
    }

    /// Maze status line, once the maze is won
    pub fn maze_status(&self) -> Option<&str> {
        self.maze()
            .filter(|m| m.is_won())
            .map(|_| self.config.text.maze_win_message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    fn game(variant: Variant) -> GameState {
        GameState::new(GameConfig::for_variant(variant), 42).unwrap()
    }

    fn finish_grid(state: &mut GameState) -> RevealOutcome {
        let prizes: Vec<usize> = state.reveal_grid().unwrap().prizes().iter().copied().collect();
        let mut last = RevealOutcome::Ignored;
        for index in prizes {
            last = state.reveal(index);
        }
        last
    }

    #[test]
    fn test_starts_on_prompt() {
        let mut state = game(Variant::HeartMaze);
        assert_eq!(state.stage(), Stage::Prompt);
        assert_eq!(state.drain_events(), vec![GameEvent::StageActivated(Stage::Prompt)]);
    }

    #[test]
    fn test_immediate_accept_starts_catch() {
        let mut state = game(Variant::HeartMaze);
        assert!(state.accept());
        assert_eq!(state.stage(), Stage::Catch);

        let catch = state.catch().unwrap();
        assert_eq!(catch.collector().x, state.area().width / 2.0);
        assert_eq!(catch.score_text(), "0 / 10");

        // Accept is terminal for the prompt
        assert!(!state.accept());
        assert!(!state.reject());
    }

    #[test]
    fn test_accept_after_rejections() {
        let mut state = game(Variant::Classic);
        for _ in 0..3 {
            assert!(state.reject());
        }
        assert_eq!(state.prompt().unwrap().rejections(), 3);
        assert!(state.accept());
        assert_eq!(state.stage(), Stage::Catch);
    }

    #[test]
    fn test_accept_with_disabled_reject() {
        let mut state = game(Variant::HeartMaze);
        while state.reject() {}
        assert!(state.prompt().unwrap().is_reject_disabled());
        assert!(state.accept());
        assert_eq!(state.stage(), Stage::Catch);
    }

    #[test]
    fn test_grid_leads_to_maze() {
        let mut state = game(Variant::HeartMaze);
        state.activate(Stage::RevealGrid);
        assert_eq!(finish_grid(&mut state), RevealOutcome::Complete);
        assert_eq!(state.stage(), Stage::Maze);
        assert!(!state.is_finished());
        assert_eq!(state.maze().unwrap().moves(), 0);
    }

    #[test]
    fn test_grid_finishes_classic() {
        let mut state = game(Variant::Classic);
        state.activate(Stage::RevealGrid);
        finish_grid(&mut state);
        assert_eq!(state.stage(), Stage::RevealGrid);
        assert!(state.is_finished());
        assert_eq!(state.final_message(), Some(state.config().text.final_message.as_str()));
        assert_eq!(state.reveal_grid().unwrap().score_text(), "5 / 5");
        assert!(state.drain_events().contains(&GameEvent::Finished));
    }

    #[test]
    fn test_finished_grid_absorbs_clicks() {
        let mut state = game(Variant::Classic);
        state.activate(Stage::RevealGrid);
        finish_grid(&mut state);
        state.drain_events();

        let covered: Vec<usize> = state
            .reveal_grid()
            .unwrap()
            .cells()
            .iter()
            .filter(|c| !c.revealed)
            .map(|c| c.index)
            .collect();
        assert!(!covered.is_empty());
        for index in covered {
            assert_eq!(state.reveal(index), RevealOutcome::Ignored);
        }
        let grid = state.reveal_grid().unwrap();
        assert!(grid.cells().iter().filter(|c| c.revealed).all(|c| c.is_prize));
        assert_eq!(grid.found(), 5);
        assert!(state.is_finished());
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_classic_has_no_maze() {
        let mut state = game(Variant::Classic);
        assert!(!state.activate(Stage::Maze));
        assert_eq!(state.stage(), Stage::Prompt);
    }

    #[test]
    fn test_input_only_reaches_active_stage() {
        let mut state = game(Variant::HeartMaze);
        state.activate(Stage::Maze);
        state.key("ArrowDown");
        assert_eq!(state.maze().unwrap().moves(), 1);

        state.activate(Stage::RevealGrid);
        state.key("ArrowDown");
        state.pointer_down(Vec2::ZERO);
        assert_eq!(state.reveal_grid().unwrap().found(), 0);

        state.activate(Stage::Maze);
        assert_eq!(state.maze().unwrap().moves(), 0);
    }

    #[test]
    fn test_reset_maze() {
        let mut state = game(Variant::HeartMaze);
        state.activate(Stage::Maze);
        state.key("d");
        state.key("d");
        assert!(state.reset_maze());
        let maze = state.maze().unwrap();
        assert_eq!(maze.moves(), 0);
        assert_eq!(maze.player(), maze.layout().start());
        assert!(state.drain_events().contains(&GameEvent::MazeReset));
    }

    #[test]
    fn test_maze_status_after_win() {
        let mut state = game(Variant::HeartMaze);
        state.activate(Stage::Maze);
        assert_eq!(state.maze_status(), None);
        for _ in 0..4 {
            state.key("ArrowRight");
        }
        assert_eq!(state.maze_status(), Some("Geschafft! Das Herz ist am Ziel! 💖"));
    }

    #[test]
    fn test_resize_outside_catch_is_remembered() {
        let mut state = game(Variant::HeartMaze);
        state.resize(200.0, 300.0);
        state.accept();
        assert_eq!(state.catch().unwrap().collector().x, 100.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::default();
        config.reveal.prize_count = 40;
        assert!(GameState::new(config, 1).is_err());
    }
}
