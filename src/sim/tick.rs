//! Fixed timestep simulation tick
//!
//! Advances the active stage by one frame. Pointer and key input are applied
//! directly through `GameState` as they arrive; the tick only drives time.

use super::catch::{CatchPhase, CatchStage};
use super::state::{ActiveStage, GameState, PendingTransition, Stage};

/// Collector speed while autoplaying (pixels per tick)
const AUTOPLAY_COLLECTOR_SPEED: f32 = 8.0;
/// Ticks between autoplay grid clicks and maze steps
const AUTOPLAY_ACTION_TICKS: u64 = 12;

/// Per-tick commands
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Demo mode - the game plays itself
    pub autoplay: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    // Delayed stage switch (catch win -> reveal grid)
    if let Some(pending) = state.pending.as_mut() {
        pending.ticks_left = pending.ticks_left.saturating_sub(1);
        if pending.ticks_left == 0 {
            let to = pending.to;
            state.activate(to);
        }
        return;
    }

    if input.autoplay {
        autoplay(state);
    }

    let win_delay = state.config().catch.win_delay_ticks;
    if let ActiveStage::Catch(catch) = state.active_mut() {
        if catch.tick() {
            state.pending = Some(PendingTransition {
                to: Stage::RevealGrid,
                ticks_left: win_delay.max(1),
            });
        }
    }
    state.collect_stage_events();
}

/// Play the active stage for one tick
fn autoplay(state: &mut GameState) {
    let act = state.time_ticks % AUTOPLAY_ACTION_TICKS == 0;
    match state.stage() {
        Stage::Prompt => {
            state.accept();
        }
        Stage::Catch => {
            if let ActiveStage::Catch(catch) = state.active_mut() {
                steer_collector(catch);
            }
        }
        Stage::RevealGrid if act && !state.is_finished() => {
            let next = state
                .reveal_grid()
                .and_then(|grid| grid.cells().iter().find(|c| !c.revealed))
                .map(|c| c.index);
            if let Some(index) = next {
                state.reveal(index);
            }
        }
        Stage::Maze if act => {
            let next = state
                .maze()
                .filter(|m| !m.is_won())
                .and_then(|m| m.solve())
                .and_then(|path| path.first().copied());
            if let (Some(direction), ActiveStage::Maze(maze)) = (next, state.active_mut()) {
                maze.step(direction);
            }
        }
        _ => {}
    }
}

/// Slide the collector under the lowest item that can still be caught
fn steer_collector(catch: &mut CatchStage) {
    if catch.phase() != CatchPhase::Running {
        return;
    }
    let top = catch.collector_bounds().min.y;
    let size = catch.item_size();
    let target = catch
        .items()
        .iter()
        .filter(|item| item.y <= top + size)
        .max_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
        .map(|item| item.x);

    if let Some(x) = target {
        let current = catch.collector().x;
        let delta = (x - current).clamp(-AUTOPLAY_COLLECTOR_SPEED, AUTOPLAY_COLLECTOR_SPEED);
        catch.move_collector(current + delta);
    }
}
