//! Stage two: catch falling items with a draggable collector
//!
//! Two time-driven processes share the item list: an interval spawner and the
//! per-frame fall/collision step. Both are advanced from `tick` only while the
//! stage is running. Winning drops the spawner timer and stops the frame step,
//! so nothing moves or spawns afterwards.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::input::InputAdapter;
use super::state::GameEvent;
use crate::config::CatchConfig;
use crate::consts::*;

/// Lifecycle of a catch round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatchPhase {
    /// Built but not started
    Idle,
    /// Spawner and frame step active
    Running,
    /// Target reached, everything frozen
    Won,
}

/// Size of the catch surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self {
            width: DEFAULT_AREA_WIDTH,
            height: DEFAULT_AREA_HEIGHT,
        }
    }
}

/// A falling item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: u32,
    /// Horizontal center (fixed at spawn)
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub speed: f32,
}

impl FallingItem {
    pub fn bounds(&self, size: f32) -> Rect {
        Rect::from_top_center(Vec2::new(self.x, self.y), Vec2::splat(size))
    }
}

/// The player's horizontal catcher, resting on the bottom of the area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collector {
    /// Horizontal center
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

impl Collector {
    /// Keep the whole collector inside the area
    pub fn clamp_x(&self, x: f32, area: &PlayArea) -> f32 {
        let half = self.width / 2.0;
        x.min(area.width - half).max(half)
    }

    pub fn bounds(&self, area: &PlayArea) -> Rect {
        let top = area.height - COLLECTOR_BOTTOM_GAP - self.height;
        Rect::from_top_center(Vec2::new(self.x, top), Vec2::new(self.width, self.height))
    }
}

/// Repeating timer counted in simulation ticks
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: u32,
    elapsed: u32,
}

impl IntervalTimer {
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            elapsed: 0,
        }
    }

    /// Advance one tick; true when the interval fires
    pub fn advance(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.period {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

/// Active drag gesture
#[derive(Debug, Clone, Copy)]
struct Drag {
    /// Pointer x minus collector center at grab time
    offset: f32,
}

/// Catch stage state
#[derive(Debug, Clone)]
pub struct CatchStage {
    config: CatchConfig,
    area: PlayArea,
    phase: CatchPhase,
    items: Vec<FallingItem>,
    collected: u32,
    collector: Collector,
    drag: Option<Drag>,
    spawner: Option<IntervalTimer>,
    rng: Pcg32,
    next_id: u32,
    events: Vec<GameEvent>,
}

impl CatchStage {
    pub fn new(config: &CatchConfig, area: PlayArea, seed: u64) -> Self {
        let collector = Collector {
            x: area.width / 2.0,
            width: config.collector_width,
            height: config.collector_height,
        };
        Self {
            config: config.clone(),
            area,
            phase: CatchPhase::Idle,
            items: Vec::new(),
            collected: 0,
            collector,
            drag: None,
            spawner: None,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Clear the field, center the collector and start spawning
    pub fn start(&mut self) {
        self.items.clear();
        self.collected = 0;
        self.drag = None;
        self.move_collector(self.area.width / 2.0);
        self.spawner = Some(IntervalTimer::new(self.config.spawn_interval_ticks));
        self.phase = CatchPhase::Running;
        log::info!("Catch started: target {}", self.config.target);
    }

    /// Advance one tick. Returns true on the tick the target is reached.
    pub fn tick(&mut self) -> bool {
        if self.phase != CatchPhase::Running {
            return false;
        }
        let spawn = self.spawner.as_mut().is_some_and(|t| t.advance());
        if spawn {
            self.spawn_item();
        }
        self.step()
    }

    /// Create one item at a random x above the area
    pub fn spawn_item(&mut self) {
        let size = self.config.item_size;
        let span = (self.area.width - size).max(0.0);
        let x = size / 2.0 + self.rng.random::<f32>() * span;
        let speed = self.config.min_speed
            + self.rng.random::<f32>() * (self.config.max_speed - self.config.min_speed);

        let id = self.next_id;
        self.next_id += 1;
        self.items.push(FallingItem {
            id,
            x,
            y: ITEM_SPAWN_Y,
            speed,
        });
        log::trace!("Spawned item {} at x={:.1} speed={:.2}", id, x, speed);
    }

    /// Frame step: move every item, collect overlaps, discard items that left the area
    fn step(&mut self) -> bool {
        let collector = self.collector.bounds(&self.area);
        let exit_y = self.area.height + ITEM_EXIT_MARGIN;
        let size = self.config.item_size;

        let mut i = 0;
        while i < self.items.len() {
            let item = &mut self.items[i];
            item.y += item.speed * self.config.fall_scale;

            if item.bounds(size).overlaps(&collector) {
                self.items.remove(i);
                self.collected += 1;
                self.events.push(GameEvent::ItemCaught {
                    collected: self.collected,
                });
                log::debug!("Caught {} / {}", self.collected, self.config.target);
                if self.collected >= self.config.target {
                    self.win();
                    return true;
                }
            } else if item.y > exit_y {
                let id = item.id;
                self.items.remove(i);
                self.events.push(GameEvent::ItemMissed { id });
            } else {
                i += 1;
            }
        }
        false
    }

    fn win(&mut self) {
        self.phase = CatchPhase::Won;
        self.spawner = None;
        self.drag = None;
        self.events.push(GameEvent::CatchWon);
        log::info!("Catch won with {} items", self.collected);
    }

    /// Move the collector center, clamped to the area
    pub fn move_collector(&mut self, x: f32) {
        self.collector.x = self.collector.clamp_x(x, &self.area);
    }

    /// New area size: re-clamp the last known collector position
    pub fn resize(&mut self, area: PlayArea) {
        self.area = area;
        self.move_collector(self.collector.x);
    }

    pub fn phase(&self) -> CatchPhase {
        self.phase
    }

    pub fn items(&self) -> &[FallingItem] {
        &self.items
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    pub fn target(&self) -> u32 {
        self.config.target
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    pub fn collector_bounds(&self) -> Rect {
        self.collector.bounds(&self.area)
    }

    pub fn area(&self) -> PlayArea {
        self.area
    }

    pub fn item_size(&self) -> f32 {
        self.config.item_size
    }

    pub fn is_spawner_active(&self) -> bool {
        self.spawner.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn score_text(&self) -> String {
        format!("{} / {}", self.collected, self.config.target)
    }

    pub(crate) fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }
}

impl InputAdapter for CatchStage {
    fn on_pointer_down(&mut self, pos: Vec2) {
        if self.collector_bounds().contains(pos) {
            self.drag = Some(Drag {
                offset: pos.x - self.collector.x,
            });
        }
    }

    fn on_pointer_move(&mut self, pos: Vec2) {
        if let Some(drag) = self.drag {
            self.move_collector(pos.x - drag.offset);
        }
    }

    fn on_pointer_up(&mut self, _pos: Vec2) {
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running(seed: u64) -> CatchStage {
        let mut stage = CatchStage::new(&CatchConfig::default(), PlayArea::default(), seed);
        stage.start();
        stage
    }

    /// Drop an item directly above the collector
    fn drop_on_collector(stage: &mut CatchStage) {
        let top = stage.collector_bounds().min.y;
        let id = 1000 + stage.items.len() as u32;
        stage.items.push(FallingItem {
            id,
            x: stage.collector.x,
            y: top - stage.config.item_size,
            speed: 1.0,
        });
    }

    #[test]
    fn test_start_resets() {
        let stage = running(1);
        assert_eq!(stage.phase(), CatchPhase::Running);
        assert_eq!(stage.collected(), 0);
        assert!(stage.items().is_empty());
        assert_eq!(stage.collector().x, DEFAULT_AREA_WIDTH / 2.0);
        assert_eq!(stage.score_text(), "0 / 10");
    }

    #[test]
    fn test_restart_after_win_resets() {
        let mut stage = running(11);
        stage.move_collector(300.0);
        stage.collected = 9;
        drop_on_collector(&mut stage);
        drop_on_collector(&mut stage);
        assert!(stage.tick());
        assert_eq!(stage.phase(), CatchPhase::Won);
        assert!(!stage.items().is_empty());
        stage.on_pointer_down(stage.collector_bounds().center());

        stage.start();
        assert_eq!(stage.phase(), CatchPhase::Running);
        assert_eq!(stage.collected(), 0);
        assert!(stage.items().is_empty());
        assert_eq!(stage.collector().x, DEFAULT_AREA_WIDTH / 2.0);
        assert!(stage.is_spawner_active());
        assert!(!stage.is_dragging());
        assert_eq!(stage.score_text(), "0 / 10");

        // Spawner restarts from a full period
        for _ in 0..SPAWN_INTERVAL_TICKS - 1 {
            stage.tick();
        }
        assert!(stage.items().is_empty());
        stage.tick();
        assert_eq!(stage.items().len(), 1);
    }

    #[test]
    fn test_idle_does_not_tick() {
        let mut stage = CatchStage::new(&CatchConfig::default(), PlayArea::default(), 1);
        for _ in 0..200 {
            assert!(!stage.tick());
        }
        assert!(stage.items().is_empty());
    }

    #[test]
    fn test_spawner_period() {
        let mut stage = running(2);
        for _ in 0..SPAWN_INTERVAL_TICKS - 1 {
            stage.tick();
        }
        assert!(stage.items().is_empty());
        stage.tick();
        assert_eq!(stage.items().len(), 1);

        let item = &stage.items()[0];
        let half = ITEM_SIZE / 2.0;
        assert!(item.x >= half && item.x <= DEFAULT_AREA_WIDTH - half);
        assert!(item.speed >= ITEM_MIN_SPEED && item.speed <= ITEM_MAX_SPEED);
    }

    #[test]
    fn test_item_falls_by_speed_times_scale() {
        let mut stage = running(3);
        stage.items.push(FallingItem {
            id: 1,
            x: 20.0,
            y: 0.0,
            speed: 1.5,
        });
        stage.move_collector(DEFAULT_AREA_WIDTH);
        stage.tick();
        assert!((stage.items()[0].y - 1.5 * FALL_SCALE).abs() < 1e-4);
    }

    #[test]
    fn test_catch_counts_and_removes() {
        let mut stage = running(4);
        drop_on_collector(&mut stage);
        stage.tick();
        assert_eq!(stage.collected(), 1);
        assert!(stage.items().is_empty());
        assert_eq!(stage.score_text(), "1 / 10");
    }

    #[test]
    fn test_missed_item_discarded_without_score() {
        let mut stage = running(5);
        stage.move_collector(DEFAULT_AREA_WIDTH);
        stage.items.push(FallingItem {
            id: 7,
            x: 20.0,
            y: DEFAULT_AREA_HEIGHT + ITEM_EXIT_MARGIN - 1.0,
            speed: 1.0,
        });
        stage.tick();
        assert!(stage.items().is_empty());
        assert_eq!(stage.collected(), 0);
        assert!(stage.drain_events().any(|e| e == GameEvent::ItemMissed { id: 7 }));
    }

    #[test]
    fn test_win_fires_once_and_freezes() {
        let mut stage = running(6);
        stage.collected = 9;
        drop_on_collector(&mut stage);
        drop_on_collector(&mut stage);
        assert!(stage.tick());
        assert_eq!(stage.collected(), 10);
        assert_eq!(stage.phase(), CatchPhase::Won);
        assert!(!stage.is_spawner_active());

        let frozen: Vec<f32> = stage.items().iter().map(|i| i.y).collect();
        for _ in 0..500 {
            assert!(!stage.tick());
        }
        let after: Vec<f32> = stage.items().iter().map(|i| i.y).collect();
        assert_eq!(frozen, after);
        assert_eq!(stage.collected(), 10);
        let wins = stage
            .drain_events()
            .filter(|e| *e == GameEvent::CatchWon)
            .count();
        assert_eq!(wins, 1);
    }

    #[test]
    fn test_drag_uses_grab_offset() {
        let mut stage = running(7);
        let grab = stage.collector_bounds().center() + Vec2::new(10.0, 0.0);
        stage.on_pointer_down(grab);
        assert!(stage.is_dragging());
        stage.on_pointer_move(Vec2::new(grab.x + 50.0, 0.0));
        assert!((stage.collector().x - (DEFAULT_AREA_WIDTH / 2.0 + 50.0)).abs() < 1e-4);
        stage.on_pointer_up(Vec2::ZERO);
        stage.on_pointer_move(Vec2::new(0.0, 0.0));
        assert!((stage.collector().x - (DEFAULT_AREA_WIDTH / 2.0 + 50.0)).abs() < 1e-4);
    }

    #[test]
    fn test_pointer_down_off_collector_ignored() {
        let mut stage = running(8);
        stage.on_pointer_down(Vec2::new(5.0, 5.0));
        assert!(!stage.is_dragging());
        stage.on_pointer_move(Vec2::new(300.0, 5.0));
        assert_eq!(stage.collector().x, DEFAULT_AREA_WIDTH / 2.0);
    }

    #[test]
    fn test_collector_clamped() {
        let mut stage = running(9);
        stage.move_collector(-500.0);
        assert_eq!(stage.collector().x, COLLECTOR_WIDTH / 2.0);
        stage.move_collector(5000.0);
        assert_eq!(stage.collector().x, DEFAULT_AREA_WIDTH - COLLECTOR_WIDTH / 2.0);
    }

    #[test]
    fn test_resize_reclamps() {
        let mut stage = running(10);
        stage.move_collector(DEFAULT_AREA_WIDTH);
        stage.resize(PlayArea {
            width: 200.0,
            height: 300.0,
        });
        assert_eq!(stage.collector().x, 200.0 - COLLECTOR_WIDTH / 2.0);
        assert_eq!(stage.collected(), 0);
        assert_eq!(stage.phase(), CatchPhase::Running);
    }

    proptest! {
        #[test]
        fn prop_counter_monotonic_items_bounded(
            seed in any::<u64>(),
            moves in proptest::collection::vec(0.0f32..360.0, 1..40),
        ) {
            let mut stage = running(seed);
            let exit_y = DEFAULT_AREA_HEIGHT + ITEM_EXIT_MARGIN;
            let mut last = 0;
            let mut wins = 0;
            for x in moves {
                stage.move_collector(x);
                for _ in 0..30 {
                    if stage.tick() {
                        wins += 1;
                    }
                    prop_assert!(stage.collected() >= last);
                    prop_assert!(stage.collected() <= stage.target());
                    prop_assert!(stage.items().iter().all(|i| i.y <= exit_y));
                    last = stage.collected();
                }
            }
            prop_assert!(wins <= 1);
        }
    }

    #[test]
    fn test_interval_timer() {
        let mut timer = IntervalTimer::new(3);
        assert!(!timer.advance());
        assert!(!timer.advance());
        assert!(timer.advance());
        assert!(!timer.advance());
    }
}
