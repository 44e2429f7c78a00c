//! Be Mine entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};

    use be_mine::consts::*;
    use be_mine::sim::{MazeCell, TickInput, tick};
    use be_mine::{GameConfig, GameEvent, GameState, Stage};

    fn by_id(document: &Document, id: &str) -> Option<Element> {
        document.get_element_by_id(id)
    }

    fn set_style(el: &Element, name: &str, value: &str) {
        if let Some(html) = el.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property(name, value);
        }
    }

    /// Cached DOM handles for every stage
    struct View {
        document: Document,
        levels: Vec<Option<Element>>,
        yes_btn: Option<Element>,
        no_btn: Option<Element>,
        catch_area: Option<Element>,
        basket: Option<Element>,
        catch_score: Option<Element>,
        grid: Option<Element>,
        seal_score: Option<Element>,
        final_message: Option<Element>,
        maze_grid: Option<Element>,
        move_count: Option<Element>,
        maze_status: Option<Element>,
        /// Falling item elements by item id
        items: HashMap<u32, Element>,
        tiles: Vec<Element>,
        maze_cells: Vec<Element>,
    }

    impl View {
        fn new(document: Document) -> Self {
            let levels = Stage::ALL
                .iter()
                .map(|s| by_id(&document, &format!("level{}", s.level())))
                .collect();
            Self {
                levels,
                yes_btn: by_id(&document, "yesBtn"),
                no_btn: by_id(&document, "noBtn"),
                catch_area: by_id(&document, "catchArea"),
                basket: by_id(&document, "basket"),
                catch_score: by_id(&document, "catchScore"),
                grid: by_id(&document, "grid"),
                seal_score: by_id(&document, "sealScore"),
                final_message: by_id(&document, "finalMessage"),
                maze_grid: by_id(&document, "mazeGrid"),
                move_count: by_id(&document, "moveCount"),
                maze_status: by_id(&document, "mazeStatus"),
                items: HashMap::new(),
                tiles: Vec::new(),
                maze_cells: Vec::new(),
                document,
            }
        }

        /// Toggle the `active` class so exactly one level section shows
        fn show_level(&self, stage: Stage) {
            for (i, level) in self.levels.iter().enumerate() {
                if let Some(el) = level {
                    let _ = el.class_list().toggle_with_force("active", i + 1 == stage.level());
                }
            }
        }

        fn set_text(el: &Option<Element>, text: &str) {
            if let Some(el) = el {
                el.set_text_content(Some(text));
            }
        }

        fn sync_prompt(&self, state: &GameState) {
            let Some(prompt) = state.prompt() else {
                return;
            };
            let text = &state.config().text;
            if let Some(no) = &self.no_btn {
                no.set_text_content(Some(prompt.phrase().unwrap_or(&text.reject_label)));
                set_style(no, "transform", &format!("scale({})", prompt.reject_scale()));
                if prompt.is_reject_disabled() {
                    if let Some(btn) = no.dyn_ref::<HtmlButtonElement>() {
                        btn.set_disabled(true);
                    }
                    set_style(no, "opacity", "0.5");
                }
            }
            if let Some(yes) = &self.yes_btn {
                yes.set_text_content(Some(&text.accept_label));
                set_style(yes, "transform", &format!("scale({})", prompt.accept_scale()));
            }
        }

        fn clear_items(&mut self) {
            for (_, el) in self.items.drain() {
                el.remove();
            }
        }

        /// Mirror live items and the collector into the catch area
        fn sync_catch(&mut self, state: &GameState) {
            let Some(catch) = state.catch() else {
                return;
            };
            let Some(area) = &self.catch_area else {
                return;
            };

            self.items.retain(|id, el| {
                let live = catch.items().iter().any(|item| item.id == *id);
                if !live {
                    el.remove();
                }
                live
            });
            for item in catch.items() {
                if !self.items.contains_key(&item.id) {
                    let Ok(el) = self.document.create_element("div") else {
                        continue;
                    };
                    el.set_class_name("pod");
                    el.set_text_content(Some(&state.config().text.item_glyph));
                    let _ = area.append_child(&el);
                    self.items.insert(item.id, el);
                }
                if let Some(el) = self.items.get(&item.id) {
                    set_style(el, "left", &format!("{}px", item.x));
                    set_style(el, "transform", &format!("translate(-50%, {}px)", item.y));
                }
            }

            if let Some(basket) = &self.basket {
                set_style(basket, "left", &format!("{}px", catch.collector().x));
            }
            Self::set_text(&self.catch_score, &catch.score_text());
        }

        fn build_grid(&mut self, state: &GameState) {
            let Some(grid) = state.reveal_grid() else {
                return;
            };
            self.tiles.clear();
            if let Some(grid_el) = &self.grid {
                grid_el.set_inner_html("");
                for cell in grid.cells() {
                    let Ok(tile) = self.document.create_element("button") else {
                        continue;
                    };
                    tile.set_class_name("tile");
                    let label = format!("{} {}", state.config().text.tile_label, cell.index + 1);
                    let _ = tile.set_attribute("aria-label", &label);
                    let _ = tile.set_attribute("data-index", &cell.index.to_string());
                    let _ = grid_el.append_child(&tile);
                    self.tiles.push(tile);
                }
            }
            if let Some(msg) = &self.final_message {
                set_style(msg, "display", "none");
            }
            Self::set_text(&self.seal_score, &grid.score_text());
        }

        fn reveal_tile(&self, state: &GameState, index: usize, prize: bool) {
            let text = &state.config().text;
            if let Some(tile) = self.tiles.get(index) {
                let _ = tile.class_list().add_1("revealed");
                let marker = if prize { &text.prize_marker } else { &text.blank_marker };
                tile.set_text_content(Some(marker));
            }
            if let Some(grid) = state.reveal_grid() {
                Self::set_text(&self.seal_score, &grid.score_text());
            }
        }

        fn show_final_message(&self, state: &GameState) {
            if let (Some(el), Some(message)) = (&self.final_message, state.final_message()) {
                el.set_text_content(Some(message));
                set_style(el, "display", "block");
            }
        }

        fn build_maze(&mut self, state: &GameState) {
            let Some(maze) = state.maze() else {
                return;
            };
            self.maze_cells.clear();
            if let Some(grid_el) = &self.maze_grid {
                grid_el.set_inner_html("");
                set_style(
                    grid_el,
                    "grid-template-columns",
                    &format!("repeat({}, 1fr)", maze.layout().cols()),
                );
                for (_, kind) in maze.layout().iter() {
                    let Ok(cell) = self.document.create_element("div") else {
                        continue;
                    };
                    cell.set_class_name("maze-cell");
                    match kind {
                        MazeCell::Wall => {
                            let _ = cell.class_list().add_1("wall");
                        }
                        MazeCell::Goal => {
                            let _ = cell.class_list().add_1("goal");
                        }
                        MazeCell::Open | MazeCell::Start => {}
                    }
                    let _ = grid_el.append_child(&cell);
                    self.maze_cells.push(cell);
                }
            }
            self.paint_maze(state);
        }

        /// Repaint token, goal marker, move counter and status
        fn paint_maze(&self, state: &GameState) {
            let Some(maze) = state.maze() else {
                return;
            };
            let text = &state.config().text;
            let cols = maze.layout().cols();
            let goal = maze.layout().goal();
            let player = maze.player();
            for (idx, cell) in self.maze_cells.iter().enumerate() {
                let (r, c) = (idx / cols, idx % cols);
                let _ = cell.class_list().remove_1("player");
                let content = if (r, c) == (player.row, player.col) {
                    let _ = cell.class_list().add_1("player");
                    text.token_marker.as_str()
                } else if (r, c) == (goal.row, goal.col) {
                    text.goal_marker.as_str()
                } else {
                    ""
                };
                cell.set_text_content(Some(content));
            }

            Self::set_text(&self.move_count, &maze.moves_text(&text.moves_label));
            if let Some(status) = &self.maze_status {
                match state.maze_status() {
                    Some(message) => {
                        status.set_text_content(Some(message));
                        set_style(status, "display", "block");
                    }
                    None => set_style(status, "display", "none"),
                }
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        view: View,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
    }

    impl Game {
        fn new(state: GameState, document: Document) -> Self {
            Self {
                state,
                view: View::new(document),
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
            }
        }

        /// Feed the real catch-area size to the simulation (skipped while hidden)
        fn measure_catch_area(&mut self) {
            if let Some(area) = &self.view.catch_area {
                let (w, h) = (area.client_width() as f32, area.client_height() as f32);
                if w > 0.0 && h > 0.0 {
                    self.state.resize(w, h);
                }
            }
        }

        /// Client coordinates to the active stage's surface
        fn surface_pos(&self, client_x: i32, client_y: i32) -> Vec2 {
            let surface = match self.state.stage() {
                Stage::Catch => self.view.catch_area.as_ref(),
                Stage::Maze => self.view.maze_grid.as_ref(),
                Stage::Prompt | Stage::RevealGrid => None,
            };
            let (left, top) = surface
                .map(|el| {
                    let rect = el.get_bounding_client_rect();
                    (rect.left() as f32, rect.top() as f32)
                })
                .unwrap_or((0.0, 0.0));
            Vec2::new(client_x as f32 - left, client_y as f32 - top)
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        /// Apply drained events to the DOM, then mirror per-frame state
        fn render(&mut self) {
            for event in self.state.drain_events() {
                match event {
                    GameEvent::StageActivated(stage) => {
                        self.view.show_level(stage);
                        match stage {
                            Stage::Prompt => self.view.sync_prompt(&self.state),
                            Stage::Catch => {
                                self.view.clear_items();
                                self.measure_catch_area();
                            }
                            Stage::RevealGrid => {
                                self.view.clear_items();
                                self.view.build_grid(&self.state);
                            }
                            Stage::Maze => self.view.build_maze(&self.state),
                        }
                    }
                    GameEvent::Rejected { .. } => self.view.sync_prompt(&self.state),
                    GameEvent::CellRevealed { index, prize } => {
                        self.view.reveal_tile(&self.state, index, prize)
                    }
                    GameEvent::Finished => self.view.show_final_message(&self.state),
                    GameEvent::MazeMoved { .. } | GameEvent::MazeWon { .. } | GameEvent::MazeReset => {
                        self.view.paint_maze(&self.state)
                    }
                    GameEvent::CatchWon => log::info!("All items caught"),
                    GameEvent::Accepted
                    | GameEvent::ItemCaught { .. }
                    | GameEvent::ItemMissed { .. }
                    | GameEvent::AllPrizesFound => {}
                }
            }

            if self.state.stage() == Stage::Catch {
                self.view.sync_catch(&self.state);
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Be Mine starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let config = GameConfig::load();
        let seed = js_sys::Date::now() as u64;
        let state = GameState::new(config, seed).expect("config validated on load");

        let game = Rc::new(RefCell::new(Game::new(state, document)));
        game.borrow_mut().render();

        setup_prompt_buttons(game.clone());
        setup_pointer_handlers(game.clone());
        setup_grid_handler(game.clone());
        setup_maze_controls(game.clone());
        setup_keyboard(game.clone());
        setup_resize(game.clone());

        request_animation_frame(game);

        log::info!("Be Mine running!");
    }

    fn listen<E, F>(target: &web_sys::EventTarget, event: &str, handler: F)
    where
        E: wasm_bindgen::convert::FromWasmAbi + 'static,
        F: FnMut(E) + 'static,
    {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_prompt_buttons(game: Rc<RefCell<Game>>) {
        let (yes, no) = {
            let g = game.borrow();
            (g.view.yes_btn.clone(), g.view.no_btn.clone())
        };

        if let Some(btn) = yes {
            let game = game.clone();
            listen(&btn, "click", move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                // Area must be visible before it can be measured
                g.view.show_level(Stage::Catch);
                g.measure_catch_area();
                if !g.state.accept() {
                    let stage = g.state.stage();
                    g.view.show_level(stage);
                }
            });
        }

        if let Some(btn) = no {
            listen(&btn, "click", move |_event: MouseEvent| {
                game.borrow_mut().state.reject();
            });
        }
    }

    fn setup_pointer_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let surfaces = {
            let g = game.borrow();
            [g.view.catch_area.clone(), g.view.maze_grid.clone()]
        };

        for surface in surfaces.into_iter().flatten() {
            {
                let game = game.clone();
                listen(&surface, "mousedown", move |event: MouseEvent| {
                    let mut g = game.borrow_mut();
                    let pos = g.surface_pos(event.client_x(), event.client_y());
                    g.state.pointer_down(pos);
                });
            }
            {
                let game = game.clone();
                listen(&surface, "touchstart", move |event: TouchEvent| {
                    if let Some(touch) = event.touches().get(0) {
                        let mut g = game.borrow_mut();
                        let pos = g.surface_pos(touch.client_x(), touch.client_y());
                        g.state.pointer_down(pos);
                    }
                });
            }
        }

        {
            let game = game.clone();
            listen(&window, "mousemove", move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.surface_pos(event.client_x(), event.client_y());
                g.state.pointer_move(pos);
            });
        }
        {
            let game = game.clone();
            listen(&window, "touchmove", move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    if g.state.catch().is_some_and(|c| c.is_dragging()) && event.cancelable() {
                        event.prevent_default();
                    }
                    let pos = g.surface_pos(touch.client_x(), touch.client_y());
                    g.state.pointer_move(pos);
                }
            });
        }
        {
            let game = game.clone();
            listen(&window, "mouseup", move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.surface_pos(event.client_x(), event.client_y());
                g.state.pointer_up(pos);
            });
        }
        listen(&window, "touchend", move |event: TouchEvent| {
            if let Some(touch) = event.changed_touches().get(0) {
                let mut g = game.borrow_mut();
                let pos = g.surface_pos(touch.client_x(), touch.client_y());
                g.state.pointer_up(pos);
            }
        });
    }

    fn setup_grid_handler(game: Rc<RefCell<Game>>) {
        let grid = game.borrow().view.grid.clone();
        let Some(grid) = grid else {
            return;
        };
        // One delegated listener; tiles are rebuilt on every grid build
        listen(&grid, "click", move |event: MouseEvent| {
            let index = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("[data-index]").ok().flatten())
                .and_then(|el| el.get_attribute("data-index"))
                .and_then(|s| s.parse::<usize>().ok());
            if let Some(index) = index {
                game.borrow_mut().state.reveal(index);
            }
        });
    }

    fn setup_maze_controls(game: Rc<RefCell<Game>>) {
        let document = game.borrow().view.document.clone();
        if let Some(btn) = by_id(&document, "mazeReset") {
            listen(&btn, "click", move |_event: MouseEvent| {
                game.borrow_mut().state.reset_maze();
            });
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        listen(&window, "keydown", move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            let key = event.key();
            if (key == "i" || key == "I") && g.state.stage() != Stage::Maze {
                g.input.autoplay = !g.input.autoplay;
                log::info!("Autoplay: {}", g.input.autoplay);
                return;
            }
            if g.state.stage() == Stage::Maze && key.starts_with("Arrow") {
                event.prevent_default();
            }
            g.state.key(&key);
        });
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        listen(&window, "resize", move |_event: web_sys::Event| {
            game.borrow_mut().measure_catch_area();
        });
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: autoplay one full run and log what happens
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use be_mine::sim::{TickInput, tick};
    use be_mine::{GameConfig, GameEvent, GameState, Variant};

    env_logger::init();

    // Usage: be-mine [classic|maze] [seed]
    let mut args = std::env::args().skip(1);
    let variant = match args.next() {
        Some(arg) => Variant::from_str(&arg).unwrap_or_else(|| {
            log::warn!("Unknown variant {:?}, using {}", arg, Variant::default().as_str());
            Variant::default()
        }),
        None => Variant::default(),
    };
    let seed = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            log::warn!("Invalid seed {:?}, using 2024", arg);
            2024
        }),
        None => 2024,
    };

    log::info!("Be Mine (native) starting: {} variant, seed {}", variant.as_str(), seed);
    log::info!("The playable version runs in the browser - use `trunk serve`");

    let mut state = match GameState::new(GameConfig::for_variant(variant), seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid config: {}", e);
            std::process::exit(1);
        }
    };

    let input = TickInput { autoplay: true };
    let max_ticks = 200_000;
    while state.time_ticks < max_ticks {
        tick(&mut state, &input);
        for event in state.drain_events() {
            match event {
                GameEvent::ItemMissed { .. } | GameEvent::MazeMoved { .. } => log::debug!("{:?}", event),
                _ => log::info!("{:?}", event),
            }
        }
        if state.is_finished() || state.maze().is_some_and(|m| m.is_won()) {
            break;
        }
    }

    if let Some(message) = state.final_message().or(state.maze_status()) {
        println!("{}", message);
    }
    println!("Finished on stage {} after {} ticks", state.stage().as_str(), state.time_ticks);
}
