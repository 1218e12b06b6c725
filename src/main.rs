//! Heartfall entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, MouseEvent, TouchEvent};

    use heartfall::persistence::LocalStore;
    use heartfall::platform::NotificationSink;
    use heartfall::platform::input::{PointerTracker, client_to_field_x};
    use heartfall::renderer::CanvasRenderer;
    use heartfall::sim::{GamePhase, PowerUpKind};
    use heartfall::{GameLoop, LoopControl, Tuning};

    /// Shows the latest message in the `#notification` element
    struct DomNotifier {
        element: Option<Element>,
    }

    impl NotificationSink for DomNotifier {
        fn notify(&mut self, message: &str) {
            log::info!("{}", message);
            if let Some(el) = &self.element {
                el.set_text_content(Some(message));
            }
        }
    }

    /// Game wrapper for browser
    struct Game {
        game: GameLoop,
        renderer: CanvasRenderer,
        notifier: DomNotifier,
        store: LocalStore,
        canvas: HtmlCanvasElement,
        /// Mouse button / finger steering
        pointer: PointerTracker,
        /// A frame callback is pending
        scheduled: bool,
    }

    impl Game {
        fn field_x(&self, client_x: f32) -> f32 {
            let rect = self.canvas.get_bounding_client_rect();
            client_to_field_x(
                client_x,
                rect.left() as f32,
                rect.width() as f32,
                self.game.state().tuning.field_width,
            )
        }

        fn press(&mut self, client_x: f32) {
            let x = self.field_x(client_x);
            self.pointer.press(x);
        }

        fn drag(&mut self, client_x: f32, held: bool) {
            let x = self.field_x(client_x);
            self.pointer.drag(x, held);
        }

        /// Request a pause toggle if the session is in `phase`
        fn toggle_pause_from(&mut self, phase: GamePhase) {
            if self.game.state().phase == phase {
                self.game.input_mut().pause = true;
            }
        }

        fn frame(&mut self, time: f64) -> LoopControl {
            let state = self.game.state();
            let vx = self.pointer.velocity(&state.player, state.tuning.follow_gain);
            if vx.is_some() {
                self.game.input_mut().player_vx = vx;
            }
            let control =
                self.game
                    .frame(time, &mut self.renderer, &mut self.notifier, &mut self.store);
            set_hidden("pause-screen", self.game.state().phase != GamePhase::Paused);
            control
        }

        fn start(&mut self) {
            self.game.restart();
            self.pointer = PointerTracker::default();
            set_hidden("game-over", true);
            log::info!("Game started");
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        let el = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id));
        if let Some(el) = el {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    /// Tuning overrides from `<script id="tuning" type="application/json">`
    fn load_tuning(document: &Document) -> Tuning {
        let Some(json) = document
            .get_element_by_id("tuning")
            .and_then(|el| el.text_content())
        else {
            return Tuning::default();
        };
        match Tuning::from_json(&json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Ignoring tuning overrides: {}", e);
                Tuning::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Heartfall starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No canvas element");
            return;
        };

        let tuning = load_tuning(&document);

        // Backing store matches the field at device resolution
        let dpr = window.device_pixel_ratio();
        canvas.set_width((tuning.field_width as f64 * dpr) as u32);
        canvas.set_height((tuning.field_height as f64 * dpr) as u32);

        let renderer = match CanvasRenderer::new(canvas.clone()) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Canvas unavailable: {}", e);
                return;
            }
        };

        let seed = js_sys::Date::now() as u64;
        let mut game = match GameLoop::new(tuning, seed) {
            Ok(g) => g,
            Err(e) => {
                log::error!("Invalid tuning: {}", e);
                return;
            }
        };

        let store = LocalStore::open();
        let mut notifier = DomNotifier {
            element: document.get_element_by_id("notification"),
        };
        game.load_high_score(&store, &mut notifier);

        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            game,
            renderer,
            notifier,
            store,
            canvas: canvas.clone(),
            pointer: PointerTracker::default(),
            scheduled: false,
        }));

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_power_up_buttons(game.clone());
        setup_pause_buttons(game.clone());
        setup_auto_pause(game.clone());

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        // Draw the start screen; the loop runs until game over
        schedule(game);

        log::info!("Heartfall running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move - steer only while a button is held
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .drag(event.client_x() as f32, event.buttons() > 0);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - start from the title screen, then grab the player
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let should_start = game.borrow().game.state().phase == GamePhase::NotStarted;
                if should_start {
                    game.borrow_mut().start();
                    schedule(game.clone());
                }
                let mut g = game.borrow_mut();
                if g.game.state().phase == GamePhase::Running {
                    g.press(event.client_x() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut().drag(touch.client_x() as f32, true);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let should_start = game.borrow().game.state().phase == GamePhase::NotStarted;
                if should_start {
                    game.borrow_mut().start();
                    schedule(game.clone());
                }
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut().press(touch.client_x() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Button up, finger lifted or pointer gone - stop steering
        for event_name in ["mouseup", "mouseleave", "touchend", "touchcancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().pointer.release();
            });
            let _ = canvas
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "Escape" | "p" | "P" => g.game.input_mut().pause = true,
                    "1" => g.game.input_mut().activate = Some(PowerUpKind::SlowTime),
                    "2" => g.game.input_mut().activate = Some(PowerUpKind::Magnet),
                    "3" => g.game.input_mut().activate = Some(PowerUpKind::DoublePoints),
                    "a" | "A" => {
                        let input = g.game.input_mut();
                        input.autopilot = !input.autopilot;
                        log::info!("Autopilot: {}", input.autopilot);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn schedule(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.scheduled {
                return;
            }
            g.scheduled = true;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let control = {
            let mut g = game.borrow_mut();
            g.scheduled = false;
            let control = g.frame(time);
            if g.game.state().phase == GamePhase::NotStarted {
                // Title screen is static; input starts the loop again
                return;
            }
            control
        };

        match control {
            LoopControl::Continue => schedule(game),
            LoopControl::Stop => set_hidden("game-over", false),
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().start();
                schedule(game.clone());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// `#pause-btn` pauses a running game, `#resume-btn` resumes it
    fn setup_pause_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for (id, from) in [
            ("pause-btn", GamePhase::Running),
            ("resume-btn", GamePhase::Paused),
        ] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().toggle_pause_from(from);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// `#power-<kind>` buttons activate a power-up directly
    fn setup_power_up_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for kind in PowerUpKind::ALL {
            let Some(btn) = document.get_element_by_id(&format!("power-{}", kind.as_str())) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().game.input_mut().activate = Some(kind);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Pause when the tab is hidden or the window loses focus
    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let pause_if_running = {
            let game = game.clone();
            move || {
                let mut g = game.borrow_mut();
                if g.game.state().phase == GamePhase::Running {
                    g.game.input_mut().pause = true;
                    log::info!("Auto-paused");
                }
            }
        };

        // Visibility change
        {
            let pause = pause_if_running.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                    pause();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                pause_if_running();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Headless demo: the autopilot plays one session and the result is logged
#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use heartfall::consts::FRAME_MS;
    use heartfall::persistence::MemoryStore;
    use heartfall::platform::LogNotifier;
    use heartfall::renderer::TextRenderer;
    use heartfall::{GameLoop, LoopControl, Tuning};

    /// Give up after five minutes of game time
    const MAX_FRAMES: u64 = 5 * 60 * 60;

    env_logger::init();
    log::info!("Heartfall (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) => s.parse::<u64>()?,
        None => 42,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };

    let mut game = GameLoop::new(tuning, seed)?;
    let mut renderer = TextRenderer::new(40, 30);
    let mut notifier = LogNotifier;
    let mut store = MemoryStore::new();

    game.restart();
    game.input_mut().autopilot = true;

    let mut frames = 0;
    while frames < MAX_FRAMES {
        let now = frames as f64 * FRAME_MS as f64;
        frames += 1;
        if game.frame(now, &mut renderer, &mut notifier, &mut store) == LoopControl::Stop {
            break;
        }
    }

    println!("{}", renderer.last_frame());
    let snapshot = game.state().snapshot();
    log::info!(
        "Finished after {} frames: score {}, lives {}",
        frames,
        snapshot.score,
        snapshot.lives
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
