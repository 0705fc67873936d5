//! Horse Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, TouchEvent};

    use horse_run::audio::AudioManager;
    use horse_run::highscores::{HighScores, ScorePolicy, format_relative};
    use horse_run::particles::ParticleSystem;
    use horse_run::persistence::{LocalStorage, Storage};
    use horse_run::platform::{InputState, Intent, input, now_ms};
    use horse_run::renderer::{RenderState, build_scene};
    use horse_run::settings::Settings;
    use horse_run::sim::{AudioSink, GameState, LoopControl, Sinks, Sound, tick};
    use horse_run::tuning::Tuning;

    /// Optional balance override stored by hand in LocalStorage
    const TUNING_KEY: &str = "horse_run_tuning";

    /// Game instance holding all state
    struct Game {
        state: GameState,
        tuning: Tuning,
        rng: Pcg32,
        input: InputState,
        audio: AudioManager,
        particles: ParticleSystem,
        render_state: Option<RenderState>,
        settings: Settings,
        high_scores: HighScores,
        storage: LocalStorage,
        /// Score waiting for a name: (score, distance)
        pending_entry: Option<(u64, u64)>,
        /// A requestAnimationFrame callback is outstanding
        loop_scheduled: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let storage = LocalStorage::new();
            let settings = Settings::load(&storage);
            let high_scores = HighScores::load(&storage, ScorePolicy::KeepAcrossVersions);
            let tuning = match storage.get(TUNING_KEY) {
                Ok(Some(json)) => Tuning::from_json(&json),
                _ => Tuning::default(),
            };

            Self {
                state: GameState::new(tuning),
                tuning,
                rng: Pcg32::seed_from_u64(seed),
                input: InputState::new(),
                audio: AudioManager::new(&settings),
                particles: ParticleSystem::new(seed ^ 0x9e37_79b9, settings.max_particles()),
                render_state: None,
                settings,
                high_scores,
                storage,
                pending_entry: None,
                loop_scheduled: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Fresh run with a new seed; starts immediately
        fn restart(&mut self) {
            let seed = now_ms() as u64;
            self.state = GameState::new(self.tuning);
            self.rng = Pcg32::seed_from_u64(seed);
            self.particles.clear();
            self.input.push(Intent::Jump);
            log::info!("Game restarted with seed: {}", seed);
        }

        /// One animation frame: simulate, animate effects, draw
        fn frame(&mut self, time: f64) -> LoopControl {
            if self.input.take_restart()
                && self.state.started
                && !self.state.running
                && self.pending_entry.is_none()
            {
                self.restart();
            }

            let was_running = self.state.running;
            let input = self.input.take(self.state.started);
            let control = {
                let mut sinks = Sinks::new(&mut self.audio, &mut self.particles);
                tick(&mut self.state, &input, &mut self.rng, &mut sinks)
            };
            self.particles.update();

            if was_running && !self.state.running {
                self.on_game_over();
            }

            self.track_fps(time);
            self.render();
            self.update_hud();
            control
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Oldest sample sits at the next write position
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (59_000.0 / elapsed).round() as u32;
                }
            }
        }

        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let scene = build_scene(&self.state, self.particles.particles());
            match render_state.render(&scene) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        fn on_game_over(&mut self) {
            let (score, distance) = (self.state.score, self.state.distance);
            if !self.high_scores.qualifies(score) {
                return;
            }

            let has_form = document()
                .and_then(|d| d.get_element_by_id("name-entry"))
                .is_some();
            self.pending_entry = Some((score, distance));
            if !has_form {
                self.submit_score("---");
                return;
            }
            set_visible("name-entry", true);
            if let Some(rank) = self.high_scores.potential_rank(score) {
                set_text("#name-entry .rank", &format!("#{rank}"));
            }
            if let Some(input) = name_input() {
                input.set_value("");
                let _ = input.focus();
            }
        }

        /// Record the pending score under `name`
        fn submit_score(&mut self, name: &str) {
            let Some((score, distance)) = self.pending_entry.take() else {
                return;
            };
            if let Some(rank) = self.high_scores.add_score(name, score, distance, now_ms()) {
                self.audio.play(Sound::HighScore, 1.0);
                log::info!("New high score #{rank}: {score}");
                if let Err(e) = self.high_scores.save(&mut self.storage) {
                    log::warn!("Could not save high scores: {e}");
                }
            }
            set_visible("name-entry", false);
            self.update_leaderboard();
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.audio.set_muted(self.settings.muted);
            log::info!("Muted: {}", self.settings.muted);
            self.save_settings();
        }

        fn cycle_particles(&mut self) {
            self.settings.cycle_particles();
            self.particles.set_max(self.settings.max_particles());
            log::info!("Particle cap: {}", self.settings.max_particles());
            self.save_settings();
        }

        fn save_settings(&mut self) {
            if let Err(e) = self.settings.save(&mut self.storage) {
                log::warn!("Could not save settings: {e}");
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let state = &self.state;
            set_text("#hud-score .hud-value", &state.score.to_string());
            set_text("#hud-distance .hud-value", &state.distance.to_string());
            set_text("#hud-keys .hud-value", &state.keys.to_string());
            set_text("#hud-speed .hud-value", &format!("{:.1}", state.speed));
            set_text("#hud-fps .hud-value", &self.fps.to_string());
            let best = self.high_scores.top_score().unwrap_or(0).max(state.score);
            set_text("#hud-best .hud-value", &best.to_string());

            set_visible("hud-fps", self.settings.show_fps);
            set_visible("idle-badge", self.input.idle_mode());
            set_visible("start-prompt", !state.started);
            set_visible("pause-menu", state.started && state.running && state.paused);

            let over = state.started && !state.running;
            set_visible("game-over", over);
            if over {
                set_text("#final-score", &state.score.to_string());
                set_text("#final-distance", &state.distance.to_string());
            }
        }

        fn update_leaderboard(&self) {
            let Some(list) = document().and_then(|d| d.get_element_by_id("highscore-list")) else {
                return;
            };
            if self.high_scores.is_empty() {
                list.set_inner_html("<li>No scores yet</li>");
                return;
            }
            let now = now_ms();
            let rows: String = self
                .high_scores
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    format!(
                        "<li><span>{}. {}</span><span>{}</span><span>{}m</span><span>{}</span></li>",
                        i + 1,
                        e.name,
                        e.score,
                        e.distance,
                        format_relative(now, e.timestamp)
                    )
                })
                .collect();
            list.set_inner_html(&rows);
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(selector: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.query_selector(selector).ok().flatten()) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    fn name_input() -> Option<HtmlInputElement> {
        document()?
            .get_element_by_id("name-input")?
            .dyn_into::<HtmlInputElement>()
            .ok()
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Horse Run starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        set_visible("loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU (the game still runs headless without it)
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height).await {
                            Ok(rs) => game.borrow_mut().render_state = Some(rs),
                            Err(e) => log::error!("Failed to create device: {e}"),
                        }
                    }
                    Err(e) => log::error!("No graphics adapter: {e}"),
                }
            }
            Err(e) => log::error!("Failed to create surface: {e}"),
        }

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        game.borrow().update_leaderboard();
        set_visible("hud", true);

        // First frame draws the start screen, then the loop idles until input
        kick(&game);

        log::info!("Horse Run running!");
        Ok(())
    }

    /// Buffer an intent and make sure a frame will consume it
    fn send(game: &Rc<RefCell<Game>>, intent: Intent) {
        {
            let mut g = game.borrow_mut();
            g.audio.resume();
            match intent {
                Intent::ToggleMute => g.toggle_mute(),
                Intent::CycleParticles => g.cycle_particles(),
                Intent::ToggleIdle => {
                    g.input.push(intent);
                    log::info!("Idle mode: {}", g.input.idle_mode());
                }
                _ => g.input.push(intent),
            }
        }
        kick(game);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                // Typing a name for the leaderboard
                if game.borrow().pending_entry.is_some() {
                    if event.code() == "Enter" {
                        let name = name_input().map(|i| i.value()).unwrap_or_default();
                        game.borrow_mut().submit_score(&name);
                    }
                    return;
                }
                if let Some(intent) = input::key_down(&event.code(), event.repeat()) {
                    event.prevent_default();
                    send(&game, intent);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(intent) = input::key_up(&event.code()) {
                    send(&game, intent);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: upper screen jumps, lower third ducks while held
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let y = (touch.client_y() as f64 - rect.top()) as f32;
                    send(&game, input::touch_start(y, rect.height() as f32));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                send(&game, Intent::DuckUp);
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };

        let buttons: [(&str, Intent); 2] = [("restart-btn", Intent::Restart), ("resume-btn", Intent::Pause)];
        for (id, intent) in buttons {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    send(&game, intent);
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("save-score-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let name = name_input().map(|i| i.value()).unwrap_or_default();
                game.borrow_mut().submit_score(&name);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Pause only if live; a paused game stays paused
        fn auto_pause(game: &Rc<RefCell<Game>>, reason: &str) {
            let live = {
                let g = game.borrow();
                g.settings.mute_on_blur && g.state.is_live()
            };
            if live {
                log::info!("Auto-paused ({reason})");
                send(game, Intent::Pause);
            }
        }

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    auto_pause(&game, "tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                auto_pause(&game, "window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Schedule a frame unless one is already pending
    fn kick(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.loop_scheduled {
                return;
            }
            g.loop_scheduled = true;
        }
        request_animation_frame(game.clone());
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
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
        let keep_going = {
            let mut g = game.borrow_mut();
            g.loop_scheduled = false;
            let control = g.frame(time);
            // Let the last particles settle after a halt
            control == LoopControl::Continue || !g.particles.is_empty()
        };

        if keep_going {
            kick(&game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

/// Upper bound on a headless run (about ten minutes of play)
#[cfg(not(target_arch = "wasm32"))]
const MAX_HEADLESS_FRAMES: u64 = 60 * 60 * 10;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use horse_run::highscores::{HighScores, ScorePolicy};
    use horse_run::persistence::MemoryStorage;
    use horse_run::sim::{GameState, LoopControl, NullSink, Sinks, TickInput, tick};
    use horse_run::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    env_logger::init();
    log::info!("Horse Run (native) starting...");
    log::info!("Native mode runs a headless autopilot game - use `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let tuning = match args.next().map(std::fs::read_to_string) {
        Some(Ok(json)) => Tuning::from_json(&json),
        Some(Err(e)) => {
            log::warn!("Could not read tuning file: {e}");
            Tuning::default()
        }
        None => Tuning::default(),
    };

    let mut state = GameState::new(tuning);
    let mut rng = Pcg32::seed_from_u64(seed);
    let (mut audio, mut effects) = (NullSink, NullSink);
    let mut sinks = Sinks::new(&mut audio, &mut effects);

    let autoplay = TickInput {
        start: true,
        idle_mode: true,
        ..Default::default()
    };
    while state.frames < MAX_HEADLESS_FRAMES {
        if tick(&mut state, &autoplay, &mut rng, &mut sinks) == LoopControl::Halt {
            break;
        }
    }

    let mut storage = MemoryStorage::new();
    let mut board = HighScores::load(&storage, ScorePolicy::KeepAcrossVersions);
    let rank = board.add_score("CPU", state.score, state.distance, horse_run::platform::now_ms());
    if let Err(e) = board.save(&mut storage) {
        log::warn!("Could not save high scores: {e}");
    }

    println!("seed:     {seed}");
    println!("frames:   {}", state.frames);
    println!("score:    {}", state.score);
    println!("distance: {}", state.distance);
    println!("keys:     {}", state.keys);
    println!(
        "outcome:  {}",
        if state.running { "survived" } else { "crashed" }
    );
    if let Some(rank) = rank {
        println!("rank:     #{rank}");
    }
    if let Some(best) = board.top_score() {
        println!("best:     {best}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
