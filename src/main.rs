//! Sum Dash entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use glam::Vec2;
    use sum_dash::audio::{AudioSynth, SoundEffect};
    use sum_dash::consts::*;
    use sum_dash::input::InputController;
    use sum_dash::sim::{GameEvent, GameSession, Phase, Ruleset, tick};
    use sum_dash::status;

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        audio: AudioSynth,
        input: InputController,
        accumulator: f32,
        last_time: f64,
        last_phase: Phase,
        canvas_size: (f32, f32),
        audio_note_shown: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let session = GameSession::new(seed, Ruleset::default());
            let last_phase = session.phase;
            Self {
                session,
                audio: AudioSynth::new(),
                input: InputController::new(),
                accumulator: 0.0,
                last_time: 0.0,
                last_phase,
                canvas_size: (FIELD_WIDTH, FIELD_HEIGHT),
                audio_note_shown: false,
            }
        }

        /// Map a canvas-space point to logical playfield coordinates
        fn to_field(&self, x: f32, y: f32) -> Vec2 {
            Vec2::new(
                x / self.canvas_size.0 * FIELD_WIDTH,
                y / self.canvas_size.1 * FIELD_HEIGHT,
            )
        }

        /// Token positions for tap selection
        fn token_positions(&self) -> Vec<(usize, Vec2)> {
            self.session
                .entities
                .iter()
                .filter_map(|e| match e.kind {
                    sum_dash::sim::EntityKind::Collectible { index } if !e.consumed => {
                        Some((index, e.pos))
                    }
                    _ => None,
                })
                .collect()
        }

        /// Run simulation ticks for one frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let intent = self.input.intent();

                if intent.toggle_audio {
                    let muted = !self.audio.is_muted();
                    self.audio.set_muted(muted);
                    log::info!("Audio muted: {muted}");
                }
                if intent.restart {
                    // Feedback from the old session fades out and cannot
                    // leak into the new one
                    self.audio.cancel_feedback();
                }

                tick(&mut self.session, &intent, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.clear_one_shots();
            }

            self.handle_phase_transition();
            self.drain_events();
            self.audio.reap_expired();
        }

        fn handle_phase_transition(&mut self) {
            let phase = self.session.phase;
            if phase == self.last_phase {
                return;
            }
            if phase == Phase::Playing {
                self.audio.play_effect(SoundEffect::Click);
                self.audio.set_ambient(true);
            }
            self.last_phase = phase;
        }

        /// Forward queued game events to audio and the announcer line
        fn drain_events(&mut self) {
            let events: Vec<GameEvent> = self.session.events.drain(..).collect();
            for event in events {
                match event {
                    GameEvent::Picked { .. } => self.audio.play_effect(SoundEffect::Pick),
                    GameEvent::Correct { .. } => self.audio.play_effect(SoundEffect::Correct),
                    GameEvent::Wrong { .. } => self.audio.play_effect(SoundEffect::Wrong),
                    GameEvent::ChallengeSpawned { level, target } => {
                        log::info!("Challenge: level {level}, target {target}");
                    }
                    GameEvent::SessionEnded { .. } => {
                        // Ramped toward silence, never cut
                        self.audio.set_ambient(false);
                    }
                }
                if let Some(line) = status::event_line(&self.session, &event) {
                    set_text("status-line", &line);
                }
            }
        }

        /// Push session state into the HUD
        fn update_hud(&mut self) {
            let s = &self.session;
            set_text("hud-score", &format!("{}/{}", s.round.correct_count, s.rules.goal));
            set_text(
                "hud-mistakes",
                &format!("{}/{}", s.round.wrong_count, s.rules.mistake_limit),
            );
            set_text("hud-level", &s.level.to_string());
            set_text("hud-target", &s.challenge.target.to_string());
            set_text(
                "hud-sum",
                &s.round.filled_sum().to_string(),
            );
            set_text("overlay", &status::session_line(s));

            if !self.audio.available() && !self.audio_note_shown {
                set_text("audio-note", status::audio_unavailable_line());
                self.audio_note_shown = true;
            }
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Static failure message when the frame cannot be brought up at all
    fn show_fatal(message: &str) {
        log::error!("{message}");
        set_text("overlay", "Something went wrong - please reload.");
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Sum Dash starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let canvas: HtmlCanvasElement = match document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
        {
            Some(canvas) => canvas,
            None => {
                show_fatal("No canvas element - cannot start");
                return;
            }
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        game.borrow_mut().canvas_size = (
            canvas.client_width() as f32,
            canvas.client_height() as f32,
        );

        log::info!("Game initialized with seed: {seed}");

        setup_input_handlers(&canvas, game.clone());
        request_animation_frame(game);

        log::info!("Sum Dash running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                // Output commonly starts suspended until a gesture
                g.audio.on_user_gesture();
                let round = g.session.round_id;
                g.input.key_down(&event.key(), round);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.key());
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse: press taps/selects, drag steers, release stops
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.on_user_gesture();
                let pos = g.to_field(event.offset_x() as f32, event.offset_y() as f32);
                let tokens = g.token_positions();
                let round = g.session.round_id;
                g.input.pointer_tap(pos, &tokens, round);
            });
            let _ = canvas_clone
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.buttons() == 0 {
                    return;
                }
                let mut g = game.borrow_mut();
                let pos = g.to_field(event.offset_x() as f32, event.offset_y() as f32);
                let player = g.session.player.pos;
                g.input.pointer_drag(player, pos);
            });
            let _ = canvas_clone
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.pointer_release();
            });
            let _ = canvas_clone
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let canvas_for_rect = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    g.audio.on_user_gesture();
                    let rect = canvas_for_rect.get_bounding_client_rect();
                    let pos = g.to_field(
                        touch.client_x() as f32 - rect.left() as f32,
                        touch.client_y() as f32 - rect.top() as f32,
                    );
                    let tokens = g.token_positions();
                    let round = g.session.round_id;
                    g.input.pointer_tap(pos, &tokens, round);
                }
            });
            let _ = canvas_clone
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let canvas_for_rect = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let rect = canvas_for_rect.get_bounding_client_rect();
                    let pos = g.to_field(
                        touch.client_x() as f32 - rect.left() as f32,
                        touch.client_y() as f32 - rect.top() as f32,
                    );
                    let player = g.session.player.pos;
                    g.input.pointer_drag(player, pos);
                }
            });
            let _ = canvas_clone
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().input.pointer_release();
            });
            let _ = canvas_clone
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
        // Self-healing: a frame that cannot run is logged and skipped; the
        // next frame is always scheduled
        match game.try_borrow_mut() {
            Ok(mut g) => {
                let dt = if g.last_time > 0.0 {
                    ((time - g.last_time) / 1000.0) as f32
                } else {
                    SIM_DT
                };
                g.last_time = time;

                g.update(dt);
                g.update_hud();
            }
            Err(_) => {
                log::error!("Frame skipped: game state busy");
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sum Dash (native) starting...");
    log::info!("Native mode is a headless smoke run - play in the browser via trunk serve");

    smoke_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive a seeded session for a few simulated seconds and report the result
#[cfg(not(target_arch = "wasm32"))]
fn smoke_run() {
    use glam::Vec2;
    use sum_dash::consts::SIM_DT;
    use sum_dash::sim::{GameSession, Phase, Ruleset, TickIntent, tick};

    let mut session = GameSession::new(0xD1CE, Ruleset::default());
    tick(
        &mut session,
        &TickIntent { confirm: true, ..Default::default() },
        SIM_DT,
    );
    assert_eq!(session.phase, Phase::Playing);

    // Sweep the field for ten simulated seconds
    for i in 0..1200u32 {
        let angle = i as f32 * 0.01;
        let intent = TickIntent {
            move_dir: Vec2::new(angle.cos(), angle.sin()),
            ..Default::default()
        };
        tick(&mut session, &intent, SIM_DT);
        if session.phase != Phase::Playing {
            break;
        }
    }

    println!(
        "Smoke run done: phase {:?}, level {}, score {}, mistakes {}, events drained {}",
        session.phase,
        session.level,
        session.round.correct_count,
        session.round.wrong_count,
        session.events.len(),
    );
}
