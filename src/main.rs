//! Reel Rush entry point
//!
//! On the web this wires the canvas, pointer input, and the display refresh
//! loop to the game driver. Natively it runs a headless autopilot session
//! and logs each round.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PointerEvent};

    use reel_rush::providers::{AuthProvider, FundsProvider, LocalAccount, LocalOracle};
    use reel_rush::renderer::{RenderOptions, RenderState, Renderer};
    use reel_rush::{FrameScheduler, Game, GameNotice, Tuning};

    /// Polls the stand-in oracle answers after
    const ORACLE_LATENCY_POLLS: u32 = 45;

    /// The one refresh callback, re-armed every frame
    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    /// Everything the refresh loop and input handlers share
    struct App {
        game: Game,
        renderer: Renderer,
        render_state: RenderState,
        scheduler: FrameScheduler,
        account: LocalAccount,
        oracle: LocalOracle,
        canvas: HtmlCanvasElement,
        /// Pending refresh callback, cleared while hidden
        raf_handle: Option<i32>,
    }

    impl App {
        fn pixel_size(&self) -> (u32, u32) {
            let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            (
                (self.canvas.client_width() as f64 * dpr) as u32,
                (self.canvas.client_height() as f64 * dpr) as u32,
            )
        }

        fn sync_size(&mut self) {
            let (width, height) = self.pixel_size();
            if width == 0 || height == 0 || (width, height) == self.render_state.size {
                return;
            }
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.render_state.resize(width, height);
            self.renderer.resize(width, height);
        }

        fn press(&mut self) {
            let notices = self.game.input_start(self.account.funds());
            self.handle(&notices);
        }

        fn release(&mut self) {
            self.game.input_end();
        }

        fn frame(&mut self, now_ms: f64) {
            self.sync_size();

            let dt = self.scheduler.on_frame(now_ms);
            if let Some(dt) = dt {
                let notices = self.game.frame(dt, &mut self.oracle, &self.account);
                self.handle(&notices);
            }

            let state = self.game.state();
            let options = RenderOptions {
                insufficient_balance: !state.session.practice_mode
                    && !self.account.funds().covers_fee(),
            };
            let frame = self
                .renderer
                .render(state, self.game.tuning(), dt.unwrap_or(0.0), &options);
            match self.render_state.render(&frame) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (w, h) = self.render_state.size;
                    self.render_state.resize(w, h);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        fn handle(&self, notices: &[GameNotice]) {
            for notice in notices {
                if let GameNotice::RandomRequired = notice {
                    log::info!("Random value requested from the oracle");
                }
            }
        }
    }

    fn js_err(message: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&message.to_string())
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(js_err)?;

        log::info!("Reel Rush starting...");

        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let document = window.document().ok_or_else(|| js_err("no document"))?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| js_err("no canvas"))?
            .dyn_into()?;

        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(js_err)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(js_err)?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(js_err)?;

        let seed = js_sys::Date::now() as u64;
        let tuning = Tuning::default();
        let renderer = Renderer::new(seed, width, height);
        let mut scheduler = FrameScheduler::default();
        scheduler.start();

        // `?wallet=<balance>` plays staked against the stand-in oracle
        let query = window.location().search().unwrap_or_default();
        let account = LocalAccount::from_query(&query);
        if account.can_stake() {
            log::info!("Local wallet with balance {:?}", account.wallet_balance);
        }

        let app = Rc::new(RefCell::new(App {
            game: Game::new(tuning, seed),
            renderer,
            render_state,
            scheduler,
            account,
            oracle: LocalOracle::new(ORACLE_LATENCY_POLLS),
            canvas: canvas.clone(),
            raf_handle: None,
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, app.clone())?;
        let callback = frame_loop(app.clone());
        setup_visibility(&document, app.clone(), callback.clone())?;
        schedule(&app, &callback);

        log::info!("Reel Rush running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                app.borrow_mut().press();
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Any way the pointer goes away counts as letting go
        for name in ["pointerup", "pointercancel", "pointerleave"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().release();
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_visibility(
        document: &web_sys::Document,
        app: Rc<RefCell<App>>,
        callback: FrameCallback,
    ) -> Result<(), JsValue> {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut a = app.borrow_mut();
                a.release();
                a.scheduler.stop();
                if let (Some(window), Some(handle)) = (web_sys::window(), a.raf_handle.take()) {
                    let _ = window.cancel_animation_frame(handle);
                }
                log::info!("Paused (tab hidden)");
            } else {
                let resume = {
                    let mut a = app.borrow_mut();
                    a.scheduler.start();
                    a.raf_handle.is_none()
                };
                if resume {
                    schedule(&app, &callback);
                }
                log::info!("Resumed");
            }
        });
        document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Build the refresh callback once. It re-arms itself while the
    /// scheduler runs.
    fn frame_loop(app: Rc<RefCell<App>>) -> FrameCallback {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let next = callback.clone();
        *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
            {
                let mut a = app.borrow_mut();
                a.raf_handle = None;
                a.frame(time);
            }
            if app.borrow().scheduler.is_running() {
                schedule(&app, &next);
            }
        }));
        callback
    }

    fn schedule(app: &Rc<RefCell<App>>, callback: &FrameCallback) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let handle = callback
            .borrow()
            .as_ref()
            .and_then(|c| window.request_animation_frame(c.as_ref().unchecked_ref()).ok());
        app.borrow_mut().raf_handle = handle;
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use reel_rush::providers::{FundsProvider, LocalAccount, LocalOracle};
    use reel_rush::sim::{Autopilot, Phase};
    use reel_rush::tuning::TuningError;
    use reel_rush::{Game, Tuning};

    /// Simulated refresh interval
    const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Enough for the longest wait plus a reveal timeout
    const MAX_FRAMES_PER_ROUND: u32 = 20_000;

    #[derive(Debug, thiserror::Error)]
    pub enum DemoError {
        #[error("cannot read tuning file {path}: {source}")]
        Io {
            path: String,
            source: std::io::Error,
        },
        #[error(transparent)]
        Tuning(#[from] TuningError),
        #[error("{name} is not a number: {value}")]
        BadNumber { name: &'static str, value: String },
    }

    fn env_number(name: &'static str, default: u64) -> Result<u64, DemoError> {
        match std::env::var(name) {
            Ok(value) => value
                .parse()
                .map_err(|_| DemoError::BadNumber { name, value }),
            Err(_) => Ok(default),
        }
    }

    fn load_tuning() -> Result<Tuning, DemoError> {
        match std::env::var("REEL_RUSH_TUNING") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path).map_err(|source| DemoError::Io {
                    path: path.clone(),
                    source,
                })?;
                log::info!("Loaded tuning from {}", path);
                Ok(Tuning::from_json(&json)?)
            }
            Err(_) => Ok(Tuning::default()),
        }
    }

    pub fn run() -> Result<(), DemoError> {
        let tuning = load_tuning()?;
        let seed = env_number("REEL_RUSH_SEED", 42)?;
        let rounds = env_number("REEL_RUSH_ROUNDS", 5)?;
        let staked = std::env::var_os("REEL_RUSH_STAKED").is_some();

        let account = if staked {
            LocalAccount::funded(1_000_000, 1)
        } else {
            LocalAccount::default()
        };
        let mut oracle = LocalOracle::new(30);
        let pilot = Autopilot::default();
        let mut game = Game::new(tuning, seed);

        log::info!(
            "Headless session: seed {}, {} rounds, {}",
            seed,
            rounds,
            if staked { "staked" } else { "practice" }
        );

        for round in 1..=rounds {
            let mut started = false;
            let mut frames = 0;
            loop {
                game.frame(FRAME_MS, &mut oracle, &account);
                frames += 1;

                let state = game.state();
                if started && state.phase.is_result() && state.can_dismiss() {
                    break;
                }
                if frames >= MAX_FRAMES_PER_ROUND {
                    log::warn!("Round {} did not finish", round);
                    break;
                }

                if pilot.wants_press(state) {
                    let from_idle = state.phase == Phase::Idle;
                    game.input_start(account.funds());
                    game.input_end();
                    if from_idle && game.state().phase == Phase::Idle {
                        let session = &game.state().session;
                        log::warn!(
                            "Cannot cast: balance {} below stake {}",
                            session.balance,
                            session.stake
                        );
                        return Ok(());
                    }
                    started |= from_idle;
                }
                let holding = pilot.holding(game.state(), game.tuning());
                if holding != game.is_holding() {
                    if holding {
                        game.input_start(account.funds());
                    } else {
                        game.input_end();
                    }
                }
            }

            let state = game.state();
            match (&state.phase, &state.last_catch) {
                (Phase::Caught, Some(fish)) => log::info!(
                    "Round {}: {} {} ({} cm), payout {:?}, balance {}",
                    round,
                    fish.rarity.as_str(),
                    fish.name,
                    fish.size,
                    state.last_payout,
                    state.session.balance
                ),
                _ => log::info!(
                    "Round {}: escaped, balance {}",
                    round,
                    state.session.balance
                ),
            }

            // Dismiss the result
            game.input_start(account.funds());
            game.input_end();
        }

        let session = &game.state().session;
        log::info!(
            "Session over: {} catches ({} staked, {} practice), balance {}",
            session.catches.len(),
            session.real_catches().count(),
            session.practice_catches().count(),
            session.balance
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Reel Rush (native) starting...");

    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
