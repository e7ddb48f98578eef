//! Browser binding
//!
//! `WebSlotMachine` is the context object a page holds: it owns one
//! controller, the frame clock and the pending input. A page can drive it
//! from its own animation loop via `frame`, or call `run` to let this module
//! own the loop, the keyboard bindings and a plain DOM presenter.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::FrameClock;
use crate::config::GameConfig;
use crate::consts::{REEL_COUNT, ROW_COUNT};
use crate::sim::{SlotMachine, SpinEvent, SpinResult, TickInput, tick};
use crate::theme::ThemeKind;

/// Serialize for the JS side; engine types always serialize
fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Failed to serialize: {}", e);
        "null".to_string()
    })
}

/// Route `log` output to the browser console; safe to call more than once
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Logger already initialized");
    }
}

#[wasm_bindgen]
pub struct WebSlotMachine {
    machine: SlotMachine,
    clock: FrameClock,
    input: TickInput,
}

#[wasm_bindgen]
impl WebSlotMachine {
    /// Machine for a built-in theme ("classic", "nfl", "octocat")
    #[wasm_bindgen(constructor)]
    pub fn new(theme: &str) -> WebSlotMachine {
        let kind = ThemeKind::from_str(theme).unwrap_or_else(|| {
            if !theme.is_empty() {
                log::warn!("Unknown theme '{}', using {}", theme, ThemeKind::default().as_str());
            }
            ThemeKind::default()
        });
        Self::with_config(GameConfig::from_preset(kind))
    }

    /// Machine for a JSON `GameConfig`
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(json: &str) -> Result<WebSlotMachine, JsError> {
        let config = GameConfig::from_json(json)?;
        Ok(Self::with_config(config))
    }

    /// Start a spin now
    ///
    /// Resolves with the result JSON once the reels stop; `undefined` if the
    /// spin was rejected.
    pub fn spin(&mut self) -> Option<js_sys::Promise> {
        let ticket = self.machine.spin()?;
        Some(wasm_bindgen_futures::future_to_promise(async move {
            match ticket.await {
                Some(result) => Ok(JsValue::from_str(&to_json(&result))),
                None => Err(JsValue::from_str("spin cancelled")),
            }
        }))
    }

    /// Queue a spin for the next frame
    #[wasm_bindgen(js_name = pressSpin)]
    pub fn press_spin(&mut self) {
        self.input.spin = true;
    }

    #[wasm_bindgen(js_name = paylinesUp)]
    pub fn paylines_up(&mut self) -> u32 {
        self.machine.increase_paylines()
    }

    #[wasm_bindgen(js_name = paylinesDown)]
    pub fn paylines_down(&mut self) -> u32 {
        self.machine.decrease_paylines()
    }

    #[wasm_bindgen(js_name = setBet)]
    pub fn set_bet(&mut self, bet: u32) -> bool {
        self.machine.set_bet(bet as u64)
    }

    #[wasm_bindgen(js_name = setAutoSpin)]
    pub fn set_auto_spin(&mut self, enabled: bool) {
        self.input.auto_spin = enabled;
    }

    /// Advance to `time_ms` (an animation frame timestamp)
    ///
    /// Returns the result JSON on the frame a spin commits.
    pub fn frame(&mut self, time_ms: f64) -> Option<String> {
        self.step(time_ms).map(|result| to_json(&result))
    }

    /// Drop the frame clock so a resumed tab does not jump
    pub fn pause(&mut self) {
        self.clock.reset();
    }

    pub fn credits(&self) -> f64 {
        self.machine.credits() as f64
    }

    pub fn bet(&self) -> f64 {
        self.machine.bet() as f64
    }

    pub fn paylines(&self) -> u32 {
        self.machine.paylines()
    }

    #[wasm_bindgen(js_name = maxPaylines)]
    pub fn max_paylines(&self) -> u32 {
        self.machine.max_paylines()
    }

    #[wasm_bindgen(js_name = freeSpins)]
    pub fn free_spins(&self) -> u32 {
        self.machine.bonus().free_spins_remaining()
    }

    pub fn multiplier(&self) -> u32 {
        self.machine.bonus().multiplier()
    }

    #[wasm_bindgen(js_name = isSpinning)]
    pub fn is_spinning(&self) -> bool {
        self.machine.is_spinning()
    }

    #[wasm_bindgen(js_name = canSpin)]
    pub fn can_spin(&self) -> bool {
        self.machine.can_spin()
    }

    #[wasm_bindgen(js_name = themeName)]
    pub fn theme_name(&self) -> String {
        self.machine.theme().name.clone()
    }

    #[wasm_bindgen(js_name = symbolNames)]
    pub fn symbol_names(&self) -> Vec<String> {
        self.machine.theme().symbols.clone()
    }

    /// Committed grid as symbol indices, row by row from the top
    pub fn grid(&self) -> Vec<u8> {
        let grid = self.machine.grid();
        (0..ROW_COUNT)
            .flat_map(|row| grid.row(row).map(|s| s.0))
            .collect()
    }

    /// Scroll offset of each reel (px)
    #[wasm_bindgen(js_name = reelOffsets)]
    pub fn reel_offsets(&self) -> Vec<f32> {
        self.machine.reel_frames().iter().map(|f| f.offset).collect()
    }

    #[wasm_bindgen(js_name = lastResult)]
    pub fn last_result(&self) -> Option<String> {
        self.machine.last_result().map(to_json)
    }

    /// Pending events as a JSON array
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> String {
        to_json(&self.machine.drain_events())
    }
}

impl WebSlotMachine {
    fn with_config(config: GameConfig) -> Self {
        let seed = js_sys::Date::now() as u64;
        log::info!("Starting {} machine with seed {}", config.theme.name, seed);
        Self {
            machine: SlotMachine::new(config, seed),
            clock: FrameClock::new(),
            input: TickInput::default(),
        }
    }

    fn step(&mut self, time_ms: f64) -> Option<SpinResult> {
        let dt = self.clock.delta(time_ms);
        let result = tick(&mut self.machine, &self.input, dt);

        // Clear one-shot inputs after processing
        self.input.spin = false;
        self.input.paylines_up = false;
        self.input.paylines_down = false;

        result
    }
}

fn set_text(document: &web_sys::Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

/// Write machine state into the page's HUD and reel elements, when present
fn render(document: &web_sys::Document, game: &WebSlotMachine) {
    let machine = &game.machine;
    set_text(document, "credits", &machine.credits().to_string());
    set_text(document, "bet", &machine.bet().to_string());
    set_text(document, "paylines", &machine.paylines().to_string());
    set_text(document, "free-spins", &machine.bonus().free_spins_remaining().to_string());
    set_text(document, "multiplier", &format!("{}x", machine.bonus().multiplier()));

    let theme = machine.theme();
    let grid = machine.grid();
    let frames = machine.reel_frames();
    for reel in 0..REEL_COUNT {
        if let Some(el) = document.get_element_by_id(&format!("reel-{}", reel)) {
            let style = format!("transform: translateY({:.1}px)", frames[reel].offset);
            let _ = el.set_attribute("style", &style);
        }
        for row in 0..ROW_COUNT {
            set_text(
                document,
                &format!("cell-{}-{}", reel, row),
                theme.symbol_name(grid.get(reel, row)),
            );
        }
    }
}

fn present_events(document: &web_sys::Document, events: Vec<SpinEvent>) {
    for event in events {
        match event {
            SpinEvent::SpinStarted { .. } => set_text(document, "message", ""),
            SpinEvent::Win { amount, tier, .. } => {
                set_text(document, "message", &format!("{:?} win: {}", tier, amount));
            }
            SpinEvent::BonusTriggered {
                free_spins,
                multiplier,
            } => {
                set_text(
                    document,
                    "message",
                    &format!("Bonus! {} free spins at {}x", free_spins, multiplier),
                );
            }
            SpinEvent::BonusEnded => log::info!("Bonus round over"),
            SpinEvent::ReelStopped { .. } => {}
        }
    }
}

/// Self-driving page: keyboard bindings, render loop and DOM presenter
///
/// The theme comes from the `?theme=` query parameter.
pub fn run() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Hide loading indicator
    if let Some(loading) = document.get_element_by_id("loading") {
        let _ = loading.set_attribute("class", "hidden");
    }

    let theme = window
        .location()
        .search()
        .ok()
        .and_then(|query| {
            query
                .trim_start_matches('?')
                .split('&')
                .find_map(|pair| pair.strip_prefix("theme=").map(str::to_string))
        })
        .unwrap_or_default();
    let game = Rc::new(RefCell::new(WebSlotMachine::new(&theme)));

    setup_keyboard(&window, game.clone());
    setup_auto_pause(&document, game.clone());
    request_animation_frame(&window, game, document);
    Ok(())
}

fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<WebSlotMachine>>) {
    let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
        let mut g = game.borrow_mut();
        match event.key().as_str() {
            " " | "Enter" => {
                event.prevent_default();
                g.input.spin = true;
            }
            "ArrowUp" => g.input.paylines_up = true,
            "ArrowDown" => g.input.paylines_down = true,
            "a" | "A" => {
                g.input.auto_spin = !g.input.auto_spin;
                log::info!("Auto spin: {}", g.input.auto_spin);
            }
            _ => {}
        }
    });
    let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn setup_auto_pause(document: &web_sys::Document, game: Rc<RefCell<WebSlotMachine>>) {
    let document_clone = document.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
            let mut g = game.borrow_mut();
            g.pause();
            if g.input.auto_spin {
                g.input.auto_spin = false;
                log::info!("Auto spin off (tab hidden)");
            }
        }
    });
    let _ = document
        .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn request_animation_frame(
    window: &web_sys::Window,
    game: Rc<RefCell<WebSlotMachine>>,
    document: web_sys::Document,
) {
    let next_window = window.clone();
    let closure = Closure::once(move |time: f64| {
        game_loop(&next_window, game, document, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn game_loop(
    window: &web_sys::Window,
    game: Rc<RefCell<WebSlotMachine>>,
    document: web_sys::Document,
    time: f64,
) {
    {
        let mut g = game.borrow_mut();
        if let Some(result) = g.step(time) {
            log::debug!(
                "Spin {} settled: {} lines, won {}",
                g.machine.spins_played(),
                result.winning_lines.len(),
                result.total_winnings
            );
        }
        let events = g.machine.drain_events();
        present_events(&document, events);
        render(&document, &g);
    }

    request_animation_frame(window, game, document);
}
