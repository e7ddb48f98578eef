//! Reel Engine entry point
//!
//! On the web this starts the self-driving page. Natively it plays a seeded
//! headless session and reports the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    reel_engine::platform::web::init_logging();
    log::info!("Reel Engine starting...");
    reel_engine::platform::web::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Usage: reel-engine [theme] [seed] [spins]
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use reel_engine::consts::FRAME_MS;
    use reel_engine::sim::{SpinEvent, TickInput, tick};
    use reel_engine::{GameConfig, SlotMachine, ThemeKind};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let kind = match args.next() {
        Some(name) => ThemeKind::from_str(&name).unwrap_or_else(|| {
            log::warn!("Unknown theme '{}', using {}", name, ThemeKind::default().as_str());
            ThemeKind::default()
        }),
        None => ThemeKind::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let spins: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(100);

    log::info!("Reel Engine (native) starting: {} theme, seed {}", kind.as_str(), seed);

    let mut machine = SlotMachine::new(GameConfig::from_preset(kind), seed);
    let input = TickInput {
        auto_spin: true,
        ..Default::default()
    };

    let mut biggest = 0;
    let mut bonus_rounds = 0;
    while machine.spins_played() < spins {
        if !machine.is_spinning() && !machine.can_spin() {
            log::info!("Out of credits");
            break;
        }
        if let Some(result) = tick(&mut machine, &input, FRAME_MS) {
            biggest = biggest.max(result.total_winnings);
        }
        bonus_rounds += machine
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SpinEvent::BonusTriggered { .. }))
            .count();
    }

    println!("{} theme, seed {}", machine.theme().name, seed);
    println!("  spins played:  {}", machine.spins_played());
    println!("  final credits: {}", machine.credits());
    println!("  biggest win:   {}", biggest);
    println!("  bonus rounds:  {}", bonus_rounds);
}
