//! Headless native host
//!
//! Runs a computer-vs-computer match at the fixed tick rate and logs what
//! happens. Usage: `carom [config.json] [--realtime]`

use std::time::{Duration, Instant};

use carom::consts::TICK_RATE;
use carom::session::{InputEvent, KeyToken};
use carom::sim::GameEvent;
use carom::{GameConfig, Session, SimError};

/// Stop after this many rounds if the board isn't cleared first
const MAX_ROUNDS: u32 = 40;
/// Hard cap so a pathological config can't spin forever
const MAX_TICKS: u64 = 200_000;

fn load_config(path: Option<&str>) -> Result<GameConfig, SimError> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            log::info!("Loaded config from {}", path);
            GameConfig::from_json(&json)?
        }
        None => GameConfig::default(),
    };
    Ok(config.computer_vs_computer())
}

fn run() -> Result<(), SimError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let realtime = args.iter().any(|a| a == "--realtime");
    let path = args.iter().find(|a| !a.starts_with("--")).map(String::as_str);

    let config = load_config(path)?;
    log::info!("Game initialized with seed: {}", config.seed);
    let mut session = Session::new(config)?;

    let frame = Duration::from_secs_f64(1.0 / TICK_RATE as f64);
    let mut inputs = vec![InputEvent::Key(KeyToken::Start)];
    let mut ticks = 0u64;

    while session.is_running() {
        let started = Instant::now();
        let outcome = session.step(&inputs);
        inputs.clear();
        ticks += 1;

        for event in &outcome.events {
            match event {
                GameEvent::Captured(c) => {
                    log::info!("{:?} {:?} disc {} pocketed", c.color, c.role, c.disc_id)
                }
                GameEvent::TurnChanged { to, scores, .. } => {
                    let name = &session.config().players[*to].name;
                    log::info!("{}'s turn, scores {:?}", name, scores.per_player);
                }
                _ => {}
            }
        }

        if session.board_cleared() || session.round() >= MAX_ROUNDS || ticks >= MAX_TICKS {
            inputs.push(InputEvent::Key(KeyToken::Quit));
        }

        if realtime {
            if let Some(rest) = frame.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    let snapshot = session.snapshot();
    for (i, player) in session.config().players.iter().enumerate() {
        log::info!("{}: {} coins", player.name, snapshot.scores.get(i));
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).unwrap_or_default()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Carom (native) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
