//! Cookie Crunch entry point
//!
//! Native demo: loads a level document (or the bundled first level), then
//! lets a simple bot play it with a seeded RNG, logging every turn.
//!
//! Usage: `cookie-crunch [LEVEL_JSON] [SEED]`, `RUST_LOG=debug` for cascade detail.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use cookie_crunch::consts::NUM_LEVELS;
use cookie_crunch::session::next_level_number;
use cookie_crunch::sim::Level;
use cookie_crunch::{EngineResult, LevelDefinition, Session, SessionPhase, SwapOutcome};

/// `Level_1`: a 9x9 board with the corners knocked out
const LEVEL_1: &str = r#"{
    "tiles": [
        [0, 0, 1, 1, 1, 1, 1, 0, 0],
        [0, 1, 1, 1, 1, 1, 1, 1, 0],
        [1, 1, 1, 1, 1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1, 1, 1, 1, 1],
        [1, 1, 1, 1, 1, 1, 1, 1, 1],
        [0, 1, 1, 1, 1, 1, 1, 1, 0],
        [0, 0, 1, 1, 1, 1, 1, 0, 0]
    ],
    "targetScore": 1000,
    "moves": 15
}"#;

const DEFAULT_SEED: u64 = 12345;

fn main() {
    env_logger::init();
    log::info!("Cookie Crunch (native) starting...");

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> EngineResult<()> {
    let mut args = std::env::args().skip(1);
    let json = match args.next() {
        Some(path) => {
            log::info!("Reading level from {path}");
            std::fs::read_to_string(&path)?
        }
        None => LEVEL_1.to_string(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let definition = LevelDefinition::from_json(&json)?;
    let level = Level::load(&definition)?;
    let mut session = Session::begin(level, Pcg32::seed_from_u64(seed))?;
    log::info!("Game initialized with seed: {}", seed);
    println!("{}", session.level().grid().render());

    while session.phase() == SessionPhase::Playing {
        if session.needs_reshuffle() {
            session.reshuffle()?;
            log::info!("Reshuffled, {} moves left", session.moves_left());
            continue;
        }

        // Lowest swap in board order keeps the demo reproducible
        let Some(swap) = session.level().detect_possible_swaps().into_iter().min() else {
            break;
        };
        match session.play(swap) {
            SwapOutcome::Resolved(report) => {
                log::info!(
                    "Swap {}: {} steps, +{} points (score {}, {} moves left)",
                    report.swap,
                    report.steps.len(),
                    report.points,
                    report.score,
                    report.moves_left
                );
                println!("{}", session.level().grid().render());
            }
            SwapOutcome::Rejected => log::warn!("Swap {swap} was rejected"),
            SwapOutcome::Finished(_) => break,
        }
    }

    match session.phase() {
        SessionPhase::LevelComplete => println!(
            "Level complete with {} points! Next up: {}",
            session.score(),
            LevelDefinition::file_stem(next_level_number(1, NUM_LEVELS))
        ),
        _ => println!(
            "Game over: {} of {} points",
            session.score(),
            session.level().target_score()
        ),
    }
    Ok(())
}
