//! Brickfall headless runner
//!
//! Plays a session with a simple autopilot and logs what happens. Usage:
//! `brickfall [tuning.json] [seed]`

use std::path::Path;
use std::process::ExitCode;

use brickfall::sim::{FrameClock, GameEvent, GamePhase, TickInput, tick};
use brickfall::{Game, Tuning, consts::SIM_DT};

/// Simulated display refresh rate
const FRAME_DT: f32 = 1.0 / 60.0;
/// Stop after this much simulated time
const MAX_SECONDS: f32 = 300.0;
/// Levels to play before stopping
const MAX_LEVELS: u32 = 3;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Brickfall (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match Tuning::load(Path::new(&path)) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{e}");
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            eprintln!("error: invalid seed: {e}");
            return ExitCode::FAILURE;
        }
        None => 42,
    };

    let mut game = match Game::new(tuning, seed) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut clock = FrameClock::new();
    let mut bricks_destroyed = 0u32;
    let mut speed_ups = 0u32;
    let total_frames = (MAX_SECONDS / FRAME_DT) as u32;

    'frames: for _ in 0..total_frames {
        for _ in 0..clock.advance(FRAME_DT) {
            let mut input = autopilot(&game);
            if game.phase() == GamePhase::LevelComplete {
                if game.state().level >= MAX_LEVELS {
                    break 'frames;
                }
                input.advance = true;
            }

            for event in tick(&mut game, &input, SIM_DT) {
                match event {
                    GameEvent::BrickDestroyed { color, .. } => {
                        bricks_destroyed += 1;
                        log::debug!("{} brick destroyed", color.as_str());
                    }
                    GameEvent::SpeedIncreaseApplied(factor) => {
                        speed_ups += 1;
                        log::info!("Speed x{factor}");
                    }
                    GameEvent::InvariantViolated(v) => log::warn!("{v}"),
                    GameEvent::LivesChanged(lives) => log::info!("Lives: {lives}"),
                    GameEvent::LevelComplete => log::info!("Level complete"),
                    GameEvent::PaddleShrunk => log::info!("Paddle shrunk"),
                    _ => {}
                }
            }

            if game.phase() == GamePhase::GameOver {
                break 'frames;
            }
        }
    }

    let state = game.state();
    println!(
        "seed {seed}: {:?} on level {} after {:.1}s",
        state.phase,
        state.level,
        game.time_ticks() as f32 * SIM_DT
    );
    println!(
        "score {}, lives {}, bricks {bricks_destroyed}, speed-ups {speed_ups}",
        state.score, state.lives
    );
    ExitCode::SUCCESS
}

/// Track the ball with the paddle center and launch as soon as possible
fn autopilot(game: &Game) -> TickInput {
    let ball = game.physics().ball();
    let paddle = game.paddle().rect();
    let half = paddle.size.x / 2.0;
    TickInput {
        axis: ((ball.pos.x - paddle.center().x) / half).clamp(-1.0, 1.0),
        launch: game.phase() == GamePhase::Serving,
        ..Default::default()
    }
}
