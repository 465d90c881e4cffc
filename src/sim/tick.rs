//! Simulation step
//!
//! Core game loop that advances the simulation deterministically. Within one
//! step: speed-ups and shape changes earned last step, paddle movement, ball
//! integration, collision resolution, then rule dispatch.

use super::events::{GameEvent, Outbox};
use super::rules::GamePhase;
use super::state::Game;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Most ball substeps per tick (keeps fast balls from tunneling)
const MAX_BALL_SUBSTEPS: u32 = 16;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Paddle direction in [-1, 1]
    pub axis: f32,
    /// Launch the served ball
    pub launch: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start a new game
    pub restart: bool,
    /// Continue to the next level after a clear
    pub advance: bool,
}

/// Advance the game by one timestep, returning the events it produced
pub fn tick(game: &mut Game, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut out = Outbox::new();

    // Handle pause toggle
    if input.pause && matches!(game.phase(), GamePhase::Serving | GamePhase::Playing) {
        game.paused = !game.paused;
        out.emit(GameEvent::Paused(game.paused));
    }
    if game.paused {
        return out.events;
    }

    game.time_ticks += 1;

    game.apply_deferred(&mut out);

    if input.restart {
        game.rules.restart(&mut out);
        game.apply_commands(&mut out);
    } else if input.advance {
        game.rules.advance_level(&mut out);
        game.apply_commands(&mut out);
    }

    game.paddle.update(input.axis, dt);

    match game.phase() {
        GamePhase::Serving => {
            game.serve_timer += dt;
            let auto_serve = game
                .tuning
                .serve_delay_secs
                .is_some_and(|delay| game.serve_timer >= delay);
            if input.launch || auto_serve {
                game.rules.begin_play(&mut out);
            }
        }
        GamePhase::Playing => step_ball(game, dt, &mut out),
        GamePhase::GameOver | GamePhase::LevelComplete => {}
    }

    game.rules.update_timers(dt, &mut out);
    game.apply_commands(&mut out);

    out.events
}

/// Integrate the ball in substeps short enough that it cannot skip a brick
fn step_ball(game: &mut Game, dt: f32, out: &mut Outbox) {
    let ball = game.physics.ball();
    let max_travel = ball.radius * 0.5;
    let travel = ball.vel.length() * dt;
    let substeps = ((travel / max_travel).ceil() as u32).clamp(1, MAX_BALL_SUBSTEPS);
    let step_dt = dt / substeps as f32;

    let mut physics_events = Vec::new();
    for _ in 0..substeps {
        let paddle = game.paddle.rect();
        game.physics
            .update(step_dt, &paddle, &mut game.bricks, &mut physics_events);

        for event in physics_events.drain(..) {
            game.dispatch(event, out);
        }
        game.apply_commands(out);

        if game.phase() != GamePhase::Playing {
            break;
        }
    }
}

/// Fixed-timestep accumulator for variable frame rates
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame's elapsed time; returns how many `SIM_DT` steps to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        // Drop backlog we could not catch up on
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }

    /// Fraction of a step left in the accumulator (for render interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::Collider;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn launch() -> TickInput {
        TickInput {
            launch: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_serve_to_playing() {
        let mut game = Game::new(Tuning::default(), 12345).unwrap();
        assert_eq!(game.phase(), GamePhase::Serving);

        // Tick without launch - ball stays put
        let serve = game.physics().ball().pos;
        tick(&mut game, &TickInput::default(), SIM_DT);
        assert_eq!(game.phase(), GamePhase::Serving);
        assert_eq!(game.physics().ball().pos, serve);

        let events = tick(&mut game, &launch(), SIM_DT);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(events.contains(&GameEvent::StateChanged(GamePhase::Playing)));
        assert!(events.contains(&GameEvent::BallServed));
    }

    #[test]
    fn test_auto_serve_after_delay() {
        let mut game = Game::new(Tuning::default(), 1).unwrap();
        for _ in 0..119 {
            tick(&mut game, &TickInput::default(), SIM_DT);
        }
        assert_eq!(game.phase(), GamePhase::Serving);
        tick(&mut game, &TickInput::default(), SIM_DT);
        tick(&mut game, &TickInput::default(), SIM_DT);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_tick_pause() {
        let mut game = Game::new(Tuning::default(), 12345).unwrap();
        tick(&mut game, &launch(), SIM_DT);
        let pos = game.physics().ball().pos;

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        let events = tick(&mut game, &pause, SIM_DT);
        assert!(game.is_paused());
        assert_eq!(events, vec![GameEvent::Paused(true)]);

        tick(&mut game, &TickInput::default(), SIM_DT);
        assert_eq!(game.physics().ball().pos, pos);

        tick(&mut game, &pause, SIM_DT);
        assert!(!game.is_paused());
        assert_ne!(game.physics().ball().pos, pos);
    }

    #[test]
    fn test_ball_lost_respawns_and_serves() {
        let mut game = Game::new(Tuning::default(), 3).unwrap();
        tick(&mut game, &launch(), SIM_DT);
        game.physics
            .place_ball(Vec2::new(20.0, 598.0), Vec2::new(0.0, 300.0));

        let events = tick(&mut game, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::LivesChanged(2)));
        assert_eq!(game.phase(), GamePhase::Serving);
        assert_eq!(game.physics().ball().pos, game.tuning().serve_point());
        assert!(!game.physics().is_touching(Collider::Floor));
    }

    #[test]
    fn test_game_over_freezes_paddle() {
        let mut tuning = Tuning::default();
        tuning.rules.starting_lives = 1;
        let mut game = Game::new(tuning, 3).unwrap();
        tick(&mut game, &launch(), SIM_DT);
        game.physics
            .place_ball(Vec2::new(20.0, 598.0), Vec2::new(0.0, 300.0));
        let events = tick(&mut game, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::GameOver));
        assert_eq!(game.phase(), GamePhase::GameOver);

        let x = game.paddle().rect().min.x;
        let right = TickInput {
            axis: 1.0,
            ..Default::default()
        };
        tick(&mut game, &right, SIM_DT);
        assert_eq!(game.paddle().rect().min.x, x);

        let restart = TickInput {
            restart: true,
            axis: 1.0,
            ..Default::default()
        };
        tick(&mut game, &restart, SIM_DT);
        assert_eq!(game.phase(), GamePhase::Serving);
        assert!(game.paddle().rect().min.x > x);
    }

    #[test]
    fn test_speed_up_waits_for_next_tick() {
        let mut tuning = Tuning::default();
        tuning.ball.base_speed = 1500.0;
        tuning.rules.hit_milestones = vec![1];
        let mut game = Game::new(tuning, 5).unwrap();
        tick(&mut game, &launch(), SIM_DT);

        // 12.5px per tick: three substeps, the brick is hit in the first
        let brick = game.bricks().get(59).unwrap().rect;
        let start = Vec2::new(brick.center().x, brick.bottom() + 12.0);
        game.place_ball(start, Vec2::new(0.0, -1500.0));
        let events = tick(&mut game, &TickInput::default(), SIM_DT);

        assert!(events.iter().any(|e| matches!(e, GameEvent::BrickDestroyed { .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::SpeedIncreaseApplied(_))));
        let ball = game.physics().ball();
        assert!((ball.vel.length() - 1500.0).abs() < 1e-2);
        // Up one substep, back down two, all at base speed
        assert!((ball.pos.y - (start.y + 1500.0 * SIM_DT / 3.0)).abs() < 1e-2);

        let events = tick(&mut game, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::SpeedIncreaseApplied(1.15)));
        assert!((game.physics().ball().vel.length() - 1725.0).abs() < 1e-1);
    }

    #[test]
    fn test_determinism() {
        // Two games with the same seed must stay identical
        let mut a = Game::new(Tuning::default(), 99999).unwrap();
        let mut b = Game::new(Tuning::default(), 99999).unwrap();

        for i in 0..2000 {
            let input = TickInput {
                axis: ((i as f32) * 0.01).sin(),
                launch: i % 300 == 0,
                ..Default::default()
            };
            let ea = tick(&mut a, &input, SIM_DT);
            let eb = tick(&mut b, &input, SIM_DT);
            assert_eq!(ea, eb);
        }

        assert_eq!(a.time_ticks(), b.time_ticks());
        assert_eq!(a.physics().ball().pos, b.physics().ball().pos);
        assert_eq!(a.state().score, b.state().score);
    }

    #[test]
    fn test_frame_clock() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(SIM_DT * 2.5), 2);
        assert!((clock.alpha() - 0.5).abs() < 1e-3);

        // Huge frame: capped
        assert_eq!(clock.advance(5.0), MAX_SUBSTEPS);
        assert!(clock.alpha() <= 1.0);
        assert_eq!(clock.advance(f32::NAN), 0);
    }
}
