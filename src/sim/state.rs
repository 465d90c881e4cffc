//! The complete simulation: every component plus the glue between them
//!
//! [`Game`] owns the physics engine, paddle, brick field and rules engine.
//! Components never reach into each other; `Game` forwards physics events to
//! the rules engine and applies the commands it answers with.

use glam::Vec2;

use super::bricks::{BrickField, GridLayout};
use super::events::{GameEvent, Outbox, PhysicsEvent, RuleCommand};
use super::paddle::PaddleController;
use super::physics::PhysicsEngine;
use super::rules::{GamePhase, GameState, RulesEngine};
use crate::tuning::{ConfigError, Tuning};

/// One play session
#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) tuning: Tuning,
    pub(crate) seed: u64,
    pub(crate) layout: GridLayout,
    pub(crate) physics: PhysicsEngine,
    pub(crate) paddle: PaddleController,
    pub(crate) bricks: BrickField,
    pub(crate) rules: RulesEngine,
    /// Speed-ups and shape changes held until the start of the next step
    pub(crate) deferred: Vec<RuleCommand>,
    /// Seconds spent in the current serve
    pub(crate) serve_timer: f32,
    pub(crate) paused: bool,
    /// Simulation tick counter
    pub(crate) time_ticks: u64,
}

impl Game {
    /// Validate the tuning and set up level 1 with the ball waiting to serve
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, ConfigError> {
        tuning.validate()?;

        let layout = GridLayout::centered(&tuning.grid, tuning.arena.width);
        let bricks = BrickField::instantiate(&layout, &tuning.rules.points);
        let physics = PhysicsEngine::new(
            tuning.ball.clone(),
            tuning.arena.clone(),
            tuning.serve_point(),
            seed,
        );
        let paddle = PaddleController::new(tuning.paddle.clone(), tuning.arena.width);
        let rules = RulesEngine::new(tuning.rules.clone());

        log::info!(
            "New game: seed {seed}, {} bricks, {} lives",
            bricks.remaining(),
            rules.state().lives
        );

        Ok(Self {
            tuning,
            seed,
            layout,
            physics,
            paddle,
            bricks,
            rules,
            deferred: Vec::new(),
            serve_timer: 0.0,
            paused: false,
            time_ticks: 0,
        })
    }

    /// Restart from scratch (any phase)
    pub fn restart(&mut self) -> Vec<GameEvent> {
        let mut out = Outbox::new();
        self.rules.restart(&mut out);
        self.apply_commands(&mut out);
        out.events
    }

    /// Move on after a cleared level (ignored in other phases)
    pub fn advance_level(&mut self) -> Vec<GameEvent> {
        let mut out = Outbox::new();
        self.rules.advance_level(&mut out);
        self.apply_commands(&mut out);
        out.events
    }

    /// Put the ball somewhere specific (scripted setups and replays)
    pub fn place_ball(&mut self, pos: Vec2, vel: Vec2) {
        self.physics.place_ball(pos, vel);
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn physics(&self) -> &PhysicsEngine {
        &self.physics
    }

    pub fn paddle(&self) -> &PaddleController {
        &self.paddle
    }

    pub fn bricks(&self) -> &BrickField {
        &self.bricks
    }

    pub fn rules(&self) -> &RulesEngine {
        &self.rules
    }

    /// Score, lives, level and phase
    pub fn state(&self) -> &GameState {
        self.rules.state()
    }

    pub fn phase(&self) -> GamePhase {
        self.rules.phase()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Forward one physics event to presentation and the rules engine
    pub(crate) fn dispatch(&mut self, event: PhysicsEvent, out: &mut Outbox) {
        match event {
            PhysicsEvent::WallHit(_) => out.emit(GameEvent::WallHit),
            PhysicsEvent::CeilingHit => {
                out.emit(GameEvent::CeilingHit);
                self.rules.on_ceiling_hit(out);
            }
            PhysicsEvent::PaddleHit { .. } => out.emit(GameEvent::PaddleHit),
            PhysicsEvent::BrickHit {
                color,
                position,
                cleared,
                ..
            } => {
                out.emit(GameEvent::BrickDestroyed { color, position });
                self.rules.on_brick_destroyed(color, cleared, out);
            }
            PhysicsEvent::OutOfBounds => self.rules.on_out_of_bounds(out),
        }
    }

    /// Apply pending rule commands; speed-ups and paddle shrinks wait for
    /// the next step
    pub(crate) fn apply_commands(&mut self, out: &mut Outbox) {
        for command in std::mem::take(&mut out.commands) {
            match command {
                RuleCommand::IncreaseSpeed { .. } | RuleCommand::ShrinkPaddle => {
                    self.deferred.push(command)
                }
                RuleCommand::RespawnBall => {
                    self.physics.reset_for_next_life();
                    self.serve_timer = 0.0;
                }
                RuleCommand::ResetLevel { new_game } => self.reset_level(new_game),
            }
        }
        self.paddle
            .set_input_enabled(self.rules.phase() != GamePhase::GameOver);
    }

    /// Run commands queued during the previous step, in the order issued
    pub(crate) fn apply_deferred(&mut self, out: &mut Outbox) {
        for command in std::mem::take(&mut self.deferred) {
            match command {
                RuleCommand::IncreaseSpeed { factor } => {
                    let ball = self.physics.apply_speed_multiplier(factor);
                    let paddle = self.paddle.apply_speed_multiplier(factor);
                    match ball.and(paddle) {
                        Ok(()) => out.emit(GameEvent::SpeedIncreaseApplied(factor)),
                        Err(violation) => out.emit(GameEvent::InvariantViolated(violation)),
                    }
                }
                RuleCommand::ShrinkPaddle => {
                    if let Err(violation) = self.paddle.shrink() {
                        out.emit(GameEvent::InvariantViolated(violation));
                    }
                    out.emit(GameEvent::PaddleShrunk);
                }
                RuleCommand::RespawnBall | RuleCommand::ResetLevel { .. } => {
                    log::warn!("Unexpected deferred command {command:?}");
                }
            }
        }
    }

    fn reset_level(&mut self, new_game: bool) {
        self.bricks = BrickField::instantiate(&self.layout, &self.tuning.rules.points);
        self.paddle.reset(new_game);
        if new_game {
            self.physics.reset_for_new_game();
        } else {
            self.physics.reset_for_next_life();
        }
        // Earned speed-ups carry into the next level; a new game drops them
        self.deferred
            .retain(|c| !new_game && matches!(c, RuleCommand::IncreaseSpeed { .. }));
        self.serve_timer = 0.0;
    }
}
