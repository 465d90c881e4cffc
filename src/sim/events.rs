//! Events and commands flowing between simulation components
//!
//! Physics raises [`PhysicsEvent`]s, the rules engine answers with
//! [`RuleCommand`]s, and everything presentation cares about leaves the core
//! as a [`GameEvent`]. All delivery is synchronous and in order.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bricks::{BrickColor, BrickId};
use super::collision::Side;
use super::rules::GamePhase;

/// Something the ball did this step, in resolution order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsEvent {
    /// Left or right wall
    WallHit(Side),
    CeilingHit,
    PaddleHit {
        /// Normalized contact offset in [-1, 1]
        offset: f32,
    },
    BrickHit {
        id: BrickId,
        color: BrickColor,
        position: Vec2,
        /// This hit emptied the field
        cleared: bool,
    },
    OutOfBounds,
}

/// Commands issued by the rules engine to the other components
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleCommand {
    /// Multiply ball and paddle speed
    IncreaseSpeed { factor: f32 },
    /// Shrink the paddle (applied at the start of the next step)
    ShrinkPaddle,
    /// Put the ball back at the serve point
    RespawnBall,
    /// Rebuild bricks, ball and paddle for a level
    ResetLevel { new_game: bool },
}

/// Runtime contract breaches. The simulation clamps and keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize, Deserialize)]
pub enum Violation {
    #[error("paddle width {width} fell below the minimum; clamped")]
    DegeneratePaddle { width: f32 },

    #[error("speed factor {factor} is not a positive finite number; ignored")]
    InvalidSpeedFactor { factor: f32 },
}

/// Events emitted for rendering, audio and HUD collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged(u64),
    LivesChanged(u32),
    StateChanged(GamePhase),
    GameOver,
    LevelComplete,
    LevelStarted(u32),
    BrickDestroyed { color: BrickColor, position: Vec2 },
    PaddleHit,
    WallHit,
    CeilingHit,
    SpeedIncreaseApplied(f32),
    PaddleShrunk,
    BallServed,
    Paused(bool),
    /// Whole seconds left to continue after game over
    ContinueCountdown(u32),
    ContinueExpired,
    InvariantViolated(Violation),
}

/// Output buffer handed to rules handlers
#[derive(Debug, Default)]
pub struct Outbox {
    pub commands: Vec<RuleCommand>,
    pub events: Vec<GameEvent>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(&mut self, command: RuleCommand) {
        self.commands.push(command);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
