//! Brickfall - a brick-breaker simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, bricks, paddle, rules)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio and input polling live outside this crate. They consume
//! [`sim::GameEvent`]s and feed [`sim::TickInput`]s back in.

pub mod sim;
pub mod tuning;

pub use sim::{Game, GameEvent, GamePhase, TickInput, tick};
pub use tuning::{ConfigError, Tuning};

use glam::Vec2;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the clock will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Viewport dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    pub const BALL_BASE_SPEED: f32 = 300.0;
    /// Serve arc in degrees from +x (y points down, so 90 is straight down)
    pub const SERVE_ANGLE_MIN_DEG: f32 = 60.0;
    pub const SERVE_ANGLE_MAX_DEG: f32 = 120.0;
    /// Horizontal steering strength of paddle bounces
    pub const MAX_ANGLE_FACTOR: f32 = 0.65;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 16.0;
    /// Paddle top edge
    pub const PADDLE_Y: f32 = 550.0;
    pub const PADDLE_BASE_SPEED: f32 = 500.0;
    /// Width kept after the red-row shrink (60%)
    pub const PADDLE_SHRINK_FACTOR: f32 = 0.6;
    pub const PADDLE_MIN_WIDTH: f32 = 8.0;

    /// Brick grid defaults
    pub const GRID_ROWS: u32 = 8;
    pub const GRID_COLS: u32 = 8;
    pub const ROWS_PER_COLOR: u32 = 2;
    pub const BRICK_WIDTH: f32 = 90.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_GAP: f32 = 6.0;
    pub const GRID_TOP: f32 = 60.0;

    /// Points per brick color
    pub const RED_POINTS: u32 = 7;
    pub const ORANGE_POINTS: u32 = 5;
    pub const GREEN_POINTS: u32 = 3;
    pub const YELLOW_POINTS: u32 = 1;

    /// Rules defaults
    pub const STARTING_LIVES: u32 = 3;
    pub const HIT_MILESTONES: [u32; 2] = [4, 12];
    /// Speed boost for every milestone (multiplicative)
    pub const MILESTONE_FACTOR: f32 = 1.15;
    /// Game-over continue countdown (seconds)
    pub const CONTINUE_SECS: f32 = 9.0;
    /// Delay before the ball launches on its own (seconds)
    pub const SERVE_DELAY_SECS: f32 = 1.0;
}

/// Unit direction for an angle in degrees measured from +x
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let theta = degrees.to_radians();
    Vec2::new(theta.cos(), theta.sin())
}

/// Angle of a direction in degrees from +x, in (-180, 180]
#[inline]
pub fn degrees_of(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x).to_degrees()
}

/// Relative float comparison used by invariant checks
#[inline]
pub fn approx_eq(a: f32, b: f32, rel: f32) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_degrees() {
        let down = direction_from_degrees(90.0);
        assert!(down.x.abs() < 1e-6);
        assert!((down.y - 1.0).abs() < 1e-6);
        assert!((degrees_of(down) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(282.8427, 282.8428, 1e-5));
        assert!(!approx_eq(1.0, 1.1, 1e-3));
    }
}
