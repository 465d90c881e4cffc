//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by brick ID)
//! - No rendering or platform dependencies

pub mod bricks;
pub mod collision;
pub mod events;
pub mod paddle;
pub mod physics;
pub mod rules;
pub mod state;
pub mod tick;

pub use bricks::{Brick, BrickColor, BrickField, BrickId, GridLayout};
pub use collision::{Rect, Side};
pub use events::{GameEvent, PhysicsEvent, RuleCommand, Violation};
pub use paddle::{PaddleController, PaddleState};
pub use physics::{BallState, Collider, PhysicsEngine};
pub use rules::{GamePhase, GameState, RulesEngine};
pub use state::Game;
pub use tick::{FrameClock, TickInput, tick};
