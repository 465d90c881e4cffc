//! Ball integration and collision response
//!
//! One `update` per step: integrate, then resolve walls, paddle, bricks and the
//! bottom plane in that fixed order. A collider resolves once per contact
//! episode; the episode ends when the ball separates from it.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bricks::{BrickField, BrickId};
use super::collision::{
    Rect, Side, circle_rect_overlap, contact_offset, paddle_bounce_velocity, penetration_depths,
    reflect_velocity,
};
use super::events::{PhysicsEvent, Violation};
use crate::{approx_eq, direction_from_degrees};
use crate::tuning::{ArenaTuning, BallTuning};

/// Ball kinematic state (position is the ball center)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallState {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Product of every speed factor applied since the last new game
    pub speed_multiplier: f32,
}

/// Bodies the ball can be in contact with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collider {
    LeftWall,
    RightWall,
    Ceiling,
    Paddle,
    Brick(BrickId),
    Floor,
}

/// Owns the ball and resolves its collisions
#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    ball: BallState,
    tuning: BallTuning,
    arena: ArenaTuning,
    serve_point: Vec2,
    /// Colliders resolved during their current contact episode
    touching: BTreeSet<Collider>,
    rng: Pcg32,
}

impl PhysicsEngine {
    /// Create the engine with a freshly served ball
    pub fn new(tuning: BallTuning, arena: ArenaTuning, serve_point: Vec2, seed: u64) -> Self {
        let mut engine = Self {
            ball: BallState {
                pos: serve_point,
                vel: Vec2::ZERO,
                radius: tuning.radius,
                speed_multiplier: 1.0,
            },
            tuning,
            arena,
            serve_point,
            touching: BTreeSet::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        engine.reset_for_new_game();
        engine
    }

    /// Advance the ball by `dt` and resolve collisions; returns the new position
    pub fn update(
        &mut self,
        dt: f32,
        paddle: &Rect,
        bricks: &mut BrickField,
        events: &mut Vec<PhysicsEvent>,
    ) -> Vec2 {
        let speed = self.ball.vel.length();
        self.ball.pos += self.ball.vel * dt;

        let mut touching = BTreeSet::new();
        self.resolve_walls(&mut touching, events);
        self.resolve_paddle(paddle, &mut touching, events);
        self.resolve_bricks(bricks, &mut touching, events);
        self.check_out_of_bounds(&mut touching, events);
        self.touching = touching;

        debug_assert!(
            approx_eq(self.ball.vel.length(), speed, 1e-4),
            "collision changed ball speed {speed} -> {}",
            self.ball.vel.length()
        );
        self.ball.pos
    }

    /// Compound the speed multiplier and rescale the velocity to match
    pub fn apply_speed_multiplier(&mut self, factor: f32) -> Result<(), Violation> {
        if !(factor.is_finite() && factor > 0.0) {
            debug_assert!(false, "invalid ball speed factor {factor}");
            log::warn!("Ignoring ball speed factor {factor}");
            return Err(Violation::InvalidSpeedFactor { factor });
        }
        self.ball.speed_multiplier *= factor;
        let dir = self.ball.vel.try_normalize().unwrap_or(Vec2::Y);
        self.ball.vel = dir * self.expected_speed();
        log::debug!(
            "Ball speed x{factor} -> multiplier {:.4}, speed {:.2}",
            self.ball.speed_multiplier,
            self.ball.vel.length()
        );
        Ok(())
    }

    /// Serve again after a lost life, keeping the speed multiplier
    pub fn reset_for_next_life(&mut self) {
        let angle = self
            .rng
            .random_range(self.tuning.serve_angle_min_deg..=self.tuning.serve_angle_max_deg);
        self.ball.pos = self.serve_point;
        self.ball.vel = direction_from_degrees(angle) * self.expected_speed();
        self.touching.clear();
        log::debug!("Ball served at {angle:.1} degrees");
    }

    /// Serve for a new game: multiplier back to 1.0
    pub fn reset_for_new_game(&mut self) {
        self.ball.speed_multiplier = 1.0;
        self.reset_for_next_life();
    }

    /// Place the ball directly (scripted setups and tests)
    pub fn place_ball(&mut self, pos: Vec2, vel: Vec2) {
        self.ball.pos = pos;
        self.ball.vel = vel;
        self.touching.clear();
    }

    /// Speed the ball should have: base speed times the multiplier
    pub fn expected_speed(&self) -> f32 {
        self.tuning.base_speed * self.ball.speed_multiplier
    }

    pub fn ball(&self) -> &BallState {
        &self.ball
    }

    pub fn is_touching(&self, collider: Collider) -> bool {
        self.touching.contains(&collider)
    }

    /// Record contact with `collider`; true if this starts a new episode
    fn begin_contact(&self, collider: Collider, touching: &mut BTreeSet<Collider>) -> bool {
        touching.insert(collider);
        !self.touching.contains(&collider)
    }

    fn resolve_walls(&mut self, touching: &mut BTreeSet<Collider>, events: &mut Vec<PhysicsEvent>) {
        let r = self.ball.radius;

        if self.ball.pos.x - r < 0.0 && self.begin_contact(Collider::LeftWall, touching) {
            if self.ball.vel.x < 0.0 {
                self.ball.vel = reflect_velocity(self.ball.vel, Vec2::X);
            }
            self.ball.pos.x = r;
            events.push(PhysicsEvent::WallHit(Side::Left));
        }

        if self.ball.pos.x + r > self.arena.width && self.begin_contact(Collider::RightWall, touching)
        {
            if self.ball.vel.x > 0.0 {
                self.ball.vel = reflect_velocity(self.ball.vel, Vec2::NEG_X);
            }
            self.ball.pos.x = self.arena.width - r;
            events.push(PhysicsEvent::WallHit(Side::Right));
        }

        if self.ball.pos.y - r < 0.0 && self.begin_contact(Collider::Ceiling, touching) {
            if self.ball.vel.y < 0.0 {
                self.ball.vel = reflect_velocity(self.ball.vel, Vec2::Y);
            }
            self.ball.pos.y = r;
            events.push(PhysicsEvent::CeilingHit);
        }
    }

    fn resolve_paddle(
        &mut self,
        paddle: &Rect,
        touching: &mut BTreeSet<Collider>,
        events: &mut Vec<PhysicsEvent>,
    ) {
        if !circle_rect_overlap(self.ball.pos, self.ball.radius, paddle) {
            return;
        }
        if !self.begin_contact(Collider::Paddle, touching) {
            return;
        }

        let offset = contact_offset(self.ball.pos.x, paddle.center().x, paddle.size.x);
        self.ball.vel = paddle_bounce_velocity(self.ball.vel, offset, self.tuning.max_angle_factor);
        events.push(PhysicsEvent::PaddleHit { offset });
    }

    fn resolve_bricks(
        &mut self,
        bricks: &mut BrickField,
        touching: &mut BTreeSet<Collider>,
        events: &mut Vec<PhysicsEvent>,
    ) {
        let pos = self.ball.pos;
        let r = self.ball.radius;

        // One brick per step: the nearest overlapping one
        let Some((id, side)) = bricks
            .iter()
            .filter_map(|b| penetration_depths(pos, r, &b.rect).map(|p| (b, p.impact_side())))
            .filter(|(b, _)| !self.touching.contains(&Collider::Brick(b.id)))
            .min_by(|(a, _), (b, _)| {
                a.rect
                    .center()
                    .distance_squared(pos)
                    .total_cmp(&b.rect.center().distance_squared(pos))
            })
            .map(|(b, side)| (b.id, side))
        else {
            return;
        };

        if !self.begin_contact(Collider::Brick(id), touching) {
            return;
        }

        let normal = side.normal();
        if self.ball.vel.dot(normal) < 0.0 {
            self.ball.vel = reflect_velocity(self.ball.vel, normal);
        }

        if let Some(destroyed) = bricks.destroy(id) {
            events.push(PhysicsEvent::BrickHit {
                id,
                color: destroyed.color,
                position: destroyed.position,
                cleared: destroyed.cleared,
            });
        }
    }

    fn check_out_of_bounds(
        &mut self,
        touching: &mut BTreeSet<Collider>,
        events: &mut Vec<PhysicsEvent>,
    ) {
        let bottom = self.arena.height + self.arena.out_of_bounds_margin;
        if self.ball.pos.y > bottom && self.begin_contact(Collider::Floor, touching) {
            events.push(PhysicsEvent::OutOfBounds);
        }
    }
}
