//! Paddle movement and bounds
//!
//! Turns a directional input axis into bounded horizontal motion. Input polling
//! itself happens outside the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::events::Violation;
use crate::tuning::PaddleTuning;

/// Paddle kinematic state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaddleState {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Horizontal velocity from the last update
    pub vel_x: f32,
    pub speed_multiplier: f32,
}

/// Owns the paddle and keeps it inside the arena
#[derive(Debug, Clone)]
pub struct PaddleController {
    state: PaddleState,
    tuning: PaddleTuning,
    viewport_width: f32,
    input_enabled: bool,
}

impl PaddleController {
    pub fn new(tuning: PaddleTuning, viewport_width: f32) -> Self {
        let state = PaddleState {
            pos: Vec2::new((viewport_width - tuning.width) / 2.0, tuning.y),
            width: tuning.width,
            height: tuning.height,
            vel_x: 0.0,
            speed_multiplier: 1.0,
        };
        Self {
            state,
            tuning,
            viewport_width,
            input_enabled: true,
        }
    }

    /// Move by `axis` (clamped to [-1, 1]) for `dt` seconds
    pub fn update(&mut self, axis: f32, dt: f32) {
        if !self.input_enabled {
            self.state.vel_x = 0.0;
            return;
        }

        let axis = if axis.is_finite() { axis.clamp(-1.0, 1.0) } else { 0.0 };
        self.state.vel_x = axis * self.tuning.base_speed * self.state.speed_multiplier;
        self.state.pos.x += self.state.vel_x * dt;
        self.clamp_to_bounds();
    }

    /// Compound the paddle speed multiplier
    pub fn apply_speed_multiplier(&mut self, factor: f32) -> Result<(), Violation> {
        if !(factor.is_finite() && factor > 0.0) {
            debug_assert!(false, "invalid paddle speed factor {factor}");
            log::warn!("Ignoring paddle speed factor {factor}");
            return Err(Violation::InvalidSpeedFactor { factor });
        }
        self.state.speed_multiplier *= factor;
        Ok(())
    }

    /// Narrow the paddle around its current center
    ///
    /// The rules engine guards how often this runs; the controller does not.
    pub fn shrink(&mut self) -> Result<(), Violation> {
        let center = self.state.pos.x + self.state.width / 2.0;
        let mut width = self.state.width * self.tuning.shrink_factor;
        let mut violation = None;

        if width < self.tuning.min_width {
            log::warn!(
                "Paddle width {width} below minimum {}, clamping",
                self.tuning.min_width
            );
            violation = Some(Violation::DegeneratePaddle { width });
            width = self.tuning.min_width;
        }

        self.state.width = width;
        self.state.pos.x = center - width / 2.0;
        self.clamp_to_bounds();

        match violation {
            Some(v) => Err(v),
            None => Ok(()),
        }
    }

    /// Freeze or unfreeze the paddle
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        if !enabled {
            self.state.vel_x = 0.0;
        }
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Restore base width and center the paddle; a new game also resets speed
    pub fn reset(&mut self, new_game: bool) {
        self.state.width = self.tuning.width;
        self.state.pos = Vec2::new((self.viewport_width - self.tuning.width) / 2.0, self.tuning.y);
        self.state.vel_x = 0.0;
        if new_game {
            self.state.speed_multiplier = 1.0;
        }
    }

    /// Collision rectangle
    pub fn rect(&self) -> Rect {
        Rect::new(self.state.pos, Vec2::new(self.state.width, self.state.height))
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.state.vel_x, 0.0)
    }

    pub fn state(&self) -> &PaddleState {
        &self.state
    }

    fn clamp_to_bounds(&mut self) {
        let max_x = (self.viewport_width - self.state.width).max(0.0);
        self.state.pos.x = self.state.pos.x.clamp(0.0, max_x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn paddle() -> PaddleController {
        PaddleController::new(PaddleTuning::default(), 800.0)
    }

    #[test]
    fn test_starts_centered() {
        let p = paddle();
        assert_eq!(p.rect().center().x, 400.0);
        assert_eq!(p.state().pos.y, PaddleTuning::default().y);
    }

    #[test]
    fn test_update_moves_and_reports_velocity() {
        let mut p = paddle();
        p.update(1.0, 0.1);
        assert_eq!(p.velocity().x, 500.0);
        assert!((p.state().pos.x - 400.0).abs() < 1e-3);

        p.update(-0.5, 0.1);
        assert_eq!(p.velocity().x, -250.0);
    }

    #[test]
    fn test_clamped_at_edges() {
        let mut p = paddle();
        p.update(-1.0, 10.0);
        assert_eq!(p.state().pos.x, 0.0);
        p.update(1.0, 10.0);
        assert_eq!(p.state().pos.x, 700.0);
    }

    #[test]
    fn test_speed_multiplier_compounds() {
        let mut p = paddle();
        p.apply_speed_multiplier(1.15).unwrap();
        p.apply_speed_multiplier(1.15).unwrap();
        p.update(1.0, 0.01);
        assert!((p.velocity().x - 500.0 * 1.15 * 1.15).abs() < 1e-2);
    }

    #[test]
    fn test_shrink_keeps_center() {
        let mut p = paddle();
        p.update(1.0, 0.2);
        let center = p.rect().center().x;
        p.shrink().unwrap();
        assert!((p.state().width - 60.0).abs() < 1e-4);
        assert!((p.rect().center().x - center).abs() < 1e-3);
    }

    #[test]
    fn test_shrink_at_wall_stays_in_bounds() {
        let mut p = paddle();
        p.update(1.0, 10.0);
        p.shrink().unwrap();
        assert!(p.rect().right() <= 800.0);
    }

    #[test]
    fn test_shrink_clamps_to_min_width() {
        let mut p = PaddleController::new(
            PaddleTuning {
                width: 10.0,
                ..Default::default()
            },
            800.0,
        );
        let err = p.shrink().unwrap_err();
        assert!(matches!(err, Violation::DegeneratePaddle { .. }));
        assert_eq!(p.state().width, PaddleTuning::default().min_width);
    }

    #[test]
    fn test_disabled_input_freezes() {
        let mut p = paddle();
        p.set_input_enabled(false);
        p.update(1.0, 1.0);
        assert_eq!(p.rect().center().x, 400.0);
        assert_eq!(p.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_reset_restores_width() {
        let mut p = paddle();
        p.apply_speed_multiplier(2.0).unwrap();
        p.shrink().unwrap();
        p.reset(false);
        assert_eq!(p.state().width, 100.0);
        assert_eq!(p.state().speed_multiplier, 2.0);
        p.reset(true);
        assert_eq!(p.state().speed_multiplier, 1.0);
    }

    proptest! {
        #[test]
        fn prop_paddle_always_in_bounds(
            moves in prop::collection::vec((-3.0f32..3.0, 0.0f32..0.5), 1..40),
            shrinks in 0usize..3,
        ) {
            let mut p = paddle();
            for _ in 0..shrinks {
                let _ = p.shrink();
            }
            for (axis, dt) in moves {
                p.update(axis, dt);
                let x = p.state().pos.x;
                prop_assert!(x >= 0.0);
                prop_assert!(x <= 800.0 - p.state().width);
            }
        }
    }
}
