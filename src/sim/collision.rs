//! Collision math for the ball against axis-aligned geometry
//!
//! The ball is a circle; walls, paddle and bricks are rectangles. Brick impacts
//! use the ball's bounding square so the struck face is the side of least
//! penetration. Paddle bounces rebuild the velocity from its magnitude so speed
//! never drifts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left corner plus size, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        debug_assert!(size.x > 0.0 && size.y > 0.0, "degenerate rect {size:?}");
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    /// Closest point on (or in) the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max())
    }
}

/// Face of a rectangle struck by the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Outward normal of this face (y down)
    pub fn normal(self) -> Vec2 {
        match self {
            Side::Top => Vec2::NEG_Y,
            Side::Bottom => Vec2::Y,
            Side::Left => Vec2::NEG_X,
            Side::Right => Vec2::X,
        }
    }

    /// True for faces that flip the vertical velocity component
    pub fn is_horizontal_face(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

/// How far the ball's bounding square has pushed past each face of a rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Penetration {
    /// The face with the least penetration (ties resolve Top, Bottom, Left, Right)
    pub fn impact_side(&self) -> Side {
        let mut side = Side::Top;
        let mut depth = self.top;
        for (candidate, d) in [
            (Side::Bottom, self.bottom),
            (Side::Left, self.left),
            (Side::Right, self.right),
        ] {
            if d < depth {
                side = candidate;
                depth = d;
            }
        }
        side
    }

    /// Penetration depth along the impact side
    pub fn depth(&self) -> f32 {
        self.top.min(self.bottom).min(self.left).min(self.right)
    }
}

/// Circle/rectangle overlap via the closest point on the rectangle
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Per-face penetration of the ball's bounding square into `rect`
///
/// Returns `None` unless the square overlaps the rectangle on every axis.
pub fn penetration_depths(center: Vec2, radius: f32, rect: &Rect) -> Option<Penetration> {
    let pen = Penetration {
        top: (center.y + radius) - rect.top(),
        bottom: rect.bottom() - (center.y - radius),
        left: (center.x + radius) - rect.left(),
        right: rect.right() - (center.x - radius),
    };

    if pen.top > 0.0 && pen.bottom > 0.0 && pen.left > 0.0 && pen.right > 0.0 {
        Some(pen)
    } else {
        None
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Normalized hit position on the paddle: 0 = center, -1/+1 = edges
pub fn contact_offset(ball_x: f32, paddle_center_x: f32, paddle_width: f32) -> f32 {
    let half = paddle_width / 2.0;
    if half <= f32::EPSILON {
        return 0.0;
    }
    ((ball_x - paddle_center_x) / half).clamp(-1.0, 1.0)
}

/// Rebuild the ball velocity after a paddle hit
///
/// The current speed is split into a horizontal part steered by the contact
/// offset and an upward vertical part, so `|result| == |velocity|`.
pub fn paddle_bounce_velocity(velocity: Vec2, offset: f32, max_angle_factor: f32) -> Vec2 {
    let speed = velocity.length();
    let h = speed * max_angle_factor * offset.clamp(-1.0, 1.0);
    let v = (speed * speed - h * h).max(0.0).sqrt();
    Vec2::new(h, -v)
}
