//! Data-driven game balance
//!
//! Every constant the simulation reads comes through [`Tuning`]. Defaults mirror
//! [`crate::consts`]; a JSON file can override any subset of fields.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::BrickColor;

/// Errors raised while loading or validating tuning
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid tuning json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },

    #[error("brick grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: u32, cols: u32 },

    #[error("serve arc is inverted: {min}..{max} degrees")]
    InvertedServeArc { min: f32, max: f32 },

    #[error("hit milestone thresholds must be at least 1")]
    ZeroMilestone,

    #[error("starting lives must be at least 1")]
    NoLives,
}

/// Playfield bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
    /// Distance below the bottom edge the ball center must pass to be lost
    pub out_of_bounds_margin: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            out_of_bounds_margin: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallTuning {
    pub radius: f32,
    pub base_speed: f32,
    /// Ball center at serve time (arena center when unset)
    pub serve_position: Option<Vec2>,
    pub serve_angle_min_deg: f32,
    pub serve_angle_max_deg: f32,
    /// Horizontal steering strength of paddle bounces, in [0, 1)
    pub max_angle_factor: f32,
}

impl Default for BallTuning {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            base_speed: BALL_BASE_SPEED,
            serve_position: None,
            serve_angle_min_deg: SERVE_ANGLE_MIN_DEG,
            serve_angle_max_deg: SERVE_ANGLE_MAX_DEG,
            max_angle_factor: MAX_ANGLE_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleTuning {
    pub width: f32,
    pub height: f32,
    /// Top edge of the paddle
    pub y: f32,
    pub base_speed: f32,
    pub shrink_factor: f32,
    pub min_width: f32,
}

impl Default for PaddleTuning {
    fn default() -> Self {
        Self {
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            y: PADDLE_Y,
            base_speed: PADDLE_BASE_SPEED,
            shrink_factor: PADDLE_SHRINK_FACTOR,
            min_width: PADDLE_MIN_WIDTH,
        }
    }
}

/// Brick grid shape. The grid is centered horizontally in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTuning {
    pub rows: u32,
    pub cols: u32,
    pub rows_per_color: u32,
    pub brick_width: f32,
    pub brick_height: f32,
    pub gap: f32,
    /// Top edge of the first row
    pub top: f32,
}

impl Default for GridTuning {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            rows_per_color: ROWS_PER_COLOR,
            brick_width: BRICK_WIDTH,
            brick_height: BRICK_HEIGHT,
            gap: BRICK_GAP,
            top: GRID_TOP,
        }
    }
}

/// Points awarded per brick color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointTable {
    pub red: u32,
    pub orange: u32,
    pub green: u32,
    pub yellow: u32,
}

impl Default for PointTable {
    fn default() -> Self {
        Self {
            red: RED_POINTS,
            orange: ORANGE_POINTS,
            green: GREEN_POINTS,
            yellow: YELLOW_POINTS,
        }
    }
}

impl PointTable {
    pub fn for_color(&self, color: BrickColor) -> u32 {
        match color {
            BrickColor::Red => self.red,
            BrickColor::Orange => self.orange,
            BrickColor::Green => self.green,
            BrickColor::Yellow => self.yellow,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesTuning {
    pub starting_lives: u32,
    /// Total-hit counts that each trigger one speed-up
    pub hit_milestones: Vec<u32>,
    pub milestone_factor: f32,
    pub points: PointTable,
    /// Continue countdown after game over (None disables it)
    pub continue_secs: Option<f32>,
    /// Automatic advance after a cleared level (None waits for input)
    pub level_advance_secs: Option<f32>,
}

impl Default for RulesTuning {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            hit_milestones: HIT_MILESTONES.to_vec(),
            milestone_factor: MILESTONE_FACTOR,
            points: PointTable::default(),
            continue_secs: Some(CONTINUE_SECS),
            level_advance_secs: None,
        }
    }
}

/// Complete simulation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub ball: BallTuning,
    pub paddle: PaddleTuning,
    pub grid: GridTuning,
    pub rules: RulesTuning,
    /// Automatic launch delay while serving (None waits for launch input)
    pub serve_delay_secs: Option<f32>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena: ArenaTuning::default(),
            ball: BallTuning::default(),
            paddle: PaddleTuning::default(),
            grid: GridTuning::default(),
            rules: RulesTuning::default(),
            serve_delay_secs: Some(SERVE_DELAY_SECS),
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Ball center at serve time
    pub fn serve_point(&self) -> Vec2 {
        self.ball
            .serve_position
            .unwrap_or(Vec2::new(self.arena.width / 2.0, self.arena.height / 2.0))
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("arena.width", self.arena.width)?;
        positive("arena.height", self.arena.height)?;
        at_least_zero("arena.out_of_bounds_margin", self.arena.out_of_bounds_margin)?;

        positive("ball.radius", self.ball.radius)?;
        positive("ball.base_speed", self.ball.base_speed)?;
        if !(0.0..1.0).contains(&self.ball.max_angle_factor) {
            return Err(ConfigError::OutOfRange {
                field: "ball.max_angle_factor",
                expected: "in [0, 1)",
                value: self.ball.max_angle_factor,
            });
        }
        let (min, max) = (self.ball.serve_angle_min_deg, self.ball.serve_angle_max_deg);
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ConfigError::InvertedServeArc { min, max });
        }

        positive("paddle.width", self.paddle.width)?;
        positive("paddle.height", self.paddle.height)?;
        positive("paddle.base_speed", self.paddle.base_speed)?;
        positive("paddle.min_width", self.paddle.min_width)?;
        if !(self.paddle.shrink_factor > 0.0 && self.paddle.shrink_factor < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "paddle.shrink_factor",
                expected: "in (0, 1)",
                value: self.paddle.shrink_factor,
            });
        }
        if self.paddle.width > self.arena.width {
            return Err(ConfigError::OutOfRange {
                field: "paddle.width",
                expected: "no wider than the arena",
                value: self.paddle.width,
            });
        }

        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.grid.rows,
                cols: self.grid.cols,
            });
        }
        if self.grid.rows_per_color == 0 {
            return Err(ConfigError::OutOfRange {
                field: "grid.rows_per_color",
                expected: "at least 1",
                value: 0.0,
            });
        }
        positive("grid.brick_width", self.grid.brick_width)?;
        positive("grid.brick_height", self.grid.brick_height)?;
        at_least_zero("grid.gap", self.grid.gap)?;

        if self.rules.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if self.rules.hit_milestones.contains(&0) {
            return Err(ConfigError::ZeroMilestone);
        }
        positive("rules.milestone_factor", self.rules.milestone_factor)?;
        if let Some(secs) = self.rules.continue_secs {
            at_least_zero("rules.continue_secs", secs)?;
        }
        if let Some(secs) = self.rules.level_advance_secs {
            at_least_zero("rules.level_advance_secs", secs)?;
        }
        if let Some(secs) = self.serve_delay_secs {
            at_least_zero("serve_delay_secs", secs)?;
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "positive",
            value,
        })
    }
}

fn at_least_zero(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "zero or more",
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.serve_point(), Vec2::new(400.0, 300.0));
        assert_eq!(tuning.rules.hit_milestones, vec![4, 12]);
        assert_eq!(tuning.serve_delay_secs, Some(SERVE_DELAY_SECS));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(
            r#"{ "arena": { "width": 1024.0 }, "rules": { "milestone_factor": 1.05 } }"#,
        )
        .unwrap();
        assert_eq!(tuning.arena.width, 1024.0);
        assert_eq!(tuning.arena.height, ARENA_HEIGHT);
        assert_eq!(tuning.rules.milestone_factor, 1.05);
        assert_eq!(tuning.rules.points, PointTable::default());
    }

    #[test]
    fn test_serve_position_override() {
        let tuning = Tuning::from_json(r#"{ "ball": { "serve_position": [100.0, 50.0] } }"#).unwrap();
        assert_eq!(tuning.serve_point(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_rejects_empty_grid() {
        let err = Tuning::from_json(r#"{ "grid": { "rows": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyGrid { rows: 0, .. }));
    }

    #[test]
    fn test_rejects_bad_shrink_factor() {
        let err = Tuning::from_json(r#"{ "paddle": { "shrink_factor": 1.5 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "paddle.shrink_factor",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_inverted_serve_arc() {
        let err = Tuning::from_json(
            r#"{ "ball": { "serve_angle_min_deg": 120.0, "serve_angle_max_deg": 60.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvertedServeArc { .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().starts_with("invalid tuning json"));
    }

    #[test]
    fn test_point_table_lookup() {
        let points = PointTable::default();
        assert_eq!(points.for_color(BrickColor::Red), 7);
        assert_eq!(points.for_color(BrickColor::Orange), 5);
        assert_eq!(points.for_color(BrickColor::Green), 3);
        assert_eq!(points.for_color(BrickColor::Yellow), 1);
    }
}
