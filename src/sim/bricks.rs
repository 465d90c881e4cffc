//! The brick grid
//!
//! Bricks are single-hit targets keyed by a deterministic id (`row * cols + col`).
//! A destroyed brick leaves the map for good; the whole field is rebuilt on
//! level advance or restart.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::tuning::{GridTuning, PointTable};

/// Brick identity (`row * cols + col`)
pub type BrickId = u32;

/// Brick colors, top row band first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickColor {
    Red,
    Orange,
    Green,
    Yellow,
}

impl BrickColor {
    /// Color of a row: bands of `rows_per_color` rows, Red on top, Yellow for any overflow
    pub fn for_row(row: u32, rows_per_color: u32) -> Self {
        match row / rows_per_color.max(1) {
            0 => BrickColor::Red,
            1 => BrickColor::Orange,
            2 => BrickColor::Green,
            _ => BrickColor::Yellow,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BrickColor::Red => "red",
            BrickColor::Orange => "orange",
            BrickColor::Green => "green",
            BrickColor::Yellow => "yellow",
        }
    }
}

/// A single destructible brick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: BrickId,
    pub row: u32,
    pub col: u32,
    pub color: BrickColor,
    pub points: u32,
    pub rect: Rect,
}

/// Placement of the brick grid in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    pub rows_per_color: u32,
    /// Top-left corner of brick (0, 0)
    pub origin: Vec2,
    pub brick_size: Vec2,
    pub gap: f32,
}

impl GridLayout {
    /// Layout centered horizontally in an arena of the given width
    pub fn centered(grid: &GridTuning, arena_width: f32) -> Self {
        let cols = grid.cols as f32;
        let total_width = cols * grid.brick_width + (cols - 1.0).max(0.0) * grid.gap;
        if total_width > arena_width {
            log::warn!(
                "Brick grid ({total_width}px) is wider than the arena ({arena_width}px)"
            );
        }
        Self {
            rows: grid.rows,
            cols: grid.cols,
            rows_per_color: grid.rows_per_color,
            origin: Vec2::new((arena_width - total_width) / 2.0, grid.top),
            brick_size: Vec2::new(grid.brick_width, grid.brick_height),
            gap: grid.gap,
        }
    }

    /// Rectangle of the brick at (row, col)
    pub fn cell(&self, row: u32, col: u32) -> Rect {
        let step = self.brick_size + Vec2::splat(self.gap);
        Rect::new(
            self.origin + Vec2::new(col as f32 * step.x, row as f32 * step.y),
            self.brick_size,
        )
    }
}

/// Result of destroying a brick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestroyedBrick {
    pub id: BrickId,
    pub color: BrickColor,
    pub points: u32,
    /// Brick center (for visual effects)
    pub position: Vec2,
    /// True only for the destruction that emptied the field
    pub cleared: bool,
}

/// Owns every live brick of the current level
#[derive(Debug, Clone)]
pub struct BrickField {
    bricks: BTreeMap<BrickId, Brick>,
    initial_count: usize,
    cleared_notified: bool,
}

impl BrickField {
    /// Populate a fresh grid
    pub fn instantiate(layout: &GridLayout, points: &PointTable) -> Self {
        debug_assert!(layout.rows > 0 && layout.cols > 0, "empty brick grid");

        let mut bricks = BTreeMap::new();
        for row in 0..layout.rows {
            let color = BrickColor::for_row(row, layout.rows_per_color);
            for col in 0..layout.cols {
                let id = row * layout.cols + col;
                bricks.insert(
                    id,
                    Brick {
                        id,
                        row,
                        col,
                        color,
                        points: points.for_color(color),
                        rect: layout.cell(row, col),
                    },
                );
            }
        }

        let initial_count = bricks.len();
        log::debug!(
            "Instantiated {}x{} brick grid ({} bricks)",
            layout.rows,
            layout.cols,
            initial_count
        );

        Self {
            bricks,
            initial_count,
            cleared_notified: false,
        }
    }

    /// Remove a brick, returning what was destroyed
    ///
    /// Unknown or already-destroyed ids are a no-op and return `None`.
    pub fn destroy(&mut self, id: BrickId) -> Option<DestroyedBrick> {
        let Some(brick) = self.bricks.remove(&id) else {
            log::debug!("Ignoring destroy of missing brick {id}");
            return None;
        };

        let cleared = self.bricks.is_empty() && !self.cleared_notified;
        if cleared {
            self.cleared_notified = true;
        }

        Some(DestroyedBrick {
            id,
            color: brick.color,
            points: brick.points,
            position: brick.rect.center(),
            cleared,
        })
    }

    pub fn remaining(&self) -> usize {
        self.bricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    /// Bricks at the start of the level
    pub fn initial_count(&self) -> usize {
        self.initial_count
    }

    pub fn get(&self, id: BrickId) -> Option<&Brick> {
        self.bricks.get(&id)
    }

    /// Live bricks in id order
    pub fn iter(&self) -> impl Iterator<Item = &Brick> {
        self.bricks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(rows: u32, cols: u32) -> BrickField {
        let grid = GridTuning {
            rows,
            cols,
            ..Default::default()
        };
        BrickField::instantiate(&GridLayout::centered(&grid, 800.0), &PointTable::default())
    }

    #[test]
    fn test_color_bands() {
        assert_eq!(BrickColor::for_row(0, 2), BrickColor::Red);
        assert_eq!(BrickColor::for_row(1, 2), BrickColor::Red);
        assert_eq!(BrickColor::for_row(2, 2), BrickColor::Orange);
        assert_eq!(BrickColor::for_row(5, 2), BrickColor::Green);
        assert_eq!(BrickColor::for_row(7, 2), BrickColor::Yellow);
        assert_eq!(BrickColor::for_row(12, 2), BrickColor::Yellow);
    }

    #[test]
    fn test_instantiate_ids_and_points() {
        let field = field(8, 8);
        assert_eq!(field.remaining(), 64);
        assert_eq!(field.initial_count(), 64);

        let brick = field.get(2 * 8 + 3).unwrap();
        assert_eq!((brick.row, brick.col), (2, 3));
        assert_eq!(brick.color, BrickColor::Orange);
        assert_eq!(brick.points, 5);

        let last = field.get(63).unwrap();
        assert_eq!(last.color, BrickColor::Yellow);
        assert_eq!(last.points, 1);
    }

    #[test]
    fn test_layout_is_centered() {
        let layout = GridLayout::centered(&GridTuning::default(), 800.0);
        let first = layout.cell(0, 0);
        let last = layout.cell(0, layout.cols - 1);
        assert!((first.left() - (800.0 - last.right())).abs() < 1e-3);
        assert_eq!(first.top(), GridTuning::default().top);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut field = field(2, 2);
        let hit = field.destroy(1).unwrap();
        assert_eq!(hit.color, BrickColor::Red);
        assert_eq!(field.remaining(), 3);

        assert!(field.destroy(1).is_none());
        assert!(field.destroy(999).is_none());
        assert_eq!(field.remaining(), 3);
    }

    #[test]
    fn test_cleared_fires_once() {
        let mut field = field(1, 3);
        let cleared: Vec<bool> = (0..3).map(|id| field.destroy(id).unwrap().cleared).collect();
        assert_eq!(cleared, vec![false, false, true]);
        assert!(field.is_empty());
        assert!(field.destroy(2).is_none());
    }
}
