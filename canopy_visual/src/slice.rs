// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Side data for stretched (nine-slice) and tiled backgrounds.
//!
//! Both are pure functions of the sprite, frame, target size, stretch caps and draw type.
//! Backgrounds cache them and drop the cache whenever any input changes.

use alloc::vec;
use alloc::vec::Vec;
use kurbo::{Rect, Size, Vec2};

use crate::background::DrawType;

/// Grid lines of a nine-slice (or three-slice) sprite in control-local space.
///
/// `columns` and `rows` hold `(position, texture coordinate)` pairs. Cells between
/// consecutive lines map the matching texture span onto the matching local span.
#[derive(Clone, Debug, PartialEq)]
pub struct StretchData {
    /// Vertical grid lines as `(x, u)`.
    pub columns: Vec<(f64, f64)>,
    /// Horizontal grid lines as `(y, v)`.
    pub rows: Vec<(f64, f64)>,
    key: SliceKey,
}

/// A column or row of a tiled background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileCell {
    /// Extent in control-local units.
    pub size: f64,
    /// Extent in texture coordinates.
    pub tex_size: f64,
    /// Texture coordinate the cell starts at.
    pub tex_offset: f64,
}

/// Columns and rows of a tiled background.
#[derive(Clone, Debug, PartialEq)]
pub struct TiledData {
    /// Cells along x.
    pub columns: Vec<TileCell>,
    /// Cells along y.
    pub rows: Vec<TileCell>,
    key: SliceKey,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SliceKey {
    sprite_size: Size,
    frame: u32,
    size: Size,
    caps: Vec2,
    draw_type: DrawType,
}

impl SliceKey {
    fn new(sprite_size: Size, frame: u32, size: Size, caps: Vec2, draw_type: DrawType) -> Self {
        Self {
            sprite_size,
            frame,
            size,
            caps,
            draw_type,
        }
    }
}

fn floor(v: f64) -> f64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Tile counts are far below the i64 range."
    )]
    let t = v as i64 as f64;
    if t > v { t - 1.0 } else { t }
}

fn ceil(v: f64) -> f64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Tile counts are far below the i64 range."
    )]
    let t = v as i64 as f64;
    if t < v { t + 1.0 } else { t }
}

/// Lines along one axis: stretched axes keep `cap` unscaled at both ends, other axes keep the
/// sprite's own extent centred in the target.
fn stretch_axis(target: f64, sprite: f64, cap: f64, stretched: bool) -> Vec<(f64, f64)> {
    if sprite <= 0.0 {
        return Vec::new();
    }
    if !stretched {
        let pos = (target - sprite) * 0.5;
        return vec![(pos, 0.0), (pos + sprite, 1.0)];
    }
    let cap = cap.clamp(0.0, sprite * 0.5);
    let uv = cap / sprite;
    vec![
        (0.0, 0.0),
        (cap, uv),
        (target - cap, 1.0 - uv),
        (target, 1.0),
    ]
}

impl StretchData {
    /// Build the slice grid for drawing a `sprite_size` frame into `size`.
    pub fn new(sprite_size: Size, frame: u32, size: Size, caps: Vec2, draw_type: DrawType) -> Self {
        let horizontal = matches!(draw_type, DrawType::StretchBoth | DrawType::StretchHorizontal);
        let vertical = matches!(draw_type, DrawType::StretchBoth | DrawType::StretchVertical);
        Self {
            columns: stretch_axis(size.width, sprite_size.width, caps.x, horizontal),
            rows: stretch_axis(size.height, sprite_size.height, caps.y, vertical),
            key: SliceKey::new(sprite_size, frame, size, caps, draw_type),
        }
    }

    /// Whether this data was built from exactly these inputs.
    pub fn matches(
        &self,
        sprite_size: Size,
        frame: u32,
        size: Size,
        caps: Vec2,
        draw_type: DrawType,
    ) -> bool {
        self.key == SliceKey::new(sprite_size, frame, size, caps, draw_type)
    }

    /// Local-space rects of every slice, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Rect> + '_ {
        self.rows.windows(2).flat_map(move |r| {
            self.columns
                .windows(2)
                .map(move |c| Rect::new(c[0].0, r[0].0, c[1].0, r[1].0))
        })
    }
}

/// Cells along one axis of a tiled sprite, with `cap` units kept at both ends and the center
/// repeated; a trailing partial tile fills the remainder.
fn tiled_axis(size: f64, sprite_size: f64, texture_size: f64, cap: f64) -> Vec<TileCell> {
    let side = cap;
    let side_tex = side / texture_size;
    let center = sprite_size - side * 2.0;
    let center_tex = center / texture_size;

    let mut grid = 0.0;
    let mut part = 0.0;
    if center > 0.0 {
        let area = size - side * 2.0;
        grid = ceil(area / center);
        part = area - floor(area / center) * center;
    }
    if side > 0.0 {
        grid += 2.0;
    }
    if grid < 0.0 {
        log::error!("tiled background grid collapsed: size {size}, sprite {sprite_size}, cap {cap}");
        debug_assert!(grid >= 0.0, "incorrect grid size");
        return Vec::new();
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "grid is a non-negative whole number."
    )]
    let count = grid as usize;
    let center_cell = TileCell {
        size: center,
        tex_size: center_tex,
        tex_offset: side_tex,
    };
    let mut cells = vec![center_cell; count];

    let mut end = 0;
    if side > 0.0 && count >= 2 {
        cells[0] = TileCell {
            size: side,
            tex_size: side_tex,
            tex_offset: 0.0,
        };
        cells[count - 1] = TileCell {
            size: side,
            tex_size: side_tex,
            tex_offset: side_tex + center_tex,
        };
        end = 1;
    }
    if part > 0.0 && count > end {
        end += 1;
        cells[count - end] = TileCell {
            size: part,
            tex_size: part / texture_size,
            tex_offset: side_tex,
        };
    }
    cells
}

impl TiledData {
    /// Build tile cells for drawing a `sprite_size` frame repeatedly into `size`.
    pub fn new(sprite_size: Size, frame: u32, size: Size, caps: Vec2, draw_type: DrawType) -> Self {
        Self {
            columns: tiled_axis(size.width, sprite_size.width, sprite_size.width, caps.x),
            rows: tiled_axis(size.height, sprite_size.height, sprite_size.height, caps.y),
            key: SliceKey::new(sprite_size, frame, size, caps, draw_type),
        }
    }

    /// Whether this data was built from exactly these inputs.
    pub fn matches(
        &self,
        sprite_size: Size,
        frame: u32,
        size: Size,
        caps: Vec2,
        draw_type: DrawType,
    ) -> bool {
        self.key == SliceKey::new(sprite_size, frame, size, caps, draw_type)
    }

    /// Total number of tiles.
    pub fn tile_count(&self) -> usize {
        self.columns.len() * self.rows.len()
    }

    /// Local-space rects of every tile, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Rect> + '_ {
        let mut y = 0.0;
        self.rows.iter().flat_map(move |row| {
            let top = y;
            y += row.size;
            let mut x = 0.0;
            self.columns.iter().map(move |col| {
                let left = x;
                x += col.size;
                Rect::new(left, top, left + col.size, top + row.size)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretch_both_keeps_caps_unscaled() {
        let data = StretchData::new(
            Size::new(20.0, 20.0),
            0,
            Size::new(100.0, 40.0),
            Vec2::new(5.0, 5.0),
            DrawType::StretchBoth,
        );
        let xs: Vec<f64> = data.columns.iter().map(|c| c.0).collect();
        let us: Vec<f64> = data.columns.iter().map(|c| c.1).collect();
        assert_eq!(xs, vec![0.0, 5.0, 95.0, 100.0]);
        assert_eq!(us, vec![0.0, 0.25, 0.75, 1.0]);
        assert_eq!(data.cells().count(), 9, "nine slices");
    }

    #[test]
    fn stretch_horizontal_centres_the_other_axis() {
        let data = StretchData::new(
            Size::new(20.0, 10.0),
            0,
            Size::new(100.0, 30.0),
            Vec2::new(4.0, 4.0),
            DrawType::StretchHorizontal,
        );
        assert_eq!(data.rows, vec![(10.0, 0.0), (20.0, 1.0)]);
        assert_eq!(data.cells().count(), 3, "three slices");
    }

    #[test]
    fn oversized_caps_are_clamped_to_half_the_sprite() {
        let data = StretchData::new(
            Size::new(10.0, 10.0),
            0,
            Size::new(50.0, 50.0),
            Vec2::new(8.0, 0.0),
            DrawType::StretchBoth,
        );
        assert_eq!(data.columns[1], (5.0, 0.5));
    }

    #[test]
    fn tiled_axis_adds_sides_and_a_partial_tile() {
        // 10 unit caps, 20 unit center, 75 units to fill: 10 + 20 + 20 + 15 + 10.
        let cells = tiled_axis(75.0, 40.0, 40.0, 10.0);
        let sizes: Vec<f64> = cells.iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![10.0, 20.0, 20.0, 15.0, 10.0]);
        assert_eq!(cells[0].tex_offset, 0.0);
        assert_eq!(cells[1].tex_offset, 0.25);
        assert_eq!(cells[4].tex_offset, 0.75);
        assert_eq!(cells[3].tex_size, 15.0 / 40.0);
    }

    #[test]
    fn tiled_axis_without_caps_repeats_whole_sprite() {
        let cells = tiled_axis(30.0, 10.0, 10.0, 0.0);
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|c| c.size == 10.0 && c.tex_offset == 0.0));
    }

    #[test]
    fn tiled_cells_cover_the_target() {
        let data = TiledData::new(
            Size::new(10.0, 10.0),
            0,
            Size::new(25.0, 10.0),
            Vec2::ZERO,
            DrawType::Tiled,
        );
        assert_eq!(data.tile_count(), 3);
        let last = data.cells().last().unwrap();
        assert_eq!(last, Rect::new(20.0, 0.0, 25.0, 10.0));
        assert!(data.matches(
            Size::new(10.0, 10.0),
            0,
            Size::new(25.0, 10.0),
            Vec2::ZERO,
            DrawType::Tiled
        ));
        assert!(!data.matches(
            Size::new(10.0, 10.0),
            1,
            Size::new(25.0, 10.0),
            Vec2::ZERO,
            DrawType::Tiled
        ));
    }
}
