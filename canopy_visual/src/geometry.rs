// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composed geometric data of a control.

use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Padding added on every side of a control when hit testing with touch tolerance.
pub const CONTROL_TOUCH_AREA: f64 = 15.0;

/// Position, size, pivot, scale and rotation of a control.
///
/// A control's local data describes it relative to its parent. Folding the parent's composed
/// data into it with [`GeometricData::add_geometric_data`] yields absolute (screen-space)
/// data. `position` is the absolute location of the pivot point; `pivot_point` is in the
/// control's own unscaled units.
///
/// Rotation happens around `position`. The cached `cos`/`sin` of the angle always match
/// `angle`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometricData {
    position: Point,
    size: Size,
    pivot_point: Vec2,
    scale: Vec2,
    angle: f64,
    cos_a: f64,
    sin_a: f64,
}

impl Default for GeometricData {
    fn default() -> Self {
        Self::new(Point::ZERO, Size::ZERO, Vec2::ZERO, Vec2::new(1.0, 1.0), 0.0)
    }
}

impl GeometricData {
    /// Create geometric data from its parts. `angle` is in radians.
    pub fn new(position: Point, size: Size, pivot_point: Vec2, scale: Vec2, angle: f64) -> Self {
        let (cos_a, sin_a) = cos_sin(angle);
        Self {
            position,
            size,
            pivot_point,
            scale,
            angle,
            cos_a,
            sin_a,
        }
    }

    /// Position of the pivot point.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Unscaled size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Pivot point in unscaled control units.
    pub fn pivot_point(&self) -> Vec2 {
        self.pivot_point
    }

    /// Scale factors.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Rotation angle in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Cosine of [`angle`](Self::angle).
    pub fn cos_a(&self) -> f64 {
        self.cos_a
    }

    /// Sine of [`angle`](Self::angle).
    pub fn sin_a(&self) -> f64 {
        self.sin_a
    }

    /// Replace the size, keeping everything else.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Compose `parent` into this data, turning parent-relative data into absolute data.
    pub fn add_geometric_data(&mut self, parent: &Self) {
        let mut x = parent.position.x - parent.pivot_point.x * parent.scale.x
            + self.position.x * parent.scale.x;
        let mut y = parent.position.y - parent.pivot_point.y * parent.scale.y
            + self.position.y * parent.scale.y;
        if parent.angle != 0.0 {
            let tmp_x = x;
            x = (tmp_x - parent.position.x) * parent.cos_a
                + (parent.position.y - y) * parent.sin_a
                + parent.position.x;
            y = (tmp_x - parent.position.x) * parent.sin_a
                + (y - parent.position.y) * parent.cos_a
                + parent.position.y;
        }
        self.position = Point::new(x, y);
        self.scale = Vec2::new(self.scale.x * parent.scale.x, self.scale.y * parent.scale.y);
        self.angle += parent.angle;
        let (cos_a, sin_a) = cos_sin(self.angle);
        self.cos_a = cos_a;
        self.sin_a = sin_a;
    }

    /// Bounding rect before rotation is applied.
    pub fn unrotated_rect(&self) -> Rect {
        let origin = Point::new(
            self.position.x - self.pivot_point.x * self.scale.x,
            self.position.y - self.pivot_point.y * self.scale.y,
        );
        Rect::from_origin_size(
            origin,
            Size::new(self.size.width * self.scale.x, self.size.height * self.scale.y),
        )
    }

    /// Corners of the rotated rect, clockwise from the top-left corner.
    pub fn polygon(&self) -> [Point; 4] {
        let r = self.unrotated_rect();
        [
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x1, r.y1),
            Point::new(r.x0, r.y1),
        ]
        .map(|p| self.rotate_about_position(p))
    }

    /// Transform from the control's unscaled local space into absolute space.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.angle)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-self.pivot_point)
    }

    /// Whether `point` is inside the rotated rect, optionally padded by `padding` on every
    /// side of the unrotated rect.
    pub fn contains(&self, point: Point, padding: f64) -> bool {
        let r = self.unrotated_rect().inflate(padding, padding);
        let test = if self.angle != 0.0 {
            let p = self.position;
            Point::new(
                (point.x - p.x) * self.cos_a + (p.y - point.y) * -self.sin_a + p.x,
                (point.x - p.x) * -self.sin_a + (point.y - p.y) * self.cos_a + p.y,
            )
        } else {
            point
        };
        // Edges are inclusive.
        test.x >= r.x0 && test.x <= r.x1 && test.y >= r.y0 && test.y <= r.y1
    }

    /// Rotate an absolute point about [`position`](Self::position) by [`angle`](Self::angle).
    pub fn rotate_about_position(&self, point: Point) -> Point {
        if self.angle == 0.0 {
            return point;
        }
        let p = self.position;
        Point::new(
            (point.x - p.x) * self.cos_a + (p.y - point.y) * self.sin_a + p.x,
            (point.x - p.x) * self.sin_a + (point.y - p.y) * self.cos_a + p.y,
        )
    }
}

fn cos_sin(angle: f64) -> (f64, f64) {
    if angle == 0.0 {
        (1.0, 0.0)
    } else {
        let v = Vec2::from_angle(angle);
        (v.x, v.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f64::consts::FRAC_PI_2;

    #[test]
    fn composition_offsets_by_parent_origin_and_scale() {
        let parent = GeometricData::new(
            Point::new(100.0, 50.0),
            Size::new(200.0, 100.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(2.0, 2.0),
            0.0,
        );
        let mut child = GeometricData::new(
            Point::new(5.0, 5.0),
            Size::new(10.0, 10.0),
            Vec2::ZERO,
            Vec2::new(1.0, 1.0),
            0.0,
        );
        child.add_geometric_data(&parent);
        // Parent origin is 100 - 10 * 2 = 80; child at 5 units scaled by 2.
        assert_eq!(child.position(), Point::new(90.0, 40.0));
        assert_eq!(child.scale(), Vec2::new(2.0, 2.0));
        assert_eq!(child.unrotated_rect(), Rect::new(90.0, 40.0, 110.0, 60.0));
    }

    #[test]
    fn composition_rotates_about_parent_position() {
        let parent = GeometricData::new(
            Point::new(0.0, 0.0),
            Size::new(100.0, 100.0),
            Vec2::ZERO,
            Vec2::new(1.0, 1.0),
            FRAC_PI_2,
        );
        let mut child = GeometricData::new(
            Point::new(10.0, 0.0),
            Size::new(1.0, 1.0),
            Vec2::ZERO,
            Vec2::new(1.0, 1.0),
            0.0,
        );
        child.add_geometric_data(&parent);
        assert_relative_eq!(child.position().x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(child.position().y, 10.0, epsilon = 1e-9);
        assert_relative_eq!(child.angle(), FRAC_PI_2);
        assert_relative_eq!(child.cos_a(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(child.sin_a(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn contains_inverse_rotates_the_point() {
        // A 20x4 bar pivoted at its left end, rotated a quarter turn: it now points down.
        let data = GeometricData::new(
            Point::new(50.0, 50.0),
            Size::new(20.0, 4.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(1.0, 1.0),
            FRAC_PI_2,
        );
        assert!(data.contains(Point::new(50.0, 65.0), 0.0), "below the pivot");
        assert!(!data.contains(Point::new(65.0, 50.0), 0.0), "right of the pivot");
    }

    #[test]
    fn contains_padding_expands_the_rect() {
        let data = GeometricData::new(
            Point::new(0.0, 0.0),
            Size::new(10.0, 10.0),
            Vec2::ZERO,
            Vec2::new(1.0, 1.0),
            0.0,
        );
        let near = Point::new(20.0, 5.0);
        assert!(!data.contains(near, 0.0));
        assert!(data.contains(near, CONTROL_TOUCH_AREA));
    }

    #[test]
    fn transform_maps_local_corners_onto_polygon() {
        let data = GeometricData::new(
            Point::new(30.0, 40.0),
            Size::new(10.0, 20.0),
            Vec2::new(5.0, 10.0),
            Vec2::new(2.0, 1.0),
            0.3,
        );
        let tf = data.transform();
        let poly = data.polygon();
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 20.0),
            Point::new(0.0, 20.0),
        ];
        for (local, expected) in corners.iter().zip(poly) {
            let mapped = tf * *local;
            assert_relative_eq!(mapped.x, expected.x, epsilon = 1e-9);
            assert_relative_eq!(mapped.y, expected.y, epsilon = 1e-9);
        }
    }
}
