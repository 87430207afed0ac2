// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control geometry and hit testing.
//!
//! Setters only record what changed; nothing is recomputed eagerly. Absolute data is
//! composed on demand from the ancestor chain.

use canopy_visual::{CONTROL_TOUCH_AREA, GeometricData};
use kurbo::{Point, Rect, Size, Vec2};

use crate::id::ControlId;
use crate::system::ControlSystem;

impl ControlSystem {
    /// Move the pivot point to `position` in parent units.
    pub fn set_position(&mut self, id: ControlId, position: Point) {
        if let Some(node) = self.node_mut(id)
            && node.position != position
        {
            node.position = position;
            node.layout_position_dirty = true;
        }
    }

    /// Resize, keeping the relative pivot.
    pub fn set_size(&mut self, id: ControlId, size: Size) {
        if let Some(node) = self.node_mut(id)
            && node.size != size
        {
            node.size = size;
            node.layout_dirty = true;
        }
    }

    /// Set the relative pivot, `(0, 0)` top-left to `(1, 1)` bottom-right.
    pub fn set_pivot(&mut self, id: ControlId, pivot: Vec2) {
        if let Some(node) = self.node_mut(id)
            && node.pivot != pivot
        {
            node.pivot = pivot;
            node.layout_position_dirty = true;
        }
    }

    /// Set the pivot in unscaled control units. A zero extent maps to a zero relative pivot.
    pub fn set_pivot_point(&mut self, id: ControlId, pivot_point: Vec2) {
        let Some(size) = self.control(id).map(|c| c.size) else {
            return;
        };
        let relative = |value: f64, extent: f64| if extent == 0.0 { 0.0 } else { value / extent };
        let pivot = Vec2::new(
            relative(pivot_point.x, size.width),
            relative(pivot_point.y, size.height),
        );
        self.set_pivot(id, pivot);
    }

    /// Set the scale factors.
    pub fn set_scale(&mut self, id: ControlId, scale: Vec2) {
        if let Some(node) = self.node_mut(id)
            && node.scale != scale
        {
            node.scale = scale;
            node.layout_position_dirty = true;
        }
    }

    /// Set the rotation in radians.
    pub fn set_angle(&mut self, id: ControlId, angle: f64) {
        if let Some(node) = self.node_mut(id)
            && node.angle != angle
        {
            node.angle = angle;
            node.layout_position_dirty = true;
        }
    }

    /// Set the rotation in degrees.
    pub fn set_angle_degrees(&mut self, id: ControlId, degrees: f64) {
        self.set_angle(id, degrees.to_radians());
    }

    /// Resize to `rect` and place its origin at `rect`'s origin, in parent units.
    pub fn set_rect(&mut self, id: ControlId, rect: Rect) {
        self.set_size(id, rect.size());
        let Some(pivot_point) = self.control(id).map(|c| c.pivot_point()) else {
            return;
        };
        self.set_position(id, rect.origin() + pivot_point);
    }

    /// Absolute position of the pivot point.
    pub fn absolute_position(&self, id: ControlId) -> Option<Point> {
        Some(self.geometric_data(id)?.position())
    }

    /// Move so the pivot lands on an absolute position.
    ///
    /// The parent's scale and rotation are not undone.
    pub fn set_absolute_position(&mut self, id: ControlId, position: Point) {
        let local = self.to_parent_units(id, position);
        self.set_position(id, local);
    }

    /// Unscaled rect placed at the absolute pivot position.
    pub fn absolute_rect(&self, id: ControlId) -> Option<Rect> {
        let control = self.control(id)?;
        let position = self.absolute_position(id)?;
        Some(Rect::from_origin_size(
            position - control.pivot_point(),
            control.size,
        ))
    }

    /// Resize and move to an absolute rect, with the same limits as
    /// [`set_absolute_position`](Self::set_absolute_position).
    pub fn set_absolute_rect(&mut self, id: ControlId, rect: Rect) {
        let origin = self.to_parent_units(id, rect.origin());
        self.set_rect(id, Rect::from_origin_size(origin, rect.size()));
    }

    fn to_parent_units(&self, id: ControlId, position: Point) -> Point {
        match self.parent(id).and_then(|p| self.geometric_data(p)) {
            Some(parent) => (position - parent.position() + parent.pivot_point()).to_point(),
            None => position,
        }
    }

    /// Geometric data of the control alone, relative to its parent.
    pub fn local_geometric_data(&self, id: ControlId) -> Option<GeometricData> {
        let c = self.control(id)?;
        Some(GeometricData::new(
            c.position,
            c.size,
            c.pivot_point(),
            c.scale,
            c.angle,
        ))
    }

    /// Absolute geometric data, composed through every ancestor and the base data.
    ///
    /// Not cached: each call walks the ancestor chain.
    pub fn geometric_data(&self, id: ControlId) -> Option<GeometricData> {
        let mut data = self.local_geometric_data(id)?;
        let parent = match self.parent(id) {
            Some(parent) => self.geometric_data(parent)?,
            None => self.config.base_geometric_data,
        };
        data.add_geometric_data(&parent);
        Some(data)
    }

    /// Whether an absolute point hits the control, optionally with touch padding on every
    /// side.
    pub fn is_point_inside(&self, id: ControlId, point: Point, expand: bool) -> bool {
        let padding = if expand { CONTROL_TOUCH_AREA } else { 0.0 };
        self.geometric_data(id)
            .is_some_and(|data| data.contains(point, padding))
    }

    // --- dirty flags ---

    pub(crate) fn set_layout_dirty(&mut self, id: ControlId) {
        if let Some(node) = self.node_mut(id) {
            node.layout_dirty = true;
        }
    }

    /// Clear the layout flags after a layout pass.
    pub fn reset_layout_dirty(&mut self, id: ControlId) {
        if let Some(node) = self.node_mut(id) {
            node.layout_dirty = false;
            node.layout_position_dirty = false;
            node.layout_order_dirty = false;
        }
    }

    /// Clear the style flag after a style pass.
    pub fn reset_style_dirty(&mut self, id: ControlId) {
        if let Some(node) = self.node_mut(id) {
            node.style_dirty = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ControlSystem, SystemConfig};
    use approx::assert_relative_eq;
    use canopy_visual::GeometricData;
    use kurbo::{Point, Rect, Size, Vec2};

    #[test]
    fn set_size_twice_is_a_no_op_the_second_time() {
        let mut system = ControlSystem::new();
        let id = system.create_control(Rect::ZERO);
        system.set_size(id, Size::new(40.0, 20.0));
        assert!(system.control(id).unwrap().layout_dirty());
        system.reset_layout_dirty(id);
        system.set_size(id, Size::new(40.0, 20.0));
        assert!(
            !system.control(id).unwrap().layout_dirty(),
            "same size leaves layout clean"
        );
    }

    #[test]
    fn pivot_follows_size() {
        let mut system = ControlSystem::new();
        let id = system.create_control(Rect::new(0.0, 0.0, 10.0, 10.0));
        system.set_pivot_point(id, Vec2::new(5.0, 5.0));
        assert_eq!(system.control(id).unwrap().pivot(), Vec2::new(0.5, 0.5));
        system.set_size(id, Size::new(20.0, 40.0));
        assert_eq!(
            system.control(id).unwrap().pivot_point(),
            Vec2::new(10.0, 20.0)
        );
        let zero = system.create_control(Rect::ZERO);
        system.set_pivot_point(zero, Vec2::new(3.0, 3.0));
        assert_eq!(system.control(zero).unwrap().pivot(), Vec2::ZERO);
    }

    #[test]
    fn set_rect_keeps_the_origin_with_a_pivot() {
        let mut system = ControlSystem::new();
        let id = system.create_control(Rect::ZERO);
        system.set_pivot(id, Vec2::new(0.5, 0.5));
        system.set_rect(id, Rect::new(10.0, 20.0, 30.0, 60.0));
        let control = system.control(id).unwrap();
        assert_eq!(control.position(), Point::new(20.0, 40.0));
        assert_eq!(control.rect(), Rect::new(10.0, 20.0, 30.0, 60.0));
    }

    #[test]
    fn geometric_data_composes_parents_and_is_stable() {
        let mut system = ControlSystem::new();
        let parent = system.create_control(Rect::new(100.0, 100.0, 300.0, 300.0));
        let child = system.create_control(Rect::new(10.0, 20.0, 30.0, 40.0));
        system.add_control(parent, child);
        system.set_scale(parent, Vec2::new(2.0, 2.0));

        let first = system.geometric_data(child).unwrap();
        let second = system.geometric_data(child).unwrap();
        assert_eq!(first, second, "pure function of the current state");
        assert_relative_eq!(first.position().x, 120.0);
        assert_relative_eq!(first.position().y, 140.0);
        assert_eq!(first.scale(), Vec2::new(2.0, 2.0));
        assert_eq!(
            system.absolute_rect(child),
            Some(Rect::new(120.0, 140.0, 140.0, 160.0))
        );
    }

    #[test]
    fn base_geometric_data_offsets_roots() {
        let config = SystemConfig {
            base_geometric_data: GeometricData::new(
                Point::new(5.0, 5.0),
                Size::ZERO,
                Vec2::ZERO,
                Vec2::new(1.0, 1.0),
                0.0,
            ),
            ..SystemConfig::default()
        };
        let mut system = ControlSystem::with_config(config);
        let id = system.create_control(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(system.absolute_position(id), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn absolute_position_round_trips_through_an_unscaled_parent() {
        let mut system = ControlSystem::new();
        let parent = system.create_control(Rect::new(50.0, 50.0, 150.0, 150.0));
        let child = system.create_control(Rect::ZERO);
        system.add_control(parent, child);
        system.set_absolute_position(child, Point::new(70.0, 90.0));
        assert_eq!(system.control(child).unwrap().position(), Point::new(20.0, 40.0));
        assert_eq!(system.absolute_position(child), Some(Point::new(70.0, 90.0)));
        system.set_absolute_rect(child, Rect::new(60.0, 60.0, 70.0, 80.0));
        assert_eq!(system.absolute_rect(child), Some(Rect::new(60.0, 60.0, 70.0, 80.0)));
    }

    #[test]
    fn hit_testing_with_rotation_and_padding() {
        let mut system = ControlSystem::new();
        let id = system.create_control(Rect::new(0.0, 0.0, 100.0, 20.0));
        assert!(system.is_point_inside(id, Point::new(50.0, 10.0), false));
        assert!(!system.is_point_inside(id, Point::new(50.0, 30.0), false));
        assert!(
            system.is_point_inside(id, Point::new(50.0, 30.0), true),
            "touch padding widens the rect"
        );

        system.set_angle_degrees(id, 90.0);
        assert_relative_eq!(system.control(id).unwrap().angle_degrees(), 90.0);
        assert!(system.is_point_inside(id, Point::new(-10.0, 50.0), false));
        assert!(!system.is_point_inside(id, Point::new(50.0, 10.0), false));
    }
}
