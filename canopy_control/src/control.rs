// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-control data.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use canopy_component::ComponentList;
use canopy_visual::ControlState;
use kurbo::{Point, Rect, Size, Vec2};

use crate::behavior::ControlBehavior;
use crate::event::{EventHandler, EventType};
use crate::id::ControlId;
use crate::view_state::ViewState;

/// A node of the control tree.
///
/// Read it through [`ControlSystem::control`](crate::ControlSystem::control); every mutation
/// goes through the system so lifecycle, input and registry bookkeeping stay consistent.
pub struct Control {
    pub(crate) parent: Option<ControlId>,
    pub(crate) children: Vec<ControlId>,

    pub(crate) name: String,
    pub(crate) tag: i32,
    pub(crate) classes: Vec<String>,
    pub(crate) properties: BTreeMap<String, String>,

    pub(crate) position: Point,
    pub(crate) size: Size,
    /// Relative pivot: `(0, 0)` is the top-left corner, `(1, 1)` the bottom-right one.
    pub(crate) pivot: Vec2,
    pub(crate) scale: Vec2,
    /// Radians.
    pub(crate) angle: f64,

    pub(crate) state: ControlState,
    pub(crate) view_state: ViewState,
    pub(crate) visible: bool,
    pub(crate) input_enabled: bool,
    pub(crate) exclusive_input: bool,
    pub(crate) multi_input: bool,

    pub(crate) input_processed: bool,
    pub(crate) iterator_corrupted: bool,
    /// Input-enabled controls in this subtree, this control included.
    pub(crate) input_processors: u32,
    pub(crate) touches_inside: u32,
    pub(crate) total_touches: u32,
    pub(crate) current_input_id: Option<u32>,

    pub(crate) layout_dirty: bool,
    pub(crate) layout_position_dirty: bool,
    pub(crate) layout_order_dirty: bool,
    pub(crate) style_dirty: bool,

    pub(crate) components: ComponentList,
    pub(crate) events: Vec<(EventType, EventHandler)>,
    pub(crate) behavior: Option<Rc<dyn ControlBehavior>>,
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("state", &self.state)
            .field("view_state", &self.view_state)
            .field("visible", &self.visible)
            .field("input_processors", &self.input_processors)
            .field("components", &self.components.len())
            .field("events", &self.events.len())
            .field("has_behavior", &self.behavior.is_some())
            .finish_non_exhaustive()
    }
}

impl Control {
    pub(crate) fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            name: String::new(),
            tag: 0,
            classes: Vec::new(),
            properties: BTreeMap::new(),
            position: Point::ZERO,
            size: Size::ZERO,
            pivot: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            angle: 0.0,
            state: ControlState::NORMAL,
            view_state: ViewState::Inactive,
            visible: true,
            input_enabled: true,
            exclusive_input: false,
            multi_input: false,
            input_processed: false,
            iterator_corrupted: false,
            input_processors: 1,
            touches_inside: 0,
            total_touches: 0,
            current_input_id: None,
            layout_dirty: false,
            layout_position_dirty: false,
            layout_order_dirty: false,
            style_dirty: false,
            components: ComponentList::new(),
            events: Vec::new(),
            behavior: None,
        }
    }

    /// Parent control.
    pub fn parent(&self) -> Option<ControlId> {
        self.parent
    }

    /// Children in paint order, back to front.
    pub fn children(&self) -> &[ControlId] {
        &self.children
    }

    /// Name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric tag.
    pub fn tag(&self) -> i32 {
        self.tag
    }

    /// Style classes.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Classes joined by single spaces.
    pub fn classes_string(&self) -> String {
        self.classes.join(" ")
    }

    /// A free-form property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// All free-form properties.
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Position of the pivot point in parent units.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Unscaled size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Relative pivot.
    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    /// Pivot point in unscaled control units.
    pub fn pivot_point(&self) -> Vec2 {
        Vec2::new(self.pivot.x * self.size.width, self.pivot.y * self.size.height)
    }

    /// Scale factors.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Rotation in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Rotation in degrees.
    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }

    /// Unscaled rect in parent units.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position - self.pivot_point(), self.size)
    }

    /// Interaction state bits.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Lifecycle state.
    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    /// At least active.
    pub fn is_active(&self) -> bool {
        self.view_state >= ViewState::Active
    }

    /// Visible.
    pub fn is_visible(&self) -> bool {
        self.view_state == ViewState::Visible
    }

    /// Own visibility flag.
    pub fn visibility_flag(&self) -> bool {
        self.visible
    }

    /// Whether the control takes input itself.
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Whether the control carries the disabled bit.
    pub fn is_disabled(&self) -> bool {
        self.state.contains(ControlState::DISABLED)
    }

    /// Whether the control carries the selected bit.
    pub fn is_selected(&self) -> bool {
        self.state.contains(ControlState::SELECTED)
    }

    /// Whether a press captures all input until released.
    pub fn exclusive_input(&self) -> bool {
        self.exclusive_input
    }

    /// Whether several touches may press the control at once.
    pub fn multi_input(&self) -> bool {
        self.multi_input
    }

    /// Input-enabled controls in this subtree.
    pub fn input_processors(&self) -> u32 {
        self.input_processors
    }

    /// Touches currently inside.
    pub fn touches_inside(&self) -> u32 {
        self.touches_inside
    }

    /// Touches currently tracked.
    pub fn total_touches(&self) -> u32 {
        self.total_touches
    }

    /// Layout needs to be recomputed.
    pub fn layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    /// Position changed since the last layout.
    pub fn layout_position_dirty(&self) -> bool {
        self.layout_position_dirty
    }

    /// Child order changed since the last layout.
    pub fn layout_order_dirty(&self) -> bool {
        self.layout_order_dirty
    }

    /// Style needs to be recomputed.
    pub fn style_dirty(&self) -> bool {
        self.style_dirty
    }

    /// Attached components.
    pub fn components(&self) -> &ComponentList {
        &self.components
    }

    /// Number of bound event handlers.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Attached behavior.
    pub fn behavior(&self) -> Option<&Rc<dyn ControlBehavior>> {
        self.behavior.as_ref()
    }
}
