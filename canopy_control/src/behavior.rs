// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-control hooks.

use crate::event::{InputHandled, UiEvent};
use crate::id::ControlId;
use crate::system::ControlSystem;

/// Hooks a control runs at lifecycle and input points.
///
/// Every hook receives the whole system and may mutate the tree, including the control it
/// runs for. Behaviors are shared by reference count, so any per-control state belongs in
/// interior-mutable fields. A cloned control shares its source's behavior.
///
/// ```
/// use canopy_control::{ControlBehavior, ControlId, ControlSystem, ViewState};
/// use core::cell::Cell;
/// use kurbo::Rect;
/// use std::rc::Rc;
///
/// #[derive(Default)]
/// struct CountShows(Cell<u32>);
///
/// impl ControlBehavior for CountShows {
///     fn on_visible(&self, _: &mut ControlSystem, _: ControlId) {
///         self.0.set(self.0.get() + 1);
///     }
/// }
///
/// let mut system = ControlSystem::new();
/// let screen = system.create_control(Rect::new(0.0, 0.0, 100.0, 100.0));
/// let counter = Rc::new(CountShows::default());
/// system.set_behavior(screen, Some(counter.clone()));
/// system.set_screen(Some(screen));
/// assert_eq!(system.view_state(screen), Some(ViewState::Visible));
/// assert_eq!(counter.0.get(), 1);
/// ```
pub trait ControlBehavior {
    /// The control became active.
    fn on_active(&self, _system: &mut ControlSystem, _id: ControlId) {}

    /// The control became inactive.
    fn on_inactive(&self, _system: &mut ControlSystem, _id: ControlId) {}

    /// The control became visible.
    fn on_visible(&self, _system: &mut ControlSystem, _id: ControlId) {}

    /// The control stopped being visible.
    fn on_invisible(&self, _system: &mut ControlSystem, _id: ControlId) {}

    /// Input that reached the control after its own bookkeeping.
    fn input(&self, _system: &mut ControlSystem, _id: ControlId, event: &mut UiEvent) {
        event.set_handled(InputHandled::None);
    }

    /// A touch captured by the control was cancelled.
    fn input_cancelled(&self, _system: &mut ControlSystem, _id: ControlId, _event: &UiEvent) {}

    /// Replaces the control's own phase handling when it returns `true`.
    fn process_input(
        &self,
        _system: &mut ControlSystem,
        _id: ControlId,
        _event: &mut UiEvent,
    ) -> bool {
        false
    }

    /// The control took focus.
    fn on_focused(&self, _system: &mut ControlSystem, _id: ControlId) {}

    /// The control lost focus.
    fn on_focus_lost(&self, _system: &mut ControlSystem, _id: ControlId) {}

    /// A short tap ended outside the focused control.
    fn on_touch_outside_focus(&self, _system: &mut ControlSystem, _id: ControlId) {}

    /// The control became the hovered control.
    fn did_set_hovered(&self, _system: &mut ControlSystem, _id: ControlId) {}

    /// The control stopped being the hovered control.
    fn did_remove_hovered(&self, _system: &mut ControlSystem, _id: ControlId) {}

    /// Per-frame update of controls carrying an update component.
    fn update(&self, _system: &mut ControlSystem, _id: ControlId, _dt: f64) {}
}
