// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-control input handling: the press state machine, cancellation, hover, focus and
//! exclusive capture.
//!
//! ## Press bookkeeping
//!
//! A tracked touch is locked by the control that accepted its `Began` phase. Only the locker
//! sees the touch's `Drag` and `Ended` phases. While it is pressed the locker counts its touches
//! and how many of them are currently inside it:
//!
//! - `Began` inside: `PRESSED_INSIDE`, both counters up, `TouchDown`.
//! - `Drag` across the edge (hit tested with [`CONTROL_TOUCH_AREA`] padding): the inside
//!   counter follows and the state flips between `PRESSED_INSIDE` and `PRESSED_OUTSIDE` when it
//!   reaches zero or leaves it.
//! - `Ended`: the counters go down; releasing the last touch fires `TouchUpInside` or
//!   `TouchUpOutside` and returns the control to `NORMAL`.
//!
//! Cancellation reverses the same counters and never fires the touch-up events. It is safe to
//! apply to a touch whose locker was never pressed, or was already released.
//!
//! [`CONTROL_TOUCH_AREA`]: canopy_visual::CONTROL_TOUCH_AREA

use alloc::vec::Vec;

use canopy_component::{FocusComponent, ModalInput};
use canopy_visual::ControlState;
use kurbo::Point;
use smallvec::SmallVec;

use crate::event::{EventType, InputHandled, Phase, TouchState, UiEvent};
use crate::id::ControlId;
use crate::system::ControlSystem;
use crate::view_state::ViewState;

/// The previous press, for tap counting.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LastClick {
    pub(crate) touch_id: u32,
    pub(crate) timestamp: f64,
    pub(crate) point: Point,
    pub(crate) tap_count: u32,
    pub(crate) ended: bool,
    pub(crate) touch_locker: Option<ControlId>,
}

/// Input singletons shared by every control.
#[derive(Debug, Default)]
pub(crate) struct InputState {
    pub(crate) exclusive_locker: Option<ControlId>,
    pub(crate) exclusive_touch_id: u32,
    pub(crate) hovered: Option<ControlId>,
    pub(crate) focused: Option<ControlId>,
    pub(crate) modal: Option<ControlId>,
    /// Touches between their `Began` and their removal after `Ended` or `Cancelled`.
    pub(crate) touches: Vec<UiEvent>,
    /// The key, move, wheel or joystick event being dispatched.
    pub(crate) transient: Option<UiEvent>,
    pub(crate) focused_when_began: Option<ControlId>,
    pub(crate) position_when_began: Point,
    pub(crate) lock_counter: u32,
    pub(crate) last_click: LastClick,
}

/// Where the event being dispatched is stored.
///
/// Hooks run with `&mut ControlSystem` and may cancel or replace tracked touches, so dispatch
/// code re-reads the event through its slot after every call out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A tracked touch, by touch id.
    Touch(u32),
    /// [`InputState::transient`].
    Transient,
}

/// Touch ids snapshotted before a loop that may cancel touches.
pub(crate) type TouchIds = SmallVec<[u32; 4]>;

impl ControlSystem {
    // --- singletons ---

    /// The control under the pointer.
    pub fn hovered_control(&self) -> Option<ControlId> {
        self.input.hovered
    }

    /// The control that receives key events.
    pub fn focused_control(&self) -> Option<ControlId> {
        self.input.focused
    }

    /// The modal input root, if any control currently claims it.
    pub fn modal_control(&self) -> Option<ControlId> {
        self.input.modal
    }

    /// The control holding the exclusive input lock.
    pub fn exclusive_input_locker(&self) -> Option<ControlId> {
        self.input.exclusive_locker
    }

    /// Touch id the exclusive input lock was taken with.
    pub fn exclusive_input_touch(&self) -> Option<u32> {
        self.input
            .exclusive_locker
            .map(|_| self.input.exclusive_touch_id)
    }

    /// Touches currently being tracked.
    pub fn tracked_touches(&self) -> &[UiEvent] {
        &self.input.touches
    }

    // --- event slots ---

    pub(crate) fn event(&self, slot: Slot) -> Option<&UiEvent> {
        match slot {
            Slot::Touch(touch_id) => self.input.touches.iter().find(|e| e.touch_id == touch_id),
            Slot::Transient => self.input.transient.as_ref(),
        }
    }

    pub(crate) fn event_mut(&mut self, slot: Slot) -> Option<&mut UiEvent> {
        match slot {
            Slot::Touch(touch_id) => self
                .input
                .touches
                .iter_mut()
                .find(|e| e.touch_id == touch_id),
            Slot::Transient => self.input.transient.as_mut(),
        }
    }

    pub(crate) fn touch_ids(&self) -> TouchIds {
        self.input.touches.iter().map(|e| e.touch_id).collect()
    }

    fn call_input(&mut self, id: ControlId, slot: Slot) {
        let Some(behavior) = self.behavior_of(id) else {
            return;
        };
        let Some(mut event) = self.event(slot).copied() else {
            return;
        };
        behavior.input(self, id, &mut event);
        if let Some(stored) = self.event_mut(slot) {
            stored.set_handled(event.handled);
        }
    }

    fn call_process_input(&mut self, id: ControlId, slot: Slot) -> bool {
        let Some(behavior) = self.behavior_of(id) else {
            return false;
        };
        let Some(mut event) = self.event(slot).copied() else {
            return false;
        };
        let consumed = behavior.process_input(self, id, &mut event);
        if let Some(stored) = self.event_mut(slot) {
            stored.set_handled(event.handled);
        }
        consumed
    }

    fn perform_event_with_slot(&mut self, id: ControlId, ty: EventType, slot: Slot) {
        let snapshot = self.event(slot).copied();
        self.perform_event(id, ty, snapshot.as_ref());
    }

    // --- dispatch into a subtree ---

    /// Offer an event to `id`'s subtree, front-most child first, then to `id` itself.
    pub(crate) fn system_input(&mut self, id: ControlId, slot: Slot) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.input_processed = true;
        if !node.visible {
            return false;
        }
        let Some(event) = self.event(slot).copied() else {
            return false;
        };
        if matches!(
            event.phase,
            Phase::Began | Phase::Move | Phase::Wheel | Phase::Cancelled
        ) && self.clips_content(id)
            && !self.is_point_inside(id, event.point, false)
        {
            return false;
        }

        let children = self.children(id).to_vec();
        for child in children {
            if let Some(node) = self.node_mut(child) {
                node.input_processed = false;
            }
        }

        let mut i = 0;
        loop {
            let Some(node) = self.node_mut(id) else {
                return false;
            };
            node.iterator_corrupted = false;
            let len = node.children.len();
            if i >= len {
                break;
            }
            let child = node.children[len - 1 - i];
            if let Some(c) = self.control(child)
                && !c.input_processed
            {
                if c.input_processors > 0 && self.system_input(child, slot) {
                    return true;
                }
                if self.control(id).is_some_and(|n| n.iterator_corrupted) {
                    i = 0;
                    continue;
                }
            }
            i += 1;
        }
        self.system_process_input(id, slot)
    }

    /// Run `id`'s own phase handling.
    pub(crate) fn system_process_input(&mut self, id: ControlId, slot: Slot) -> bool {
        let Some(node) = self.control(id) else {
            return false;
        };
        if !node.input_enabled || !node.visible || node.state.contains(ControlState::DISABLED) {
            return false;
        }
        if self.input.exclusive_locker.is_some_and(|locker| locker != id) {
            return false;
        }
        if self.call_process_input(id, slot) {
            return true;
        }
        let Some(event) = self.event(slot).copied() else {
            return false;
        };
        match event.phase {
            Phase::KeyDown
            | Phase::KeyDownRepeat
            | Phase::KeyUp
            | Phase::Char
            | Phase::CharRepeat
            | Phase::Joystick => {
                self.call_input(id, slot);
                false
            }
            Phase::Move => {
                if event.touch_locker.is_none() && self.is_point_inside(id, event.point, false) {
                    self.set_hovered_control(Some(id));
                    self.call_input(id, slot);
                    return true;
                }
                false
            }
            Phase::Wheel => {
                if self.is_point_inside(id, event.point, false) {
                    self.call_input(id, slot);
                    return true;
                }
                false
            }
            Phase::Began => self.process_began(id, slot, &event),
            Phase::Drag => self.process_drag(id, slot, &event),
            Phase::Ended => self.process_ended(id, slot, &event),
            Phase::Cancelled | Phase::Gesture => false,
        }
    }

    fn hover_bit(&self) -> ControlState {
        if self.config.input.touch_only {
            ControlState::empty()
        } else {
            ControlState::HOVER
        }
    }

    fn process_began(&mut self, id: ControlId, slot: Slot, event: &UiEvent) -> bool {
        if event.touch_locker.is_some() || !self.is_point_inside(id, event.point, false) {
            return false;
        }
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if !node.multi_input && node.current_input_id.is_some() {
            if let Some(stored) = self.event_mut(slot) {
                stored.touch_locker = Some(id);
            }
            return true;
        }
        node.touches_inside += 1;
        node.total_touches += 1;
        let exclusive = node.exclusive_input;
        let multi = node.multi_input;
        self.change_state(id, ControlState::PRESSED_INSIDE, ControlState::NORMAL);
        // The locker is set before TouchDown so its handlers may disable the control.
        if let Some(stored) = self.event_mut(slot) {
            stored.touch_state = TouchState::Inside;
            stored.touch_locker = Some(id);
        }
        if exclusive {
            self.set_exclusive_input_locker(Some(id), event.touch_id);
        }
        if self.input.focused != Some(id) && self.can_focus(id) {
            self.set_focused_control(Some(id));
        }
        if !multi && let Some(node) = self.node_mut(id) {
            node.current_input_id = Some(event.touch_id);
        }
        self.perform_event_with_slot(id, EventType::TouchDown, slot);
        self.call_input(id, slot);
        true
    }

    fn owns_touch(&self, id: ControlId, event: &UiEvent) -> bool {
        self.control(id)
            .is_some_and(|c| c.multi_input || c.current_input_id == Some(event.touch_id))
    }

    fn process_drag(&mut self, id: ControlId, slot: Slot, event: &UiEvent) -> bool {
        if event.touch_locker != Some(id) {
            return false;
        }
        if !self.owns_touch(id, event) {
            return true;
        }
        let pressed = self
            .control(id)
            .is_some_and(|c| c.state.intersects(ControlState::PRESSED));
        if pressed {
            if self.is_point_inside(id, event.point, true) {
                if event.touch_state == TouchState::Outside {
                    if let Some(stored) = self.event_mut(slot) {
                        stored.touch_state = TouchState::Inside;
                    }
                    if let Some(node) = self.node_mut(id) {
                        node.touches_inside += 1;
                    }
                    let add = ControlState::PRESSED_INSIDE | self.hover_bit();
                    self.change_state(id, add, ControlState::PRESSED_OUTSIDE);
                }
            } else if event.touch_state == TouchState::Inside {
                if let Some(stored) = self.event_mut(slot) {
                    stored.touch_state = TouchState::Outside;
                }
                let inside = self.node_mut(id).map_or(0, |node| {
                    node.touches_inside = node.touches_inside.saturating_sub(1);
                    node.touches_inside
                });
                if inside == 0 {
                    self.change_state(
                        id,
                        ControlState::PRESSED_OUTSIDE,
                        ControlState::PRESSED_INSIDE,
                    );
                }
            }
        }
        self.call_input(id, slot);
        true
    }

    fn process_ended(&mut self, id: ControlId, slot: Slot, event: &UiEvent) -> bool {
        if event.touch_locker != Some(id) {
            return false;
        }
        if self.owns_touch(id, event) {
            self.call_input(id, slot);
            self.release_touch(id, slot);
        }
        if let Some(stored) = self.event_mut(slot) {
            stored.touch_locker = None;
        }
        true
    }

    fn release_touch(&mut self, id: ControlId, slot: Slot) {
        let Some(event) = self.event(slot).copied() else {
            return;
        };
        let hover = self.hover_bit();
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if node.current_input_id == Some(event.touch_id) {
            node.current_input_id = None;
        }
        if node.total_touches == 0 {
            return;
        }
        node.total_touches -= 1;
        let total = node.total_touches;
        if event.touch_state == TouchState::Inside {
            node.touches_inside = node.touches_inside.saturating_sub(1);
        }
        let inside = node.touches_inside;
        if event.touch_state == TouchState::Inside && total == 0 {
            self.add_state(id, hover);
        }
        if let Some(stored) = self.event_mut(slot) {
            stored.touch_state = TouchState::Released;
        }

        if total == 0 {
            let ty = if self.is_point_inside(id, event.point, true) {
                EventType::TouchUpInside
            } else {
                EventType::TouchUpOutside
            };
            self.perform_event_with_slot(id, ty, slot);
            self.change_state(id, ControlState::NORMAL, ControlState::PRESSED);
            if self.input.exclusive_locker == Some(id) {
                self.set_exclusive_input_locker(None, 0);
            }
        } else if inside == 0 {
            self.change_state(
                id,
                ControlState::PRESSED_OUTSIDE,
                ControlState::PRESSED_INSIDE | hover,
            );
        }
    }

    /// Revert `id`'s press bookkeeping for the touch in `slot`.
    pub(crate) fn system_input_cancelled(&mut self, id: ControlId, slot: Slot) {
        let Some(event) = self.event(slot).copied() else {
            return;
        };
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if event.touch_state != TouchState::Released {
            node.total_touches = node.total_touches.saturating_sub(1);
        }
        if event.touch_state == TouchState::Inside {
            node.touches_inside = node.touches_inside.saturating_sub(1);
        }
        if node.current_input_id == Some(event.touch_id) {
            node.current_input_id = None;
        }
        if node.touches_inside == 0 {
            self.change_state(id, ControlState::NORMAL, ControlState::PRESSED);
            if self.input.exclusive_locker == Some(id) {
                self.set_exclusive_input_locker(None, 0);
            }
        }
        let Some(stored) = self.event_mut(slot) else {
            return;
        };
        stored.touch_state = TouchState::Released;
        stored.touch_locker = None;
        let released = *stored;
        if let Some(behavior) = self.behavior_of(id) {
            behavior.input_cancelled(self, id, &released);
        }
    }

    // --- exclusive capture ---

    /// Give `locker` exclusive input, cancelling every other touch it does not already lock.
    ///
    /// `None` releases the lock.
    pub fn set_exclusive_input_locker(&mut self, locker: Option<ControlId>, touch_id: u32) {
        self.input.exclusive_locker = None;
        if let Some(locker) = locker {
            for other in self.touch_ids() {
                let Some(event) = self.event(Slot::Touch(other)) else {
                    continue;
                };
                if other != touch_id && event.touch_locker != Some(locker) {
                    self.cancel_input(Slot::Touch(other));
                }
            }
        }
        self.input.exclusive_locker = locker;
        self.input.exclusive_touch_id = touch_id;
    }

    // --- hover ---

    /// Move the hover to `hovered`. The previous control is notified first.
    pub fn set_hovered_control(&mut self, hovered: Option<ControlId>) {
        let hovered = hovered.filter(|id| self.is_alive(*id));
        if self.input.hovered == hovered {
            return;
        }
        if let Some(previous) = self.input.hovered {
            self.perform_event(previous, EventType::HoveredRemoved, None);
            self.remove_state(previous, ControlState::HOVER);
            if let Some(behavior) = self.behavior_of(previous) {
                behavior.did_remove_hovered(self, previous);
            }
        }
        self.input.hovered = hovered;
        if let Some(next) = hovered {
            self.add_state(next, ControlState::HOVER);
            self.perform_event(next, EventType::HoveredSet, None);
            if let Some(behavior) = self.behavior_of(next) {
                behavior.did_set_hovered(self, next);
            }
        }
    }

    // --- focus ---

    /// Whether `id` can take focus: it carries an enabled focus component and is visible,
    /// enabled and input-enabled.
    pub fn can_focus(&self, id: ControlId) -> bool {
        let Some(control) = self.control(id) else {
            return false;
        };
        self.component::<FocusComponent>(id, 0)
            .is_some_and(|focus| focus.enabled)
            && control.view_state == ViewState::Visible
            && !control.state.contains(ControlState::DISABLED)
            && control.input_enabled
    }

    /// Move the focus. The previous control loses it first.
    ///
    /// Returns `false`, leaving the focus alone, when `focused` cannot take focus.
    pub fn set_focused_control(&mut self, focused: Option<ControlId>) -> bool {
        if let Some(next) = focused
            && !self.can_focus(next)
        {
            log::debug!("control {next} cannot take focus");
            return false;
        }
        if self.input.focused == focused {
            return true;
        }
        if let Some(previous) = self.input.focused {
            self.remove_state(previous, ControlState::FOCUSED);
            self.perform_event(previous, EventType::FocusLost, None);
            if let Some(behavior) = self.behavior_of(previous) {
                behavior.on_focus_lost(self, previous);
            }
        }
        self.input.focused = focused;
        if let Some(next) = focused {
            self.add_state(next, ControlState::FOCUSED);
            self.perform_event(next, EventType::FocusSet, None);
            if let Some(behavior) = self.behavior_of(next) {
                behavior.on_focused(self, next);
            }
        }
        true
    }

    // --- visibility ---

    pub(crate) fn on_control_visible(&mut self, id: ControlId) {
        if self.has_component::<ModalInput>(id) {
            self.update_modal_control();
        }
    }

    pub(crate) fn on_control_invisible(&mut self, id: ControlId) {
        if self.input.hovered == Some(id) {
            self.set_hovered_control(None);
        }
        if self.control(id).is_some_and(|c| c.input_enabled) {
            self.cancel_inputs(id, false);
        }
        if self.has_component::<ModalInput>(id) {
            self.update_modal_control();
        }
        if self.input.focused == Some(id) {
            self.set_focused_control(None);
        }
    }

    /// Drop every reference to a control about to be freed.
    pub(crate) fn forget_control(&mut self, id: ControlId) {
        let input = &mut self.input;
        for slot in [
            &mut input.exclusive_locker,
            &mut input.hovered,
            &mut input.focused,
            &mut input.modal,
            &mut input.focused_when_began,
            &mut input.last_click.touch_locker,
        ] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        for event in &mut input.touches {
            if event.touch_locker == Some(id) {
                event.touch_locker = None;
                event.touch_state = TouchState::Released;
            }
        }
    }

    /// Whether the event in `slot` was consumed hard enough to stop bubbling.
    pub(crate) fn is_handled_hard(&self, slot: Slot) -> bool {
        self.event(slot)
            .is_some_and(|e| e.handled == InputHandled::Hard)
    }
}
