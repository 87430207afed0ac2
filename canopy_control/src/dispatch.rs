// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing input events from the platform to the control trees.
//!
//! [`ControlSystem::on_input`] is the entry point. Events are routed by phase:
//!
//! - Key and text phases go to the focused control (or the modal control, or the screen) and
//!   bubble up through its ancestors.
//! - Touch phases are tracked by touch id and offered to the modal control, or to the popup
//!   container and then the screen. Finished touches are cancelled and forgotten after
//!   dispatch.
//! - Everything else (move, wheel, joystick, gestures) is offered like a touch but not tracked.

use crate::event::{Phase, TouchState, UiEvent};
use crate::id::ControlId;
use crate::input::Slot;
use crate::system::ControlSystem;
use crate::view_state::ViewState;

/// A tap that ends farther than this from where it began is a drag, and does not count as a
/// touch outside the focused control.
const TOUCH_OUTSIDE_FOCUS_DRAG: f64 = 20.0;

impl ControlSystem {
    /// Feed one platform event into the system.
    ///
    /// The tap count is filled in first. Events are dropped while input is locked. On return
    /// `event` carries the touch locker and the handled level the dispatch produced.
    ///
    /// ```
    /// use canopy_control::{ControlSystem, Phase, UiEvent};
    /// use kurbo::{Point, Rect};
    ///
    /// let mut system = ControlSystem::new();
    /// let screen = system.create_control(Rect::new(0.0, 0.0, 100.0, 100.0));
    /// let button = system.create_control(Rect::new(10.0, 10.0, 40.0, 40.0));
    /// system.add_control(screen, button);
    /// system.set_screen(Some(screen));
    ///
    /// let mut press = UiEvent::touch(Phase::Began, 1, Point::new(20.0, 20.0), 0.0);
    /// assert!(system.on_input(&mut press));
    /// assert_eq!(press.touch_locker(), Some(button));
    /// assert_eq!(press.tap_count, 1);
    /// ```
    pub fn on_input(&mut self, event: &mut UiEvent) -> bool {
        event.tap_count = self.calculate_tap_count(event);
        if self.input.lock_counter > 0 {
            log::trace!("input locked, dropping {:?}", event.phase);
            return false;
        }
        let processed = self.handle_event(event);
        if let Some(locker) = event.touch_locker {
            self.input.last_click.touch_locker = Some(locker);
        }
        processed
    }

    /// Route an event by phase, without tap counting or the input lock.
    pub fn handle_event(&mut self, event: &mut UiEvent) -> bool {
        let processed = if self.screen.is_none() {
            false
        } else if event.phase.is_key() {
            self.handle_key_event(event)
        } else if event.phase.is_touch() {
            self.handle_touch_event(event)
        } else {
            self.handle_other_event(event)
        };
        if !processed {
            log::trace!("{:?} event not processed", event.phase);
        }

        let finished: crate::input::TouchIds = self
            .input
            .touches
            .iter()
            .filter(|e| e.phase.is_finished())
            .map(|e| e.touch_id)
            .collect();
        for touch_id in finished {
            self.cancel_input(Slot::Touch(touch_id));
            self.input.touches.retain(|e| e.touch_id != touch_id);
        }
        processed
    }

    fn handle_touch_event(&mut self, event: &mut UiEvent) -> bool {
        let touch_id = event.touch_id;
        match self.input.touches.iter_mut().find(|e| e.touch_id == touch_id) {
            Some(tracked) => {
                tracked.point = event.point;
                tracked.timestamp = event.timestamp;
                tracked.phase = event.phase;
                tracked.tap_count = event.tap_count;
                tracked.handled = event.handled;
                tracked.modifiers = event.modifiers;
            }
            None => self.input.touches.push(UiEvent {
                touch_state: TouchState::Released,
                touch_locker: None,
                ..*event
            }),
        }
        let slot = Slot::Touch(touch_id);

        if event.phase == Phase::Began {
            self.input.focused_when_began = self.input.focused;
            self.input.position_when_began = event.point;
        }

        let processed = self.offer_to_roots(slot);

        if event.phase == Phase::Ended {
            let point = self.event(slot).map_or(event.point, |e| e.point);
            self.check_touch_outside_focus(point);
        }

        if let Some(tracked) = self.event(slot) {
            event.touch_locker = tracked.touch_locker;
            event.set_handled(tracked.handled);
        }
        processed
    }

    fn check_touch_outside_focus(&mut self, point: kurbo::Point) {
        if let Some(focused) = self.input.focused {
            let unchanged = self.input.focused_when_began == Some(focused);
            let dragged = (self.input.position_when_began - point).hypot2()
                >= TOUCH_OUTSIDE_FOCUS_DRAG * TOUCH_OUTSIDE_FOCUS_DRAG;
            if unchanged
                && !dragged
                && !self.is_point_inside(focused, point, false)
                && let Some(behavior) = self.behavior_of(focused)
            {
                behavior.on_touch_outside_focus(self, focused);
            }
        }
        self.input.focused_when_began = None;
    }

    fn offer_to_roots(&mut self, slot: Slot) -> bool {
        if let Some(modal) = self.input.modal {
            return self.system_input(modal, slot);
        }
        let popups = self.popup_container;
        if self.system_input(popups, slot) {
            return true;
        }
        let screen = self.screen;
        screen.is_some_and(|screen| self.system_input(screen, slot))
    }

    /// Run `f` with `event` stored as the transient event, then copy the result back.
    fn with_transient(&mut self, event: &mut UiEvent, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let stored = UiEvent {
            touch_state: TouchState::Released,
            touch_locker: None,
            ..*event
        };
        let previous = self.input.transient.replace(stored);
        let processed = f(self);
        if let Some(done) = self.input.transient {
            event.set_handled(done.handled);
        }
        self.input.transient = previous;
        processed
    }

    fn handle_key_event(&mut self, event: &mut UiEvent) -> bool {
        self.with_transient(event, |system| {
            let root = system.input.modal.or(system.screen);
            let mut current = system.input.focused.or(root);
            while let Some(id) = current {
                if system.system_process_input(id, Slot::Transient)
                    || system.is_handled_hard(Slot::Transient)
                {
                    return true;
                }
                if Some(id) == root {
                    break;
                }
                current = system.parent(id);
            }
            false
        })
    }

    fn handle_other_event(&mut self, event: &mut UiEvent) -> bool {
        self.with_transient(event, |system| system.offer_to_roots(Slot::Transient))
    }

    // --- cancellation ---

    /// Cancel one tracked touch: its locker is told first, then the screen.
    pub(crate) fn cancel_input(&mut self, slot: Slot) {
        let Some(event) = self.event(slot) else {
            return;
        };
        let locker = event.touch_locker;
        if let Some(locker) = locker {
            self.system_input_cancelled(locker, slot);
        }
        if let Some(screen) = self.screen
            && locker != Some(screen)
        {
            self.system_input_cancelled(screen, slot);
        }
    }

    /// Cancel the tracked touch with `touch_id`.
    pub fn cancel_touch(&mut self, touch_id: u32) {
        self.cancel_input(Slot::Touch(touch_id));
    }

    /// Cancel and forget every tracked touch. Tap counting starts over.
    pub fn cancel_all_inputs(&mut self) {
        let last = &mut self.input.last_click;
        last.touch_locker = None;
        last.tap_count = 0;
        last.ended = false;
        for touch_id in self.touch_ids() {
            self.cancel_input(Slot::Touch(touch_id));
        }
        self.input.touches.clear();
    }

    /// Cancel the touches locked by `id`, or with `hierarchical` by `id` or a descendant.
    ///
    /// Without `hierarchical` only the first touch locked by `id` is cancelled.
    pub fn cancel_inputs(&mut self, id: ControlId, hierarchical: bool) {
        for touch_id in self.touch_ids() {
            let Some(locker) = self.event(Slot::Touch(touch_id)).and_then(|e| e.touch_locker)
            else {
                continue;
            };
            if !hierarchical {
                if locker == id {
                    self.cancel_input(Slot::Touch(touch_id));
                    break;
                }
                continue;
            }
            if locker == id || self.is_ancestor(id, locker) {
                self.cancel_input(Slot::Touch(touch_id));
            }
        }
    }

    /// Hand a tracked touch over to `target`, as if `target` had accepted it.
    ///
    /// The previous locker is cancelled. `target` counts the touch but its state bits are left
    /// alone; it takes or releases the exclusive lock according to its own flag.
    pub fn switch_input_to_control(&mut self, touch_id: u32, target: ControlId) {
        let slot = Slot::Touch(touch_id);
        if self.event(slot).is_none() || !self.is_alive(target) {
            return;
        }
        self.cancel_input(slot);
        let Some(point) = self.event(slot).map(|e| e.point) else {
            return;
        };
        let inside = self.is_point_inside(target, point, false);
        if let Some(stored) = self.event_mut(slot) {
            stored.touch_state = if inside {
                TouchState::Inside
            } else {
                TouchState::Outside
            };
            stored.touch_locker = Some(target);
        }
        let Some(node) = self.node_mut(target) else {
            return;
        };
        if inside {
            node.touches_inside += 1;
        }
        node.current_input_id = Some(touch_id);
        node.total_touches += 1;
        if node.exclusive_input {
            self.set_exclusive_input_locker(Some(target), touch_id);
        } else {
            self.set_exclusive_input_locker(None, 0);
        }
    }

    /// Whether any tracked touch is locked by `id`.
    pub fn is_any_input_locked_by(&self, id: ControlId) -> bool {
        self.input
            .touches
            .iter()
            .any(|e| e.touch_locker == Some(id))
    }

    // --- locking ---

    /// Stop accepting input until a matching [`unlock_input`](Self::unlock_input). Every
    /// tracked touch is cancelled. Returns the new lock depth.
    pub fn lock_input(&mut self) -> u32 {
        self.input.lock_counter += 1;
        self.cancel_all_inputs();
        self.input.lock_counter
    }

    /// Release one [`lock_input`](Self::lock_input). Returns the remaining lock depth.
    pub fn unlock_input(&mut self) -> u32 {
        ui_assert!(self.input.lock_counter > 0, "unlock_input without a matching lock");
        self.input.lock_counter = self.input.lock_counter.saturating_sub(1);
        if self.input.lock_counter == 0 {
            self.cancel_all_inputs();
        }
        self.input.lock_counter
    }

    /// Whether input is currently locked.
    pub fn is_input_locked(&self) -> bool {
        self.input.lock_counter > 0
    }

    // --- tap counting ---

    fn is_repeat_tap(&self, event: &UiEvent) -> bool {
        let last = &self.input.last_click;
        let input = &self.config.input;
        last.timestamp != 0.0
            && event.timestamp - last.timestamp < input.double_tap_time
            && (last.point - event.point).hypot2() <= input.double_tap_distance_squared()
    }

    pub(crate) fn calculate_tap_count(&mut self, event: &UiEvent) -> u32 {
        let mut tap_count = 1;
        match event.phase {
            Phase::Began => {
                let last = self.input.last_click;
                if last.ended {
                    let on_last_locker = match last.touch_locker.filter(|l| self.is_alive(*l)) {
                        Some(locker) => self.is_point_inside(locker, event.point, false),
                        None => true,
                    };
                    if self.is_repeat_tap(event) && on_last_locker {
                        tap_count = last.tap_count + 1;
                    }
                }
                let last = &mut self.input.last_click;
                last.touch_id = event.touch_id;
                last.timestamp = event.timestamp;
                last.point = event.point;
                last.tap_count = tap_count;
                last.ended = false;
            }
            Phase::Ended if event.touch_id == self.input.last_click.touch_id => {
                self.input.last_click.ended = true;
                let last = self.input.last_click;
                if last.tap_count != 1 && self.is_repeat_tap(event) {
                    tap_count = last.tap_count;
                }
            }
            _ => {}
        }
        tap_count
    }

    // --- modal input ---

    /// Recompute the modal control: the top-most visible control with an enabled
    /// [`ModalInput`](canopy_component::ModalInput) component, searching the popups before the
    /// screen. Touches locked outside the new modal control are cancelled.
    pub fn update_modal_control(&mut self) {
        if self.screen.is_none() {
            self.input.modal = None;
            return;
        }
        let modal = self
            .find_modal(self.popup_container)
            .or_else(|| self.screen.and_then(|screen| self.find_modal(screen)));
        if modal != self.input.modal {
            log::debug!("modal control {:?} -> {modal:?}", self.input.modal);
        }
        self.input.modal = modal;
        if let Some(root) = modal {
            self.cancel_inputs_outside(root);
        }
    }

    fn find_modal(&self, id: ControlId) -> Option<ControlId> {
        let control = self.control(id)?;
        for child in control.children.iter().rev() {
            if let Some(found) = self.find_modal(*child) {
                return Some(found);
            }
        }
        (self.is_modal_candidate(id) && control.view_state == ViewState::Visible).then_some(id)
    }

    fn cancel_inputs_outside(&mut self, root: ControlId) {
        for touch_id in self.touch_ids() {
            let Some(locker) = self.event(Slot::Touch(touch_id)).and_then(|e| e.touch_locker)
            else {
                continue;
            };
            if locker != root && !self.is_ancestor(root, locker) {
                self.cancel_input(Slot::Touch(touch_id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use canopy_component::{Component, FocusComponent, ModalInput};
    use canopy_visual::ControlState;
    use kurbo::{Point, Rect};

    use crate::testing::{Recorder, Step};
    use crate::{ControlId, ControlSystem, EventType, InputHandled, Phase, UiEvent};

    fn send(system: &mut ControlSystem, phase: Phase, id: u32, at: (f64, f64), ts: f64) -> UiEvent {
        let mut event = UiEvent::touch(phase, id, Point::new(at.0, at.1), ts);
        system.on_input(&mut event);
        event
    }

    fn setup(recorder: &Recorder) -> (ControlSystem, ControlId, ControlId) {
        let mut system = ControlSystem::new();
        let screen = recorder.control(&mut system, "screen", Rect::new(0.0, 0.0, 100.0, 100.0));
        let button = recorder.control(&mut system, "button", Rect::new(10.0, 10.0, 40.0, 40.0));
        system.add_control(screen, button);
        system.set_screen(Some(screen));
        (system, screen, button)
    }

    #[test]
    fn quick_taps_on_the_same_control_count_up() {
        let recorder = Recorder::new();
        let (mut system, ..) = setup(&recorder);
        let at = (20.0, 20.0);
        assert_eq!(send(&mut system, Phase::Began, 1, at, 1.0).tap_count, 1);
        assert_eq!(send(&mut system, Phase::Ended, 1, at, 1.1).tap_count, 1);
        assert_eq!(send(&mut system, Phase::Began, 1, at, 1.2).tap_count, 2);
        assert_eq!(
            send(&mut system, Phase::Ended, 1, at, 1.3).tap_count,
            2,
            "the release reports the accumulated count"
        );
        assert_eq!(
            send(&mut system, Phase::Began, 1, at, 5.0).tap_count,
            1,
            "too late for a repeat"
        );
        send(&mut system, Phase::Ended, 1, at, 5.1);
        assert_eq!(
            send(&mut system, Phase::Began, 1, (45.0, 20.0), 5.2).tap_count,
            1,
            "outside the previous locker"
        );
    }

    #[test]
    fn locked_input_drops_events_and_cancels_touches() {
        let recorder = Recorder::new();
        let (mut system, _, button) = setup(&recorder);
        send(&mut system, Phase::Began, 1, (20.0, 20.0), 1.0);
        assert!(system.is_any_input_locked_by(button));

        assert_eq!(system.lock_input(), 1);
        assert!(system.is_input_locked());
        assert!(system.tracked_touches().is_empty());
        assert_eq!(system.control(button).unwrap().state(), ControlState::NORMAL);

        let mut dropped = UiEvent::touch(Phase::Began, 2, Point::new(20.0, 20.0), 2.0);
        assert!(!system.on_input(&mut dropped));
        assert_eq!(dropped.touch_locker(), None);

        assert_eq!(system.unlock_input(), 0);
        let accepted = send(&mut system, Phase::Began, 3, (20.0, 20.0), 3.0);
        assert_eq!(accepted.touch_locker(), Some(button));
    }

    #[test]
    fn modal_popup_takes_all_input_and_cancels_outside_touches() {
        let recorder = Recorder::new();
        let (mut system, _, button) = setup(&recorder);
        let popup = recorder.control(&mut system, "popup", Rect::new(50.0, 50.0, 90.0, 90.0));
        system.add_component(popup, Component::ModalInput(ModalInput::default()));

        send(&mut system, Phase::Began, 1, (20.0, 20.0), 1.0);
        assert!(system.is_any_input_locked_by(button));

        system.add_popup(popup);
        assert_eq!(system.modal_control(), Some(popup));
        assert!(!system.is_any_input_locked_by(button), "outside touch cancelled");
        assert_eq!(system.control(button).unwrap().state(), ControlState::NORMAL);

        let blocked = send(&mut system, Phase::Began, 2, (20.0, 20.0), 2.0);
        assert_eq!(blocked.touch_locker(), None);
        let inside = send(&mut system, Phase::Began, 3, (60.0, 60.0), 2.0);
        assert_eq!(inside.touch_locker(), Some(popup));

        system.remove_popup(popup);
        assert_eq!(system.modal_control(), None);
    }

    #[test]
    fn key_events_bubble_from_the_focused_control_until_handled() {
        let recorder = Recorder::new();
        let (mut system, screen, button) = setup(&recorder);
        system.add_component(button, Component::Focus(FocusComponent::default()));
        assert!(system.set_focused_control(Some(button)));
        recorder.clear();

        let mut key = UiEvent::key(Phase::KeyDown, 13);
        assert!(!system.on_input(&mut key));
        assert_eq!(recorder.names(Step::Input), ["button", "screen"]);

        recorder.clear();
        recorder.handle_input(button, InputHandled::Hard);
        let mut key = UiEvent::key(Phase::KeyUp, 13);
        assert!(system.on_input(&mut key));
        assert_eq!(key.handled(), InputHandled::Hard);
        assert_eq!(recorder.names(Step::Input), ["button"], "handled hard stops bubbling");

        system.set_focused_control(None);
        recorder.clear();
        system.on_input(&mut UiEvent::character('x'));
        assert_eq!(recorder.names(Step::Input), ["screen"], "no focus goes to the screen");
        assert!(system.control(screen).is_some());
    }

    #[test]
    fn switching_a_touch_moves_the_press_to_another_control() {
        let recorder = Recorder::new();
        let (mut system, screen, button) = setup(&recorder);
        let other = recorder.control(&mut system, "other", Rect::new(50.0, 10.0, 90.0, 40.0));
        system.add_control(screen, other);
        let ups = Rc::new(Cell::new(0));
        let seen = ups.clone();
        system.add_event(other, EventType::TouchUpInside, move |_, _, _| {
            seen.set(seen.get() + 1);
        });

        send(&mut system, Phase::Began, 1, (20.0, 20.0), 1.0);
        send(&mut system, Phase::Drag, 1, (60.0, 20.0), 1.1);
        system.switch_input_to_control(1, other);
        assert!(!system.is_any_input_locked_by(button));
        assert!(system.is_any_input_locked_by(other));
        assert_eq!(system.control(button).unwrap().total_touches(), 0);
        assert_eq!(system.control(other).unwrap().touches_inside(), 1);

        send(&mut system, Phase::Ended, 1, (60.0, 20.0), 1.2);
        assert_eq!(ups.get(), 1);
        assert_eq!(system.control(other).unwrap().total_touches(), 0);
    }

    #[test]
    fn short_tap_outside_the_focused_control_is_reported() {
        let recorder = Recorder::new();
        let (mut system, _, button) = setup(&recorder);
        system.add_component(button, Component::Focus(FocusComponent::default()));
        system.set_focused_control(Some(button));
        recorder.clear();

        send(&mut system, Phase::Began, 1, (80.0, 80.0), 1.0);
        send(&mut system, Phase::Ended, 1, (85.0, 85.0), 1.1);
        assert_eq!(recorder.names(Step::TouchOutsideFocus), ["button"]);

        send(&mut system, Phase::Began, 2, (80.0, 80.0), 2.0);
        send(&mut system, Phase::Ended, 2, (80.0, 50.0), 2.1);
        assert_eq!(
            recorder.names(Step::TouchOutsideFocus).len(),
            1,
            "a drag is not a tap"
        );
    }

    #[test]
    fn events_without_a_screen_are_not_processed() {
        let mut system = ControlSystem::new();
        let mut event = UiEvent::touch(Phase::Began, 1, Point::new(1.0, 1.0), 0.0);
        assert!(!system.on_input(&mut event));
        assert!(system.tracked_touches().is_empty());
    }
}
