// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input events and control event bindings.

use alloc::rc::Rc;
use alloc::vec::Vec;
use kurbo::{Point, Vec2};

use crate::id::ControlId;
use crate::system::ControlSystem;

/// Phase of an input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// A touch or button press started.
    Began,
    /// A pressed touch moved.
    Drag,
    /// A pressed touch was released.
    Ended,
    /// The pointer moved without a press.
    Move,
    /// Scroll wheel.
    Wheel,
    /// The platform cancelled a touch.
    Cancelled,
    /// Key pressed.
    KeyDown,
    /// Key held down and repeated.
    KeyDownRepeat,
    /// Key released.
    KeyUp,
    /// Text input.
    Char,
    /// Repeated text input.
    CharRepeat,
    /// Gamepad input.
    Joystick,
    /// Platform gesture.
    Gesture,
}

impl Phase {
    /// Keyboard and text phases, routed to the focused control.
    pub fn is_key(self) -> bool {
        matches!(
            self,
            Self::KeyDown | Self::KeyDownRepeat | Self::KeyUp | Self::Char | Self::CharRepeat
        )
    }

    /// Phases of a tracked touch.
    pub fn is_touch(self) -> bool {
        matches!(
            self,
            Self::Began | Self::Drag | Self::Ended | Self::Cancelled
        )
    }

    /// Phases after which a tracked touch is forgotten.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// Where a tracked touch is relative to the control that locked it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TouchState {
    /// Not pressed, or already released by the control.
    #[default]
    Released,
    /// Inside the locking control.
    Inside,
    /// Outside the locking control.
    Outside,
}

/// How thoroughly an event has been handled. Only ever raised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputHandled {
    /// Nobody reacted.
    #[default]
    None,
    /// Handled, but others may still look at it.
    Soft,
    /// Fully consumed.
    Hard,
}

bitflags::bitflags! {
    /// Keyboard modifiers held during an event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT   = 1 << 0;
        /// Control.
        const CONTROL = 1 << 1;
        /// Alt or option.
        const ALT     = 1 << 2;
        /// Command, windows or super.
        const SUPER   = 1 << 3;
    }
}

/// Device an event came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputDevice {
    /// Touch screen.
    #[default]
    TouchSurface,
    /// Mouse.
    Mouse,
    /// Keyboard.
    Keyboard,
    /// Gamepad.
    Gamepad,
    /// Touch pad.
    TouchPad,
}

/// One input event.
///
/// Touch bookkeeping (`touch_state`, `touch_locker`) is owned by the control system and
/// exposed read-only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UiEvent {
    /// Touch or button id.
    pub touch_id: u32,
    /// Pointer position in absolute units.
    pub point: Point,
    /// Seconds since an arbitrary origin.
    pub timestamp: f64,
    /// Phase.
    pub phase: Phase,
    /// Consecutive tap count, filled in by [`ControlSystem::on_input`].
    pub tap_count: u32,
    /// Key code of key phases.
    pub key: Option<u32>,
    /// Character of text phases.
    pub character: Option<char>,
    /// Modifier keys.
    pub modifiers: Modifiers,
    /// Wheel scroll delta.
    pub wheel_delta: Vec2,
    /// Originating device.
    pub device: InputDevice,
    pub(crate) touch_state: TouchState,
    pub(crate) touch_locker: Option<ControlId>,
    pub(crate) handled: InputHandled,
}

impl UiEvent {
    /// An event of `phase` with every other field empty.
    pub fn new(phase: Phase) -> Self {
        Self {
            touch_id: 0,
            point: Point::ZERO,
            timestamp: 0.0,
            phase,
            tap_count: 0,
            key: None,
            character: None,
            modifiers: Modifiers::empty(),
            wheel_delta: Vec2::ZERO,
            device: InputDevice::default(),
            touch_state: TouchState::Released,
            touch_locker: None,
            handled: InputHandled::None,
        }
    }

    /// A pointer event.
    pub fn touch(phase: Phase, touch_id: u32, point: Point, timestamp: f64) -> Self {
        Self {
            touch_id,
            point,
            timestamp,
            ..Self::new(phase)
        }
    }

    /// A key event.
    pub fn key(phase: Phase, key: u32) -> Self {
        Self {
            key: Some(key),
            device: InputDevice::Keyboard,
            ..Self::new(phase)
        }
    }

    /// A text event.
    pub fn character(character: char) -> Self {
        Self {
            character: Some(character),
            device: InputDevice::Keyboard,
            ..Self::new(Phase::Char)
        }
    }

    /// Where the touch is relative to its locker.
    pub fn touch_state(&self) -> TouchState {
        self.touch_state
    }

    /// Control that captured this touch.
    pub fn touch_locker(&self) -> Option<ControlId> {
        self.touch_locker
    }

    /// How thoroughly the event has been handled.
    pub fn handled(&self) -> InputHandled {
        self.handled
    }

    /// Raise the handled level. Lower values are ignored.
    ///
    /// ```
    /// use canopy_control::{InputHandled, Phase, UiEvent};
    ///
    /// let mut event = UiEvent::new(Phase::Wheel);
    /// event.set_handled(InputHandled::Hard);
    /// event.set_handled(InputHandled::Soft);
    /// assert_eq!(event.handled(), InputHandled::Hard);
    /// ```
    pub fn set_handled(&mut self, handled: InputHandled) {
        self.handled = self.handled.max(handled);
    }
}

/// Notifications a control sends to bound handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A touch was pressed on the control.
    TouchDown,
    /// The last touch was released inside the control.
    TouchUpInside,
    /// The control's value changed.
    ValueChanged,
    /// The control became the hovered control.
    HoveredSet,
    /// The control stopped being the hovered control.
    HoveredRemoved,
    /// The control took focus.
    FocusSet,
    /// The control lost focus.
    FocusLost,
    /// The last touch was released outside the control.
    TouchUpOutside,
}

/// Handler bound to one control and event type.
pub type EventHandler = Rc<dyn Fn(&mut ControlSystem, ControlId, Option<&UiEvent>)>;

/// System-wide observer of every performed event.
pub type EventListener = Rc<dyn Fn(&mut ControlSystem, ControlId, EventType, Option<&UiEvent>)>;

impl ControlSystem {
    /// Bind `handler` to `ty` on a control. The returned handle removes the binding again.
    ///
    /// ```
    /// use canopy_control::{ControlSystem, EventType};
    /// use core::cell::Cell;
    /// use kurbo::Rect;
    /// use std::rc::Rc;
    ///
    /// let mut system = ControlSystem::new();
    /// let id = system.create_control(Rect::ZERO);
    /// let changes = Rc::new(Cell::new(0));
    /// let seen = changes.clone();
    /// let handler = system.add_event(id, EventType::ValueChanged, move |_, _, _| {
    ///     seen.set(seen.get() + 1);
    /// });
    ///
    /// system.perform_event(id, EventType::ValueChanged, None);
    /// assert!(system.remove_event(id, EventType::ValueChanged, &handler));
    /// system.perform_event(id, EventType::ValueChanged, None);
    /// assert_eq!(changes.get(), 1);
    /// ```
    pub fn add_event(
        &mut self,
        id: ControlId,
        ty: EventType,
        handler: impl Fn(&mut Self, ControlId, Option<&UiEvent>) + 'static,
    ) -> EventHandler {
        let handler: EventHandler = Rc::new(handler);
        if let Some(node) = self.node_mut(id) {
            node.events.push((ty, handler.clone()));
        }
        handler
    }

    /// Remove one binding made with [`add_event`](Self::add_event).
    pub fn remove_event(&mut self, id: ControlId, ty: EventType, handler: &EventHandler) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let Some(pos) = node
            .events
            .iter()
            .position(|(t, h)| *t == ty && Rc::ptr_eq(h, handler))
        else {
            return false;
        };
        node.events.remove(pos);
        true
    }

    /// Remove every binding of a control.
    pub fn remove_all_events(&mut self, id: ControlId) {
        if let Some(node) = self.node_mut(id) {
            node.events.clear();
        }
    }

    /// Notify listeners, then the control's handlers bound to `ty`, in binding order.
    ///
    /// Handlers may add or remove bindings; the ones bound when the event was performed run.
    pub fn perform_event(&mut self, id: ControlId, ty: EventType, input: Option<&UiEvent>) {
        if !self.is_alive(id) {
            return;
        }
        let listeners = self.listeners.clone();
        for listener in listeners {
            listener(self, id, ty, input);
        }
        let Some(control) = self.control(id) else {
            return;
        };
        let handlers: Vec<EventHandler> = control
            .events
            .iter()
            .filter(|(t, _)| *t == ty)
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(self, id, input);
        }
    }

    /// Observe every event performed on any control.
    pub fn add_event_listener(
        &mut self,
        listener: impl Fn(&mut Self, ControlId, EventType, Option<&UiEvent>) + 'static,
    ) -> EventListener {
        let listener: EventListener = Rc::new(listener);
        self.listeners.push(listener.clone());
        listener
    }

    /// Remove a listener added with [`add_event_listener`](Self::add_event_listener).
    pub fn remove_event_listener(&mut self, listener: &EventListener) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
        self.listeners.len() != before
    }
}
