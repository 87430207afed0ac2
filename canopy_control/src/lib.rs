// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Control: a retained-mode UI control tree.
//!
//! A [`ControlSystem`] owns every [`Control`] in a generational arena and addresses them by
//! [`ControlId`]. Controls form trees rooted at three hosts: the current screen, the popup
//! container and an optional flow root. Attaching a subtree to a host walks it through the
//! [`ViewState`] lifecycle (inactive, active, visible) with each step running the control's
//! [`ControlBehavior`] hooks, which may freely add and remove controls while the walk is in
//! progress.
//!
//! Beyond the tree the system provides:
//!
//! - Geometry: position, size, pivot, scale and angle composed into absolute
//!   [`GeometricData`](canopy_visual::GeometricData) for hit testing and drawing.
//! - Components from [`canopy_component`], attached per control and registered by type while
//!   the control is active.
//! - Input dispatch: touches are offered front to back, captured by the control they press,
//!   tracked through drag and release, and cancelled when their locker disappears. Hover,
//!   focus, modal input and the exclusive-input lock are system-wide singletons.
//! - Events: per-control handlers and system-wide listeners for presses, value changes, focus
//!   and hover.
//! - A render pass that feeds a [`DrawSink`](canopy_visual::DrawSink) and an update pass.
//!
//! ## Example
//!
//! ```rust
//! use canopy_control::{ControlSystem, EventType, Phase, UiEvent};
//! use core::cell::Cell;
//! use kurbo::{Point, Rect};
//! use std::rc::Rc;
//!
//! let mut system = ControlSystem::new();
//! let screen = system.create_control(Rect::new(0.0, 0.0, 320.0, 240.0));
//! let button = system.create_control(Rect::new(20.0, 20.0, 120.0, 60.0));
//! system.add_control(screen, button);
//! system.set_screen(Some(screen));
//!
//! let clicks = Rc::new(Cell::new(0));
//! let seen = clicks.clone();
//! system.add_event(button, EventType::TouchUpInside, move |_, _, _| {
//!     seen.set(seen.get() + 1);
//! });
//!
//! let at = Point::new(50.0, 40.0);
//! system.on_input(&mut UiEvent::touch(Phase::Began, 1, at, 0.0));
//! system.on_input(&mut UiEvent::touch(Phase::Ended, 1, at, 0.1));
//! assert_eq!(clicks.get(), 1);
//! ```
//!
//! Invariant violations are logged through the `log` facade and panic in debug builds only.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

/// Log an invariant violation, then `debug_assert!` it.
macro_rules! ui_assert {
    ($cond:expr, $($arg:tt)+) => {{
        let ok: bool = $cond;
        if !ok {
            log::error!($($arg)+);
            debug_assert!(ok, $($arg)+);
        }
    }};
}

mod behavior;
mod components;
mod config;
mod control;
mod debug;
mod dispatch;
mod event;
mod geometry;
mod hierarchy;
mod id;
mod input;
mod lifecycle;
mod render;
mod state;
mod system;
mod view_state;

#[cfg(test)]
mod testing;

pub use behavior::ControlBehavior;
pub use config::{InputConfig, SystemConfig};
pub use control::Control;
pub use event::{
    EventHandler, EventListener, EventType, InputDevice, InputHandled, Modifiers, Phase,
    TouchState, UiEvent,
};
pub use id::ControlId;
pub use system::ControlSystem;
pub use view_state::{TransitionError, ViewState};
