// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A screen with two buttons and a modal popup, driven by synthetic touches.
//!
//! Shows how a press is captured by the control under it, how dragging out and back changes
//! the control state, how a modal popup blocks everything outside it, and how focus moves
//! between focusable controls.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p canopy_demos --example button_input`

use std::cell::Cell;
use std::rc::Rc;

use canopy_component::{Component, FocusComponent, ModalInput};
use canopy_control::{ControlBehavior, ControlId, ControlSystem, EventType, Phase, UiEvent};
use kurbo::{Point, Rect};

/// Logs focus changes.
struct Focusable;

impl ControlBehavior for Focusable {
    fn on_focused(&self, system: &mut ControlSystem, id: ControlId) {
        let name = system.control(id).map(|c| c.name().to_owned());
        log::info!("focused {name:?}");
    }

    fn on_focus_lost(&self, system: &mut ControlSystem, id: ControlId) {
        let name = system.control(id).map(|c| c.name().to_owned());
        log::info!("focus lost {name:?}");
    }
}

fn touch(system: &mut ControlSystem, phase: Phase, at: (f64, f64), ts: f64) -> UiEvent {
    let mut event = UiEvent::touch(phase, 1, Point::new(at.0, at.1), ts);
    let processed = system.on_input(&mut event);
    println!(
        "{phase:?} at {at:?}: processed={processed} locker={:?} taps={}",
        event.touch_locker(),
        event.tap_count
    );
    event
}

fn main() {
    env_logger::init();

    let mut system = ControlSystem::new();
    let screen = system.create_control(Rect::new(0.0, 0.0, 320.0, 240.0));
    system.set_name(screen, "screen");

    let mut buttons = Vec::new();
    for (name, rect) in [
        ("ok", Rect::new(20.0, 180.0, 140.0, 220.0)),
        ("cancel", Rect::new(180.0, 180.0, 300.0, 220.0)),
    ] {
        let button = system.create_control(rect);
        system.set_name(button, name);
        system.set_behavior(button, Some(Rc::new(Focusable)));
        system.add_component(button, Component::Focus(FocusComponent::default()));
        system.add_control(screen, button);
        buttons.push(button);
    }
    system.set_screen(Some(screen));

    let clicks = Rc::new(Cell::new(0));
    let seen = clicks.clone();
    system.add_event(buttons[0], EventType::TouchUpInside, move |_, _, _| {
        seen.set(seen.get() + 1);
    });

    // Press, drag off the button and back, release inside: one click.
    touch(&mut system, Phase::Began, (60.0, 200.0), 0.0);
    touch(&mut system, Phase::Drag, (60.0, 100.0), 0.1);
    println!("state while outside: {:?}", system.control(buttons[0]).map(|c| c.state()));
    touch(&mut system, Phase::Drag, (60.0, 200.0), 0.2);
    touch(&mut system, Phase::Ended, (60.0, 200.0), 0.3);
    println!("clicks: {}", clicks.get());

    // A quick second tap on the same spot counts as a double tap.
    touch(&mut system, Phase::Began, (62.0, 201.0), 0.4);
    touch(&mut system, Phase::Ended, (62.0, 201.0), 0.45);

    // Tapping the other button moves focus.
    touch(&mut system, Phase::Began, (200.0, 200.0), 2.0);
    touch(&mut system, Phase::Ended, (200.0, 200.0), 2.1);
    println!("focused: {:?}", system.focused_control());

    // A modal popup takes every touch; presses outside it reach nobody.
    let popup = system.create_control(Rect::new(80.0, 60.0, 240.0, 160.0));
    system.set_name(popup, "dialog");
    system.add_component(popup, Component::ModalInput(ModalInput::default()));
    system.add_popup(popup);
    println!("modal: {:?}", system.modal_control());
    touch(&mut system, Phase::Began, (60.0, 200.0), 3.0);
    touch(&mut system, Phase::Ended, (60.0, 200.0), 3.1);
    println!("clicks with the dialog up: {}", clicks.get());

    system.remove_popup(popup);
    system.destroy_control(popup);
    system.dump_controls(false);
}
