// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render a small control tree into a list of draw commands.
//!
//! Backgrounds resolve their colors top-down: the panel is tinted, the label multiplies onto
//! the panel's color through a background-less row, and the scrolling list clips its items.
//! An update component drives a spinner once per frame.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p canopy_demos --example render_tree`

use std::cell::Cell;
use std::rc::Rc;

use canopy_component::{ClipContent, Component, UpdateComponent};
use canopy_control::{ControlBehavior, ControlId, ControlSystem};
use canopy_visual::{Background, Color, ColorInherit, DrawCommand, DrawType};
use kurbo::Rect;

fn fill(color: Color, inherit: ColorInherit) -> Component {
    let mut background = Background::new();
    background.set_color(color);
    background.set_color_inherit(inherit);
    background.set_draw_type(DrawType::Fill);
    Component::Background(Box::new(background))
}

/// Turns its control a little every frame.
#[derive(Default)]
struct Spinner {
    frames: Cell<u32>,
}

impl ControlBehavior for Spinner {
    fn update(&self, system: &mut ControlSystem, id: ControlId, dt: f64) {
        self.frames.set(self.frames.get() + 1);
        let angle = system.control(id).map_or(0.0, |c| c.angle());
        system.set_angle(id, angle + dt);
    }
}

fn main() {
    env_logger::init();

    let mut system = ControlSystem::new();
    let screen = system.create_control(Rect::new(0.0, 0.0, 320.0, 240.0));
    system.add_component(screen, fill(Color::new(0.1, 0.1, 0.1, 1.0), ColorInherit::IgnoreParent));

    let panel = system.create_control(Rect::new(20.0, 20.0, 300.0, 220.0));
    system.add_component(
        panel,
        fill(Color::new(0.2, 0.4, 0.8, 1.0), ColorInherit::IgnoreParent),
    );
    system.add_control(screen, panel);

    let row = system.create_control(Rect::new(10.0, 10.0, 270.0, 40.0));
    system.add_control(panel, row);
    let label = system.create_control(Rect::new(0.0, 0.0, 120.0, 30.0));
    system.add_component(label, fill(Color::WHITE, ColorInherit::MultiplyOnParent));
    system.add_control(row, label);

    let list = system.create_control(Rect::new(10.0, 50.0, 270.0, 190.0));
    system.add_component(list, Component::ClipContent(ClipContent::default()));
    system.add_control(panel, list);
    for i in 0..6 {
        let top = f64::from(i) * 40.0;
        let item = system.create_control(Rect::new(0.0, top, 260.0, top + 36.0));
        system.add_component(item, fill(Color::new(0.9, 0.9, 0.9, 1.0), ColorInherit::IgnoreParent));
        system.add_control(list, item);
    }

    let spinner = Rc::new(Spinner::default());
    let spinning = system.create_control(Rect::new(150.0, 0.0, 180.0, 30.0));
    system.set_behavior(spinning, Some(spinner.clone()));
    system.add_component(spinning, Component::Update(UpdateComponent));
    system.add_component(spinning, fill(Color::WHITE, ColorInherit::MultiplyOnParent));
    system.add_control(row, spinning);

    system.set_screen(Some(screen));

    for frame in 0..3 {
        system.update(1.0 / 60.0);
        let mut commands: Vec<DrawCommand> = Vec::new();
        system.render(&mut commands);
        println!("frame {frame}: {} commands", commands.len());
        for command in &commands {
            match command {
                DrawCommand::FillRect { rect, color } => println!("  fill {rect:?} {color:?}"),
                DrawCommand::FillPolygon { points, color } => {
                    println!("  polygon {points:?} {color:?}");
                }
                DrawCommand::PushClip(rect) => println!("  clip {rect:?}"),
                DrawCommand::PopClip => println!("  unclip"),
                other => println!("  {other:?}"),
            }
        }
    }
    println!("spinner updated {} times", spinner.frames.get());
}
