// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render and update passes.

use alloc::vec::Vec;

use canopy_component::UpdateComponent;
use canopy_visual::{Background, Color, DrawCommand, DrawSink, GeometricData};

use crate::id::ControlId;
use crate::system::ControlSystem;

impl ControlSystem {
    /// Draw the screen, then the popups, then the flow root.
    ///
    /// Controls whose visibility flag is off are skipped with their subtree. Every background
    /// resolves its draw color against the nearest ancestor background (white at the roots)
    /// before drawing, so colors always flow top-down.
    ///
    /// ```
    /// use canopy_component::Component;
    /// use canopy_control::ControlSystem;
    /// use canopy_visual::{Background, DrawCommand, DrawType};
    /// use kurbo::Rect;
    ///
    /// let mut system = ControlSystem::new();
    /// let screen = system.create_control(Rect::new(0.0, 0.0, 20.0, 10.0));
    /// let mut background = Background::new();
    /// background.set_draw_type(DrawType::Fill);
    /// system.add_component(screen, Component::Background(Box::new(background)));
    /// system.set_screen(Some(screen));
    ///
    /// let mut commands = Vec::new();
    /// system.render(&mut commands);
    /// assert!(matches!(commands[..], [DrawCommand::FillRect { .. }]));
    /// ```
    pub fn render(&mut self, sink: &mut dyn DrawSink) {
        let base = self.config.base_geometric_data;
        let roots = [self.screen, Some(self.popup_container), self.flow_root];
        for root in roots.into_iter().flatten() {
            self.render_control(root, &base, Color::WHITE, sink);
        }
    }

    fn render_control(
        &mut self,
        id: ControlId,
        parent: &GeometricData,
        parent_color: Color,
        sink: &mut dyn DrawSink,
    ) {
        if !self.control(id).is_some_and(|c| c.visibility_flag()) {
            return;
        }
        let Some(mut data) = self.local_geometric_data(id) else {
            return;
        };
        data.add_geometric_data(parent);
        let clip = self.clips_content(id);

        let mut color = parent_color;
        if let Some((node, manager)) = self.node_with_manager(id)
            && let Some(background) = node.components.get_typed_mut::<Background>(manager, 0)
        {
            background.set_parent_color(parent_color);
            background.draw(&data, sink);
            color = background.draw_color();
            if background.take_layout_invalidation() {
                node.layout_dirty = true;
            }
        }

        if clip {
            sink.push(DrawCommand::PushClip(data.unrotated_rect()));
        }
        let children = self.children(id).to_vec();
        for child in children {
            self.render_control(child, &data, color, sink);
        }
        if clip {
            sink.push(DrawCommand::PopClip);
        }
    }

    /// Advance every control carrying an [`UpdateComponent`] by `dt` seconds.
    ///
    /// Active controls are reached unless
    /// [`update_invisible`](crate::SystemConfig::update_invisible) is off, in which case only
    /// visible ones are. Each control is updated once per pass however many update components
    /// it carries. Controls removed by an earlier update in the same pass are skipped.
    pub fn update(&mut self, dt: f64) {
        let mut targets: Vec<ControlId> = Vec::new();
        for id in self.registered_controls::<UpdateComponent>() {
            if !targets.contains(id) {
                targets.push(*id);
            }
        }
        let update_invisible = self.config.update_invisible;
        for id in targets {
            let Some(control) = self.control(id) else {
                continue;
            };
            let due = if update_invisible {
                control.is_active()
            } else {
                control.is_visible()
            };
            if !due || !self.has_component::<UpdateComponent>(id) {
                continue;
            }
            if let Some(behavior) = self.behavior_of(id) {
                behavior.update(self, id, dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use canopy_component::{ClipContent, Component, UpdateComponent};
    use canopy_visual::{Background, Color, ColorInherit, DrawCommand, DrawType};
    use kurbo::Rect;

    use crate::{ControlBehavior, ControlId, ControlSystem, SystemConfig};

    fn fill(color: Color) -> Component {
        let mut background = Background::new();
        background.set_color(color);
        background.set_draw_type(DrawType::Fill);
        Component::Background(Box::new(background))
    }

    fn fills(commands: &[DrawCommand]) -> Vec<(Rect, Color)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn colors_inherit_through_controls_without_a_background() {
        let mut system = ControlSystem::new();
        let screen = system.create_control(Rect::new(0.0, 0.0, 100.0, 100.0));
        let panel = system.create_control(Rect::new(10.0, 10.0, 60.0, 60.0));
        let item = system.create_control(Rect::new(5.0, 5.0, 15.0, 15.0));
        let tint = Color::new(1.0, 0.0, 0.0, 0.5);
        system.add_component(screen, fill(tint));
        system.add_component(item, fill(Color::WHITE));
        system.with_background(item, |bg| bg.set_color_inherit(ColorInherit::MultiplyOnParent));
        system.add_control(screen, panel);
        system.add_control(panel, item);
        system.set_screen(Some(screen));

        let mut commands = Vec::new();
        system.render(&mut commands);
        assert_eq!(
            fills(&commands),
            [
                (Rect::new(0.0, 0.0, 100.0, 100.0), tint),
                (Rect::new(15.0, 15.0, 25.0, 25.0), tint),
            ],
            "the item multiplies white onto the screen's color"
        );
    }

    #[test]
    fn clip_content_wraps_the_children() {
        let mut system = ControlSystem::new();
        let screen = system.create_control(Rect::new(0.0, 0.0, 100.0, 100.0));
        let panel = system.create_control(Rect::new(10.0, 10.0, 60.0, 60.0));
        let item = system.create_control(Rect::new(0.0, 0.0, 80.0, 80.0));
        system.add_component(panel, Component::ClipContent(ClipContent::default()));
        system.add_component(item, fill(Color::WHITE));
        system.add_control(screen, panel);
        system.add_control(panel, item);
        system.set_screen(Some(screen));

        let mut commands = Vec::new();
        system.render(&mut commands);
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0], DrawCommand::PushClip(Rect::new(10.0, 10.0, 60.0, 60.0)));
        assert!(matches!(commands[1], DrawCommand::FillRect { .. }));
        assert_eq!(commands[2], DrawCommand::PopClip);

        system.component_mut::<ClipContent>(panel, 0).unwrap().enabled = false;
        commands.clear();
        system.render(&mut commands);
        assert_eq!(commands.len(), 1, "a disabled clip pushes nothing");
    }

    #[test]
    fn hidden_subtrees_are_skipped_and_popups_draw_after_the_screen() {
        let mut system = ControlSystem::new();
        let screen = system.create_control(Rect::new(0.0, 0.0, 100.0, 100.0));
        let child = system.create_control(Rect::new(0.0, 0.0, 10.0, 10.0));
        let popup = system.create_control(Rect::new(0.0, 0.0, 5.0, 5.0));
        let black = Color::BLACK;
        system.add_component(screen, fill(Color::WHITE));
        system.add_component(child, fill(Color::WHITE));
        system.add_component(popup, fill(black));
        system.add_control(screen, child);
        system.set_screen(Some(screen));
        system.add_popup(popup);
        system.set_visibility_flag(child, false);

        let mut commands = Vec::new();
        system.render(&mut commands);
        let colors: Vec<Color> = fills(&commands).into_iter().map(|(_, c)| c).collect();
        assert_eq!(colors, [Color::WHITE, black]);
    }

    #[test]
    fn render_applies_layout_invalidations() {
        let mut system = ControlSystem::new();
        let screen = system.create_control(Rect::new(0.0, 0.0, 10.0, 10.0));
        system.add_component(screen, Component::Background(Box::new(Background::new())));
        system.set_screen(Some(screen));
        system.reset_layout_dirty(screen);
        system
            .component_mut::<Background>(screen, 0)
            .unwrap()
            .set_draw_type(DrawType::Fill);
        assert!(!system.control(screen).unwrap().layout_dirty());

        system.render(&mut Vec::new());
        assert!(system.control(screen).unwrap().layout_dirty());
    }

    struct Ticker(Rc<RefCell<Vec<(ControlId, f64)>>>);

    impl ControlBehavior for Ticker {
        fn update(&self, _system: &mut ControlSystem, id: ControlId, dt: f64) {
            self.0.borrow_mut().push((id, dt));
        }
    }

    #[test]
    fn update_reaches_registered_controls_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut system = ControlSystem::new();
        let screen = system.create_control(Rect::new(0.0, 0.0, 10.0, 10.0));
        let shown = system.create_control(Rect::ZERO);
        let hidden = system.create_control(Rect::ZERO);
        let detached = system.create_control(Rect::ZERO);
        for id in [shown, hidden, detached] {
            system.set_behavior(id, Some(Rc::new(Ticker(log.clone()))));
            system.add_component(id, Component::Update(UpdateComponent));
        }
        system.add_component(shown, Component::Update(UpdateComponent));
        system.add_control(screen, shown);
        system.add_control(screen, hidden);
        system.set_screen(Some(screen));
        system.set_visibility_flag(hidden, false);

        system.update(0.5);
        let mut reached: Vec<ControlId> = log.borrow().iter().map(|(id, _)| *id).collect();
        reached.sort_unstable();
        let mut expected = [shown, hidden];
        expected.sort_unstable();
        assert_eq!(reached, expected, "active controls, each once");

        log.borrow_mut().clear();
        system.set_config(SystemConfig {
            update_invisible: false,
            ..SystemConfig::default()
        });
        system.update(0.25);
        assert_eq!(*log.borrow(), [(shown, 0.25)]);
    }
}
