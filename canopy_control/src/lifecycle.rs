// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inactive / active / visible propagation.
//!
//! Activation runs top-down and deactivation bottom-up. Hooks may restructure the tree while
//! a level is being walked: any change to a child list sets that parent's iterator-corrupted
//! flag and the walk restarts from the first child. Transitions are guarded no-ops once
//! applied, so revisiting a child is harmless.

use alloc::vec::Vec;

use crate::id::ControlId;
use crate::system::ControlSystem;
use crate::view_state::{TransitionError, ViewState};

/// Direction of a child walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Walk {
    /// First child to last (back to front in paint order).
    Forward,
    /// Last child to first.
    Reverse,
}

impl ControlSystem {
    /// Call `f` for every child of `id`, restarting whenever `f` corrupts the child list.
    pub(crate) fn walk_children(
        &mut self,
        id: ControlId,
        walk: Walk,
        mut f: impl FnMut(&mut Self, ControlId),
    ) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.iterator_corrupted = false;
        let mut i = 0;
        loop {
            let Some(node) = self.control(id) else {
                return;
            };
            let len = node.children.len();
            if i >= len {
                break;
            }
            let child = match walk {
                Walk::Forward => node.children[i],
                Walk::Reverse => node.children[len - 1 - i],
            };
            f(self, child);
            if let Some(node) = self.node_mut(id)
                && node.iterator_corrupted
            {
                node.iterator_corrupted = false;
                i = 0;
                continue;
            }
            i += 1;
        }
    }

    /// Root of the tree containing `id`.
    pub fn root_of(&self, id: ControlId) -> ControlId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Whether `id` is attached to a host, directly or through ancestors.
    pub fn is_in_host_tree(&self, id: ControlId) -> bool {
        self.is_alive(id) && self.is_host(self.root_of(id))
    }

    /// Whether every visibility flag from `id` up to its host is set.
    ///
    /// This looks at flags only. Clipping by ancestors and the screen rect are not considered.
    pub fn is_shown_in_host_tree(&self, id: ControlId) -> bool {
        let mut current = Some(id);
        let mut last = id;
        while let Some(c) = current {
            let Some(control) = self.control(c) else {
                return false;
            };
            if !control.visible {
                return false;
            }
            last = c;
            current = control.parent;
        }
        self.is_host(last)
    }

    fn validate_transition(&self, id: ControlId, to: ViewState) -> Result<(), TransitionError> {
        let from = self.view_state(id).unwrap_or_default();
        from.check_transition(to)?;
        if !self.is_in_host_tree(id) {
            return Err(TransitionError::NotInHierarchy);
        }
        if to == ViewState::Visible && !self.is_shown_in_host_tree(id) {
            return Err(TransitionError::NotVisible);
        }
        Ok(())
    }

    /// Set the view state, reporting illegal changes. The state is applied either way.
    pub(crate) fn change_view_state(&mut self, id: ControlId, to: ViewState) {
        if let Err(err) = self.validate_transition(id, to) {
            let name = self.control(id).map(|c| c.name.clone()).unwrap_or_default();
            ui_assert!(false, "control {id} {name:?}: {err}");
        }
        if let Some(node) = self.node_mut(id) {
            log::trace!("control {id}: {:?} -> {to:?}", node.view_state);
            node.view_state = to;
        }
    }

    pub(crate) fn invoke_active(&mut self, id: ControlId, parent_state: ViewState) {
        let Some(control) = self.control(id) else {
            return;
        };
        if !control.is_active() && parent_state >= ViewState::Active {
            self.system_active(id);
            self.invoke_visible(id, parent_state);
        }
    }

    pub(crate) fn invoke_inactive(&mut self, id: ControlId) {
        if self.control(id).is_some_and(|c| c.is_active()) {
            self.invoke_invisible(id);
            self.system_inactive(id);
        }
    }

    pub(crate) fn invoke_visible(&mut self, id: ControlId, parent_state: ViewState) {
        let Some(control) = self.control(id) else {
            return;
        };
        if !control.is_visible() && parent_state == ViewState::Visible && control.visible {
            self.system_visible(id);
        }
    }

    pub(crate) fn invoke_invisible(&mut self, id: ControlId) {
        if self.control(id).is_some_and(|c| c.is_visible()) {
            self.system_invisible(id);
        }
    }

    fn system_active(&mut self, id: ControlId) {
        let state = self.view_state(id).unwrap_or_default();
        ui_assert!(state < ViewState::Active, "control {id} is already active");
        if state >= ViewState::Active {
            return;
        }
        self.change_view_state(id, ViewState::Active);
        self.register_control(id);
        if let Some(behavior) = self.behavior_of(id) {
            behavior.on_active(self, id);
        }
        self.walk_children(id, Walk::Forward, |system, child| {
            let state = system.view_state(id).unwrap_or_default();
            system.invoke_active(child, state);
        });
    }

    fn system_inactive(&mut self, id: ControlId) {
        self.walk_children(id, Walk::Reverse, Self::invoke_inactive);
        self.change_view_state(id, ViewState::Inactive);
        self.unregister_control(id);
        if let Some(behavior) = self.behavior_of(id) {
            behavior.on_inactive(self, id);
        }
    }

    fn system_visible(&mut self, id: ControlId) {
        self.change_view_state(id, ViewState::Visible);
        self.register_visible_control(id);
        if let Some(node) = self.node_mut(id) {
            node.style_dirty = true;
        }
        if let Some(behavior) = self.behavior_of(id) {
            behavior.on_visible(self, id);
        }
        self.walk_children(id, Walk::Forward, |system, child| {
            let state = system.view_state(id).unwrap_or_default();
            system.invoke_visible(child, state);
        });
    }

    fn system_invisible(&mut self, id: ControlId) {
        self.walk_children(id, Walk::Reverse, Self::invoke_invisible);
        self.change_view_state(id, ViewState::Active);
        self.unregister_visible_control(id);
        if let Some(behavior) = self.behavior_of(id) {
            behavior.on_invisible(self, id);
        }
    }

    fn register_control(&mut self, id: ControlId) {
        self.active.insert(id);
        let Some(control) = self.control(id) else {
            return;
        };
        let types: Vec<_> = control.components.iter().map(|(rt, _)| rt).collect();
        for rt in types {
            self.registered_components.entry(rt).or_default().push(id);
        }
    }

    fn unregister_control(&mut self, id: ControlId) {
        self.active.remove(&id);
        let Some(control) = self.control(id) else {
            return;
        };
        let types: Vec<_> = control.components.iter().map(|(rt, _)| rt).collect();
        for rt in types {
            self.unregister_component(id, rt);
        }
    }

    fn register_visible_control(&mut self, id: ControlId) {
        self.visible.insert(id);
        self.on_control_visible(id);
    }

    fn unregister_visible_control(&mut self, id: ControlId) {
        self.visible.remove(&id);
        self.on_control_invisible(id);
    }

    /// Show or hide a control and its subtree.
    ///
    /// Showing a control whose parent is visible makes it visible right away; hiding runs the
    /// invisible transitions bottom-up. Layout is marked dirty either way.
    pub fn set_visibility_flag(&mut self, id: ControlId, visible: bool) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if node.visible == visible {
            return;
        }
        node.visible = visible;
        let parent = node.parent;
        if visible {
            let parent_state = match parent {
                Some(parent) => self.view_state(parent).unwrap_or_default(),
                None if self.is_host(id) => ViewState::Visible,
                None => ViewState::Inactive,
            };
            self.invoke_visible(id, parent_state);
        } else {
            self.invoke_invisible(id);
        }
        self.set_layout_dirty(id);
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{Recorder, Step};
    use crate::{ControlSystem, ViewState};
    use alloc::string::String;
    use alloc::vec::Vec;
    use kurbo::Rect;

    fn unit() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn attaching_before_activation_leaves_everything_inactive() {
        let mut system = ControlSystem::new();
        let recorder = Recorder::new();
        let root = recorder.control(&mut system, "root", unit());
        let a = recorder.control(&mut system, "a", unit());
        let b = recorder.control(&mut system, "b", unit());
        system.add_control(root, a);
        system.add_control(a, b);
        for id in [root, a, b] {
            assert_eq!(system.view_state(id), Some(ViewState::Inactive));
        }
        assert!(recorder.steps().is_empty(), "no hook ran yet");

        system.set_screen(Some(root));
        assert_eq!(
            recorder.names(Step::Active),
            ["root", "a", "b"],
            "activation is top-down"
        );
        assert_eq!(recorder.names(Step::Visible), ["root", "a", "b"]);
        for id in [root, a, b] {
            assert_eq!(system.view_state(id), Some(ViewState::Visible));
        }
    }

    /// x ─┬ x1 ─ x11
    ///    ├ x2 ─ x21
    ///    └ x3
    fn build_x(system: &mut ControlSystem, recorder: &Recorder) -> [crate::ControlId; 6] {
        let x = recorder.control(system, "x", unit());
        let x1 = recorder.control(system, "x1", unit());
        let x11 = recorder.control(system, "x11", unit());
        let x2 = recorder.control(system, "x2", unit());
        let x21 = recorder.control(system, "x21", unit());
        let x3 = recorder.control(system, "x3", unit());
        system.add_control(x, x1);
        system.add_control(x1, x11);
        system.add_control(x, x2);
        system.add_control(x2, x21);
        system.add_control(x, x3);
        [x, x1, x11, x2, x21, x3]
    }

    #[test]
    fn hook_adding_a_sibling_during_activation_restarts_the_walk() {
        let mut system = ControlSystem::new();
        let recorder = Recorder::new();
        let [x, x1, ..] = build_x(&mut system, &recorder);
        let z = recorder.control(&mut system, "z", unit());
        for name in ["z1", "z2", "z3"] {
            let child = recorder.control(&mut system, name, unit());
            system.add_control(z, child);
        }
        recorder.on_active(x1, move |system, _| system.add_control(x, z));

        let screen = system.create_control(unit());
        system.set_screen(Some(screen));
        system.add_control(screen, x);

        assert_eq!(
            recorder.names(Step::Active),
            ["x", "x1", "z", "z1", "z2", "z3", "x11", "x2", "x21", "x3"]
        );
        assert_eq!(system.children(x).last(), Some(&z));
        assert_eq!(system.view_state(z), Some(ViewState::Visible));
    }

    #[test]
    fn removing_a_visible_subtree_hides_then_deactivates_bottom_up() {
        let mut system = ControlSystem::new();
        let recorder = Recorder::new();
        let [x, ..] = build_x(&mut system, &recorder);
        let screen = system.create_control(unit());
        system.set_screen(Some(screen));
        system.add_control(screen, x);
        recorder.clear();

        system.remove_control(screen, x);
        let expected = ["x3", "x21", "x2", "x11", "x1", "x"];
        assert_eq!(recorder.names(Step::Invisible), expected);
        assert_eq!(recorder.names(Step::Inactive), expected);
        let steps = recorder.steps();
        let last_invisible = steps.iter().rposition(|(s, _)| *s == Step::Invisible);
        let first_inactive = steps.iter().position(|(s, _)| *s == Step::Inactive);
        assert!(last_invisible < first_inactive, "all invisible before any inactive");
        assert!(system.parent(x).is_none());
    }

    #[test]
    fn removing_a_visible_child_runs_each_transition_once() {
        let mut system = ControlSystem::new();
        let recorder = Recorder::new();
        let screen = system.create_control(unit());
        let child = recorder.control(&mut system, "c", unit());
        system.set_screen(Some(screen));
        system.add_control(screen, child);
        recorder.clear();

        system.remove_control(screen, child);
        assert_eq!(
            recorder.steps(),
            [
                (Step::Invisible, String::from("c")),
                (Step::Inactive, String::from("c"))
            ]
        );
        system.remove_control(screen, child);
        assert_eq!(recorder.steps().len(), 2, "removing a non-member is a no-op");
    }

    #[test]
    fn hook_removing_a_sibling_during_deactivation_is_safe() {
        let mut system = ControlSystem::new();
        let recorder = Recorder::new();
        let [x, x1, _, x2, ..] = build_x(&mut system, &recorder);
        recorder.on_inactive(x2, move |system, _| system.remove_control(x, x1));
        let screen = system.create_control(unit());
        system.set_screen(Some(screen));
        system.add_control(screen, x);
        recorder.clear();

        system.remove_control(screen, x);
        let inactive = recorder.names(Step::Inactive);
        for name in ["x3", "x21", "x2", "x11", "x1", "x"] {
            assert_eq!(
                inactive.iter().filter(|n| *n == name).count(),
                1,
                "{name} deactivated exactly once"
            );
        }
        assert_eq!(system.children(x).len(), 2);
    }

    #[test]
    fn visibility_flag_hides_and_shows_a_subtree() {
        let mut system = ControlSystem::new();
        let recorder = Recorder::new();
        let [x, _, x11, ..] = build_x(&mut system, &recorder);
        let screen = system.create_control(unit());
        system.set_screen(Some(screen));
        system.add_control(screen, x);
        recorder.clear();

        system.set_visibility_flag(x, false);
        assert_eq!(system.view_state(x), Some(ViewState::Active));
        assert_eq!(system.view_state(x11), Some(ViewState::Active));
        assert_eq!(recorder.names(Step::Invisible).len(), 6);
        assert!(system.control(x).unwrap().layout_dirty());

        system.set_visibility_flag(x, false);
        assert_eq!(recorder.names(Step::Invisible).len(), 6, "unchanged flag is a no-op");

        system.set_visibility_flag(x, true);
        assert_eq!(system.view_state(x11), Some(ViewState::Visible));
        assert_eq!(recorder.names(Step::Visible).len(), 6);
    }

    #[test]
    fn hidden_child_stays_active_when_the_parent_is_shown() {
        let mut system = ControlSystem::new();
        let screen = system.create_control(unit());
        let child = system.create_control(unit());
        system.set_visibility_flag(child, false);
        system.add_control(screen, child);
        system.set_screen(Some(screen));
        assert_eq!(system.view_state(child), Some(ViewState::Active));
        assert!(system.is_registered_active(child));
        assert!(!system.is_registered_visible(child));
        let shown: Vec<_> = [screen, child]
            .into_iter()
            .filter(|id| system.is_shown_in_host_tree(*id))
            .collect();
        assert_eq!(shown, [screen]);
    }
}
