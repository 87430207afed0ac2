// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Creating, attaching, reordering and destroying controls.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;

use kurbo::Rect;

use crate::behavior::ControlBehavior;
use crate::control::Control;
use crate::id::ControlId;
use crate::system::ControlSystem;

impl ControlSystem {
    /// Create a detached, inactive control covering `rect` in parent units.
    pub fn create_control(&mut self, rect: Rect) -> ControlId {
        let id = self.alloc(Control::new());
        self.set_rect(id, rect);
        id
    }

    /// Attach a behavior, replacing any previous one.
    pub fn set_behavior(&mut self, id: ControlId, behavior: Option<Rc<dyn ControlBehavior>>) {
        if let Some(node) = self.node_mut(id) {
            node.behavior = behavior;
        }
    }

    /// Destroy a control and its whole subtree.
    ///
    /// Inputs held by the subtree are cancelled and the removal transitions run before the
    /// arena slots are freed. Destroying the screen or flow root clears it first; the popup
    /// container cannot be destroyed.
    pub fn destroy_control(&mut self, id: ControlId) {
        if !self.is_alive(id) {
            return;
        }
        ui_assert!(id != self.popup_container, "the popup container cannot be destroyed");
        if id == self.popup_container {
            return;
        }
        if self.screen == Some(id) {
            self.set_screen(None);
        }
        if self.flow_root == Some(id) {
            self.set_flow_root(None);
        }
        self.cancel_inputs(id, true);
        self.remove_from_parent(id);
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: ControlId) {
        let children = self
            .node_mut(id)
            .map(|node| core::mem::take(&mut node.children))
            .unwrap_or_default();
        for child in children {
            self.free_subtree(child);
        }
        self.forget_control(id);
        if let Some(mut control) = self.free(id) {
            control.components.remove_all(&mut self.component_manager);
        }
    }

    /// Deep copy of a control and its subtree, detached and inactive.
    ///
    /// Geometry, flags, state bits, classes, properties, components and children are copied
    /// and the behavior is shared. Event bindings are not copied.
    pub fn clone_control(&mut self, id: ControlId) -> Option<ControlId> {
        let source = self.control(id)?;
        if !source.events.is_empty() {
            log::warn!(
                "clone of {id} {:?}: {} event binding(s) are not copied",
                source.name,
                source.events.len()
            );
        }
        let mut copy = Control::new();
        copy.name = source.name.clone();
        copy.tag = source.tag;
        copy.classes = source.classes.clone();
        copy.properties = source.properties.clone();
        copy.position = source.position;
        copy.size = source.size;
        copy.pivot = source.pivot;
        copy.scale = source.scale;
        copy.angle = source.angle;
        copy.state = source.state;
        copy.visible = source.visible;
        copy.input_enabled = source.input_enabled;
        copy.exclusive_input = source.exclusive_input;
        copy.multi_input = source.multi_input;
        copy.input_processors = u32::from(source.input_enabled);
        copy.layout_dirty = source.layout_dirty;
        copy.layout_position_dirty = source.layout_position_dirty;
        copy.layout_order_dirty = source.layout_order_dirty;
        copy.style_dirty = source.style_dirty;
        copy.components = source.components.clone();
        copy.behavior = source.behavior.clone();
        let children = source.children.clone();

        let copy = self.alloc(copy);
        for child in children {
            if let Some(child_copy) = self.clone_control(child) {
                self.add_control(copy, child_copy);
            }
        }
        Some(copy)
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: ControlId, id: ControlId) -> bool {
        let mut current = self.parent(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    /// Append `child` to `parent`'s children, detaching it from its previous parent first.
    ///
    /// If `parent` is active the added subtree is activated top-down, and made visible when
    /// `parent` is visible.
    pub fn add_control(&mut self, parent: ControlId, child: ControlId) {
        if !self.can_attach(parent, child) {
            return;
        }
        self.remove_from_parent(child);
        if let Some(node) = self.node_mut(child) {
            node.input_processed = false;
        }
        self.set_parent(child, Some(parent));
        let Some(node) = self.node_mut(parent) else {
            return;
        };
        node.children.push(child);
        let state = node.view_state;
        self.invoke_active(child, state);
        self.children_changed(parent);
    }

    /// Detach `child` from `parent`, running the invisible then inactive transitions first.
    /// Does nothing when `child` is not a child of `parent`.
    pub fn remove_control(&mut self, parent: ControlId, child: ControlId) {
        if self.parent(child) != Some(parent) {
            return;
        }
        self.invoke_inactive(child);
        if self.parent(child) != Some(parent) {
            return;
        }
        self.set_parent(child, None);
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|c| *c != child);
        }
        self.children_changed(parent);
    }

    /// Detach a control from its parent, if any.
    pub fn remove_from_parent(&mut self, id: ControlId) {
        if let Some(parent) = self.parent(id) {
            self.remove_control(parent, id);
        }
    }

    /// Detach every child, front one first.
    pub fn remove_all_controls(&mut self, parent: ControlId) {
        while let Some(&first) = self.children(parent).first() {
            self.remove_control(parent, first);
            if self.children(parent).first() == Some(&first) {
                break;
            }
        }
    }

    /// Move a child to the end of the paint order.
    pub fn bring_child_front(&mut self, parent: ControlId, child: ControlId) {
        self.move_child(parent, child, |children, c| children.push(c));
    }

    /// Move a child to the start of the paint order.
    pub fn bring_child_back(&mut self, parent: ControlId, child: ControlId) {
        self.move_child(parent, child, |children, c| children.insert(0, c));
    }

    fn move_child(
        &mut self,
        parent: ControlId,
        child: ControlId,
        place: impl FnOnce(&mut Vec<ControlId>, ControlId),
    ) {
        let Some(node) = self.node_mut(parent) else {
            return;
        };
        let Some(pos) = node.children.iter().position(|c| *c == child) else {
            return;
        };
        node.children.remove(pos);
        place(&mut node.children, child);
        node.iterator_corrupted = true;
        node.layout_order_dirty = true;
    }

    /// Attach `child` just below `below_this` in paint order, or append it when `below_this`
    /// is not a child of `parent`.
    pub fn insert_child_below(&mut self, parent: ControlId, child: ControlId, below_this: ControlId) {
        self.insert_child_next_to(parent, child, below_this, 0);
    }

    /// Attach `child` just above `above_this` in paint order, or append it when `above_this`
    /// is not a child of `parent`.
    pub fn insert_child_above(&mut self, parent: ControlId, child: ControlId, above_this: ControlId) {
        self.insert_child_next_to(parent, child, above_this, 1);
    }

    fn insert_child_next_to(
        &mut self,
        parent: ControlId,
        child: ControlId,
        anchor: ControlId,
        offset: usize,
    ) {
        if child == anchor || !self.children(parent).contains(&anchor) {
            self.add_control(parent, child);
            return;
        }
        if !self.can_attach(parent, child) {
            return;
        }
        self.remove_from_parent(child);
        let Some(pos) = self.children(parent).iter().position(|c| *c == anchor) else {
            self.add_control(parent, child);
            return;
        };
        if let Some(node) = self.node_mut(child) {
            node.input_processed = false;
        }
        self.set_parent(child, Some(parent));
        let Some(node) = self.node_mut(parent) else {
            return;
        };
        node.children.insert(pos + offset, child);
        let state = node.view_state;
        self.invoke_active(child, state);
        self.children_changed(parent);
    }

    /// Move an existing child just below `below_this`.
    pub fn send_child_below(&mut self, parent: ControlId, child: ControlId, below_this: ControlId) {
        self.send_child_next_to(parent, child, below_this, 0);
    }

    /// Move an existing child just above `above_this`.
    pub fn send_child_above(&mut self, parent: ControlId, child: ControlId, above_this: ControlId) {
        self.send_child_next_to(parent, child, above_this, 1);
    }

    fn send_child_next_to(
        &mut self,
        parent: ControlId,
        child: ControlId,
        anchor: ControlId,
        offset: usize,
    ) {
        let Some(node) = self.node_mut(parent) else {
            return;
        };
        let Some(from) = node.children.iter().position(|c| *c == child) else {
            ui_assert!(false, "send_child: {child} is not a child of {parent}");
            return;
        };
        node.children.remove(from);
        node.iterator_corrupted = true;
        let Some(to) = node.children.iter().position(|c| *c == anchor) else {
            node.children.insert(from, child);
            ui_assert!(false, "send_child: anchor {anchor} is not a child of {parent}");
            return;
        };
        node.children.insert(to + offset, child);
        node.layout_order_dirty = true;
    }

    /// Stable-sort the children of `parent`.
    pub fn sort_children(
        &mut self,
        parent: ControlId,
        mut compare: impl FnMut(&Control, &Control) -> Ordering,
    ) {
        let Some(node) = self.node_mut(parent) else {
            return;
        };
        let mut children = core::mem::take(&mut node.children);
        children.sort_by(|a, b| match (self.control(*a), self.control(*b)) {
            (Some(a), Some(b)) => compare(a, b),
            _ => Ordering::Equal,
        });
        if let Some(node) = self.node_mut(parent) {
            node.children = children;
            node.iterator_corrupted = true;
            node.layout_order_dirty = true;
        }
    }

    fn can_attach(&self, parent: ControlId, child: ControlId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return false;
        }
        let ok = parent != child && !self.is_ancestor(child, parent) && !self.is_host(child);
        ui_assert!(ok, "cannot attach {child} under {parent}");
        ok
    }

    fn children_changed(&mut self, parent: ControlId) {
        if let Some(node) = self.node_mut(parent) {
            node.iterator_corrupted = true;
            node.layout_dirty = true;
        }
        #[cfg(debug_assertions)]
        self.debug_check_input_processors(parent);
    }

    fn set_parent(&mut self, child: ControlId, parent: Option<ControlId>) {
        let Some(node) = self.node_mut(child) else {
            return;
        };
        let count = node.input_processors;
        let previous = core::mem::replace(&mut node.parent, parent);
        if let Some(previous) = previous {
            self.unregister_input_processors(previous, count);
        }
        if let Some(parent) = parent {
            self.register_input_processors(parent, count);
        }
    }

    pub(crate) fn register_input_processors(&mut self, from: ControlId, count: u32) {
        let mut current = Some(from);
        while let Some(id) = current {
            let Some(node) = self.node_mut(id) else {
                return;
            };
            node.input_processors = node.input_processors.saturating_add(count);
            current = node.parent;
        }
    }

    pub(crate) fn unregister_input_processors(&mut self, from: ControlId, count: u32) {
        let mut current = Some(from);
        while let Some(id) = current {
            let Some(node) = self.node_mut(id) else {
                return;
            };
            node.input_processors = node.input_processors.saturating_sub(count);
            current = node.parent;
        }
    }

    // --- identity ---

    /// Rename a control.
    pub fn set_name(&mut self, id: ControlId, name: &str) {
        if let Some(node) = self.node_mut(id)
            && node.name != name
        {
            node.name = name.to_string();
            node.style_dirty = true;
        }
    }

    /// Set the numeric tag.
    pub fn set_tag(&mut self, id: ControlId, tag: i32) {
        if let Some(node) = self.node_mut(id) {
            node.tag = tag;
        }
    }

    /// Add a style class. Returns whether it was new.
    pub fn add_class(&mut self, id: ControlId, class: &str) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if class.is_empty() || node.classes.iter().any(|c| c == class) {
            return false;
        }
        node.classes.push(class.to_string());
        node.style_dirty = true;
        true
    }

    /// Remove a style class. Returns whether it was present.
    pub fn remove_class(&mut self, id: ControlId, class: &str) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let Some(pos) = node.classes.iter().position(|c| c == class) else {
            return false;
        };
        node.classes.remove(pos);
        node.style_dirty = true;
        true
    }

    /// Whether a control has a style class.
    pub fn has_class(&self, id: ControlId, class: &str) -> bool {
        self.control(id)
            .is_some_and(|c| c.classes.iter().any(|k| k == class))
    }

    /// Replace the classes with the space separated list in `classes`.
    pub fn set_classes_from_str(&mut self, id: ControlId, classes: &str) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.classes.clear();
        for class in classes.split_whitespace() {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
        node.style_dirty = true;
    }

    /// Set a free-form property, returning the previous value.
    pub fn set_property(&mut self, id: ControlId, key: &str, value: &str) -> Option<String> {
        self.node_mut(id)?
            .properties
            .insert(key.to_string(), value.to_string())
    }

    /// Remove a free-form property.
    pub fn remove_property(&mut self, id: ControlId, key: &str) -> Option<String> {
        self.node_mut(id)?.properties.remove(key)
    }

    // --- lookup ---

    /// First child named `name`, depth-first when `recursive`.
    pub fn find_by_name(&self, root: ControlId, name: &str, recursive: bool) -> Option<ControlId> {
        for &child in self.children(root) {
            if self.control(child).is_some_and(|c| c.name == name) {
                return Some(child);
            }
            if recursive && let Some(found) = self.find_by_name(child, name, true) {
                return Some(found);
            }
        }
        None
    }

    /// Resolve a `/`-separated path starting at `root`.
    ///
    /// `..` steps to the parent, `.` stays, `^` jumps to the tree root, `*` matches any single
    /// level and `**` any number of levels, including none. Other segments name a direct
    /// child.
    ///
    /// ```
    /// use canopy_control::ControlSystem;
    /// use kurbo::Rect;
    ///
    /// let mut system = ControlSystem::new();
    /// let [root, panel, button] = ["root", "panel", "button"].map(|name| {
    ///     let id = system.create_control(Rect::ZERO);
    ///     system.set_name(id, name);
    ///     id
    /// });
    /// system.add_control(root, panel);
    /// system.add_control(panel, button);
    ///
    /// assert_eq!(system.find_by_path(root, "panel/button"), Some(button));
    /// assert_eq!(system.find_by_path(button, "../../panel"), Some(panel));
    /// assert_eq!(system.find_by_path(button, "^/**/button"), Some(button));
    /// assert_eq!(system.find_by_path(root, "*/button"), Some(button));
    /// assert_eq!(system.find_by_path(root, "button"), None);
    /// ```
    pub fn find_by_path(&self, root: ControlId, path: &str) -> Option<ControlId> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.find_by_segments(root, &segments)
    }

    fn find_by_segments(&self, root: ControlId, segments: &[&str]) -> Option<ControlId> {
        let mut current = root;
        for (i, segment) in segments.iter().enumerate() {
            let rest = &segments[i + 1..];
            current = match *segment {
                ".." => self.parent(current)?,
                "." => current,
                "^" => self.root_of(current),
                "*" => {
                    return self
                        .children(current)
                        .iter()
                        .find_map(|&child| self.find_by_segments(child, rest));
                }
                "**" => return self.find_by_segments_deep(current, rest),
                name => self.find_by_name(current, name, false)?,
            };
        }
        self.is_alive(current).then_some(current)
    }

    fn find_by_segments_deep(&self, root: ControlId, segments: &[&str]) -> Option<ControlId> {
        self.find_by_segments(root, segments).or_else(|| {
            self.children(root)
                .iter()
                .find_map(|&child| self.find_by_segments_deep(child, segments))
        })
    }
}
