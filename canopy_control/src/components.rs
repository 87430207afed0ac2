// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Components attached to controls.
//!
//! Adding or removing a component marks the control's style and layout dirty. While the
//! control is active every component is also listed in the system's per-type registry, so
//! passes such as [`update`](ControlSystem::update) reach the controls carrying a kind without
//! walking the trees.

use alloc::vec::Vec;

use canopy_component::{ClipContent, Component, ComponentType, ModalInput, RuntimeType};
use canopy_visual::Background;

use crate::id::ControlId;
use crate::system::ControlSystem;

impl ControlSystem {
    /// Attach a component after the control's existing components of the same kind.
    pub fn add_component(&mut self, id: ControlId, component: Component) {
        self.attach_component(id, component, None);
    }

    /// Attach a component so that it becomes the `index`-th of its kind. An index past the
    /// current count appends.
    pub fn insert_component_at(&mut self, id: ControlId, component: Component, index: usize) {
        self.attach_component(id, component, Some(index));
    }

    fn attach_component(&mut self, id: ControlId, component: Component, index: Option<usize>) {
        let modal = matches!(component, Component::ModalInput(_));
        let Some((node, manager)) = self.node_with_manager(id) else {
            return;
        };
        let pos = match index {
            Some(index) => node.components.insert_at(manager, component, index),
            None => node.components.add(manager, component),
        };
        let rt = node.components.entry(pos).map(|(rt, _)| rt);
        node.style_dirty = true;
        node.layout_dirty = true;
        let active = node.is_active();
        let visible = node.is_visible();
        if active && let Some(rt) = rt {
            self.registered_components.entry(rt).or_default().push(id);
        }
        if modal && visible {
            self.update_modal_control();
        }
    }

    /// The `index`-th component of type `T`.
    pub fn component<T: ComponentType>(&self, id: ControlId, index: usize) -> Option<&T> {
        self.control(id)?
            .components
            .get_typed::<T>(&self.component_manager, index)
    }

    /// Mutable access to the `index`-th component of type `T`.
    ///
    /// Use [`with_background`](Self::with_background) for backgrounds, so that layout
    /// invalidations are picked up.
    pub fn component_mut<T: ComponentType>(&mut self, id: ControlId, index: usize) -> Option<&mut T> {
        let (node, manager) = self.node_with_manager(id)?;
        node.components.get_typed_mut::<T>(manager, index)
    }

    /// Number of components of type `T`.
    pub fn component_count<T: ComponentType>(&self, id: ControlId) -> usize {
        self.control(id)
            .map_or(0, |c| c.components.count_of::<T>(&self.component_manager))
    }

    /// Whether the control carries a component of type `T`.
    pub fn has_component<T: ComponentType>(&self, id: ControlId) -> bool {
        self.component_count::<T>(id) > 0
    }

    /// The `index`-th component of the kind registered under `name`.
    pub fn component_by_name(&self, id: ControlId, name: &str, index: usize) -> Option<&Component> {
        self.control(id)?
            .components
            .get_by_name(&self.component_manager, name, index)
    }

    /// The first component of type `T`, created with its default value when missing.
    ///
    /// ```
    /// use canopy_component::FocusComponent;
    /// use canopy_control::ControlSystem;
    /// use kurbo::Rect;
    ///
    /// let mut system = ControlSystem::new();
    /// let id = system.create_control(Rect::ZERO);
    /// system.get_or_create_component::<FocusComponent>(id).unwrap().enabled = false;
    /// assert_eq!(system.component_count::<FocusComponent>(id), 1);
    /// assert!(!system.get_or_create_component::<FocusComponent>(id).unwrap().enabled);
    /// ```
    pub fn get_or_create_component<T: ComponentType + Default>(
        &mut self,
        id: ControlId,
    ) -> Option<&mut T> {
        if !self.is_alive(id) {
            return None;
        }
        if !self.has_component::<T>(id) {
            self.add_component(id, T::default().into_component());
        }
        self.component_mut::<T>(id, 0)
    }

    /// Remove the `index`-th component of type `T`.
    pub fn remove_component<T: ComponentType>(
        &mut self,
        id: ControlId,
        index: usize,
    ) -> Option<Component> {
        let rt = self.component_manager.types.runtime_type(T::kind())?;
        self.remove_component_of(id, rt, index)
    }

    /// Remove the `index`-th component of a runtime type.
    ///
    /// The control leaves the system registry before the component leaves the control.
    pub fn remove_component_of(
        &mut self,
        id: ControlId,
        rt: RuntimeType,
        index: usize,
    ) -> Option<Component> {
        let control = self.control(id)?;
        if index >= control.components.count(rt) {
            return None;
        }
        if control.is_active() {
            self.unregister_component(id, rt);
        }
        let (node, manager) = self.node_with_manager(id)?;
        let removed = node.components.remove(manager, rt, index)?;
        node.style_dirty = true;
        node.layout_dirty = true;
        if matches!(removed, Component::ModalInput(_)) && node.is_visible() {
            self.update_modal_control();
        }
        Some(removed)
    }

    /// Remove every component of a control, returning them last first.
    pub fn remove_all_components(&mut self, id: ControlId) -> Vec<Component> {
        let Some(control) = self.control(id) else {
            return Vec::new();
        };
        if control.is_active() {
            let types: Vec<RuntimeType> = control.components.iter().map(|(rt, _)| rt).collect();
            for rt in types {
                self.unregister_component(id, rt);
            }
        }
        let Some((node, manager)) = self.node_with_manager(id) else {
            return Vec::new();
        };
        let removed: Vec<Component> = node
            .components
            .remove_all(manager)
            .into_iter()
            .map(|(_, c)| c)
            .collect();
        if removed.is_empty() {
            return removed;
        }
        node.style_dirty = true;
        node.layout_dirty = true;
        let visible = node.is_visible();
        if visible && removed.iter().any(|c| matches!(c, Component::ModalInput(_))) {
            self.update_modal_control();
        }
        removed
    }

    /// Edit the control's first background. A layout invalidation the edit records (new
    /// sprite, draw type or stretch caps) marks the control's layout dirty.
    ///
    /// ```
    /// use canopy_control::ControlSystem;
    /// use canopy_visual::{Background, DrawType};
    /// use kurbo::Rect;
    ///
    /// let mut system = ControlSystem::new();
    /// let id = system.create_control(Rect::new(0.0, 0.0, 10.0, 10.0));
    /// system.get_or_create_component::<Background>(id);
    /// system.reset_layout_dirty(id);
    ///
    /// system.with_background(id, |bg| bg.set_draw_type(DrawType::StretchBoth));
    /// assert!(system.control(id).unwrap().layout_dirty());
    /// ```
    pub fn with_background<R>(
        &mut self,
        id: ControlId,
        f: impl FnOnce(&mut Background) -> R,
    ) -> Option<R> {
        let (node, manager) = self.node_with_manager(id)?;
        let background = node.components.get_typed_mut::<Background>(manager, 0)?;
        let result = f(background);
        if background.take_layout_invalidation() {
            node.layout_dirty = true;
        }
        Some(result)
    }

    /// Active controls carrying a component of type `T`, in registration order. A control is
    /// listed once per such component.
    pub fn registered_controls<T: ComponentType>(&self) -> &[ControlId] {
        self.component_manager
            .types
            .runtime_type(T::kind())
            .and_then(|rt| self.registered_components.get(&rt))
            .map(|ids| ids.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn unregister_component(&mut self, id: ControlId, rt: RuntimeType) {
        let Some(ids) = self.registered_components.get_mut(&rt) else {
            return;
        };
        if let Some(pos) = ids.iter().position(|c| *c == id) {
            ids.remove(pos);
        }
        if ids.is_empty() {
            self.registered_components.remove(&rt);
        }
    }

    /// Whether the control clips its children.
    pub(crate) fn clips_content(&self, id: ControlId) -> bool {
        self.component::<ClipContent>(id, 0)
            .is_some_and(|clip| clip.enabled)
    }

    /// Whether the control carries an enabled modal input component.
    pub fn is_modal_candidate(&self, id: ControlId) -> bool {
        self.component::<ModalInput>(id, 0)
            .is_some_and(|modal| modal.enabled)
    }
}

#[cfg(test)]
mod tests {
    use canopy_component::{ClipContent, Component, FocusComponent, ModalInput, UpdateComponent};
    use canopy_visual::Background;
    use kurbo::Rect;

    use crate::ControlSystem;

    #[test]
    fn components_register_while_the_control_is_active() {
        let mut system = ControlSystem::new();
        let screen = system.create_control(Rect::new(0.0, 0.0, 10.0, 10.0));
        let child = system.create_control(Rect::ZERO);
        system.add_control(screen, child);
        system.add_component(child, Component::Update(UpdateComponent));
        assert!(
            system.registered_controls::<UpdateComponent>().is_empty(),
            "inactive controls are not registered"
        );

        system.set_screen(Some(screen));
        assert_eq!(system.registered_controls::<UpdateComponent>(), [child]);
        system.add_component(child, Component::Update(UpdateComponent));
        assert_eq!(system.registered_controls::<UpdateComponent>(), [child, child]);

        system.remove_component::<UpdateComponent>(child, 1);
        assert_eq!(system.registered_controls::<UpdateComponent>(), [child]);
        system.remove_control(screen, child);
        assert!(system.registered_controls::<UpdateComponent>().is_empty());
        assert_eq!(system.component_count::<UpdateComponent>(child), 1);
    }

    #[test]
    fn adding_and_removing_marks_style_and_layout_dirty() {
        let mut system = ControlSystem::new();
        let id = system.create_control(Rect::ZERO);
        system.reset_layout_dirty(id);
        system.reset_style_dirty(id);
        system.add_component(id, Component::ClipContent(ClipContent::default()));
        let control = system.control(id).unwrap();
        assert!(control.layout_dirty() && control.style_dirty());

        system.reset_layout_dirty(id);
        system.reset_style_dirty(id);
        assert!(system.remove_component::<ClipContent>(id, 3).is_none(), "out of range");
        assert!(!system.control(id).unwrap().style_dirty());
        assert!(system.remove_component::<ClipContent>(id, 0).is_some());
        assert!(system.control(id).unwrap().style_dirty());
    }

    #[test]
    fn insert_at_and_lookup_by_name() {
        let mut system = ControlSystem::new();
        let id = system.create_control(Rect::ZERO);
        system.add_component(id, Component::Focus(FocusComponent { enabled: true }));
        system.insert_component_at(id, Component::Focus(FocusComponent { enabled: false }), 0);
        assert_eq!(system.component_count::<FocusComponent>(id), 2);
        assert_eq!(
            system.component::<FocusComponent>(id, 0),
            Some(&FocusComponent { enabled: false })
        );
        assert!(system.component_by_name(id, "Focus", 1).is_some());
        assert!(system.component_by_name(id, "Focus", 2).is_none());
        system.component_mut::<FocusComponent>(id, 1).unwrap().enabled = false;

        let removed = system.remove_all_components(id);
        assert_eq!(removed.len(), 2);
        assert!(!system.has_component::<FocusComponent>(id));
    }

    #[test]
    fn toggling_a_modal_component_on_a_visible_popup() {
        let mut system = ControlSystem::new();
        let screen = system.create_control(Rect::new(0.0, 0.0, 10.0, 10.0));
        system.set_screen(Some(screen));
        let popup = system.create_control(Rect::new(0.0, 0.0, 5.0, 5.0));
        system.add_popup(popup);
        assert_eq!(system.modal_control(), None);

        system.add_component(popup, Component::ModalInput(ModalInput::default()));
        assert!(system.is_modal_candidate(popup));
        assert_eq!(system.modal_control(), Some(popup));
        system.remove_all_components(popup);
        assert_eq!(system.modal_control(), None);
    }

    #[test]
    fn stretch_cap_changes_mark_layout_dirty() {
        let mut system = ControlSystem::new();
        let id = system.create_control(Rect::ZERO);
        system.get_or_create_component::<Background>(id);
        system.reset_layout_dirty(id);

        system.with_background(id, |bg| bg.set_left_right_stretch_cap(4.0));
        assert!(system.control(id).unwrap().layout_dirty());
        system.reset_layout_dirty(id);
        system.with_background(id, |bg| bg.set_left_right_stretch_cap(4.0));
        assert!(!system.control(id).unwrap().layout_dirty(), "unchanged cap");

        system.with_background(id, |bg| bg.set_top_bottom_stretch_cap(2.0));
        assert!(system.control(id).unwrap().layout_dirty());
    }
}
