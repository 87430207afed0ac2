// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The component array of one control.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::component::{Component, ComponentType};
use crate::family::{Family, Signature};
use crate::registry::{ComponentManager, RuntimeType};

/// Components of a control, sorted by runtime type.
///
/// Components of one runtime type keep their insertion order, so the `i`-th component of a
/// type is stable until something of that type is inserted before it or removed. Lookups go
/// through the shared [`Family`] of the current signature.
///
/// Cloning a list deep-copies its components and shares its family.
#[derive(Clone, Debug, Default)]
pub struct ComponentList {
    entries: Vec<(RuntimeType, Component)>,
    family: Option<Rc<Family>>,
}

impl ComponentList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The shared family, `None` while the list is empty.
    pub fn family(&self) -> Option<&Rc<Family>> {
        self.family.as_ref()
    }

    /// Whether both lists point at the same family.
    pub fn shares_family_with(&self, other: &Self) -> bool {
        match (&self.family, &other.family) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Append a component after the existing components of its type, returning its array
    /// position.
    pub fn add(&mut self, manager: &mut ComponentManager, component: Component) -> usize {
        let rt = manager.types.runtime_type_of(&component);
        let pos = self.entries.partition_point(|(r, _)| *r <= rt);
        self.entries.insert(pos, (rt, component));
        self.rebuild_family(manager);
        pos
    }

    /// Insert a component so that it becomes the `index`-th of its type. An index at or past
    /// the current count appends like [`add`](Self::add).
    pub fn insert_at(
        &mut self,
        manager: &mut ComponentManager,
        component: Component,
        index: usize,
    ) -> usize {
        let rt = manager.types.runtime_type_of(&component);
        let Some(pos) = self.position(rt, index) else {
            return self.add(manager, component);
        };
        self.entries.insert(pos, (rt, component));
        self.rebuild_family(manager);
        pos
    }

    /// Array position of the `index`-th component of `rt`.
    pub fn position(&self, rt: RuntimeType, index: usize) -> Option<usize> {
        self.family.as_ref()?.position(rt, index)
    }

    /// Number of components of `rt`.
    pub fn count(&self, rt: RuntimeType) -> usize {
        self.family.as_ref().map_or(0, |f| f.count(rt))
    }

    /// The `index`-th component of `rt`.
    pub fn get(&self, rt: RuntimeType, index: usize) -> Option<&Component> {
        let pos = self.position(rt, index)?;
        Some(&self.entries[pos].1)
    }

    /// Mutable access to the `index`-th component of `rt`.
    pub fn get_mut(&mut self, rt: RuntimeType, index: usize) -> Option<&mut Component> {
        let pos = self.position(rt, index)?;
        Some(&mut self.entries[pos].1)
    }

    /// The `index`-th component of the kind registered under `name`.
    pub fn get_by_name(
        &self,
        manager: &ComponentManager,
        name: &str,
        index: usize,
    ) -> Option<&Component> {
        self.get(manager.types.by_name(name)?, index)
    }

    /// Number of components of type `T`.
    pub fn count_of<T: ComponentType>(&self, manager: &ComponentManager) -> usize {
        manager
            .types
            .runtime_type(T::kind())
            .map_or(0, |rt| self.count(rt))
    }

    /// The `index`-th component of type `T`.
    pub fn get_typed<T: ComponentType>(
        &self,
        manager: &ComponentManager,
        index: usize,
    ) -> Option<&T> {
        let rt = manager.types.runtime_type(T::kind())?;
        T::from_component(self.get(rt, index)?)
    }

    /// Mutable access to the `index`-th component of type `T`.
    pub fn get_typed_mut<T: ComponentType>(
        &mut self,
        manager: &ComponentManager,
        index: usize,
    ) -> Option<&mut T> {
        let rt = manager.types.runtime_type(T::kind())?;
        T::from_component_mut(self.get_mut(rt, index)?)
    }

    /// Array position of a component borrowed from this list.
    pub fn position_of(&self, component: &Component) -> Option<usize> {
        self.entries
            .iter()
            .position(|(_, c)| core::ptr::eq(c, component))
    }

    /// Runtime type and component at an array position.
    pub fn entry(&self, pos: usize) -> Option<(RuntimeType, &Component)> {
        self.entries.get(pos).map(|(rt, c)| (*rt, c))
    }

    /// Remove the `index`-th component of `rt`.
    pub fn remove(
        &mut self,
        manager: &mut ComponentManager,
        rt: RuntimeType,
        index: usize,
    ) -> Option<Component> {
        let pos = self.position(rt, index)?;
        self.remove_at(manager, pos).map(|(_, c)| c)
    }

    /// Remove the component at an array position.
    pub fn remove_at(
        &mut self,
        manager: &mut ComponentManager,
        pos: usize,
    ) -> Option<(RuntimeType, Component)> {
        if pos >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(pos);
        self.rebuild_family(manager);
        Some(entry)
    }

    /// Remove every component, last first.
    pub fn remove_all(&mut self, manager: &mut ComponentManager) -> Vec<(RuntimeType, Component)> {
        let mut removed = Vec::with_capacity(self.entries.len());
        while let Some(entry) = self.entries.pop() {
            removed.push(entry);
        }
        if let Some(family) = self.family.take() {
            manager.families.release(family);
        }
        removed
    }

    /// Components in array order.
    pub fn iter(&self) -> impl Iterator<Item = (RuntimeType, &Component)> + '_ {
        self.entries.iter().map(|(rt, c)| (*rt, c))
    }

    /// Mutable components in array order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RuntimeType, &mut Component)> + '_ {
        self.entries.iter_mut().map(|(rt, c)| (*rt, c))
    }

    fn rebuild_family(&mut self, manager: &mut ComponentManager) {
        let signature: Signature = self.entries.iter().map(|(rt, _)| *rt).collect();
        let next = (!signature.is_empty()).then(|| manager.families.acquire(signature));
        if let Some(previous) = core::mem::replace(&mut self.family, next) {
            manager.families.release(previous);
        }
    }
}
