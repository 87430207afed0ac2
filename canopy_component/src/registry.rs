// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime type ids.

use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::component::{Component, ComponentKind};
use crate::family::FamilyCache;

/// Dense id of a component kind, assigned on first registration.
///
/// Built-in kinds take the first ids in [`ComponentKind::BUILTIN`] order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeType(pub(crate) u32);

impl RuntimeType {
    /// Index into per-type tables.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Registry of component kinds and their runtime types.
#[derive(Clone, Debug)]
pub struct ComponentTypes {
    kinds: Vec<(ComponentKind, &'static str)>,
    by_kind: HashMap<ComponentKind, RuntimeType>,
    by_name: HashMap<&'static str, RuntimeType>,
}

impl Default for ComponentTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentTypes {
    /// A registry holding the built-in kinds.
    pub fn new() -> Self {
        let mut types = Self {
            kinds: Vec::new(),
            by_kind: HashMap::new(),
            by_name: HashMap::new(),
        };
        for (kind, name) in ComponentKind::BUILTIN {
            types.register(kind, name);
        }
        types
    }

    /// Register `kind` under `name`, returning its runtime type. Registering a known kind
    /// returns the existing id.
    pub fn register(&mut self, kind: ComponentKind, name: &'static str) -> RuntimeType {
        if let Some(rt) = self.by_kind.get(&kind) {
            return *rt;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Kind counts are far below u32::MAX."
        )]
        let rt = RuntimeType(self.kinds.len() as u32);
        self.kinds.push((kind, name));
        self.by_kind.insert(kind, rt);
        if self.by_name.insert(name, rt).is_some() {
            log::warn!("component name {name:?} registered twice; lookups by name now find the newer kind");
        }
        rt
    }

    /// Runtime type of a component, registering its kind on first sight.
    pub fn runtime_type_of(&mut self, component: &Component) -> RuntimeType {
        self.register(component.kind(), component.type_name())
    }

    /// Runtime type of a registered kind.
    pub fn runtime_type(&self, kind: ComponentKind) -> Option<RuntimeType> {
        self.by_kind.get(&kind).copied()
    }

    /// Runtime type registered under `name`.
    pub fn by_name(&self, name: &str) -> Option<RuntimeType> {
        self.by_name.get(name).copied()
    }

    /// Kind of a runtime type.
    pub fn kind(&self, rt: RuntimeType) -> Option<ComponentKind> {
        self.kinds.get(rt.index()).map(|(kind, _)| *kind)
    }

    /// Name of a runtime type.
    pub fn name(&self, rt: RuntimeType) -> Option<&'static str> {
        self.kinds.get(rt.index()).map(|(_, name)| *name)
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether no kind is registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Runtime types plus the family cache: the context every [`ComponentList`](crate::ComponentList)
/// mutation needs.
#[derive(Debug, Default)]
pub struct ComponentManager {
    /// Registered kinds.
    pub types: ComponentTypes,
    /// Interned families.
    pub families: FamilyCache,
}

impl ComponentManager {
    /// A manager with built-in kinds registered and no families.
    pub fn new() -> Self {
        Self::default()
    }
}
