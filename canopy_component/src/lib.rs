// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Component: attachable components for Canopy controls.
//!
//! A control owns a [`ComponentList`]: its components kept sorted by a small dense
//! [`RuntimeType`] id. The list points at a shared [`Family`], the classification of "which
//! runtime types, and how many of each" the control holds. Families are interned by signature
//! in a [`FamilyCache`] and shared by every list with the same multiset of types, so
//! `(runtime type, index)` lookups are O(1) without each control keeping its own index.
//!
//! Component kinds known to the core are variants of the closed [`Component`] enum. Anything
//! else goes through [`Component::Custom`] with a [`CustomComponent`] implementation, and gets
//! a runtime type the first time it is seen by [`ComponentTypes`].
//!
//! ## Example
//!
//! ```rust
//! use canopy_component::{Component, ComponentList, ComponentManager, FocusComponent};
//!
//! let mut manager = ComponentManager::new();
//! let mut list = ComponentList::new();
//! list.add(&mut manager, Component::Focus(FocusComponent::default()));
//! list.add(&mut manager, Component::Focus(FocusComponent { enabled: false }));
//!
//! assert_eq!(list.count_of::<FocusComponent>(&manager), 2);
//! let second = list.get_typed::<FocusComponent>(&manager, 1).unwrap();
//! assert!(!second.enabled);
//!
//! // An identical component set on another control shares the same family.
//! let copy = list.clone();
//! assert!(copy.shares_family_with(&list));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod component;
mod family;
mod list;
mod registry;

pub use component::{
    ClipContent, Component, ComponentKind, ComponentType, CustomComponent, FocusComponent,
    ModalInput, UpdateComponent,
};
pub use family::{Family, FamilyCache, Signature};
pub use list::ComponentList;
pub use registry::{ComponentManager, ComponentTypes, RuntimeType};
