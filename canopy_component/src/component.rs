// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component kinds.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt::Debug;

use canopy_visual::Background;

/// Marks a control for the update pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateComponent;

/// Clips a control's children to its rect, for drawing and for hit testing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipContent {
    /// Whether clipping applies.
    pub enabled: bool,
}

impl Default for ClipContent {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Makes a control focusable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusComponent {
    /// Whether the control may take focus.
    pub enabled: bool,
}

impl Default for FocusComponent {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Makes a visible control the modal input root: only it and its subtree receive input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModalInput {
    /// Whether the control is modal.
    pub enabled: bool,
}

impl Default for ModalInput {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Extension point for component kinds the core does not know about.
///
/// ```rust
/// use canopy_component::{Component, ComponentKind, CustomComponent};
/// use core::any::Any;
///
/// #[derive(Clone, Debug)]
/// struct Tooltip(&'static str);
///
/// impl CustomComponent for Tooltip {
///     fn type_name(&self) -> &'static str {
///         "Tooltip"
///     }
///     fn clone_box(&self) -> Box<dyn CustomComponent> {
///         Box::new(self.clone())
///     }
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
///
/// let component = Component::Custom(Box::new(Tooltip("hint")));
/// assert_eq!(component.kind(), ComponentKind::custom::<Tooltip>());
/// assert_eq!(component.downcast_ref::<Tooltip>().map(|t| t.0), Some("hint"));
/// ```
pub trait CustomComponent: Any + Debug {
    /// Stable name used for lookups by name.
    fn type_name(&self) -> &'static str;
    /// Clone into a new box.
    fn clone_box(&self) -> Box<dyn CustomComponent>;
    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A component attached to a control.
#[derive(Debug)]
pub enum Component {
    /// Visual background.
    Background(Box<Background>),
    /// Update pass marker.
    Update(UpdateComponent),
    /// Child clipping.
    ClipContent(ClipContent),
    /// Focusability.
    Focus(FocusComponent),
    /// Modal input root.
    ModalInput(ModalInput),
    /// Anything else.
    Custom(Box<dyn CustomComponent>),
}

impl Clone for Component {
    fn clone(&self) -> Self {
        match self {
            Self::Background(b) => Self::Background(b.clone()),
            Self::Update(u) => Self::Update(*u),
            Self::ClipContent(c) => Self::ClipContent(*c),
            Self::Focus(f) => Self::Focus(*f),
            Self::ModalInput(m) => Self::ModalInput(*m),
            Self::Custom(c) => Self::Custom(c.clone_box()),
        }
    }
}

impl Component {
    /// Static kind of this component.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Background(_) => ComponentKind::Background,
            Self::Update(_) => ComponentKind::Update,
            Self::ClipContent(_) => ComponentKind::ClipContent,
            Self::Focus(_) => ComponentKind::Focus,
            Self::ModalInput(_) => ComponentKind::ModalInput,
            Self::Custom(c) => ComponentKind::Custom(c.as_any().type_id()),
        }
    }

    /// Name of this component's kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Custom(c) => c.type_name(),
            _ => self.kind().builtin_name().unwrap_or("Custom"),
        }
    }

    /// Downcast a custom component.
    pub fn downcast_ref<T: CustomComponent>(&self) -> Option<&T> {
        match self {
            Self::Custom(c) => c.as_any().downcast_ref(),
            _ => None,
        }
    }

    /// Mutably downcast a custom component.
    pub fn downcast_mut<T: CustomComponent>(&mut self) -> Option<&mut T> {
        match self {
            Self::Custom(c) => c.as_any_mut().downcast_mut(),
            _ => None,
        }
    }
}

/// Static identity of a component kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// [`Component::Background`].
    Background,
    /// [`Component::Update`].
    Update,
    /// [`Component::ClipContent`].
    ClipContent,
    /// [`Component::Focus`].
    Focus,
    /// [`Component::ModalInput`].
    ModalInput,
    /// A [`CustomComponent`] implementation.
    Custom(TypeId),
}

impl ComponentKind {
    /// Built-in kinds, in runtime type order.
    pub const BUILTIN: [(Self, &'static str); 5] = [
        (Self::Background, "Background"),
        (Self::Update, "Update"),
        (Self::ClipContent, "ClipContent"),
        (Self::Focus, "Focus"),
        (Self::ModalInput, "ModalInput"),
    ];

    /// Kind of a custom component type.
    pub fn custom<T: CustomComponent>() -> Self {
        Self::Custom(TypeId::of::<T>())
    }

    /// Name of a built-in kind.
    pub fn builtin_name(self) -> Option<&'static str> {
        Self::BUILTIN
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, name)| *name)
    }
}

/// Typed access to components of one kind.
///
/// Implemented for every built-in payload. Custom kinds can implement it with
/// [`ComponentKind::custom`] and [`Component::downcast_ref`].
pub trait ComponentType: Sized + 'static {
    /// Kind of this type.
    fn kind() -> ComponentKind;
    /// Borrow the payload if `component` is of this type.
    fn from_component(component: &Component) -> Option<&Self>;
    /// Mutably borrow the payload if `component` is of this type.
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
    /// Wrap the payload.
    fn into_component(self) -> Component;
}

macro_rules! builtin_component {
    ($ty:ty, $variant:ident) => {
        impl ComponentType for $ty {
            fn kind() -> ComponentKind {
                ComponentKind::$variant
            }

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(c) => Some(c),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(c) => Some(c),
                    _ => None,
                }
            }

            fn into_component(self) -> Component {
                Component::$variant(self)
            }
        }
    };
}

builtin_component!(UpdateComponent, Update);
builtin_component!(ClipContent, ClipContent);
builtin_component!(FocusComponent, Focus);
builtin_component!(ModalInput, ModalInput);

impl ComponentType for Background {
    fn kind() -> ComponentKind {
        ComponentKind::Background
    }

    fn from_component(component: &Component) -> Option<&Self> {
        match component {
            Component::Background(b) => Some(b.as_ref()),
            _ => None,
        }
    }

    fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
        match component {
            Component::Background(b) => Some(b.as_mut()),
            _ => None,
        }
    }

    fn into_component(self) -> Component {
        Component::Background(Box::new(self))
    }
}
