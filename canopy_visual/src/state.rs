// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control state bits and the per-state visual table.

bitflags::bitflags! {
    /// Interaction state of a control.
    ///
    /// These are bits rather than separate booleans because style and draw logic dispatch on
    /// combinations of them (for example pressed while hovered).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ControlState: u32 {
        /// Not pressed.
        const NORMAL          = 1 << 0;
        /// Pressed, with every tracked touch now outside the control.
        const PRESSED_OUTSIDE = 1 << 1;
        /// Pressed, with at least one tracked touch inside the control.
        const PRESSED_INSIDE  = 1 << 2;
        /// Disabled; the control ignores input.
        const DISABLED        = 1 << 3;
        /// Selected.
        const SELECTED        = 1 << 4;
        /// Under the pointer.
        const HOVER           = 1 << 5;
        /// Holds keyboard focus.
        const FOCUSED         = 1 << 6;
    }
}

impl ControlState {
    /// Either pressed bit.
    pub const PRESSED: Self = Self::PRESSED_OUTSIDE.union(Self::PRESSED_INSIDE);
}

impl Default for ControlState {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Visual state a control is drawn in, derived from its [`ControlState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawState {
    /// Default look.
    Unpressed,
    /// Pressed, pointer outside.
    PressedOutside,
    /// Pressed, pointer inside.
    PressedInside,
    /// Disabled.
    Disabled,
    /// Selected.
    Selected,
    /// Hovered.
    Hovered,
}

/// Ordered fallback edges: a state with no entry of its own borrows the next state's entry.
/// States not listed fall back to [`DrawState::Unpressed`].
const FALLBACKS: &[(DrawState, DrawState)] = &[
    (DrawState::PressedInside, DrawState::PressedOutside),
    (DrawState::Selected, DrawState::PressedInside),
];

/// Checked in priority order when mapping control state bits to a draw state.
const PRIORITY: &[(ControlState, DrawState)] = &[
    (ControlState::DISABLED, DrawState::Disabled),
    (ControlState::SELECTED, DrawState::Selected),
    (ControlState::PRESSED_INSIDE, DrawState::PressedInside),
    (ControlState::PRESSED_OUTSIDE, DrawState::PressedOutside),
    (ControlState::HOVER, DrawState::Hovered),
];

impl DrawState {
    /// Number of draw states.
    pub const COUNT: usize = 6;

    /// All draw states in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Unpressed,
        Self::PressedOutside,
        Self::PressedInside,
        Self::Disabled,
        Self::Selected,
        Self::Hovered,
    ];

    /// Map control state bits to the draw state with the highest priority.
    pub fn from_control_state(state: ControlState) -> Self {
        PRIORITY
            .iter()
            .find(|(bit, _)| state.contains(*bit))
            .map_or(Self::Unpressed, |(_, draw)| *draw)
    }

    /// The control state bit a draw state stands for.
    pub fn control_state(self) -> ControlState {
        match self {
            Self::Unpressed => ControlState::NORMAL,
            Self::PressedOutside => ControlState::PRESSED_OUTSIDE,
            Self::PressedInside => ControlState::PRESSED_INSIDE,
            Self::Disabled => ControlState::DISABLED,
            Self::Selected => ControlState::SELECTED,
            Self::Hovered => ControlState::HOVER,
        }
    }

    /// The state to try next when this one has no entry, or `None` for
    /// [`Unpressed`](Self::Unpressed).
    pub fn fallback(self) -> Option<Self> {
        if self == Self::Unpressed {
            return None;
        }
        Some(
            FALLBACKS
                .iter()
                .find(|(from, _)| *from == self)
                .map_or(Self::Unpressed, |(_, to)| *to),
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-draw-state entries resolved through the fallback chain.
///
/// ```rust
/// use canopy_visual::{ControlState, DrawState, StateTable};
///
/// let mut table = StateTable::new();
/// table.set(DrawState::Unpressed, "idle");
/// table.set(DrawState::PressedOutside, "pressed");
///
/// // Selected borrows PressedInside, which borrows PressedOutside.
/// assert_eq!(table.resolve(DrawState::Selected), Some(&"pressed"));
/// assert_eq!(table.resolve_control_state(ControlState::HOVER), Some(&"idle"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StateTable<T> {
    entries: [Option<T>; DrawState::COUNT],
}

impl<T> Default for StateTable<T> {
    fn default() -> Self {
        Self {
            entries: [None, None, None, None, None, None],
        }
    }
}

impl<T> StateTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry of `state`, returning the previous one.
    pub fn set(&mut self, state: DrawState, value: T) -> Option<T> {
        self.entries[state.index()].replace(value)
    }

    /// Clear the entry of `state`.
    pub fn clear(&mut self, state: DrawState) -> Option<T> {
        self.entries[state.index()].take()
    }

    /// The entry set for exactly `state`.
    pub fn get(&self, state: DrawState) -> Option<&T> {
        self.entries[state.index()].as_ref()
    }

    /// Mutable access to the entry set for exactly `state`.
    pub fn get_mut(&mut self, state: DrawState) -> Option<&mut T> {
        self.entries[state.index()].as_mut()
    }

    /// The first state along the fallback chain of `state` that has an entry, or
    /// [`DrawState::Unpressed`] when none does.
    pub fn resolved_state(&self, mut state: DrawState) -> DrawState {
        while self.get(state).is_none() {
            match state.fallback() {
                Some(next) => state = next,
                None => break,
            }
        }
        state
    }

    /// The entry used when drawing `state`.
    pub fn resolve(&self, state: DrawState) -> Option<&T> {
        self.get(self.resolved_state(state))
    }

    /// The entry used when drawing a control in `state`.
    pub fn resolve_control_state(&self, state: ControlState) -> Option<&T> {
        self.resolve(DrawState::from_control_state(state))
    }

    /// Set the entry of every draw state whose bit is in `states`.
    pub fn set_for_states(&mut self, states: ControlState, value: T)
    where
        T: Clone,
    {
        for draw in DrawState::ALL {
            if states.contains(draw.control_state()) {
                self.set(draw, value.clone());
            }
        }
    }
}
