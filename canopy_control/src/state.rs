// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State bits and input flags.

use alloc::vec::Vec;

use canopy_visual::ControlState;

use crate::id::ControlId;
use crate::system::ControlSystem;

impl ControlSystem {
    /// Replace the state bits. Style is marked dirty when they change.
    pub fn set_state(&mut self, id: ControlId, state: ControlState) {
        if let Some(node) = self.node_mut(id)
            && node.state != state
        {
            node.state = state;
            node.style_dirty = true;
        }
    }

    /// Set state bits.
    pub fn add_state(&mut self, id: ControlId, state: ControlState) {
        if let Some(current) = self.control(id).map(|c| c.state) {
            self.set_state(id, current | state);
        }
    }

    /// Clear state bits.
    pub fn remove_state(&mut self, id: ControlId, state: ControlState) {
        if let Some(current) = self.control(id).map(|c| c.state) {
            self.set_state(id, current - state);
        }
    }

    /// Set or clear state bits in one change.
    pub(crate) fn change_state(&mut self, id: ControlId, add: ControlState, remove: ControlState) {
        if let Some(current) = self.control(id).map(|c| c.state) {
            self.set_state(id, (current | add) - remove);
        }
    }

    fn for_subtree(
        &mut self,
        id: ControlId,
        hierarchic: bool,
        mut f: impl FnMut(&mut Self, ControlId),
    ) {
        f(self, id);
        if hierarchic {
            let mut stack: Vec<ControlId> = self.children(id).to_vec();
            while let Some(next) = stack.pop() {
                f(self, next);
                stack.extend_from_slice(self.children(next));
            }
        }
    }

    /// Disable or enable a control. Disabling cancels the inputs held by its subtree.
    pub fn set_disabled(&mut self, id: ControlId, disabled: bool, hierarchic: bool) {
        self.for_subtree(id, hierarchic, |system, c| {
            if disabled {
                system.add_state(c, ControlState::DISABLED);
                system.cancel_inputs(c, true);
            } else {
                system.remove_state(c, ControlState::DISABLED);
            }
        });
    }

    /// Select or deselect a control.
    pub fn set_selected(&mut self, id: ControlId, selected: bool, hierarchic: bool) {
        self.for_subtree(id, hierarchic, |system, c| {
            if selected {
                system.add_state(c, ControlState::SELECTED);
            } else {
                system.remove_state(c, ControlState::SELECTED);
            }
        });
    }

    /// Let a control take input, or not. Ancestors' processor counts follow.
    pub fn set_input_enabled(&mut self, id: ControlId, enabled: bool, hierarchic: bool) {
        self.for_subtree(id, hierarchic, |system, c| {
            let Some(node) = system.node_mut(c) else {
                return;
            };
            if node.input_enabled == enabled {
                return;
            }
            node.input_enabled = enabled;
            if enabled {
                system.register_input_processors(c, 1);
            } else {
                system.unregister_input_processors(c, 1);
            }
        });
    }

    /// Make presses on a control capture all input until released.
    pub fn set_exclusive_input(&mut self, id: ControlId, exclusive: bool, hierarchic: bool) {
        self.for_subtree(id, hierarchic, |system, c| {
            if let Some(node) = system.node_mut(c) {
                node.exclusive_input = exclusive;
            }
        });
    }

    /// Let several touches press a control at once.
    pub fn set_multi_input(&mut self, id: ControlId, multi: bool, hierarchic: bool) {
        self.for_subtree(id, hierarchic, |system, c| {
            if let Some(node) = system.node_mut(c) {
                node.multi_input = multi;
            }
        });
    }
}
