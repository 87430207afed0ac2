// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics over the live control set.

use alloc::vec::Vec;

use crate::id::ControlId;
use crate::system::ControlSystem;

impl ControlSystem {
    /// Log live controls at debug level and return how many were listed.
    ///
    /// With `only_orphans`, only controls with no parent that are not hosts are listed. Such
    /// controls are neither drawn nor reached by input and usually point at a leak.
    pub fn dump_controls(&self, only_orphans: bool) -> usize {
        let mut listed = 0;
        let mut orphans = 0;
        for id in self.controls() {
            let Some(control) = self.control(id) else {
                continue;
            };
            let orphan = control.parent().is_none() && !self.is_host(id);
            if orphan {
                orphans += 1;
            }
            if only_orphans && !orphan {
                continue;
            }
            listed += 1;
            log::debug!(
                "{id} {:?} class=[{}] view={:?} children={}",
                control.name(),
                control.classes_string(),
                control.view_state(),
                control.children().len(),
            );
        }
        log::debug!("Total controls count: {}, orphans count: {orphans}", self.len());
        listed
    }

    /// Log the input-processor counts of a subtree, one line per control, indented by depth.
    pub fn dump_inputs(&self, id: ControlId) {
        let mut stack: Vec<(ControlId, usize)> = Vec::from([(id, 0)]);
        while let Some((current, depth)) = stack.pop() {
            let Some(control) = self.control(current) else {
                continue;
            };
            log::debug!(
                "{:indent$}{current} {:?} processors={} input_enabled={}",
                "",
                control.name(),
                control.input_processors(),
                control.input_enabled(),
                indent = depth * 2,
            );
            stack.extend(control.children().iter().rev().map(|c| (*c, depth + 1)));
        }
    }

    /// Recompute the input-processor count of every control in a subtree and compare it with
    /// the stored counter. Mismatches are logged.
    pub fn verify_input_processors(&self, id: ControlId) -> bool {
        self.count_input_processors(id).is_some()
    }

    /// Expected count of a subtree, or `None` when any control in it disagrees.
    fn count_input_processors(&self, id: ControlId) -> Option<u32> {
        let control = self.control(id)?;
        let mut expected = u32::from(control.input_enabled());
        let mut consistent = true;
        for child in control.children() {
            match self.count_input_processors(*child) {
                Some(count) => expected += count,
                None => consistent = false,
            }
        }
        if expected != control.input_processors() {
            log::error!(
                "control {id} {:?} counts {} input processors, expected {expected}",
                control.name(),
                control.input_processors(),
            );
            return None;
        }
        consistent.then_some(expected)
    }

    #[cfg(debug_assertions)]
    pub(crate) fn debug_check_input_processors(&self, id: ControlId) {
        ui_assert!(
            self.verify_input_processors(id),
            "input processor counts under {id} are inconsistent"
        );
    }
}
