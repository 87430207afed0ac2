// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording behavior shared by the unit tests.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::{ControlBehavior, ControlId, ControlSystem, InputHandled, UiEvent};

/// Hook points the recorder logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Step {
    Active,
    Inactive,
    Visible,
    Invisible,
    Input,
    Cancelled,
    Focused,
    FocusLost,
    HoverSet,
    HoverRemoved,
    TouchOutsideFocus,
}

type Hook = Rc<dyn Fn(&mut ControlSystem, ControlId)>;

#[derive(Default)]
struct Shared {
    log: RefCell<Vec<(Step, String)>>,
    hooks: RefCell<HashMap<(ControlId, Step), Hook>>,
    handled: RefCell<HashMap<ControlId, InputHandled>>,
}

/// Logs every hook of the controls it creates, by control name, in call order.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    shared: Rc<Shared>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Create a named control that reports to this recorder.
    pub(crate) fn control(&self, system: &mut ControlSystem, name: &str, rect: Rect) -> ControlId {
        let id = system.create_control(rect);
        system.set_name(id, name);
        system.set_behavior(
            id,
            Some(Rc::new(Probe {
                shared: self.shared.clone(),
            })),
        );
        id
    }

    /// Run `f` after `id` logs its activation.
    pub(crate) fn on_active(&self, id: ControlId, f: impl Fn(&mut ControlSystem, ControlId) + 'static) {
        self.shared
            .hooks
            .borrow_mut()
            .insert((id, Step::Active), Rc::new(f));
    }

    /// Run `f` after `id` logs its deactivation.
    pub(crate) fn on_inactive(
        &self,
        id: ControlId,
        f: impl Fn(&mut ControlSystem, ControlId) + 'static,
    ) {
        self.shared
            .hooks
            .borrow_mut()
            .insert((id, Step::Inactive), Rc::new(f));
    }

    /// Make `id` mark the input it receives as handled.
    pub(crate) fn handle_input(&self, id: ControlId, handled: InputHandled) {
        self.shared.handled.borrow_mut().insert(id, handled);
    }

    /// Names logged for one step, in order.
    pub(crate) fn names(&self, step: Step) -> Vec<String> {
        self.shared
            .log
            .borrow()
            .iter()
            .filter(|(s, _)| *s == step)
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub(crate) fn steps(&self) -> Vec<(Step, String)> {
        self.shared.log.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.shared.log.borrow_mut().clear();
    }
}

struct Probe {
    shared: Rc<Shared>,
}

impl Probe {
    fn record(&self, system: &mut ControlSystem, id: ControlId, step: Step) {
        let name = system
            .control(id)
            .map(|c| c.name().to_string())
            .unwrap_or_default();
        self.shared.log.borrow_mut().push((step, name));
        let hook = self.shared.hooks.borrow().get(&(id, step)).cloned();
        if let Some(hook) = hook {
            hook(system, id);
        }
    }
}

impl ControlBehavior for Probe {
    fn on_active(&self, system: &mut ControlSystem, id: ControlId) {
        self.record(system, id, Step::Active);
    }

    fn on_inactive(&self, system: &mut ControlSystem, id: ControlId) {
        self.record(system, id, Step::Inactive);
    }

    fn on_visible(&self, system: &mut ControlSystem, id: ControlId) {
        self.record(system, id, Step::Visible);
    }

    fn on_invisible(&self, system: &mut ControlSystem, id: ControlId) {
        self.record(system, id, Step::Invisible);
    }

    fn input(&self, system: &mut ControlSystem, id: ControlId, event: &mut UiEvent) {
        let handled = self.shared.handled.borrow().get(&id).copied();
        event.set_handled(handled.unwrap_or(InputHandled::None));
        self.record(system, id, Step::Input);
    }

    fn input_cancelled(&self, system: &mut ControlSystem, id: ControlId, _event: &UiEvent) {
        self.record(system, id, Step::Cancelled);
    }

    fn on_focused(&self, system: &mut ControlSystem, id: ControlId) {
        self.record(system, id, Step::Focused);
    }

    fn on_focus_lost(&self, system: &mut ControlSystem, id: ControlId) {
        self.record(system, id, Step::FocusLost);
    }

    fn on_touch_outside_focus(&self, system: &mut ControlSystem, id: ControlId) {
        self.record(system, id, Step::TouchOutsideFocus);
    }

    fn did_set_hovered(&self, system: &mut ControlSystem, id: ControlId) {
        self.record(system, id, Step::HoverSet);
    }

    fn did_remove_hovered(&self, system: &mut ControlSystem, id: ControlId) {
        self.record(system, id, Step::HoverRemoved);
    }
}
