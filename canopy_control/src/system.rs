// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The control arena and its host roots.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use canopy_component::{ComponentManager, RuntimeType};
use hashbrown::{HashMap, HashSet};
use kurbo::Rect;

use crate::behavior::ControlBehavior;
use crate::config::SystemConfig;
use crate::control::Control;
use crate::event::EventListener;
use crate::id::ControlId;
use crate::input::InputState;
use crate::view_state::ViewState;

/// Owner of every control plus the state shared between them.
///
/// Controls live in a generational arena and are addressed by [`ControlId`]. Three host
/// controls root the live trees: the current screen, the popup container (created with the
/// system and always active) and an optional flow root. A control is active exactly while it
/// is attached to a host.
///
/// Besides the arena the system holds the singletons input dispatch relies on: the hovered,
/// focused, modal and exclusive-input controls, the tracked touches and the registries of
/// active and visible controls.
pub struct ControlSystem {
    nodes: Vec<Option<Control>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,

    pub(crate) config: SystemConfig,
    pub(crate) component_manager: ComponentManager,

    pub(crate) screen: Option<ControlId>,
    pub(crate) popup_container: ControlId,
    pub(crate) flow_root: Option<ControlId>,

    pub(crate) active: HashSet<ControlId>,
    pub(crate) visible: HashSet<ControlId>,
    pub(crate) registered_components: HashMap<RuntimeType, Vec<ControlId>>,

    pub(crate) input: InputState,
    pub(crate) listeners: Vec<EventListener>,
}

impl fmt::Debug for ControlSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSystem")
            .field("live", &self.len())
            .field("screen", &self.screen)
            .field("popup_container", &self.popup_container)
            .field("flow_root", &self.flow_root)
            .field("active", &self.active.len())
            .field("visible", &self.visible.len())
            .field("input", &self.input)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for ControlSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSystem {
    /// A system with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    /// A system with an explicit configuration.
    ///
    /// The popup container is created here and activated as a visible host.
    pub fn with_config(config: SystemConfig) -> Self {
        let mut system = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            config,
            component_manager: ComponentManager::new(),
            screen: None,
            popup_container: ControlId::new(0, 0),
            flow_root: None,
            active: HashSet::new(),
            visible: HashSet::new(),
            registered_components: HashMap::new(),
            input: InputState::default(),
            listeners: Vec::new(),
        };
        let popups = system.create_control(Rect::new(0.0, 0.0, 1.0, 1.0));
        system.popup_container = popups;
        system.set_name(popups, "popup_container");
        system.set_input_enabled(popups, false, false);
        system.invoke_active(popups, ViewState::Visible);
        system
    }

    /// Current configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect for the next event and pass.
    pub fn set_config(&mut self, config: SystemConfig) {
        self.config = config;
    }

    /// Component kinds and families shared by every control.
    pub fn component_manager(&self) -> &ComponentManager {
        &self.component_manager
    }

    /// Mutable access to the component registry, for registering custom kinds up front.
    pub fn component_manager_mut(&mut self) -> &mut ComponentManager {
        &mut self.component_manager
    }

    // --- arena ---

    pub(crate) fn alloc(&mut self, control: Control) -> ControlId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generations[idx] = self.generations[idx].saturating_add(1);
            self.nodes[idx] = Some(control);
            idx
        } else {
            self.nodes.push(Some(control));
            self.generations.push(1);
            self.nodes.len() - 1
        };
        self.id_at(idx)
    }

    fn id_at(&self, idx: usize) -> ControlId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ControlId indices are 32-bit."
        )]
        let raw = idx as u32;
        ControlId::new(raw, self.generations[idx])
    }

    pub(crate) fn free(&mut self, id: ControlId) -> Option<Control> {
        if !self.is_alive(id) {
            return None;
        }
        let control = self.nodes[id.idx()].take();
        self.free_list.push(id.idx());
        control
    }

    /// Whether `id` refers to a live control.
    pub fn is_alive(&self, id: ControlId) -> bool {
        self.generations.get(id.idx()) == Some(&id.1)
            && self.nodes.get(id.idx()).is_some_and(Option::is_some)
    }

    /// Read access to a control.
    pub fn control(&self, id: ControlId) -> Option<&Control> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes[id.idx()].as_ref()
    }

    pub(crate) fn node_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes[id.idx()].as_mut()
    }

    /// A control together with the component manager, for component list mutations.
    pub(crate) fn node_with_manager(
        &mut self,
        id: ControlId,
    ) -> Option<(&mut Control, &mut ComponentManager)> {
        if !self.is_alive(id) {
            return None;
        }
        let control = self.nodes[id.idx()].as_mut()?;
        Some((control, &mut self.component_manager))
    }

    /// Number of live controls, hosts included.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Whether no control is live. Never true, the popup container always exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of every live control in slot order.
    pub fn controls(&self) -> impl Iterator<Item = ControlId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_some())
            .map(|(idx, _)| self.id_at(idx))
    }

    pub(crate) fn behavior_of(&self, id: ControlId) -> Option<Rc<dyn ControlBehavior>> {
        self.control(id)?.behavior.clone()
    }

    /// Parent of a control.
    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.control(id)?.parent
    }

    /// Children of a control, back to front.
    pub fn children(&self, id: ControlId) -> &[ControlId] {
        self.control(id)
            .map(|c| c.children.as_slice())
            .unwrap_or_default()
    }

    /// Lifecycle state of a control.
    pub fn view_state(&self, id: ControlId) -> Option<ViewState> {
        Some(self.control(id)?.view_state)
    }

    // --- hosts ---

    /// Current screen.
    pub fn screen(&self) -> Option<ControlId> {
        self.screen
    }

    /// The always-active container of popups.
    pub fn popup_container(&self) -> ControlId {
        self.popup_container
    }

    /// Current flow root.
    pub fn flow_root(&self) -> Option<ControlId> {
        self.flow_root
    }

    /// Whether `id` roots a live tree.
    pub fn is_host(&self, id: ControlId) -> bool {
        id == self.popup_container || self.screen == Some(id) || self.flow_root == Some(id)
    }

    /// Replace the current screen.
    ///
    /// Inputs are locked for the switch, so every tracked touch is cancelled. The old screen
    /// goes through the invisible and inactive transitions before the new one is activated
    /// as visible.
    pub fn set_screen(&mut self, screen: Option<ControlId>) {
        if self.screen == screen {
            return;
        }
        if let Some(next) = screen
            && !self.prepare_host(next)
        {
            return;
        }
        log::debug!("switching screen {:?} -> {:?}", self.screen, screen);
        self.lock_input();
        if let Some(previous) = self.screen {
            self.invoke_inactive(previous);
        }
        self.screen = screen;
        if let Some(next) = screen {
            self.invoke_active(next, ViewState::Visible);
        }
        self.update_modal_control();
        self.unlock_input();
    }

    /// Replace the flow root, with the same transitions as [`set_screen`](Self::set_screen).
    pub fn set_flow_root(&mut self, root: Option<ControlId>) {
        if self.flow_root == root {
            return;
        }
        if let Some(next) = root
            && !self.prepare_host(next)
        {
            return;
        }
        self.lock_input();
        if let Some(previous) = self.flow_root {
            self.invoke_inactive(previous);
        }
        self.flow_root = root;
        if let Some(next) = root {
            self.invoke_active(next, ViewState::Visible);
        }
        self.unlock_input();
    }

    fn prepare_host(&mut self, id: ControlId) -> bool {
        let ok = self.is_alive(id) && !self.is_host(id);
        ui_assert!(ok, "control {id} cannot become a host");
        if ok {
            self.remove_from_parent(id);
        }
        ok
    }

    /// Show a popup on top of the screen.
    pub fn add_popup(&mut self, popup: ControlId) {
        if self.parent(popup) == Some(self.popup_container) {
            return;
        }
        let container = self.popup_container;
        self.add_control(container, popup);
    }

    /// Hide a popup shown with [`add_popup`](Self::add_popup).
    pub fn remove_popup(&mut self, popup: ControlId) {
        if self.parent(popup) != Some(self.popup_container) {
            log::warn!("remove_popup: {popup} is not a shown popup");
            return;
        }
        let container = self.popup_container;
        self.remove_control(container, popup);
    }

    /// Hide every popup.
    pub fn remove_all_popups(&mut self) {
        let container = self.popup_container;
        self.remove_all_controls(container);
    }

    // --- registries ---

    /// Whether `id` is registered as active.
    pub fn is_registered_active(&self, id: ControlId) -> bool {
        self.active.contains(&id)
    }

    /// Whether `id` is registered as visible.
    pub fn is_registered_visible(&self, id: ControlId) -> bool {
        self.visible.contains(&id)
    }

    /// Number of active controls.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of visible controls.
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}
