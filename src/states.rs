use crate::error::{EngineError, Result};
use crate::events::{EventBus, MapEvent};
use crate::traits::ToolControl;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of named tool states with at most one current at any time.
///
/// The invariant is structural: activation always deactivates the previous
/// state before touching the next one, so no interleaving can leave two
/// controls active. The registry is constructor-injected rather than a
/// process global. Production wiring shares one instance across displays
/// when page-wide tool exclusivity is wanted; tests get isolated instances.
pub struct MapStates {
    states: HashMap<String, Arc<dyn ToolControl>>,
    current: Option<String>,
    default_state: Option<String>,
    bus: EventBus,
}

impl std::fmt::Debug for MapStates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapStates")
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .field("default_state", &self.default_state)
            .finish_non_exhaustive()
    }
}

impl MapStates {
    pub fn new(bus: EventBus) -> Self {
        MapStates {
            states: HashMap::new(),
            current: None,
            default_state: None,
            bus,
        }
    }

    /// Register a new tool state. A duplicate name is a deployment bug.
    pub fn add_state(&mut self, name: impl Into<String>, control: Arc<dyn ToolControl>) -> Result<()> {
        let name = name.into();
        if self.states.contains_key(&name) {
            return Err(EngineError::Configuration(format!(
                "tool state '{}' is already registered",
                name
            )));
        }
        self.states.insert(name, control);
        Ok(())
    }

    /// Configure the state activated whenever the current one deactivates.
    pub fn set_default_state(&mut self, name: impl Into<String>, activate: bool) -> Result<()> {
        let name = name.into();
        if !self.states.contains_key(&name) {
            return Err(EngineError::Configuration(format!(
                "default tool state '{}' is not registered",
                name
            )));
        }
        self.default_state = Some(name.clone());
        if activate {
            self.activate_state(&name);
        }
        Ok(())
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Activate a state, deactivating the current one first.
    ///
    /// Returns whether the name was known; activating the already-current
    /// state is a no-op.
    pub fn activate_state(&mut self, name: &str) -> bool {
        if !self.states.contains_key(name) {
            return false;
        }
        if self.current.as_deref() == Some(name) {
            return true;
        }
        if let Some(previous) = self.current.take() {
            if let Some(control) = self.states.get(&previous) {
                control.deactivate();
            }
            self.bus.publish(MapEvent::ToolDeactivated(previous));
        }
        // between here and the activation below no state is current
        if let Some(control) = self.states.get(name) {
            control.activate();
        }
        self.current = Some(name.to_string());
        tracing::info!(tool = name, "tool activated");
        self.bus.publish(MapEvent::ToolActivated(name.to_string()));
        true
    }

    /// Deactivate a state if it is the current one, then fall back to the
    /// default state: the toolbar returns to the neutral tool rather than
    /// to "no tool".
    pub fn deactivate_state(&mut self, name: &str) -> bool {
        if self.current.as_deref() != Some(name) {
            return false;
        }
        self.current = None;
        if let Some(control) = self.states.get(name) {
            control.deactivate();
        }
        self.bus.publish(MapEvent::ToolDeactivated(name.to_string()));
        if let Some(default) = self.default_state.clone() {
            self.activate_state(&default);
        }
        true
    }
}
