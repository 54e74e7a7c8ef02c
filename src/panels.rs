use serde_json::Value;

/// One side-panel tab. Keys are unique within the stack; the payload is the
/// plugin-specific content descriptor the host UI renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelTab {
    pub key: String,
    pub label: String,
    pub payload: Value,
}

/// Keyed tab stack with idempotent open: re-opening an existing key selects
/// it instead of duplicating the tab.
#[derive(Debug, Default)]
pub struct PanelStack {
    tabs: Vec<PanelTab>,
    active: Option<String>,
}

impl PanelStack {
    pub fn new() -> Self {
        PanelStack::default()
    }

    pub fn tabs(&self) -> &[PanelTab] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Open a tab. Returns `true` when a new tab was created, `false` when
    /// an existing one was re-selected.
    pub fn open(&mut self, tab: PanelTab) -> bool {
        if self.tabs.iter().any(|existing| existing.key == tab.key) {
            self.active = Some(tab.key);
            return false;
        }
        self.active = Some(tab.key.clone());
        self.tabs.push(tab);
        true
    }

    pub fn select(&mut self, key: &str) -> bool {
        if self.tabs.iter().any(|tab| tab.key == key) {
            self.active = Some(key.to_string());
            true
        } else {
            false
        }
    }

    /// Close a tab; selection moves to the last remaining tab, if any.
    pub fn close(&mut self, key: &str) -> bool {
        let before = self.tabs.len();
        self.tabs.retain(|tab| tab.key != key);
        if self.tabs.len() == before {
            return false;
        }
        if self.active.as_deref() == Some(key) {
            self.active = self.tabs.last().map(|tab| tab.key.clone());
        }
        true
    }
}
