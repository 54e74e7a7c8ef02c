use crate::error::Result;
use crate::states::MapStates;
use crate::traits::ToolControl;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type ChangeHandler = Box<dyn Fn(bool) + Send + Sync>;

/// Model of a toolbar toggle affordance.
///
/// `set_checked` is the user-driven path and runs the bound change handler.
/// `set_checked_silent` is the programmatic path: the handler is unbound
/// for the duration of the write, so state-machine-originated activation
/// can never re-enter the user-driven change path.
#[derive(Default)]
pub struct ToggleButton {
    checked: AtomicBool,
    suppress: AtomicBool,
    handler_calls: AtomicU64,
    handler: Mutex<Option<ChangeHandler>>,
}

impl std::fmt::Debug for ToggleButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToggleButton")
            .field("checked", &self.checked.load(Ordering::SeqCst))
            .field("suppress", &self.suppress.load(Ordering::SeqCst))
            .field("handler_calls", &self.handler_calls.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ToggleButton {
    pub fn new() -> Arc<Self> {
        Arc::new(ToggleButton::default())
    }

    pub fn checked(&self) -> bool {
        self.checked.load(Ordering::SeqCst)
    }

    /// How many times the change handler actually ran.
    pub fn handler_calls(&self) -> u64 {
        self.handler_calls.load(Ordering::SeqCst)
    }

    pub fn bind_handler(&self, handler: impl Fn(bool) + Send + Sync + 'static) {
        *self.handler.lock().unwrap() = Some(Box::new(handler));
    }

    /// User-driven change: fires the handler when the value differs.
    pub fn set_checked(&self, value: bool) {
        if self.checked.swap(value, Ordering::SeqCst) == value {
            return;
        }
        if self.suppress.load(Ordering::SeqCst) {
            return;
        }
        let handler = self.handler.lock().unwrap();
        if let Some(handler) = handler.as_ref() {
            self.handler_calls.fetch_add(1, Ordering::SeqCst);
            handler(value);
        }
    }

    /// Programmatic change: handler unbound around the write.
    pub fn set_checked_silent(&self, value: bool) {
        self.suppress.store(true, Ordering::SeqCst);
        self.checked.store(value, Ordering::SeqCst);
        self.suppress.store(false, Ordering::SeqCst);
    }
}

/// Composite control registered with the state machine: pressing state in
/// the UI and the tool itself always move together.
struct ToggleBinding {
    button: Arc<ToggleButton>,
    tool: Arc<dyn ToolControl>,
}

impl ToolControl for ToggleBinding {
    fn activate(&self) {
        self.button.set_checked_silent(true);
        self.tool.activate();
    }

    fn deactivate(&self) {
        self.button.set_checked_silent(false);
        self.tool.deactivate();
    }

    fn is_active(&self) -> bool {
        self.tool.is_active()
    }
}

/// Binds toolbar toggles to tools and the state machine.
#[derive(Debug)]
pub struct ToolbarController {
    states: Arc<Mutex<MapStates>>,
}

impl ToolbarController {
    pub fn new(states: Arc<Mutex<MapStates>>) -> Self {
        ToolbarController { states }
    }

    pub fn states(&self) -> &Arc<Mutex<MapStates>> {
        &self.states
    }

    /// Register `tool` under `name` and wire `button` to it both ways.
    pub fn bind(
        &self,
        name: &str,
        tool: Arc<dyn ToolControl>,
        button: Arc<ToggleButton>,
    ) -> Result<()> {
        let binding = Arc::new(ToggleBinding {
            button: button.clone(),
            tool,
        });
        self.states.lock().unwrap().add_state(name, binding)?;

        let states = self.states.clone();
        let state_name = name.to_string();
        button.bind_handler(move |checked| {
            let mut states = states.lock().unwrap();
            if checked {
                states.activate_state(&state_name);
            } else {
                states.deactivate_state(&state_name);
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use std::sync::atomic::AtomicBool;

    #[derive(Default)]
    struct FlagTool {
        active: AtomicBool,
    }

    impl ToolControl for FlagTool {
        fn activate(&self) {
            self.active.store(true, Ordering::SeqCst);
        }
        fn deactivate(&self) {
            self.active.store(false, Ordering::SeqCst);
        }
        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }
    }

    fn make_toolbar() -> (ToolbarController, Arc<ToggleButton>, Arc<ToggleButton>) {
        let states = Arc::new(Mutex::new(MapStates::new(EventBus::default())));
        let toolbar = ToolbarController::new(states);
        let identify = ToggleButton::new();
        let draw = ToggleButton::new();
        toolbar
            .bind("identify", Arc::new(FlagTool::default()), identify.clone())
            .unwrap();
        toolbar
            .bind("draw", Arc::new(FlagTool::default()), draw.clone())
            .unwrap();
        (toolbar, identify, draw)
    }

    #[test]
    fn user_toggle_routes_through_the_state_machine() {
        let (toolbar, identify, _draw) = make_toolbar();
        identify.set_checked(true);
        assert_eq!(
            toolbar.states().lock().unwrap().current_state(),
            Some("identify")
        );
        assert_eq!(identify.handler_calls(), 1);
    }

    #[test]
    fn programmatic_activation_does_not_invoke_the_change_handler() {
        let (toolbar, identify, _draw) = make_toolbar();
        let calls_before = identify.handler_calls();
        toolbar.states().lock().unwrap().activate_state("identify");
        assert!(identify.checked());
        assert_eq!(identify.handler_calls(), calls_before);
    }

    #[test]
    fn only_one_button_is_pressed_at_a_time() {
        let (_toolbar, identify, draw) = make_toolbar();
        identify.set_checked(true);
        draw.set_checked(true);
        assert!(!identify.checked());
        assert!(draw.checked());
    }

    #[test]
    fn user_untoggle_deactivates_the_tool() {
        let (toolbar, identify, _draw) = make_toolbar();
        identify.set_checked(true);
        identify.set_checked(false);
        assert_eq!(toolbar.states().lock().unwrap().current_state(), None);
        assert_eq!(identify.handler_calls(), 2);
    }

    #[test]
    fn same_value_user_write_is_ignored() {
        let (_toolbar, identify, _draw) = make_toolbar();
        identify.set_checked(true);
        identify.set_checked(true);
        assert_eq!(identify.handler_calls(), 1);
    }
}
