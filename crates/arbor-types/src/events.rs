//! Dispatch lifecycle events
//!
//! Events are mutable envelopes passed to listeners on the event bus. A
//! listener can attach replacement data and mark the event notified; callers
//! of notify-until stop at the first notified listener, and dispatch points
//! honor notified events as overrides.

use crate::hooks::ExtraInfo;
use serde_json::Value;

/// Event names fired by the dispatch core.
pub mod event_names {
    /// A module was loaded for a given handler type
    pub const POST_LOAD: &str = "module.post_load";
    /// About to invoke a resolved target; listener data short-circuits
    pub const PRE_EXECUTE: &str = "module.pre_execute";
    /// Target invoked; carries the result, listener data replaces it
    pub const POST_EXECUTE: &str = "module.post_execute";
    /// No handler resolved; a listener may supply the return value
    pub const TYPE_NOT_FOUND: &str = "module.type_not_found";
    /// Hook chain produced GUI output; listener data replaces it
    pub const POST_CALL_HOOKS_OUTPUT: &str = "module.post_call_hooks.output";
    /// Hook chain produced an extra-info payload; listener data replaces it
    pub const POST_CALL_HOOKS_EXTRA_INFO: &str = "module.post_call_hooks.extra_info";
}

/// Mutable event envelope.
#[derive(Debug, Clone)]
pub struct ModuleEvent {
    name: &'static str,

    /// Context the emitter attached (module name, func, args, ...)
    pub payload: ExtraInfo,

    /// Data attached by the emitter or a listener
    data: Option<Value>,

    notified: bool,
    stopped: bool,
}

impl ModuleEvent {
    pub fn new(name: &'static str, payload: ExtraInfo) -> Self {
        ModuleEvent {
            name,
            payload,
            data: None,
            notified: false,
            stopped: false,
        }
    }

    /// Event carrying initial data (e.g. a result to be filtered).
    pub fn with_data(name: &'static str, payload: ExtraInfo, data: Value) -> Self {
        ModuleEvent {
            name,
            payload,
            data: Some(data),
            notified: false,
            stopped: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn take_data(self) -> Option<Value> {
        self.data
    }

    pub fn set_data(&mut self, data: Value) {
        self.data = Some(data);
    }

    /// Marks this event as answered by a listener. Dispatch points treat
    /// notified events as overrides of the default behavior.
    pub fn mark_notified(&mut self) {
        self.notified = true;
    }

    pub fn notified(&self) -> bool {
        self.notified
    }

    /// Stops delivery to further listeners.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listener_data_overrides_initial_data() {
        let mut event = ModuleEvent::with_data(
            event_names::POST_EXECUTE,
            ExtraInfo::new(),
            json!("original"),
        );
        assert!(!event.notified());

        event.set_data(json!("replaced"));
        event.mark_notified();

        assert!(event.notified());
        assert_eq!(event.take_data(), Some(json!("replaced")));
    }

    #[test]
    fn stop_propagation_flags_the_event() {
        let mut event = ModuleEvent::new(event_names::PRE_EXECUTE, ExtraInfo::new());
        assert!(!event.stopped());
        event.stop_propagation();
        assert!(event.stopped());
    }
}
