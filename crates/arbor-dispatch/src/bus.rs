//! Event bus port
//!
//! The dispatch core produces named events with a documented payload shape;
//! listeners can attach data and mark an event notified to override the
//! default behavior at the emitting dispatch point.

use arbor_types::ModuleEvent;
use parking_lot::RwLock;
use std::collections::HashMap;

pub type Listener = Box<dyn Fn(&mut ModuleEvent) + Send + Sync>;

/// Pub-sub port consumed by the dispatcher.
pub trait EventBus: Send + Sync {
    /// Delivers to every listener of the event's name, stopping early only
    /// when a listener stops propagation.
    fn notify(&self, event: &mut ModuleEvent);

    /// Delivers until a listener marks the event notified (or stops it).
    fn notify_until(&self, event: &mut ModuleEvent);
}

/// Listener lists keyed by event name, delivered in subscription order.
#[derive(Default)]
pub struct InProcessBus {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl InProcessBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, name: &str, listener: F)
    where
        F: Fn(&mut ModuleEvent) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .entry(name.to_owned())
            .or_default()
            .push(Box::new(listener));
    }

    fn deliver(&self, event: &mut ModuleEvent, until_notified: bool) {
        let listeners = self.listeners.read();
        let Some(subscribed) = listeners.get(event.name()) else {
            return;
        };
        for listener in subscribed {
            listener(event);
            if event.stopped() || (until_notified && event.notified()) {
                break;
            }
        }
    }
}

impl EventBus for InProcessBus {
    fn notify(&self, event: &mut ModuleEvent) {
        self.deliver(event, false);
    }

    fn notify_until(&self, event: &mut ModuleEvent) {
        self.deliver(event, true);
    }
}

/// Bus that drops everything. For isolation in tests and minimal embeddings.
#[derive(Default)]
pub struct NullBus;

impl NullBus {
    pub fn new() -> Self {
        NullBus
    }
}

impl EventBus for NullBus {
    fn notify(&self, _event: &mut ModuleEvent) {}
    fn notify_until(&self, _event: &mut ModuleEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_types::{event_names, ExtraInfo};
    use serde_json::json;

    #[test]
    fn notify_reaches_every_listener() {
        let bus = InProcessBus::new();
        bus.subscribe(event_names::PRE_EXECUTE, |event| {
            event.set_data(json!(1));
        });
        bus.subscribe(event_names::PRE_EXECUTE, |event| {
            event.set_data(json!(2));
        });

        let mut event = ModuleEvent::new(event_names::PRE_EXECUTE, ExtraInfo::new());
        bus.notify(&mut event);
        assert_eq!(event.take_data(), Some(json!(2)));
    }

    #[test]
    fn notify_until_stops_at_the_first_notified_listener() {
        let bus = InProcessBus::new();
        bus.subscribe(event_names::TYPE_NOT_FOUND, |event| {
            event.set_data(json!("first"));
            event.mark_notified();
        });
        bus.subscribe(event_names::TYPE_NOT_FOUND, |event| {
            event.set_data(json!("second"));
        });

        let mut event = ModuleEvent::new(event_names::TYPE_NOT_FOUND, ExtraInfo::new());
        bus.notify_until(&mut event);
        assert_eq!(event.take_data(), Some(json!("first")));
    }

    #[test]
    fn stopped_events_skip_later_listeners() {
        let bus = InProcessBus::new();
        bus.subscribe(event_names::POST_EXECUTE, |event| {
            event.set_data(json!("kept"));
            event.stop_propagation();
        });
        bus.subscribe(event_names::POST_EXECUTE, |event| {
            event.set_data(json!("never"));
        });

        let mut event = ModuleEvent::new(event_names::POST_EXECUTE, ExtraInfo::new());
        bus.notify(&mut event);
        assert_eq!(event.take_data(), Some(json!("kept")));
    }

    #[test]
    fn other_event_names_are_not_delivered() {
        let bus = InProcessBus::new();
        bus.subscribe(event_names::PRE_EXECUTE, |event| {
            event.mark_notified();
        });

        let mut event = ModuleEvent::new(event_names::POST_EXECUTE, ExtraInfo::new());
        bus.notify(&mut event);
        assert!(!event.notified());
    }
}
