//! Recording listener for tests and diagnostics.

use crate::bus::{Event, EventMap, Listener, TypedEventBus};
use std::sync::{Arc, Mutex, PoisonError};

/// Captures every payload delivered to its listener for later inspection.
pub struct EventRecorder<P> {
    events: Arc<Mutex<Vec<P>>>,
}

impl<P> Default for EventRecorder<P> {
    fn default() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<P> Clone for EventRecorder<P> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<P: Clone + Send + 'static> EventRecorder<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that appends a clone of each payload to this recorder.
    pub fn listener(&self) -> Listener<P> {
        let events = Arc::clone(&self.events);
        Arc::new(move |payload: &P| {
            events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(payload.clone());
        })
    }

    /// Subscribe to `E` on `bus` and return the registered listener.
    pub fn attach<M, E>(&self, bus: &TypedEventBus<M>) -> Listener<P>
    where
        M: EventMap,
        E: Event<M, Payload = P>,
    {
        let listener = self.listener();
        bus.on::<E>(Arc::clone(&listener));
        listener
    }

    /// All captured payloads, oldest first.
    pub fn events(&self) -> Vec<P> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of captured payloads.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything captured so far.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::event_map! {
        RecorderEvents {
            Ping: &'static str = "ping",
        }
    }

    #[test]
    fn test_recorder_captures_in_order() {
        let bus = TypedEventBus::<RecorderEvents>::new();
        let recorder = EventRecorder::new();
        recorder.attach::<_, Ping>(&bus);

        bus.emit::<Ping>(&"one");
        bus.emit::<Ping>(&"two");

        assert_eq!(recorder.events(), vec!["one", "two"]);
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_recorder_clear() {
        let recorder = EventRecorder::<u8>::new();
        (recorder.listener())(&1);
        assert!(!recorder.is_empty());

        recorder.clear();
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_detached_recorder_stops_capturing() {
        let bus = TypedEventBus::<RecorderEvents>::new();
        let recorder = EventRecorder::new();
        let listener = recorder.attach::<_, Ping>(&bus);

        bus.off::<Ping>(&listener);
        bus.emit::<Ping>(&"lost");

        assert!(recorder.is_empty());
    }
}
