//! Typed event bus for decoupled module communication.
//!
//! A bus is generic over an [`EventMap`]: only event markers declared for
//! that map can be subscribed to or emitted, so a bus never holds listeners
//! for a channel outside its map.
//!
//! # Dispatch policy
//!
//! `emit` snapshots the listener sequence of the channel before invoking
//! anything. Listeners registered or removed while a dispatch is running
//! (including by one of the listeners being dispatched) take effect from the
//! next `emit`: the running dispatch never skips and never double-invokes a
//! neighbouring listener.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Marker trait for a declared set of events.
///
/// Usually implemented through [`event_map!`](crate::event_map).
pub trait EventMap: 'static {}

/// A single event channel of the map `M`.
pub trait Event<M: EventMap>: 'static {
    /// Channel name, used for logging.
    const NAME: &'static str;

    /// Value handed to every listener of this channel.
    type Payload: 'static;
}

/// Callback bound to one channel of one bus.
///
/// Identity is the identity of the `Arc`: keep a clone around to call
/// [`TypedEventBus::off`] later.
pub type Listener<P> = Arc<dyn Fn(&P) + Send + Sync + 'static>;

/// Wrap a closure into a [`Listener`].
pub fn listener<P, F>(f: F) -> Listener<P>
where
    F: Fn(&P) + Send + Sync + 'static,
{
    Arc::new(f)
}

struct Entry<P: 'static> {
    listener: Listener<P>,
    once: bool,
}

struct Channel {
    name: &'static str,
    entries: Box<dyn Any + Send>,
}

impl Channel {
    fn new<P: 'static>(name: &'static str) -> Self {
        Self {
            name,
            entries: Box::new(Vec::<Entry<P>>::new()),
        }
    }

    fn entries<P: 'static>(&self) -> Option<&Vec<Entry<P>>> {
        self.entries.downcast_ref()
    }

    fn entries_mut<P: 'static>(&mut self) -> Option<&mut Vec<Entry<P>>> {
        self.entries.downcast_mut()
    }
}

/// Per-instance publish/subscribe registry over the event map `M`.
pub struct TypedEventBus<M: EventMap> {
    channels: Mutex<HashMap<TypeId, Channel>>,
    _map: PhantomData<fn() -> M>,
}

impl<M: EventMap> Default for TypedEventBus<M> {
    fn default() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            _map: PhantomData,
        }
    }
}

impl<M: EventMap> TypedEventBus<M> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<TypeId, Channel>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register<E: Event<M>>(&self, listener: Listener<E::Payload>, once: bool) {
        let mut channels = self.channels();
        let channel = channels
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Channel::new::<E::Payload>(E::NAME));
        if let Some(entries) = channel.entries_mut::<E::Payload>() {
            entries.push(Entry { listener, once });
        }
    }

    /// Register `listener` for the channel `E`.
    ///
    /// Registering the same listener twice creates two independent entries.
    pub fn on<E: Event<M>>(&self, listener: Listener<E::Payload>) {
        self.register::<E>(listener, false);
    }

    /// Register `listener` for at most one invocation.
    ///
    /// The entry is deregistered as soon as a dispatch picks it up, so it
    /// fires at most once even if that dispatch emits `E` again.
    pub fn once<E: Event<M>>(&self, listener: Listener<E::Payload>) {
        self.register::<E>(listener, true);
    }

    /// Remove the first entry of `E` that is the same `Arc` as `listener`.
    ///
    /// No-op when no such entry exists. Also removes a pending `once` entry.
    pub fn off<E: Event<M>>(&self, listener: &Listener<E::Payload>) {
        let mut channels = self.channels();
        let Some(entries) = channels
            .get_mut(&TypeId::of::<E>())
            .and_then(|channel| channel.entries_mut::<E::Payload>())
        else {
            return;
        };

        if let Some(index) = entries
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.listener, listener))
        {
            entries.remove(index);
        }
    }

    /// Invoke every listener of `E` with `payload`, in registration order.
    ///
    /// A panicking listener is logged and skipped; the remaining listeners
    /// still run and nothing propagates to the caller.
    pub fn emit<E: Event<M>>(&self, payload: &E::Payload) {
        let snapshot: Vec<Listener<E::Payload>> = {
            let mut channels = self.channels();
            let Some(entries) = channels
                .get_mut(&TypeId::of::<E>())
                .and_then(|channel| channel.entries_mut::<E::Payload>())
            else {
                return;
            };
            let snapshot = entries
                .iter()
                .map(|entry| Arc::clone(&entry.listener))
                .collect();
            entries.retain(|entry| !entry.once);
            snapshot
        };

        for (index, listener) in snapshot.iter().enumerate() {
            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| listener(payload))) {
                tracing::error!(
                    event = E::NAME,
                    listener = index,
                    error = %panic_message(panic.as_ref()),
                    "event listener failed"
                );
            }
        }
    }

    /// Drop every listener of `E`.
    pub fn remove_listeners<E: Event<M>>(&self) {
        self.channels().remove(&TypeId::of::<E>());
    }

    /// Drop every listener of every channel.
    pub fn remove_all_listeners(&self) {
        self.channels().clear();
    }

    /// Number of listeners currently registered for `E`.
    pub fn listener_count<E: Event<M>>(&self) -> usize {
        self.channels()
            .get(&TypeId::of::<E>())
            .and_then(|channel| channel.entries::<E::Payload>())
            .map_or(0, Vec::len)
    }
}

impl<M: EventMap> fmt::Debug for TypedEventBus<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels = self.channels();
        let mut names: Vec<&'static str> = channels.values().map(|c| c.name).collect();
        names.sort_unstable();
        f.debug_struct("TypedEventBus")
            .field("channels", &names)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
