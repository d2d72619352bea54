//! Typed publish/subscribe bus shared by every userscript module.
//!
//! Each module declares the events it publishes with [`event_map!`] and owns
//! a [`TypedEventBus`] over that map. Consumers subscribe with
//! [`TypedEventBus::on`] and friends; payload types are checked at compile
//! time.
//!
//! # Example
//!
//! ```
//! use userscript_events::{event_map, listener, TypedEventBus};
//!
//! event_map! {
//!     pub PlayerEvents {
//!         Scored: u32 = "scored",
//!     }
//! }
//!
//! let bus = TypedEventBus::<PlayerEvents>::new();
//! bus.on::<Scored>(listener(|points: &u32| println!("+{points}")));
//! bus.emit::<Scored>(&3);
//! ```

mod bus;
mod recorder;

pub use bus::{listener, Event, EventMap, Listener, TypedEventBus};
pub use recorder::EventRecorder;

/// Declare an event map and its event markers.
///
/// Each entry `Marker: Payload = "name"` becomes an uninhabited marker type
/// implementing [`Event`] for the map.
#[macro_export]
macro_rules! event_map {
    (
        $(#[$map_meta:meta])*
        $vis:vis $map:ident {
            $(
                $(#[$event_meta:meta])*
                $event:ident : $payload:ty = $name:literal
            ),* $(,)?
        }
    ) => {
        $(#[$map_meta])*
        #[derive(Debug, Clone, Copy)]
        $vis enum $map {}

        impl $crate::EventMap for $map {}

        $(
            $(#[$event_meta])*
            #[derive(Debug, Clone, Copy)]
            $vis enum $event {}

            impl $crate::Event<$map> for $event {
                const NAME: &'static str = $name;
                type Payload = $payload;
            }
        )*
    };
}
