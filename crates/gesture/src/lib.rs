//! Gesture recognition for userscripts.
//!
//! Raw touch and mouse input is unified into start/move/end interactions
//! and classified into taps, swipes and pinches by [`GestureRecognizer`].
//! Results are published on the recognizer's
//! [`TypedEventBus`](userscript_events::TypedEventBus).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use userscript_events::listener;
//! use userscript_gesture::{GestureConfig, GestureDetected, GestureRecognizer, TokioScheduler};
//!
//! let scheduler = Arc::new(TokioScheduler::current().expect("inside a tokio runtime"));
//! let recognizer = GestureRecognizer::new(GestureConfig::default(), scheduler);
//! recognizer.events().on::<GestureDetected>(listener(|gesture| {
//!     println!("{} at {:?}", gesture.kind(), gesture.position());
//! }));
//! ```

mod config;
mod events;
mod input;
mod recognizer;
mod scheduler;

pub use config::{GestureConfig, DEFAULT_SWIPE_THRESHOLD, DEFAULT_TAP_WINDOW_MS};
pub use events::{
    Gesture, GestureDetected, GestureEvents, GestureKind, Orientation, OrientationChanged,
    TouchCount, TouchEnded, TouchStarted,
};
pub use input::{
    InputSource, Interaction, Phase, PointerSample, Position, RawInput, MOUSE_POINTER_ID,
};
pub use recognizer::GestureRecognizer;
pub use scheduler::{Scheduler, SchedulerRef, Task, TokioScheduler};
