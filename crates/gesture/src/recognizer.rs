//! Gesture recognition state machine.
//!
//! Consumes unified start/move/end input plus pinch and viewport
//! notifications, and publishes semantic gestures on the recognizer's own
//! [`TypedEventBus`].
//!
//! # Tap detection
//!
//! Every interaction start runs two checks:
//!
//! 1. If the previous start happened less than `tap_window` ago, a `Tap`
//!    is emitted immediately (second tap of a double tap).
//! 2. A check is scheduled `tap_window` later. If no newer start happened
//!    in the meantime, a `Tap` is emitted for this interaction's position.
//!
//! Two starts 100 ms apart with a 300 ms window therefore produce two taps:
//! one immediately on the second start, one 300 ms after the second start.
//! Both paths are kept as-is; collapsing them is a product decision.

use crate::config::GestureConfig;
use crate::events::{
    Gesture, GestureDetected, GestureEvents, Orientation, OrientationChanged, TouchCount,
    TouchEnded, TouchStarted,
};
use crate::input::{Interaction, Phase, PointerSample, RawInput};
use crate::scheduler::SchedulerRef;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use userscript_events::TypedEventBus;

/// Short-lived interaction state, mutated only by the recognizer's handlers.
#[derive(Debug, Default)]
struct InteractionState {
    /// Set on interaction start, cleared on end or once a swipe is emitted.
    touch_start: Option<PointerSample>,
    /// Persists across interactions for double-tap detection.
    last_tap: Option<Instant>,
    orientation: Option<Orientation>,
}

/// Turns raw pointer input into tap, swipe and pinch events.
pub struct GestureRecognizer {
    config: GestureConfig,
    events: Arc<TypedEventBus<GestureEvents>>,
    state: Arc<Mutex<InteractionState>>,
    scheduler: SchedulerRef,
}

impl GestureRecognizer {
    /// Create a recognizer that schedules tap confirmations on `scheduler`.
    pub fn new(config: GestureConfig, scheduler: SchedulerRef) -> Self {
        Self {
            config,
            events: Arc::new(TypedEventBus::new()),
            state: Arc::new(Mutex::new(InteractionState::default())),
            scheduler,
        }
    }

    /// Bus on which gestures are published.
    pub fn events(&self) -> &TypedEventBus<GestureEvents> {
        &self.events
    }

    /// Thresholds in effect.
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Start sample of the interaction in progress, if any.
    pub fn touch_start_position(&self) -> Option<PointerSample> {
        self.state().touch_start
    }

    fn state(&self) -> MutexGuard<'_, InteractionState> {
        lock_state(&self.state)
    }

    /// Feed one input event from the host.
    pub fn handle(&self, input: &RawInput) {
        match input {
            RawInput::GestureStart(sample) => self.on_gesture_start(*sample),
            RawInput::Viewport { width, height } => self.on_viewport(*width, *height),
            RawInput::Touch { .. } | RawInput::Mouse { .. } => {
                if let Some(interaction) = input.interaction() {
                    self.on_interaction(&interaction);
                }
            }
        }
    }

    /// Handle a unified start/move/end notification.
    pub fn on_interaction(&self, interaction: &Interaction) {
        match interaction.phase {
            Phase::Start => self.on_start(interaction),
            Phase::Move => self.on_move(interaction),
            Phase::End => self.on_end(interaction),
        }
    }

    fn on_start(&self, interaction: &Interaction) {
        let Some(sample) = interaction.primary() else {
            tracing::trace!(source = ?interaction.source, "interaction start without contacts, ignored");
            return;
        };

        self.state().touch_start = Some(sample);
        self.events.emit::<TouchStarted>(&TouchCount {
            touches: interaction.contacts.len(),
        });
        self.detect_tap(sample);
    }

    fn on_move(&self, interaction: &Interaction) {
        if interaction.contacts.len() != 1 {
            return;
        }
        let Some(current) = interaction.primary() else {
            return;
        };

        let swiped = {
            let mut state = self.state();
            let Some(start) = state.touch_start else {
                return;
            };
            let distance = current.distance_to(&start);
            if distance >= self.config.swipe_threshold {
                // Cleared so the same interaction cannot swipe twice.
                state.touch_start = None;
                tracing::debug!(distance, "swipe detected");
                true
            } else {
                false
            }
        };

        if swiped {
            self.events.emit::<GestureDetected>(&Gesture::Swipe {
                position: current.position(),
            });
        }
    }

    fn on_end(&self, interaction: &Interaction) {
        self.state().touch_start = None;
        self.events.emit::<TouchEnded>(&TouchCount {
            touches: interaction.contacts.len(),
        });
    }

    fn on_gesture_start(&self, sample: PointerSample) {
        tracing::debug!(x = sample.x, y = sample.y, "pinch detected");
        self.events.emit::<GestureDetected>(&Gesture::Pinch {
            position: sample.position(),
        });
    }

    fn on_viewport(&self, width: f64, height: f64) {
        let orientation = Orientation::from_viewport(width, height);
        let changed = {
            let mut state = self.state();
            let changed = state.orientation != Some(orientation);
            state.orientation = Some(orientation);
            changed
        };

        if changed {
            tracing::debug!(%orientation, "orientation changed");
            self.events.emit::<OrientationChanged>(&orientation);
        }
    }

    fn detect_tap(&self, sample: PointerSample) {
        let window = self.config.tap_window();
        let now = Instant::now();
        let position = sample.position();

        let double_tap = {
            let mut state = self.state();
            let double_tap = state
                .last_tap
                .is_some_and(|last| now.duration_since(last) < window);
            state.last_tap = Some(now);
            double_tap
        };

        if double_tap {
            tracing::debug!(x = position.x, y = position.y, "double tap detected");
            self.events.emit::<GestureDetected>(&Gesture::Tap { position });
        }

        let state = Arc::clone(&self.state);
        let events = Arc::clone(&self.events);
        self.scheduler.schedule(
            window,
            Box::new(move || {
                let settled = lock_state(&state)
                    .last_tap
                    .is_some_and(|last| Instant::now().duration_since(last) >= window);
                if settled {
                    tracing::debug!(x = position.x, y = position.y, "single tap confirmed");
                    events.emit::<GestureDetected>(&Gesture::Tap { position });
                }
            }),
        );
    }
}

fn lock_state(state: &Mutex<InteractionState>) -> MutexGuard<'_, InteractionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl std::fmt::Debug for GestureRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureRecognizer")
            .field("config", &self.config)
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}
