//! Raw pointer input and its unification into interaction phases.
//!
//! Touch and mouse events are both reduced to an [`Interaction`]: a phase
//! plus the list of active contact points. Mouse input always carries a
//! single contact with identifier `0`.

use serde::{Deserialize, Serialize};

/// Identifier used for the single contact of a mouse or pen device.
pub const MOUSE_POINTER_ID: u32 = 0;

/// A 2-D screen coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Point at `x`, `y` in viewport pixels.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Instantaneous position of one contact point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    /// Per-finger identifier for touch input, [`MOUSE_POINTER_ID`] otherwise.
    pub id: u32,
}

impl PointerSample {
    /// Sample for contact `id` at `x`, `y`.
    pub fn new(x: f64, y: f64, id: u32) -> Self {
        Self { x, y, id }
    }

    /// Coordinates without the contact identifier.
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &PointerSample) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Start,
    Move,
    End,
}

/// Origin of an [`Interaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    Touch,
    Mouse,
}

/// Input as delivered by the host page.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// `touchstart` / `touchmove` / `touchend` with the contacts still down.
    Touch {
        phase: Phase,
        touches: Vec<PointerSample>,
    },
    /// `mousedown` / `mousemove` / `mouseup`.
    Mouse { phase: Phase, x: f64, y: f64 },
    /// Two-finger gesture start (`gesturestart`).
    GestureStart(PointerSample),
    /// Viewport size changed (`resize` / `orientationchange`).
    Viewport { width: f64, height: f64 },
}

/// Unified start/move/end notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub phase: Phase,
    pub source: InputSource,
    pub contacts: Vec<PointerSample>,
}

impl Interaction {
    /// The first active contact, if any.
    pub fn primary(&self) -> Option<PointerSample> {
        self.contacts.first().copied()
    }
}

impl RawInput {
    /// Touch event carrying every current contact.
    pub fn touch(phase: Phase, touches: Vec<PointerSample>) -> Self {
        RawInput::Touch { phase, touches }
    }

    /// Mouse event at `x`, `y`.
    pub fn mouse(phase: Phase, x: f64, y: f64) -> Self {
        RawInput::Mouse { phase, x, y }
    }

    /// Unify touch and mouse input. Returns `None` for non-interaction input.
    pub fn interaction(&self) -> Option<Interaction> {
        match self {
            RawInput::Touch { phase, touches } => Some(Interaction {
                phase: *phase,
                source: InputSource::Touch,
                contacts: touches.clone(),
            }),
            RawInput::Mouse { phase, x, y } => Some(Interaction {
                phase: *phase,
                source: InputSource::Mouse,
                contacts: vec![PointerSample::new(*x, *y, MOUSE_POINTER_ID)],
            }),
            RawInput::GestureStart(_) | RawInput::Viewport { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = PointerSample::new(0.0, 0.0, 1);
        let b = PointerSample::new(3.0, 4.0, 1);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
    }

    #[test]
    fn test_mouse_unifies_to_single_contact() {
        let interaction = RawInput::mouse(Phase::Move, 12.0, 7.5).interaction().unwrap();
        assert_eq!(interaction.source, InputSource::Mouse);
        assert_eq!(
            interaction.primary(),
            Some(PointerSample::new(12.0, 7.5, MOUSE_POINTER_ID))
        );
    }

    #[test]
    fn test_touch_keeps_all_contacts() {
        let touches = vec![
            PointerSample::new(1.0, 1.0, 4),
            PointerSample::new(9.0, 9.0, 5),
        ];
        let interaction = RawInput::touch(Phase::Start, touches.clone())
            .interaction()
            .unwrap();
        assert_eq!(interaction.contacts, touches);
        assert_eq!(interaction.primary().map(|s| s.id), Some(4));
    }

    #[test]
    fn test_non_interaction_input() {
        assert!(RawInput::GestureStart(PointerSample::new(0.0, 0.0, 0))
            .interaction()
            .is_none());
        assert!(RawInput::Viewport {
            width: 10.0,
            height: 20.0
        }
        .interaction()
        .is_none());
    }
}
