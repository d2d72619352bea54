//! Events published by the gesture recognizer.

use crate::input::Position;
use serde::{Deserialize, Serialize};
use userscript_events::event_map;

/// A semantically classified user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Gesture {
    Tap { position: Position },
    Swipe { position: Position },
    Pinch { position: Position },
}

/// Discriminant of a [`Gesture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    Tap,
    Swipe,
    Pinch,
}

impl Gesture {
    /// Gesture kind without its position.
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::Tap { .. } => GestureKind::Tap,
            Gesture::Swipe { .. } => GestureKind::Swipe,
            Gesture::Pinch { .. } => GestureKind::Pinch,
        }
    }

    /// Where the gesture was recognized.
    pub fn position(&self) -> Position {
        match self {
            Gesture::Tap { position } | Gesture::Swipe { position } | Gesture::Pinch { position } => {
                *position
            }
        }
    }
}

impl GestureKind {
    /// Lowercase name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            GestureKind::Tap => "tap",
            GestureKind::Swipe => "swipe",
            GestureKind::Pinch => "pinch",
        }
    }
}

impl std::fmt::Display for GestureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Viewport orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Portrait when the viewport is strictly taller than it is wide.
    pub fn from_viewport(width: f64, height: f64) -> Self {
        if height > width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Portrait => f.write_str("portrait"),
            Orientation::Landscape => f.write_str("landscape"),
        }
    }
}

/// Number of contacts reported with a touch start or end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchCount {
    pub touches: usize,
}

event_map! {
    /// Channels published by [`GestureRecognizer`](crate::GestureRecognizer).
    pub GestureEvents {
        /// A tap, swipe or pinch was recognized.
        GestureDetected: Gesture = "gestureDetected",
        /// An interaction started.
        TouchStarted: TouchCount = "touchStart",
        /// An interaction ended.
        TouchEnded: TouchCount = "touchEnd",
        OrientationChanged: Orientation = "orientationChanged",
    }
}
