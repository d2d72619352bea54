//! Recognizer tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default minimum travel, in device pixels, for a move to count as a swipe.
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 50.0;

/// Default debounce window separating a single tap from a double tap.
pub const DEFAULT_TAP_WINDOW_MS: u64 = 300;

/// Thresholds used by [`GestureRecognizer`](crate::GestureRecognizer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Distance from the interaction start at which a swipe is emitted.
    pub swipe_threshold: f64,
    /// Debounce window for tap detection, in milliseconds.
    pub tap_window_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            tap_window_ms: DEFAULT_TAP_WINDOW_MS,
        }
    }
}

impl GestureConfig {
    /// Tap window as a [`Duration`].
    pub fn tap_window(&self) -> Duration {
        Duration::from_millis(self.tap_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GestureConfig::default();
        assert_eq!(config.swipe_threshold, 50.0);
        assert_eq!(config.tap_window(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GestureConfig = serde_json::from_str(r#"{"tap_window_ms": 250}"#).unwrap();
        assert_eq!(config.tap_window_ms, 250);
        assert_eq!(config.swipe_threshold, DEFAULT_SWIPE_THRESHOLD);
    }
}
