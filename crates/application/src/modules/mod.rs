mod example;
mod mobile;

pub use example::{
    ActionPerformed, ActionRecord, ExampleEvents, ExampleModule, ExampleStats, Initialized,
    KeyPress, ACTION_COUNT_KEY, LAST_ACTION_KEY, NOTIFICATION_DURATION, PERFORM_ACTION_LABEL,
    RESET_DATA_LABEL, SHOW_STATS_LABEL,
};
pub use mobile::{MobileButton, MobileMenu, MobileModule, INITIAL_ORIENTATION_DELAY};
