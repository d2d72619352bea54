//! Userscript orchestrator.
//!
//! An [`App`] runs on one page, described by a [`PageEnvironment`]: the
//! host document, storage, injected [`Capabilities`], the detected
//! [`DeviceProfile`](userscript_detect::DeviceProfile) and a scheduler.
//! It brings up the [`ExampleModule`] and, on touch devices, the
//! [`MobileModule`], and keeps them in a typed [`ModuleRegistry`].

mod app;
mod capabilities;
mod config;
mod environment;
mod error;
mod modules;
mod registry;
pub mod styles;

pub use app::{
    App, AppEvents, Failed, ModuleLoaded, Ready, MOBILE_INFO_LABEL, SHOW_VISIT_COUNT_LABEL,
    VISIT_COUNT_KEY,
};
pub use capabilities::{
    menu_command, Capabilities, InMemoryMenu, InMemoryNotifier, MenuCommand, MenuRegistrar,
    Notification, Notifier, Requirement, Requirements,
};
pub use config::{AppConfig, DEFAULT_BODY_TIMEOUT_MS, DEFAULT_ELEMENT_TIMEOUT_MS};
pub use environment::PageEnvironment;
pub use error::{AppError, Result};
pub use modules::{
    ActionPerformed, ActionRecord, ExampleEvents, ExampleModule, ExampleStats, Initialized,
    KeyPress, MobileButton, MobileMenu, MobileModule, ACTION_COUNT_KEY,
    INITIAL_ORIENTATION_DELAY, LAST_ACTION_KEY, NOTIFICATION_DURATION, PERFORM_ACTION_LABEL,
    RESET_DATA_LABEL, SHOW_STATS_LABEL,
};
pub use registry::{Module, ModuleKind, ModuleRegistry, RegisteredModule};
