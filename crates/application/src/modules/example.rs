//! Demonstration module: a counter persisted in storage, driven by a menu
//! entry, a floating button and a keyboard shortcut.

use crate::capabilities::{menu_command, Requirement, Requirements};
use crate::environment::PageEnvironment;
use crate::error::Result;
use crate::styles::{EXAMPLE_CSS, EXAMPLE_STYLES_ID};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use userscript_dom::{ensure_styles, DomWriter};
use userscript_events::{event_map, TypedEventBus};

pub const ACTION_COUNT_KEY: &str = "exampleModule.actionCount";
pub const LAST_ACTION_KEY: &str = "exampleModule.lastActionTime";

pub const PERFORM_ACTION_LABEL: &str = "🎯 Perform Example Action";
pub const SHOW_STATS_LABEL: &str = "📊 Show Module Stats";
pub const RESET_DATA_LABEL: &str = "🧹 Reset Module Data";

pub const NOTIFICATION_DURATION: Duration = Duration::from_millis(3_000);
const NOTIFICATION_FADE_IN: Duration = Duration::from_millis(10);
const NOTIFICATION_FADE_OUT: Duration = Duration::from_millis(300);

const BUTTON_CLASS: &str = "example-module-button";
const NOTIFICATION_CLASS: &str = "example-module-notification";

/// Published after each action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// What triggered the action (`menu-command`, `button-click`, ...).
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

event_map! {
    pub ExampleEvents {
        Initialized: () = "initialized",
        ActionPerformed: ActionRecord = "actionPerformed",
    }
}

/// A key press delivered by the host page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: &str, ctrl: bool, shift: bool) -> Self {
        Self {
            key: key.to_string(),
            ctrl,
            shift,
        }
    }

    /// Ctrl+Shift+E.
    pub fn is_action_shortcut(&self) -> bool {
        self.ctrl && self.shift && self.key == "E"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExampleStats {
    pub initialized: bool,
    pub action_count: u64,
    pub last_action: Option<DateTime<Utc>>,
}

impl ExampleStats {
    pub fn message(&self) -> String {
        let last = self
            .last_action
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "Never".to_string());
        [
            "Example Module Statistics:".to_string(),
            format!("• Initialized: {}", if self.initialized { "Yes" } else { "No" }),
            format!("• Actions performed: {}", self.action_count),
            format!("• Last action: {last}"),
        ]
        .join("\n")
    }
}

pub struct ExampleModule<H: DomWriter> {
    env: PageEnvironment<H>,
    body_timeout: Duration,
    events: TypedEventBus<ExampleEvents>,
    stats: Mutex<ExampleStats>,
    button: Mutex<Option<H::Element>>,
}

impl<H: DomWriter> ExampleModule<H> {
    pub const NAME: &'static str = "example";

    pub const REQUIREMENTS: Requirements = Requirements {
        notify: Requirement::Optional,
        menu: Requirement::Optional,
    };

    pub fn new(env: PageEnvironment<H>, body_timeout: Duration) -> Self {
        Self {
            env,
            body_timeout,
            events: TypedEventBus::new(),
            stats: Mutex::new(ExampleStats::default()),
            button: Mutex::new(None),
        }
    }

    pub fn events(&self) -> &TypedEventBus<ExampleEvents> {
        &self.events
    }

    fn stats_mut(&self) -> MutexGuard<'_, ExampleStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stats(&self) -> ExampleStats {
        *self.stats_mut()
    }

    pub fn is_initialized(&self) -> bool {
        self.stats_mut().initialized
    }

    pub fn total_actions(&self) -> u64 {
        self.stats_mut().action_count
    }

    /// The floating action button, once initialized.
    pub fn button(&self) -> Option<H::Element> {
        self.button
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn initialize(self: &Arc<Self>) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }
        tracing::debug!("initializing example module");
        self.env
            .capabilities
            .check(Self::NAME, &Self::REQUIREMENTS)?;

        self.load_stats();

        let body = self
            .env
            .watcher
            .watch("body", None, self.body_timeout)
            .await?;
        tracing::debug!("page body is ready");

        ensure_styles(self.env.dom.as_ref(), EXAMPLE_CSS, EXAMPLE_STYLES_ID)?;
        self.register_menu_commands();
        self.add_button(&body);

        self.stats_mut().initialized = true;
        self.events.emit::<Initialized>(&());
        tracing::info!(actions = self.total_actions(), "example module initialized");
        Ok(())
    }

    fn load_stats(&self) {
        let storage = &self.env.storage;
        let count = storage.get_or(ACTION_COUNT_KEY, 0u64);
        let last = storage
            .get::<i64>(LAST_ACTION_KEY)
            .filter(|&millis| millis > 0)
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single());

        let mut stats = self.stats_mut();
        stats.action_count = count;
        stats.last_action = last;
    }

    fn register_menu_commands(self: &Arc<Self>) {
        let capabilities = &self.env.capabilities;
        let entries: [(&str, fn(&Self)); 3] = [
            (PERFORM_ACTION_LABEL, |module| module.perform_action("menu-command")),
            (SHOW_STATS_LABEL, |module| module.show_stats()),
            (RESET_DATA_LABEL, |module| module.reset_data()),
        ];
        for (label, run) in entries {
            let weak: Weak<Self> = Arc::downgrade(self);
            capabilities.register_menu(
                label,
                menu_command(move || {
                    if let Some(module) = weak.upgrade() {
                        run(&module);
                    }
                }),
            );
        }
    }

    fn add_button(&self, body: &H::Element) {
        let dom = &self.env.dom;
        let button = dom.create_element("button");
        dom.set_attribute(&button, "class", BUTTON_CLASS);
        dom.set_text(&button, "🎯 Example Action");
        dom.append_child(body, &button);
        *self.button.lock().unwrap_or_else(PoisonError::into_inner) = Some(button);
    }

    /// Click on the floating button.
    pub fn click_button(&self) {
        self.perform_action("button-click");
    }

    /// Returns whether the key press was consumed.
    pub fn handle_key(&self, key: &KeyPress) -> bool {
        if key.is_action_shortcut() {
            self.perform_action("keyboard-shortcut");
            true
        } else {
            false
        }
    }

    pub fn perform_action(&self, trigger: &str) {
        let timestamp = Utc::now();
        let count = {
            let mut stats = self.stats_mut();
            stats.action_count += 1;
            stats.last_action = Some(timestamp);
            stats.action_count
        };

        self.env.storage.set(ACTION_COUNT_KEY, &count);
        self.env
            .storage
            .set(LAST_ACTION_KEY, &timestamp.timestamp_millis());

        self.events.emit::<ActionPerformed>(&ActionRecord {
            action: trigger.to_string(),
            timestamp,
        });

        self.show_notification(&format!(
            "Action performed via {trigger}! (Total: {count})"
        ));
        tracing::info!(trigger, count, "example action performed");
    }

    pub fn show_stats(&self) {
        let message = self.stats().message();
        self.env.capabilities.notify("Module Stats", &message);
    }

    pub fn reset_data(&self) {
        self.env.storage.remove(ACTION_COUNT_KEY);
        self.env.storage.remove(LAST_ACTION_KEY);
        {
            let mut stats = self.stats_mut();
            stats.action_count = 0;
            stats.last_action = None;
        }
        tracing::info!("example module data reset");
        self.show_notification("Module data reset!");
    }

    /// Show a toast in the page body, faded in shortly after insertion and
    /// removed after [`NOTIFICATION_DURATION`].
    fn show_notification(&self, message: &str) {
        let dom = &self.env.dom;
        let Some(body) = dom.body() else {
            tracing::debug!(message, "no body, notification skipped");
            return;
        };
        let node = dom.create_element("div");
        dom.set_attribute(&node, "class", NOTIFICATION_CLASS);
        dom.set_text(&node, message);
        dom.append_child(&body, &node);

        let scheduler = Arc::clone(&self.env.scheduler);
        {
            let dom = Arc::clone(dom);
            let node = node.clone();
            scheduler.schedule(
                NOTIFICATION_FADE_IN,
                Box::new(move || {
                    dom.set_attribute(&node, "class", &format!("{NOTIFICATION_CLASS} show"));
                }),
            );
        }

        let dom = Arc::clone(dom);
        let fade_scheduler = Arc::clone(&scheduler);
        scheduler.schedule(
            NOTIFICATION_DURATION,
            Box::new(move || {
                dom.set_attribute(&node, "class", NOTIFICATION_CLASS);
                fade_scheduler.schedule(
                    NOTIFICATION_FADE_OUT,
                    Box::new(move || {
                        dom.remove(&node);
                    }),
                );
            }),
        );
    }
}

impl<H: DomWriter> std::fmt::Debug for ExampleModule<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExampleModule")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
