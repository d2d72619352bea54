//! Host capabilities injected into modules.
//!
//! Userscript managers expose optional APIs (notifications, menu commands).
//! Modules declare which ones they use through [`Requirements`] and receive
//! them through [`Capabilities`] instead of probing for them.

use crate::error::{AppError, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shows a message to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Action run when a menu entry is chosen.
pub type MenuCommand = Arc<dyn Fn() + Send + Sync + 'static>;

pub fn menu_command<F>(f: F) -> MenuCommand
where
    F: Fn() + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Adds entries to the userscript manager's menu.
pub trait MenuRegistrar: Send + Sync {
    fn register(&self, label: &str, command: MenuCommand);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Requirement {
    #[default]
    Unused,
    /// Used when present; the feature is skipped otherwise.
    Optional,
    Required,
}

/// Capabilities a module declares it uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    pub notify: Requirement,
    pub menu: Requirement,
}

impl Requirements {
    pub const NONE: Requirements = Requirements {
        notify: Requirement::Unused,
        menu: Requirement::Unused,
    };
}

/// The capabilities available on this page.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub notifier: Option<Arc<dyn Notifier>>,
    pub menu: Option<Arc<dyn MenuRegistrar>>,
}

impl Capabilities {
    /// No capabilities at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_menu(mut self, menu: Arc<dyn MenuRegistrar>) -> Self {
        self.menu = Some(menu);
        self
    }

    /// Verify `requirements` for `module`. Missing optional capabilities are
    /// logged, missing required ones fail.
    pub fn check(&self, module: &'static str, requirements: &Requirements) -> Result<()> {
        let present = [
            ("notify", requirements.notify, self.notifier.is_some()),
            ("menu", requirements.menu, self.menu.is_some()),
        ];
        for (capability, requirement, available) in present {
            if available {
                continue;
            }
            match requirement {
                Requirement::Unused => {}
                Requirement::Optional => {
                    tracing::warn!(module, capability, "optional capability unavailable");
                }
                Requirement::Required => {
                    return Err(AppError::MissingCapability { module, capability });
                }
            }
        }
        Ok(())
    }

    /// Show a notification. Returns `false` (and logs the message) when no
    /// notifier is available.
    pub fn notify(&self, title: &str, message: &str) -> bool {
        match &self.notifier {
            Some(notifier) => {
                notifier.notify(title, message);
                true
            }
            None => {
                tracing::info!(title, message, "notification (no notifier available)");
                false
            }
        }
    }

    /// Register a menu entry. Returns `false` when no menu is available.
    pub fn register_menu(&self, label: &str, command: MenuCommand) -> bool {
        match &self.menu {
            Some(menu) => {
                menu.register(label, command);
                true
            }
            None => {
                tracing::debug!(label, "menu unavailable, command not registered");
                false
            }
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("notifier", &self.notifier.is_some())
            .field("menu", &self.menu.is_some())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// Notifier that records every notification.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }

    pub fn last(&self) -> Option<Notification> {
        lock(&self.notifications).last().cloned()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, title: &str, message: &str) {
        lock(&self.notifications).push(Notification {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

/// Menu that keeps registered commands and runs them on demand.
#[derive(Default)]
pub struct InMemoryMenu {
    commands: Mutex<Vec<(String, MenuCommand)>>,
}

impl InMemoryMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels in registration order.
    pub fn labels(&self) -> Vec<String> {
        lock(&self.commands)
            .iter()
            .map(|(label, _)| label.clone())
            .collect()
    }

    /// Run the first command registered under `label`.
    pub fn invoke(&self, label: &str) -> bool {
        let command = lock(&self.commands)
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, command)| Arc::clone(command));
        match command {
            Some(command) => {
                command();
                true
            }
            None => false,
        }
    }
}

impl MenuRegistrar for InMemoryMenu {
    fn register(&self, label: &str, command: MenuCommand) {
        lock(&self.commands).push((label.to_string(), command));
    }
}

impl std::fmt::Debug for InMemoryMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryMenu")
            .field("labels", &self.labels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_check_requirements() {
        let none = Capabilities::none();
        let optional = Requirements {
            notify: Requirement::Optional,
            menu: Requirement::Unused,
        };
        let required = Requirements {
            notify: Requirement::Unused,
            menu: Requirement::Required,
        };

        assert!(none.check("example", &Requirements::NONE).is_ok());
        assert!(none.check("example", &optional).is_ok());
        assert!(matches!(
            none.check("example", &required),
            Err(AppError::MissingCapability {
                module: "example",
                capability: "menu"
            })
        ));

        let with_menu = Capabilities::none().with_menu(Arc::new(InMemoryMenu::new()));
        assert!(with_menu.check("example", &required).is_ok());
    }

    #[test]
    fn test_notify_without_notifier() {
        assert!(!Capabilities::none().notify("t", "m"));

        let notifier = Arc::new(InMemoryNotifier::new());
        let caps = Capabilities::none().with_notifier(notifier.clone());
        assert!(caps.notify("Title", "Body"));
        assert_eq!(
            notifier.last(),
            Some(Notification {
                title: "Title".into(),
                message: "Body".into()
            })
        );
    }

    #[test]
    fn test_menu_invoke() {
        let menu = Arc::new(InMemoryMenu::new());
        let caps = Capabilities::none().with_menu(menu.clone());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        assert!(caps.register_menu(
            "Count",
            menu_command(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        ));

        assert_eq!(menu.labels(), vec!["Count"]);
        assert!(menu.invoke("Count"));
        assert!(menu.invoke("Count"));
        assert!(!menu.invoke("Missing"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(!Capabilities::none().register_menu("x", menu_command(|| {})));
    }
}
