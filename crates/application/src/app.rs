//! Startup sequence and module wiring.

use crate::capabilities::menu_command;
use crate::config::AppConfig;
use crate::environment::PageEnvironment;
use crate::error::Result;
use crate::modules::{ActionPerformed, ActionRecord, ExampleModule, KeyPress, MobileModule};
use crate::registry::{ModuleKind, ModuleRegistry, RegisteredModule};
use crate::styles::{
    APP_STYLES_ID, BASE_CSS, MOBILE_CSS, MOBILE_HIGHLIGHT_CSS, MOBILE_STYLES_ID,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use userscript_dom::{ensure_styles, DomWriter};
use userscript_events::{event_map, listener, TypedEventBus};
use userscript_gesture::{Gesture, GestureDetected, Orientation, OrientationChanged, RawInput};

pub const VISIT_COUNT_KEY: &str = "visitCount";
pub const SHOW_VISIT_COUNT_LABEL: &str = "Show Visit Count";
pub const MOBILE_INFO_LABEL: &str = "Mobile Info";

event_map! {
    /// Lifecycle of the [`App`].
    pub AppEvents {
        Ready: () = "ready",
        /// Startup failed; carries the error message.
        Failed: String = "error",
        ModuleLoaded: ModuleKind = "moduleLoaded",
    }
}

/// The userscript entry point.
///
/// [`App::start`] waits for the page body, injects the shared styles,
/// counts the visit, registers menu entries and brings up the modules.
/// Module failures are logged and leave the app running without them.
pub struct App<H: DomWriter> {
    config: AppConfig,
    env: PageEnvironment<H>,
    events: TypedEventBus<AppEvents>,
    modules: Mutex<ModuleRegistry<H>>,
    ready: AtomicBool,
}

impl<H: DomWriter> App<H> {
    pub fn new(config: AppConfig, env: PageEnvironment<H>) -> Self {
        Self {
            config,
            env,
            events: TypedEventBus::new(),
            modules: Mutex::new(ModuleRegistry::new()),
            ready: AtomicBool::new(false),
        }
    }

    pub fn events(&self) -> &TypedEventBus<AppEvents> {
        &self.events
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn environment(&self) -> &PageEnvironment<H> {
        &self.env
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn registry(&self) -> MutexGuard<'_, ModuleRegistry<H>> {
        self.modules.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn module<M: RegisteredModule<H>>(&self) -> Option<Arc<M>> {
        self.registry().get::<M>().cloned()
    }

    pub fn module_kinds(&self) -> Vec<ModuleKind> {
        self.registry().kinds()
    }

    pub fn visit_count(&self) -> u64 {
        self.env.storage.get_or(VISIT_COUNT_KEY, 0)
    }

    /// Run the startup sequence once. Emits [`Ready`] on success and
    /// [`Failed`] before returning an error.
    pub async fn start(&self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        if self.config.dev_mode {
            tracing::debug!(version = %self.config.version, "starting in development mode");
        }
        tracing::info!("userscript starting");

        match self.run().await {
            Ok(()) => {
                self.ready.store(true, Ordering::SeqCst);
                self.events.emit::<Ready>(&());
                tracing::info!(modules = ?self.module_kinds(), "userscript initialized");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "userscript initialization failed");
                self.events.emit::<Failed>(&e.to_string());
                Err(e)
            }
        }
    }

    async fn run(&self) -> Result<()> {
        self.env
            .watcher
            .watch("body", None, self.config.body_timeout())
            .await?;

        let device = &self.env.device;
        if device.is_mobile {
            ensure_styles(self.env.dom.as_ref(), MOBILE_CSS, MOBILE_STYLES_ID)?;
            tracing::info!(
                platform = %device.platform(),
                touch = device.has_touch,
                supported = device.supports_userscripts(),
                manager = device.recommended_manager(),
                "mobile browser detected"
            );
        }

        self.add_base_features()?;
        self.initialize_modules().await;
        Ok(())
    }

    fn add_base_features(&self) -> Result<()> {
        let device = Arc::clone(&self.env.device);

        let mut css = BASE_CSS.to_string();
        if device.is_mobile {
            css.push_str(MOBILE_HIGHLIGHT_CSS);
        }
        ensure_styles(self.env.dom.as_ref(), &css, APP_STYLES_ID)?;

        let visits = self.visit_count() + 1;
        self.env.storage.set(VISIT_COUNT_KEY, &visits);
        tracing::info!(visit = visits, "visit counted");

        let capabilities = self.env.capabilities.clone();
        let storage = self.env.storage.clone();
        self.env.capabilities.register_menu(
            SHOW_VISIT_COUNT_LABEL,
            menu_command(move || {
                let count = storage.get_or(VISIT_COUNT_KEY, 0u64);
                capabilities.notify("UserScript Info", &format!("Visit Count: {count}"));
            }),
        );

        if device.is_mobile {
            let capabilities = self.env.capabilities.clone();
            self.env.capabilities.register_menu(
                MOBILE_INFO_LABEL,
                menu_command(move || {
                    capabilities.notify("Mobile Device Info", &device.summary());
                }),
            );
        }
        Ok(())
    }

    async fn initialize_modules(&self) {
        let example = Arc::new(ExampleModule::new(
            self.env.clone(),
            self.config.body_timeout(),
        ));
        if let Err(e) = example.initialize().await {
            tracing::error!(module = %ModuleKind::Example, error = %e, "module initialization failed");
            return;
        }
        self.register(Arc::clone(&example));

        let device = &self.env.device;
        if device.is_mobile || device.has_touch {
            let mobile = Arc::new(MobileModule::new(self.env.clone(), self.config.gestures));
            if let Err(e) = mobile.initialize() {
                tracing::error!(module = %ModuleKind::Mobile, error = %e, "module initialization failed");
                return;
            }
            mobile
                .events()
                .on::<GestureDetected>(listener(|gesture: &Gesture| {
                    let position = gesture.position();
                    tracing::info!(
                        gesture = %gesture.kind(),
                        x = position.x,
                        y = position.y,
                        "gesture detected"
                    );
                }));
            mobile
                .events()
                .on::<OrientationChanged>(listener(|orientation: &Orientation| {
                    tracing::info!(%orientation, "orientation changed");
                }));
            self.register(mobile);
        }

        example
            .events()
            .on::<ActionPerformed>(listener(|record: &ActionRecord| {
                tracing::info!(
                    action = %record.action,
                    at = %record.timestamp.to_rfc3339(),
                    "module action received"
                );
            }));
    }

    fn register<M: RegisteredModule<H>>(&self, module: Arc<M>) {
        self.registry().register(module);
        tracing::info!(module = %M::KIND, "module loaded");
        self.events.emit::<ModuleLoaded>(&M::KIND);
    }

    /// Route a host input event to the mobile module, if loaded.
    pub fn handle_input(&self, input: &RawInput) {
        if let Some(mobile) = self.module::<MobileModule<H>>() {
            mobile.handle_input(input);
        }
    }

    /// Route a key press to the example module. Returns whether it was
    /// consumed.
    pub fn handle_key(&self, key: &KeyPress) -> bool {
        self.module::<ExampleModule<H>>()
            .is_some_and(|example| example.handle_key(key))
    }
}

impl<H: DomWriter> std::fmt::Debug for App<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("ready", &self.is_ready())
            .field("modules", &self.module_kinds())
            .finish_non_exhaustive()
    }
}
