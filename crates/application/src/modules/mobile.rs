//! Touch gestures and mobile-friendly page widgets.

use crate::capabilities::{MenuCommand, Requirements};
use crate::environment::PageEnvironment;
use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use userscript_dom::{DomWriter, SafeAreaInsets};
use userscript_events::TypedEventBus;
use userscript_gesture::{GestureConfig, GestureEvents, GestureRecognizer, RawInput};

const BUTTON_CLASS: &str = "userscript-mobile-button";
const MENU_CLASS: &str = "userscript-mobile-menu";
const BACKDROP_CLASS: &str = "userscript-mobile-backdrop";

/// Minimum padding around menu content, raised to the safe-area insets.
const MENU_PADDING_PX: f64 = 16.0;

/// Delay before the initial orientation is read from the host.
pub const INITIAL_ORIENTATION_DELAY: Duration = Duration::from_millis(100);

/// A touch-sized button and the action it runs.
pub struct MobileButton<E> {
    element: E,
    action: MenuCommand,
}

impl<E> MobileButton<E> {
    pub fn element(&self) -> &E {
        &self.element
    }

    /// Run the button's action, as a tap on it would.
    pub fn press(&self) {
        (self.action)();
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for MobileButton<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobileButton")
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

/// A menu built by [`MobileModule::create_menu`].
///
/// Remembers its backdrop while shown so hiding removes both.
#[derive(Debug)]
pub struct MobileMenu<E> {
    element: E,
    items: Vec<MobileButton<E>>,
    padding: String,
    backdrop: Mutex<Option<E>>,
}

impl<E: Clone> MobileMenu<E> {
    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn items(&self) -> &[MobileButton<E>] {
        &self.items
    }

    /// Backdrop behind the menu while it is shown.
    pub fn backdrop(&self) -> Option<E> {
        self.backdrop_slot().clone()
    }

    pub fn is_shown(&self) -> bool {
        self.backdrop_slot().is_some()
    }

    fn backdrop_slot(&self) -> MutexGuard<'_, Option<E>> {
        self.backdrop.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Feeds host input to a [`GestureRecognizer`] on touch devices.
pub struct MobileModule<H: DomWriter> {
    env: PageEnvironment<H>,
    recognizer: Arc<GestureRecognizer>,
    initialized: AtomicBool,
}

impl<H: DomWriter> MobileModule<H> {
    pub const NAME: &'static str = "mobile";

    pub const REQUIREMENTS: Requirements = Requirements::NONE;

    pub fn new(env: PageEnvironment<H>, config: GestureConfig) -> Self {
        let recognizer = Arc::new(GestureRecognizer::new(config, Arc::clone(&env.scheduler)));
        Self {
            env,
            recognizer,
            initialized: AtomicBool::new(false),
        }
    }

    /// Gesture, touch and orientation events.
    pub fn events(&self) -> &TypedEventBus<GestureEvents> {
        self.recognizer.events()
    }

    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Start recognizing input. Stays inactive on devices without touch.
    ///
    /// The initial orientation is reported [`INITIAL_ORIENTATION_DELAY`]
    /// later from the host's viewport; later changes arrive as
    /// [`RawInput::Viewport`].
    pub fn initialize(&self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }
        self.env
            .capabilities
            .check(Self::NAME, &Self::REQUIREMENTS)?;
        if !self.env.device.has_touch {
            tracing::warn!("mobile module: no touch support detected");
            return Ok(());
        }
        self.initialized.store(true, Ordering::SeqCst);
        self.report_initial_orientation();
        tracing::info!(
            swipe_threshold = self.recognizer.config().swipe_threshold,
            tap_window_ms = self.recognizer.config().tap_window_ms,
            "mobile module initialized"
        );
        Ok(())
    }

    fn report_initial_orientation(&self) {
        let dom = Arc::clone(&self.env.dom);
        let recognizer = Arc::downgrade(&self.recognizer);
        self.env.scheduler.schedule(
            INITIAL_ORIENTATION_DELAY,
            Box::new(move || {
                let Some(recognizer) = recognizer.upgrade() else {
                    return;
                };
                match dom.viewport() {
                    Some(viewport) => recognizer.handle(&RawInput::Viewport {
                        width: viewport.width,
                        height: viewport.height,
                    }),
                    None => tracing::debug!("host reported no viewport yet"),
                }
            }),
        );
    }

    /// Forward one host input event. Ignored until initialized.
    pub fn handle_input(&self, input: &RawInput) {
        if !self.is_initialized() {
            tracing::trace!(?input, "mobile module inactive, input ignored");
            return;
        }
        self.recognizer.handle(input);
    }

    /// A touch-sized button labelled `text` running `on_press`.
    pub fn create_button(&self, text: &str, on_press: MenuCommand) -> MobileButton<H::Element> {
        let dom = &self.env.dom;
        let element = dom.create_element("button");
        dom.set_attribute(&element, "class", BUTTON_CLASS);
        dom.set_attribute(&element, "style", "touch-action: manipulation");
        dom.set_text(&element, text);
        MobileButton {
            element,
            action: on_press,
        }
    }

    /// A menu holding one button per item, not yet attached to the page.
    /// Padding clears the host's safe-area insets.
    pub fn create_menu<S: AsRef<str>>(
        &self,
        items: Vec<(S, MenuCommand)>,
    ) -> MobileMenu<H::Element> {
        let dom = &self.env.dom;
        let element = dom.create_element("div");
        dom.set_attribute(&element, "class", MENU_CLASS);
        let padding = menu_padding(dom.safe_area_insets());
        dom.set_attribute(&element, "style", &padding);

        let items = items
            .into_iter()
            .map(|(label, action)| {
                let button = self.create_button(label.as_ref(), action);
                dom.append_child(&element, button.element());
                button
            })
            .collect();

        MobileMenu {
            element,
            items,
            padding,
            backdrop: Mutex::new(None),
        }
    }

    /// Attach `menu` to the body behind a backdrop. Handheld devices get
    /// the menu docked at the bottom of the screen, others at `anchor`.
    /// Returns `false` when the page has no body.
    pub fn show_menu(&self, menu: &MobileMenu<H::Element>, anchor: Option<(f64, f64)>) -> bool {
        let dom = &self.env.dom;
        let Some(body) = dom.body() else {
            return false;
        };

        if let Some((x, y)) = anchor {
            let placement = if self.env.device.is_mobile {
                "position: fixed; bottom: 16px; left: 16px; right: 16px".to_string()
            } else {
                format!("position: fixed; left: {x}px; top: {y}px")
            };
            dom.set_attribute(&menu.element, "style", &format!("{}; {placement}", menu.padding));
        }

        let backdrop = dom.create_element("div");
        dom.set_attribute(&backdrop, "class", BACKDROP_CLASS);
        if let Some(previous) = menu.backdrop_slot().replace(backdrop.clone()) {
            dom.remove(&previous);
        }
        dom.append_child(&body, &menu.element);
        dom.append_child(&body, &backdrop);
        true
    }

    /// Detach `menu` and its backdrop.
    pub fn hide_menu(&self, menu: &MobileMenu<H::Element>) {
        if let Some(backdrop) = menu.backdrop_slot().take() {
            self.env.dom.remove(&backdrop);
        }
        self.env.dom.remove(&menu.element);
    }

    /// Tap on the item at `index`: run its action, then hide the menu.
    /// Returns `false` for an unknown index.
    pub fn activate(&self, menu: &MobileMenu<H::Element>, index: usize) -> bool {
        let Some(item) = menu.items.get(index) else {
            return false;
        };
        item.press();
        self.hide_menu(menu);
        true
    }

    /// Tap on the backdrop.
    pub fn dismiss(&self, menu: &MobileMenu<H::Element>) {
        self.hide_menu(menu);
    }
}

fn menu_padding(insets: SafeAreaInsets) -> String {
    let side = |inset: f64| MENU_PADDING_PX.max(inset);
    format!(
        "padding: {}px {}px {}px {}px",
        side(insets.top),
        side(insets.right),
        side(insets.bottom),
        side(insets.left)
    )
}

impl<H: DomWriter> std::fmt::Debug for MobileModule<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobileModule")
            .field("initialized", &self.is_initialized())
            .field("recognizer", &self.recognizer)
            .finish_non_exhaustive()
    }
}
