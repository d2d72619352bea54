//! Contract between the toolkit and the host page.
//!
//! These traits abstract the page's document so the watcher and the style
//! helpers can be driven by a real browser binding or by
//! [`MemoryDom`](crate::MemoryDom) in tests.

use crate::selector::Selector;
use std::fmt;
use std::sync::Arc;

/// Handle of an installed change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Wrap a host-assigned subscription number.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Host-assigned subscription number.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Nodes inserted under `target` since the previous notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord<E> {
    pub target: E,
    pub added_nodes: Vec<E>,
}

/// Size of the layout viewport in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Screen area obscured by notches and system bars, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SafeAreaInsets {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// Callback receiving one notification batch.
pub type MutationCallback<E> = Arc<dyn Fn(&[MutationRecord<E>]) + Send + Sync + 'static>;

/// Read and observe access to the page structure.
pub trait DomHost: Send + Sync + 'static {
    /// Node handle. Non-element nodes (text) use the same handle type and
    /// never match a selector.
    type Element: Clone + Send + Sync + fmt::Debug + 'static;

    /// The document node, root of the whole page.
    fn document(&self) -> Self::Element;

    /// First descendant of `root` (in document order) matching `selector`.
    fn query_selector(&self, root: &Self::Element, selector: &Selector) -> Option<Self::Element>;

    /// Whether `node` itself matches `selector`.
    fn matches(&self, node: &Self::Element, selector: &Selector) -> bool;

    /// Subscribe to node insertions anywhere under `root`.
    fn observe(&self, root: &Self::Element, callback: MutationCallback<Self::Element>)
        -> ObserverId;

    /// Remove a subscription. Unknown ids are ignored.
    fn disconnect(&self, observer: ObserverId);

    /// Current viewport size, `None` when the host has no layout yet.
    fn viewport(&self) -> Option<Viewport> {
        None
    }

    fn safe_area_insets(&self) -> SafeAreaInsets {
        SafeAreaInsets::default()
    }
}

/// Structural mutation of the page.
pub trait DomWriter: DomHost {
    fn create_element(&self, tag: &str) -> Self::Element;

    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);

    /// Replace the children of `element` with a single text node.
    fn set_text(&self, element: &Self::Element, text: &str);

    /// Append `child` to `parent`, detaching it from its previous parent.
    fn append_child(&self, parent: &Self::Element, child: &Self::Element);

    /// Detach `node` from its parent. Returns `false` if it had none.
    fn remove(&self, node: &Self::Element) -> bool;

    fn document_element(&self) -> Option<Self::Element>;

    fn head(&self) -> Option<Self::Element>;

    fn body(&self) -> Option<Self::Element>;
}
