//! Host page access for userscripts.
//!
//! The page is reached through [`DomHost`] and [`DomWriter`]; [`MemoryDom`]
//! implements both for tests and simulations. [`ElementWatcher`] waits for
//! elements matching a [`Selector`] to appear, and the style helpers inject
//! or remove page content.

mod error;
mod host;
mod memory;
mod selector;
mod styles;
mod watcher;

pub use error::{DomError, Result};
pub use host::{
    DomHost, DomWriter, MutationCallback, MutationRecord, ObserverId, SafeAreaInsets, Viewport,
};
pub use memory::{MemoryDom, NodeRef};
pub use selector::{Selector, SelectorSubject};
pub use styles::{add_styles, ensure_styles, remove_element, remove_matching};
pub use watcher::ElementWatcher;
