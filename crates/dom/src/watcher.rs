//! Wait for elements to appear in the page.

use crate::error::{DomError, Result};
use crate::host::{DomHost, MutationRecord, ObserverId};
use crate::selector::Selector;
use futures::future::try_join_all;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::oneshot;

/// Resolves when an element matching a selector exists under a root.
///
/// Each wait installs at most one change subscription and removes it on
/// every outcome: match, timeout, or the future being dropped.
pub struct ElementWatcher<H: DomHost> {
    host: Arc<H>,
}

impl<H: DomHost> Clone for ElementWatcher<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

impl<H: DomHost> ElementWatcher<H> {
    /// Create a watcher over `host`.
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    /// The page being watched.
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Wait for the first element matching `selector` under `root`
    /// (the document when `None`).
    ///
    /// Resolves immediately when a match already exists. Otherwise the
    /// first inserted node that matches, or contains a match, wins.
    pub async fn watch(
        &self,
        selector: &str,
        root: Option<H::Element>,
        timeout: Duration,
    ) -> Result<H::Element> {
        let selector = Selector::parse(selector)?;
        let root = root.unwrap_or_else(|| self.host.document());

        if let Some(found) = self.host.query_selector(&root, &selector) {
            tracing::debug!(selector = %selector, "element already present");
            return Ok(found);
        }

        let (tx, rx) = oneshot::channel();
        let selector = Arc::new(selector);
        let observation = self.subscribe(&root, Arc::clone(&selector), tx);

        // An insertion between the first query and the subscription would
        // otherwise be missed.
        if let Some(found) = self.host.query_selector(&root, &selector) {
            drop(observation);
            tracing::debug!(selector = %selector, "element appeared before subscription");
            return Ok(found);
        }

        let outcome = tokio::time::timeout(timeout, rx).await;
        drop(observation);

        match outcome {
            Ok(Ok(found)) => {
                tracing::debug!(selector = %selector, "element appeared");
                Ok(found)
            }
            Ok(Err(_)) => Err(DomError::ObserverClosed {
                selector: selector.to_string(),
            }),
            Err(_) => {
                let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(selector = %selector, timeout_ms, "element wait timed out");
                Err(DomError::Timeout {
                    selector: selector.to_string(),
                    timeout_ms,
                })
            }
        }
    }

    /// Wait for every selector concurrently. Resolves with the elements in
    /// input order, or with the first failure.
    pub async fn watch_all<S: AsRef<str>>(
        &self,
        selectors: &[S],
        root: Option<H::Element>,
        timeout: Duration,
    ) -> Result<Vec<H::Element>> {
        try_join_all(
            selectors
                .iter()
                .map(|selector| self.watch(selector.as_ref(), root.clone(), timeout)),
        )
        .await
    }

    fn subscribe(
        &self,
        root: &H::Element,
        selector: Arc<Selector>,
        tx: oneshot::Sender<H::Element>,
    ) -> Observation<H> {
        // The callback owns the only sender; disconnecting drops it.
        let slot = Mutex::new(Some(tx));
        let weak: Weak<H> = Arc::downgrade(&self.host);
        let id = self.host.observe(
            root,
            Arc::new(move |records: &[MutationRecord<H::Element>]| {
                let Some(host) = weak.upgrade() else {
                    return;
                };
                let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.is_none() {
                    return;
                }
                if let Some(found) = first_added_match(host.as_ref(), records, &selector) {
                    if let Some(tx) = slot.take() {
                        let _ = tx.send(found);
                    }
                }
            }),
        );
        Observation {
            host: Arc::clone(&self.host),
            id: Some(id),
        }
    }
}

impl<H: DomHost> std::fmt::Debug for ElementWatcher<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementWatcher").finish_non_exhaustive()
    }
}

fn first_added_match<H: DomHost>(
    host: &H,
    records: &[MutationRecord<H::Element>],
    selector: &Selector,
) -> Option<H::Element> {
    records
        .iter()
        .flat_map(|record| record.added_nodes.iter())
        .find_map(|node| {
            if host.matches(node, selector) {
                Some(node.clone())
            } else {
                host.query_selector(node, selector)
            }
        })
}

/// Disconnects its subscription when dropped.
struct Observation<H: DomHost> {
    host: Arc<H>,
    id: Option<ObserverId>,
}

impl<H: DomHost> Drop for Observation<H> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.host.disconnect(id);
        }
    }
}
