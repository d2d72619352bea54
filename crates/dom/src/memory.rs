//! In-memory host page.
//!
//! A small document tree implementing [`DomHost`] and [`DomWriter`]. Change
//! subscriptions are notified synchronously, once per structural change,
//! after the internal lock is released, so callbacks may freely call back
//! into the document.

use crate::host::{
    DomHost, DomWriter, MutationCallback, MutationRecord, ObserverId, SafeAreaInsets, Viewport,
};
use crate::selector::{Selector, SelectorSubject};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Handle to a node of a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u64);

#[derive(Debug)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeRef>,
    children: Vec<NodeRef>,
}

struct Observer {
    id: ObserverId,
    root: NodeRef,
    callback: MutationCallback<NodeRef>,
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<NodeRef, NodeData>,
    next_node: u64,
    observers: Vec<Observer>,
    next_observer: u64,
    deliveries: u64,
    viewport: Option<Viewport>,
    safe_area: SafeAreaInsets,
}

impl Inner {
    fn insert(&mut self, kind: NodeKind) -> NodeRef {
        let id = NodeRef(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            NodeData {
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    fn view(&self, id: NodeRef) -> NodeView<'_> {
        NodeView { inner: self, id }
    }

    fn tag(&self, id: NodeRef) -> Option<&str> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    fn children(&self, id: NodeRef) -> &[NodeRef] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeRef, node: NodeRef) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, node: NodeRef) -> bool {
        let Some(parent) = self.nodes.get_mut(&node).and_then(|n| n.parent.take()) else {
            return false;
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|child| *child != node);
        }
        true
    }

    fn attach(&mut self, parent: NodeRef, child: NodeRef) {
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    /// Callbacks whose root contains `target`, with the record to deliver.
    fn pending_notifications(
        &mut self,
        target: NodeRef,
        added_nodes: Vec<NodeRef>,
    ) -> Vec<(MutationCallback<NodeRef>, Vec<MutationRecord<NodeRef>>)> {
        let callbacks: Vec<MutationCallback<NodeRef>> = self
            .observers
            .iter()
            .filter(|observer| self.is_inclusive_ancestor(observer.root, target))
            .map(|observer| observer.callback.clone())
            .collect();
        self.deliveries += callbacks.len() as u64;

        let record = MutationRecord {
            target,
            added_nodes,
        };
        callbacks
            .into_iter()
            .map(|callback| (callback, vec![record.clone()]))
            .collect()
    }

    fn first_match(&self, root: NodeRef, selector: &Selector) -> Option<NodeRef> {
        for &child in self.children(root) {
            if selector.matches(&self.view(child)) {
                return Some(child);
            }
            if let Some(found) = self.first_match(child, selector) {
                return Some(found);
            }
        }
        None
    }

    fn text_content(&self, id: NodeRef, out: &mut String) {
        if let Some(NodeData {
            kind: NodeKind::Text(text),
            ..
        }) = self.nodes.get(&id)
        {
            out.push_str(text);
        }
        for &child in self.children(id) {
            self.text_content(child, out);
        }
    }
}

#[derive(Clone, Copy)]
struct NodeView<'a> {
    inner: &'a Inner,
    id: NodeRef,
}

impl SelectorSubject for NodeView<'_> {
    fn tag_name(&self) -> Option<&str> {
        self.inner.tag(self.id)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match &self.inner.nodes.get(&self.id)?.kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.inner.nodes.get(&self.id)?.parent?;
        self.inner.tag(parent)?;
        Some(self.inner.view(parent))
    }
}

/// In-memory document with `html`, `head` and (optionally) `body`.
pub struct MemoryDom {
    inner: Mutex<Inner>,
    document: NodeRef,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// A document with `html`, `head` and `body`.
    pub fn new() -> Self {
        let dom = Self::without_body();
        {
            let mut inner = dom.lock();
            let html = inner.children(dom.document).first().copied();
            if let Some(html) = html {
                let body = inner.insert(element_kind("body"));
                inner.attach(html, body);
            }
        }
        dom
    }

    /// A document whose `body` has not been parsed yet.
    pub fn without_body() -> Self {
        let mut inner = Inner::default();
        let document = inner.insert(NodeKind::Document);
        let html = inner.insert(element_kind("html"));
        let head = inner.insert(element_kind("head"));
        inner.attach(document, html);
        inner.attach(html, head);
        Self {
            inner: Mutex::new(inner),
            document,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn child_element(&self, parent: Option<NodeRef>, tag: &str) -> Option<NodeRef> {
        let inner = self.lock();
        inner
            .children(parent?)
            .iter()
            .copied()
            .find(|&child| inner.tag(child) == Some(tag))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeRef {
        self.lock().insert(NodeKind::Text(text.to_string()))
    }

    /// Append several children and deliver them as one notification batch.
    pub fn append_children(&self, parent: &NodeRef, children: &[NodeRef]) {
        let notifications = {
            let mut inner = self.lock();
            if !inner.nodes.contains_key(parent) {
                return;
            }
            let mut added = Vec::with_capacity(children.len());
            for &child in children {
                if !inner.nodes.contains_key(&child) || inner.is_inclusive_ancestor(child, *parent)
                {
                    tracing::warn!(?child, ?parent, "refusing to append node");
                    continue;
                }
                inner.attach(*parent, child);
                added.push(child);
            }
            if added.is_empty() {
                return;
            }
            inner.pending_notifications(*parent, added)
        };

        for (callback, records) in notifications {
            callback(&records);
        }
    }

    /// Lowercase tag name, `None` for the document and text nodes.
    pub fn tag_name(&self, node: &NodeRef) -> Option<String> {
        self.lock().tag(*node).map(str::to_string)
    }

    /// Attribute value of an element.
    pub fn attribute(&self, node: &NodeRef, name: &str) -> Option<String> {
        let inner = self.lock();
        inner.view(*node).attribute(name).map(str::to_string)
    }

    /// Parent node, `None` for detached nodes and the document.
    pub fn parent(&self, node: &NodeRef) -> Option<NodeRef> {
        self.lock().nodes.get(node).and_then(|n| n.parent)
    }

    /// Child nodes in document order.
    pub fn children(&self, node: &NodeRef) -> Vec<NodeRef> {
        self.lock().children(*node).to_vec()
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: &NodeRef) -> String {
        let mut out = String::new();
        self.lock().text_content(*node, &mut out);
        out
    }

    /// Whether `node` is currently attached to the document.
    pub fn contains(&self, node: &NodeRef) -> bool {
        self.lock().is_inclusive_ancestor(self.document, *node)
    }

    /// Every descendant of `root` matching `selector`, in document order.
    pub fn query_selector_all(&self, root: &NodeRef, selector: &Selector) -> Vec<NodeRef> {
        let inner = self.lock();
        let mut found = Vec::new();
        let mut stack: Vec<NodeRef> = inner.children(*root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if selector.matches(&inner.view(node)) {
                found.push(node);
            }
            stack.extend(inner.children(node).iter().rev().copied());
        }
        found
    }

    /// Number of installed change subscriptions.
    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    /// Simulate the page being laid out at `width` x `height`.
    pub fn set_viewport(&self, width: f64, height: f64) {
        self.lock().viewport = Some(Viewport::new(width, height));
    }

    /// Simulate a device with notches or system bars.
    pub fn set_safe_area_insets(&self, insets: SafeAreaInsets) {
        self.lock().safe_area = insets;
    }

    /// Total number of callback invocations delivered so far.
    pub fn deliveries(&self) -> u64 {
        self.lock().deliveries
    }
}

fn element_kind(tag: &str) -> NodeKind {
    NodeKind::Element {
        tag: tag.to_ascii_lowercase(),
        attributes: BTreeMap::new(),
    }
}

impl DomHost for MemoryDom {
    type Element = NodeRef;

    fn document(&self) -> NodeRef {
        self.document
    }

    fn query_selector(&self, root: &NodeRef, selector: &Selector) -> Option<NodeRef> {
        self.lock().first_match(*root, selector)
    }

    fn matches(&self, node: &NodeRef, selector: &Selector) -> bool {
        let inner = self.lock();
        selector.matches(&inner.view(*node))
    }

    fn observe(&self, root: &NodeRef, callback: MutationCallback<NodeRef>) -> ObserverId {
        let mut inner = self.lock();
        let id = ObserverId::new(inner.next_observer);
        inner.next_observer += 1;
        inner.observers.push(Observer {
            id,
            root: *root,
            callback,
        });
        tracing::trace!(observer = id.raw(), ?root, "observer installed");
        id
    }

    fn disconnect(&self, observer: ObserverId) {
        let mut inner = self.lock();
        inner.observers.retain(|o| o.id != observer);
        tracing::trace!(observer = observer.raw(), "observer disconnected");
    }

    fn viewport(&self) -> Option<Viewport> {
        self.lock().viewport
    }

    fn safe_area_insets(&self) -> SafeAreaInsets {
        self.lock().safe_area
    }
}

impl DomWriter for MemoryDom {
    fn create_element(&self, tag: &str) -> NodeRef {
        self.lock().insert(element_kind(tag))
    }

    fn set_attribute(&self, element: &NodeRef, name: &str, value: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.lock().nodes.get_mut(element)
        {
            attributes.insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    fn set_text(&self, element: &NodeRef, text: &str) {
        let text_node = {
            let mut inner = self.lock();
            let old: Vec<NodeRef> = inner.children(*element).to_vec();
            for child in old {
                inner.detach(child);
            }
            inner.insert(NodeKind::Text(text.to_string()))
        };
        self.append_children(element, &[text_node]);
    }

    fn append_child(&self, parent: &NodeRef, child: &NodeRef) {
        self.append_children(parent, std::slice::from_ref(child));
    }

    fn remove(&self, node: &NodeRef) -> bool {
        self.lock().detach(*node)
    }

    fn document_element(&self) -> Option<NodeRef> {
        let inner = self.lock();
        inner
            .children(self.document)
            .iter()
            .copied()
            .find(|&child| inner.tag(child).is_some())
    }

    fn head(&self) -> Option<NodeRef> {
        self.child_element(self.document_element(), "head")
    }

    fn body(&self) -> Option<NodeRef> {
        self.child_element(self.document_element(), "body")
    }
}

impl std::fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryDom")
            .field("nodes", &inner.nodes.len())
            .field("observers", &inner.observers.len())
            .finish_non_exhaustive()
    }
}
