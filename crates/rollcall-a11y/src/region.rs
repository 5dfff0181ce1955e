//! Host document model
//!
//! The engine never owns UI widgets. It talks to the host through
//! [`FocusHost`], which exposes the targets of a bounded region in traversal
//! order together with the current focus owner. [`Document`] is an in-memory
//! host used by the demo binary and the tests, and a reasonable starting point
//! for bridging a real widget tree.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

/// Stable lookup key of a node
///
/// Holding a `NodeId` never keeps the node alive; every use is a guarded
/// lookup that fails once the node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Numeric value, for logs
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// What kind of element a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Grouping node (region, dialog, panel)
    Container,
    Button,
    Link,
    TextField,
    TextArea,
    Select,
    /// Generic element, focusable only with an explicit tab index
    Generic,
    /// Plain text or decoration
    Static,
}

/// Rendered area of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True unless both sides are positive; NaN counts as empty
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Element description used to build a [`Document`]
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: TargetKind,
    pub label: String,
    pub disabled: bool,
    /// `aria-disabled="true"`
    pub aria_disabled: bool,
    pub hidden: bool,
    pub size: Size,
    pub tab_index: Option<i32>,
}

impl Element {
    /// Enabled, visible element with a default rendered size
    pub fn new(kind: TargetKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            disabled: false,
            aria_disabled: false,
            hidden: false,
            size: Size::new(100.0, 24.0),
            tab_index: None,
        }
    }

    pub fn container(label: impl Into<String>) -> Self {
        Self::new(TargetKind::Container, label)
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self::new(TargetKind::Button, label)
    }

    pub fn link(label: impl Into<String>) -> Self {
        Self::new(TargetKind::Link, label)
    }

    pub fn text_field(label: impl Into<String>) -> Self {
        Self::new(TargetKind::TextField, label)
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn aria_disabled(mut self, aria_disabled: bool) -> Self {
        self.aria_disabled = aria_disabled;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Rendered size; zero or NaN makes the element unreachable
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    pub fn tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }
}

/// Snapshot of one node as seen by the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: NodeId,
    pub kind: TargetKind,
    pub label: String,
    pub disabled: bool,
    pub aria_disabled: bool,
    /// Hidden itself or through an ancestor
    pub hidden: bool,
    pub size: Size,
    pub tab_index: Option<i32>,
}

/// Boundary between the engine and the UI host
pub trait FocusHost: Send + Sync {
    /// Descendants of `region` in traversal order, excluding `region` itself
    fn candidates(&self, region: NodeId) -> Vec<Target>;

    /// Current focus owner, if any
    fn active(&self) -> Option<NodeId>;

    /// Move focus to `id`; false when the node is gone or cannot take focus
    fn focus(&self, id: NodeId) -> bool;

    /// Whether `id` still refers to a live node
    fn contains(&self, id: NodeId) -> bool;
}

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory element tree with a single focus owner
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    active: Option<NodeId>,
}

impl Document {
    /// Document holding only the root container
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                element: Element::container("document"),
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
            active: None,
        }
    }

    /// Root container every other node descends from
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Append `element` as the last child of `parent`
    ///
    /// Returns `None` when `parent` does not exist.
    pub fn append(&mut self, parent: NodeId, element: Element) -> Option<NodeId> {
        let id = NodeId(self.next_id);
        self.nodes.get_mut(&parent)?.children.push(id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                element,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        Some(id)
    }

    /// Remove `id` and its subtree, dropping focus if it was inside
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root {
            return false;
        }
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|child| *child != id);
        }

        let mut stack = node.children;
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                stack.extend(removed.children);
            }
        }
        if self.active.is_some_and(|active| !self.nodes.contains_key(&active)) {
            self.active = None;
        }
        true
    }

    /// Element for `id`, or `None` once removed
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(&id).map(|node| &node.element)
    }

    /// Mutable access for toggling attributes after creation
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(&id).map(|node| &mut node.element)
    }

    /// Current focus owner
    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Focus `id` unless it is missing, disabled or hidden
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(&id) || self.is_hidden(id) {
            return false;
        }
        match self.element(id) {
            Some(element) if !element.disabled => {
                self.active = Some(id);
                true
            }
            _ => false,
        }
    }

    /// Drop focus without moving it anywhere
    pub fn blur(&mut self) {
        self.active = None;
    }

    fn is_hidden(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.nodes.get(&current) {
                Some(node) if node.element.hidden => return true,
                Some(node) => cursor = node.parent,
                None => return true,
            }
        }
        false
    }

    /// Descendants of `region` in depth-first document order
    pub fn candidates(&self, region: NodeId) -> Vec<Target> {
        let mut targets = Vec::new();
        let Some(start) = self.nodes.get(&region) else {
            return targets;
        };

        let region_hidden = self.is_hidden(region);
        let mut stack: Vec<(NodeId, bool)> = start
            .children
            .iter()
            .rev()
            .map(|child| (*child, region_hidden))
            .collect();

        while let Some((id, ancestor_hidden)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let hidden = ancestor_hidden || node.element.hidden;
            targets.push(Target {
                id,
                kind: node.element.kind,
                label: node.element.label.clone(),
                disabled: node.element.disabled,
                aria_disabled: node.element.aria_disabled,
                hidden,
                size: node.element.size,
                tab_index: node.element.tab_index,
            });
            stack.extend(node.children.iter().rev().map(|child| (*child, hidden)));
        }
        targets
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe [`Document`] handle implementing [`FocusHost`]
#[derive(Debug, Clone, Default)]
pub struct SharedDocument {
    document: Arc<RwLock<Document>>,
    focus_calls: Arc<AtomicUsize>,
}

impl SharedDocument {
    pub fn new(document: Document) -> Self {
        Self {
            document: Arc::new(RwLock::new(document)),
            focus_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Read access for inspecting the tree
    pub fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.document.read()
    }

    /// Write access for building or mutating the tree
    pub fn write(&self) -> RwLockWriteGuard<'_, Document> {
        self.document.write()
    }

    /// Number of focus requests received through [`FocusHost::focus`]
    pub fn focus_calls(&self) -> usize {
        self.focus_calls.load(Ordering::SeqCst)
    }
}

impl FocusHost for SharedDocument {
    fn candidates(&self, region: NodeId) -> Vec<Target> {
        self.document.read().candidates(region)
    }

    fn active(&self) -> Option<NodeId> {
        self.document.read().active()
    }

    fn focus(&self, id: NodeId) -> bool {
        self.focus_calls.fetch_add(1, Ordering::SeqCst);
        self.document.write().focus(id)
    }

    fn contains(&self, id: NodeId) -> bool {
        self.document.read().nodes.contains_key(&id)
    }
}
