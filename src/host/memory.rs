//! In-memory host environment.
//!
//! A minimal node store backing the [`HostEnvironment`] trait without any
//! real display layer. Tests and demos seed it with fragments, views query
//! and patch it like a document.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::markup::{self, VIEW_ID_ATTR, VIEW_PATH_ATTR};
use crate::types::{NodeHandle, ScriptResource};

use super::HostEnvironment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Element,
    Text,
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    tag: String,
    attributes: HashMap<String, String>,
    children: Vec<NodeHandle>,
    parent: Option<NodeHandle>,
}

/// In-memory document: nodes, markup boundaries, scripts and styles.
#[derive(Default)]
pub struct MemoryHost {
    nodes: RefCell<HashMap<NodeHandle, Node>>,
    roots: RefCell<Vec<NodeHandle>>,
    boundaries: RefCell<HashMap<(String, String), Vec<NodeHandle>>>,
    scripts: RefCell<HashMap<String, String>>,
    /// style id -> definition path
    styles: RefCell<HashMap<String, String>>,
    next: Cell<NodeHandle>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize a fragment at document level; returns the new roots.
    ///
    /// Boundary comment pairs emitted by tagless wrappers are recognized
    /// here: the nodes between a pair are registered as the (path, viewId)
    /// markup boundary.
    pub fn insert_fragment(&self, fragment: &str) -> Vec<NodeHandle> {
        let mut handles = Vec::new();
        let mut rest = fragment;
        while let Some(open) = rest.find(markup::BOUNDARY_OPEN) {
            handles.extend(self.materialize(&rest[..open], None));
            let after = &rest[open + markup::BOUNDARY_OPEN.len()..];
            let Some(key_end) = after.find("-->") else {
                break;
            };
            let key = &after[..key_end];
            let body = &after[key_end + 3..];
            let close_marker = format!("{}{key}-->", markup::BOUNDARY_CLOSE);
            let Some(close) = body.find(&close_marker) else {
                handles.extend(self.materialize(body, None));
                rest = "";
                break;
            };
            let owned = self.materialize(&body[..close], None);
            if let Some((path, view_id)) = key.rsplit_once(':') {
                self.register_boundary(path, view_id, owned.clone());
            }
            handles.extend(owned);
            rest = &body[close + close_marker.len()..];
        }
        handles.extend(self.materialize(rest, None));
        self.roots.borrow_mut().extend(handles.iter().copied());
        handles
    }

    /// Record which nodes a (path, viewId) pair owns through markup
    /// boundaries. Stands in for boundary comment markers.
    pub fn register_boundary(&self, path: &str, view_id: &str, nodes: Vec<NodeHandle>) {
        self.boundaries
            .borrow_mut()
            .insert((path.to_string(), view_id.to_string()), nodes);
    }

    /// Seed a style resource (physical insertion is outside the runtime).
    pub fn insert_style(&self, id: &str, path: &str) {
        self.styles
            .borrow_mut()
            .insert(id.to_string(), path.to_string());
    }

    pub fn script_count(&self) -> usize {
        self.scripts.borrow().len()
    }

    pub fn has_script(&self, id: &str) -> bool {
        self.scripts.borrow().contains_key(id)
    }

    pub fn style_count(&self) -> usize {
        self.styles.borrow().len()
    }

    pub fn tag_of(&self, node: NodeHandle) -> Option<String> {
        self.nodes.borrow().get(&node).map(|n| n.tag.clone())
    }

    pub fn attribute(&self, node: NodeHandle, name: &str) -> Option<String> {
        self.nodes
            .borrow()
            .get(&node)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    pub fn contains_node(&self, node: NodeHandle) -> bool {
        self.nodes.borrow().contains_key(&node)
    }

    fn alloc(&self) -> NodeHandle {
        let handle = self.next.get() + 1;
        self.next.set(handle);
        handle
    }

    fn text_node(&self, parent: Option<NodeHandle>) -> NodeHandle {
        let handle = self.alloc();
        self.nodes.borrow_mut().insert(
            handle,
            Node {
                kind: NodeKind::Text,
                tag: String::new(),
                attributes: HashMap::new(),
                children: Vec::new(),
                parent,
            },
        );
        handle
    }

    /// Build nodes from a fragment. Elements materialize recursively; text
    /// runs between (or instead of) elements become text nodes.
    fn materialize(&self, fragment: &str, parent: Option<NodeHandle>) -> Vec<NodeHandle> {
        let elements = markup::scan_root_elements(fragment);
        let mut handles = Vec::with_capacity(elements.len());
        let mut cursor = 0;
        for element in &elements {
            if !fragment[cursor..element.tag_open].trim().is_empty() {
                handles.push(self.text_node(parent));
            }
            let handle = self.alloc();
            self.nodes.borrow_mut().insert(
                handle,
                Node {
                    kind: NodeKind::Element,
                    tag: element.name.clone(),
                    attributes: element.attributes.clone(),
                    children: Vec::new(),
                    parent,
                },
            );
            let children = self.materialize(element.content(fragment), Some(handle));
            if let Some(node) = self.nodes.borrow_mut().get_mut(&handle) {
                node.children = children;
            }
            handles.push(handle);
            cursor = element.content_end;
            if fragment[cursor..].starts_with("</") {
                cursor = fragment[cursor..]
                    .find('>')
                    .map(|i| cursor + i + 1)
                    .unwrap_or(fragment.len());
            }
        }
        if !fragment[cursor..].trim().is_empty() {
            handles.push(self.text_node(parent));
        }
        handles
    }

    /// Depth-first walk over the live document.
    fn walk(&self) -> Vec<NodeHandle> {
        fn visit(
            nodes: &HashMap<NodeHandle, Node>,
            handle: NodeHandle,
            out: &mut Vec<NodeHandle>,
        ) {
            out.push(handle);
            if let Some(node) = nodes.get(&handle) {
                for child in &node.children {
                    visit(nodes, *child, out);
                }
            }
        }
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        for root in self.roots.borrow().iter() {
            visit(&nodes, *root, &mut out);
        }
        out
    }

    fn remove_from_parent(&self, handle: NodeHandle) {
        let parent = self.nodes.borrow().get(&handle).and_then(|n| n.parent);
        match parent {
            Some(parent) => {
                if let Some(node) = self.nodes.borrow_mut().get_mut(&parent) {
                    node.children.retain(|c| *c != handle);
                }
            }
            None => self.roots.borrow_mut().retain(|r| *r != handle),
        }
        if let Some(node) = self.nodes.borrow_mut().get_mut(&handle) {
            node.parent = None;
        }
    }
}

impl HostEnvironment for MemoryHost {
    fn query_view_root(&self, view_id: &str) -> Option<NodeHandle> {
        let handles = self.walk();
        let nodes = self.nodes.borrow();
        handles.into_iter().find(|h| {
            nodes.get(h).is_some_and(|n| {
                n.kind == NodeKind::Element
                    && n.attributes.get(VIEW_ID_ATTR).map(String::as_str) == Some(view_id)
            })
        })
    }

    fn query_wrapper_element(&self, tag: &str, path: &str, view_id: &str) -> Option<NodeHandle> {
        let handles = self.walk();
        let nodes = self.nodes.borrow();
        handles.into_iter().find(|h| {
            nodes.get(h).is_some_and(|n| {
                n.kind == NodeKind::Element
                    && n.tag.eq_ignore_ascii_case(tag)
                    && n.attributes.get(VIEW_PATH_ATTR).map(String::as_str) == Some(path)
                    && n.attributes.get(VIEW_ID_ATTR).map(String::as_str) == Some(view_id)
            })
        })
    }

    fn markup_boundary(&self, path: &str, view_id: &str) -> Vec<NodeHandle> {
        self.boundaries
            .borrow()
            .get(&(path.to_string(), view_id.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn child_elements(&self, node: NodeHandle) -> Vec<NodeHandle> {
        let nodes = self.nodes.borrow();
        nodes
            .get(&node)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| nodes.get(c).is_some_and(|n| n.kind == NodeKind::Element))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_element(&self, node: NodeHandle) -> bool {
        self.nodes
            .borrow()
            .get(&node)
            .is_some_and(|n| n.kind == NodeKind::Element)
    }

    fn replace_content(&self, node: NodeHandle, fragment: &str) -> Vec<NodeHandle> {
        let old = self
            .nodes
            .borrow()
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for child in old {
            self.remove_from_parent(child);
            self.nodes.borrow_mut().remove(&child);
        }
        let handles = self.materialize(fragment, Some(node));
        if let Some(n) = self.nodes.borrow_mut().get_mut(&node) {
            n.children = handles.clone();
        }
        handles
    }

    fn replace_range(&self, old: &[NodeHandle], fragment: &str) -> Vec<NodeHandle> {
        for node in old {
            self.remove_from_parent(*node);
            self.nodes.borrow_mut().remove(node);
        }
        let handles = self.insert_fragment(fragment);
        // Keep boundary ownership pointing at the replacement nodes.
        for owned in self.boundaries.borrow_mut().values_mut() {
            if owned.iter().any(|n| old.contains(n)) {
                *owned = handles.clone();
            }
        }
        handles
    }

    fn detach(&self, node: NodeHandle) {
        self.remove_from_parent(node);
    }

    fn insert_script(&self, script: &ScriptResource) {
        self.scripts
            .borrow_mut()
            .insert(script.id.clone(), script.source.clone());
    }

    fn remove_script(&self, id: &str) {
        self.scripts.borrow_mut().remove(id);
    }

    fn remove_style(&self, id: &str) {
        self.styles.borrow_mut().remove(id);
    }

    fn remove_styles_by_path(&self, path: &str) {
        self.styles.borrow_mut().retain(|_, p| p != path);
    }
}
