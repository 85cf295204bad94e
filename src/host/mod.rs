//! Host environment boundary.
//!
//! Everything physical - element queries, node ranges, content patching,
//! script/style insertion - goes through the [`HostEnvironment`] trait. The
//! runtime installs one host per thread and reaches it through [`with`];
//! operations that need a host while none is installed log and no-op, they
//! never fail.
//!
//! [`memory::MemoryHost`] is the reference implementation used by tests.

pub mod memory;

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::{NodeHandle, ScriptResource};

/// Capabilities the runtime needs from its host.
pub trait HostEnvironment {
    /// Find the single element stamped with this viewId marker.
    fn query_view_root(&self, view_id: &str) -> Option<NodeHandle>;

    /// Find the wrapper element matching `tag` and carrying both the path
    /// and viewId markers.
    fn query_wrapper_element(&self, tag: &str, path: &str, view_id: &str) -> Option<NodeHandle>;

    /// Markup-boundary lookup: the node range owned by (path, viewId).
    fn markup_boundary(&self, path: &str, view_id: &str) -> Vec<NodeHandle>;

    /// Direct element-type children of a node.
    fn child_elements(&self, node: NodeHandle) -> Vec<NodeHandle>;

    /// Whether the node is an element (as opposed to text or comment).
    fn is_element(&self, node: NodeHandle) -> bool;

    /// Replace the content of `node` with `markup`; returns the new
    /// top-level child nodes.
    fn replace_content(&self, node: NodeHandle, markup: &str) -> Vec<NodeHandle>;

    /// Replace a node range with `markup`; returns the new top-level nodes.
    fn replace_range(&self, nodes: &[NodeHandle], markup: &str) -> Vec<NodeHandle>;

    /// Detach a node from its parent.
    fn detach(&self, node: NodeHandle);

    fn insert_script(&self, script: &ScriptResource);
    fn remove_script(&self, id: &str);

    fn remove_style(&self, id: &str);
    /// Sweep every style inserted for a definition path. Used as the
    /// destroy-time fallback when the instance's own style list is empty.
    fn remove_styles_by_path(&self, path: &str);
}

thread_local! {
    static HOST: RefCell<Option<Rc<dyn HostEnvironment>>> = RefCell::new(None);
}

/// Install the host environment for this thread, replacing any previous one.
pub fn install(host: Rc<dyn HostEnvironment>) {
    HOST.with(|slot| *slot.borrow_mut() = Some(host));
}

/// Run `f` against the installed host. Returns `None` (after a debug log)
/// when no host is installed.
pub fn with<R>(f: impl FnOnce(&dyn HostEnvironment) -> R) -> Option<R> {
    let host = HOST.with(|slot| slot.borrow().clone());
    match host {
        Some(host) => Some(f(host.as_ref())),
        None => {
            tracing::debug!("no host environment installed");
            None
        }
    }
}

/// Remove the installed host (for testing).
pub fn reset_host() {
    HOST.with(|slot| *slot.borrow_mut() = None);
}
