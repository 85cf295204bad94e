//! Binding/Event Manager - global listener toggles and pending bindings.
//!
//! Three listener groups (event, attribute-binding, class-binding) are
//! reference-counted across started views: the first `start_*` activates the
//! group, the last matching `stop_*` deactivates it. Scan queues
//! attribute-binding configs on a pending list the same way output-component
//! configs are queued on the Reactive Manager.

use std::cell::RefCell;

use serde::Deserialize;
use serde_json::Value;

use crate::types::ViewId;

/// Declarative config for one attribute binding, produced by scanning.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeBinding {
    pub id: String,
    #[serde(default)]
    pub config: Value,
    /// Owning view, filled in by `scan` before queueing.
    #[serde(default)]
    pub view_id: ViewId,
}

#[derive(Debug, Default)]
struct ListenerState {
    event: usize,
    binding: usize,
    class_binding: usize,
}

thread_local! {
    static LISTENERS: RefCell<ListenerState> = RefCell::new(ListenerState::default());

    static PENDING_BINDINGS: RefCell<Vec<AttributeBinding>> = RefCell::new(Vec::new());
}

// =============================================================================
// Listener Toggles
// =============================================================================

pub fn start_event_listener() {
    LISTENERS.with(|l| l.borrow_mut().event += 1);
}

pub fn stop_event_listener() {
    LISTENERS.with(|l| {
        let mut l = l.borrow_mut();
        l.event = l.event.saturating_sub(1);
    });
}

pub fn start_binding_event_listener() {
    LISTENERS.with(|l| l.borrow_mut().binding += 1);
}

pub fn stop_binding_event_listener() {
    LISTENERS.with(|l| {
        let mut l = l.borrow_mut();
        l.binding = l.binding.saturating_sub(1);
    });
}

pub fn start_class_binding_event_listener() {
    LISTENERS.with(|l| l.borrow_mut().class_binding += 1);
}

pub fn stop_class_binding_event_listener() {
    LISTENERS.with(|l| {
        let mut l = l.borrow_mut();
        l.class_binding = l.class_binding.saturating_sub(1);
    });
}

/// Whether any view currently has event listening active.
pub fn is_event_listening() -> bool {
    LISTENERS.with(|l| l.borrow().event > 0)
}

/// Whether any view currently has attribute-binding listening active.
pub fn is_binding_listening() -> bool {
    LISTENERS.with(|l| l.borrow().binding > 0)
}

/// Whether any view currently has class-binding listening active.
pub fn is_class_binding_listening() -> bool {
    LISTENERS.with(|l| l.borrow().class_binding > 0)
}

// =============================================================================
// Pending Attribute Bindings
// =============================================================================

/// Queue a scanned attribute-binding config.
pub fn queue_attribute_binding(binding: AttributeBinding) {
    tracing::trace!(id = %binding.id, view = %binding.view_id, "attribute binding queued");
    PENDING_BINDINGS.with(|pending| pending.borrow_mut().push(binding));
}

/// Number of attribute bindings waiting for the binding subsystem.
pub fn pending_binding_count() -> usize {
    PENDING_BINDINGS.with(|pending| pending.borrow().len())
}

/// Drain pending bindings for a view (consumed by the binding subsystem).
pub fn drain_view_bindings(view_id: &str) -> Vec<AttributeBinding> {
    PENDING_BINDINGS.with(|pending| {
        let mut pending = pending.borrow_mut();
        let (mine, rest): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|b| b.view_id == view_id);
        *pending = rest;
        mine
    })
}

/// Reset all binding state (for testing).
pub fn reset_binding() {
    LISTENERS.with(|l| *l.borrow_mut() = ListenerState::default());
    PENDING_BINDINGS.with(|pending| pending.borrow_mut().clear());
}
