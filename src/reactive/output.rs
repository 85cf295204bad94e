//! Reactive output components.
//!
//! An output component re-renders a narrow fragment when specific state keys
//! change. The runtime only orchestrates them: scan queues their configs on a
//! pending list, view mount drains the pending configs for that view into
//! live components, unmount/destroy tear them down with the owning instance.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Deserialize;

use crate::types::{SubscriptionId, ViewId};

/// Declarative config for one output component, produced by scanning.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputComponentConfig {
    pub id: String,
    /// State keys whose changes re-render this fragment.
    #[serde(default)]
    pub keys: Vec<SubscriptionId>,
    /// Owning view, filled in by `scan` before queueing.
    #[serde(default)]
    pub view_id: ViewId,
}

/// A live output component owned by a mounted view.
#[derive(Debug)]
struct OutputComponent {
    config: OutputComponentConfig,
    mounted: bool,
}

thread_local! {
    /// Configs queued by scan, not yet materialized.
    static PENDING: RefCell<Vec<OutputComponentConfig>> = RefCell::new(Vec::new());

    /// Live components per owning view.
    static COMPONENTS: RefCell<HashMap<ViewId, Vec<OutputComponent>>> =
        RefCell::new(HashMap::new());
}

/// Queue a scanned output-component config for later materialization.
pub fn queue_output_component(config: OutputComponentConfig) {
    tracing::trace!(id = %config.id, view = %config.view_id, "output component queued");
    PENDING.with(|pending| pending.borrow_mut().push(config));
}

/// Number of configs waiting to be materialized.
pub fn pending_output_count() -> usize {
    PENDING.with(|pending| pending.borrow().len())
}

/// Mount every output component owned by `view_id`.
///
/// Pending configs for the view are materialized first, then all of the
/// view's components are flagged mounted. Already-mounted components stay
/// mounted (idempotent).
pub fn mount_view_components(view_id: &str) {
    let drained: Vec<OutputComponentConfig> = PENDING.with(|pending| {
        let mut pending = pending.borrow_mut();
        let (mine, rest): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|c| c.view_id == view_id);
        *pending = rest;
        mine
    });
    COMPONENTS.with(|components| {
        let mut components = components.borrow_mut();
        let owned = components.entry(view_id.to_string()).or_default();
        for config in drained {
            owned.push(OutputComponent {
                config,
                mounted: false,
            });
        }
        for component in owned.iter_mut() {
            component.mounted = true;
        }
    });
}

/// Unmount every output component owned by `view_id`. Components survive
/// for remount; only `destroy_view_subscriptions` removes them.
pub fn unmount_view_components(view_id: &str) {
    COMPONENTS.with(|components| {
        if let Some(owned) = components.borrow_mut().get_mut(view_id) {
            for component in owned.iter_mut() {
                component.mounted = false;
            }
        }
    });
}

/// Destroy all of a view's output components and any still-pending configs.
pub fn destroy_view_subscriptions(view_id: &str) {
    PENDING.with(|pending| {
        pending.borrow_mut().retain(|c| c.view_id != view_id);
    });
    let removed = COMPONENTS.with(|components| components.borrow_mut().remove(view_id));
    if let Some(removed) = removed {
        tracing::debug!(
            view = %view_id,
            count = removed.len(),
            "output components destroyed"
        );
    }
}

/// Count of currently mounted components for a view (for testing/inspection).
pub fn mounted_component_count(view_id: &str) -> usize {
    COMPONENTS.with(|components| {
        components
            .borrow()
            .get(view_id)
            .map(|owned| owned.iter().filter(|c| c.mounted).count())
            .unwrap_or(0)
    })
}

/// Watched keys of every live component for a view (for testing/inspection).
pub fn watched_keys(view_id: &str) -> Vec<SubscriptionId> {
    COMPONENTS.with(|components| {
        components
            .borrow()
            .get(view_id)
            .map(|owned| {
                owned
                    .iter()
                    .flat_map(|c| c.config.keys.iter().cloned())
                    .collect()
            })
            .unwrap_or_default()
    })
}

/// Reset all output-component state (for testing).
pub fn reset_outputs() {
    PENDING.with(|pending| pending.borrow_mut().clear());
    COMPONENTS.with(|components| components.borrow_mut().clear());
}
