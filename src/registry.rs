//! View registry - arena ownership of instances.
//!
//! The registry owns every instance (`Rc<RefCell<ViewInstance>>` in a
//! thread-local map); parents, super-views and original-views hold ids, not
//! references, so the tree has no ownership cycles and destruction order is
//! the registry's to guarantee.
//!
//! Cross-instance notifications go through [`with_view`], which uses
//! `try_borrow_mut`: an instance that is already mutably borrowed is
//! mid-transition, and its guard flags make the skipped call a no-op by
//! construction.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::LifecycleError;
use crate::types::ViewId;
use crate::view::{ViewDefinition, ViewInstance};

thread_local! {
    /// Map viewId to the owned instance.
    static VIEWS: RefCell<HashMap<ViewId, Rc<RefCell<ViewInstance>>>> =
        RefCell::new(HashMap::new());

    /// Non-owning child -> parent back-references.
    static PARENT_OF: RefCell<HashMap<ViewId, ViewId>> = RefCell::new(HashMap::new());

    /// Counter for generated view ids.
    static ID_COUNTER: RefCell<usize> = const { RefCell::new(0) };
}

// =============================================================================
// Instantiation
// =============================================================================

/// Generate a fresh view id.
pub fn next_view_id() -> ViewId {
    ID_COUNTER.with(|counter| {
        let mut counter = counter.borrow_mut();
        let id = format!("v{}", *counter);
        *counter += 1;
        id
    })
}

/// Construct an instance from a definition, drive it through create/init,
/// and take ownership. Returns the id even when a hook fails under a
/// non-default policy; the error is the caller's to inspect.
pub fn instantiate(
    def: Rc<dyn ViewDefinition>,
    id: Option<&str>,
) -> (ViewId, Result<(), LifecycleError>) {
    let view_id = match id {
        Some(id) => id.to_string(),
        None => next_view_id(),
    };
    let mut view = ViewInstance::new(def, view_id.clone());
    let result = view.create().and_then(|_| view.init());
    insert(view);
    (view_id, result)
}

/// Take ownership of an already-constructed instance.
pub fn insert(view: ViewInstance) -> ViewId {
    let view_id = view.view_id().to_string();
    VIEWS.with(|views| {
        views
            .borrow_mut()
            .insert(view_id.clone(), Rc::new(RefCell::new(view)));
    });
    view_id
}

/// Look up an owned instance.
pub fn get(view_id: &str) -> Option<Rc<RefCell<ViewInstance>>> {
    VIEWS.with(|views| views.borrow().get(view_id).cloned())
}

/// Run `f` against an owned instance. Skips (and logs at debug) when the
/// instance is absent or currently mid-transition.
pub fn with_view<R>(view_id: &str, f: impl FnOnce(&mut ViewInstance) -> R) -> Option<R> {
    let view = get(view_id)?;
    match view.try_borrow_mut() {
        Ok(mut view) => Some(f(&mut view)),
        Err(_) => {
            tracing::debug!(view = %view_id, "notification skipped: view is mid-transition");
            None
        }
    }
}

pub fn view_count() -> usize {
    VIEWS.with(|views| views.borrow().len())
}

// =============================================================================
// Hierarchy Edges
// =============================================================================

/// Record a parent -> child edge. The parent keeps the ordered child list;
/// the registry keeps the back-reference for detach-on-destroy.
pub fn record_child(parent: &mut ViewInstance, child: ViewId) {
    if !parent.children.contains(&child) {
        parent.children.push(child.clone());
    }
    PARENT_OF.with(|map| {
        map.borrow_mut().insert(child, parent.view_id.clone());
    });
}

/// Pair an original view with the super-view wrapping it. The super-view
/// holds the shared anchor; the original delegates upward.
pub fn pair_super_view(original_id: &str, super_id: &str) {
    with_view(original_id, |original| {
        original.super_view = Some(super_id.to_string());
    });
    with_view(super_id, |super_view| {
        super_view.original_view = Some(original_id.to_string());
    });
}

/// Drop the child -> parent edge for a destroyed child.
pub(crate) fn detach_from_parent(child_id: &str) {
    let parent = PARENT_OF.with(|map| map.borrow_mut().remove(child_id));
    if let Some(parent_id) = parent {
        with_view(&parent_id, |parent| {
            parent.children.retain(|c| c != child_id);
        });
    }
}

// =============================================================================
// Destruction
// =============================================================================

/// Drop the arena entry for an id without borrowing the instance.
/// `ViewInstance::destroy` calls this on itself, so views destroyed
/// directly (including the Abort hook policy) never linger as dead
/// entries. Harmless for ids the arena does not hold.
pub(crate) fn release(view_id: &str) {
    VIEWS.with(|views| {
        views.borrow_mut().remove(view_id);
    });
    PARENT_OF.with(|map| {
        map.borrow_mut().remove(view_id);
    });
}

/// Destroy one owned instance and release it from the arena. Safe to call
/// on an id that was already destroyed or never registered.
pub fn destroy_view(view_id: &str) {
    let Some(view) = get(view_id) else {
        tracing::debug!(view = %view_id, "destroy skipped: not in registry");
        return;
    };
    match view.try_borrow_mut() {
        Ok(mut view) => {
            let _ = view.destroy();
        }
        // Mid-transition: the in-flight destroy owns the teardown.
        Err(_) => return,
    }
    VIEWS.with(|views| {
        views.borrow_mut().remove(view_id);
    });
    PARENT_OF.with(|map| {
        map.borrow_mut().remove(view_id);
    });
}

/// Bulk-clear a child list: every child's own `destroy` runs exactly once,
/// in list order. Children missing from the arena fall back to a logged
/// skip (there is nothing left to tear down manually).
pub fn clear_children(children: Vec<ViewId>) {
    for child_id in children {
        destroy_view(&child_id);
    }
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_views() {
    VIEWS.with(|views| views.borrow_mut().clear());
    PARENT_OF.with(|map| map.borrow_mut().clear());
    ID_COUNTER.with(|counter| *counter.borrow_mut() = 0);
}
