//! Core types for vireo.
//!
//! These types define the foundation that everything builds on.
//! They flow through the lifecycle machine, the render pipeline,
//! and the host environment boundary.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

// =============================================================================
// Identity & Data
// =============================================================================

/// Per-instantiation view identity.
pub type ViewId = String;

/// Reactive subscription identity: the state key touched during a read.
pub type SubscriptionId = String;

/// Untyped key/value data carried by a view instance.
pub type DataMap = HashMap<String, Value>;

/// Opaque handle to a node owned by the host environment.
pub type NodeHandle = u64;

// =============================================================================
// Lifecycle Phase
// =============================================================================

/// Explicit lifecycle phase of a view instance.
///
/// Phases advance through a fixed transition table; the boolean guard
/// flags in [`ViewFlags`] handle idempotency, the phase handles ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unborn,
    Created,
    Initialized,
    Mounted,
    Updated,
    Unmounted,
    Destroyed,
}

impl Phase {
    /// Whether advancing from `self` to `next` is a legal transition.
    ///
    /// `Destroyed` is reachable from every phase and terminal.
    /// `Unmounted -> Mounted` is the remount edge used by `refresh`;
    /// `Unmounted -> Updated` is the in-place refresh edge (the instance
    /// unmounts, re-renders as `Updated`, then remounts).
    pub fn can_advance(self, next: Phase) -> bool {
        use Phase::*;
        if self == Destroyed {
            return false;
        }
        matches!(
            (self, next),
            (Unborn, Created)
                | (Created, Initialized)
                | (Initialized, Mounted)
                | (Mounted, Updated)
                | (Updated, Mounted)
                | (Mounted, Unmounted)
                | (Updated, Unmounted)
                | (Unmounted, Mounted)
                | (Unmounted, Updated)
                | (_, Destroyed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Unborn => "unborn",
            Phase::Created => "created",
            Phase::Initialized => "initialized",
            Phase::Mounted => "mounted",
            Phase::Updated => "updated",
            Phase::Unmounted => "unmounted",
            Phase::Destroyed => "destroyed",
        }
    }
}

// =============================================================================
// Guard Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Per-instance guard flags as a bitfield.
    ///
    /// All start cleared. Within one mount cycle each guard is monotonic;
    /// `MOUNTED | STARTED | MARKUP_SCANNED` reset together on unmount,
    /// `DESTROYED` never resets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ViewFlags: u16 {
        const SCANNED = 1 << 0;
        const MARKUP_SCANNED = 1 << 1;
        const MOUNTED = 1 << 2;
        const STARTED = 1 << 3;
        const READY = 1 << 4;
        const RENDERED = 1 << 5;
        /// Ready to react to external state changes.
        const REACTIVE = 1 << 6;
        const DESTROYED = 1 << 7;
        const COMMITTED_CONSTRUCTOR_DATA = 1 << 8;
        /// Set at construction, consumed by the first real/virtual render.
        const FIRST_RENDER_PENDING = 1 << 9;
        const VIRTUAL_RENDERING = 1 << 10;
        const SCANNING = 1 << 11;
    }
}

// =============================================================================
// Anchor
// =============================================================================

/// The DOM region a mounted instance is responsible for.
///
/// An instance with a super-view keeps `None` and delegates to the
/// super-view's anchor. `refs` always holds element-type nodes only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Anchor {
    /// No anchor of its own: unresolved, or delegated to a super-view.
    #[default]
    None,
    /// Single root element; refs are its direct children.
    Root {
        element: NodeHandle,
        refs: Vec<NodeHandle>,
    },
    /// Node range owned via markup boundaries; refs are the element nodes.
    Range {
        nodes: Vec<NodeHandle>,
        refs: Vec<NodeHandle>,
    },
}

impl Anchor {
    pub fn is_none(&self) -> bool {
        matches!(self, Anchor::None)
    }

    /// Element refs of whichever variant is held.
    pub fn refs(&self) -> &[NodeHandle] {
        match self {
            Anchor::None => &[],
            Anchor::Root { refs, .. } | Anchor::Range { refs, .. } => refs,
        }
    }
}

// =============================================================================
// Wrapper Configuration
// =============================================================================

/// Wrapper element configuration declared by a view definition.
///
/// When enabled, the first real render wraps its output in a start/end
/// tag carrying the instance's path and viewId markers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WrapperConfig {
    pub enable: bool,
    /// Explicit wrapper tag. `None` means the host tracks the wrapped
    /// region through markup boundaries instead of a dedicated element.
    pub tag: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

// =============================================================================
// Owned Resources
// =============================================================================

/// A script resource owned by a view instance, inserted on mount and
/// removed on unmount.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptResource {
    pub id: String,
    #[serde(default)]
    pub source: String,
}

/// A style resource owned by a view instance, removed on destroy.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleResource {
    pub id: String,
    #[serde(default)]
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transition_table() {
        assert!(Phase::Unborn.can_advance(Phase::Created));
        assert!(Phase::Created.can_advance(Phase::Initialized));
        assert!(Phase::Initialized.can_advance(Phase::Mounted));
        assert!(Phase::Mounted.can_advance(Phase::Updated));
        assert!(Phase::Updated.can_advance(Phase::Mounted));
        assert!(Phase::Unmounted.can_advance(Phase::Mounted));
        assert!(Phase::Unmounted.can_advance(Phase::Updated));

        // Illegal edges
        assert!(!Phase::Unborn.can_advance(Phase::Mounted));
        assert!(!Phase::Created.can_advance(Phase::Mounted));
        assert!(!Phase::Initialized.can_advance(Phase::Updated));
    }

    #[test]
    fn test_destroyed_is_terminal() {
        for phase in [
            Phase::Unborn,
            Phase::Created,
            Phase::Initialized,
            Phase::Mounted,
            Phase::Updated,
            Phase::Unmounted,
        ] {
            assert!(phase.can_advance(Phase::Destroyed));
        }
        assert!(!Phase::Destroyed.can_advance(Phase::Mounted));
        assert!(!Phase::Destroyed.can_advance(Phase::Destroyed));
    }

    #[test]
    fn test_flags_reset_group() {
        let mut flags = ViewFlags::MOUNTED | ViewFlags::STARTED | ViewFlags::MARKUP_SCANNED;
        flags.remove(ViewFlags::MOUNTED | ViewFlags::STARTED | ViewFlags::MARKUP_SCANNED);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_anchor_refs() {
        assert!(Anchor::None.refs().is_empty());
        let anchor = Anchor::Root {
            element: 1,
            refs: vec![2, 3],
        };
        assert_eq!(anchor.refs(), &[2, 3]);
    }
}
