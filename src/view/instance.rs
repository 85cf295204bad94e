//! View instance - the addressable unit everything else operates on.
//!
//! Holds identity, phase, guard flags, merged data, the anchor, hierarchy
//! references, and the per-pass dependency captures. All mutation happens
//! through the binder ([`super::config`]), the render pipeline
//! ([`super::render`]), the resolver ([`super::scan`]) and the lifecycle
//! machine ([`super::lifecycle`]).

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::HookPolicy;
use crate::types::{
    Anchor, DataMap, Phase, ScriptResource, StyleResource, SubscriptionId, ViewFlags, ViewId,
    WrapperConfig,
};

use super::definition::{Method, ViewDefinition};

pub struct ViewInstance {
    pub(crate) view_id: ViewId,
    pub(crate) path: String,
    pub(crate) def: Rc<dyn ViewDefinition>,
    pub(crate) phase: Phase,
    pub(crate) flags: ViewFlags,
    pub(crate) data: DataMap,
    pub(crate) methods: HashMap<String, Method>,
    pub(crate) output: Option<String>,
    pub(crate) anchor: Anchor,
    pub(crate) children: Vec<ViewId>,
    pub(crate) super_view: Option<ViewId>,
    pub(crate) original_view: Option<ViewId>,
    pub(crate) render_deps: Vec<SubscriptionId>,
    pub(crate) prerender_deps: Vec<SubscriptionId>,
    pub(crate) wrapper: WrapperConfig,
    pub(crate) scripts: Vec<ScriptResource>,
    pub(crate) styles: Vec<StyleResource>,
    pub(crate) pending_commit: bool,
    pub(crate) policy: HookPolicy,
}

impl ViewInstance {
    /// Construct an instance from a definition. The configuration binder
    /// runs here, before any lifecycle hook can observe the instance.
    pub fn new(def: Rc<dyn ViewDefinition>, view_id: impl Into<ViewId>) -> Self {
        let mut view = Self {
            view_id: view_id.into(),
            path: def.path().to_string(),
            wrapper: def.wrapper(),
            scripts: def.scripts(),
            styles: def.styles(),
            def,
            phase: Phase::Unborn,
            flags: ViewFlags::FIRST_RENDER_PENDING,
            data: DataMap::new(),
            methods: HashMap::new(),
            output: None,
            anchor: Anchor::None,
            children: Vec::new(),
            super_view: None,
            original_view: None,
            render_deps: Vec::new(),
            prerender_deps: Vec::new(),
            pending_commit: false,
            policy: HookPolicy::default(),
        };
        view.bind();
        view
    }

    pub fn with_policy(mut self, policy: HookPolicy) -> Self {
        self.policy = policy;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    pub fn data(&self) -> &DataMap {
        &self.data
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    pub fn super_view(&self) -> Option<&str> {
        self.super_view.as_deref()
    }

    pub fn original_view(&self) -> Option<&str> {
        self.original_view.as_deref()
    }

    pub fn has_super_view(&self) -> bool {
        self.super_view.is_some()
    }

    /// Reactive keys the last render pass(es) touched, first-touch order.
    pub fn render_dependencies(&self) -> &[SubscriptionId] {
        &self.render_deps
    }

    /// Reactive keys the last prerender pass(es) touched.
    pub fn prerender_dependencies(&self) -> &[SubscriptionId] {
        &self.prerender_deps
    }

    pub fn is_mounted(&self) -> bool {
        self.flags.contains(ViewFlags::MOUNTED)
    }

    pub fn is_destroyed(&self) -> bool {
        self.flags.contains(ViewFlags::DESTROYED)
    }

    /// Whether the instance currently reacts to external state changes.
    pub fn is_reactive(&self) -> bool {
        self.flags.contains(ViewFlags::REACTIVE)
    }

    /// Mark that a state change arrived while the instance could not apply
    /// it yet. Cleared on unmount and destroy.
    pub fn mark_pending_commit(&mut self) {
        self.pending_commit = true;
    }

    pub fn has_pending_commit(&self) -> bool {
        self.pending_commit
    }

    // =========================================================================
    // Phase
    // =========================================================================

    /// Advance the lifecycle phase if the transition table allows it.
    /// Illegal advances are logged at debug and ignored.
    pub(crate) fn advance_phase(&mut self, next: Phase) {
        if self.phase.can_advance(next) {
            self.phase = next;
        } else {
            tracing::debug!(
                view = %self.view_id,
                from = self.phase.as_str(),
                to = next.as_str(),
                "illegal phase transition ignored"
            );
        }
    }
}

impl std::fmt::Debug for ViewInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewInstance")
            .field("view_id", &self.view_id)
            .field("path", &self.path)
            .field("phase", &self.phase)
            .field("flags", &self.flags)
            .field("children", &self.children)
            .field("super_view", &self.super_view)
            .field("original_view", &self.original_view)
            .finish_non_exhaustive()
    }
}
