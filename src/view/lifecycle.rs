//! Lifecycle state machine.
//!
//! Sequences the before/after hook pairs for create, init, mount, update,
//! unmount and destroy, and propagates each transition to children and to
//! the paired super-view. Hook failures follow the instance's
//! [`HookPolicy`]: by default they are logged and never block flag
//! promotion, so the instance tree stays consistent and traversable even
//! when view code misbehaves.
//!
//! Ordering guarantees (fixed, never reorder):
//! - within one instance: before-hook, action, after-hook;
//! - children learn about a mount only after the parent's own mount actions
//!   (scripts, reactive components, listeners, flags) are settled;
//! - unmount's broadcast phase runs even when the guarded teardown phase
//!   was skipped - callers treat it as a broadcast, not a state signal.

use crate::error::{HookError, HookPolicy, LifecycleError, LifecycleResult};
use crate::types::{Anchor, DataMap, Phase, ViewFlags};
use crate::{binding, host, manager, markup, reactive, registry};

use super::definition::ViewDefinition;
use super::instance::ViewInstance;

/// Keep the first error of a best-effort block.
fn note(first: &mut Option<LifecycleError>, result: LifecycleResult) {
    if let Err(err) = result {
        if first.is_none() {
            *first = Some(err);
        }
    }
}

impl ViewInstance {
    // =========================================================================
    // Hook Dispatch
    // =========================================================================

    pub(crate) fn run_hook(
        &mut self,
        hook: &'static str,
        f: impl FnOnce(&dyn ViewDefinition, &mut Self) -> crate::error::HookResult,
    ) -> LifecycleResult {
        let def = self.def.clone();
        match f(def.as_ref(), self) {
            Ok(()) => Ok(()),
            Err(failure) => {
                let err = HookError::new(hook, self.path.clone(), failure);
                self.hook_failed(err)
            }
        }
    }

    /// Apply the hook-failure policy to a contextualized error.
    pub(crate) fn hook_failed(&mut self, err: HookError) -> LifecycleResult {
        match self.policy {
            HookPolicy::SwallowAndLog => {
                tracing::warn!(view = %self.view_id, error = %err, "hook failure swallowed");
                Ok(())
            }
            HookPolicy::Propagate => Err(err.into()),
            HookPolicy::Abort => {
                tracing::error!(view = %self.view_id, error = %err, "hook failure aborts view");
                let path = self.path.clone();
                let _ = self.destroy();
                Err(LifecycleError::Aborted { path, source: err })
            }
        }
    }

    // =========================================================================
    // Create / Init
    // =========================================================================

    pub fn create(&mut self) -> LifecycleResult {
        if self.phase != Phase::Unborn {
            tracing::debug!(view = %self.view_id, "create skipped: already created");
            return Ok(());
        }
        self.run_hook("beforeCreate", |d, v| d.before_create(v))?;
        self.advance_phase(Phase::Created);
        self.run_hook("created", |d, v| d.created(v))
    }

    pub fn init(&mut self) -> LifecycleResult {
        if self.phase != Phase::Created {
            tracing::debug!(view = %self.view_id, "init skipped: not freshly created");
            return Ok(());
        }
        self.run_hook("beforeInit", |d, v| d.before_init(v))?;
        self.run_hook("init", |d, v| d.init(v))?;
        self.advance_phase(Phase::Initialized);
        self.run_hook("afterInit", |d, v| d.after_init(v))
    }

    // =========================================================================
    // Mount
    // =========================================================================

    /// Composite mount. Idempotent: a second call only reconfirms the
    /// ready-to-react state.
    pub fn mounted(&mut self) -> LifecycleResult {
        if self.flags.contains(ViewFlags::DESTROYED) {
            tracing::debug!(view = %self.view_id, "mount refused: destroyed");
            return Ok(());
        }
        if !self.flags.contains(ViewFlags::MARKUP_SCANNED) {
            self.scan_dom_elements();
        }
        if self.flags.contains(ViewFlags::MOUNTED) {
            self.flags.insert(ViewFlags::REACTIVE);
            return Ok(());
        }

        self.run_hook("beforeMount", |d, v| d.before_mount(v))?;
        if self.flags.contains(ViewFlags::DESTROYED) {
            // Abort policy tore the instance down.
            return Ok(());
        }

        // Best-effort block: failures are noted, the transition completes.
        let mut first_err = None;
        note(&mut first_err, self.run_hook("mounting", |d, v| d.mounting(v)));
        if self.flags.contains(ViewFlags::DESTROYED) {
            return first_err.map_or(Ok(()), Err);
        }
        self.insert_scripts();
        if let Some(super_id) = self.super_view.clone() {
            // Upward "super-view mounted" signal.
            registry::with_view(&super_id, |sv| {
                let _ = sv.mounted();
            });
        }
        reactive::mount_view_components(&self.view_id);
        self.start();
        self.flags
            .insert(ViewFlags::MOUNTED | ViewFlags::READY | ViewFlags::RENDERED);
        self.advance_phase(Phase::Mounted);
        // Downward "parent mounted" signal, only now that our own mount
        // actions are settled.
        for child_id in self.children.clone() {
            registry::with_view(&child_id, |child| {
                let _ = child.mounted();
            });
        }
        note(&mut first_err, self.run_hook("mounted", |d, v| d.mounted(v)));

        self.flags.insert(ViewFlags::REACTIVE);
        first_err.map_or(Ok(()), Err)
    }

    // =========================================================================
    // Unmount
    // =========================================================================

    /// Guarded teardown plus an unconditional broadcast phase.
    pub fn unmounted(&mut self) -> LifecycleResult {
        let mut first_err = None;
        if self.flags.contains(ViewFlags::MOUNTED) {
            self.flags.remove(ViewFlags::REACTIVE);
            self.pending_commit = false;
            note(
                &mut first_err,
                self.run_hook("beforeUnmount", |d, v| d.before_unmount(v)),
            );
            note(
                &mut first_err,
                self.run_hook("unmounting", |d, v| d.unmounting(v)),
            );
            self.remove_scripts();
            self.stop();
            self.flags.remove(
                ViewFlags::MOUNTED | ViewFlags::STARTED | ViewFlags::MARKUP_SCANNED,
            );
            self.advance_phase(Phase::Unmounted);
        }

        // Broadcast phase, regardless of whether teardown ran.
        if let Some(super_id) = self.super_view.clone() {
            registry::with_view(&super_id, |sv| {
                let _ = sv.unmounted();
            });
        }
        for child_id in self.children.clone() {
            registry::with_view(&child_id, |child| {
                let _ = child.unmounted();
            });
        }
        reactive::unmount_view_components(&self.view_id);
        note(
            &mut first_err,
            self.run_hook("unmounted", |d, v| d.unmounted(v)),
        );
        first_err.map_or(Ok(()), Err)
    }

    // =========================================================================
    // Destroy
    // =========================================================================

    /// Terminal teardown. Reentrancy-safe: the destroyed flag flips before
    /// anything else runs.
    pub fn destroy(&mut self) -> LifecycleResult {
        if self.flags.contains(ViewFlags::DESTROYED) {
            tracing::debug!(view = %self.view_id, "destroy skipped: already destroyed");
            return Ok(());
        }
        self.flags.insert(ViewFlags::DESTROYED);

        let mut first_err = None;
        note(
            &mut first_err,
            self.run_hook("beforeDestroy", |d, v| d.before_destroy(v)),
        );
        note(
            &mut first_err,
            self.run_hook("destroying", |d, v| d.destroying(v)),
        );
        self.pending_commit = false;
        note(&mut first_err, self.unmounted());

        // Style removal: per-id when the instance tracked its styles, by-path
        // sweep when the local list is empty (guards registry drift).
        if self.styles.is_empty() {
            host::with(|h| h.remove_styles_by_path(&self.path));
        } else {
            host::with(|h| {
                for style in &self.styles {
                    h.remove_style(&style.id);
                }
            });
        }

        // Super-view / original-view pair propagation.
        if let Some(super_id) = self.super_view.take() {
            registry::destroy_view(&super_id);
        }
        if let Some(original_id) = self.original_view.take() {
            registry::destroy_view(&original_id);
        }

        // Children: the registry's bulk clear runs each child's destroy
        // exactly once, in list order.
        let children = std::mem::take(&mut self.children);
        registry::clear_children(children);

        reactive::destroy_view_subscriptions(&self.view_id);
        // Queued bindings of a dead view must never reach the subsystem.
        let _ = binding::drain_view_bindings(&self.view_id);

        // Detach directly-owned nodes.
        match std::mem::take(&mut self.anchor) {
            Anchor::Root { element, .. } => {
                host::with(|h| h.detach(element));
            }
            Anchor::Range { nodes, .. } => {
                host::with(|h| {
                    for node in &nodes {
                        h.detach(*node);
                    }
                });
            }
            Anchor::None => {}
        }

        // Dependency captures are pruned only here.
        self.render_deps.clear();
        self.prerender_deps.clear();
        self.output = None;

        self.advance_phase(Phase::Destroyed);
        note(
            &mut first_err,
            self.run_hook("destroyed", |d, v| d.destroyed(v)),
        );
        registry::detach_from_parent(&self.view_id);
        registry::release(&self.view_id);
        first_err.map_or(Ok(()), Err)
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Enable event and attribute/class-binding listening. Idempotent.
    pub fn start(&mut self) {
        if self.flags.contains(ViewFlags::STARTED) {
            return;
        }
        self.flags.insert(ViewFlags::STARTED);
        binding::start_event_listener();
        binding::start_binding_event_listener();
        binding::start_class_binding_event_listener();
    }

    /// Disable listening. Idempotent.
    pub fn stop(&mut self) {
        if !self.flags.contains(ViewFlags::STARTED) {
            return;
        }
        self.flags.remove(ViewFlags::STARTED);
        binding::stop_event_listener();
        binding::stop_binding_event_listener();
        binding::stop_class_binding_event_listener();
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Re-render in place for an already-mounted instance. Render failures
    /// are noted per policy but never block the remount.
    pub fn refresh(&mut self, variable_data: Option<DataMap>) -> LifecycleResult {
        if self.flags.contains(ViewFlags::DESTROYED) {
            tracing::debug!(view = %self.view_id, "refresh refused: destroyed");
            return Ok(());
        }
        let mut first_err = None;

        if let Some(super_id) = self.super_view.clone() {
            registry::with_view(&super_id, |sv| {
                let _ = sv.unmounted();
            });
            note(
                &mut first_err,
                self.run_hook("beforeUpdate", |d, v| d.before_update(v)),
            );
            self.apply_refresh_data(variable_data.as_ref());
            self.advance_phase(Phase::Updated);
            let sections = match self.render() {
                Ok(Some(out)) => markup::scan_root_elements(&out)
                    .into_iter()
                    .map(|e| e.name)
                    .collect(),
                Ok(None) => Vec::new(),
                Err(err) => {
                    note(&mut first_err, self.hook_failed(err));
                    Vec::new()
                }
            };
            manager::notify_sections_changed(&self.path, &self.view_id, sections);
            note(
                &mut first_err,
                self.run_hook("updated", |d, v| d.updated(v)),
            );
            // Remount runs unconditionally.
            registry::with_view(&super_id, |sv| {
                let _ = sv.mounted();
            });
        } else if self.wrapper.enable || !self.anchor.is_none() {
            note(&mut first_err, self.unmounted());
            note(
                &mut first_err,
                self.run_hook("beforeUpdate", |d, v| d.before_update(v)),
            );
            self.apply_refresh_data(variable_data.as_ref());
            self.advance_phase(Phase::Updated);
            match self.render() {
                Ok(Some(out)) => self.patch_anchor(&out),
                Ok(None) => {}
                Err(err) => note(&mut first_err, self.hook_failed(err)),
            }
            note(
                &mut first_err,
                self.run_hook("updated", |d, v| d.updated(v)),
            );
            // Remount runs unconditionally.
            note(&mut first_err, self.mounted());
        } else {
            tracing::error!(
                view = %self.view_id,
                path = %self.path,
                "refresh aborted: no resolvable anchor"
            );
            return Ok(());
        }
        first_err.map_or(Ok(()), Err)
    }

    fn apply_refresh_data(&mut self, variable_data: Option<&DataMap>) {
        if let Some(data) = variable_data {
            self.update_data(data.clone());
            self.update_variable_data(data);
        }
    }

    /// Replace the anchor's content with fresh output, recording the new
    /// top-level nodes as refs.
    fn patch_anchor(&mut self, output: &str) {
        let anchor = std::mem::take(&mut self.anchor);
        let patched = host::with(|h| match &anchor {
            Anchor::Root { element, .. } => {
                let children = h.replace_content(*element, output);
                let refs = children
                    .into_iter()
                    .filter(|n| h.is_element(*n))
                    .collect();
                Anchor::Root {
                    element: *element,
                    refs,
                }
            }
            Anchor::Range { nodes, .. } => {
                let new_nodes = h.replace_range(nodes, output);
                let refs = new_nodes
                    .iter()
                    .copied()
                    .filter(|n| h.is_element(*n))
                    .collect();
                Anchor::Range {
                    nodes: new_nodes,
                    refs,
                }
            }
            Anchor::None => Anchor::None,
        });
        self.anchor = patched.unwrap_or(anchor);
    }

    // =========================================================================
    // Owned Scripts
    // =========================================================================

    fn insert_scripts(&self) {
        if self.scripts.is_empty() {
            return;
        }
        host::with(|h| {
            for script in &self.scripts {
                h.insert_script(script);
            }
        });
    }

    fn remove_scripts(&self) {
        if self.scripts.is_empty() {
            return;
        }
        host::with(|h| {
            for script in &self.scripts {
                h.remove_script(&script.id);
            }
        });
    }
}
