//! Render pipeline - output production and dependency capture.
//!
//! Four operations along two axes: {real, virtual} x {render, prerender}.
//! Every variant runs the same capture: snapshot the dependency-tracker
//! length, commit constructor data, invoke the definition's render function,
//! then append the newly-touched slice to the pass-specific capture list.
//! Real variants additionally annotate root-level output elements with
//! back-reference markers; the wrapper is injected exactly once per
//! instance, by whichever of render/virtual_render runs first.

use crate::error::{HookError, HookResult};
use crate::markup;
use crate::reactive::tracker;
use crate::types::{DataMap, SubscriptionId, ViewFlags};

use super::definition::ViewDefinition;
use super::instance::ViewInstance;

#[derive(Debug, Clone, Copy)]
enum Pass {
    Render,
    Prerender,
}

impl ViewInstance {
    /// Shared capture algorithm for all four variants.
    fn capture_pass(
        &mut self,
        pass: Pass,
        hook: &'static str,
        invoke: impl FnOnce(&dyn ViewDefinition, &mut Self) -> HookResult<Option<String>>,
    ) -> Result<Option<String>, HookError> {
        let start = tracker::len();
        self.commit_constructor_data();
        let def = self.def.clone();
        let result = invoke(def.as_ref(), self);
        let end = tracker::len();
        // A shrunken sequence means a reentrant capture reset it mid-pass;
        // append nothing for this pass.
        if end >= start {
            let slice = tracker::slice_from(start);
            let list = match pass {
                Pass::Render => &mut self.render_deps,
                Pass::Prerender => &mut self.prerender_deps,
            };
            append_new(list, slice);
        }
        result.map_err(|failure| HookError::new(hook, self.path.clone(), failure))
    }

    /// Consume the one-shot first-render gate; returns its prior value.
    fn take_first_render(&mut self) -> bool {
        let pending = self.flags.contains(ViewFlags::FIRST_RENDER_PENDING);
        self.flags.remove(ViewFlags::FIRST_RENDER_PENDING);
        pending
    }

    fn inject_wrapper(&self, content: &str) -> String {
        match &self.wrapper.tag {
            Some(tag) => markup::wrap(
                content,
                tag,
                &self.wrapper.attributes,
                &self.path,
                &self.view_id,
            ),
            // No dedicated element: the wrapped region is tracked through
            // markup boundaries instead.
            None => markup::boundary_wrap(content, &self.path, &self.view_id),
        }
    }

    /// Real render: capture, annotate, one-time wrapper injection.
    pub fn render(&mut self) -> Result<Option<String>, HookError> {
        let mut output = self.capture_pass(Pass::Render, "render", |def, view| def.render(view))?;
        let first = self.take_first_render();
        if let Some(out) = output.as_mut() {
            if markup::is_markup(out) {
                *out = markup::annotate_roots(out, &self.path, &self.view_id);
            }
            if first && self.wrapper.enable {
                *out = self.inject_wrapper(out);
            }
        }
        self.output = output.clone();
        Ok(output)
    }

    /// Scan-only render: same capture and wrapper gate, no annotation, no
    /// stored output.
    pub fn virtual_render(&mut self) -> Result<Option<String>, HookError> {
        self.flags.insert(ViewFlags::VIRTUAL_RENDERING | ViewFlags::SCANNING);
        let result = self.capture_pass(Pass::Render, "render", |def, view| def.render(view));
        self.flags
            .remove(ViewFlags::VIRTUAL_RENDERING | ViewFlags::SCANNING);
        let mut output = result?;
        let first = self.take_first_render();
        if let Some(out) = output.as_mut() {
            if first && self.wrapper.enable {
                *out = self.inject_wrapper(out);
            }
        }
        Ok(output)
    }

    /// Real prerender: capture against the prerender list, annotate.
    pub fn prerender(&mut self, extra: &DataMap) -> Result<Option<String>, HookError> {
        let mut output = self.capture_pass(Pass::Prerender, "prerender", |def, view| {
            def.prerender(view, extra)
        })?;
        if let Some(out) = output.as_mut() {
            if markup::is_markup(out) {
                *out = markup::annotate_roots(out, &self.path, &self.view_id);
            }
        }
        self.output = output.clone();
        Ok(output)
    }

    /// Scan-only prerender.
    pub fn virtual_prerender(&mut self, extra: &DataMap) -> Result<Option<String>, HookError> {
        self.flags.insert(ViewFlags::VIRTUAL_RENDERING | ViewFlags::SCANNING);
        let result = self.capture_pass(Pass::Prerender, "prerender", |def, view| {
            def.prerender(view, extra)
        });
        self.flags
            .remove(ViewFlags::VIRTUAL_RENDERING | ViewFlags::SCANNING);
        result
    }
}

/// Append ids not yet captured, preserving first-touch order. Capture lists
/// only ever grow; pruning happens on destroy alone.
fn append_new(list: &mut Vec<SubscriptionId>, slice: Vec<SubscriptionId>) {
    for id in slice {
        if !list.contains(&id) {
            list.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serde_json::json;

    use crate::error::HookResult;
    use crate::reactive;
    use crate::types::WrapperConfig;
    use crate::view::definition::ViewDefinition;

    use super::*;

    struct CounterDef {
        wrapper: WrapperConfig,
    }

    impl ViewDefinition for CounterDef {
        fn path(&self) -> &str {
            "pages.counter"
        }

        fn wrapper(&self) -> WrapperConfig {
            self.wrapper.clone()
        }

        fn render(&self, _view: &mut ViewInstance) -> HookResult<Option<String>> {
            let count = reactive::state::get("count").unwrap_or(json!(0));
            let label = reactive::state::get("label").unwrap_or(json!(""));
            Ok(Some(format!(
                "<div>{}{}</div>",
                label.as_str().unwrap_or(""),
                count
            )))
        }

        fn prerender(
            &self,
            _view: &mut ViewInstance,
            _extra: &DataMap,
        ) -> HookResult<Option<String>> {
            let _ = reactive::state::get("theme");
            Ok(Some("<span>pre</span>".to_string()))
        }
    }

    fn counter_view(wrapper: WrapperConfig) -> ViewInstance {
        ViewInstance::new(Rc::new(CounterDef { wrapper }), "v1")
    }

    #[test]
    fn test_render_captures_dependencies_in_first_touch_order() {
        reactive::reset_reactive();
        let mut view = counter_view(WrapperConfig::default());

        view.render().unwrap();
        assert_eq!(view.render_dependencies(), &["count", "label"]);
        assert!(view.prerender_dependencies().is_empty());

        // A second pass touching the same keys adds nothing.
        view.render().unwrap();
        assert_eq!(view.render_dependencies(), &["count", "label"]);
    }

    #[test]
    fn test_prerender_captures_separately() {
        reactive::reset_reactive();
        let mut view = counter_view(WrapperConfig::default());

        view.prerender(&DataMap::new()).unwrap();
        assert_eq!(view.prerender_dependencies(), &["theme"]);
        assert!(view.render_dependencies().is_empty());
    }

    #[test]
    fn test_render_annotates_roots() {
        reactive::reset_reactive();
        let mut view = counter_view(WrapperConfig::default());

        let out = view.render().unwrap().unwrap();
        assert!(out.starts_with("<div data-vireo-path=\"pages.counter\" data-vireo-view=\"v1\">"));
        assert_eq!(view.output(), Some(out.as_str()));
    }

    #[test]
    fn test_wrapper_injected_only_on_first_render() {
        reactive::reset_reactive();
        let mut view = counter_view(WrapperConfig {
            enable: true,
            tag: Some("my-wrap".to_string()),
            attributes: Default::default(),
        });

        let first = view.render().unwrap().unwrap();
        assert!(first.starts_with("<my-wrap "));
        assert!(first.ends_with("</my-wrap>"));

        let second = view.render().unwrap().unwrap();
        assert!(!second.contains("my-wrap"));
    }

    #[test]
    fn test_virtual_render_consumes_the_shared_gate() {
        reactive::reset_reactive();
        let mut view = counter_view(WrapperConfig {
            enable: true,
            tag: Some("my-wrap".to_string()),
            attributes: Default::default(),
        });

        let virt = view.virtual_render().unwrap().unwrap();
        assert!(virt.starts_with("<my-wrap "));
        // Inner content is not annotated on the virtual pass.
        assert!(virt.contains("<div>0</div>"));

        // The gate is spent: the real render no longer wraps.
        let real = view.render().unwrap().unwrap();
        assert!(!real.contains("my-wrap"));
    }

    #[test]
    fn test_boundary_wrapper_without_tag() {
        reactive::reset_reactive();
        let mut view = counter_view(WrapperConfig {
            enable: true,
            tag: None,
            attributes: Default::default(),
        });

        let out = view.render().unwrap().unwrap();
        assert!(out.starts_with("<!--vireo:pages.counter:v1-->"));
        assert!(out.ends_with("<!--/vireo:pages.counter:v1-->"));
    }

    #[test]
    fn test_shrunken_sequence_appends_nothing() {
        reactive::reset_reactive();

        struct ResettingDef;
        impl ViewDefinition for ResettingDef {
            fn path(&self) -> &str {
                "pages.reset"
            }
            fn render(&self, _view: &mut ViewInstance) -> HookResult<Option<String>> {
                // Reentrant capture reset mid-pass.
                reactive::tracker::reset_tracker();
                Ok(Some("<p>x</p>".to_string()))
            }
        }

        reactive::tracker::track("preexisting");
        let mut view = ViewInstance::new(Rc::new(ResettingDef), "v1");
        view.render().unwrap();
        assert!(view.render_dependencies().is_empty());
    }
}
