//! View definition interface.
//!
//! A definition is the declarative side of a view: its identity path, the
//! props it installs, its render functions, and its lifecycle hooks. Every
//! hook has a default no-op body and is dispatched unconditionally - there
//! is no "call if function" probing, absence is just the default.

use std::rc::Rc;

use serde_json::Value;

use crate::error::HookResult;
use crate::types::{DataMap, ScriptResource, StyleResource, WrapperConfig};

use super::instance::ViewInstance;

/// A callable installed on an instance by the configuration binder.
/// Invoked through [`ViewInstance::call_method`], bound to the instance.
pub type Method = Rc<dyn Fn(&mut ViewInstance, &[Value]) -> Value>;

/// A declared property value: plain data or a bound callable.
#[derive(Clone)]
pub enum PropValue {
    Data(Value),
    Method(Method),
}

impl std::fmt::Debug for PropValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropValue::Data(value) => f.debug_tuple("Data").field(value).finish(),
            PropValue::Method(_) => f.debug_tuple("Method").field(&"<fn>").finish(),
        }
    }
}

/// The contract a view definition satisfies.
///
/// Only `path` is mandatory. Render functions return `Ok(None)` when the
/// view produces no markup of its own.
#[allow(unused_variables)]
pub trait ViewDefinition {
    /// Definition identity, e.g. `"pages.home"`.
    fn path(&self) -> &str;

    /// Declared properties, partitioned by the binder into data props and
    /// instance methods.
    fn props(&self) -> Vec<(String, PropValue)> {
        Vec::new()
    }

    fn wrapper(&self) -> WrapperConfig {
        WrapperConfig::default()
    }

    /// Script resources inserted on mount, removed on unmount.
    fn scripts(&self) -> Vec<ScriptResource> {
        Vec::new()
    }

    /// Style resources removed on destroy.
    fn styles(&self) -> Vec<StyleResource> {
        Vec::new()
    }

    // =========================================================================
    // Render Functions
    // =========================================================================

    fn render(&self, view: &mut ViewInstance) -> HookResult<Option<String>> {
        Ok(None)
    }

    fn prerender(&self, view: &mut ViewInstance, extra: &DataMap) -> HookResult<Option<String>> {
        Ok(None)
    }

    // =========================================================================
    // Data Callbacks
    // =========================================================================

    fn update_variable_data(&self, view: &mut ViewInstance, data: &DataMap) {}

    fn update_variable_item(&self, view: &mut ViewInstance, key: &str, value: &Value) {}

    /// Unguarded companion of the constructor-data commit; fires on every
    /// commit call.
    fn commit_constructor_data(&self, view: &mut ViewInstance) {}

    // =========================================================================
    // Lifecycle Hooks
    // =========================================================================

    fn before_create(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
    fn created(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }

    fn before_init(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
    fn init(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
    fn after_init(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }

    fn before_mount(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
    fn mounting(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
    fn mounted(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }

    fn before_update(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
    fn updated(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }

    fn before_unmount(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
    fn unmounting(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
    fn unmounted(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }

    fn before_destroy(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
    fn destroying(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
    fn destroyed(&self, view: &mut ViewInstance) -> HookResult {
        Ok(())
    }
}
