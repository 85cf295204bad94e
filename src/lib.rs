//! # vireo
//!
//! Component view runtime: lifecycle orchestration and reactive dependency
//! capture for server-assembled UIs.
//!
//! A view is declared once as a [`ViewDefinition`] and instantiated into
//! [`ViewInstance`]s owned by the [`registry`]. Each instance walks an
//! explicit lifecycle (create, init, mount, update, unmount, destroy) with
//! before/after hooks around every transition, renders string markup while
//! capturing which reactive keys the render touched, and anchors itself to
//! host nodes through the pluggable [`HostEnvironment`].
//!
//! ## Architecture
//!
//! The runtime is single-threaded and cooperative: all shared state lives in
//! thread-locals, and cross-instance notifications go through the registry,
//! which skips instances that are mid-transition.
//!
//! ```text
//! ViewDefinition → ViewInstance → render (capture deps) → host anchor
//!                       ↑                                     │
//!                   registry  ←── lifecycle notifications ────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - core types (Phase, ViewFlags, Anchor, WrapperConfig)
//! - [`view`] - definition trait, instance, render/scan/lifecycle operations
//! - [`registry`] - arena ownership of instances and hierarchy edges
//! - [`reactive`] - dependency tracker, ambient state, output components
//! - [`binding`] - attribute bindings and listener refcounts
//! - [`markup`] - root-element scanning, annotation, wrapper injection
//! - [`host`] - host-environment trait plus an in-memory host for tests
//! - [`manager`] - changed-sections notification sink
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use vireo::{registry, HookResult, ViewDefinition, ViewInstance};
//!
//! struct Greeting;
//!
//! impl ViewDefinition for Greeting {
//!     fn path(&self) -> &str {
//!         "pages.greeting"
//!     }
//!     fn render(&self, _view: &mut ViewInstance) -> HookResult<Option<String>> {
//!         let name = vireo::reactive::state::get("name").unwrap_or_default();
//!         Ok(Some(format!("<p>Hello, {name}</p>")))
//!     }
//! }
//!
//! let (id, result) = registry::instantiate(Rc::new(Greeting), None);
//! result?;
//! registry::with_view(&id, |view| {
//!     view.render()?;
//!     view.mounted()
//! });
//! ```

pub mod binding;
pub mod error;
pub mod host;
pub mod manager;
pub mod markup;
pub mod reactive;
pub mod registry;
pub mod types;
pub mod view;

pub use types::{
    Anchor, DataMap, NodeHandle, Phase, ScriptResource, StyleResource, SubscriptionId,
    ViewFlags, ViewId, WrapperConfig,
};

pub use error::{
    HookError, HookFailure, HookPolicy, HookResult, LifecycleError, LifecycleResult,
};

pub use view::{ChildRef, Method, PropValue, ScanDescriptor, ViewDefinition, ViewInstance};

pub use host::{memory::MemoryHost, HostEnvironment};

pub use manager::SectionChange;
