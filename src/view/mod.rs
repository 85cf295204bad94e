//! View runtime - definition trait, instance, and its operations.
//!
//! A [`ViewDefinition`] describes a view; a [`ViewInstance`] is one live
//! occurrence of it. The instance's behavior is split across focused
//! modules, all implemented as `impl ViewInstance` blocks:
//!
//! - [`config`] - prop binding and data commits
//! - [`render`] - output production and dependency capture
//! - [`scan`] - descriptor ingestion and anchor resolution
//! - [`lifecycle`] - the hook-sequenced state machine

mod config;
mod definition;
mod instance;
mod lifecycle;
mod render;
mod scan;

pub use definition::{Method, PropValue, ViewDefinition};
pub use instance::ViewInstance;
pub use scan::{ChildRef, ScanDescriptor};
