//! Reactive Manager - dependency tracking, ambient state, output components.
//!
//! Three collaborating pieces:
//! - [`tracker`] - the monotonically growing sequence of subscription ids
//!   touched during state reads; render passes slice it to learn what they
//!   depended on.
//! - [`state`] - ambient application data; reads through [`state::get`]
//!   append to the tracker.
//! - [`output`] - reactive output components owned per view, mounted and
//!   torn down alongside their owning instance.

pub mod output;
pub mod state;
pub mod tracker;

pub use output::{
    destroy_view_subscriptions, mount_view_components, pending_output_count,
    queue_output_component, unmount_view_components, OutputComponentConfig,
};
pub use state::{ambient_snapshot, get, peek, set};
pub use tracker::{len, slice_from, track};

/// Reset every reactive collaborator (for testing).
pub fn reset_reactive() {
    tracker::reset_tracker();
    state::reset_state();
    output::reset_outputs();
}
