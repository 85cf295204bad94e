//! Dependency Tracker - ordered sequence of touched subscription ids.
//!
//! Every tracked state read appends the touched key here. A render pass
//! records the sequence length before and after invoking the definition's
//! render function; the slice between the two lengths is exactly the set of
//! reactive keys that pass depended on, in first-touch order.
//!
//! The sequence only ever grows within a pass. A shrunken sequence means a
//! reentrant capture reset it mid-pass; callers treat that as "no new
//! dependencies" rather than an error.

use std::cell::RefCell;

use crate::types::SubscriptionId;

thread_local! {
    /// The dependency-subscription sequence.
    static SEQUENCE: RefCell<Vec<SubscriptionId>> = RefCell::new(Vec::new());
}

/// Append a touched subscription id to the sequence.
pub fn track(id: impl Into<SubscriptionId>) {
    SEQUENCE.with(|seq| seq.borrow_mut().push(id.into()));
}

/// Current length of the sequence.
pub fn len() -> usize {
    SEQUENCE.with(|seq| seq.borrow().len())
}

/// Slice of all ids appended at or after `start`.
///
/// Returns an empty slice when `start` is past the current end (the
/// sequence shrank underneath the caller).
pub fn slice_from(start: usize) -> Vec<SubscriptionId> {
    SEQUENCE.with(|seq| {
        let seq = seq.borrow();
        if start >= seq.len() {
            Vec::new()
        } else {
            seq[start..].to_vec()
        }
    })
}

/// Reset the sequence (for testing).
pub fn reset_tracker() {
    SEQUENCE.with(|seq| seq.borrow_mut().clear());
}
