//! Ambient application state with tracked reads.
//!
//! Holds the application-wide key/value data that views merge with their
//! instance-local data. Reads through [`get`] register the key on the
//! dependency tracker so render passes can capture them; [`peek`] reads
//! without tracking (used by constructor-data commits, which must not
//! pollute a pass's capture).

use std::cell::RefCell;

use serde_json::Value;

use super::tracker;
use crate::types::DataMap;

thread_local! {
    static AMBIENT: RefCell<DataMap> = RefCell::new(DataMap::new());
}

/// Tracked read: appends `key` to the dependency sequence.
pub fn get(key: &str) -> Option<Value> {
    tracker::track(key);
    AMBIENT.with(|data| data.borrow().get(key).cloned())
}

/// Untracked read.
pub fn peek(key: &str) -> Option<Value> {
    AMBIENT.with(|data| data.borrow().get(key).cloned())
}

/// Write a value into ambient state. Reacting to the change (deciding which
/// views to refresh) is the caller's job, driven by the capture lists.
pub fn set(key: impl Into<String>, value: Value) {
    AMBIENT.with(|data| {
        data.borrow_mut().insert(key.into(), value);
    });
}

/// Untracked snapshot of the whole ambient map.
pub fn ambient_snapshot() -> DataMap {
    AMBIENT.with(|data| data.borrow().clone())
}

/// Reset ambient state (for testing).
pub fn reset_state() {
    AMBIENT.with(|data| data.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_tracks_peek_does_not() {
        crate::reactive::reset_reactive();

        set("theme", json!("dark"));
        let before = tracker::len();
        assert_eq!(peek("theme"), Some(json!("dark")));
        assert_eq!(tracker::len(), before);

        assert_eq!(get("theme"), Some(json!("dark")));
        assert_eq!(tracker::len(), before + 1);
        assert_eq!(tracker::slice_from(before), vec!["theme"]);
    }

    #[test]
    fn test_missing_key_still_tracked() {
        crate::reactive::reset_reactive();

        let before = tracker::len();
        assert_eq!(get("absent"), None);
        assert_eq!(tracker::len(), before + 1);
    }
}
