//! View Manager notification sink.
//!
//! After a super-view-mediated refresh the runtime reports which sections
//! of the wrapped output changed. The manager is an external collaborator;
//! here it is a thread-local log the embedding application (and the tests)
//! drain.

use std::cell::RefCell;

use crate::types::ViewId;

/// One changed-sections notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionChange {
    pub path: String,
    pub view_id: ViewId,
    /// Root-level section names of the re-rendered output.
    pub sections: Vec<String>,
}

thread_local! {
    static CHANGES: RefCell<Vec<SectionChange>> = RefCell::new(Vec::new());
}

/// Report a super-view-mediated refresh.
pub fn notify_sections_changed(path: &str, view_id: &str, sections: Vec<String>) {
    tracing::debug!(%path, view = %view_id, ?sections, "sections changed");
    CHANGES.with(|changes| {
        changes.borrow_mut().push(SectionChange {
            path: path.to_string(),
            view_id: view_id.to_string(),
            sections,
        });
    });
}

/// Drain all pending notifications.
pub fn take_section_changes() -> Vec<SectionChange> {
    CHANGES.with(|changes| changes.borrow_mut().drain(..).collect())
}

/// Reset the notification log (for testing).
pub fn reset_manager() {
    CHANGES.with(|changes| changes.borrow_mut().clear());
}
