//! Error types and the hook-failure policy.
//!
//! Two error classes exist: hook errors (raised by view-supplied lifecycle
//! hooks or render functions, best-effort by default) and structural errors
//! (caller misconfiguration, always logged and returned early). Under the
//! default `SwallowAndLog` policy no lifecycle operation raises to its
//! caller.

use thiserror::Error;

/// Failure raised inside a view-supplied hook or render function.
///
/// Deliberately just a message: hook authors report what went wrong, the
/// runtime attaches which hook and which view.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HookFailure(pub String);

impl From<&str> for HookFailure {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<String> for HookFailure {
    fn from(message: String) -> Self {
        Self(message)
    }
}

/// Result alias used by definition hooks and render functions.
pub type HookResult<T = ()> = Result<T, HookFailure>;

/// A hook failure with runtime context attached.
#[derive(Debug, Clone, Error)]
#[error("{hook} hook failed on '{path}': {source}")]
pub struct HookError {
    /// Hook name, e.g. `"mounting"` or `"render"`.
    pub hook: &'static str,
    /// Definition path of the failing view.
    pub path: String,
    #[source]
    pub source: HookFailure,
}

impl HookError {
    pub fn new(hook: &'static str, path: impl Into<String>, source: HookFailure) -> Self {
        Self {
            hook,
            path: path.into(),
            source,
        }
    }
}

/// Error surfaced by a lifecycle operation when the policy is not
/// `SwallowAndLog`.
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Hook(#[from] HookError),
    /// The instance was torn down because a hook failed under
    /// [`HookPolicy::Abort`].
    #[error("view '{path}' aborted: {source}")]
    Aborted {
        path: String,
        #[source]
        source: HookError,
    },
}

/// What to do when a view-supplied hook fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookPolicy {
    /// Log at warn and keep going; flags still advance. The default.
    #[default]
    SwallowAndLog,
    /// Return the error to the caller of the lifecycle operation.
    Propagate,
    /// Destroy the instance and return the error.
    Abort,
}

/// Result alias used by lifecycle operations.
pub type LifecycleResult = Result<(), LifecycleError>;
