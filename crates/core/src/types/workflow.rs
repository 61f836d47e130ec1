//! Purchase workflow correlation handle.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle the commerce platform uses to correlate the calls of one
/// purchase attempt (pricing, order creation, payment).
///
/// The same handle must accompany every call of an attempt. A successful
/// payment confirmation hands back the handle for the next attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowHandle(String);

impl WorkflowHandle {
    /// Wrap a handle issued by the platform.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkflowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkflowHandle {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}

impl AsRef<str> for WorkflowHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
