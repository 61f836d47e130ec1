//! Application state shared across handlers.

use std::sync::Arc;

use crate::commerce::{CommerceApi, CommerceClient, CommerceError};
use crate::config::SkillConfig;
use crate::dialog::{Dialog, SessionRegistry};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// session registry and the dialog engine.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    sessions: SessionRegistry,
    dialog: Dialog,
}

impl AppState {
    /// Create application state talking to the configured commerce API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &SkillConfig) -> Result<Self, CommerceError> {
        let commerce = CommerceClient::new(&config.commerce)?;
        Ok(Self::with_commerce(config, Arc::new(commerce)))
    }

    /// Create application state over any commerce implementation.
    #[must_use]
    pub fn with_commerce(config: &SkillConfig, commerce: Arc<dyn CommerceApi>) -> Self {
        let sessions = SessionRegistry::new(&config.sessions);
        let dialog = Dialog::with_keywords(commerce);

        Self {
            inner: Arc::new(AppStateInner {
                sessions,
                dialog,
            }),
        }
    }

    /// Get a reference to the session registry.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.inner.sessions
    }

    /// Get a reference to the dialog engine.
    #[must_use]
    pub fn dialog(&self) -> &Dialog {
        &self.inner.dialog
    }
}
