//! Bridge between the native shell and the embedded editor page
//!
//! - `wire`: scripts sent to the page and URIs it navigates back to
//! - `host`: the browser view abstraction (plus a mock page for tests)
//! - `engine`: push with retry, correlated pulls, event routing
//! - `navigation`: keeps the view on the editor
//! - `sentinel`: legacy title-toggle change detection

pub mod engine;
pub mod host;
pub mod navigation;
pub mod sentinel;
pub mod wire;

pub use engine::{BridgeEngine, PendingPull, SchemeResponse};
pub use host::{DocumentHost, MockDocumentHost, ScriptCompletion};
pub use navigation::{ExternalOpener, NavigationDecision, NavigationPolicy, SystemBrowser};
pub use sentinel::TitleSentinelWatcher;

use std::time::Duration;

use crate::{DATA_SCHEME, EDITOR_URL, RETRY_DELAY_MS};

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Page to load; must end with a slash
    pub editor_url: String,
    /// Custom scheme the page navigates to when talking back
    pub scheme: String,
    /// Delay before re-running a script the page rejected
    pub retry_delay: Duration,
    /// Title pair toggled by editor builds without change callbacks
    pub title_sentinels: Option<(String, String)>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            editor_url: EDITOR_URL.to_string(),
            scheme: DATA_SCHEME.to_string(),
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
            title_sentinels: None,
        }
    }
}

impl BridgeConfig {
    /// Point at another editor build (e.g. a local checkout)
    pub fn with_editor_url(mut self, editor_url: impl Into<String>) -> Self {
        self.editor_url = editor_url.into();
        self
    }

    /// Enable title-toggle change detection
    pub fn with_title_sentinels(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.title_sentinels = Some((first.into(), second.into()));
        self
    }
}

/// Notifications from the page that are not pull responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The user edited the math or the drawing
    ContentChanged,
    /// The page tried to leave the editor; open this URI outside instead
    OpenExternal(String),
}
