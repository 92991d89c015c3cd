//! Navigation containment for the editor view

use crate::error::Result;

/// What the view should do with a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Follow the navigation inside the view
    Allow,
    /// Ignore it in place and hand the URI to the external opener
    OpenExternally,
}

/// Keeps the view on the editor page
///
/// Allowed: the editor URL itself, the editor URL with a `#fragment`, and
/// anything on the data scheme.
#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    editor_url: String,
    scheme_prefix: String,
}

impl NavigationPolicy {
    pub fn new(editor_url: &str, scheme: &str) -> Self {
        Self {
            editor_url: editor_url.to_string(),
            scheme_prefix: format!("{}://", scheme),
        }
    }

    pub fn decide(&self, uri: &str) -> NavigationDecision {
        if uri.starts_with(&self.scheme_prefix) {
            return NavigationDecision::Allow;
        }

        match uri.strip_prefix(&self.editor_url) {
            Some("") => NavigationDecision::Allow,
            Some(rest) if rest.starts_with('#') => NavigationDecision::Allow,
            _ => NavigationDecision::OpenExternally,
        }
    }
}

/// Opens links the view refused to follow
pub trait ExternalOpener {
    fn open(&self, uri: &str) -> Result<()>;
}

/// Opens links in the system's default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl ExternalOpener for SystemBrowser {
    fn open(&self, uri: &str) -> Result<()> {
        tracing::info!("Opening external link in web browser: {}", uri);
        open::that(uri)?;
        Ok(())
    }
}
