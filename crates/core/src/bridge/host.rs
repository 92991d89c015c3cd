//! Embedded document host abstraction

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{mpsc, oneshot};

use super::wire;
use crate::error::{CoreError, Result};
use crate::types::MathDocument;

/// Resolves once the page reports how a submitted script went
///
/// A dropped sender means the document was torn down.
pub type ScriptCompletion = oneshot::Receiver<Result<()>>;

/// Browser view hosting the editor page
///
/// `run_script` must submit the script before returning, so scripts reach
/// the page in call order; only the completion is asynchronous.
pub trait DocumentHost: Send + Sync {
    /// Navigate the view to `url`
    fn load_url(&self, url: &str);

    /// Submit a script to the page's script context
    fn run_script(&self, script: String) -> ScriptCompletion;

    /// Apply a zoom level (1.0 = 100%)
    fn set_zoom_level(&self, level: f64);
}

/// Mock editor page for testing
///
/// Behaves like the real page: scripts fail until it is ready, pushed state
/// is remembered, and pull scripts are answered by navigating to the data
/// scheme (delivered through the receiver returned by [`MockDocumentHost::new`]).
pub struct MockDocumentHost {
    scheme: String,
    ready: AtomicBool,
    failed_attempts: AtomicUsize,
    scripts: Mutex<Vec<String>>,
    loaded_urls: Mutex<Vec<String>>,
    zoom_levels: Mutex<Vec<f64>>,
    document: Mutex<MathDocument>,
    navigations: mpsc::UnboundedSender<String>,
}

impl MockDocumentHost {
    /// Create a mock page that is not ready yet
    pub fn new(scheme: &str) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (navigations, rx) = mpsc::unbounded_channel();
        let host = Self {
            scheme: scheme.to_string(),
            ready: AtomicBool::new(false),
            failed_attempts: AtomicUsize::new(0),
            scripts: Mutex::new(Vec::new()),
            loaded_urls: Mutex::new(Vec::new()),
            zoom_levels: Mutex::new(Vec::new()),
            document: Mutex::new(MathDocument::default()),
            navigations,
        };
        (host, rx)
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Replace what the page currently shows (as if the user edited it)
    pub fn set_document(&self, document: MathDocument) {
        *self.document.lock() = document;
    }

    pub fn document(&self) -> MathDocument {
        self.document.lock().clone()
    }

    /// Scripts that ran successfully, in order
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }

    /// Scripts rejected because the page was not ready
    pub fn failed_attempts(&self) -> usize {
        self.failed_attempts.load(Ordering::SeqCst)
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.loaded_urls.lock().clone()
    }

    pub fn zoom_levels(&self) -> Vec<f64> {
        self.zoom_levels.lock().clone()
    }

    /// Fire the page's change callback
    pub fn emit_change(&self) {
        let _ = self.navigations.send(wire::changed_uri(&self.scheme));
    }

    /// Navigate somewhere, as a clicked link would
    pub fn navigate(&self, uri: &str) {
        let _ = self.navigations.send(uri.to_string());
    }

    fn apply(&self, script: &str) -> Result<()> {
        if let Some(id) = wire::pull_request_id(&self.scheme, script) {
            let uri = wire::response_uri(&self.scheme, id, &self.document.lock())?;
            let _ = self.navigations.send(uri);
        } else if let Some((math, drawing)) = wire::parse_set_state_script(script) {
            let mut document = self.document.lock();
            document.math_text = math;
            document.drawing_vector_data = drawing;
            if !document.has_drawing() {
                document.drawing_raster_data_url.clear();
            }
        }
        Ok(())
    }
}

impl DocumentHost for MockDocumentHost {
    fn load_url(&self, url: &str) {
        self.loaded_urls.lock().push(url.to_string());
    }

    fn run_script(&self, script: String) -> ScriptCompletion {
        let (tx, rx) = oneshot::channel();

        if !self.ready.load(Ordering::SeqCst) {
            self.failed_attempts.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(Err(CoreError::ScriptNotReady(
                "ReferenceError: mathpaste is not defined".to_string(),
            )));
            return rx;
        }

        self.scripts.lock().push(script.clone());
        let _ = tx.send(self.apply(&script));
        rx
    }

    fn set_zoom_level(&self, level: f64) {
        self.zoom_levels.lock().push(level);
    }
}
