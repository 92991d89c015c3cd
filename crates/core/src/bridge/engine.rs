//! Bridge protocol engine
//!
//! Push: scripts setting the page state are re-run every `retry_delay` until
//! the page accepts them (it rejects everything while still loading).
//! Pull: each request gets a fresh id; the page answers by navigating to
//! `<scheme>://<id>,<payload>` and the answer goes to the matching waiter,
//! whatever order answers arrive in.
//!
//! All continuations run on the caller's Tokio runtime.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::host::DocumentHost;
use super::navigation::{NavigationDecision, NavigationPolicy};
use super::sentinel::TitleSentinelWatcher;
use super::wire::{self, IncomingMessage};
use super::{BridgeConfig, BridgeEvent};
use crate::error::{CoreError, Result};
use crate::types::MathDocument;

type PullSender = oneshot::Sender<Result<MathDocument>>;

/// Answer for an intercepted data-scheme request
///
/// Always empty, so the page's navigation completes without visible effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeResponse {
    pub mime_type: &'static str,
    pub body: Vec<u8>,
}

impl SchemeResponse {
    pub fn empty() -> Self {
        Self {
            mime_type: "text/plain",
            body: Vec::new(),
        }
    }
}

/// An issued pull waiting for the page's answer
#[derive(Debug)]
pub struct PendingPull {
    id: u64,
    rx: oneshot::Receiver<Result<MathDocument>>,
}

impl PendingPull {
    /// Correlation id sent to the page
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the page's answer
    ///
    /// Fails with `RequestDropped` if the bridge shut down or the page went
    /// away before answering.
    pub async fn wait(self) -> Result<MathDocument> {
        self.rx.await.map_err(|_| CoreError::RequestDropped)?
    }
}

/// Request/response channel to the editor page
pub struct BridgeEngine {
    host: Arc<dyn DocumentHost>,
    config: BridgeConfig,
    policy: NavigationPolicy,
    pending: Arc<Mutex<HashMap<u64, PullSender>>>,
    next_id: AtomicU64,
    events: mpsc::UnboundedSender<BridgeEvent>,
    title_watcher: Option<Mutex<TitleSentinelWatcher>>,
    shutdown: CancellationToken,
}

impl BridgeEngine {
    /// Create engine for a host
    ///
    /// Returns the engine and the receiver of change/navigation events.
    pub fn new(
        host: Arc<dyn DocumentHost>,
        config: BridgeConfig,
    ) -> (Self, mpsc::UnboundedReceiver<BridgeEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let policy = NavigationPolicy::new(&config.editor_url, &config.scheme);
        let title_watcher = config
            .title_sentinels
            .as_ref()
            .map(|(first, second)| Mutex::new(TitleSentinelWatcher::new(first, second)));

        let engine = Self {
            host,
            config,
            policy,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            events,
            title_watcher,
            shutdown: CancellationToken::new(),
        };
        (engine, events_rx)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn host(&self) -> &Arc<dyn DocumentHost> {
        &self.host
    }

    /// Load the editor page into the view
    pub fn load_editor(&self) {
        debug!("Loading editor from {}", self.config.editor_url);
        self.host.load_url(&self.config.editor_url);
    }

    /// Register the page's change callback, retrying until it loads
    pub fn install_change_hook(&self) -> JoinHandle<()> {
        self.run_until_succeeds(wire::change_hook_script(&self.config.scheme))
    }

    /// Show `document` in the page
    ///
    /// Never fails once the script is built: rejected runs are retried until
    /// the page accepts them or the bridge shuts down.
    pub fn push_state(&self, document: &MathDocument) -> Result<JoinHandle<()>> {
        debug!(
            "Pushing state: {} chars of math, {} chars of drawing",
            document.math_text.len(),
            document.drawing_vector_data.len()
        );
        let script = wire::set_state_script(document)?;
        Ok(self.run_until_succeeds(script))
    }

    /// Load the state encoded in a shared-link location hash
    pub fn push_location_hash(&self, hash: &str) -> Result<JoinHandle<()>> {
        let script = wire::load_hash_script(hash)?;
        Ok(self.run_until_succeeds(script))
    }

    /// Ask the page for its current state
    ///
    /// The script runs once; if the page rejects it the pull fails and the
    /// caller decides whether to ask again.
    pub fn request_state(&self) -> PendingPull {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        debug!("Pull request {} issued", id);
        let completion = self.host.run_script(wire::pull_script(&self.config.scheme, id));

        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            match completion.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if let Some(tx) = pending.lock().remove(&id) {
                        warn!("Pull request {} could not run: {}", id, e);
                        let _ = tx.send(Err(e));
                    }
                }
                Err(_) => {
                    // Page torn down; the waiter sees RequestDropped
                    pending.lock().remove(&id);
                }
            }
        });

        PendingPull { id, rx }
    }

    /// Ask the page for its current state and wait for it
    pub async fn pull_state(&self) -> Result<MathDocument> {
        self.request_state().wait().await
    }

    /// Handle a request the view intercepted on the data scheme
    ///
    /// Change notifications become events, responses go to their waiters.
    pub fn handle_data_uri(&self, uri: &str) -> SchemeResponse {
        match wire::parse_data_uri(&self.config.scheme, uri) {
            Ok(IncomingMessage::Changed) => {
                debug!("Editor content changed");
                let _ = self.events.send(BridgeEvent::ContentChanged);
            }
            Ok(IncomingMessage::Response { id, payload }) => {
                self.resolve(id, wire::decode_payload(&payload));
            }
            Err(e) => {
                error!("Malformed data URI from editor: {}", e);
            }
        }

        SchemeResponse::empty()
    }

    /// Decide a navigation request from the view
    pub fn decide_navigation(&self, uri: &str) -> NavigationDecision {
        let decision = self.policy.decide(uri);
        if decision == NavigationDecision::OpenExternally {
            debug!("Redirecting navigation to {} outside the editor", uri);
            let _ = self.events.send(BridgeEvent::OpenExternal(uri.to_string()));
        }
        decision
    }

    /// Feed a document title change (legacy change detection)
    pub fn observe_title(&self, title: &str) {
        let Some(watcher) = &self.title_watcher else {
            return;
        };
        if watcher.lock().observe(title) {
            debug!("Editor content changed (title sentinel)");
            let _ = self.events.send(BridgeEvent::ContentChanged);
        }
    }

    /// Number of pulls still waiting for an answer
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Stop retries and drop every waiting pull
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        let dropped = {
            let mut pending = self.pending.lock();
            let count = pending.len();
            pending.clear();
            count
        };
        if dropped > 0 {
            debug!("Dropped {} pending pull requests on shutdown", dropped);
        }
    }

    fn resolve(&self, id: u64, result: Result<MathDocument>) {
        let Some(tx) = self.pending.lock().remove(&id) else {
            warn!("Ignoring editor response for unknown request {}", id);
            return;
        };

        if let Err(e) = &result {
            error!("Editor response {} violates the wire format: {}", id, e);
        }
        if tx.send(result).is_err() {
            debug!("Waiter for request {} is gone", id);
        }
    }

    /// Submit now, then keep re-running every `retry_delay` until accepted
    fn run_until_succeeds(&self, script: String) -> JoinHandle<()> {
        let mut completion = self.host.run_script(script.clone());
        let host = Arc::clone(&self.host);
        let delay = self.config.retry_delay;
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let mut attempt: u32 = 1;
            loop {
                match completion.await {
                    Ok(Ok(())) => {
                        if attempt > 1 {
                            debug!("Script ran after {} attempts", attempt);
                        }
                        return;
                    }
                    Ok(Err(e)) => {
                        debug!(
                            "Running script failed (attempt {}): {}, retrying in {:?}",
                            attempt, e, delay
                        );
                    }
                    Err(_) => {
                        debug!("Editor page went away, dropping script");
                        return;
                    }
                }

                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("Bridge shut down, dropping script retry");
                        return;
                    }
                    _ = sleep(delay) => {}
                }

                attempt += 1;
                completion = host.run_script(script.clone());
            }
        })
    }
}

impl Drop for BridgeEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
