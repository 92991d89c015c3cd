//! Shell orchestration
//!
//! Ties the file codec and the bridge together: open, save, save-as, the
//! unsaved-changes prompt on quit, the window title and zoom. All GUI work
//! goes through the [`Dialogs`] collaborator; the browser view is reached
//! through the bridge's host.

mod dialogs;

pub use dialogs::{CurrentFile, Dialogs, UnsavedChoice};

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::bridge::{BridgeEngine, BridgeEvent, ExternalOpener, SystemBrowser};
use crate::codec::{drops_drawing, read_math_file, write_math_file};
use crate::error::CoreError;
use crate::settings::SettingsStore;
use crate::types::FileFormat;
use crate::zoom::{ZoomSync, ZOOM_DEFAULT};
use crate::APP_NAME;

const DRAWING_LOST_TITLE: &str = "Your drawing wasn't saved";
const DRAWING_LOST_MESSAGE: &str = "If you want to save the drawing too, don't choose the \
                                    \"Text files\" filetype in the \"Save As\" dialog.";

/// Application state owned by the shell
#[derive(Debug)]
pub struct AppContext {
    pub settings: SettingsStore,
    pub current: Option<CurrentFile>,
    pub saved: bool,
    pub zoom: ZoomSync,
}

impl AppContext {
    pub fn new(settings: SettingsStore) -> Self {
        let zoom = ZoomSync::new(settings.settings().zoom);
        Self {
            settings,
            current: None,
            saved: true,
            zoom,
        }
    }
}

/// Top-level controller of one editor window
pub struct Shell<D: Dialogs> {
    bridge: Arc<BridgeEngine>,
    dialogs: D,
    opener: Box<dyn ExternalOpener>,
    context: AppContext,
}

impl<D: Dialogs> Shell<D> {
    pub fn new(bridge: Arc<BridgeEngine>, dialogs: D, settings: SettingsStore) -> Self {
        Self {
            bridge,
            dialogs,
            opener: Box::new(SystemBrowser),
            context: AppContext::new(settings),
        }
    }

    /// Replace the system browser as the handler for external links
    pub fn with_opener(mut self, opener: Box<dyn ExternalOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn dialogs_mut(&mut self) -> &mut D {
        &mut self.dialogs
    }

    pub fn bridge(&self) -> &Arc<BridgeEngine> {
        &self.bridge
    }

    /// Load the editor and bring the window into its initial state
    pub fn start(&mut self) {
        self.bridge.load_editor();
        // runs in the background until the page has loaded
        drop(self.bridge.install_change_hook());
        self.set_zoom(self.context.zoom.percent());
        self.update_title();
    }

    /// Route a bridge notification
    pub fn handle_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::ContentChanged => self.set_saved(false),
            BridgeEvent::OpenExternal(uri) => {
                if let Err(e) = self.opener.open(&uri) {
                    warn!("Failed to open {} externally: {}", uri, e);
                }
            }
        }
    }

    /// "Open" action: offer to save, ask for a file, open it
    pub async fn open(&mut self) -> bool {
        if !self.confirm_discard().await {
            return false;
        }

        let filters = FileFormat::filters();
        let Some(path) = self
            .dialogs
            .choose_open_path(self.context.current.as_ref(), &filters)
        else {
            return false;
        };
        self.open_file(&path)
    }

    /// Read `path` and show it in the editor
    ///
    /// Failures are reported through an error dialog; returns whether the
    /// file was opened.
    pub fn open_file(&mut self, path: &Path) -> bool {
        info!("Opening {}", path.display());

        let (format, document) = match read_math_file(path) {
            Ok(read) => read,
            Err(e) => {
                self.report_error("open", path, &e);
                return false;
            }
        };

        if let Err(e) = self.bridge.push_state(&document) {
            self.report_error("open", path, &e);
            return false;
        }

        self.context.current = Some(CurrentFile {
            path: path.to_path_buf(),
            format,
        });
        self.set_saved(true);
        true
    }

    /// Load a shared editor link (`<editor url>#<state>`)
    pub async fn open_url(&mut self, url: &str) -> bool {
        let editor_url = self.bridge.config().editor_url.clone();
        let hash = match url.strip_prefix(editor_url.as_str()) {
            Some(hash) if hash.starts_with('#') => hash.to_string(),
            _ => {
                self.dialogs.show_error(
                    &format!("Cannot open '{}'", url),
                    &format!("Only links to {} can be opened.", editor_url),
                );
                return false;
            }
        };

        if !self.confirm_discard().await {
            return false;
        }

        if let Err(e) = self.bridge.push_location_hash(&hash) {
            self.dialogs
                .show_error(&format!("Cannot open '{}'", url), &e.user_message());
            return false;
        }

        // the linked math lives nowhere on disk yet
        self.context.current = None;
        self.set_saved(false);
        true
    }

    /// "Save" action; without a current file this is "Save As"
    pub async fn save(&mut self) -> bool {
        match self.context.current.clone() {
            Some(current) => self.write_current(current).await,
            None => self.save_as().await,
        }
    }

    /// "Save As" action
    pub async fn save_as(&mut self) -> bool {
        let filters = FileFormat::filters();
        let Some((path, format)) = self
            .dialogs
            .choose_save_path(self.context.current.as_ref(), &filters)
        else {
            return false;
        };

        let current = CurrentFile { path, format };
        self.context.current = Some(current.clone());
        self.update_title();
        self.write_current(current).await
    }

    /// Ask about unsaved changes, then persist settings and stop the bridge
    ///
    /// Returns false when the user cancelled (or the save they asked for
    /// failed) and the window should stay open.
    pub async fn request_quit(&mut self) -> bool {
        if !self.confirm_discard().await {
            return false;
        }

        self.persist_settings();
        self.bridge.shutdown();
        true
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.context.zoom.zoom_in());
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.context.zoom.zoom_out());
    }

    pub fn zoom_reset(&mut self) {
        self.set_zoom(ZOOM_DEFAULT);
    }

    /// Slider moved to `percent`
    pub fn set_zoom(&mut self, percent: u32) {
        let level = self.context.zoom.slider_changed(percent);
        self.bridge.host().set_zoom_level(level);
        self.context.zoom.finish_apply();
        self.store_zoom();
    }

    /// The view changed its own zoom level
    pub fn view_zoom_changed(&mut self, level: f64) {
        if self.context.zoom.view_changed(level).is_some() {
            self.store_zoom();
        }
    }

    /// Current window title
    pub fn title(&self) -> String {
        window_title(self.context.current.as_ref(), self.context.saved)
    }

    async fn write_current(&mut self, current: CurrentFile) -> bool {
        let document = match self.bridge.pull_state().await {
            Ok(document) => document,
            Err(e) => {
                self.report_error("save", &current.path, &e);
                return false;
            }
        };

        info!("Saving {} as {:?}", current.path.display(), current.format);
        if let Err(e) = write_math_file(&current.path, current.format, &document) {
            self.report_error("save", &current.path, &e);
            return false;
        }
        self.set_saved(true);

        if drops_drawing(current.format, &document) {
            self.dialogs
                .show_warning(DRAWING_LOST_TITLE, DRAWING_LOST_MESSAGE);
        }
        true
    }

    async fn confirm_discard(&mut self) -> bool {
        if self.context.saved {
            return true;
        }

        let name = display_name(self.context.current.as_ref());
        match self.dialogs.confirm_unsaved(&name) {
            UnsavedChoice::Save => self.save().await,
            UnsavedChoice::Discard => true,
            UnsavedChoice::Cancel => false,
        }
    }

    fn persist_settings(&mut self) {
        self.context.settings.settings_mut().zoom = self.context.zoom.percent();
        if let Err(e) = self.context.settings.save() {
            warn!("Failed to save settings: {}", e);
        }
    }

    fn store_zoom(&mut self) {
        let percent = self.context.zoom.percent();
        debug!("Zoom is now {}%", percent);
        self.context.settings.settings_mut().zoom = percent;
        self.dialogs.set_zoom_slider(percent);
    }

    fn set_saved(&mut self, saved: bool) {
        self.context.saved = saved;
        self.update_title();
    }

    fn update_title(&mut self) {
        let title = self.title();
        self.dialogs.set_title(&title);
    }

    fn report_error(&mut self, verb: &str, path: &Path, err: &CoreError) {
        warn!("Cannot {} {}: {}", verb, path.display(), err);
        self.dialogs.show_error(
            &format!("Cannot {} '{}'", verb, path.display()),
            &err.user_message(),
        );
    }
}

/// Window title like `notes.txt (text only, modified) - MathPaste`
pub fn window_title(current: Option<&CurrentFile>, saved: bool) -> String {
    let mut flags = Vec::new();
    if current.map(|c| c.format) == Some(FileFormat::PlainText) {
        flags.push("text only");
    }
    if !saved {
        flags.push("modified");
    }

    let mut title = display_name(current);
    if !flags.is_empty() {
        title.push_str(&format!(" ({})", flags.join(", ")));
    }
    format!("{} - {}", title, APP_NAME)
}

fn display_name(current: Option<&CurrentFile>) -> String {
    match current {
        Some(current) => current.path.display().to_string(),
        None => "New math".to_string(),
    }
}
