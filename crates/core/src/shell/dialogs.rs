//! Dialog and window collaborators the shell drives

use std::path::PathBuf;

use crate::types::{FileFormat, FilterDescriptor};

/// Answer to "save changes before continuing?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedChoice {
    Save,
    Discard,
    Cancel,
}

/// File currently backing the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentFile {
    pub path: PathBuf,
    pub format: FileFormat,
}

/// Window, dialog and slider operations supplied by the GUI toolkit
///
/// All calls block until the user answers. `set_zoom_slider` must not be
/// reported back to the shell as a slider change.
pub trait Dialogs {
    /// "Open" file chooser; `None` when cancelled
    fn choose_open_path(
        &mut self,
        current: Option<&CurrentFile>,
        filters: &[FilterDescriptor],
    ) -> Option<PathBuf>;

    /// "Save As" file chooser with a format per filter; `None` when cancelled
    fn choose_save_path(
        &mut self,
        current: Option<&CurrentFile>,
        filters: &[FilterDescriptor],
    ) -> Option<(PathBuf, FileFormat)>;

    /// Yes/no/cancel confirmation about unsaved changes in `name`
    fn confirm_unsaved(&mut self, name: &str) -> UnsavedChoice;

    fn show_error(&mut self, title: &str, message: &str);

    fn show_warning(&mut self, title: &str, message: &str);

    fn set_title(&mut self, title: &str);

    fn set_zoom_slider(&mut self, percent: u32);
}
