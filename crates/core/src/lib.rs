//! MathPaste Core - Shared logic for the MathPaste desktop shell
//!
//! This crate provides:
//! - Document model (math text + drawing)
//! - File codec (plain text and zip container)
//! - Bridge protocol engine for the embedded editor page
//! - Settings persistence and zoom synchronisation
//! - Shell orchestration (open/save/quit) behind dialog traits

/// URL of the embedded math editor (must end with a slash)
pub const EDITOR_URL: &str = "https://akuli.github.io/mathpaste/";
/// Custom URI scheme the editor page navigates to when talking back
pub const DATA_SCHEME: &str = "mathpaste-gtk-data";
/// Delay before re-running a script the page was not ready for
pub const RETRY_DELAY_MS: u64 = 200;
/// Local file header signature of a zip archive
pub const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
pub const APP_NAME: &str = "MathPaste";

pub mod bridge;
pub mod codec;
pub mod error;
pub mod settings;
pub mod shell;
pub mod types;
pub mod zoom;

// Re-export common types
pub use bridge::{BridgeConfig, BridgeEngine, BridgeEvent, DocumentHost, MockDocumentHost};
pub use codec::{read_math_file, write_math_file};
pub use error::{CoreError, Result};
pub use settings::{Settings, SettingsStore};
pub use shell::{Dialogs, Shell, UnsavedChoice};
pub use types::{FileFormat, FilterDescriptor, MathDocument};
pub use zoom::ZoomSync;
