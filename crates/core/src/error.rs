//! Error types for mathpaste-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{what} is not valid {encoding}")]
    Encoding {
        what: String,
        encoding: &'static str,
    },

    #[error("Corrupt zip archive: {0}")]
    CorruptArchive(String),

    #[error("'{path}' doesn't seem to be a MathPaste zip file")]
    UnrecognizedContainer { path: String },

    #[error("Invalid drawing data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Script could not run yet: {0}")]
    ScriptNotReady(String),

    #[error("Could not decode editor response: {0}")]
    ProtocolDecode(String),

    #[error("Request dropped before the editor answered")]
    RequestDropped,

    #[error("No config directory found")]
    NoConfigDir,

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<zip::result::ZipError> for CoreError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => CoreError::Io(e),
            other => CoreError::CorruptArchive(other.to_string()),
        }
    }
}

impl CoreError {
    /// Human readable cause for the open/save error dialog
    ///
    /// Errors outside the file codec taxonomy are unexpected; they are
    /// logged here with full context and reported generically.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Io(e) => e.to_string(),
            CoreError::Encoding { encoding, .. } => {
                format!("The text doesn't seem to be encoded in {}.", encoding)
            }
            CoreError::CorruptArchive(_) => "The zip file seems to be damaged.".to_string(),
            CoreError::UnrecognizedContainer { .. } => {
                "The zip file is not compatible with MathPaste.".to_string()
            }
            other => {
                tracing::error!("Unexpected error: {:?}", other);
                "An unexpected error occurred.".to_string()
            }
        }
    }
}
