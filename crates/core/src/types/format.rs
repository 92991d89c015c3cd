//! On-disk file formats and their file-chooser filters

/// On-disk format of a math file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Only the math text, UTF-8
    PlainText,
    /// Zip archive with math text and optional drawing
    ZipContainer,
}

/// File-chooser filter for a format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub name: &'static str,
    pub mime_type: &'static str,
}

const TEXT_FILTER: FilterDescriptor = FilterDescriptor {
    name: "Text files (no drawing)",
    mime_type: "text/plain",
};

const ZIP_FILTER: FilterDescriptor = FilterDescriptor {
    name: "Zip files (text and drawing)",
    mime_type: "application/zip",
};

impl FileFormat {
    pub const ALL: [FileFormat; 2] = [FileFormat::PlainText, FileFormat::ZipContainer];

    /// Filter shown in open/save dialogs for this format
    pub fn filter(self) -> FilterDescriptor {
        match self {
            FileFormat::PlainText => TEXT_FILTER,
            FileFormat::ZipContainer => ZIP_FILTER,
        }
    }

    /// Format selected through a filter's MIME type
    pub fn from_mime_type(mime_type: &str) -> Option<FileFormat> {
        Self::ALL
            .into_iter()
            .find(|format| format.filter().mime_type == mime_type)
    }

    /// Filters for every format, in dialog order
    pub fn filters() -> Vec<FilterDescriptor> {
        Self::ALL.iter().map(|format| format.filter()).collect()
    }
}

impl std::str::FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" | "plain" => Ok(FileFormat::PlainText),
            "zip" => Ok(FileFormat::ZipContainer),
            other => Err(format!("unknown file format: {}", other)),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::PlainText => write!(f, "text"),
            FileFormat::ZipContainer => write!(f, "zip"),
        }
    }
}
