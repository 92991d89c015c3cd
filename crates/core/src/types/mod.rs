//! Domain types for math documents and their on-disk formats

mod document;
mod format;

pub use document::MathDocument;
pub use format::{FileFormat, FilterDescriptor};
