//! The logical content unit exchanged with the editor page and the disk

use serde::{Deserialize, Serialize};

/// Math text plus an optional drawing
///
/// Field names on the wire follow the editor's `getMathAndImage()` result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MathDocument {
    /// Math source text (arbitrary Unicode)
    #[serde(rename = "math")]
    pub math_text: String,

    /// Drawing vector data (ASCII), empty when nothing has been drawn
    #[serde(rename = "imageString", default)]
    pub drawing_vector_data: String,

    /// PNG rendering of the drawing as a `data:image/png;base64,` URL
    #[serde(rename = "imageDataUrl", default)]
    pub drawing_raster_data_url: String,
}

impl MathDocument {
    /// Document with math text only
    pub fn new(math_text: impl Into<String>) -> Self {
        Self {
            math_text: math_text.into(),
            ..Default::default()
        }
    }

    /// Document with math text and a drawing
    pub fn with_drawing(
        math_text: impl Into<String>,
        drawing_vector_data: impl Into<String>,
        drawing_raster_data_url: impl Into<String>,
    ) -> Self {
        Self {
            math_text: math_text.into(),
            drawing_vector_data: drawing_vector_data.into(),
            drawing_raster_data_url: drawing_raster_data_url.into(),
        }
        .normalized()
    }

    /// True when a drawing is present
    pub fn has_drawing(&self) -> bool {
        !self.drawing_vector_data.is_empty()
    }

    /// Drop the raster when there is no vector data
    pub fn normalized(mut self) -> Self {
        if self.drawing_vector_data.is_empty() {
            self.drawing_raster_data_url.clear();
        }
        self
    }
}
