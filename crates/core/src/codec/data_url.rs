//! PNG data URLs produced by the editor's drawing canvas

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{CoreError, Result};

/// Mandatory prefix of a drawing raster
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Decode the PNG bytes out of a `data:image/png;base64,...` URL
///
/// The raster always comes from the editor page, so a wrong prefix means the
/// page and the shell disagree about the format.
pub fn decode_png_data_url(url: &str) -> Result<Vec<u8>> {
    let Some(b64data) = url.strip_prefix(PNG_DATA_URL_PREFIX) else {
        let shown: String = url.chars().take(PNG_DATA_URL_PREFIX.len()).collect();
        return Err(CoreError::InvalidDataUrl(format!(
            "expected prefix {:?}, got {:?}",
            PNG_DATA_URL_PREFIX, shown
        )));
    };

    STANDARD
        .decode(b64data)
        .map_err(|e| CoreError::InvalidDataUrl(e.to_string()))
}

/// Build a data URL from raw PNG bytes
pub fn encode_png_data_url(png: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png))
}
