//! Wire format between the shell and the editor page
//!
//! Shell → page: scripts calling the page's `mathpaste` object.
//! Page → shell: navigation to `<scheme>://<id>,<payload>` where the payload
//! is `LZString.compressToEncodedURIComponent(JSON.stringify(state))`, or to
//! `<scheme>://changed` when the content was edited.

use crate::error::{CoreError, Result};
use crate::types::MathDocument;

/// Payload of the change notification URI
pub const CHANGED: &str = "changed";

const SET_STATE_CALL: &str = "mathpaste.setMathAndImage(";

/// A decoded page → shell message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingMessage {
    /// Content was edited in the page
    Changed,
    /// Answer to a pull request, payload still compressed
    Response { id: u64, payload: String },
}

/// Script pushing math and drawing into the page
pub fn set_state_script(document: &MathDocument) -> Result<String> {
    Ok(format!(
        "{}{}, {})",
        SET_STATE_CALL,
        serde_json::to_string(&document.math_text)?,
        serde_json::to_string(&document.drawing_vector_data)?
    ))
}

/// Script loading state from a shared-link location hash
pub fn load_hash_script(hash: &str) -> Result<String> {
    Ok(format!(
        "mathpaste.loadMathFromLocationHash({})",
        serde_json::to_string(hash)?
    ))
}

/// Script making the page navigate back with its state tagged by `id`
pub fn pull_script(scheme: &str, id: u64) -> String {
    format!(
        "window.location.href = \"{}://{},\" + \
         LZString.compressToEncodedURIComponent(JSON.stringify(mathpaste.getMathAndImage()))",
        scheme, id
    )
}

/// Script registering the page's change callback
pub fn change_hook_script(scheme: &str) -> String {
    format!(
        "mathpaste.addChangeCallback(() => {{ window.location.href = \"{}\"; }});",
        changed_uri(scheme)
    )
}

pub fn changed_uri(scheme: &str) -> String {
    format!("{}://{}", scheme, CHANGED)
}

/// Parse an intercepted data-scheme URI
pub fn parse_data_uri(scheme: &str, uri: &str) -> Result<IncomingMessage> {
    let rest = uri
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix("://"))
        .ok_or_else(|| CoreError::ProtocolDecode(format!("not a {} URI", scheme)))?;

    if rest.trim_end_matches('/') == CHANGED {
        return Ok(IncomingMessage::Changed);
    }

    let (id, payload) = rest
        .split_once(',')
        .ok_or_else(|| CoreError::ProtocolDecode("missing request id separator".to_string()))?;
    let id = id
        .parse::<u64>()
        .map_err(|e| CoreError::ProtocolDecode(format!("bad request id {:?}: {}", id, e)))?;

    Ok(IncomingMessage::Response {
        id,
        payload: payload.to_string(),
    })
}

/// Decompress and parse a response payload
pub fn decode_payload(payload: &str) -> Result<MathDocument> {
    let wide = lz_str::decompress_from_encoded_uri_component(payload)
        .ok_or_else(|| CoreError::ProtocolDecode("payload is not LZ-compressed".to_string()))?;
    let json = String::from_utf16(&wide)
        .map_err(|e| CoreError::ProtocolDecode(format!("payload is not UTF-16: {}", e)))?;
    let document: MathDocument = serde_json::from_str(&json)
        .map_err(|e| CoreError::ProtocolDecode(format!("payload is not editor state: {}", e)))?;

    Ok(document.normalized())
}

/// Compress a state the way the page does
pub fn encode_payload(document: &MathDocument) -> Result<String> {
    let json = serde_json::to_string(document)?;
    Ok(lz_str::compress_to_encoded_uri_component(json.as_str()))
}

/// Full URI the page navigates to when answering request `id`
pub fn response_uri(scheme: &str, id: u64, document: &MathDocument) -> Result<String> {
    Ok(format!("{}://{},{}", scheme, id, encode_payload(document)?))
}

/// Request id of a script built by [`pull_script`]
pub fn pull_request_id(scheme: &str, script: &str) -> Option<u64> {
    let marker = format!("\"{}://", scheme);
    let start = script.find(&marker)? + marker.len();
    let rest = &script[start..];
    let end = rest.find(',')?;
    rest[..end].parse().ok()
}

/// Arguments of a script built by [`set_state_script`]
pub fn parse_set_state_script(script: &str) -> Option<(String, String)> {
    let args = script.strip_prefix(SET_STATE_CALL)?.strip_suffix(')')?;
    serde_json::from_str(&format!("[{}]", args)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEME: &str = "mathpaste-gtk-data";

    #[test]
    fn test_set_state_script_escapes_text() {
        let doc = MathDocument::with_drawing("\"quoted\"\n\\", "abc", "data:image/png;base64,");
        let script = set_state_script(&doc).unwrap();
        assert_eq!(
            script,
            r#"mathpaste.setMathAndImage("\"quoted\"\n\\", "abc")"#
        );
        assert_eq!(
            parse_set_state_script(&script),
            Some(("\"quoted\"\n\\".to_string(), "abc".to_string()))
        );
    }

    #[test]
    fn test_pull_script_carries_id() {
        let script = pull_script(SCHEME, 42);
        assert!(script.contains("\"mathpaste-gtk-data://42,\""));
        assert_eq!(pull_request_id(SCHEME, &script), Some(42));
        assert_eq!(pull_request_id(SCHEME, "mathpaste.getMathAndImage()"), None);
    }

    #[test]
    fn test_parse_changed() {
        assert_eq!(
            parse_data_uri(SCHEME, "mathpaste-gtk-data://changed").unwrap(),
            IncomingMessage::Changed
        );
        assert_eq!(
            parse_data_uri(SCHEME, "mathpaste-gtk-data://changed/").unwrap(),
            IncomingMessage::Changed
        );
    }

    #[test]
    fn test_response_roundtrip() {
        let doc = MathDocument::new("x^2 + ∑");
        let uri = response_uri(SCHEME, 7, &doc).unwrap();

        match parse_data_uri(SCHEME, &uri).unwrap() {
            IncomingMessage::Response { id, payload } => {
                assert_eq!(id, 7);
                assert_eq!(decode_payload(&payload).unwrap(), doc);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_payload_with_commas_splits_once() {
        let doc = MathDocument::new("a, b, c");
        let uri = format!("{}://3,{}", SCHEME, encode_payload(&doc).unwrap());
        let IncomingMessage::Response { payload, .. } = parse_data_uri(SCHEME, &uri).unwrap() else {
            panic!("expected response");
        };
        assert_eq!(decode_payload(&payload).unwrap().math_text, "a, b, c");
    }

    #[test]
    fn test_malformed_uris() {
        assert!(parse_data_uri(SCHEME, "https://example.com").is_err());
        assert!(parse_data_uri(SCHEME, "mathpaste-gtk-data://nocomma").is_err());
        assert!(parse_data_uri(SCHEME, "mathpaste-gtk-data://x,abc").is_err());
    }

    #[test]
    fn test_garbage_payload_is_protocol_error() {
        let payload = lz_str::compress_to_encoded_uri_component("not json");
        assert!(matches!(
            decode_payload(&payload),
            Err(CoreError::ProtocolDecode(_))
        ));
    }
}
