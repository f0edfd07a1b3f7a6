//! The snapshot record and its preview encoding.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use sketchbook_core::{EditorState, VectorImage};

/// Prefix of every preview data URI we produce.
pub const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Prefix of generated snapshot ids.
pub const SNAPSHOT_ID_PREFIX: &str = "snapshot-";

/// A persisted capture of the editor state plus a rendered thumbnail.
///
/// Field order is the wire order; keep it stable so stored JSON re-serializes
/// byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub data: EditorState,
    /// `data:image/svg+xml;base64,...`
    pub preview: String,
}

impl Snapshot {
    /// SVG bytes behind the preview URI, if it decodes.
    pub fn preview_svg(&self) -> Option<Vec<u8>> {
        decode_data_uri(&self.preview)
    }
}

/// Everything a snapshot needs except its id, which is assigned on commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSnapshot {
    pub timestamp: i64,
    pub data: EditorState,
    pub preview: String,
}

impl CapturedSnapshot {
    pub fn new(timestamp: i64, data: EditorState, image: &VectorImage) -> Self {
        Self {
            timestamp,
            data,
            preview: svg_data_uri(image.as_svg()),
        }
    }
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Encode SVG markup as a base64 data URI usable as an image source.
pub fn svg_data_uri(svg: &str) -> String {
    format!("{SVG_DATA_URI_PREFIX}{}", BASE64.encode(svg.as_bytes()))
}

/// Decode a base64 data URI into its payload bytes.
///
/// Only `;base64` URIs are accepted; the media type is not checked.
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    BASE64.decode(payload).ok()
}

/// Time-based id, suffixed with a counter when the base is already taken.
pub fn snapshot_id(timestamp: i64, mut taken: impl FnMut(&str) -> bool) -> String {
    let base = format!("{SNAPSHOT_ID_PREFIX}{timestamp}");
    if !taken(&base) {
        return base;
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_uri_decodes_back_to_svg() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;
        let uri = svg_data_uri(svg);

        assert!(uri.starts_with(SVG_DATA_URI_PREFIX));
        assert_eq!(decode_data_uri(&uri).as_deref(), Some(svg.as_bytes()));
    }

    #[test]
    fn non_base64_uri_is_rejected() {
        assert_eq!(decode_data_uri("data:image/svg+xml,<svg/>"), None);
        assert_eq!(decode_data_uri("not a uri"), None);
        assert_eq!(decode_data_uri("data:image/svg+xml;base64,@@@"), None);
    }

    #[test]
    fn id_uses_timestamp_and_skips_taken() {
        assert_eq!(snapshot_id(42, |_| false), "snapshot-42");

        let taken = ["snapshot-42", "snapshot-42-1"];
        assert_eq!(snapshot_id(42, |id| taken.contains(&id)), "snapshot-42-2");
    }

    #[test]
    fn record_serializes_in_wire_order() {
        let snapshot = Snapshot {
            id: "snapshot-1".into(),
            timestamp: 1,
            data: EditorState::new(json!({ "shapes": [] })),
            preview: svg_data_uri("<svg/>"),
        };

        let text = serde_json::to_string(&snapshot).unwrap();
        assert!(text.starts_with(r#"{"id":"snapshot-1","timestamp":1,"data":{"shapes":[]},"preview":"#));
    }
}
