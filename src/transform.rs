//! Default body transforms.
//!
//! Optional helpers callers can apply around `execute`: structured request
//! bodies become wire text, and textual response bodies are upgraded to JSON
//! when they parse. The executor itself never invokes these.

use crate::types::{Body, ResponseData};

/// Turn a structured body into its wire-text form.
///
/// `Json` bodies are stringified; text and binary bodies pass through.
pub fn transform_request(data: Option<Body>) -> Option<Body> {
    match data {
        Some(Body::Json(value)) => Some(Body::Text(value.to_string())),
        other => other,
    }
}

/// Try to parse textual response data as JSON.
///
/// Malformed text is kept as-is; non-text data passes through.
pub fn transform_response(data: ResponseData) -> ResponseData {
    match data {
        ResponseData::Text(text) => match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => ResponseData::Json(value),
            Err(_) => ResponseData::Text(text),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_transform_stringifies_json_bodies() {
        let body = transform_request(Some(Body::Json(serde_json::json!({"a": 1}))));
        assert_eq!(body, Some(Body::Text("{\"a\":1}".to_string())));
    }

    #[test]
    fn request_transform_passes_text_and_none_through() {
        assert_eq!(
            transform_request(Some(Body::Text("raw".to_string()))),
            Some(Body::Text("raw".to_string()))
        );
        assert_eq!(transform_request(None), None);
    }

    #[test]
    fn response_transform_parses_well_formed_json() {
        let data = transform_response(ResponseData::Text("{\"ok\":true}".to_string()));
        assert_eq!(data, ResponseData::Json(serde_json::json!({"ok": true})));
    }

    #[test]
    fn response_transform_keeps_malformed_text() {
        let data = transform_response(ResponseData::Text("not json".to_string()));
        assert_eq!(data, ResponseData::Text("not json".to_string()));
    }

    #[test]
    fn response_transform_passes_bytes_through() {
        let data = transform_response(ResponseData::Bytes(bytes::Bytes::from_static(b"\x00\x01")));
        assert_eq!(data, ResponseData::Bytes(bytes::Bytes::from_static(b"\x00\x01")));
    }
}
