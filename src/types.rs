//! Request and response types.
//!
//! This module defines `RequestConfig` and its builder (everything a single
//! exchange needs: URL, method, headers, body, decode hint, timeout and an
//! optional cancellation handle), plus the normalized `Response` the executor
//! produces and the `RequestContext` that ties outcomes back to a dispatch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cancel::CancelHandle;

/// Request body payload.
///
/// `Json` values are serialized by the transport at send time; no content-type
/// header is injected on their behalf, callers set their own.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// UTF-8 text payload.
    Text(String),
    /// Raw binary payload.
    Bytes(bytes::Bytes),
    /// Structured JSON payload.
    Json(serde_json::Value),
}

impl Body {
    /// Serialize any `Serialize` value into a JSON body.
    pub fn serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Body::Json)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Text(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::Bytes(bytes::Bytes::from(value))
    }
}

impl From<bytes::Bytes> for Body {
    fn from(value: bytes::Bytes) -> Self {
        Body::Bytes(value)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

/// How the transport should decode the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Transport default (text).
    #[default]
    Default,
    /// Force the text decoding, even when the transport offers another form.
    Text,
    /// Parse the body as JSON; malformed bodies fall back to their raw text.
    Json,
    /// Raw bytes, no text decoding offered.
    Bytes,
}

/// Response body in the transport's decoded form.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    /// Text decoding.
    Text(String),
    /// Parsed JSON value.
    Json(serde_json::Value),
    /// Raw bytes.
    Bytes(bytes::Bytes),
}

/// Configuration for a single exchange.
///
/// The executor takes this by value and owns a working copy. When `data` is
/// `None`, any `Content-Type` entry is removed from the working headers before
/// dispatch, and the config reachable from the outcome reflects that removal.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Target URL, fully formed (no base joining happens here).
    pub url: String,
    /// HTTP method; stored as given, uppercased on the wire. Defaults to `get`.
    pub method: String,
    /// Request body, `None` when the request carries no payload.
    pub data: Option<Body>,
    /// Request headers, passed to the transport verbatim.
    pub headers: HashMap<String, String>,
    /// Response decode hint.
    pub response_type: Option<ResponseType>,
    /// Transport-native deadline; `None` or zero disables it.
    pub timeout: Option<Duration>,
    /// Cooperative cancellation handle.
    pub cancel_token: Option<CancelHandle>,
}

impl RequestConfig {
    /// Create a config with defaults: GET, no body, no headers, no timeout.
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            method: "get".to_string(),
            data: None,
            headers: HashMap::new(),
            response_type: None,
            timeout: None,
            cancel_token: None,
        }
    }

    /// Returns a builder for constructing `RequestConfig`.
    pub fn builder<S: Into<String>>(url: S) -> RequestConfigBuilder {
        RequestConfigBuilder::new(url)
    }
}

/// Builder for `RequestConfig` to construct a request in a unified and safe way.
#[derive(Debug, Clone)]
pub struct RequestConfigBuilder {
    config: RequestConfig,
}

impl RequestConfigBuilder {
    /// Create a new builder for the given URL.
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            config: RequestConfig::new(url),
        }
    }

    pub fn method<S: Into<String>>(mut self, method: S) -> Self {
        self.config.method = method.into();
        self
    }
    pub fn data<B: Into<Body>>(mut self, data: B) -> Self {
        self.config.data = Some(data.into());
        self
    }
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.config.headers.extend(headers);
        self
    }
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.config.response_type = Some(response_type);
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }
    pub fn cancel_token(mut self, handle: CancelHandle) -> Self {
        self.config.cancel_token = Some(handle);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> RequestConfig {
        self.config
    }
}

/// Diagnostic handle for one dispatched exchange.
///
/// Generated once per `execute` call and cloned into both the response and
/// every error, so callers can correlate outcomes with logs.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique id for this dispatch.
    pub request_id: String,
    /// Method as sent on the wire (uppercased).
    pub method: String,
    /// Target URL.
    pub url: String,
}

impl RequestContext {
    /// Generate a fresh context with a random request id.
    pub fn generate<M: Into<String>, U: Into<String>>(method: M, url: U) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            method: method.into(),
            url: url.into(),
        }
    }
}

/// Normalized response for a completed round trip.
#[derive(Debug, Clone)]
pub struct Response {
    /// Body in the transport's decoded form, or the text decoding when the
    /// hint was `ResponseType::Text` and the transport offered one.
    pub data: ResponseData,
    /// HTTP status code.
    pub status: u16,
    /// Status reason phrase (may be empty).
    pub status_text: String,
    /// Response headers with lower-cased names and trimmed values.
    pub headers: HashMap<String, String>,
    /// The originating config, preserved for traceability.
    pub config: Arc<RequestConfig>,
    /// The dispatch this response answers.
    pub context: RequestContext,
}

impl Response {
    /// Deserialize the body into a typed value.
    ///
    /// Works for `Json` data and for `Text`/`Bytes` data that holds JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.data {
            ResponseData::Json(value) => serde_json::from_value(value.clone()),
            ResponseData::Text(text) => serde_json::from_str(text),
            ResponseData::Bytes(bytes) => serde_json::from_slice(bytes),
        }
    }
}
