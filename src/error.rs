//! Classified request errors.
//!
//! Every failure an exchange can produce maps onto exactly one variant here,
//! and every variant carries the originating config plus the request context,
//! so callers never receive an error they cannot trace back to a dispatch.

use std::sync::Arc;

use crate::types::{RequestConfig, RequestContext, Response};

/// Error for a settled exchange.
///
/// Callers branch on [`Error::code`], [`Error::is_cancelled`] or
/// [`Error::response`] rather than parsing the display message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure: the connection never completed.
    #[error("Network Error")]
    Network {
        config: Arc<RequestConfig>,
        context: RequestContext,
    },

    /// The transport-native deadline elapsed before terminal readiness.
    #[error("Timeout of {timeout_ms} ms exceeded")]
    Timeout {
        timeout_ms: u64,
        config: Arc<RequestConfig>,
        context: RequestContext,
    },

    /// The round trip completed with a status outside `[200, 300)`.
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        config: Arc<RequestConfig>,
        context: RequestContext,
        response: Box<Response>,
    },

    /// The caller cancelled the exchange; the reason is caller-supplied.
    #[error("{reason}")]
    Cancelled {
        reason: String,
        config: Arc<RequestConfig>,
        context: RequestContext,
    },
}

impl Error {
    /// Transport-level failure, no response available.
    pub fn network(config: Arc<RequestConfig>, context: RequestContext) -> Self {
        Error::Network { config, context }
    }

    /// Timeout failure for a deadline of `timeout_ms` milliseconds.
    pub fn timeout(timeout_ms: u64, config: Arc<RequestConfig>, context: RequestContext) -> Self {
        Error::Timeout {
            timeout_ms,
            config,
            context,
        }
    }

    /// HTTP-level failure; the full response stays attached so callers can
    /// read the error payload.
    pub fn status(response: Response) -> Self {
        Error::Status {
            status: response.status,
            config: response.config.clone(),
            context: response.context.clone(),
            response: Box::new(response),
        }
    }

    /// Cancellation failure with the caller-supplied reason.
    pub fn cancelled<S: Into<String>>(
        reason: S,
        config: Arc<RequestConfig>,
        context: RequestContext,
    ) -> Self {
        Error::Cancelled {
            reason: reason.into(),
            config,
            context,
        }
    }

    /// Machine-readable code; `ECONNABORTED` marks timeouts, everything else
    /// carries none.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Error::Timeout { .. } => Some("ECONNABORTED"),
            _ => None,
        }
    }

    /// The config the failing exchange was dispatched with.
    pub fn config(&self) -> &RequestConfig {
        match self {
            Error::Network { config, .. }
            | Error::Timeout { config, .. }
            | Error::Status { config, .. }
            | Error::Cancelled { config, .. } => config,
        }
    }

    /// The context of the failing dispatch.
    pub fn context(&self) -> &RequestContext {
        match self {
            Error::Network { context, .. }
            | Error::Timeout { context, .. }
            | Error::Status { context, .. }
            | Error::Cancelled { context, .. } => context,
        }
    }

    /// The response, present only for HTTP-level failures.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Status { response, .. } => Some(response),
            _ => None,
        }
    }

    /// The failing status code, present only for HTTP-level failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error comes from caller cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }

    /// Whether this error comes from the transport-native deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}
