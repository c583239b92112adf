//! Request executor.
//!
//! Owns the lifecycle of a single exchange: normalize the config, launch the
//! transport, watch for cancellation, then settle exactly once with either a
//! normalized response or a classified error. The first terminal signal wins;
//! everything the transport reports afterwards dies against a closed feed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Error;
use crate::headers;
use crate::transport::reqwest::ReqwestTransport;
use crate::transport::{Flight, Readiness, Transport, TransportEvent, TransportRequest};
use crate::types::{RequestConfig, RequestContext, Response, ResponseData, ResponseType};

/// Executes single-shot requests through an injected transport.
#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestTransport::default()))
    }
}

impl Executor {
    /// Create an executor over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Perform one exchange.
    ///
    /// The returned future settles exactly once: `Ok` for a completed round
    /// trip with a status in `[200, 300)`, `Err` for everything else (HTTP
    /// failure with the response attached, transport failure, timeout, or
    /// caller cancellation).
    ///
    /// The executor owns a working copy of `config`. When `data` is `None`,
    /// any `Content-Type` entry is removed from its headers before dispatch;
    /// the config reachable from the outcome reflects that removal.
    pub async fn execute(&self, mut config: RequestConfig) -> Result<Response, Error> {
        if config.data.is_none() {
            headers::remove_content_type(&mut config.headers);
        }

        let method = config.method.to_ascii_uppercase();
        let context = RequestContext::generate(method.clone(), config.url.clone());
        let deadline = config.timeout.filter(|t| !t.is_zero());

        let request = TransportRequest {
            method,
            url: config.url.clone(),
            headers: config
                .headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            body: config.data.clone(),
            timeout: deadline,
            response_type: config.response_type.unwrap_or_default(),
        };
        let response_type = request.response_type;
        let cancel = config.cancel_token.clone();
        let config = Arc::new(config);

        tracing::debug!(
            "dispatching {} {} ({})",
            context.method,
            context.url,
            context.request_id
        );

        let started = Instant::now();
        let mut flight = Flight::launch(self.transport.clone(), request);
        let abort = flight.aborter();

        let cancelled = async move {
            match cancel {
                Some(handle) => handle.cancelled().await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(cancelled);

        loop {
            // Cancellation is checked first so a reason that arrived before a
            // terminal signal always wins the settlement.
            tokio::select! {
                biased;
                reason = &mut cancelled => {
                    abort.cancel();
                    tracing::debug!("request {} cancelled: {reason}", context.request_id);
                    return Err(Error::cancelled(reason, config, context));
                }
                event = flight.events.recv() => match event {
                    Some(TransportEvent::Readiness(Readiness::Done(reply))) if reply.status != 0 => {
                        let data = match (response_type, reply.body_text) {
                            (ResponseType::Text, Some(text)) => ResponseData::Text(text),
                            (_, _) => reply.body,
                        };
                        let response = Response {
                            data,
                            status: reply.status,
                            status_text: reply.status_text,
                            headers: headers::parse_headers(&reply.raw_headers),
                            config,
                            context,
                        };
                        return settle(response);
                    }
                    // Progress and status-0 snapshots are not settlements.
                    Some(TransportEvent::Readiness(_)) => {}
                    Some(TransportEvent::Error) => {
                        tracing::debug!("request {} hit a transport failure", context.request_id);
                        return Err(Error::network(config, context));
                    }
                    Some(TransportEvent::Timeout) => {
                        tracing::debug!("request {} timed out", context.request_id);
                        // Without a configured deadline (the transport may
                        // carry its own) the elapsed time stands in.
                        let timeout_ms = deadline
                            .map(deadline_millis)
                            .unwrap_or_else(|| started.elapsed().as_millis() as u64);
                        return Err(Error::timeout(timeout_ms, config, context));
                    }
                    None => {
                        tracing::warn!(
                            "transport for request {} went away without a terminal signal",
                            context.request_id
                        );
                        return Err(Error::network(config, context));
                    }
                }
            }
        }
    }
}

/// Milliseconds figure for the timeout message; sub-millisecond deadlines
/// round up rather than reading as zero.
fn deadline_millis(deadline: Duration) -> u64 {
    deadline.as_nanos().div_ceil(1_000_000) as u64
}

/// Classify a completed round trip by its status code.
fn settle(response: Response) -> Result<Response, Error> {
    if (200..300).contains(&response.status) {
        tracing::debug!(
            "request {} completed with status {}",
            response.context.request_id,
            response.status
        );
        Ok(response)
    } else {
        tracing::debug!(
            "request {} failed with status {}",
            response.context.request_id,
            response.status
        );
        Err(Error::status(response))
    }
}
