//! Transport abstraction.
//!
//! The executor never talks to the network directly; it launches an exchange
//! through an injectable [`Transport`] and observes it as a stream of signals.
//! A transport reports readiness progress, a terminal snapshot, or an
//! error/timeout condition, and honors an abort token. The production
//! implementation lives in [`reqwest`](crate::transport::reqwest); tests and
//! embedders can substitute anything that speaks the same signals.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::types::{Body, ResponseData, ResponseType};

pub mod reqwest;

/// Wire-level description of one exchange, handed to a transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method, uppercased.
    pub method: String,
    /// Target URL, passed through untouched.
    pub url: String,
    /// Header pairs, applied verbatim.
    pub headers: Vec<(String, String)>,
    /// Request payload, `None` when the request carries no body.
    pub body: Option<Body>,
    /// Transport-native deadline covering the whole exchange.
    pub timeout: Option<Duration>,
    /// Decode hint for the response body.
    pub response_type: ResponseType,
}

/// Terminal snapshot of one exchange.
#[derive(Debug, Clone)]
pub struct TransportReply {
    /// HTTP status code; `0` marks an aborted or never-connected exchange.
    pub status: u16,
    /// Status reason phrase (may be empty).
    pub status_text: String,
    /// Body in the transport's native decoded form.
    pub body: ResponseData,
    /// Text decoding of the body, when the transport offers one.
    pub body_text: Option<String>,
    /// Raw response-header blob (`Name: value` lines).
    pub raw_headers: String,
}

/// Readiness states of one exchange. Only `Done` is terminal.
#[derive(Debug, Clone)]
pub enum Readiness {
    /// The native request is constructed.
    Opened,
    /// Status line and headers have arrived.
    HeadersReceived,
    /// The body is being received.
    Loading,
    /// The exchange finished; the terminal snapshot is attached.
    Done(TransportReply),
}

/// Signals a transport emits while performing an exchange.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Readiness progressed.
    Readiness(Readiness),
    /// Transport-level failure; the exchange will not complete.
    Error,
    /// The transport-native deadline elapsed.
    Timeout,
}

/// Sending half of the signal feed, handed to a transport.
///
/// Once the outcome is settled the receiving half is gone and sends become
/// silent no-ops, so transports may keep reporting without checking.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl SignalSender {
    fn new(tx: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self { tx }
    }

    /// Report a readiness change.
    pub fn readiness(&self, state: Readiness) {
        let _ = self.tx.send(TransportEvent::Readiness(state));
    }

    /// Report a transport-level failure.
    pub fn error(&self) {
        let _ = self.tx.send(TransportEvent::Error);
    }

    /// Report that the transport-native deadline elapsed.
    pub fn timeout(&self) {
        let _ = self.tx.send(TransportEvent::Timeout);
    }
}

/// Performs one HTTP exchange.
///
/// Implementations report progress through `signals` and honor `abort`: once
/// the token trips they drop the native request as soon as possible. An
/// exchange that ends without an HTTP response is conventionally reported as
/// a terminal snapshot with status `0`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(
        &self,
        request: TransportRequest,
        signals: SignalSender,
        abort: CancellationToken,
    );
}

/// The live half of one dispatched exchange.
///
/// Exclusively owned by a single executor call and never reused. Dropping the
/// flight trips the abort token, so abandoning the outcome also aborts the
/// exchange.
pub struct Flight {
    /// Event feed; closes when the transport task finishes.
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
    abort: CancellationToken,
    _guard: DropGuard,
}

impl Flight {
    /// Spawn `transport.perform(request, ..)` and keep the observing half.
    pub fn launch(transport: Arc<dyn Transport>, request: TransportRequest) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let abort = CancellationToken::new();
        let signals = SignalSender::new(tx);
        let token = abort.clone();
        tokio::spawn(async move {
            transport.perform(request, signals, token).await;
        });
        Self {
            events: rx,
            _guard: abort.clone().drop_guard(),
            abort,
        }
    }

    /// Trip the abort token. Immediate and unconditional; safe to call more
    /// than once.
    pub fn abort(&self) {
        self.abort.cancel();
    }

    /// A clone of the abort token, usable without borrowing the flight.
    pub fn aborter(&self) -> CancellationToken {
        self.abort.clone()
    }
}
