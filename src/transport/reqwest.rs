//! reqwest-backed transport.
//!
//! The production [`Transport`]: one shared `reqwest::Client`, per-request
//! deadlines, and the signal vocabulary mapped onto reqwest's behavior.
//! Connection reuse, TLS and redirects stay whatever the injected client is
//! configured to do.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::headers::render_headers;
use crate::transport::{Readiness, SignalSender, Transport, TransportReply, TransportRequest};
use crate::types::{Body, ResponseData, ResponseType};

/// Transport over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client (and inherit its pool, TLS and proxy setup).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn perform(
        &self,
        request: TransportRequest,
        signals: SignalSender,
        abort: CancellationToken,
    ) {
        let method = match reqwest::Method::from_bytes(request.method.as_bytes()) {
            Ok(method) => method,
            Err(err) => {
                tracing::debug!("invalid method {:?}: {err}", request.method);
                signals.error();
                return;
            }
        };

        let mut rb = self.client.request(method, &request.url);
        signals.readiness(Readiness::Opened);

        for (name, value) in &request.headers {
            rb = rb.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            rb = rb.timeout(timeout);
        }
        match &request.body {
            None => {}
            Some(Body::Text(text)) => rb = rb.body(text.clone()),
            Some(Body::Bytes(bytes)) => rb = rb.body(bytes.clone()),
            Some(Body::Json(value)) => match serde_json::to_vec(value) {
                Ok(raw) => rb = rb.body(raw),
                Err(err) => {
                    tracing::debug!("failed to serialize request body: {err}");
                    signals.error();
                    return;
                }
            },
        }

        tokio::select! {
            _ = abort.cancelled() => {
                signals.readiness(Readiness::Done(aborted_reply()));
            }
            sent = rb.send() => match sent {
                Err(err) if err.is_timeout() => signals.timeout(),
                Err(err) => {
                    tracing::debug!("request failed: {err}");
                    signals.error();
                }
                Ok(response) => {
                    signals.readiness(Readiness::HeadersReceived);
                    signals.readiness(Readiness::Loading);
                    tokio::select! {
                        _ = abort.cancelled() => {
                            signals.readiness(Readiness::Done(aborted_reply()));
                        }
                        reply = read_reply(response, request.response_type) => match reply {
                            Ok(reply) => signals.readiness(Readiness::Done(reply)),
                            Err(err) if err.is_timeout() => signals.timeout(),
                            Err(err) => {
                                tracing::debug!("reading response failed: {err}");
                                signals.error();
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Snapshot for an exchange that ended without an HTTP response.
fn aborted_reply() -> TransportReply {
    TransportReply {
        status: 0,
        status_text: String::new(),
        body: ResponseData::Text(String::new()),
        body_text: None,
        raw_headers: String::new(),
    }
}

/// Decode the terminal snapshot per the hint.
async fn read_reply(
    response: reqwest::Response,
    hint: ResponseType,
) -> Result<TransportReply, reqwest::Error> {
    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or_default().to_string();
    let pairs: Vec<(String, String)> = response
        .headers()
        .iter()
        .filter_map(|(k, v)| {
            v.to_str()
                .ok()
                .map(|v_str| (k.as_str().to_string(), v_str.to_string()))
        })
        .collect();
    let raw_headers = render_headers(&pairs);

    let (body, body_text) = match hint {
        ResponseType::Bytes => {
            let bytes = response.bytes().await?;
            (ResponseData::Bytes(bytes), None)
        }
        ResponseType::Json => {
            let text = response.text().await?;
            match serde_json::from_str(&text) {
                Ok(value) => (ResponseData::Json(value), Some(text)),
                // Malformed bodies keep their raw text so nothing is lost.
                Err(_) => (ResponseData::Text(text.clone()), Some(text)),
            }
        }
        ResponseType::Default | ResponseType::Text => {
            let text = response.text().await?;
            (ResponseData::Text(text.clone()), Some(text))
        }
    };

    Ok(TransportReply {
        status: status.as_u16(),
        status_text,
        body,
        body_text,
        raw_headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Flight, TransportEvent};
    use std::sync::Arc;
    use std::time::Duration;

    fn request(url: String, response_type: ResponseType) -> TransportRequest {
        TransportRequest {
            method: "GET".to_string(),
            url,
            headers: Vec::new(),
            body: None,
            timeout: None,
            response_type,
        }
    }

    async fn terminal_reply(mut flight: Flight) -> TransportReply {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), flight.events.recv())
                .await
                .expect("transport should report")
                .expect("feed should stay open until terminal");
            match event {
                TransportEvent::Readiness(Readiness::Done(reply)) => return reply,
                TransportEvent::Readiness(_) => continue,
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn reports_progress_and_a_terminal_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/ok")
            .with_status(200)
            .with_header("X-Probe", "yes")
            .with_body("ok")
            .create_async()
            .await;

        let transport = Arc::new(ReqwestTransport::default());
        let mut flight = Flight::launch(
            transport,
            request(format!("{}/ok", server.url()), ResponseType::Default),
        );

        let first = flight.events.recv().await;
        assert!(matches!(
            first,
            Some(TransportEvent::Readiness(Readiness::Opened))
        ));

        let reply = terminal_reply(flight).await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.status_text, "OK");
        assert_eq!(reply.body, ResponseData::Text("ok".to_string()));
        assert_eq!(reply.body_text.as_deref(), Some("ok"));
        assert!(reply.raw_headers.to_ascii_lowercase().contains("x-probe: yes"));
    }

    #[tokio::test]
    async fn json_hint_parses_the_body_and_keeps_its_text() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/data")
            .with_status(200)
            .with_body("{\"n\":1}")
            .create_async()
            .await;

        let transport = Arc::new(ReqwestTransport::default());
        let flight = Flight::launch(
            transport,
            request(format!("{}/data", server.url()), ResponseType::Json),
        );

        let reply = terminal_reply(flight).await;
        assert_eq!(reply.body, ResponseData::Json(serde_json::json!({"n": 1})));
        assert_eq!(reply.body_text.as_deref(), Some("{\"n\":1}"));
    }

    #[tokio::test]
    async fn json_hint_falls_back_to_text_on_malformed_bodies() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/broken")
            .with_status(200)
            .with_body("{not json")
            .create_async()
            .await;

        let transport = Arc::new(ReqwestTransport::default());
        let flight = Flight::launch(
            transport,
            request(format!("{}/broken", server.url()), ResponseType::Json),
        );

        let reply = terminal_reply(flight).await;
        assert_eq!(reply.body, ResponseData::Text("{not json".to_string()));
    }

    #[tokio::test]
    async fn unreachable_hosts_signal_a_transport_failure() {
        let transport = Arc::new(ReqwestTransport::default());
        let mut flight = Flight::launch(
            transport,
            request("http://127.0.0.1:1/".to_string(), ResponseType::Default),
        );

        loop {
            let event = tokio::time::timeout(Duration::from_secs(10), flight.events.recv())
                .await
                .expect("transport should report")
                .expect("feed should stay open until the failure");
            match event {
                TransportEvent::Error => break,
                TransportEvent::Readiness(Readiness::Done(reply)) => {
                    panic!("unexpected terminal snapshot: {reply:?}")
                }
                TransportEvent::Readiness(_) => continue,
                TransportEvent::Timeout => panic!("unexpected timeout"),
            }
        }
    }

    #[tokio::test]
    async fn invalid_urls_signal_a_transport_failure() {
        let transport = Arc::new(ReqwestTransport::default());
        let mut flight = Flight::launch(
            transport,
            request("not a url".to_string(), ResponseType::Default),
        );

        loop {
            match flight.events.recv().await {
                Some(TransportEvent::Error) => break,
                Some(TransportEvent::Readiness(_)) => continue,
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }
}
