//! Proxy state shared between the listener and the TUI

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::aura::Inspector;
use crate::config::Config;
use crate::events::ProxyEvent;
use crate::history::{Origin, SharedHistory};
use crate::http::HttpRequest;

use super::error::ProxyError;

/// Headers that describe the client connection, not the request
const HOP_BY_HOP: [&str; 9] = [
    "host",
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub(super) fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// What came back from upstream
pub(super) struct Upstream {
    pub status: u16,
    pub headers: reqwest::header::HeaderMap,
    pub body: Bytes,
    pub duration: Duration,
}

/// Shared state for the proxy server
#[derive(Clone)]
pub struct ProxyState {
    /// HTTP client for forwarding requests
    client: reqwest::Client,
    /// Prefix for origin-form targets
    upstream_url: String,
    /// Captured traffic
    history: SharedHistory,
    /// Live inspector (caches the last seen snapshot for new editors)
    inspector: Arc<Mutex<Inspector>>,
    /// Channel for notifying the TUI
    event_tx: mpsc::Sender<ProxyEvent>,
}

impl ProxyState {
    pub fn new(
        config: &Config,
        history: SharedHistory,
        inspector: Arc<Mutex<Inspector>>,
        event_tx: mpsc::Sender<ProxyEvent>,
    ) -> Result<Self> {
        // Bodies are relayed as received, so no transparent decompression.
        // System proxy settings are ignored; we are the proxy.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(10)
            .no_gzip()
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            upstream_url: config.upstream_url.clone(),
            history,
            inspector,
            event_tx,
        })
    }

    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    /// Send an event to the TUI
    /// Errors are ignored so a closed or slow receiver never blocks the proxy
    pub(super) async fn send_event(&self, event: ProxyEvent) {
        let _ = self.event_tx.send(event).await;
    }

    fn lock_inspector(&self) -> MutexGuard<'_, Inspector> {
        self.inspector.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Inspect a request and store it in history. Returns the entry id and
    /// whether it was highlighted.
    pub(super) fn capture(&self, request: &HttpRequest, origin: Origin) -> (u64, bool) {
        let inspection = self.lock_inspector().inspect(request);
        let matched = inspection.matched();
        let id = self
            .history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone(), origin, inspection.highlight);

        if matched {
            tracing::debug!(id, "Aura request captured: {}", request);
        }
        (id, matched)
    }

    pub(super) fn record(&self, id: u64, status: u16, duration: Duration) {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record_response(id, status, duration);
    }

    /// Send a request upstream as-is (minus hop-by-hop headers)
    pub(super) async fn forward(&self, request: &HttpRequest) -> Result<Upstream, ProxyError> {
        let start = Instant::now();
        let url = request.url(&self.upstream_url);

        let method = reqwest::Method::from_bytes(request.method().as_bytes())
            .map_err(|e| ProxyError::Upstream(format!("Invalid HTTP method: {}", e)))?;

        let mut forward_req = self
            .client
            .request(method, &url)
            .body(request.body().clone());

        for (name, value) in request.headers() {
            // Length is recomputed from the body we send
            if is_hop_by_hop(name) || name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            forward_req = forward_req.header(name.as_str(), value.as_str());
        }

        let response = forward_req
            .send()
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::BodyRead(e.to_string()))?;

        Ok(Upstream {
            status,
            headers,
            body,
            duration: start.elapsed(),
        })
    }

    /// Send an edited request upstream and record it as a new history entry
    pub async fn replay(self, request: HttpRequest, source: Option<u64>) -> Result<u64, ProxyError> {
        let (id, _) = self.capture(&request, Origin::Replay);
        tracing::info!(id, ?source, "Replaying {}", request);

        match self.forward(&request).await {
            Ok(upstream) => {
                self.record(id, upstream.status, upstream.duration);
                self.send_event(ProxyEvent::Replayed {
                    id,
                    source,
                    status: upstream.status,
                    duration: upstream.duration,
                })
                .await;
                Ok(id)
            }
            Err(e) => {
                tracing::error!("Replay failed: {}", e);
                self.send_event(ProxyEvent::error(e.to_string(), Some("replay".into())))
                    .await;
                Err(e)
            }
        }
    }
}
