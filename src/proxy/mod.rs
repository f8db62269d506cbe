// Proxy module - HTTP server that captures and forwards Aura traffic
//
// Every request that passes through is turned into an `HttpRequest`,
// inspected for watched Aura parameters, stored in history (highlighted
// when it matches) and forwarded unchanged. The upstream response is
// relayed back byte for byte.

mod error;
mod server;
mod state;

pub use error::ProxyError;
pub use server::{router, start_proxy};
pub use state::ProxyState;

use crate::events::ProxyEvent;
use crate::history::Origin;
use crate::http::HttpRequest;
use axum::{
    body::Body,
    extract::State,
    http::{request::Parts, Request, Response},
};
use bytes::Bytes;
use chrono::Utc;

/// Main proxy handler - captures and forwards all requests
async fn proxy_handler(
    State(state): State<ProxyState>,
    req: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let (parts, body) = req.into_parts();

    tracing::debug!("Proxying {} {}", parts.method, parts.uri);

    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| ProxyError::BodyRead(e.to_string()))?;

    let request = to_http_request(&parts, body_bytes);
    let (id, matched) = state.capture(&request, Origin::Proxy);

    state
        .send_event(ProxyEvent::Captured {
            id,
            timestamp: Utc::now(),
            method: request.method().to_string(),
            url: request.target().to_string(),
            matched,
        })
        .await;

    let upstream = match state.forward(&request).await {
        Ok(upstream) => upstream,
        Err(e) => {
            state
                .send_event(ProxyEvent::error(e.to_string(), Some(request.to_string())))
                .await;
            return Err(e);
        }
    };

    state.record(id, upstream.status, upstream.duration);
    state
        .send_event(ProxyEvent::Completed {
            id,
            status: upstream.status,
            duration: upstream.duration,
        })
        .await;

    // Convert reqwest's response parts to axum's via u16 and raw bytes
    let mut builder = Response::builder().status(upstream.status);
    for (key, value) in upstream.headers.iter() {
        if state::is_hop_by_hop(key.as_str()) {
            continue;
        }
        builder = builder.header(key.as_str(), value.as_bytes().to_vec());
    }

    builder
        .body(Body::from(upstream.body))
        .map_err(|e| ProxyError::ResponseBuild(e.to_string()))
}

/// Rebuild the request the client sent from axum's parts
fn to_http_request(parts: &Parts, body: Bytes) -> HttpRequest {
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    HttpRequest::new(
        parts.method.as_str(),
        parts.uri.to_string(),
        format!("{:?}", parts.version),
        headers,
        body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::{HighlightColor, HighlightSettings, Inspector, ParamRequest};
    use crate::config::Config;
    use crate::history::History;
    use axum::routing::post;
    use axum::Router;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    async fn spawn(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn test_to_http_request_keeps_target_and_headers() {
        let req = Request::builder()
            .method("POST")
            .uri("/s/sfsites/aura?r=1")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();

        let request = to_http_request(&parts, Bytes::from_static(b"message=%7B%7D"));
        assert_eq!(request.method(), "POST");
        assert_eq!(request.target(), "/s/sfsites/aura?r=1");
        assert_eq!(request.version(), "HTTP/1.1");
        assert!(request.is_form_body());
        assert_eq!(request.param_names(), vec!["r", "message"]);
    }

    #[tokio::test]
    async fn test_proxy_captures_and_relays() {
        let upstream = spawn(Router::new().route(
            "/s/sfsites/aura",
            post(|body: Bytes| async move { ([("x-upstream", "yes")], body) }),
        ))
        .await;

        let settings = HighlightSettings::new(HighlightColor::Green);
        let history = History::shared(10);
        let inspector = Arc::new(Mutex::new(Inspector::new(settings.handle())));
        let (tx, mut rx) = mpsc::channel(16);

        let config = Config {
            upstream_url: upstream,
            ..Config::default()
        };
        let state = ProxyState::new(&config, history.clone(), inspector, tx).unwrap();
        let proxy = spawn(router(state)).await;

        let response = client()
            .post(format!("{}/s/sfsites/aura", proxy))
            .header("content-type", "application/x-www-form-urlencoded")
            .body("message=%7B%22a%22%3A1%7D&aura.token=t")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.headers()["x-upstream"], "yes");
        assert_eq!(
            response.text().await.unwrap(),
            "message=%7B%22a%22%3A1%7D&aura.token=t"
        );

        match rx.recv().await.unwrap() {
            ProxyEvent::Captured { matched, .. } => assert!(matched),
            other => panic!("unexpected event: {:?}", other),
        }

        let history = history.lock().unwrap();
        let entry = history.at(0).unwrap();
        assert_eq!(entry.highlight, Some(HighlightColor::Green));
        assert_eq!(entry.status, Some(200));
        assert_eq!(entry.origin, Origin::Proxy);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        // Reserve a port, then free it so nothing is listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let settings = HighlightSettings::default();
        let history = History::shared(10);
        let inspector = Arc::new(Mutex::new(Inspector::new(settings.handle())));
        let (tx, _rx) = mpsc::channel(16);
        let config = Config {
            upstream_url: dead,
            ..Config::default()
        };
        let state = ProxyState::new(&config, history.clone(), inspector, tx).unwrap();
        let proxy = spawn(router(state)).await;

        let response = client()
            .get(format!("{}/anything?q=1", proxy))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 502);

        // Captured even though forwarding failed
        assert_eq!(history.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replay_records_new_entry() {
        let upstream = spawn(Router::new().route("/aura", post(|| async { "ok" }))).await;

        let settings = HighlightSettings::default();
        let history = History::shared(10);
        let inspector = Arc::new(Mutex::new(Inspector::new(settings.handle())));
        let (tx, mut rx) = mpsc::channel(16);
        let config = Config {
            upstream_url: upstream,
            ..Config::default()
        };
        let state = ProxyState::new(&config, history.clone(), inspector, tx).unwrap();

        let request = HttpRequest::parse(
            b"POST /aura HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\naura.pageURI=%2Fs%2F",
        )
        .unwrap();
        let id = state.replay(request, Some(7)).await.unwrap();

        match rx.recv().await.unwrap() {
            ProxyEvent::Replayed { id: got, source, status, .. } => {
                assert_eq!(got, id);
                assert_eq!(source, Some(7));
                assert_eq!(status, 200);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let history = history.lock().unwrap();
        let entry = history.get(id).unwrap();
        assert_eq!(entry.origin, Origin::Replay);
        assert_eq!(entry.highlight, Some(HighlightColor::Cyan));
    }
}
