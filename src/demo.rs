// Demo mode: Seed history with realistic Aura traffic
//
// Plays a short sequence of requests like the ones a Salesforce Experience
// Cloud page fires, mixed with ordinary asset and API calls, so the TUI
// can be explored without configuring a browser.
//
// Run with: ASPY_DEMO=1 cargo run --release

use crate::aura::transform::percent_encode;
use crate::aura::Inspector;
use crate::events::ProxyEvent;
use crate::history::{Origin, SharedHistory};
use crate::http::HttpRequest;
use chrono::Utc;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;

const HOST: &str = "acme.my.site.com";

/// One scripted request with its fake upstream outcome
struct DemoStep {
    request: HttpRequest,
    status: u16,
    latency_ms: u64,
    delay_ms: u64,
}

/// Play the demo sequence into history, stopping early on shutdown
pub async fn run_demo(
    history: SharedHistory,
    inspector: Arc<Mutex<Inspector>>,
    tx: mpsc::Sender<ProxyEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    // Initial delay to let TUI render
    sleep(Duration::from_millis(800)).await;

    for step in demo_sequence() {
        if shutdown_rx.try_recv().is_ok() {
            return;
        }

        let inspection = inspector
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .inspect(&step.request);
        let matched = inspection.matched();
        let method = step.request.method().to_string();
        let url = step.request.target().to_string();

        let id = {
            let mut history = history.lock().unwrap_or_else(|e| e.into_inner());
            let id = history.push(step.request, Origin::Demo, inspection.highlight);
            history.record_response(id, step.status, Duration::from_millis(step.latency_ms));
            id
        };

        let _ = tx
            .send(ProxyEvent::Captured {
                id,
                timestamp: Utc::now(),
                method,
                url,
                matched,
            })
            .await;
        let _ = tx
            .send(ProxyEvent::Completed {
                id,
                status: step.status,
                duration: Duration::from_millis(step.latency_ms),
            })
            .await;

        sleep(Duration::from_millis(step.delay_ms)).await;
    }

    tracing::info!("Demo sequence complete");
}

fn get(path: &str) -> HttpRequest {
    HttpRequest::new(
        "GET",
        format!("https://{}{}", HOST, path),
        "HTTP/1.1",
        vec![
            ("Host".into(), HOST.into()),
            ("Accept".into(), "*/*".into()),
        ],
        Vec::new(),
    )
}

fn aura_post(query: &str, message: serde_json::Value, page: &str) -> HttpRequest {
    let context = json!({
        "mode": "PROD",
        "fwuid": "eGx3MHlRT1lEMUpQaWVxbGRUM1h0Z2hZX25NdHFVdGpDN3BnWlROY1ZGT3cyNTAuOC40LTYuNC41",
        "app": "siteforce:communityApp",
        "loaded": {"APPLICATION@markup://siteforce:communityApp": "1187_iYtZ6rIHdvZVu4hjYAvy2w"},
        "dn": [],
        "globals": {},
        "uad": false
    });

    let body = format!(
        "message={}&aura.context={}&aura.pageURI={}&aura.token=null",
        percent_encode(&message.to_string()),
        percent_encode(&context.to_string()),
        percent_encode(page),
    );

    HttpRequest::new(
        "POST",
        format!("https://{}/s/sfsites/aura?{}", HOST, query),
        "HTTP/1.1",
        vec![
            ("Host".into(), HOST.into()),
            (
                "Content-Type".into(),
                "application/x-www-form-urlencoded; charset=UTF-8".into(),
            ),
            ("Content-Length".into(), body.len().to_string()),
            ("X-SFDC-Page-Scope-Id".into(), "4f1c0b3e-demo".into()),
        ],
        body,
    )
}

fn action(id: &str, descriptor: &str, params: serde_json::Value) -> serde_json::Value {
    json!({
        "actions": [{
            "id": id,
            "descriptor": descriptor,
            "callingDescriptor": "UNKNOWN",
            "params": params
        }]
    })
}

fn demo_sequence() -> Vec<DemoStep> {
    vec![
        DemoStep {
            request: get("/s/"),
            status: 200,
            latency_ms: 143,
            delay_ms: 400,
        },
        DemoStep {
            request: get("/s/sfsites/auraFW/javascript/aura_prod.js"),
            status: 200,
            latency_ms: 38,
            delay_ms: 300,
        },
        DemoStep {
            request: aura_post(
                "r=1&other.ApplicationController.getRoute=1",
                action(
                    "86;a",
                    "serviceComponent://ui.communities.components.aura.components.forceCommunity.seoAssistant.SeoAssistantController/ACTION$getRecordAndTranslationData",
                    json!({"recordId": null, "fields": []}),
                ),
                "/s/",
            ),
            status: 200,
            latency_ms: 212,
            delay_ms: 700,
        },
        DemoStep {
            request: aura_post(
                "r=4&aura.ApexAction.execute=1",
                action(
                    "112;a",
                    "aura://ApexActionController/ACTION$execute",
                    json!({
                        "namespace": "",
                        "classname": "CaseListController",
                        "method": "getCases",
                        "params": {"status": "Open", "limit": 25},
                        "cacheable": false,
                        "isContinuation": false
                    }),
                ),
                "/s/case/Case/Default",
            ),
            status: 200,
            latency_ms: 389,
            delay_ms: 900,
        },
        DemoStep {
            request: get("/services/data/v59.0/sobjects/Account/describe"),
            status: 401,
            latency_ms: 61,
            delay_ms: 500,
        },
        DemoStep {
            request: aura_post(
                "r=7&ui-force-components-controllers-recordGlobalValueProvider.RecordGvp.getRecord=1",
                action(
                    "141;a",
                    "serviceComponent://ui.force.components.controllers.recordGlobalValueProvider.RecordGvpController/ACTION$getRecord",
                    json!({
                        "recordDescriptor": "5003h00000AbCdEAAV.undefined.null.null.null.Id,CaseNumber,Subject.VIEW.true.null.null.null"
                    }),
                ),
                "/s/case/5003h00000AbCdEAAV",
            ),
            status: 200,
            latency_ms: 176,
            delay_ms: 600,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::{HighlightColor, HighlightSettings, ParamRequest};
    use crate::history::History;

    #[test]
    fn test_sequence_mixes_aura_and_plain_requests() {
        let steps = demo_sequence();
        let aura = steps
            .iter()
            .filter(|s| crate::aura::matches(s.request.param_names().iter().map(String::as_str)))
            .count();
        assert_eq!(aura, 3);
        assert!(aura < steps.len());
    }

    #[test]
    fn test_demo_bodies_decode_to_json() {
        for step in demo_sequence() {
            for param in step.request.params() {
                if param.name == "message" || param.name == "aura.context" {
                    let decoded = crate::aura::transform::percent_decode(&param.value);
                    assert!(serde_json::from_str::<serde_json::Value>(&decoded).is_ok());
                }
            }
        }
    }

    #[tokio::test]
    async fn test_run_demo_fills_history() {
        let settings = HighlightSettings::new(HighlightColor::Orange);
        let history = History::shared(100);
        let inspector = Arc::new(Mutex::new(Inspector::new(settings.handle())));
        let (tx, mut rx) = mpsc::channel(64);
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::time::pause();
        run_demo(history.clone(), inspector, tx, shutdown_rx).await;

        let history = history.lock().unwrap();
        assert_eq!(history.len(), demo_sequence().len());
        assert_eq!(history.highlighted_count(), 3);
        assert!(history
            .iter()
            .filter_map(|e| e.highlight)
            .all(|c| c == HighlightColor::Orange));

        assert!(matches!(rx.recv().await, Some(ProxyEvent::Captured { .. })));
    }
}
