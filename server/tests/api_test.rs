//! HTTP surface tests, driving the router in-process with scripted probes.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use lookout_core::{EmailAddress, ProbeOutcome, SiteInfo};
use lookout_db::{Database, JobStore};
use lookout_engine::{EngineConfig, JobRunner, ProbeEngine};
use lookout_server::{router, AppState};
use lookout_sites::{ProbeUnit, StaticCatalogue};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

struct FoundUnit {
    site: SiteInfo,
}

#[async_trait]
impl ProbeUnit for FoundUnit {
    fn site(&self) -> &SiteInfo {
        &self.site
    }

    async fn probe(&self, _email: &EmailAddress, _client: &reqwest::Client) -> ProbeOutcome {
        ProbeOutcome::found(&self.site)
    }
}

struct TestApp {
    _tmp: TempDir,
    store: JobStore,
    app: Router,
}

async fn test_app() -> TestApp {
    let tmp = TempDir::new().expect("create temp dir");
    let store = Database::open(tmp.path().join("jobs.db"))
        .await
        .expect("open database")
        .jobs();

    let units: Vec<Arc<dyn ProbeUnit>> = vec![Arc::new(FoundUnit {
        site: SiteInfo::new("gravatar", "gravatar.com"),
    })];
    let engine = ProbeEngine::new(EngineConfig {
        probe_timeout: Duration::from_secs(2),
        ..EngineConfig::default()
    });
    let runner = JobRunner::new(store.clone(), Arc::new(StaticCatalogue::new(units)), engine);

    TestApp {
        _tmp: tmp,
        store,
        app: router(AppState::new(runner)),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, body.to_vec())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    send(
        app,
        Request::get(uri).body(Body::empty()).expect("build request"),
    )
    .await
}

async fn post_search(app: &Router, form: &str) -> (StatusCode, Value) {
    let request = Request::post("/search")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .expect("build request");
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).expect("json body"))
}

async fn wait_for_status(app: &Router, id: &str, wanted: &str) -> Value {
    for _ in 0..200 {
        let (status, body) = get(app, &format!("/status/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        let view: Value = serde_json::from_slice(&body).expect("json body");
        if view["status"] == wanted {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} never reached {wanted}");
}

#[tokio::test]
async fn test_health() {
    let t = test_app().await;
    let (status, body) = get(&t.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_submit_requires_email() {
    let t = test_app().await;

    for form in ["", "email=", "email=%20%20"] {
        let (status, body) = post_search(&t.app, form).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email is required");
    }
    assert_eq!(t.store.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_submit_rejects_invalid_email() {
    let t = test_app().await;

    let (status, body) = post_search(&t.app, "email=not-an-email").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a valid email address");
    assert_eq!(t.store.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_search_lifecycle() {
    let t = test_app().await;

    let (status, body) = post_search(&t.app, "email=%20jane%40example.com%20").await;
    assert_eq!(status, StatusCode::OK);
    let id = body["search_id"].as_str().expect("search_id").to_string();

    let view = wait_for_status(&t.app, &id, "completed").await;
    assert_eq!(view["progress"], 100);

    let (status, body) = get(&t.app, &format!("/results/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let results: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(results["email"], "jane@example.com");
    assert_eq!(results["total_sites"], 1);
    assert_eq!(results["found_count"], 1);
    assert_eq!(results["found_profiles"][0]["site"], "gravatar");

    let response = t
        .app
        .clone()
        .oneshot(
            Request::get(format!("/download/{id}"))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"lookout_report_jane_at_example.com.txt\""
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let report = String::from_utf8(body.to_vec()).expect("utf-8 report");
    assert!(report.contains("gravatar (gravatar.com)"));
}

#[tokio::test]
async fn test_unknown_job() {
    let t = test_app().await;

    for id in ["00000000-0000-4000-8000-000000000000", "not a uuid"] {
        let uri = format!("/status/{}", id.replace(' ', "%20"));
        let (status, body) = get(&t.app, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(body["status"], "not_found");
    }

    let (status, body) = get(&t.app, "/results/00000000-0000-4000-8000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(body["error"], "Results not found or search not completed");

    let (status, _) = get(&t.app, "/download/00000000-0000-4000-8000-000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_results_hidden_until_completed() {
    let t = test_app().await;
    let job = t
        .store
        .init(EmailAddress::parse("jane@example.com").expect("valid email"))
        .await
        .expect("init job");
    let id = job.id.to_string();

    let (status, _) = get(&t.app, &format!("/results/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&t.app, &format!("/download/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    t.store
        .mark_error(&job.id, "Error: boom")
        .await
        .expect("mark error");

    let (status, body) = get(&t.app, &format!("/status/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let view: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(view["status"], "error");
    assert_eq!(view["message"], "Error: boom");

    let (status, _) = get(&t.app, &format!("/results/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
