//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use wildshot_core::clock::Clock;
use wildshot_event_store::pg_event_repository::PgEventRepository;
use wildshot_event_store::pg_result_archive::PgResultArchive;
use wildshot_expedition::domain::biome::BiomeCatalog;
use wildshot_test_support::{
    FixedClock, ScriptedAnalyzer, StubEnhancer, StubFormatter, StubSceneGenerator,
};

use wildshot_api::routes;
use wildshot_api::state::{AppState, Studio};

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Studio whose analyzer returns `analyses` in order.
pub fn scripted_studio(analyses: &[&str]) -> Studio {
    Studio {
        scene_generator: Arc::new(StubSceneGenerator(Some("https://sky/pano.jpg".to_owned()))),
        enhancer: Arc::new(StubEnhancer),
        analyzer: Arc::new(ScriptedAnalyzer::new(analyses.iter().copied())),
        // Unparseable records fall back to labels derived from the analysis.
        formatter: Arc::new(StubFormatter(Some("not json".to_owned()))),
    }
}

/// Build the full app router with Postgres-backed persistence, a fixed
/// clock and stub studio services.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, scripted_studio(&["A quiet clearing."]))
}

/// Like [`build_test_app`] with a custom studio.
pub fn build_test_app_with(pool: PgPool, studio: Studio) -> Router {
    let app_state = AppState::new(
        pool.clone(),
        fixed_clock(),
        Arc::new(PgEventRepository::new(pool.clone())),
        Arc::new(PgResultArchive::new(pool)),
        Arc::new(BiomeCatalog::default()),
        studio,
        180,
    );
    routes::router(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
