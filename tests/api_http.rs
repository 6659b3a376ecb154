// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with every
// upstream document served from an in-memory FixtureSource.
//
// Covered:
// - GET /health
// - GET /events            (merged feeds, 502 when a feed is missing)
// - GET /events/details    (200 json, 400 on missing id / failed conversion, debug=dummy)

use std::sync::Arc;

use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use quake_relay::api::{self, AppState, DETAILS_FAILED};
use quake_relay::config::FeedSettings;
use quake_relay::ingest::source::FixtureSource;
use quake_relay::{ConversionPolicy, EventPipeline};

const BODY_LIMIT: usize = 1024 * 1024;
const FIXTURE_BASE: &str = "https://fixtures.test/examples/";

const VXSE53_ID: &str = "20240101072243_0_VXSE53_010000";
const VTSE41_ID: &str = "20240101072051_0_VTSE41_010000";

fn feeds() -> FeedSettings {
    FeedSettings {
        fixture_base_url: FIXTURE_BASE.to_string(),
        ..FeedSettings::default()
    }
}

fn full_source() -> FixtureSource {
    let f = feeds();
    FixtureSource::new()
        .with(f.realtime_url.clone(), include_str!("fixtures/eqvol.xml"))
        .with(f.longterm_url.clone(), include_str!("fixtures/eqvol_l.xml"))
        .with(
            format!("{}{VXSE53_ID}.xml", f.data_base_url),
            include_str!("fixtures/vxse53.xml"),
        )
        .with(
            format!("{FIXTURE_BASE}{VTSE41_ID}.xml"),
            include_str!("fixtures/vtse41.xml"),
        )
}

fn test_router(source: FixtureSource) -> Router {
    let pipeline = EventPipeline::new(Arc::new(source), feeds());
    api::router(AppState::new(pipeline, ConversionPolicy::default()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, content_type, String::from_utf8(bytes).expect("utf8"))
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let (status, _, body) = get(test_router(full_source()), "/health").await;
    assert_eq!(status, StatusCode::OK, "health should be 200");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn events_lists_merged_ids() {
    let (status, _, body) = get(test_router(full_source()), "/events").await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_str(&body).expect("events json");
    let events = v["events"].as_array().expect("events array");
    assert_eq!(events.len(), 5);
    assert_eq!(events[0], VXSE53_ID);
}

#[tokio::test]
async fn events_without_feeds_is_bad_gateway() {
    let (status, _, _) = get(test_router(FixtureSource::new()), "/events").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn details_returns_the_record_as_json() {
    let uri = format!("/events/details?id={VXSE53_ID}");
    let (status, content_type, body) = get(test_router(full_source()), &uri).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let v: Json = serde_json::from_str(&body).expect("record json");
    assert_eq!(v["code"], 551);
    assert_eq!(v["id"], VXSE53_ID);
    assert_eq!(v["earthquake"]["hypocenter"]["name"], "石川県能登地方");
}

#[tokio::test]
async fn details_debug_reads_fixture_tree() {
    // Only the fixture tree has the tsunami report.
    let uri = format!("/events/details?id={VTSE41_ID}");
    let (status, _, _) = get(test_router(full_source()), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/events/details?id={VTSE41_ID}&debug=dummy");
    let (status, _, body) = get(test_router(full_source()), &uri).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    let v: Json = serde_json::from_str(&body).unwrap();
    assert_eq!(v["code"], 552);
}

#[tokio::test]
async fn details_without_usable_id_is_400() {
    for uri in [
        "/events/details",
        "/events/details?id=",
        "/events/details?id=..%2Fsecret",
    ] {
        let (status, _, _) = get(test_router(full_source()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn failed_conversion_collapses_to_uniform_400() {
    let f = feeds();
    let broken_id = "20240101080000_0_VXSE53_010000";
    let source = full_source().with(
        format!("{}{broken_id}.xml", f.data_base_url),
        include_str!("fixtures/vxse53.xml").replace("<Code>0211</Code>", "<Code>0299</Code>"),
    );

    let uri = format!("/events/details?id={broken_id}");
    let (status, _, body) = get(test_router(source), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, DETAILS_FAILED);
}
