// src/api.rs
//! HTTP surface: health, event listing and event details.

use std::sync::Arc;

use shuttle_axum::axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::classify::EventId;
use crate::pipeline::{ConversionPolicy, EventPipeline, ReportOrigin};

/// Uniform body for every failed details request; the cause only goes to the logs.
pub const DETAILS_FAILED: &str = "could not produce details for this event";

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<EventPipeline>,
    policy: ConversionPolicy,
}

impl AppState {
    pub fn new(pipeline: EventPipeline, policy: ConversionPolicy) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            policy,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/events", get(list_events))
        .route("/events/details", get(event_details))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct EventsResp {
    events: Vec<EventId>,
}

async fn list_events(State(state): State<AppState>) -> Response {
    match state.pipeline.events().await {
        Ok(events) => Json(EventsResp { events }).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "event listing failed");
            (StatusCode::BAD_GATEWAY, "feeds unavailable").into_response()
        }
    }
}

#[derive(serde::Deserialize)]
struct DetailsQuery {
    id: Option<String>,
    #[serde(default)]
    debug: Option<String>, // "dummy" switches to recorded fixtures
}

async fn event_details(
    State(state): State<AppState>,
    Query(q): Query<DetailsQuery>,
) -> Response {
    let Some(event_id) = q.id.as_deref().and_then(EventId::parse) else {
        tracing::debug!(id = ?q.id, "details request without a usable id");
        return (StatusCode::BAD_REQUEST, "missing or invalid id").into_response();
    };

    let origin = match q.debug.as_deref() {
        Some("dummy") => ReportOrigin::Fixture,
        _ => ReportOrigin::Production,
    };

    match state
        .pipeline
        .event_details(&event_id, state.policy, origin)
        .await
    {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, DETAILS_FAILED).into_response(),
    }
}
