//! REST API endpoints for remo-service.
//!
//! - `GET /api/health`: service health check
//! - `GET /api/nature-remo`: live acquisition on behalf of a dashboard.
//!   Always answers 200; failures are reported inside the body so the caller
//!   can fall back to synthetic readings.
//! - `GET /api/rooms`: current polling controller snapshot
//! - `POST /api/rooms/refresh`: run one polling cycle now
//! - `GET /api/rooms/{name}/history`: synthetic history series
//!
//! Client errors return structured JSON via [`AppError`].
//!
//! # Example
//!
//! ```ignore
//! use remo_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use remo_core::Snapshot;
use remo_core::proxy::PROXY_PATH;
use remo_core::types::{HistoryRange, ProxyResponse, RoomHistoryData};

use crate::state::AppState;

/// Longest history window served, in hours.
pub const MAX_HISTORY_HOURS: u32 = 168;

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route(PROXY_PATH, get(nature_remo))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/refresh", post(refresh_rooms))
        .route("/api/rooms/{name}/history", get(get_history))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// Whether an API token is configured.
    pub configured: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        started_at: state.started_at,
        configured: state.config.credential().is_some(),
    })
}

/// Proxy endpoint. One live acquisition per request.
async fn nature_remo(State(state): State<Arc<AppState>>) -> Json<ProxyResponse> {
    let response = state.feed.fetch().await.into_proxy_response();
    debug!(
        "Proxy request served (use_mock: {}, error: {:?})",
        response.use_mock, response.error
    );
    Json(response)
}

async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.controller.snapshot())
}

async fn refresh_rooms(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.controller.refresh().await)
}

/// Query parameters for the history endpoint.
///
/// `range` takes precedence over `hours`. With neither, 24 hours are served.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub hours: Option<u32>,
    pub range: Option<String>,
}

impl HistoryQuery {
    /// Resolve the requested window in hours.
    pub fn resolve_hours(&self) -> Result<u32, AppError> {
        if let Some(range) = &self.range {
            let range: HistoryRange = range
                .parse()
                .map_err(|e: remo_core::types::ParseError| AppError::BadRequest(e.to_string()))?;
            return Ok(range.hours());
        }

        match self.hours {
            None => Ok(HistoryRange::default().hours()),
            Some(0) => Err(AppError::BadRequest(
                "hours must be at least 1".to_string(),
            )),
            Some(hours) => Ok(hours.min(MAX_HISTORY_HOURS)),
        }
    }
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<RoomHistoryData>, AppError> {
    let hours = params.resolve_hours()?;
    Ok(Json(state.generator.history(&name, hours)))
}

/// API error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use remo_core::types::{Device, NewestEvents, SensorEvent};
    use remo_core::{Credential, DirectFeed, MockSource};

    use crate::config::Config;

    fn create_test_state(source: Arc<MockSource>, token: Option<&str>) -> Arc<AppState> {
        let feed = DirectFeed::new(source, token.and_then(Credential::new));
        AppState::with_feed(Config::default(), Arc::new(feed))
    }

    fn study() -> Device {
        let at = OffsetDateTime::UNIX_EPOCH;
        Device::new("Study", at).with_events(NewestEvents {
            te: Some(SensorEvent::new(23.5, at)),
            ..Default::default()
        })
    }

    async fn response_body(response: axum::response::Response) -> String {
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response_body(response).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = create_test_state(Arc::new(MockSource::new(vec![])), None);
        let app = router().with_state(state);

        let (status, json) = get_json(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
        assert!(json["timestamp"].is_string());
        assert_eq!(json["configured"], false);
    }

    #[tokio::test]
    async fn test_proxy_unconfigured() {
        let source = Arc::new(MockSource::new(vec![study()]));
        let state = create_test_state(source.clone(), None);
        let app = router().with_state(state);

        let (status, json) = get_json(app, "/api/nature-remo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({"useMock": true, "devices": []}));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_proxy_live() {
        let source = Arc::new(MockSource::new(vec![study()]));
        let state = create_test_state(source, Some("token"));
        let app = router().with_state(state);

        let (status, json) = get_json(app, "/api/nature-remo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["useMock"], false);
        assert_eq!(json["roomData"][0]["name"], "Study");
        assert_eq!(json["roomData"][0]["temperature"], 23.5);
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_proxy_upstream_failure_still_200() {
        let source = Arc::new(MockSource::new(vec![]));
        source.set_failure(Some(401));
        let state = create_test_state(source, Some("token"));
        let app = router().with_state(state);

        let (status, json) = get_json(app, "/api/nature-remo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["useMock"], true);
        assert_eq!(json["error"], "API error: 401 Unauthorized");
        assert!(json.get("roomData").is_none());
    }

    #[tokio::test]
    async fn test_proxy_fetches_per_request() {
        let source = Arc::new(MockSource::new(vec![study()]));
        let state = create_test_state(source.clone(), Some("token"));

        for _ in 0..3 {
            let app = router().with_state(Arc::clone(&state));
            get_json(app, "/api/nature-remo").await;
        }
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn test_rooms_before_first_cycle() {
        let state = create_test_state(Arc::new(MockSource::new(vec![])), None);
        let app = router().with_state(state);

        let (status, json) = get_json(app, "/api/rooms").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["roomData"], serde_json::json!([]));
        assert_eq!(json["isLoading"], false);
        assert_eq!(json["phase"], "idle");
        assert!(json["lastFetched"].is_null());
    }

    #[tokio::test]
    async fn test_refresh_rooms() {
        let source = Arc::new(MockSource::new(vec![study()]));
        let state = create_test_state(source, Some("token"));
        let app = router().with_state(Arc::clone(&state));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/rooms/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&response_body(response).await).unwrap();
        assert_eq!(json["phase"], "success");
        assert_eq!(json["source"], "live");
        assert_eq!(json["roomData"][0]["name"], "Study");
        assert!(json["lastFetched"].is_string());

        // The snapshot endpoint now reflects the same cycle
        let (_, json) = get_json(router().with_state(state), "/api/rooms").await;
        assert_eq!(json["completedCycles"], 1);
    }

    #[tokio::test]
    async fn test_refresh_rooms_degraded() {
        let source = Arc::new(MockSource::new(vec![]));
        source.set_failure(Some(500));
        let state = create_test_state(source, Some("token"));

        let snapshot = state.controller.refresh().await;
        assert!(snapshot.error.is_some());

        let (_, json) = get_json(router().with_state(state), "/api/rooms").await;
        assert_eq!(json["phase"], "degraded");
        assert_eq!(json["source"], "synthetic");
        assert_eq!(json["error"], "API error: 500 Internal Server Error");
        assert_eq!(json["roomData"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_history_default_range() {
        let state = create_test_state(Arc::new(MockSource::new(vec![])), None);
        let app = router().with_state(state);

        let (status, json) = get_json(app, "/api/rooms/Kitchen/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["roomName"], "Kitchen");
        assert_eq!(json["data"].as_array().unwrap().len(), 24 * 12 + 1);
    }

    #[tokio::test]
    async fn test_history_range_and_hours() {
        let state = create_test_state(Arc::new(MockSource::new(vec![])), None);

        let (_, json) = get_json(
            router().with_state(Arc::clone(&state)),
            "/api/rooms/Study/history?range=6h",
        )
        .await;
        assert_eq!(json["data"].as_array().unwrap().len(), 73);

        let (_, json) = get_json(
            router().with_state(Arc::clone(&state)),
            "/api/rooms/Study/history?hours=2",
        )
        .await;
        assert_eq!(json["data"].as_array().unwrap().len(), 25);

        let (_, json) = get_json(
            router().with_state(state),
            "/api/rooms/Study/history?hours=1000",
        )
        .await;
        assert_eq!(
            json["data"].as_array().unwrap().len(),
            (MAX_HISTORY_HOURS * 12 + 1) as usize
        );
    }

    #[tokio::test]
    async fn test_history_room_name_is_decoded() {
        let state = create_test_state(Arc::new(MockSource::new(vec![])), None);
        let app = router().with_state(state);

        let (_, json) = get_json(app, "/api/rooms/Living%20Room/history?range=6h").await;
        assert_eq!(json["roomName"], "Living Room");
    }

    #[tokio::test]
    async fn test_history_invalid_range() {
        let state = create_test_state(Arc::new(MockSource::new(vec![])), None);
        let app = router().with_state(state);

        let (status, json) = get_json(app, "/api/rooms/Study/history?range=1w").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("1w"));
    }

    #[tokio::test]
    async fn test_history_zero_hours() {
        let state = create_test_state(Arc::new(MockSource::new(vec![])), None);
        let app = router().with_state(state);

        let (status, json) = get_json(app, "/api/rooms/Study/history?hours=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[test]
    fn test_history_query_precedence() {
        let query = HistoryQuery {
            hours: Some(2),
            range: Some("72h".to_string()),
        };
        assert_eq!(query.resolve_hours().unwrap(), 72);
        assert_eq!(HistoryQuery::default().resolve_hours().unwrap(), 24);
    }
}
