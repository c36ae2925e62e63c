//! End-to-end tests for remo-core against local stub servers.
//!
//! The upstream cloud API and the proxy endpoint are both played by small
//! axum routers bound to an ephemeral port, so these tests need no network
//! access or credentials.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};

use remo_core::{
    Credential, DataSource, DirectFeed, Phase, PollerOptions, PollingController, ProxyClient,
    ProxyFeed, SensorClient, SyntheticGenerator,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Upstream stub answering with the status held in the shared cell.
async fn devices(State(status): State<Arc<AtomicU16>>) -> impl IntoResponse {
    let code = StatusCode::from_u16(status.load(Ordering::SeqCst)).unwrap();
    if !code.is_success() {
        return code.into_response();
    }
    Json(serde_json::json!([
        {
            "id": "a",
            "name": "Living Room",
            "updated_at": "2024-05-01T08:00:00Z",
            "newest_events": {
                "te": {"val": 24.1, "created_at": "2024-05-01T08:10:00Z"},
                "hu": {"val": 45, "created_at": "2024-05-01T08:11:00Z"},
                "il": {"val": 120, "created_at": "2024-05-01T08:12:00Z"}
            }
        },
        {
            "id": "b",
            "name": "Entrance",
            "updated_at": "2024-05-01T07:00:00Z",
            "newest_events": {
                "il": {"val": 3, "created_at": "2024-05-01T07:30:00Z"}
            }
        }
    ]))
    .into_response()
}

#[tokio::test]
async fn test_direct_polling_against_upstream() {
    init_tracing();

    let status = Arc::new(AtomicU16::new(200));
    let app = Router::new()
        .route("/1/devices", get(devices))
        .with_state(Arc::clone(&status));
    let addr = serve(app).await;

    let client = Arc::new(SensorClient::new(&format!("http://{}", addr)).unwrap());
    let feed = Arc::new(DirectFeed::new(client, Credential::new("integration-token")));
    let controller = PollingController::new(
        feed,
        PollerOptions::new().generator(SyntheticGenerator::new(["Mock A", "Mock B"])),
    );

    let live = controller.refresh().await;
    assert_eq!(live.phase, Phase::Success);
    assert_eq!(live.source, DataSource::Live);
    assert_eq!(live.room_data.len(), 2);
    assert_eq!(live.room_data[1].name, "Entrance");
    assert_eq!(live.room_data[1].temperature, None);
    assert_eq!(live.room_data[1].illumination, Some(3.0));

    status.store(503, Ordering::SeqCst);
    let degraded = controller.refresh().await;
    assert_eq!(degraded.phase, Phase::Degraded);
    assert_eq!(
        degraded.error.as_deref(),
        Some("API error: 503 Service Unavailable")
    );
    let names: Vec<_> = degraded.room_data.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Mock A", "Mock B"]);
    assert_eq!(degraded.last_fetched, live.last_fetched);

    status.store(200, Ordering::SeqCst);
    let recovered = controller.refresh().await;
    assert_eq!(recovered.phase, Phase::Success);
    assert!(recovered.error.is_none());

    controller.dispose().await;
}

#[tokio::test]
async fn test_direct_polling_unreachable_upstream() {
    init_tracing();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Arc::new(SensorClient::new(&format!("http://{}", addr)).unwrap());
    let feed = Arc::new(DirectFeed::new(client, Credential::new("token")));
    let controller = PollingController::new(feed, PollerOptions::default());

    let snapshot = controller.refresh().await;
    assert_eq!(snapshot.phase, Phase::Degraded);
    assert!(!snapshot.room_data.is_empty());
    assert!(
        snapshot
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Network error"))
    );
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn test_proxy_feed_shapes() {
    init_tracing();

    let app = Router::new()
        .route(
            "/unconfigured/api/nature-remo",
            get(|| async { Json(serde_json::json!({"useMock": true, "devices": []})) }),
        )
        .route(
            "/failing/api/nature-remo",
            get(|| async {
                Json(serde_json::json!({"useMock": true, "error": "API error: 401 Unauthorized"}))
            }),
        )
        .route(
            "/live/api/nature-remo",
            get(|| async {
                Json(serde_json::json!({
                    "useMock": false,
                    "roomData": [
                        {"name": "Study", "temperature": 25.0, "lastUpdated": "2024-05-01T08:00:00Z"}
                    ]
                }))
            }),
        )
        .route(
            "/hollow/api/nature-remo",
            get(|| async { Json(serde_json::json!({"useMock": false})) }),
        )
        .route(
            "/broken/api/nature-remo",
            get(|| async { StatusCode::BAD_GATEWAY }),
        );
    let addr = serve(app).await;

    let controller_for = |prefix: &str| {
        let client = ProxyClient::new(&format!("http://{}/{}", addr, prefix)).unwrap();
        PollingController::new(Arc::new(ProxyFeed::new(client)), PollerOptions::default())
    };

    let unconfigured = controller_for("unconfigured").refresh().await;
    assert_eq!(unconfigured.source, DataSource::Synthetic);
    assert!(unconfigured.error.is_none());
    assert_eq!(unconfigured.room_data.len(), 3);

    let failing = controller_for("failing").refresh().await;
    assert_eq!(failing.source, DataSource::Synthetic);
    assert_eq!(failing.error.as_deref(), Some("API error: 401 Unauthorized"));

    let live = controller_for("live").refresh().await;
    assert_eq!(live.source, DataSource::Live);
    assert_eq!(live.room_data.len(), 1);
    assert_eq!(live.room_data[0].temperature, Some(25.0));
    assert_eq!(live.room_data[0].humidity, None);

    let hollow = controller_for("hollow").refresh().await;
    assert_eq!(hollow.phase, Phase::Degraded);
    assert_eq!(hollow.source, DataSource::Synthetic);
    assert_eq!(hollow.room_data.len(), 3);
    assert_eq!(
        hollow.error.as_deref(),
        Some(remo_core::feed::MISSING_ROOM_DATA)
    );

    let broken = controller_for("broken").refresh().await;
    assert_eq!(broken.phase, Phase::Degraded);
    assert_eq!(broken.error.as_deref(), Some("API error: 502 Bad Gateway"));
}
