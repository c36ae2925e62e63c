//! Dashboard-side polling through a running service.
//!
//! The service router is served on an ephemeral port with a mock upstream,
//! and a proxy-backed polling controller consumes it the way a dashboard
//! would.

use std::sync::Arc;

use axum::Router;
use futures::future::join_all;
use time::OffsetDateTime;

use remo_core::types::{Device, NewestEvents, SensorEvent};
use remo_core::{
    Credential, DataSource, DirectFeed, MockSource, Phase, PollerOptions, PollingController,
    ProxyClient, ProxyFeed,
};
use remo_service::{AppState, Config, api};

async fn serve(state: Arc<AppState>) -> String {
    let app = Router::new().merge(api::router()).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn bedroom() -> Device {
    let at = OffsetDateTime::now_utc();
    Device::new("Bedroom", at).with_events(NewestEvents {
        te: Some(SensorEvent::new(19.0, at)),
        hu: Some(SensorEvent::new(55.0, at)),
        il: None,
    })
}

fn dashboard(base_url: &str) -> PollingController {
    let client = ProxyClient::new(base_url).unwrap();
    PollingController::new(Arc::new(ProxyFeed::new(client)), PollerOptions::default())
}

#[tokio::test]
async fn test_dashboard_follows_upstream_health() {
    let source = Arc::new(MockSource::new(vec![bedroom()]));
    let feed = DirectFeed::new(source.clone(), Credential::new("server-side-token"));
    let state = AppState::with_feed(Config::default(), Arc::new(feed));
    let base_url = serve(state).await;

    let controller = dashboard(&base_url);

    let live = controller.refresh().await;
    assert_eq!(live.phase, Phase::Success);
    assert_eq!(live.source, DataSource::Live);
    assert_eq!(live.room_data.len(), 1);
    assert_eq!(live.room_data[0].name, "Bedroom");
    assert_eq!(live.room_data[0].illumination, None);

    source.set_failure(Some(401));
    let degraded = controller.refresh().await;
    assert_eq!(degraded.phase, Phase::Degraded);
    assert_eq!(degraded.error.as_deref(), Some("API error: 401 Unauthorized"));
    assert_eq!(degraded.room_data.len(), 3);

    source.set_failure(None);
    let recovered = controller.refresh().await;
    assert_eq!(recovered.source, DataSource::Live);
    assert!(recovered.error.is_none());

    controller.dispose().await;
}

#[tokio::test]
async fn test_dashboard_against_unconfigured_service() {
    let source = Arc::new(MockSource::new(vec![bedroom()]));
    let feed = DirectFeed::new(source.clone(), None);
    let state = AppState::with_feed(Config::default(), Arc::new(feed));
    let base_url = serve(state).await;

    let snapshot = dashboard(&base_url).refresh().await;
    assert_eq!(snapshot.source, DataSource::Synthetic);
    assert!(snapshot.error.is_none());
    assert!(snapshot.last_fetched.is_some());
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn test_concurrent_proxy_requests() {
    let source = Arc::new(MockSource::new(vec![bedroom()]));
    let feed = DirectFeed::new(source.clone(), Credential::new("token"));
    let state = AppState::with_feed(Config::default(), Arc::new(feed));
    let base_url = serve(state).await;

    let client = ProxyClient::new(&base_url).unwrap();
    let responses = join_all((0..5).map(|_| client.fetch())).await;

    for response in responses {
        let response = response.unwrap();
        assert!(!response.use_mock);
        assert_eq!(response.room_data.map(|r| r.len()), Some(1));
    }
    assert_eq!(source.call_count(), 5);
}
