//! Mock device source for testing.
//!
//! [`MockSource`] implements [`DeviceSource`] without any network access, so
//! feeds and the polling controller can be exercised in unit tests.
//!
//! # Features
//!
//! - **Failure injection**: answer with an HTTP status error until cleared
//! - **Transient failures**: fail the next N calls, then succeed
//! - **Latency simulation**: delay every call to hold a cycle in flight
//! - **Call counting**: assert how often the source was hit

use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use remo_types::Device;

use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::traits::DeviceSource;

/// A mock device source.
///
/// # Example
///
/// ```
/// use remo_core::{Credential, DeviceSource, MockSource};
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockSource::new(vec![]);
///     source.set_failure(Some(401));
///
///     let credential = Credential::new("token").unwrap();
///     assert!(source.list_devices(&credential).await.is_err());
/// }
/// ```
pub struct MockSource {
    devices: RwLock<Vec<Device>>,
    /// HTTP status to fail with (0 = succeed).
    failure_status: AtomicU16,
    /// Number of upcoming calls that fail with 503 before succeeding.
    remaining_failures: AtomicU32,
    /// Simulated latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
    calls: AtomicU32,
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource")
            .field("failure_status", &self.failure_status.load(Ordering::Relaxed))
            .field("latency_ms", &self.latency_ms.load(Ordering::Relaxed))
            .field("calls", &self.calls.load(Ordering::Relaxed))
            .finish()
    }
}

impl MockSource {
    /// Create a source that returns `devices` on every call.
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices: RwLock::new(devices),
            failure_status: AtomicU16::new(0),
            remaining_failures: AtomicU32::new(0),
            latency_ms: AtomicU64::new(0),
            calls: AtomicU32::new(0),
        }
    }

    /// Replace the devices returned by subsequent calls.
    pub async fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.write().await = devices;
    }

    /// Fail every call with the given HTTP status, or clear with `None`.
    pub fn set_failure(&self, status: Option<u16>) {
        self.failure_status
            .store(status.unwrap_or(0), Ordering::Relaxed);
    }

    /// Fail the next `count` calls with 503, then behave normally.
    pub fn fail_next(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    fn status_error(status: u16) -> Error {
        match reqwest::StatusCode::from_u16(status) {
            Ok(code) => Error::from_status(code),
            Err(_) => Error::Http {
                status,
                status_text: "Unknown".to_string(),
            },
        }
    }
}

#[async_trait]
impl DeviceSource for MockSource {
    async fn list_devices(&self, _credential: &Credential) -> Result<Vec<Device>> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        // Transient failures take precedence
        if self
            .remaining_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Self::status_error(503));
        }

        let status = self.failure_status.load(Ordering::Relaxed);
        if status != 0 {
            return Err(Self::status_error(status));
        }

        Ok(self.devices.read().await.clone())
    }
}
