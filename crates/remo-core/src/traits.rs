//! Trait abstractions for device sources.
//!
//! This module provides the [`DeviceSource`] trait that abstracts over the
//! real cloud API client and mock sources for testing.

use async_trait::async_trait;

use remo_types::Device;

use crate::credential::Credential;
use crate::error::Result;

/// Something that can list devices for a credential.
///
/// The credential is passed on every call rather than stored, so a source
/// carries no identity of its own and the same instance can serve any token.
///
/// # Example
///
/// ```ignore
/// use remo_core::{Credential, DeviceSource, Result};
///
/// async fn count_rooms<S: DeviceSource>(source: &S, credential: &Credential) -> Result<usize> {
///     Ok(source.list_devices(credential).await?.len())
/// }
/// ```
#[async_trait]
pub trait DeviceSource: Send + Sync {
    /// Fetch the current device list. Every call is a live read.
    async fn list_devices(&self, credential: &Credential) -> Result<Vec<Device>>;
}
