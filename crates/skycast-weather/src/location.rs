//! Device position lookup.
//!
//! A `GeolocationProvider` answers one position query. A `Geolocator` runs
//! exactly one such query in the background and exposes its state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use skycast_core::GeolocationConfig;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::types::{Coordinates, GeolocationError, LocationResult};

/// Options for a single position query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
        }
    }
}

impl From<&GeolocationConfig> for GeolocationOptions {
    fn from(config: &GeolocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Source of the device position.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn locate(&self, options: &GeolocationOptions) -> Result<Coordinates, GeolocationError>;
}

/// Position supplied up front, from settings or the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl GeolocationProvider for FixedLocation {
    async fn locate(&self, _options: &GeolocationOptions) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// No position source on this device.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl GeolocationProvider for Unsupported {
    async fn locate(&self, _options: &GeolocationOptions) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// One background position query.
///
/// `current()` is `Pending` until the query finishes and never changes after
/// that. The query is never retried. Dropping the geolocator aborts a query
/// that is still running.
pub struct Geolocator {
    rx: watch::Receiver<LocationResult>,
    task: JoinHandle<()>,
}

impl Geolocator {
    pub fn start(
        handle: &Handle,
        provider: Arc<dyn GeolocationProvider>,
        options: GeolocationOptions,
    ) -> Self {
        let (tx, rx) = watch::channel(LocationResult::Pending);

        let task = handle.spawn(async move {
            let result =
                match tokio::time::timeout(options.timeout, provider.locate(&options)).await {
                    Ok(Ok(coordinates)) => {
                        tracing::info!(
                            "Got location: {:.4}, {:.4}",
                            coordinates.lat,
                            coordinates.lon
                        );
                        LocationResult::Coordinates(coordinates)
                    }
                    Ok(Err(e)) => {
                        tracing::warn!("Geolocation failed: {}", e);
                        LocationResult::Error(e)
                    }
                    Err(_) => {
                        tracing::warn!(timeout = ?options.timeout, "Geolocation timed out");
                        LocationResult::Error(GeolocationError::Timeout)
                    }
                };
            let _ = tx.send(result);
        });

        Self { rx, task }
    }

    pub fn current(&self) -> LocationResult {
        self.rx.borrow().clone()
    }

    /// Waits for the query to finish. Never returns `Pending`.
    pub async fn resolved(&self) -> LocationResult {
        let mut rx = self.rx.clone();
        let result = rx.wait_for(|r| !r.is_pending()).await.map(|r| r.clone());
        match result {
            Ok(resolved) => resolved,
            // The task ended without reporting, e.g. the runtime shut down
            Err(_) => LocationResult::Error(GeolocationError::Unavailable(
                "position query ended without a result".to_string(),
            )),
        }
    }
}

impl Drop for Geolocator {
    fn drop(&mut self) {
        self.task.abort();
    }
}
