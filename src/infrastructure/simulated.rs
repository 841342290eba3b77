//! Simulated Platform
//!
//! In-process implementation of the capability ports, scriptable from tests
//! and the demo binary. Signals are plain shared state flipped by the
//! caller; counters record how often the aggregator touched each query so
//! tests can assert polling behavior precisely.

use crate::domain::models::{BondedPeripheral, Connectivity, PermissionStatus, Position};
use crate::domain::platform::{
    BluetoothProbe, ConnectivityProbe, LocationProvider, PositionWatch, ProbeError,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

struct SimState {
    connectivity: Connectivity,
    service_enabled: bool,
    permission: PermissionStatus,
    permission_after_request: PermissionStatus,
    adapter_enabled: bool,
    bonded: Vec<BondedPeripheral>,
    position_feeds: Vec<mpsc::UnboundedSender<Position>>,

    connectivity_queries: usize,
    permission_requests: usize,
    watches_opened: usize,
    watches_cancelled: usize,
}

/// Scriptable platform double. Cloning shares the underlying state, so one
/// clone can drive the scenario while others serve the aggregator's probes.
#[derive(Clone)]
pub struct SimulatedPlatform {
    shared: Arc<Mutex<SimState>>,
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(SimState {
                connectivity: Connectivity::None,
                service_enabled: false,
                permission: PermissionStatus::Denied,
                permission_after_request: PermissionStatus::Denied,
                adapter_enabled: false,
                bonded: Vec::new(),
                position_feeds: Vec::new(),
                connectivity_queries: 0,
                permission_requests: 0,
                watches_opened: 0,
                watches_cancelled: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_connectivity(&self, connectivity: Connectivity) {
        self.state().connectivity = connectivity;
    }

    pub fn set_service_enabled(&self, enabled: bool) {
        self.state().service_enabled = enabled;
    }

    pub fn set_permission(&self, permission: PermissionStatus) {
        self.state().permission = permission;
    }

    /// What a permission prompt resolves to.
    pub fn set_permission_after_request(&self, permission: PermissionStatus) {
        self.state().permission_after_request = permission;
    }

    pub fn set_adapter_enabled(&self, enabled: bool) {
        self.state().adapter_enabled = enabled;
    }

    pub fn set_bonded(&self, bonded: Vec<BondedPeripheral>) {
        self.state().bonded = bonded;
    }

    pub fn bond(&self, name: &str, address: u64) {
        self.state().bonded.push(BondedPeripheral {
            name: name.to_string(),
            address,
        });
    }

    /// Feed a position fix into every open watch.
    pub fn push_position(&self, position: Position) {
        self.state()
            .position_feeds
            .retain(|feed| feed.send(position).is_ok());
    }

    pub fn connectivity_queries(&self) -> usize {
        self.state().connectivity_queries
    }

    pub fn permission_requests(&self) -> usize {
        self.state().permission_requests
    }

    pub fn watches_opened(&self) -> usize {
        self.state().watches_opened
    }

    pub fn watches_cancelled(&self) -> usize {
        self.state().watches_cancelled
    }
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectivityProbe for SimulatedPlatform {
    async fn connectivity(&self) -> Result<Connectivity, ProbeError> {
        let mut state = self.state();
        state.connectivity_queries += 1;
        Ok(state.connectivity)
    }
}

#[async_trait]
impl LocationProvider for SimulatedPlatform {
    async fn service_enabled(&self) -> Result<bool, ProbeError> {
        Ok(self.state().service_enabled)
    }

    async fn permission(&self) -> Result<PermissionStatus, ProbeError> {
        Ok(self.state().permission)
    }

    async fn request_permission(&self) -> Result<PermissionStatus, ProbeError> {
        let mut state = self.state();
        state.permission_requests += 1;
        state.permission = state.permission_after_request;
        Ok(state.permission)
    }

    async fn watch_position(&self) -> Result<Box<dyn PositionWatch>, ProbeError> {
        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        let mut state = self.state();
        state.watches_opened += 1;
        state.position_feeds.push(feed_tx);
        Ok(Box::new(SimulatedPositionWatch {
            shared: self.shared.clone(),
            _updates: feed_rx,
            cancelled: false,
        }))
    }
}

#[async_trait]
impl BluetoothProbe for SimulatedPlatform {
    async fn adapter_enabled(&self) -> Result<bool, ProbeError> {
        Ok(self.state().adapter_enabled)
    }

    async fn bonded_peripherals(&self) -> Result<Vec<BondedPeripheral>, ProbeError> {
        Ok(self.state().bonded.clone())
    }
}

/// Watch handle over a simulated position feed.
pub struct SimulatedPositionWatch {
    shared: Arc<Mutex<SimState>>,
    _updates: mpsc::UnboundedReceiver<Position>,
    cancelled: bool,
}

impl PositionWatch for SimulatedPositionWatch {
    fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        if let Ok(mut state) = self.shared.lock() {
            state.watches_cancelled += 1;
        }
    }
}

impl Drop for SimulatedPositionWatch {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watch_cancel_is_idempotent() {
        let sim = SimulatedPlatform::new();
        let mut watch = sim.watch_position().await.unwrap();

        watch.cancel();
        watch.cancel();
        assert_eq!(sim.watches_cancelled(), 1);

        // Dropping after an explicit cancel does not count twice.
        drop(watch);
        assert_eq!(sim.watches_cancelled(), 1);
    }

    #[tokio::test]
    async fn test_dropped_watch_counts_as_cancelled() {
        let sim = SimulatedPlatform::new();
        let watch = sim.watch_position().await.unwrap();
        assert_eq!(sim.watches_opened(), 1);

        drop(watch);
        assert_eq!(sim.watches_cancelled(), 1);
    }

    #[tokio::test]
    async fn test_permission_request_applies_configured_outcome() {
        let sim = SimulatedPlatform::new();
        sim.set_permission(PermissionStatus::Denied);
        sim.set_permission_after_request(PermissionStatus::Granted);

        assert_eq!(
            sim.request_permission().await.unwrap(),
            PermissionStatus::Granted
        );
        assert_eq!(sim.permission().await.unwrap(), PermissionStatus::Granted);
        assert_eq!(sim.permission_requests(), 1);
    }
}
