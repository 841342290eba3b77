//! Platform Capability Ports
//!
//! The aggregator never talks to the operating system directly. Each
//! capability it polls is expressed as a small trait the host application
//! implements with whatever platform API it has (connectivity manager,
//! location service, Bluetooth stack). [`crate::infrastructure::simulated`]
//! provides an in-process implementation for tests and demos.

use crate::domain::models::{BondedPeripheral, Connectivity, PermissionStatus};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single platform query. Never fatal to the aggregator: the
/// affected signal is treated as false for the current tick and polling
/// continues.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The platform call itself failed.
    #[error("platform query failed: {0}")]
    Query(String),
    /// The capability does not exist on this platform.
    #[error("capability unavailable: {0}")]
    Unavailable(&'static str),
}

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Current network reachability.
    async fn connectivity(&self) -> Result<Connectivity, ProbeError>;
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Whether the platform's location service is switched on.
    async fn service_enabled(&self) -> Result<bool, ProbeError>;

    /// Current location permission state.
    async fn permission(&self) -> Result<PermissionStatus, ProbeError>;

    /// Prompt the user for location permission and return the updated state.
    async fn request_permission(&self) -> Result<PermissionStatus, ProbeError>;

    /// Open a continuous stream of position updates.
    ///
    /// The returned handle owns the stream; the caller decides when to
    /// cancel it. At most one watch is held per aggregator.
    async fn watch_position(&self) -> Result<Box<dyn PositionWatch>, ProbeError>;
}

#[async_trait]
pub trait BluetoothProbe: Send + Sync {
    /// Whether the Bluetooth adapter is powered on.
    ///
    /// Contract: an unknown or unreadable adapter state collapses to `false`.
    async fn adapter_enabled(&self) -> Result<bool, ProbeError>;

    /// Peripherals the platform reports as bonded/paired, in platform order.
    async fn bonded_peripherals(&self) -> Result<Vec<BondedPeripheral>, ProbeError>;
}

/// Cancellable handle to an open position stream.
///
/// Contract:
/// - `cancel` is idempotent (a second call is a no-op, not an error)
/// - implementations also cancel when dropped, so an aborted owner cannot
///   leak the underlying stream
pub trait PositionWatch: Send + Sync {
    fn cancel(&mut self);
}


#[cfg(test)]
pub use mocks::{MockBluetooth, MockConnectivity, MockLocation};
