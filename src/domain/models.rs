use serde::{Deserialize, Serialize};

/// Name the peripheral advertises itself under when bonded.
pub const PERIPHERAL_NAME: &str = "TURN_CUE";

/// Snapshot of the four readiness signals. Recomputed per tick and published
/// to subscribers as an immutable value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessState {
    pub network: bool,
    pub location: bool,
    pub bluetooth_adapter: bool,
    pub peripheral_paired: bool,
}

impl ReadinessState {
    /// True when every signal is green at the same time.
    pub fn all_ready(&self) -> bool {
        self.network && self.location && self.bluetooth_adapter && self.peripheral_paired
    }
}

#[derive(Debug, Clone)]
pub enum ReadinessEvent {
    /// The signal snapshot changed since the last published value.
    StateChanged(ReadinessState),
    /// All four signals held true through a completed tick. Fired at most once.
    Ready,
}

/// Network reachability as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    None,
    Wifi,
    Mobile,
    Ethernet,
    Other,
}

impl Connectivity {
    pub fn is_online(&self) -> bool {
        !matches!(self, Connectivity::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Denied and not promptable again; the user has to change system
    /// settings outside the app.
    DeniedForever,
}

/// A peripheral the platform reports as bonded/paired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondedPeripheral {
    pub name: String,
    pub address: u64,
}

/// A position fix from the continuous location stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}
