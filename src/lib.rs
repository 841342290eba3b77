// TURN_CUE Readiness - device environment gate for the TURN_CUE companion app

pub mod domain;
pub mod infrastructure;

pub use domain::aggregator::{AggregatorConfig, ReadinessAggregator, ReadinessHandle};
pub use domain::models::{ReadinessEvent, ReadinessState, PERIPHERAL_NAME};
pub use domain::platform::{
    BluetoothProbe, ConnectivityProbe, LocationProvider, PositionWatch, ProbeError,
};
