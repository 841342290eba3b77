//! Readiness Domain
//!
//! Aggregates the device environment checks the TURN_CUE companion needs
//! before it can hand over to the home screen.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  ReadinessAggregator                     │
//! │  (polling state machine - public API for the caller)     │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!         ┌─────────────┼─────────────┐
//!         │             │             │
//!         ▼             ▼             ▼
//! ┌───────────┐  ┌────────────┐  ┌──────────┐
//! │Connectivity│ │  Location  │  │ Bluetooth│
//! │  Probe    │  │  Provider  │  │  Probe   │
//! │           │  │            │  │          │
//! │ - reach-  │  │ - service  │  │ - adapter│
//! │   ability │  │ - permission│ │   power  │
//! │           │  │ - positions │ │ - bonding│
//! └───────────┘  └────────────┘  └──────────┘
//! ```
//!
//! ## Modules
//!
//! - [`models`] - signal snapshot, events and platform value types
//! - [`platform`] - capability ports the host application implements
//! - [`aggregator`] - the polling state machine itself
//! - [`settings`] - file-backed configuration

pub mod aggregator;
pub mod models;
pub mod platform;
pub mod settings;

// Re-export the aggregator for convenience
pub use aggregator::ReadinessAggregator;
