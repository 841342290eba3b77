use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use turn_cue_readiness::domain::models::{Connectivity, PermissionStatus, ReadinessEvent};
use turn_cue_readiness::domain::settings::SettingsService;
use turn_cue_readiness::infrastructure::{logging, simulated::SimulatedPlatform};
use turn_cue_readiness::{ReadinessAggregator, PERIPHERAL_NAME};

/// Console demo: runs the aggregator against the simulated platform while a
/// scripted bring-up flips the environment online piece by piece.
#[tokio::main]
async fn main() -> Result<()> {
    let settings = SettingsService::new()?;
    let _logging_guard = logging::init_logger(&settings.get().log_settings)?;

    info!("Starting TURN_CUE readiness demo");

    let platform = SimulatedPlatform::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let aggregator = ReadinessAggregator::new(
        Arc::new(platform.clone()),
        Arc::new(platform.clone()),
        Arc::new(platform.clone()),
        settings.get().readiness.aggregator_config(),
        event_tx,
    );
    let mut handle = aggregator.start();

    let script = platform.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        script.set_connectivity(Connectivity::Wifi);
        tokio::time::sleep(Duration::from_secs(1)).await;
        script.set_adapter_enabled(true);
        tokio::time::sleep(Duration::from_secs(1)).await;
        script.bond(PERIPHERAL_NAME, 0x0011_2233_4455);
        tokio::time::sleep(Duration::from_secs(1)).await;
        script.set_permission(PermissionStatus::Granted);
        script.set_service_enabled(true);
    });

    while let Some(event) = event_rx.recv().await {
        match event {
            ReadinessEvent::StateChanged(state) => {
                info!(
                    "Signals - network: {}, location: {}, bluetooth: {}, paired: {}",
                    state.network, state.location, state.bluetooth_adapter, state.peripheral_paired
                );
            }
            ReadinessEvent::Ready => {
                info!("All systems go, handing over to the home screen");
                break;
            }
        }
    }

    handle.stop().await;
    Ok(())
}
