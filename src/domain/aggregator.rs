//! Readiness Aggregator
//!
//! Polls the four platform signals on a fixed cadence, publishes the
//! aggregated [`ReadinessState`] and fires a one-shot ready transition once
//! every signal is green at the same time.

use crate::domain::models::{PermissionStatus, ReadinessEvent, ReadinessState, PERIPHERAL_NAME};
use crate::domain::platform::{
    BluetoothProbe, ConnectivityProbe, LocationProvider, PositionWatch, ProbeError,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Configuration for polling behavior
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Time between two polling ticks
    pub poll_interval: Duration,
    /// Budget for a single platform query before its signal defaults to false
    pub probe_timeout: Duration,
    /// Pause between the gate opening and the ready signal, so the all-green
    /// state stays visible for a moment
    pub ready_grace: Duration,
    /// Bonded peripheral name that counts as paired (exact, case-sensitive)
    pub peripheral_name: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            probe_timeout: Duration::from_secs(5),
            ready_grace: Duration::from_secs(2),
            peripheral_name: PERIPHERAL_NAME.to_string(),
        }
    }
}

/// Polling state machine aggregating the four readiness signals.
///
/// Construct it with the platform probes and an event channel, then call
/// [`start`](Self::start) to begin polling. The caller keeps the returned
/// [`ReadinessHandle`] and invokes [`stop`](ReadinessHandle::stop) on
/// teardown.
pub struct ReadinessAggregator {
    connectivity: Arc<dyn ConnectivityProbe>,
    location: Arc<dyn LocationProvider>,
    bluetooth: Arc<dyn BluetoothProbe>,
    config: AggregatorConfig,
    event_tx: mpsc::UnboundedSender<ReadinessEvent>,
    state: ReadinessState,
    published: ReadinessState,
    position_watch: Option<Box<dyn PositionWatch>>,
    permission_denied_forever: bool,
}

impl ReadinessAggregator {
    /// Create a new aggregator. Nothing is polled until [`start`](Self::start).
    pub fn new(
        connectivity: Arc<dyn ConnectivityProbe>,
        location: Arc<dyn LocationProvider>,
        bluetooth: Arc<dyn BluetoothProbe>,
        config: AggregatorConfig,
        event_tx: mpsc::UnboundedSender<ReadinessEvent>,
    ) -> Self {
        Self {
            connectivity,
            location,
            bluetooth,
            config,
            event_tx,
            state: ReadinessState::default(),
            published: ReadinessState::default(),
            position_watch: None,
            permission_denied_forever: false,
        }
    }

    /// Start polling. Consumes the aggregator and moves it into a spawned
    /// task; the first full tick fires one `poll_interval` after start, with
    /// an immediate location-only check run up front to populate initial
    /// state faster.
    pub fn start(self) -> ReadinessHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let poll_task = tokio::spawn(self.run(stop_rx));

        ReadinessHandle {
            poll_task: Some(poll_task),
            stop_tx: Some(stop_tx),
        }
    }

    async fn run(mut self, mut stop_rx: oneshot::Receiver<()>) {
        info!(
            "Readiness polling started (interval: {:?})",
            self.config.poll_interval
        );

        // Out-of-band location check so the screen does not sit on a stale
        // location signal for a whole interval.
        self.check_location().await;
        self.publish();

        let mut timer = time::interval_at(
            Instant::now() + self.config.poll_interval,
            self.config.poll_interval,
        );
        // Ticks are serialized; a slow tick delays the next one instead of
        // stacking re-entrant runs.
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let ready = loop {
            tokio::select! {
                _ = &mut stop_rx => break false,
                _ = timer.tick() => {
                    if self.tick().await {
                        break true;
                    }
                }
            }
        };
        drop(timer);

        if ready {
            debug!(
                "All signals green, holding for {:?} before ready",
                self.config.ready_grace
            );
            tokio::select! {
                _ = &mut stop_rx => {
                    info!("Stopped during ready grace period");
                }
                _ = time::sleep(self.config.ready_grace) => {
                    info!("Device environment ready");
                    let _ = self.event_tx.send(ReadinessEvent::Ready);
                }
            }
        }

        self.cancel_position_watch();
        debug!("Readiness polling finished");
    }

    /// One polling pass. Checks run in a fixed order and each one may update
    /// the shared snapshot before the next begins. Returns whether the
    /// aggregate gate is satisfied.
    async fn tick(&mut self) -> bool {
        let connectivity = self
            .guarded("connectivity", self.connectivity.connectivity())
            .await;
        self.state.network = connectivity.map(|c| c.is_online()).unwrap_or(false);

        self.check_location().await;

        let adapter = self
            .guarded("bluetooth adapter", self.bluetooth.adapter_enabled())
            .await;
        self.state.bluetooth_adapter = adapter.unwrap_or(false);

        let bonded = self
            .guarded("bonded peripherals", self.bluetooth.bonded_peripherals())
            .await;
        self.state.peripheral_paired = bonded
            .map(|devices| {
                devices
                    .iter()
                    .any(|d| d.name == self.config.peripheral_name)
            })
            .unwrap_or(false);

        self.publish();
        debug!("Tick complete: {:?}", self.state);
        self.state.all_ready()
    }

    /// Location check. Every branch is terminal for the invocation.
    async fn check_location(&mut self) {
        let enabled = self
            .guarded("location service", self.location.service_enabled())
            .await
            .unwrap_or(false);

        if !enabled {
            self.state.location = false;
            if self.position_watch.is_some() {
                info!("Location service disabled, cancelling position watch");
                self.cancel_position_watch();
            }
            return;
        }

        let mut permission = match self
            .guarded("location permission", self.location.permission())
            .await
        {
            Some(p) => p,
            None => {
                self.state.location = false;
                return;
            }
        };

        if permission == PermissionStatus::Denied && !self.permission_denied_forever {
            info!("Location permission denied, prompting user");
            permission = match self
                .guarded("permission request", self.location.request_permission())
                .await
            {
                Some(p) => p,
                None => {
                    self.state.location = false;
                    return;
                }
            };
        }

        match permission {
            PermissionStatus::Granted => {
                self.state.location = true;
                self.ensure_position_watch().await;
            }
            PermissionStatus::DeniedForever => {
                if !self.permission_denied_forever {
                    warn!("Location permission permanently denied, will not prompt again");
                }
                self.permission_denied_forever = true;
                self.state.location = false;
            }
            PermissionStatus::Denied => {
                self.state.location = false;
            }
        }
    }

    /// Open the continuous position stream unless one is already open.
    /// The updates themselves are not consumed here; the stream exists so
    /// the platform keeps its location pipeline warm.
    async fn ensure_position_watch(&mut self) {
        if self.position_watch.is_some() {
            return;
        }

        if let Some(watch) = self
            .guarded("position watch", self.location.watch_position())
            .await
        {
            info!("Position watch opened");
            self.position_watch = Some(watch);
        }
    }

    fn cancel_position_watch(&mut self) {
        if let Some(mut watch) = self.position_watch.take() {
            watch.cancel();
        }
    }

    fn publish(&mut self) {
        if self.state != self.published {
            self.published = self.state;
            let _ = self
                .event_tx
                .send(ReadinessEvent::StateChanged(self.state));
        }
    }

    /// Run a platform query under the per-check budget. A failed or hung
    /// query logs and yields `None`, so one dead probe cannot block the
    /// remaining checks.
    async fn guarded<T>(
        &self,
        what: &str,
        query: impl Future<Output = Result<T, ProbeError>>,
    ) -> Option<T> {
        match time::timeout(self.config.probe_timeout, query).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!("{} probe failed: {}", what, e);
                None
            }
            Err(_) => {
                warn!(
                    "{} probe timed out after {:?}",
                    what, self.config.probe_timeout
                );
                None
            }
        }
    }
}

/// Handle to a running aggregator. Stops it on request; dropping the handle
/// without stopping aborts the polling task (the watch's drop-cancel
/// contract keeps the position stream from leaking).
pub struct ReadinessHandle {
    poll_task: Option<JoinHandle<()>>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl ReadinessHandle {
    /// Stop polling and release the position watch. Safe to call more than
    /// once; the second call is a no-op.
    pub async fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Send fails when the task already finished on its own.
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.poll_task.take() {
            let _ = task.await;
        }
    }

    /// Whether the polling task is still alive.
    pub fn is_running(&self) -> bool {
        self.poll_task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for ReadinessHandle {
    fn drop(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }
}
