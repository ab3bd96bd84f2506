//! Scanner bridge.
//!
//! The bridge ties the pieces together: a pump task drains the gateway's
//! event source into the dispatcher, consumer commands go through the session
//! controller, and every outbound event is fanned out to subscribers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  next_event  ┌────────────┐  write lock  ┌────────────┐
//! │ Event source │─────────────►│ Pump task  │─────────────►│ Dispatcher │
//! └──────────────┘              └────────────┘              └─────┬──────┘
//!                                                                 │ publish
//! ┌──────────────┐  request_*   ┌────────────┐              ┌─────▼──────┐
//! │ Gateway      │◄─────────────│ Controller │              │ Fan-out    │──► subscribers
//! └──────────────┘              └────────────┘              └────────────┘
//! ```
//!
//! Registry, listening gate and fan-out share one `RwLock`. Every mutation
//! publishes its events before releasing the write lock, so subscribers see
//! events in exactly the order the registry changed.
//!
//! # Examples
//!
//! ```no_run
//! use scanlink_core::ScannerId;
//! use scanlink_gateway::mock::MockGateway;
//! use scanlink_session::{BridgeConfig, ScannerBridge};
//!
//! #[tokio::main]
//! async fn main() -> scanlink_session::Result<()> {
//!     let (gateway, events, _handle) = MockGateway::new();
//!     let bridge = ScannerBridge::new(BridgeConfig::default());
//!     bridge.attach_gateway(gateway)?;
//!
//!     let pump = bridge.start(events);
//!     let mut subscription = bridge.subscribe().await;
//!
//!     bridge.connect_scanner(ScannerId::new(7)).await?;
//!     while let Some(event) = subscription.recv().await {
//!         println!("{}", event.to_json()?);
//!     }
//!
//!     pump.shutdown().await;
//!     Ok(())
//! }
//! ```

use crate::config::BridgeConfig;
use crate::controller::{Accepted, SessionController};
use crate::dispatcher::EventDispatcher;
use crate::error::{BridgeError, Result};
use crate::fanout::{EventFanout, EventSubscription};
use crate::gate::ListeningState;
use scanlink_core::{ScannerId, ScannerRecord};
use scanlink_gateway::{
    DeviceGateway, GatewayError, GatewayEvent, GatewayEventSource, PairingBarcode, PairingOptions,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// State guarded by the bridge's single write lock.
#[derive(Debug)]
struct BridgeState {
    dispatcher: EventDispatcher,
    fanout: EventFanout,
}

#[derive(Debug)]
struct Inner<G> {
    config: BridgeConfig,
    controller: SessionController<G>,
    state: RwLock<BridgeState>,
}

/// Consumer-facing scanner bridge.
///
/// Cheap to clone; clones share the same registry, subscribers and gateway.
#[derive(Debug)]
pub struct ScannerBridge<G> {
    inner: Arc<Inner<G>>,
}

impl<G> Clone for ScannerBridge<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: DeviceGateway + 'static> ScannerBridge<G> {
    /// Create a bridge without a gateway.
    ///
    /// Commands fail with [`BridgeError::GatewayUnavailable`] until
    /// [`attach_gateway`](Self::attach_gateway) succeeds.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                controller: SessionController::new(config.gateway, config.require_known_scanner),
                state: RwLock::new(BridgeState {
                    dispatcher: EventDispatcher::new(config.auto_listen_on_connect),
                    fanout: EventFanout::new(),
                }),
            }),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Configure and attach a gateway.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::GatewayUnavailable`] if the gateway refuses the
    /// configured settings.
    pub fn attach_gateway(&self, gateway: G) -> Result<()> {
        self.inner.controller.attach(gateway)
    }

    /// Detach the current gateway. Returns `true` if one was attached.
    pub fn detach_gateway(&self) -> bool {
        self.inner.controller.detach().is_some()
    }

    pub fn is_gateway_available(&self) -> bool {
        self.inner.controller.is_available()
    }

    /// Spawn the task that drains `source` into the dispatcher.
    ///
    /// The task ends cleanly when the source reports it is disconnected and
    /// with an error on any other failure.
    pub fn start<S>(&self, mut source: S) -> PumpHandle
    where
        S: GatewayEventSource + 'static,
    {
        let bridge = self.clone();
        let mut tasks = JoinSet::new();

        tasks.spawn(async move {
            info!("Gateway event pump started");
            loop {
                match source.next_event().await {
                    Ok(event) => {
                        bridge.handle_gateway_event(event).await;
                    }
                    Err(e) if e.is_disconnected() => {
                        info!(reason = %e, "Gateway event stream ended");
                        return Ok(());
                    }
                    Err(e) => {
                        error!(error = %e, "Gateway event stream failed");
                        return Err(e);
                    }
                }
            }
        });

        PumpHandle { tasks }
    }

    /// Apply one gateway event and publish what it produced.
    ///
    /// Returns the number of outbound events emitted.
    pub async fn handle_gateway_event(&self, event: GatewayEvent) -> usize {
        let mut state = self.inner.state.write().await;
        let events = state.dispatcher.dispatch(event);
        state.fanout.publish(&events);
        events.len()
    }

    /// Open a new outbound event subscription.
    pub async fn subscribe(&self) -> EventSubscription {
        self.inner.state.write().await.fanout.subscribe()
    }

    pub async fn subscriber_count(&self) -> usize {
        self.inner.state.read().await.fanout.subscriber_count()
    }

    /// Point-in-time copy of the registry.
    pub async fn get_scanners(&self) -> Vec<ScannerRecord> {
        self.inner.state.read().await.dispatcher.registry().snapshot()
    }

    /// Request a session with a scanner.
    ///
    /// Returns once the gateway has accepted; the scanner becomes active
    /// when the gateway confirms with a session event.
    ///
    /// # Errors
    ///
    /// See [`SessionController::connect`].
    pub async fn connect_scanner(&self, id: ScannerId) -> Result<Accepted> {
        let known = self.is_known(id).await;
        self.inner.controller.connect(id, known)
    }

    /// Request a scanner's session be closed.
    ///
    /// # Errors
    ///
    /// See [`SessionController::disconnect`].
    pub async fn disconnect_scanner(&self, id: ScannerId) -> Result<Accepted> {
        let known = self.is_known(id).await;
        self.inner.controller.disconnect(id, known)
    }

    /// Registry membership for the known-scanner check.
    ///
    /// The read guard is released before the gateway is called so the pump
    /// never waits on a command in flight.
    async fn is_known(&self, id: ScannerId) -> bool {
        if !self.config().require_known_scanner {
            return true;
        }
        self.inner.state.read().await.dispatcher.registry().contains(id)
    }

    /// Drop a scanner from the registry and publish the new list.
    ///
    /// The gateway is not told; the scanner may reappear on discovery.
    pub async fn forget_scanner(&self, id: ScannerId) -> Accepted {
        let mut state = self.inner.state.write().await;
        let BridgeState { dispatcher, fanout } = &mut *state;
        let (accepted, events) = self.inner.controller.forget(dispatcher, id);
        fanout.publish(&events);
        accepted
    }

    pub async fn start_listening(&self) -> Accepted {
        if self.inner.state.write().await.dispatcher.start_listening() {
            debug!("Listening for barcodes");
        }
        Accepted::new("Started listening for barcodes")
    }

    pub async fn stop_listening(&self) -> Accepted {
        if self.inner.state.write().await.dispatcher.stop_listening() {
            debug!("Stopped listening for barcodes");
        }
        Accepted::new("Stopped listening for barcodes")
    }

    pub async fn listening_state(&self) -> ListeningState {
        self.inner.state.read().await.dispatcher.listening_state()
    }

    pub async fn is_listening(&self) -> bool {
        self.listening_state().await == ListeningState::Listening
    }

    /// Render a scan-to-connect barcode.
    ///
    /// # Errors
    ///
    /// See [`SessionController::pairing_barcode`].
    pub fn generate_pairing_barcode(&self, options: &PairingOptions) -> Result<PairingBarcode> {
        self.inner.controller.pairing_barcode(options)
    }
}

/// Handle to the gateway event pump.
#[derive(Debug)]
pub struct PumpHandle {
    tasks: JoinSet<scanlink_gateway::Result<()>>,
}

impl PumpHandle {
    /// Wait for the pump to stop on its own.
    ///
    /// # Errors
    ///
    /// Returns the gateway error that stopped the pump, if any.
    pub async fn wait(mut self) -> Result<()> {
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(BridgeError::from(e)),
                Err(e) => return Err(BridgeError::Gateway(GatewayError::other(e.to_string()))),
            }
        }
        Ok(())
    }

    /// Stop the pump.
    ///
    /// Aborts the task and waits for it to finish. Failures are logged, not
    /// returned.
    pub async fn shutdown(mut self) {
        self.tasks.abort_all();

        while let Some(result) = self.tasks.join_next().await {
            match classify_task_result(result) {
                TaskTermination::Success | TaskTermination::Cancelled => {}
                TaskTermination::Error => warn!("Gateway event pump ended with an error"),
                TaskTermination::Panic => error!("Gateway event pump panicked"),
            }
        }
        debug!("Gateway event pump stopped");
    }
}

fn classify_task_result(
    result: std::result::Result<scanlink_gateway::Result<()>, tokio::task::JoinError>,
) -> TaskTermination {
    match result {
        Ok(Ok(())) => TaskTermination::Success,
        Ok(Err(_)) => TaskTermination::Error,
        Err(e) if e.is_cancelled() => TaskTermination::Cancelled,
        Err(_) => TaskTermination::Panic,
    }
}

/// How the pump task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskTermination {
    Success,
    Error,
    /// Expected during shutdown.
    Cancelled,
    Panic,
}
