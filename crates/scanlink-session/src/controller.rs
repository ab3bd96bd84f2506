//! Session controller.
//!
//! Forwards consumer commands to the attached gateway. Connect and disconnect
//! return as soon as the gateway accepts or refuses; the registry changes
//! only when the matching session event arrives through the dispatcher.
//!
//! There is no timeout on pending commands. A gateway that accepts a connect
//! and never confirms it leaves the scanner inactive.

use crate::dispatcher::EventDispatcher;
use crate::error::{BridgeError, Result};
use crate::event::OutboundEvent;
use scanlink_core::ScannerId;
use scanlink_gateway::{
    CommProtocol, DeviceGateway, GatewayError, GatewaySettings, PairingBarcode, PairingOptions,
};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Acknowledgement for an accepted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub message: String,
}

impl Accepted {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Accepted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Command side of the bridge.
#[derive(Debug)]
pub struct SessionController<G> {
    gateway: RwLock<Option<Arc<G>>>,
    settings: GatewaySettings,
    require_known_scanner: bool,
}

impl<G: DeviceGateway> SessionController<G> {
    pub fn new(settings: GatewaySettings, require_known_scanner: bool) -> Self {
        Self {
            gateway: RwLock::new(None),
            settings,
            require_known_scanner,
        }
    }

    /// Configure `gateway` and make it the command target.
    ///
    /// A previously attached gateway is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::GatewayUnavailable`] if configuration fails; the
    /// controller is then left without a gateway.
    pub fn attach(&self, gateway: G) -> Result<()> {
        let configured = gateway.configure(&self.settings);
        let mut slot = self.gateway.write().unwrap_or_else(PoisonError::into_inner);

        match configured {
            Ok(()) => {
                info!(
                    mode = self.settings.operational_mode.code(),
                    event_mask = self.settings.event_mask.bits(),
                    "Gateway attached"
                );
                *slot = Some(Arc::new(gateway));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Gateway configuration failed");
                *slot = None;
                Err(BridgeError::GatewayUnavailable)
            }
        }
    }

    /// Release the gateway. Commands fail until another one is attached.
    pub fn detach(&self) -> Option<Arc<G>> {
        let detached = self
            .gateway
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if detached.is_some() {
            info!("Gateway detached");
        }
        detached
    }

    pub fn is_available(&self) -> bool {
        self.gateway
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Ask the gateway to open a session with `id`.
    ///
    /// `known` tells whether `id` is currently registered. The gateway call
    /// runs without any bridge state borrowed.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::GatewayUnavailable`] if no gateway is attached or it
    ///   is not initialized
    /// - [`BridgeError::UnknownScannerId`] if known scanners are required and
    ///   `id` is not registered
    /// - [`BridgeError::CommandRejected`] if the gateway refuses
    pub fn connect(&self, id: ScannerId, known: bool) -> Result<Accepted> {
        let gateway = self.checked_gateway(id, known)?;
        gateway.request_connect(id).map_err(|e| {
            debug!(scanner_id = %id, error = %e, "Connect refused");
            BridgeError::from(e)
        })?;
        debug!(scanner_id = %id, "Connect requested");
        Ok(Accepted::new(format!("Connecting to scanner {id}")))
    }

    /// Ask the gateway to close the session with `id`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`connect`](Self::connect).
    pub fn disconnect(&self, id: ScannerId, known: bool) -> Result<Accepted> {
        let gateway = self.checked_gateway(id, known)?;
        gateway.request_disconnect(id).map_err(|e| {
            debug!(scanner_id = %id, error = %e, "Disconnect refused");
            BridgeError::from(e)
        })?;
        debug!(scanner_id = %id, "Disconnect requested");
        Ok(Accepted::new(format!("Disconnected scanner {id}")))
    }

    /// Drop `id` from the registry without touching the gateway.
    ///
    /// The device is not unpaired and may reappear on the next discovery.
    pub fn forget(
        &self,
        dispatcher: &mut EventDispatcher,
        id: ScannerId,
    ) -> (Accepted, Vec<OutboundEvent>) {
        let events = dispatcher.forget(id);
        (Accepted::new(format!("Forgot scanner {id}")), events)
    }

    /// Render a pairing barcode through the gateway.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::PairingUnsupported`] for HID
    /// - [`BridgeError::GatewayUnavailable`] if no gateway is attached
    /// - [`BridgeError::PairingFailed`] if the gateway cannot encode the image
    pub fn pairing_barcode(&self, options: &PairingOptions) -> Result<PairingBarcode> {
        if options.protocol == CommProtocol::Hid {
            return Err(BridgeError::PairingUnsupported {
                protocol: options.protocol,
            });
        }

        let gateway = self.gateway()?;
        gateway.pairing_barcode(options).map_err(|e| match e {
            GatewayError::Unsupported { .. } => BridgeError::PairingUnsupported {
                protocol: options.protocol,
            },
            GatewayError::PairingFailed { message } => BridgeError::PairingFailed { message },
            other => BridgeError::from(other),
        })
    }

    fn gateway(&self) -> Result<Arc<G>> {
        self.gateway
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(BridgeError::GatewayUnavailable)
    }

    fn checked_gateway(&self, id: ScannerId, known: bool) -> Result<Arc<G>> {
        let gateway = self.gateway()?;
        if self.require_known_scanner && !known {
            return Err(BridgeError::UnknownScannerId { id });
        }
        Ok(gateway)
    }
}
