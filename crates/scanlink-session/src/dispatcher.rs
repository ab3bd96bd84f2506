//! Event dispatcher.
//!
//! Turns gateway events into registry mutations and outbound events. The
//! dispatcher owns the registry and the listening gate; it performs no I/O and
//! is driven by the bridge under its write lock.
//!
//! | Gateway event | Registry | Emitted |
//! |---|---|---|
//! | `ScannerAppeared` | upsert available | list changed |
//! | `ScannerDisappeared` | remove available | list changed |
//! | `SessionEstablished` | add active, upsert available | connected, list changed |
//! | `SessionTerminated` | remove active | disconnected, list changed |
//! | `BarcodeData` | none | barcode scan while listening |
//! | `Auxiliary` | none | nothing |
//!
//! Specific events always come before the list-changed event of the same
//! trigger.

use crate::error::{BridgeError, Result};
use crate::event::{OutboundEvent, ScannerRef};
use crate::gate::{ListeningGate, ListeningState};
use crate::registry::ScannerRegistry;
use scanlink_core::constants::{UNKNOWN_ENCODING, UNKNOWN_NAME};
use scanlink_core::{ConnectionType, ScannerId, ScannerRecord};
use scanlink_gateway::{GatewayEvent, ScannerInfo};
use tracing::{debug, trace, warn};

/// Decode a barcode payload as UTF-8.
///
/// # Errors
///
/// Returns [`BridgeError::DecodeFallback`] if the bytes are not valid UTF-8.
pub fn decode_barcode(scanner_id: ScannerId, data: &[u8]) -> Result<String> {
    std::str::from_utf8(data)
        .map(str::to_owned)
        .map_err(|_| BridgeError::DecodeFallback {
            scanner_id,
            len: data.len(),
        })
}

/// Registry and listening gate, plus the transition table between them.
#[derive(Debug, Clone, Default)]
pub struct EventDispatcher {
    registry: ScannerRegistry,
    gate: ListeningGate,
}

impl EventDispatcher {
    pub fn new(auto_listen_on_connect: bool) -> Self {
        Self {
            registry: ScannerRegistry::new(),
            gate: ListeningGate::new(auto_listen_on_connect),
        }
    }

    pub fn registry(&self) -> &ScannerRegistry {
        &self.registry
    }

    pub fn listening_state(&self) -> ListeningState {
        self.gate.state()
    }

    /// Apply a gateway event and return the events to emit, in order.
    pub fn dispatch(&mut self, event: GatewayEvent) -> Vec<OutboundEvent> {
        trace!(kind = event.kind(), scanner_id = %event.scanner_id(), "Dispatching gateway event");

        match event {
            GatewayEvent::ScannerAppeared { scanner } => {
                let record = self.resolve(scanner);
                debug!(scanner_id = %record.id, name = %record.name, "Scanner appeared");
                self.registry.upsert_available(record);
                vec![self.list_changed()]
            }

            GatewayEvent::ScannerDisappeared { id } => {
                if self.registry.remove_available(id).is_none() {
                    debug!(scanner_id = %id, "Disappearance for unregistered scanner");
                }
                if self.registry.is_active(id) {
                    debug!(scanner_id = %id, "Active scanner disappeared without termination");
                }
                vec![self.list_changed()]
            }

            GatewayEvent::SessionEstablished { scanner } => {
                let record = self.resolve(scanner);
                debug!(scanner_id = %record.id, name = %record.name, "Session established");
                self.registry.add_active(record.clone());
                self.registry.upsert_available(record.clone());
                if self.gate.on_session_established() {
                    debug!(scanner_id = %record.id, "Listening started on connect");
                }
                vec![
                    OutboundEvent::ScannerConnected {
                        scanner: record.with_active(true),
                    },
                    self.list_changed(),
                ]
            }

            GatewayEvent::SessionTerminated { id } => {
                let removed = self.registry.remove_active(id);
                if removed.is_none() {
                    debug!(scanner_id = %id, "Termination for scanner that was not active");
                }
                let name = self
                    .registry
                    .get(id)
                    .or(removed.as_ref())
                    .map_or_else(|| UNKNOWN_NAME.to_string(), |r| r.name.clone());
                debug!(scanner_id = %id, name = %name, "Session terminated");

                vec![
                    OutboundEvent::ScannerDisconnected {
                        scanner: ScannerRef::new(id, name),
                    },
                    self.list_changed(),
                ]
            }

            GatewayEvent::BarcodeData {
                data,
                barcode_type,
                scanner_id,
            } => {
                if !self.gate.allows_barcodes() {
                    trace!(scanner_id = %scanner_id, "Barcode suppressed, not listening");
                    return Vec::new();
                }

                let text = decode_barcode(scanner_id, &data).unwrap_or_else(|e| {
                    warn!(error = %e, "Substituting barcode payload");
                    UNKNOWN_ENCODING.to_string()
                });

                vec![OutboundEvent::BarcodeScan {
                    data: text,
                    barcode_type,
                    scanner: ScannerRef::new(scanner_id, self.registry.lookup_name(scanner_id)),
                }]
            }

            GatewayEvent::Auxiliary { event } => {
                debug!(scanner_id = %event.scanner_id(), event = ?event, "Ignoring auxiliary event");
                Vec::new()
            }
        }
    }

    /// Remove a scanner from both registry sets.
    ///
    /// Always emits a list-changed event, even when nothing was removed.
    pub fn forget(&mut self, id: ScannerId) -> Vec<OutboundEvent> {
        if self.registry.forget(id) {
            debug!(scanner_id = %id, "Scanner forgotten");
        }
        vec![self.list_changed()]
    }

    /// Returns `true` if the gate opened.
    pub fn start_listening(&mut self) -> bool {
        self.gate.start()
    }

    /// Returns `true` if the gate closed.
    pub fn stop_listening(&mut self) -> bool {
        self.gate.stop()
    }

    fn list_changed(&self) -> OutboundEvent {
        OutboundEvent::ScannerListChanged {
            scanners: self.registry.snapshot(),
        }
    }

    /// Build a record from gateway info, keeping known metadata the gateway
    /// did not repeat.
    fn resolve(&self, info: ScannerInfo) -> ScannerRecord {
        let Some(known) = self.registry.get(info.id) else {
            return info.into();
        };

        ScannerRecord::new(
            info.id,
            info.name.unwrap_or_else(|| known.name.clone()),
            info.model.unwrap_or_else(|| known.model.clone()),
            match info.connection_type {
                ConnectionType::Unknown => known.connection_type,
                other => other,
            },
        )
    }
}
