//! Outbound events delivered to consumers.
//!
//! Serialized as JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "scannerListChanged", "scanners": [{"id": 7, "name": "DS2278", ...}]}
//! {"type": "scannerConnected", "scanner": {"id": 7, "name": "DS2278", ..., "isActive": true}}
//! {"type": "scannerDisconnected", "scanner": {"id": 7, "name": "DS2278"}}
//! {"type": "barcodeScan", "data": "12345", "barcodeType": 1, "scanner": {"id": 7, "name": "DS2278"}}
//! ```

use crate::error::{BridgeError, Result};
use scanlink_core::{ScannerId, ScannerRecord};
use serde::{Deserialize, Serialize};

/// Id and display name of the scanner an event refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerRef {
    pub id: ScannerId,
    pub name: String,
}

impl ScannerRef {
    pub fn new(id: ScannerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Event emitted by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundEvent {
    /// Registry membership or activity changed.
    ScannerListChanged { scanners: Vec<ScannerRecord> },

    /// A session was established.
    ScannerConnected { scanner: ScannerRecord },

    /// A session was closed. The name is the last one the registry knew.
    ScannerDisconnected { scanner: ScannerRef },

    /// A barcode was scanned while listening.
    BarcodeScan {
        data: String,
        barcode_type: i32,
        scanner: ScannerRef,
    },
}

impl OutboundEvent {
    /// Wire name of the event.
    pub fn event_name(&self) -> &'static str {
        match self {
            OutboundEvent::ScannerListChanged { .. } => "scannerListChanged",
            OutboundEvent::ScannerConnected { .. } => "scannerConnected",
            OutboundEvent::ScannerDisconnected { .. } => "scannerDisconnected",
            OutboundEvent::BarcodeScan { .. } => "barcodeScan",
        }
    }

    /// Whether this is the generic list-changed notification.
    pub fn is_list_changed(&self) -> bool {
        matches!(self, OutboundEvent::ScannerListChanged { .. })
    }

    /// Scanner a specific event refers to; `None` for list changes.
    pub fn scanner_id(&self) -> Option<ScannerId> {
        match self {
            OutboundEvent::ScannerListChanged { .. } => None,
            OutboundEvent::ScannerConnected { scanner } => Some(scanner.id),
            OutboundEvent::ScannerDisconnected { scanner }
            | OutboundEvent::BarcodeScan { scanner, .. } => Some(scanner.id),
        }
    }

    /// Serialize to the JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Encoding`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| BridgeError::Encoding(e.to_string()))
    }
}
