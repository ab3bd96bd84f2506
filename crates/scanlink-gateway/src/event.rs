//! Raw events emitted by a device-communication gateway.

use crate::types::ScannerInfo;
use scanlink_core::ScannerId;
use serde::{Deserialize, Serialize};

/// Event reported by the gateway.
///
/// The five core kinds drive the scanner registry and the outbound event
/// stream. Auxiliary notifications are accepted but carry no registry
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GatewayEvent {
    /// A scanner became discoverable.
    ScannerAppeared { scanner: ScannerInfo },

    /// A scanner is no longer discoverable.
    ScannerDisappeared { id: ScannerId },

    /// A communication session with a scanner was opened.
    SessionEstablished { scanner: ScannerInfo },

    /// A communication session with a scanner was closed.
    SessionTerminated { id: ScannerId },

    /// A scanner decoded a barcode.
    BarcodeData {
        data: Vec<u8>,
        barcode_type: i32,
        scanner_id: ScannerId,
    },

    /// Notification the bridge only logs.
    Auxiliary { event: AuxiliaryEvent },
}

impl GatewayEvent {
    /// Short name used in log records.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayEvent::ScannerAppeared { .. } => "scanner_appeared",
            GatewayEvent::ScannerDisappeared { .. } => "scanner_disappeared",
            GatewayEvent::SessionEstablished { .. } => "session_established",
            GatewayEvent::SessionTerminated { .. } => "session_terminated",
            GatewayEvent::BarcodeData { .. } => "barcode_data",
            GatewayEvent::Auxiliary { .. } => "auxiliary",
        }
    }

    /// Scanner the event refers to.
    pub fn scanner_id(&self) -> ScannerId {
        match self {
            GatewayEvent::ScannerAppeared { scanner }
            | GatewayEvent::SessionEstablished { scanner } => scanner.id,
            GatewayEvent::ScannerDisappeared { id } | GatewayEvent::SessionTerminated { id } => *id,
            GatewayEvent::BarcodeData { scanner_id, .. } => *scanner_id,
            GatewayEvent::Auxiliary { event } => event.scanner_id(),
        }
    }
}

/// Device notifications outside the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AuxiliaryEvent {
    /// Trigger pressed or released.
    Trigger { scanner_id: ScannerId, pressed: bool },

    /// Captured image.
    Image { scanner_id: ScannerId, data: Vec<u8> },

    /// Video frame.
    Video { scanner_id: ScannerId, frame: Vec<u8> },

    /// Firmware update progress.
    FirmwareUpdate { scanner_id: ScannerId, status: String },
}

impl AuxiliaryEvent {
    pub fn scanner_id(&self) -> ScannerId {
        match self {
            AuxiliaryEvent::Trigger { scanner_id, .. }
            | AuxiliaryEvent::Image { scanner_id, .. }
            | AuxiliaryEvent::Video { scanner_id, .. }
            | AuxiliaryEvent::FirmwareUpdate { scanner_id, .. } => *scanner_id,
        }
    }
}
