//! Common types shared by gateway implementations.
//!
//! Raw scanner metadata as reported by the device SDK, operational settings
//! applied when a gateway is attached, and pairing-barcode request/response
//! types.

use scanlink_core::{ConnectionType, ScannerId, ScannerRecord, constants::UNKNOWN_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Scanner metadata as reported by the gateway.
///
/// Device SDKs may omit the name or model; conversion into a
/// [`ScannerRecord`] substitutes [`UNKNOWN_NAME`] for missing values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerInfo {
    pub id: ScannerId,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub connection_type: ConnectionType,
}

impl ScannerInfo {
    /// Create scanner info with all metadata present.
    pub fn new(
        id: ScannerId,
        name: impl Into<String>,
        model: impl Into<String>,
        connection_type: ConnectionType,
    ) -> Self {
        Self {
            id,
            name: Some(name.into()),
            model: Some(model.into()),
            connection_type,
        }
    }

    /// Create scanner info carrying only an id.
    pub fn bare(id: ScannerId) -> Self {
        Self {
            id,
            name: None,
            model: None,
            connection_type: ConnectionType::Unknown,
        }
    }

    /// Display name, falling back to the unknown marker.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }
}

impl From<ScannerInfo> for ScannerRecord {
    fn from(info: ScannerInfo) -> Self {
        ScannerRecord::new(
            info.id,
            info.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            info.model.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            info.connection_type,
        )
    }
}

/// Radio modes the gateway enables when attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationalMode {
    /// MFi scanners only.
    Mfi,

    /// Bluetooth LE scanners only.
    Ble,

    /// MFi and Bluetooth LE.
    #[default]
    All,
}

impl OperationalMode {
    /// Numeric mode code: a bitmask of MFi (1) and BLE (2).
    pub fn code(self) -> u8 {
        match self {
            OperationalMode::Mfi => 1,
            OperationalMode::Ble => 2,
            OperationalMode::All => 3,
        }
    }
}

impl std::str::FromStr for OperationalMode {
    type Err = scanlink_core::Error;

    fn from_str(s: &str) -> scanlink_core::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mfi" => Ok(OperationalMode::Mfi),
            "ble" => Ok(OperationalMode::Ble),
            "all" => Ok(OperationalMode::All),
            _ => Err(scanlink_core::Error::Config(format!(
                "Invalid operational mode: {s}"
            ))),
        }
    }
}

/// Set of gateway event kinds a subscriber asks to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventMask(u32);

impl EventMask {
    pub const NONE: EventMask = EventMask(0);
    pub const SCANNER_APPEARANCE: EventMask = EventMask(1 << 0);
    pub const SCANNER_DISAPPEARANCE: EventMask = EventMask(1 << 1);
    pub const SESSION_ESTABLISHMENT: EventMask = EventMask(1 << 2);
    pub const SESSION_TERMINATION: EventMask = EventMask(1 << 3);
    pub const BARCODE: EventMask = EventMask(1 << 4);

    /// Every event kind the bridge consumes.
    pub const fn bridge_default() -> Self {
        EventMask(
            Self::SCANNER_APPEARANCE.0
                | Self::SCANNER_DISAPPEARANCE.0
                | Self::SESSION_ESTABLISHMENT.0
                | Self::SESSION_TERMINATION.0
                | Self::BARCODE.0,
        )
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: EventMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::bridge_default()
    }
}

impl BitOr for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: EventMask) -> EventMask {
        EventMask(self.0 | rhs.0)
    }
}

/// Settings applied to a gateway when it is attached to a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewaySettings {
    /// Radio modes to enable.
    pub operational_mode: OperationalMode,

    /// Report scanners that become available.
    pub available_scanner_detection: bool,

    /// Actively discover Bluetooth scanners.
    pub bluetooth_discovery: bool,

    /// Event kinds to subscribe to.
    pub event_mask: EventMask,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            operational_mode: OperationalMode::All,
            available_scanner_detection: true,
            bluetooth_discovery: true,
            event_mask: EventMask::bridge_default(),
        }
    }
}

/// Communication protocol a pairing barcode configures the scanner for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommProtocol {
    #[default]
    Ble,
    Mfi,
    Hid,
}

impl fmt::Display for CommProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommProtocol::Ble => write!(f, "BLE"),
            CommProtocol::Mfi => write!(f, "MFi"),
            CommProtocol::Hid => write!(f, "HID"),
        }
    }
}

impl std::str::FromStr for CommProtocol {
    type Err = scanlink_core::Error;

    fn from_str(s: &str) -> scanlink_core::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ble" => Ok(CommProtocol::Ble),
            "mfi" => Ok(CommProtocol::Mfi),
            "hid" => Ok(CommProtocol::Hid),
            _ => Err(scanlink_core::Error::InvalidProtocol(s.to_string())),
        }
    }
}

/// Parameters for generating a scan-to-connect pairing barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PairingOptions {
    /// Reset the scanner to factory defaults while pairing.
    #[serde(alias = "setFactoryDefaults")]
    pub use_factory_defaults: bool,

    /// Protocol the scanner should use after pairing.
    pub protocol: CommProtocol,
}

impl PairingOptions {
    pub fn new(protocol: CommProtocol) -> Self {
        Self {
            use_factory_defaults: false,
            protocol,
        }
    }

    pub fn with_factory_defaults(mut self, enabled: bool) -> Self {
        self.use_factory_defaults = enabled;
        self
    }
}

/// Encoded pairing-barcode image (PNG). Opaque to the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingBarcode {
    png: Vec<u8>,
}

impl PairingBarcode {
    pub fn new(png: Vec<u8>) -> Self {
        Self { png }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }
}
