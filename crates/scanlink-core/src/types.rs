use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device-assigned scanner identifier.
///
/// Unique among the scanners a gateway reports and stable for the lifetime
/// of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScannerId(i32);

impl ScannerId {
    /// Create a scanner ID from the raw gateway value.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        ScannerId(id)
    }

    /// Get the raw scanner ID.
    #[must_use]
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl From<i32> for ScannerId {
    fn from(id: i32) -> Self {
        ScannerId(id)
    }
}

impl fmt::Display for ScannerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ScannerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i32>()
            .map(ScannerId)
            .map_err(|_| Error::InvalidScannerId(s.to_string()))
    }
}

/// Transport a scanner is attached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionType {
    /// Bluetooth Low Energy.
    #[serde(rename = "BLE")]
    Ble,

    /// Apple MFi (Made for iPhone) Bluetooth Classic.
    #[serde(rename = "MFi")]
    Mfi,

    /// Bluetooth HID keyboard emulation.
    #[serde(rename = "HID")]
    Hid,

    /// Connection type not reported by the gateway.
    #[default]
    Unknown,
}

impl ConnectionType {
    /// Wire label for this connection type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionType::Ble => "BLE",
            ConnectionType::Mfi => "MFi",
            ConnectionType::Hid => "HID",
            ConnectionType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConnectionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ble" => Ok(ConnectionType::Ble),
            "mfi" => Ok(ConnectionType::Mfi),
            "hid" => Ok(ConnectionType::Hid),
            "unknown" => Ok(ConnectionType::Unknown),
            _ => Err(Error::InvalidConnectionType(s.to_string())),
        }
    }
}

/// A scanner as seen by consumers.
///
/// `is_active` is derived from the registry at snapshot time; records handed
/// to the registry carry whatever value the caller set and it is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerRecord {
    pub id: ScannerId,
    pub name: String,
    pub model: String,
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub is_active: bool,
}

impl ScannerRecord {
    /// Create an inactive record.
    pub fn new(
        id: ScannerId,
        name: impl Into<String>,
        model: impl Into<String>,
        connection_type: ConnectionType,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            model: model.into(),
            connection_type,
            is_active: false,
        }
    }

    /// Return a copy with `is_active` set.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("7", 7)]
    #[case(" 42 ", 42)]
    #[case("-1", -1)]
    fn test_scanner_id_valid(#[case] input: &str, #[case] expected: i32) {
        let id: ScannerId = input.parse().unwrap();
        assert_eq!(id.as_i32(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("99999999999")]
    fn test_scanner_id_invalid(#[case] input: &str) {
        let result: Result<ScannerId> = input.parse();
        assert!(matches!(result, Err(Error::InvalidScannerId(_))));
    }

    #[rstest]
    #[case("ble", ConnectionType::Ble)]
    #[case("MFi", ConnectionType::Mfi)]
    #[case("HID", ConnectionType::Hid)]
    #[case("unknown", ConnectionType::Unknown)]
    fn test_connection_type_parse(#[case] input: &str, #[case] expected: ConnectionType) {
        assert_eq!(input.parse::<ConnectionType>().unwrap(), expected);
    }

    #[test]
    fn test_connection_type_parse_invalid() {
        assert!("usb".parse::<ConnectionType>().is_err());
    }

    #[test]
    fn test_record_wire_shape() {
        let record = ScannerRecord::new(ScannerId::new(7), "DS2278", "X", ConnectionType::Ble)
            .with_active(true);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "name": "DS2278",
                "model": "X",
                "connectionType": "BLE",
                "isActive": true
            })
        );
    }
}
