//! JSON request protocol.
//!
//! Consumers send one JSON object per request, tagged by `action`:
//!
//! ```json
//! {"action": "getScanners"}
//! {"action": "connectScanner", "id": 7}
//! {"action": "disconnectScanner", "id": "7"}
//! {"action": "forgetScanner", "id": 7}
//! {"action": "listenForBarcodes"}
//! {"action": "stopListening"}
//! {"action": "generatePairingBarcode", "setFactoryDefaults": false, "protocol": "ble"}
//! ```
//!
//! and receive `{"status": "ok", ...}` or `{"status": "error", "message": ...}`.
//! Scanner ids are accepted as numbers or numeric strings. Pairing images are
//! returned as standard base64.

use crate::bridge::ScannerBridge;
use crate::controller::Accepted;
use crate::error::{BridgeError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use scanlink_core::{ScannerId, ScannerRecord};
use scanlink_gateway::{CommProtocol, DeviceGateway, PairingOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const INVALID_ID: &str = "Missing or invalid scanner ID.";

/// Consumer request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    GetScanners,
    ConnectScanner {
        #[serde(default)]
        id: Option<Value>,
    },
    DisconnectScanner {
        #[serde(default)]
        id: Option<Value>,
    },
    ForgetScanner {
        #[serde(default)]
        id: Option<Value>,
    },
    ListenForBarcodes,
    StopListening,
    GeneratePairingBarcode {
        #[serde(default)]
        set_factory_defaults: bool,
        #[serde(default)]
        protocol: Option<String>,
    },
}

impl Request {
    /// Parse a request from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidRequest`] for malformed JSON or an
    /// unknown action.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BridgeError::invalid_request(e.to_string()))
    }
}

/// Outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanners: Option<Vec<ScannerRecord>>,

    /// Base64-encoded PNG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Response {
    fn ok() -> Self {
        Self {
            status: Status::Ok,
            message: None,
            scanners: None,
            image: None,
        }
    }

    pub fn accepted(accepted: Accepted) -> Self {
        Self {
            message: Some(accepted.message),
            ..Self::ok()
        }
    }

    pub fn scanners(scanners: Vec<ScannerRecord>) -> Self {
        Self {
            scanners: Some(scanners),
            ..Self::ok()
        }
    }

    pub fn image(png: &[u8]) -> Self {
        Self {
            image: Some(STANDARD.encode(png)),
            ..Self::ok()
        }
    }

    pub fn error(error: &BridgeError) -> Self {
        Self {
            status: Status::Error,
            message: Some(error.to_string()),
            ..Self::ok()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

impl From<Result<Response>> for Response {
    fn from(result: Result<Response>) -> Self {
        result.unwrap_or_else(|e| Response::error(&e))
    }
}

/// Read a scanner id given as a JSON number or numeric string.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidRequest`] if the id is missing or not an
/// `i32`.
pub fn parse_scanner_id(id: Option<&Value>) -> Result<ScannerId> {
    let parsed = match id {
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(ScannerId::new),
        Some(Value::String(s)) => s.parse::<ScannerId>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| BridgeError::invalid_request(INVALID_ID))
}

fn parse_protocol(protocol: Option<&str>) -> Result<CommProtocol> {
    protocol.map_or(Ok(CommProtocol::default()), |p| {
        p.parse::<CommProtocol>()
            .map_err(|e| BridgeError::invalid_request(e.to_string()))
    })
}

/// Execute a request against the bridge.
pub async fn handle_request<G>(bridge: &ScannerBridge<G>, request: Request) -> Response
where
    G: DeviceGateway + 'static,
{
    debug!(request = ?request, "Handling request");

    let result = execute(bridge, request).await;
    if let Err(e) = &result {
        debug!(error = %e, "Request failed");
    }
    result.into()
}

async fn execute<G>(bridge: &ScannerBridge<G>, request: Request) -> Result<Response>
where
    G: DeviceGateway + 'static,
{
    let response = match request {
        Request::GetScanners => Response::scanners(bridge.get_scanners().await),
        Request::ConnectScanner { id } => {
            let id = parse_scanner_id(id.as_ref())?;
            Response::accepted(bridge.connect_scanner(id).await?)
        }
        Request::DisconnectScanner { id } => {
            let id = parse_scanner_id(id.as_ref())?;
            Response::accepted(bridge.disconnect_scanner(id).await?)
        }
        Request::ForgetScanner { id } => {
            let id = parse_scanner_id(id.as_ref())?;
            Response::accepted(bridge.forget_scanner(id).await)
        }
        Request::ListenForBarcodes => Response::accepted(bridge.start_listening().await),
        Request::StopListening => Response::accepted(bridge.stop_listening().await),
        Request::GeneratePairingBarcode {
            set_factory_defaults,
            protocol,
        } => {
            let options = PairingOptions::new(parse_protocol(protocol.as_deref())?)
                .with_factory_defaults(set_factory_defaults);
            Response::image(bridge.generate_pairing_barcode(&options)?.as_bytes())
        }
    };
    Ok(response)
}

/// Parse and execute a JSON request.
pub async fn handle_json<G>(bridge: &ScannerBridge<G>, json: &str) -> Response
where
    G: DeviceGateway + 'static,
{
    match Request::from_json(json) {
        Ok(request) => handle_request(bridge, request).await,
        Err(e) => Response::error(&e),
    }
}
