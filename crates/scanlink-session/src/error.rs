//! Error types for bridge operations.
//!
//! Command-level errors are returned to the calling consumer verbatim and
//! are never retried by the bridge. Inconsistencies between gateway events
//! and the registry are repaired silently and never show up here.

use scanlink_core::ScannerId;
use scanlink_gateway::{CommProtocol, GatewayError};

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors surfaced by the scanner bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// No initialized gateway is attached.
    #[error("Scanner SDK not initialized")]
    GatewayUnavailable,

    /// Operation referenced an id absent from the registry.
    #[error("Unknown scanner ID: {id}")]
    UnknownScannerId { id: ScannerId },

    /// Gateway synchronously refused a connect/disconnect.
    #[error("Command rejected (code {code}): {reason}")]
    CommandRejected { code: i32, reason: String },

    /// Barcode payload was not valid UTF-8; the scan is still delivered with
    /// a marker in place of the text.
    #[error("Barcode from scanner {scanner_id} is not valid UTF-8 ({len} bytes)")]
    DecodeFallback { scanner_id: ScannerId, len: usize },

    /// Pairing barcodes cannot be generated for this protocol.
    #[error("Pairing barcode not supported for {protocol}")]
    PairingUnsupported { protocol: CommProtocol },

    /// Gateway failed to produce a pairing barcode.
    #[error("Failed to encode barcode image: {message}")]
    PairingFailed { message: String },

    /// Consumer request could not be understood.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Outbound event could not be serialized.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other gateway failure.
    #[error("Gateway error: {0}")]
    Gateway(GatewayError),
}

impl BridgeError {
    /// Create a new invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Rejection code used when the gateway refuses without one.
const UNSPECIFIED_REJECTION: i32 = -1;

impl From<GatewayError> for BridgeError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::NotInitialized | GatewayError::Disconnected { .. } => {
                BridgeError::GatewayUnavailable
            }
            GatewayError::Rejected { code, .. } => BridgeError::CommandRejected {
                code,
                reason: error.to_string(),
            },
            GatewayError::Unsupported { .. } => BridgeError::CommandRejected {
                code: UNSPECIFIED_REJECTION,
                reason: error.to_string(),
            },
            other => BridgeError::Gateway(other),
        }
    }
}
