//! Error types for gateway operations.
//!
//! This module defines the errors a device-communication gateway can report:
//! missing initialization, synchronous command rejection, a closed event
//! stream, and pairing-barcode failures.

use scanlink_core::ScannerId;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur during gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Gateway has not been initialized and cannot accept commands.
    #[error("Gateway not initialized")]
    NotInitialized,

    /// Gateway synchronously refused a command.
    #[error("{operation} rejected for scanner {scanner_id} (code {code})")]
    Rejected {
        operation: String,
        scanner_id: ScannerId,
        code: i32,
    },

    /// Event stream has been closed by the gateway.
    #[error("Gateway disconnected: {reason}")]
    Disconnected { reason: String },

    /// Operation is not supported by this gateway.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Gateway rejected its configuration.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Pairing barcode could not be produced.
    #[error("Pairing barcode error: {message}")]
    PairingFailed { message: String },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    /// Create a new rejection error.
    pub fn rejected(operation: impl Into<String>, scanner_id: ScannerId, code: i32) -> Self {
        Self::Rejected {
            operation: operation.into(),
            scanner_id,
            code,
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(reason: impl Into<String>) -> Self {
        Self::Disconnected {
            reason: reason.into(),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a new pairing failure error.
    pub fn pairing_failed(message: impl Into<String>) -> Self {
        Self::PairingFailed {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether this error means the event stream is finished for good.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_error() {
        let error = GatewayError::NotInitialized;
        assert_eq!(error.to_string(), "Gateway not initialized");
    }

    #[test]
    fn test_rejected_error() {
        let error = GatewayError::rejected("connect", ScannerId::new(7), 3);
        assert!(matches!(error, GatewayError::Rejected { code: 3, .. }));
        assert_eq!(error.to_string(), "connect rejected for scanner 7 (code 3)");
    }

    #[test]
    fn test_disconnected_error() {
        let error = GatewayError::disconnected("event channel closed");
        assert!(error.is_disconnected());
        assert_eq!(
            error.to_string(),
            "Gateway disconnected: event channel closed"
        );
    }

    #[test]
    fn test_unsupported_error() {
        let error = GatewayError::unsupported("HID pairing barcode");
        assert!(!error.is_disconnected());
        assert_eq!(error.to_string(), "Unsupported operation: HID pairing barcode");
    }
}
