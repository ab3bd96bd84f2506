//! Shared constants for the scanner bridge.
//!
//! Markers that appear on the consumer-facing wire and the defaults used when
//! a gateway reports incomplete scanner metadata.
//!
//! # Usage
//!
//! ```
//! use scanlink_core::constants::*;
//!
//! assert_eq!(UNKNOWN_NAME, "Unknown");
//! assert_eq!(UNKNOWN_ENCODING, "Unknown encoding");
//! ```

/// Placeholder used when a scanner name or model is not known.
///
/// Substituted when the gateway reports a scanner without a name, and when an
/// event references an id that is no longer present in the registry.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Marker substituted for barcode payloads that are not valid UTF-8.
///
/// A scan is still delivered with this text in place of the payload.
pub const UNKNOWN_ENCODING: &str = "Unknown encoding";

/// Capacity of the bounded channel a gateway uses to deliver raw events.
pub const DEFAULT_GATEWAY_EVENT_CAPACITY: usize = 100;
