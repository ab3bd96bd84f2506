//! Device-communication gateway abstraction for the scanner bridge.
//!
//! This crate defines the boundary between the bridge and whatever owns the
//! scanner radios: a vendor SDK binding, a Bluetooth stack, or the mock used
//! for development and testing.
//!
//! # Design Philosophy
//!
//! - **Split halves**: commands ([`DeviceGateway`]) are synchronous accept/reject
//!   calls; events ([`GatewayEventSource`]) are drained by one async task.
//! - **Thread-safe**: both halves are `Send`, the command side also `Sync`.
//! - **Error-aware**: all operations return [`Result<T>`][error::Result] with a
//!   [`GatewayError`] describing the failure.
//!
//! # Event Stream
//!
//! ```no_run
//! use scanlink_gateway::{GatewayEvent, GatewayEventSource, Result};
//!
//! async fn watch<S: GatewayEventSource>(source: &mut S) -> Result<()> {
//!     loop {
//!         match source.next_event().await? {
//!             GatewayEvent::ScannerAppeared { scanner } => {
//!                 println!("appeared: {}", scanner.display_name());
//!             }
//!             GatewayEvent::BarcodeData { scanner_id, .. } => {
//!                 println!("scan from {}", scanner_id);
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```
//!
//! # Mock Implementation
//!
//! [`mock::MockGateway`] records commands, can reject ids or pretend to be
//! uninitialized, and exposes a handle for injecting events.

pub mod error;
pub mod event;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{GatewayError, Result};
pub use event::{AuxiliaryEvent, GatewayEvent};
pub use traits::{DeviceGateway, GatewayEventSource};
pub use types::{
    CommProtocol, EventMask, GatewaySettings, OperationalMode, PairingBarcode, PairingOptions,
    ScannerInfo,
};
