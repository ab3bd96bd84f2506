//! Gateway trait definitions.
//!
//! A device-communication gateway is split in two halves: a command side that
//! the bridge calls from consumer requests, and an event side that a single
//! pump task drains. Splitting them lets commands run while the pump is
//! parked on the next event without sharing a `&mut` borrow.
//!
//! The event side returns `impl Future + Send` (Edition 2024 RPITIT) so the
//! pump can run on a spawned Tokio task. It is not object-safe; consumers take
//! it as a generic parameter. Implementations may still write `async fn`.

use crate::error::Result;
use crate::event::GatewayEvent;
use crate::types::{GatewaySettings, PairingBarcode, PairingOptions};
use scanlink_core::ScannerId;

/// Command side of a device-communication gateway.
///
/// Every method returns immediately with the gateway's accept/reject
/// decision. Session changes requested here are confirmed later through the
/// event stream, never through the return value.
///
/// # Examples
///
/// ```
/// use scanlink_core::ScannerId;
/// use scanlink_gateway::traits::DeviceGateway;
/// use scanlink_gateway::mock::MockGateway;
///
/// let (gateway, _events, _handle) = MockGateway::new();
/// gateway.configure(&Default::default()).unwrap();
/// gateway.request_connect(ScannerId::new(7)).unwrap();
/// ```
pub trait DeviceGateway: Send + Sync {
    /// Apply operational settings and enable event delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying SDK could not be initialized or
    /// refuses the settings.
    fn configure(&self, settings: &GatewaySettings) -> Result<()>;

    /// Ask the gateway to open a communication session with a scanner.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The gateway is not initialized
    /// - The gateway rejects the id (unknown, already connecting, ...)
    fn request_connect(&self, id: ScannerId) -> Result<()>;

    /// Ask the gateway to close a communication session.
    ///
    /// # Errors
    ///
    /// Same conditions as [`request_connect`](DeviceGateway::request_connect).
    fn request_disconnect(&self, id: ScannerId) -> Result<()>;

    /// Render a scan-to-connect pairing barcode.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is not initialized, does not support
    /// the requested protocol, or fails to encode the image.
    fn pairing_barcode(&self, options: &PairingOptions) -> Result<PairingBarcode>;
}

impl<G: DeviceGateway + ?Sized> DeviceGateway for std::sync::Arc<G> {
    fn configure(&self, settings: &GatewaySettings) -> Result<()> {
        (**self).configure(settings)
    }

    fn request_connect(&self, id: ScannerId) -> Result<()> {
        (**self).request_connect(id)
    }

    fn request_disconnect(&self, id: ScannerId) -> Result<()> {
        (**self).request_disconnect(id)
    }

    fn pairing_barcode(&self, options: &PairingOptions) -> Result<PairingBarcode> {
        (**self).pairing_barcode(options)
    }
}

/// Event side of a device-communication gateway.
///
/// # Examples
///
/// ```no_run
/// use scanlink_gateway::traits::GatewayEventSource;
/// use scanlink_gateway::error::Result;
///
/// async fn drain<S: GatewayEventSource>(source: &mut S) -> Result<()> {
///     loop {
///         let event = source.next_event().await?;
///         println!("{}", event.kind());
///     }
/// }
/// ```
pub trait GatewayEventSource: Send {
    /// Wait for the next event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Disconnected`](crate::GatewayError::Disconnected)
    /// once the gateway will not deliver any further events, or another error
    /// if the transport failed.
    fn next_event(&mut self) -> impl Future<Output = Result<GatewayEvent>> + Send;
}
