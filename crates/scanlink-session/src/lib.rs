//! Scanner session and event bridge.
//!
//! Tracks which barcode scanners are discoverable and connected, forwards
//! connect/disconnect commands to a device-communication gateway, and turns
//! the gateway's events into one ordered outbound stream for any number of
//! subscribers.
//!
//! # Components
//!
//! - [`registry`]: available and active scanner sets
//! - [`gate`]: listening mode, which decides whether barcodes are forwarded
//! - [`dispatcher`]: gateway event → registry mutation → outbound events
//! - [`controller`]: consumer commands → gateway
//! - [`fanout`]: per-subscriber queues
//! - [`bridge`]: the [`ScannerBridge`] tying them together
//! - [`protocol`]: JSON request/response surface
//!
//! # Example
//!
//! ```no_run
//! use scanlink_core::{ConnectionType, ScannerId};
//! use scanlink_gateway::ScannerInfo;
//! use scanlink_gateway::mock::MockGateway;
//! use scanlink_session::{BridgeConfig, ScannerBridge};
//!
//! #[tokio::main]
//! async fn main() -> scanlink_session::Result<()> {
//!     let (gateway, events, handle) = MockGateway::new();
//!     let bridge = ScannerBridge::new(BridgeConfig::default());
//!     bridge.attach_gateway(gateway)?;
//!     let _pump = bridge.start(events);
//!
//!     let mut subscription = bridge.subscribe().await;
//!     handle
//!         .appear(ScannerInfo::new(ScannerId::new(7), "DS2278", "X", ConnectionType::Ble))
//!         .await?;
//!
//!     if let Some(event) = subscription.recv().await {
//!         println!("{}", event.to_json()?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod fanout;
pub mod gate;
pub mod protocol;
pub mod registry;

pub use bridge::{PumpHandle, ScannerBridge};
pub use config::BridgeConfig;
pub use controller::{Accepted, SessionController};
pub use dispatcher::{EventDispatcher, decode_barcode};
pub use error::{BridgeError, Result};
pub use event::{OutboundEvent, ScannerRef};
pub use fanout::{EventFanout, EventSubscription, SubscriberId};
pub use gate::{ListeningGate, ListeningState};
pub use protocol::{Request, Response, Status, handle_json, handle_request};
pub use registry::ScannerRegistry;
