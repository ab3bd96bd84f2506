//! Mock gateway implementation for testing and development.
//!
//! This module provides a simulated device-communication gateway that can be
//! driven programmatically without scanner hardware or a vendor SDK.

use crate::{
    GatewayError, Result,
    event::GatewayEvent,
    traits::{DeviceGateway, GatewayEventSource},
    types::{CommProtocol, GatewaySettings, PairingBarcode, PairingOptions, ScannerInfo},
};
use scanlink_core::{ScannerId, constants::DEFAULT_GATEWAY_EVENT_CAPACITY};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// PNG file signature; the mock image is this header followed by a label.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Command recorded by the mock gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCommand {
    Configure(GatewaySettings),
    Connect(ScannerId),
    Disconnect(ScannerId),
    PairingBarcode(PairingOptions),
}

#[derive(Debug)]
struct MockState {
    initialized: bool,
    fail_configure: bool,
    auto_confirm: bool,
    settings: Option<GatewaySettings>,
    rejections: HashMap<ScannerId, i32>,
    known: HashMap<ScannerId, ScannerInfo>,
    commands: Vec<GatewayCommand>,
}

type SharedState = Arc<Mutex<MockState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock device-communication gateway.
///
/// Records every command it receives and accepts them unless a rejection
/// code has been registered for the scanner. With auto-confirm enabled it
/// answers accepted connect/disconnect requests with the matching session
/// event, like a real gateway would after the radio handshake.
///
/// # Examples
///
/// ```
/// use scanlink_core::{ConnectionType, ScannerId};
/// use scanlink_gateway::mock::MockGateway;
/// use scanlink_gateway::traits::GatewayEventSource;
/// use scanlink_gateway::types::ScannerInfo;
///
/// #[tokio::main]
/// async fn main() -> scanlink_gateway::Result<()> {
///     let (_gateway, mut events, handle) = MockGateway::new();
///
///     handle
///         .appear(ScannerInfo::new(ScannerId::new(7), "DS2278", "X", ConnectionType::Ble))
///         .await?;
///
///     let event = events.next_event().await?;
///     assert_eq!(event.scanner_id(), ScannerId::new(7));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockGateway {
    state: SharedState,
    event_tx: mpsc::Sender<GatewayEvent>,
}

impl MockGateway {
    /// Create an initialized mock gateway.
    ///
    /// Returns the command side, the event source, and a control handle for
    /// injecting events.
    pub fn new() -> (Self, MockEventSource, MockGatewayHandle) {
        let (event_tx, event_rx) = mpsc::channel(DEFAULT_GATEWAY_EVENT_CAPACITY);

        let state = Arc::new(Mutex::new(MockState {
            initialized: true,
            fail_configure: false,
            auto_confirm: false,
            settings: None,
            rejections: HashMap::new(),
            known: HashMap::new(),
            commands: Vec::new(),
        }));

        let gateway = Self {
            state: Arc::clone(&state),
            event_tx: event_tx.clone(),
        };

        let handle = MockGatewayHandle { state, event_tx };

        (gateway, MockEventSource { event_rx }, handle)
    }

    fn accept(&self, command: GatewayCommand, confirmation: GatewayEvent) -> Result<()> {
        let (id, operation) = match command {
            GatewayCommand::Connect(id) => (id, "connect"),
            GatewayCommand::Disconnect(id) => (id, "disconnect"),
            _ => return Err(GatewayError::other("not a session command")),
        };

        let mut state = lock(&self.state);
        if !state.initialized {
            return Err(GatewayError::NotInitialized);
        }
        state.commands.push(command);

        if let Some(&code) = state.rejections.get(&id) {
            debug!(scanner_id = %id, code, "Mock gateway rejecting {}", operation);
            return Err(GatewayError::rejected(operation, id, code));
        }

        if state.auto_confirm
            && let Err(e) = self.event_tx.try_send(confirmation)
        {
            warn!(scanner_id = %id, "Mock gateway could not queue confirmation: {}", e);
        }

        Ok(())
    }
}

impl DeviceGateway for MockGateway {
    fn configure(&self, settings: &GatewaySettings) -> Result<()> {
        let mut state = lock(&self.state);
        state.commands.push(GatewayCommand::Configure(*settings));

        if state.fail_configure {
            return Err(GatewayError::configuration("mock configured to fail"));
        }

        state.initialized = true;
        state.settings = Some(*settings);
        Ok(())
    }

    fn request_connect(&self, id: ScannerId) -> Result<()> {
        let scanner = lock(&self.state)
            .known
            .get(&id)
            .cloned()
            .unwrap_or_else(|| ScannerInfo::bare(id));

        self.accept(
            GatewayCommand::Connect(id),
            GatewayEvent::SessionEstablished { scanner },
        )
    }

    fn request_disconnect(&self, id: ScannerId) -> Result<()> {
        self.accept(
            GatewayCommand::Disconnect(id),
            GatewayEvent::SessionTerminated { id },
        )
    }

    fn pairing_barcode(&self, options: &PairingOptions) -> Result<PairingBarcode> {
        let mut state = lock(&self.state);
        if !state.initialized {
            return Err(GatewayError::NotInitialized);
        }
        state.commands.push(GatewayCommand::PairingBarcode(*options));

        if options.protocol == CommProtocol::Hid {
            return Err(GatewayError::unsupported("HID pairing barcode"));
        }

        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(
            format!(
                "STC:{}:{}",
                options.protocol,
                if options.use_factory_defaults { "defaults" } else { "keep" }
            )
            .as_bytes(),
        );
        Ok(PairingBarcode::new(png))
    }
}

/// Event side of the mock gateway.
#[derive(Debug)]
pub struct MockEventSource {
    event_rx: mpsc::Receiver<GatewayEvent>,
}

impl GatewayEventSource for MockEventSource {
    async fn next_event(&mut self) -> Result<GatewayEvent> {
        self.event_rx
            .recv()
            .await
            .ok_or_else(|| GatewayError::disconnected("mock gateway event channel closed"))
    }
}

/// Handle for controlling a mock gateway.
///
/// Injects gateway events and adjusts how the command side answers. Cloning
/// the handle shares the same gateway.
#[derive(Debug, Clone)]
pub struct MockGatewayHandle {
    state: SharedState,
    event_tx: mpsc::Sender<GatewayEvent>,
}

impl MockGatewayHandle {
    /// Inject an arbitrary gateway event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event source has been dropped.
    pub async fn emit(&self, event: GatewayEvent) -> Result<()> {
        match &event {
            GatewayEvent::ScannerAppeared { scanner }
            | GatewayEvent::SessionEstablished { scanner } => {
                lock(&self.state).known.insert(scanner.id, scanner.clone());
            }
            _ => {}
        }

        self.event_tx
            .send(event)
            .await
            .map_err(|_| GatewayError::disconnected("mock gateway event source dropped"))
    }

    /// Report a scanner as discoverable.
    pub async fn appear(&self, scanner: ScannerInfo) -> Result<()> {
        self.emit(GatewayEvent::ScannerAppeared { scanner }).await
    }

    /// Report a scanner as gone.
    pub async fn disappear(&self, id: ScannerId) -> Result<()> {
        self.emit(GatewayEvent::ScannerDisappeared { id }).await
    }

    /// Report an established session.
    pub async fn establish(&self, scanner: ScannerInfo) -> Result<()> {
        self.emit(GatewayEvent::SessionEstablished { scanner }).await
    }

    /// Report a terminated session.
    pub async fn terminate(&self, id: ScannerId) -> Result<()> {
        self.emit(GatewayEvent::SessionTerminated { id }).await
    }

    /// Report a decoded barcode.
    pub async fn scan(&self, scanner_id: ScannerId, data: &[u8], barcode_type: i32) -> Result<()> {
        self.emit(GatewayEvent::BarcodeData {
            data: data.to_vec(),
            barcode_type,
            scanner_id,
        })
        .await
    }

    /// Reject future connect/disconnect requests for `id` with `code`.
    pub fn reject(&self, id: ScannerId, code: i32) {
        lock(&self.state).rejections.insert(id, code);
    }

    /// Accept requests for `id` again.
    pub fn clear_rejection(&self, id: ScannerId) {
        lock(&self.state).rejections.remove(&id);
    }

    /// Toggle the initialized flag; commands fail while it is false.
    pub fn set_initialized(&self, initialized: bool) {
        lock(&self.state).initialized = initialized;
    }

    /// Make the next `configure` calls fail.
    pub fn fail_configure(&self, fail: bool) {
        lock(&self.state).fail_configure = fail;
    }

    /// Answer accepted connect/disconnect requests with session events.
    pub fn set_auto_confirm(&self, enabled: bool) {
        lock(&self.state).auto_confirm = enabled;
    }

    /// Commands received so far, oldest first.
    pub fn commands(&self) -> Vec<GatewayCommand> {
        lock(&self.state).commands.clone()
    }

    /// Settings applied by the last successful `configure`.
    pub fn settings(&self) -> Option<GatewaySettings> {
        lock(&self.state).settings
    }
}
