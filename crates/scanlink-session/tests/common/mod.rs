//! Shared helpers for bridge integration tests.
//!
//! [`Harness`] wires a [`ScannerBridge`] to a mock gateway with a running
//! event pump and one subscription, so a test can inject gateway events
//! through the handle and read what consumers would see.

#![allow(dead_code)]

use scanlink_core::{ConnectionType, ScannerId};
use scanlink_gateway::ScannerInfo;
use scanlink_gateway::mock::{MockGateway, MockGatewayHandle};
use scanlink_session::{
    BridgeConfig, EventSubscription, OutboundEvent, PumpHandle, ScannerBridge,
};
use std::time::Duration;
use tokio::time::timeout;

pub const DS2278_ID: ScannerId = ScannerId::new(7);

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub fn ds2278() -> ScannerInfo {
    ScannerInfo::new(DS2278_ID, "DS2278", "X", ConnectionType::Ble)
}

pub fn scanner(id: i32, name: &str) -> ScannerInfo {
    ScannerInfo::new(ScannerId::new(id), name, "RS5100", ConnectionType::Mfi)
}

pub struct Harness {
    pub bridge: ScannerBridge<MockGateway>,
    pub handle: MockGatewayHandle,
    pub subscription: EventSubscription,
    pub pump: PumpHandle,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(BridgeConfig::default()).await
    }

    pub async fn with_config(config: BridgeConfig) -> Self {
        let (gateway, events, handle) = MockGateway::new();
        let bridge = ScannerBridge::new(config);
        bridge.attach_gateway(gateway).expect("attach mock gateway");
        let subscription = bridge.subscribe().await;
        let pump = bridge.start(events);

        Self {
            bridge,
            handle,
            subscription,
            pump,
        }
    }

    /// Next outbound event, failing the test if none arrives in time.
    pub async fn next(&mut self) -> OutboundEvent {
        next_event(&mut self.subscription).await
    }

    /// Collect exactly `n` events.
    pub async fn take(&mut self, n: usize) -> Vec<OutboundEvent> {
        let mut events = Vec::with_capacity(n);
        for _ in 0..n {
            events.push(self.next().await);
        }
        events
    }

    /// Assert nothing was emitted before a marker event.
    ///
    /// Emits a disappearance for an unused id and expects the resulting
    /// list-changed event to be the next thing on the stream.
    pub async fn assert_quiet(&mut self) {
        self.handle
            .disappear(ScannerId::new(-1))
            .await
            .expect("emit marker");
        let event = self.next().await;
        assert!(
            event.is_list_changed(),
            "expected only the marker event, got {event:?}"
        );
    }
}

pub async fn next_event(subscription: &mut EventSubscription) -> OutboundEvent {
    timeout(RECV_TIMEOUT, subscription.recv())
        .await
        .expect("timed out waiting for outbound event")
        .expect("event stream closed")
}

/// Every Connected/Disconnected is immediately followed by a list change.
pub fn assert_specific_before_generic(events: &[OutboundEvent]) {
    for (i, event) in events.iter().enumerate() {
        if matches!(
            event,
            OutboundEvent::ScannerConnected { .. } | OutboundEvent::ScannerDisconnected { .. }
        ) {
            assert!(
                events.get(i + 1).is_some_and(OutboundEvent::is_list_changed),
                "{} at {i} not followed by scannerListChanged",
                event.event_name()
            );
        }
    }
}
