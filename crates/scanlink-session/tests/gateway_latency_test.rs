//! Gateway calls that take a while must not hold up event dispatch.

use rstest::rstest;
use scanlink_core::{ConnectionType, ScannerId};
use scanlink_gateway::{
    DeviceGateway, GatewayError, GatewayEvent, GatewaySettings, PairingBarcode, PairingOptions,
    ScannerInfo,
};
use scanlink_session::{BridgeConfig, ScannerBridge};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const GATEWAY_DELAY: Duration = Duration::from_millis(400);

/// Gateway whose connect and disconnect calls block the calling thread.
#[derive(Debug, Default)]
struct SlowGateway {
    entered: Arc<Notify>,
}

impl SlowGateway {
    fn block(&self) {
        self.entered.notify_one();
        std::thread::sleep(GATEWAY_DELAY);
    }
}

impl DeviceGateway for SlowGateway {
    fn configure(&self, _settings: &GatewaySettings) -> scanlink_gateway::Result<()> {
        Ok(())
    }

    fn request_connect(&self, _id: ScannerId) -> scanlink_gateway::Result<()> {
        self.block();
        Ok(())
    }

    fn request_disconnect(&self, _id: ScannerId) -> scanlink_gateway::Result<()> {
        self.block();
        Ok(())
    }

    fn pairing_barcode(
        &self,
        _options: &PairingOptions,
    ) -> scanlink_gateway::Result<PairingBarcode> {
        Err(GatewayError::unsupported("pairing_barcode"))
    }
}

fn appeared(id: i32) -> GatewayEvent {
    GatewayEvent::ScannerAppeared {
        scanner: ScannerInfo::new(ScannerId::new(id), format!("S{id}"), "X", ConnectionType::Ble),
    }
}

#[rstest]
#[case::any_scanner(false, false)]
#[case::known_scanner(true, false)]
#[case::disconnect(true, true)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_event_dispatch_not_blocked_by_gateway_call(
    #[case] require_known_scanner: bool,
    #[case] disconnect: bool,
) {
    let gateway = SlowGateway::default();
    let entered = Arc::clone(&gateway.entered);
    let bridge = ScannerBridge::new(BridgeConfig {
        require_known_scanner,
        ..Default::default()
    });
    bridge.attach_gateway(gateway).unwrap();
    bridge.handle_gateway_event(appeared(7)).await;
    let mut subscription = bridge.subscribe().await;

    let command = tokio::spawn({
        let bridge = bridge.clone();
        async move {
            let id = ScannerId::new(7);
            if disconnect {
                bridge.disconnect_scanner(id).await
            } else {
                bridge.connect_scanner(id).await
            }
        }
    });
    entered.notified().await;

    let emitted = tokio::time::timeout(GATEWAY_DELAY / 4, bridge.handle_gateway_event(appeared(1)))
        .await
        .expect("event dispatch waited for the gateway call");
    assert_eq!(emitted, 1);
    assert!(!command.is_finished());

    assert!(subscription.try_recv().is_some_and(|e| e.is_list_changed()));
    assert!(command.await.unwrap().is_ok());
    assert_eq!(bridge.get_scanners().await.len(), 2);
}
