//! End-to-end bridge flows over the mock gateway.

mod common;

use common::{DS2278_ID, Harness, ds2278, scanner};
use scanlink_core::ScannerId;
use scanlink_gateway::mock::GatewayCommand;
use scanlink_session::{BridgeConfig, BridgeError, OutboundEvent, ScannerRef, handle_json};

#[tokio::test]
async fn test_appeared_scanner_is_listed_inactive() {
    let mut h = Harness::new().await;
    h.handle.appear(ds2278()).await.unwrap();

    let OutboundEvent::ScannerListChanged { scanners } = h.next().await else {
        panic!("expected scannerListChanged");
    };
    assert_eq!(scanners.len(), 1);

    let listed = h.bridge.get_scanners().await;
    assert_eq!(listed, scanners);
    assert_eq!(listed[0].id, DS2278_ID);
    assert_eq!(listed[0].name, "DS2278");
    assert!(!listed[0].is_active);
}

#[tokio::test]
async fn test_connect_then_session_established() {
    let mut h = Harness::new().await;
    h.handle.set_auto_confirm(true);
    h.handle.appear(ds2278()).await.unwrap();
    h.next().await;

    let accepted = h.bridge.connect_scanner(DS2278_ID).await.unwrap();
    assert_eq!(accepted.message, "Connecting to scanner 7");

    let events = h.take(2).await;
    let OutboundEvent::ScannerConnected { scanner } = &events[0] else {
        panic!("expected scannerConnected first, got {:?}", events[0]);
    };
    assert_eq!(scanner.id, DS2278_ID);
    assert!(scanner.is_active);

    let OutboundEvent::ScannerListChanged { scanners } = &events[1] else {
        panic!("expected scannerListChanged second, got {:?}", events[1]);
    };
    assert_eq!(scanners.len(), 1);
    assert!(scanners[0].is_active);
}

#[tokio::test]
async fn test_connect_does_not_activate_without_confirmation() {
    let h = Harness::new().await;
    h.handle.appear(ds2278()).await.unwrap();

    h.bridge.connect_scanner(DS2278_ID).await.unwrap();

    assert!(
        h.bridge
            .get_scanners()
            .await
            .iter()
            .all(|scanner| !scanner.is_active)
    );
    assert!(
        h.handle
            .commands()
            .contains(&GatewayCommand::Connect(DS2278_ID))
    );
}

#[tokio::test]
async fn test_disconnect_emits_last_known_name() {
    let mut h = Harness::new().await;
    h.handle.set_auto_confirm(true);
    h.handle.establish(ds2278()).await.unwrap();
    h.take(2).await;

    h.bridge.disconnect_scanner(DS2278_ID).await.unwrap();

    let events = h.take(2).await;
    assert_eq!(
        events[0],
        OutboundEvent::ScannerDisconnected {
            scanner: ScannerRef::new(DS2278_ID, "DS2278"),
        }
    );
    let OutboundEvent::ScannerListChanged { scanners } = &events[1] else {
        panic!("expected scannerListChanged");
    };
    assert!(!scanners[0].is_active);
}

#[tokio::test]
async fn test_barcode_only_while_listening() {
    let mut h = Harness::with_config(BridgeConfig {
        auto_listen_on_connect: false,
        ..Default::default()
    })
    .await;
    h.handle.appear(ds2278()).await.unwrap();
    h.next().await;

    h.bridge.start_listening().await;
    h.handle.scan(DS2278_ID, b"12345", 1).await.unwrap();
    assert_eq!(
        h.next().await,
        OutboundEvent::BarcodeScan {
            data: "12345".to_string(),
            barcode_type: 1,
            scanner: ScannerRef::new(DS2278_ID, "DS2278"),
        }
    );
    h.assert_quiet().await;

    h.bridge.stop_listening().await;
    h.handle.scan(DS2278_ID, b"12345", 1).await.unwrap();
    h.assert_quiet().await;
}

#[tokio::test]
async fn test_idle_suppresses_every_barcode() {
    let mut h = Harness::with_config(BridgeConfig {
        auto_listen_on_connect: false,
        ..Default::default()
    })
    .await;

    for i in 0..25 {
        h.handle
            .scan(DS2278_ID, format!("code-{i}").as_bytes(), 3)
            .await
            .unwrap();
    }
    h.assert_quiet().await;
}

#[tokio::test]
async fn test_invalid_utf8_is_still_delivered() {
    let mut h = Harness::new().await;
    h.bridge.start_listening().await;

    h.handle
        .scan(DS2278_ID, &[0xff, 0xfe, 0xfd], 8)
        .await
        .unwrap();

    let OutboundEvent::BarcodeScan {
        data,
        barcode_type,
        scanner,
    } = h.next().await
    else {
        panic!("expected barcodeScan");
    };
    assert_eq!(data, "Unknown encoding");
    assert_eq!(barcode_type, 8);
    assert_eq!(scanner, ScannerRef::new(DS2278_ID, "Unknown"));
}

#[tokio::test]
async fn test_auto_listen_on_connect() {
    let mut h = Harness::new().await;
    assert!(!h.bridge.is_listening().await);

    h.handle.establish(ds2278()).await.unwrap();
    h.take(2).await;
    assert!(h.bridge.is_listening().await);

    h.handle.scan(DS2278_ID, b"ABC", 2).await.unwrap();
    assert!(matches!(h.next().await, OutboundEvent::BarcodeScan { .. }));
}

#[tokio::test]
async fn test_explicit_stop_disables_auto_listen() {
    let mut h = Harness::new().await;
    h.bridge.stop_listening().await;

    h.handle.establish(ds2278()).await.unwrap();
    h.take(2).await;
    assert!(!h.bridge.is_listening().await);
}

#[tokio::test]
async fn test_forget_twice_and_reappear() {
    let mut h = Harness::new().await;
    h.handle.establish(ds2278()).await.unwrap();
    h.take(2).await;

    let first = h.bridge.forget_scanner(DS2278_ID).await;
    let second = h.bridge.forget_scanner(DS2278_ID).await;
    assert_eq!(first, second);
    assert_eq!(
        h.take(2).await,
        vec![
            OutboundEvent::ScannerListChanged {
                scanners: Vec::new()
            };
            2
        ]
    );
    assert!(h.bridge.get_scanners().await.is_empty());
    assert!(
        !h.handle
            .commands()
            .iter()
            .any(|c| matches!(c, GatewayCommand::Disconnect(_)))
    );

    h.handle.appear(ds2278()).await.unwrap();
    h.next().await;
    assert_eq!(h.bridge.get_scanners().await.len(), 1);
}

#[tokio::test]
async fn test_disappearance_keeps_active_scanner_visible() {
    let mut h = Harness::new().await;
    h.handle.appear(scanner(1, "First")).await.unwrap();
    h.handle.establish(ds2278()).await.unwrap();
    h.handle.disappear(DS2278_ID).await.unwrap();
    h.take(4).await;

    let listed = h.bridge.get_scanners().await;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].id, DS2278_ID);
    assert!(listed[1].is_active);

    h.handle.terminate(DS2278_ID).await.unwrap();
    assert_eq!(
        h.next().await,
        OutboundEvent::ScannerDisconnected {
            scanner: ScannerRef::new(DS2278_ID, "DS2278"),
        }
    );
    h.next().await;
    assert_eq!(h.bridge.get_scanners().await.len(), 1);
}

#[tokio::test]
async fn test_rejected_command_is_surfaced() {
    let h = Harness::new().await;
    h.handle.reject(DS2278_ID, 5);

    let err = h.bridge.connect_scanner(DS2278_ID).await.unwrap_err();
    assert!(matches!(err, BridgeError::CommandRejected { code: 5, .. }));

    h.handle.clear_rejection(DS2278_ID);
    assert!(h.bridge.connect_scanner(DS2278_ID).await.is_ok());
}

#[tokio::test]
async fn test_unknown_scanner_required() {
    let h = Harness::with_config(BridgeConfig {
        require_known_scanner: true,
        ..Default::default()
    })
    .await;

    assert_eq!(
        h.bridge.connect_scanner(ScannerId::new(99)).await,
        Err(BridgeError::UnknownScannerId {
            id: ScannerId::new(99)
        })
    );
}

#[tokio::test]
async fn test_subscribers_are_independent() {
    let mut h = Harness::new().await;
    let dropped = h.bridge.subscribe().await;
    let mut second = h.bridge.subscribe().await;
    assert_eq!(h.bridge.subscriber_count().await, 3);
    drop(dropped);

    h.handle.appear(ds2278()).await.unwrap();

    let a = h.next().await;
    let b = common::next_event(&mut second).await;
    assert_eq!(a, b);
    assert_eq!(h.bridge.subscriber_count().await, 2);
}

#[tokio::test]
async fn test_late_subscriber_sees_only_new_events() {
    let mut h = Harness::new().await;
    h.handle.appear(ds2278()).await.unwrap();
    h.next().await;

    let mut late = h.bridge.subscribe().await;
    h.handle.appear(scanner(2, "Second")).await.unwrap();

    let OutboundEvent::ScannerListChanged { scanners } = common::next_event(&mut late).await
    else {
        panic!("expected scannerListChanged");
    };
    assert_eq!(scanners.len(), 2);
    assert!(late.try_recv().is_none());

    let Harness { pump, .. } = h;
    pump.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_commands_keep_ordering() {
    let mut h = Harness::new().await;
    h.handle.set_auto_confirm(true);
    for id in 1..=5 {
        h.handle.appear(scanner(id, "S")).await.unwrap();
    }
    h.take(5).await;

    let mut tasks = Vec::new();
    for id in 1..=5 {
        let bridge = h.bridge.clone();
        tasks.push(tokio::spawn(async move {
            let id = ScannerId::new(id);
            bridge.connect_scanner(id).await.unwrap();
            bridge.disconnect_scanner(id).await.unwrap();
            bridge.forget_scanner(id).await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // connect and disconnect each yield two events, forget one
    let events = h.take(5 * 5).await;
    common::assert_specific_before_generic(&events);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, OutboundEvent::ScannerConnected { .. }))
            .count(),
        5
    );
}

#[tokio::test]
async fn test_json_requests_drive_the_bridge() {
    let mut h = Harness::new().await;
    h.handle.set_auto_confirm(true);
    h.handle.appear(ds2278()).await.unwrap();
    h.next().await;

    let response = handle_json(&h.bridge, r#"{"action": "connectScanner", "id": 7}"#).await;
    assert!(response.is_ok());
    h.take(2).await;

    let response = handle_json(&h.bridge, r#"{"action": "getScanners"}"#).await;
    let scanners = response.scanners.unwrap();
    assert!(scanners[0].is_active);

    let response = handle_json(&h.bridge, r#"{"action": "forgetScanner", "id": "7"}"#).await;
    assert_eq!(response.message.as_deref(), Some("Forgot scanner 7"));
}

#[tokio::test]
async fn test_detached_gateway_is_unavailable() {
    let h = Harness::new().await;
    h.bridge.detach_gateway();

    let err = h.bridge.disconnect_scanner(DS2278_ID).await.unwrap_err();
    assert_eq!(err, BridgeError::GatewayUnavailable);
    assert_eq!(err.to_string(), "Scanner SDK not initialized");
}
