//! Forwarder and accept-loop integration tests.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;

use tcp_balancer::config::ForwarderConfig;
use tcp_balancer::Shutdown;

#[tokio::test]
async fn relays_bytes_both_ways() {
    let upstream = common::start_echo_upstream("up").await;
    let harness = common::build_harness(ForwarderConfig::default());

    let (mut client, server_side) = common::socket_pair().await;
    let forwarder = Arc::clone(&harness.forwarder);
    let endpoint = upstream.clone();
    let session = tokio::spawn(async move {
        forwarder.forward(&endpoint, server_side).await;
    });

    client.write_all(b"hello").await.unwrap();
    let mut buf = [0u8; 256];
    let n = client.read(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"[up] hello");

    assert_eq!(harness.queue.queue_len(&upstream), 1);
    assert_eq!(harness.metrics.active_for(&upstream), 1);

    // Closing the client ends the session via EOF.
    drop(client);
    tokio::time::timeout(Duration::from_secs(5), session)
        .await
        .expect("session should end on EOF")
        .unwrap();

    assert_eq!(harness.queue.queue_len(&upstream), 0);
    assert_eq!(harness.metrics.active_for(&upstream), 0);
    assert_eq!(harness.forwarder.active_sessions(), 0);
    assert_eq!(harness.metrics.snapshot().total_all, 1);
}

#[tokio::test]
async fn cap_rejects_without_touching_counters() {
    let upstream = common::start_echo_upstream("up").await;
    let config = ForwarderConfig {
        max_concurrent_connections: 1,
        idle_timeout_secs: 30,
        ..Default::default()
    };
    let harness = common::build_harness(config);

    // Occupy the only slot.
    let (mut first_client, first_server) = common::socket_pair().await;
    let forwarder = Arc::clone(&harness.forwarder);
    let endpoint = upstream.clone();
    let first_session = tokio::spawn(async move {
        forwarder.forward(&endpoint, first_server).await;
    });

    first_client.write_all(b"hi").await.unwrap();
    let mut buf = [0u8; 64];
    let _ = first_client.read(&mut buf).await.unwrap();
    assert_eq!(harness.forwarder.active_sessions(), 1);

    // Over the cap: rejected with zero queue/metric side effects.
    let (mut second_client, second_server) = common::socket_pair().await;
    harness.forwarder.forward(&upstream, second_server).await;

    let n = second_client.read(&mut buf).await.unwrap_or(0);
    assert_eq!(n, 0, "rejected client sees a closed connection");

    assert_eq!(harness.queue.queue_len(&upstream), 1);
    assert_eq!(harness.metrics.snapshot().total_all, 1);
    assert_eq!(harness.forwarder.active_sessions(), 1);

    drop(first_client);
    let _ = tokio::time::timeout(Duration::from_secs(5), first_session).await;
    assert_eq!(harness.forwarder.active_sessions(), 0);
}

#[tokio::test]
async fn idle_timeout_restores_counters() {
    let upstream = common::start_echo_upstream("up").await;
    let config = ForwarderConfig {
        idle_timeout_secs: 1,
        ..Default::default()
    };
    let harness = common::build_harness(config);

    let (client, server_side) = common::socket_pair().await;
    let started = Instant::now();

    tokio::time::timeout(
        Duration::from_secs(5),
        harness.forwarder.forward(&upstream, server_side),
    )
    .await
    .expect("session should end on idle timeout");

    assert!(
        started.elapsed() >= Duration::from_secs(1),
        "session outlived the idle window"
    );
    assert_eq!(harness.queue.queue_len(&upstream), 0);
    assert_eq!(harness.metrics.active_for(&upstream), 0);
    assert_eq!(harness.forwarder.active_sessions(), 0);

    drop(client);
}

#[tokio::test]
async fn lifetime_cap_ends_an_active_session() {
    let upstream = common::start_echo_upstream("up").await;
    let config = ForwarderConfig {
        idle_timeout_secs: 1,
        max_lifetime_secs: 1,
        ..Default::default()
    };
    let harness = common::build_harness(config);

    let (mut client, server_side) = common::socket_pair().await;

    // Keep both directions busy so the idle timer never fires; only the
    // lifetime window can end the session.
    let writer = tokio::spawn(async move {
        let mut buf = [0u8; 256];
        for _ in 0..15 {
            if client.write_all(b"tick").await.is_err() {
                break;
            }
            let _ = tokio::time::timeout(Duration::from_millis(100), client.read(&mut buf)).await;
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    });

    let started = Instant::now();
    tokio::time::timeout(
        Duration::from_secs(5),
        harness.forwarder.forward(&upstream, server_side),
    )
    .await
    .expect("session should end at the lifetime cap");

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(900), "ended too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "lifetime cap did not fire: {elapsed:?}");
    assert_eq!(harness.forwarder.active_sessions(), 0);
    assert_eq!(harness.metrics.active_for(&upstream), 0);

    writer.abort();
}

#[tokio::test]
async fn balances_through_the_accept_loop() {
    let upstream = common::start_echo_upstream("up").await;
    let harness = common::build_harness(ForwarderConfig::default());
    harness.registry.add(&upstream);

    let shutdown = Shutdown::new();
    tokio::spawn(Arc::clone(&harness.health).run(shutdown.subscribe()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(Arc::clone(&harness.service).run(listener, shutdown.subscribe()));

    // Wait out the first probe cycle.
    let deadline = Instant::now() + Duration::from_secs(5);
    while harness.health.healthy_backends().is_empty() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(!harness.health.healthy_backends().is_empty());

    let mut client = TcpStream::connect(addr).await.unwrap();
    client.write_all(b"ping").await.unwrap();
    let mut buf = [0u8; 64];
    let n = client.read(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"[up] ping");
    assert!(!harness.outage.status().in_outage);

    shutdown.trigger();
}

#[tokio::test]
async fn refuses_when_no_backend_is_healthy() {
    let harness = common::build_harness(ForwarderConfig::default());

    let shutdown = Shutdown::new();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(Arc::clone(&harness.service).run(listener, shutdown.subscribe()));

    let mut client = TcpStream::connect(addr).await.unwrap();
    let mut buf = [0u8; 16];
    match client.read(&mut buf).await {
        Ok(0) => {}
        Ok(n) => panic!("expected refusal, got {} bytes", n),
        Err(_) => {} // RST surfaces as a reset error
    }

    let status = harness.outage.status();
    assert!(status.in_outage);
    assert!(status.refused >= 1);

    shutdown.trigger();
}
