//! End-to-end tests over a real listener.

use std::sync::atomic::Ordering;
use std::time::Duration;

use secure_headers::{AppConfig, HttpServer, SecureConfig, TransportSecurityConfig};

mod common;

#[tokio::test]
async fn test_serves_with_security_headers() {
    let server = common::TestServer::start(SecureConfig {
        content_security_policy: "default-src 'self'".to_string(),
        ..Default::default()
    })
    .await;

    let res = common::client()
        .get(server.url("/"))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-security-policy"], "default-src 'self'");
    assert_eq!(res.headers()["x-frame-options"], "SAMEORIGIN");
    assert_eq!(res.text().await.unwrap(), "Hello");
}

#[tokio::test]
async fn test_host_allow_list_over_the_wire() {
    let server = common::TestServer::start(SecureConfig {
        allowed_hosts: vec!["example.com".to_string()],
        ..Default::default()
    })
    .await;

    let res = common::client()
        .get(server.url("/"))
        .header("Host", "other.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(server.calls.load(Ordering::SeqCst), 0);

    let res = common::client()
        .get(server.url("/"))
        .header("Host", "example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(server.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_redirect_over_the_wire() {
    let server = common::TestServer::start(SecureConfig {
        force_secure_transport: true,
        ..Default::default()
    })
    .await;

    let res = common::client()
        .get(server.url("/path?x=1"))
        .header("Host", "example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 301);
    assert_eq!(res.headers()["location"], "https://example.com/path?x=1");
    assert_eq!(server.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_policy_reload_swaps_headers() {
    let server = common::TestServer::start(SecureConfig::default()).await;
    let client = common::client();

    server
        .updates
        .send(SecureConfig {
            frame: "DENY".to_string(),
            ..Default::default()
        })
        .unwrap();

    let mut frame = String::new();
    for _ in 0..50 {
        let res = client.get(server.url("/")).send().await.unwrap();
        frame = res.headers()["x-frame-options"].to_str().unwrap().to_string();
        if frame == "DENY" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(frame, "DENY");
}

#[tokio::test]
async fn test_invalid_reload_keeps_current_policy() {
    let server = common::TestServer::start(SecureConfig {
        frame: "DENY".to_string(),
        ..Default::default()
    })
    .await;

    // Strict transport security without forced https is rejected.
    server
        .updates
        .send(SecureConfig {
            strict_transport_security: Some(TransportSecurityConfig {
                max_age: Duration::from_secs(60),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = common::client().get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-frame-options"], "DENY");
    assert!(res.headers().get("strict-transport-security").is_none());
}

#[test]
fn test_invalid_policy_refuses_to_start() {
    let mut config = AppConfig::default();
    config.security.public_key_pins = Some(Default::default());

    let (app, _) = common::counting_app();
    assert!(HttpServer::new(config, app).is_err());
}
