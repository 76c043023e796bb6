use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing_test::traced_test;

use transports::{
    parse_optimizer, parse_optimizer_with, parse_server_config, transports, DialContext, Dialer,
    OptimizerError, OptimizerSettings, ProviderError, ReplicantClientConfig,
    ReplicantServerConfig, ShadowServerConfig, StarbridgeServerConfig, TcpDialContext,
};

/// Echo server that accepts `expected` connections and returns how many it served.
async fn echo_server(expected: usize) -> (String, JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let handle = tokio::spawn(async move {
        let mut served = 0;
        while served < expected {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(&buf).await.unwrap();
            served += 1;
        }
        served
    });
    (address, handle)
}

/// An address nothing listens on.
async fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().to_string()
}

fn tcp() -> Arc<dyn DialContext> {
    Arc::new(TcpDialContext::new(Duration::from_secs(2)))
}

async fn ping(dialer: &dyn Dialer) {
    let mut conn = dialer.dial("example.com:80").await.unwrap();
    conn.write_all(b"ping").await.unwrap();
    let mut buf = [0u8; 4];
    conn.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"ping");
}

#[test]
fn test_registered_transport_names() {
    assert_eq!(
        transports(),
        vec!["shadow", "Replicant", "Starbridge", "Optimizer"]
    );
}

#[tokio::test]
#[traced_test]
async fn test_rotate_over_real_listeners() {
    let (shadow_addr, shadow_server) = echo_server(2).await;
    let (starbridge_addr, starbridge_server) = echo_server(2).await;

    let document = json!({
        "transports": [
            {"name": "shadow", "config": {
                "password": "1234",
                "cipherName": "chacha20-ietf-poly1305",
                "serverAddress": shadow_addr
            }},
            {"name": "Starbridge", "config": {
                "serverAddress": starbridge_addr,
                "serverPersistentPublicKey": "3059301306072a8648ce3d0201"
            }}
        ],
        "strategy": "rotate"
    });

    let composite = parse_optimizer(&document.to_string(), tcp()).unwrap();
    assert_eq!(composite.len(), 2);

    for _ in 0..4 {
        ping(&*composite).await;
    }

    assert_eq!(shadow_server.await.unwrap(), 2);
    assert_eq!(starbridge_server.await.unwrap(), 2);
    assert!(logs_contain("组合传输构建完成: 策略=rotate, 传输数量=2"));
}

#[tokio::test]
async fn test_nested_optimizer_with_replicant() {
    let (replicant_addr, replicant_server) = echo_server(1).await;

    let encoded = ReplicantClientConfig {
        server_address: replicant_addr,
        toneburst: None,
        polish: None,
    }
    .encode()
    .unwrap();
    let replicant_config: serde_json::Value = serde_json::from_str(&encoded).unwrap();

    let document = json!({
        "transports": [
            {"name": "Optimizer", "config": {
                "transports": [{"name": "Replicant", "config": replicant_config}],
                "strategy": "minimizeDialDuration"
            }}
        ],
        "strategy": "first"
    });

    let composite = parse_optimizer(&document.to_string(), tcp()).unwrap();
    assert_eq!(
        composite.dialers()[0].name(),
        "Optimizer(minimizeDialDuration)"
    );

    ping(&*composite).await;
    assert_eq!(replicant_server.await.unwrap(), 1);
}

#[tokio::test]
#[traced_test]
async fn test_fallback_past_refused_server() {
    let dead = closed_address().await;
    let (live, live_server) = echo_server(1).await;

    let starbridge = |address: &str| {
        json!({"name": "Starbridge", "config": {
            "serverAddress": address,
            "serverPersistentPublicKey": "k"
        }})
    };
    let document = json!({
        "transports": [starbridge(dead.as_str()), starbridge(live.as_str())],
        "strategy": "first"
    });

    let mut settings = OptimizerSettings::default();
    settings.resolver.max_attempts = 2;
    let composite = parse_optimizer_with(&document.to_string(), tcp(), &settings).unwrap();

    ping(&*composite).await;
    assert_eq!(live_server.await.unwrap(), 1);
    assert!(logs_contain(&format!("通过 Starbridge@{dead} 拨号失败")));
}

#[tokio::test]
async fn test_out_of_range_settings_are_rejected() {
    let document = json!({
        "transports": [{"name": "Starbridge", "config": {
            "serverAddress": "127.0.0.1:9",
            "serverPersistentPublicKey": "k"
        }}],
        "strategy": "minimizeDialDuration"
    });

    let mut settings = OptimizerSettings::default();
    settings.resolver.latency_smoothing = 1.5;
    let err = parse_optimizer_with(&document.to_string(), tcp(), &settings)
        .err()
        .unwrap();
    assert!(matches!(err, OptimizerError::Configuration(_)));
}

#[test]
fn test_server_configs_parse_through_facade() {
    let shadow: ShadowServerConfig = parse_server_config(
        br#"{"password": "1234", "cipherName": "DarkStar", "serverAddress": "0.0.0.0:2222"}"#,
    )
    .unwrap();
    assert_eq!(shadow.cipher_name, "DarkStar");

    let replicant: ReplicantServerConfig = parse_server_config(b"").unwrap();
    assert_eq!(replicant, ReplicantServerConfig::default());

    let starbridge = parse_server_config::<StarbridgeServerConfig>(b"{}");
    assert!(matches!(starbridge, Err(ProviderError::InvalidConfig { .. })));
}

#[tokio::test]
async fn test_bogus_strategy_is_rejected() {
    let document = json!({
        "transports": [
            {"name": "shadow", "config": {
                "password": "p",
                "cipherName": "aes-128-gcm",
                "serverAddress": "127.0.0.1:9"
            }}
        ],
        "strategy": "bogus"
    });

    let err = parse_optimizer(&document.to_string(), tcp()).err().unwrap();
    assert!(matches!(err, OptimizerError::UnknownStrategy { .. }));
}

#[tokio::test]
async fn test_invalid_leaf_config_names_provider() {
    let document = json!({
        "transports": [{"name": "shadow", "config": {"password": "p"}}],
        "strategy": "first"
    });

    let err = parse_optimizer(&document.to_string(), tcp()).err().unwrap();
    assert!(matches!(
        err,
        OptimizerError::ProviderConstruction { ref provider, .. } if provider == "shadow"
    ));
}
