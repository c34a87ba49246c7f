//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use edge_gate::config::GateConfig;
use edge_gate::http::HttpServer;
use edge_gate::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Start a mock upstream that answers every request with 200 and `response`.
pub async fn start_mock_backend(addr: SocketAddr, response: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                // Drain the request head before answering.
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let response_str = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    response.len(),
                    response
                );
                let _ = socket.write_all(response_str.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
}

/// Start the gate on `gate_addr` in front of `upstream_addr`.
pub async fn start_gate(
    gate_addr: SocketAddr,
    upstream_addr: SocketAddr,
    config: GateConfig,
) -> Shutdown {
    start_reloadable_gate(gate_addr, upstream_addr, config).await.0
}

/// Like `start_gate`, also returning the channel that feeds policy reloads.
pub async fn start_reloadable_gate(
    gate_addr: SocketAddr,
    upstream_addr: SocketAddr,
    mut config: GateConfig,
) -> (Shutdown, mpsc::UnboundedSender<GateConfig>) {
    config.listener.bind_address = gate_addr.to_string();
    config.upstream.address = upstream_addr.to_string();

    let shutdown = Shutdown::new();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind(gate_addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    (shutdown, updates)
}

/// Client without pooling or system proxy so each test talks to its own gate.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
