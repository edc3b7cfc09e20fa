//! End-to-end tests over real TCP.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use staticd::config::Config;
use staticd::server::listener;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
    _dir: TempDir,
}

async fn start_server(idle_timeout_ms: u64) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
    fs::write(dir.path().join("app.js"), "let x = 1;").unwrap();

    let cfg = Config {
        port: 0,
        bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
        root_dir: dir.path().to_str().unwrap().to_string(),
        idle_timeout_ms,
        ..Config::default()
    };

    let listener = listener::bind(&cfg).unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(listener::serve(listener, Arc::new(cfg), async move {
        let _ = stopped.await;
    }));

    TestServer {
        addr,
        stop,
        handle,
        _dir: dir,
    }
}

async fn exchange(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_serves_files_over_tcp() {
    let server = start_server(1000).await;

    let response = exchange(server.addr, b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: text/html\r\n"));
    assert!(response.ends_with("\r\n\r\n<h1>home</h1>"));

    let response = exchange(server.addr, b"GET /app.js HTTP/1.0\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(response.contains("Content-Type: application/javascript\r\n"));
    assert!(response.ends_with("let x = 1;"));

    server.stop.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_concurrent_connections_are_independent() {
    let server = start_server(1000).await;

    let mut clients = Vec::new();
    for i in 0..8 {
        let addr = server.addr;
        clients.push(tokio::spawn(async move {
            let request = if i % 2 == 0 {
                b"GET / HTTP/1.1\r\n\r\n".as_slice()
            } else {
                b"DELETE / HTTP/1.1\r\n\r\n".as_slice()
            };
            (i, exchange(addr, request).await)
        }));
    }

    for client in clients {
        let (i, response) = client.await.unwrap();
        if i % 2 == 0 {
            assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        } else {
            assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
        }
    }

    server.stop.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_reclaims_open_workers() {
    let server = start_server(60_000).await;

    // Leave a keep-alive connection idle so its worker is still running.
    let mut idle = TcpStream::connect(server.addr).await.unwrap();
    idle.write_all(b"HEAD / HTTP/1.1\r\nConnection: keep-alive\r\n\r\n")
        .await
        .unwrap();
    let mut buf = [0u8; 512];
    let n = idle.read(&mut buf).await.unwrap();
    assert!(String::from_utf8_lossy(&buf[..n]).contains("Connection: keep-alive"));

    server.stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("supervisor drained workers promptly")
        .unwrap()
        .unwrap();

    let mut rest = Vec::new();
    idle.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}
