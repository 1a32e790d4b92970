//! The sessions router served over real sockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sessions_fixture::Server;
use sessions_fixture::latency::Latency;
use sessions_fixture::logger::MemorySink;
use sessions_fixture::sessions::{self, GET_LOCATION_CODE, PATH, POST_LOCATION_CODE};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Running {
    addr: SocketAddr,
    sink: Arc<MemorySink>,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), sessions_fixture::Error>>,
}

async fn start() -> Running {
    let sink = MemorySink::new();
    let options = sessions::Options { latency: Latency::new(1, 2).unwrap(), trust_proxy: false };
    let app = sessions::router(options, sink.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Server::from_listener(listener).unwrap();
    let addr = server.local_addr();

    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_with_shutdown(app, async {
        let _ = stopped.await;
    }));

    Running { addr, sink, stop, handle }
}

/// Sends one raw HTTP/1.1 request and reads until the server closes.
async fn send(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

fn split(response: &str) -> (&str, &str) {
    response.split_once("\r\n\r\n").unwrap()
}

#[tokio::test]
async fn serves_sessions_and_drains_on_shutdown() {
    let running = start().await;

    let get = format!("GET {PATH} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    let res = send(running.addr, &get).await;
    let (head, body) = split(&res);
    assert!(head.starts_with("HTTP/1.1 403"), "{head}");
    assert!(head.to_ascii_lowercase().contains("content-type: application/json"), "{head}");
    assert!(body.contains(GET_LOCATION_CODE), "{body}");

    let head_req = format!("HEAD {PATH} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    let res = send(running.addr, &head_req).await;
    let (head, body) = split(&res);
    assert!(head.starts_with("HTTP/1.1 403"), "{head}");
    assert!(body.is_empty(), "{body}");

    let payload = r#"{"email":"a@b.c","password":"hunter22"}"#;
    let post = format!(
        "POST {PATH} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{payload}",
        payload.len()
    );
    let res = send(running.addr, &post).await;
    let (head, body) = split(&res);
    assert!(head.starts_with("HTTP/1.1 401"), "{head}");
    assert!(body.contains(POST_LOCATION_CODE), "{body}");

    let alarms = running.sink.named("TooManyRequestsError");
    assert_eq!(alarms.len(), 3);
    assert!(alarms.iter().all(|e| e.event["context"]["client_ip"] == "127.0.0.1"));

    running.stop.send(()).unwrap();
    let served = tokio::time::timeout(Duration::from_secs(5), running.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(served.is_ok());
}

#[tokio::test]
async fn from_listener_reports_the_bound_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let bound = listener.local_addr().unwrap();

    let server = Server::from_listener(listener).unwrap();

    assert_eq!(server.local_addr(), bound);
    assert_ne!(bound.port(), 0);
}
