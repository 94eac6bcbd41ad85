//! A test harness: servers on ephemeral ports and a reqwest client.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};

use model_mock::{Router, Server};

/// Drain timeout for test servers, short enough that a stuck shutdown fails
/// fast instead of hanging the suite.
pub const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// A server running in the background until [`TestServer::stop`].
pub struct TestServer {
    pub addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), model_mock::Error>>,
}

impl TestServer {
    pub async fn start(router: Router) -> Self {
        let server = Server::bind(([127, 0, 0, 1], 0).into())
            .await
            .unwrap()
            .with_drain_timeout(DRAIN_TIMEOUT);
        let addr = server.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(server.serve_with_shutdown(router, async move {
            let _ = stopped.await;
        }));
        Self { addr, stop, task }
    }

    pub async fn stop(self) {
        let _ = self.stop.send(());
        self.task.await.unwrap().unwrap();
    }
}

/// A fully read response.
pub struct Fetched {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Fetched {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

/// Sends `GET path` and reads the whole response.
pub async fn get(addr: SocketAddr, path: &str) -> Fetched {
    request(addr, "GET", path, &[]).await
}

pub async fn request(
    addr: SocketAddr,
    method: &str,
    path: &str,
    extra_headers: &[(&str, &str)],
) -> Fetched {
    let method = reqwest::Method::from_bytes(method.as_bytes()).unwrap();
    let mut req = reqwest::Client::new().request(method, url(addr, path));
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }

    let res = req.send().await.unwrap();
    let status = res.status().as_u16();
    let headers = res.headers().clone();
    let body = res.bytes().await.unwrap();
    Fetched { status, headers, body }
}

/// Starts a download and reads at least `min_bytes` of it, then stops
/// reading. The connection stays open for as long as the stream lives.
pub async fn stall_after(
    addr: SocketAddr,
    path: &str,
    min_bytes: usize,
) -> impl Stream<Item = reqwest::Result<Bytes>> {
    let res = reqwest::get(url(addr, path)).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let mut stream = Box::pin(res.bytes_stream());
    let mut received = 0;
    while received < min_bytes {
        let chunk = stream
            .next()
            .await
            .unwrap_or_else(|| panic!("server closed before sending {min_bytes} bytes"))
            .unwrap();
        received += chunk.len();
    }
    stream
}

/// Starts a download and hangs up after at least `min_bytes` of it arrived.
pub async fn abort_after(addr: SocketAddr, path: &str, min_bytes: usize) {
    drop(stall_after(addr, path, min_bytes).await);
}
