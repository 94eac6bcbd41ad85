//! HTTP server and graceful shutdown.
//!
//! Every accepted connection is served on its own task. A connection that
//! fails, including a client hanging up halfway through a download, is
//! logged and forgotten; the accept loop keeps going.
//!
//! On Ctrl-C or SIGTERM the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Gives in-flight responses up to the drain timeout to finish. A second
//!    signal, or the timeout running out, drops whatever is left.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::request::Request;
use crate::response::{Response, ResponseBody};
use crate::router::Router;
use crate::status::Status;

/// How long shutdown waits for in-flight responses by default.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// The HTTP server.
pub struct Server {
    listener: TcpListener,
    drain_timeout: Duration,
}

impl Server {
    /// Binds a listener to `addr`. Port `0` picks a free port; see
    /// [`local_addr`](Server::local_addr).
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), model_mock::Error> {
    /// let server = model_mock::Server::bind(([127, 0, 0, 1], 0).into()).await?;
    /// println!("listening on {}", server.local_addr()?);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, drain_timeout: DEFAULT_DRAIN_TIMEOUT })
    }

    /// Caps how long shutdown waits for in-flight responses. Connections
    /// still open afterwards are dropped mid-response.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves `router` until Ctrl-C or SIGTERM, then drains in-flight
    /// connections and returns. A second signal cuts the drain short.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.run(router, shutdown_signal(), shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then drains in-flight
    /// connections and returns.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        self.run(router, signal, std::future::pending()).await
    }

    async fn run(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
        force: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let Self { listener, drain_timeout } = self;
        let addr = listener.local_addr()?;
        let router = Arc::new(router);

        info!(%addr, "listening");

        let mut tasks = tokio::task::JoinSet::new();
        let (closing_tx, closing_rx) = watch::channel(());

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    let mut closing = closing_rx.clone();

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req, remote_addr).await }
                        });

                        let builder = ConnBuilder::new(TokioExecutor::new());
                        let conn = builder.serve_connection(io, svc);
                        tokio::pin!(conn);

                        let res = tokio::select! {
                            res = conn.as_mut() => res,
                            _ = closing.changed() => {
                                // Finish the in-flight response, then close
                                // instead of waiting on keep-alive.
                                conn.as_mut().graceful_shutdown();
                                conn.as_mut().await
                            }
                        };
                        match res {
                            Ok(()) => {}
                            Err(e) if is_disconnect(e.as_ref()) => {
                                debug!(peer = %remote_addr, "peer went away: {e}");
                            }
                            Err(e) => error!(peer = %remote_addr, "connection error: {e}"),
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Close the listening socket, then ask idle connections to finish.
        drop(listener);
        let _ = closing_tx.send(());

        let drained = tokio::select! {
            () = async { while tasks.join_next().await.is_some() {} } => true,
            () = tokio::time::sleep(drain_timeout) => false,
            () = force => false,
        };
        if !drained {
            warn!(remaining = tasks.len(), "dropping connections still in flight");
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }

        info!("stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response.
///
/// Infallible: anything but a plain `GET` of a routed path becomes a 501 or
/// 404 response, so hyper never sees an error from us. Paths are matched
/// exactly, query string included, so `/model.gguf?x=1` is a 404.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<ResponseBody>, Infallible> {
    let (parts, _body) = req.into_parts();
    let method = parts.method.clone();
    let target = parts.uri.path_and_query()
        .map_or_else(|| parts.uri.path().to_owned(), |pq| pq.as_str().to_owned());

    let endpoint = match parts.uri.query() {
        Some(_) => None,
        None => router.lookup(parts.uri.path()),
    };
    let response = if method != http::Method::GET {
        Response::builder()
            .status(Status::NotImplemented)
            .text(format!("Unsupported method ({method})"))
    } else if let Some(endpoint) = endpoint {
        router.call(endpoint, Request::new(parts)).await
    } else {
        Response::builder().status(Status::NotFound).text("File not found")
    };

    info!(peer = %remote_addr, %method, path = %target, status = response.status_code(), "request");
    Ok(response.into_inner())
}

/// Whether a connection error is the peer hanging up, which happens every
/// time a client aborts a download.
fn is_disconnect(e: &(dyn std::error::Error + 'static)) -> bool {
    let mut cur = Some(e);
    while let Some(err) = cur {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            return matches!(
                io.kind(),
                ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
            );
        }
        if let Some(hyper_err) = err.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() || hyper_err.is_canceled() {
                return true;
            }
        }
        cur = err.source();
    }
    false
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first Ctrl-C or, on Unix, SIGTERM.
///
/// If a handler cannot be installed that arm never resolves; the other still
/// works and the process can always be killed outright.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
