//! HTTP server and graceful shutdown.
//!
//! On **SIGTERM** or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Tells every open connection to close. Idle keep-alive connections go
//!    at once; a connection mid-request finishes that request first.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.
//!
//! Request bodies are read in full before routing, up to
//! [`MAX_BODY_BYTES`]. Larger bodies answer `413`.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::middleware::trace;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// Largest request body the server will buffer.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve<S>(self, router: Router<S>) -> Result<(), Error>
    where
        S: Send + Sync + 'static,
    {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops accepting when `shutdown`
    /// resolves instead of waiting for a process signal.
    pub async fn serve_with_shutdown<S, F>(self, router: Router<S>, shutdown: F) -> Result<(), Error>
    where
        S: Send + Sync + 'static,
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr).await.map_err(Error::Bind)?;
        run(listener, router, shutdown).await
    }
}

async fn run<S, F>(listener: TcpListener, router: Router<S>, shutdown: F) -> Result<(), Error>
where
    S: Send + Sync + 'static,
    F: Future<Output = ()>,
{
    let local_addr = listener.local_addr().map_err(Error::Bind)?;

    let router = Arc::new(router);
    let builder = ConnBuilder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();

    info!(addr = %local_addr, "userstore listening");

    // Every spawned connection task is tracked so shutdown can drain them.
    let mut tasks = tokio::task::JoinSet::new();

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // Shutdown is checked first so a SIGTERM stops accepting
            // immediately, even if more connections are queued.
            biased;

            () = &mut shutdown => {
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

                // Called once per request on the connection.
                let svc = service_fn(move |req| {
                    let router = Arc::clone(&router);
                    async move { dispatch(router, req, remote_addr).await }
                });

                let conn = builder.serve_connection(TokioIo::new(stream), svc).into_owned();
                let conn = graceful.watch(conn);

                tasks.spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished connection tasks so the set stays bounded.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);
    graceful.shutdown().await;
    while tasks.join_next().await.is_some() {}

    info!("userstore stopped");
    Ok(())
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads the body, routes the request and converts the response for hyper.
///
/// Every failure is turned into a response here, so hyper never sees an error.
async fn dispatch<S>(
    router: Arc<Router<S>>,
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    S: Send + Sync + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = trace::instrument(&method, &path, async {
        let (parts, body) = req.into_parts();
        match read_body(body, MAX_BODY_BYTES).await {
            Ok(bytes) => {
                let req = http::Request::from_parts(parts, bytes);
                router.dispatch(req, Some(remote_addr)).await
            }
            Err(status) => Response::status(status),
        }
    })
    .await;

    Ok(response.into_inner())
}

/// Buffers `body`, refusing to hold more than `limit` bytes.
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, Status>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            warn!(limit, "request body too large");
            Err(Status::PayloadTooLarge)
        }
        Err(e) => {
            warn!("failed to read request body: {e}");
            Err(Status::BadRequest)
        }
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT the process receives.
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    use super::*;
    use crate::request::Request;

    async fn ok(_: Arc<()>, _: Request) -> Status {
        Status::Ok
    }

    #[tokio::test]
    async fn body_within_limit_is_read() {
        let body = Full::new(Bytes::from_static(b"0123456789"));
        assert_eq!(read_body(body, 10).await, Ok(Bytes::from_static(b"0123456789")));
    }

    #[tokio::test]
    async fn body_over_limit_is_too_large() {
        let body = Full::new(Bytes::from(vec![b'x'; 11]));
        assert_eq!(read_body(body, 10).await, Err(Status::PayloadTooLarge));
    }

    #[tokio::test]
    async fn shutdown_closes_idle_keep_alive_connections() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let server = tokio::spawn(run(listener, Router::new(()).get("/healthz", ok), async {
            let _ = stopped.await;
        }));

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /healthz HTTP/1.1\r\nhost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut buf = [0u8; 256];
        let n = client.read(&mut buf).await.unwrap();
        assert!(buf[..n].starts_with(b"HTTP/1.1 200 OK"));

        // The client keeps its connection open.
        stop.send(()).unwrap();
        let finished = tokio::time::timeout(Duration::from_secs(3), server).await;
        assert!(matches!(finished, Ok(Ok(Ok(())))), "server did not drain: {finished:?}");
    }
}
