//! HTTP host and graceful shutdown.
//!
//! The server owns the transport and nothing else: it reads each request
//! body in full, hands the request to one [`Dispatch`] together with a fresh
//! [`BufferedResponse`], and sends whatever was written.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or **Ctrl-C** the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::future::Future;
use std::net::SocketAddr;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::handler::Dispatch;
use crate::request::Request;
use crate::response::BufferedResponse;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// use tollgate::Server;
    /// let server = Server::bind("0.0.0.0:3000")?;
    /// # Ok::<(), tollgate::Error>(())
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        Ok(Self { addr: addr.parse()? })
    }

    /// Serves `app` until SIGTERM or Ctrl-C, then drains in-flight requests.
    pub async fn serve(self, app: Dispatch) -> Result<(), Error> {
        self.serve_with_shutdown(app, shutdown_signal()).await
    }

    /// Serves `app` until `signal` resolves, then drains in-flight requests.
    pub async fn serve_with_shutdown<S>(self, app: Dispatch, signal: S) -> Result<(), Error>
    where
        S: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr).await?;

        info!(addr = %self.addr, "tollgate listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal immediately stops
                // accepting, even if more connections are queued.
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

                    let app = app.clone();
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let app = app.clone();
                            async move { dispatch(app, req).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("tollgate stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads one request, runs the chain, produces one response.
///
/// Handlers are synchronous, so they run on tokio's blocking pool. All
/// failures are answered here, so hyper never sees an error.
async fn dispatch<B>(
    app: Dispatch,
    req: http::Request<B>,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(method = %parts.method, path = parts.uri.path(), "failed to read request body: {e}");
            return Ok(bare(StatusCode::BAD_REQUEST));
        }
    };
    let req = Request::new(parts.method, parts.uri, parts.headers, body);

    let handled = tokio::task::spawn_blocking(move || {
        let mut res = BufferedResponse::new();
        app.serve(&mut res, req);
        res.into_inner()
    })
    .await;

    Ok(handled.unwrap_or_else(|e| {
        error!("handler task failed: {e}");
        bare(StatusCode::INTERNAL_SERVER_ERROR)
    }))
}

fn bare(status: StatusCode) -> http::Response<Full<Bytes>> {
    let mut res = http::Response::new(Full::new(Bytes::new()));
    *res.status_mut() = status;
    res
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// On Windows only Ctrl-C is available. A signal that cannot be installed is
/// logged and never fires.
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
