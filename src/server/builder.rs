// ────────────────────────────────
// src/server/builder.rs
// ────────────────────────────────
use anyhow::{anyhow, Result};
use hyper::{server::conn::Http, Body, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tower::Service;

const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Builder pattern so `main.rs` can inject its request handler.
pub struct ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    addr: SocketAddr,
    handler: Option<H>,
    shutdown_grace: Duration,
}

impl<H> ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            handler: None,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// How long in-flight connections may keep running after shutdown
    /// begins before they are aborted.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Bind `addr`, then serve as [`serve_on`](Self::serve_on).
    pub async fn serve_with_shutdown<S>(self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Accept connections until `shutdown` resolves, then let open
    /// connections finish their current request. Returns once every
    /// connection task has ended or the grace period ran out, so handles
    /// the handler uses can be closed right after.
    pub async fn serve_on<S>(self, listener: TcpListener, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        let handler = self
            .handler
            .ok_or_else(|| anyhow!("handler must be set via with_handler()"))?;
        tracing::info!("HTTP server listening on {}", listener.local_addr()?);

        let (drain_tx, _) = watch::channel(());
        let mut connections = JoinSet::new();

        tokio::pin!(shutdown);
        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted?,
                // Reap finished connections so the set does not grow unbounded.
                Some(_) = connections.join_next(), if !connections.is_empty() => continue,
                _ = &mut shutdown => break,
            };
            let svc = handler.clone();
            let mut drain_rx = drain_tx.subscribe();

            // One Tokio task per connection.
            connections.spawn(async move {
                let conn = Http::new().serve_connection(stream, svc);
                tokio::pin!(conn);
                let mut draining = false;
                let result = loop {
                    tokio::select! {
                        res = conn.as_mut() => break res,
                        _ = drain_rx.changed(), if !draining => {
                            draining = true;
                            conn.as_mut().graceful_shutdown();
                        }
                    }
                };
                if let Err(err) = result {
                    tracing::warn!(%peer, %err, "connection error");
                }
            });
        }

        drop(listener);
        tracing::info!(
            open = connections.len(),
            "HTTP server stopped accepting connections, draining"
        );
        let _ = drain_tx.send(());

        let drained = timeout(self.shutdown_grace, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::warn!(
                remaining = connections.len(),
                "shutdown grace period elapsed, aborting connections"
            );
            connections.shutdown().await;
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
