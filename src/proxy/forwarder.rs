//! Bidirectional TCP relay with admission control.
//!
//! # Responsibilities
//! - Enforce the process-wide concurrent session cap
//! - Connect to the chosen upstream and relay bytes both ways
//! - Bound each direction by the idle timeout and the whole session by
//!   the lifetime cap
//! - Keep queue and metrics accounting paired with connect success

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::backend::{ConnectionMetrics, Endpoint, QueueTracker};
use crate::config::ForwarderConfig;

pub struct TcpForwarder {
    queue: Arc<QueueTracker>,
    metrics: Arc<ConnectionMetrics>,
    options: ForwarderConfig,
    active: AtomicUsize,
}

impl TcpForwarder {
    pub fn new(
        queue: Arc<QueueTracker>,
        metrics: Arc<ConnectionMetrics>,
        options: ForwarderConfig,
    ) -> Self {
        Self {
            queue,
            metrics,
            options,
            active: AtomicUsize::new(0),
        }
    }

    /// Current admitted session count.
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Forward a client connection to the given upstream endpoint. All
    /// failure paths are handled internally; the client connection is
    /// closed by the time this returns.
    pub async fn forward(&self, backend: &Endpoint, client: TcpStream) {
        let connection_id = Uuid::new_v4().simple().to_string();
        let span = tracing::info_span!("session", id = %connection_id, backend = %backend);
        self.forward_inner(backend, client).instrument(span).await
    }

    async fn forward_inner(&self, backend: &Endpoint, client: TcpStream) {
        // Admission control: claim the slot before any I/O so the cap is
        // never overshot. A rejected session must leave queue/metrics
        // untouched.
        if self.active.fetch_add(1, Ordering::SeqCst) + 1 > self.options.max_concurrent_connections
        {
            self.active.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!(
                max = self.options.max_concurrent_connections,
                "Max connections reached, rejecting new client"
            );
            drop(client);
            return;
        }

        let upstream = match TcpStream::connect(backend.authority()).await {
            Ok(stream) => stream,
            Err(e) => {
                self.active.fetch_sub(1, Ordering::SeqCst);
                tracing::warn!(error = %e, "Failed to connect to backend");
                drop(client);
                return;
            }
        };

        self.queue.increment(backend);
        self.metrics.on_session_start(backend);

        let idle = Duration::from_secs(self.options.idle_timeout_secs);
        let deadline = Instant::now() + Duration::from_secs(self.options.max_lifetime_secs);

        let (mut client_read, mut client_write) = client.into_split();
        let (mut upstream_read, mut upstream_write) = upstream.into_split();

        // First loop to finish wins; the loser is dropped, not drained.
        tokio::select! {
            _ = relay(
                "client->upstream",
                &mut client_read,
                &mut upstream_write,
                idle,
                deadline,
                self.options.buffer_size,
            ) => {}
            _ = relay(
                "upstream->client",
                &mut upstream_read,
                &mut client_write,
                idle,
                deadline,
                self.options.buffer_size,
            ) => {}
        }

        self.queue.decrement(backend);
        self.metrics.on_session_end(backend);
        self.active.fetch_sub(1, Ordering::SeqCst);

        tracing::info!("Session finished");
        // Dropping the halves closes both connections.
    }
}

/// Copy bytes one way until EOF, an idle period, the session deadline, or
/// an I/O error. Termination conditions are expected, not errors.
async fn relay<R, W>(
    direction: &str,
    from: &mut R,
    to: &mut W,
    idle: Duration,
    deadline: Instant,
    buffer_size: usize,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size];

    loop {
        let bounded_read = time::timeout(idle, from.read(&mut buffer));
        let n = match time::timeout_at(deadline, bounded_read).await {
            Err(_) => {
                tracing::info!(direction, "Session lifetime reached");
                break;
            }
            Ok(Err(_)) => {
                tracing::info!(direction, idle_secs = idle.as_secs(), "Idle timeout");
                break;
            }
            Ok(Ok(Ok(0))) => {
                tracing::debug!(direction, "EOF");
                break;
            }
            Ok(Ok(Ok(n))) => n,
            Ok(Ok(Err(e))) => {
                tracing::debug!(direction, error = %e, "Read failed");
                break;
            }
        };

        match time::timeout_at(deadline, to.write_all(&buffer[..n])).await {
            Err(_) => {
                tracing::info!(direction, "Session lifetime reached");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(direction, error = %e, "Write failed");
                break;
            }
            Ok(Ok(())) => {}
        }
    }
}
