//! Client refusal when no backend is available.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// How the service refuses a client when no healthy backend exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefusalMode {
    /// Immediately reset the connection (RST); no protocol bytes sent.
    #[default]
    Reset,

    /// Attempt an orderly shutdown first (FIN).
    GracefulClose,
}

/// Close a client connection according to the refusal mode. The
/// connection is released even if the mode-specific step fails.
pub async fn refuse(mut client: TcpStream, mode: RefusalMode) {
    match mode {
        RefusalMode::Reset => {
            // SO_LINGER 0 turns the drop into an RST instead of a FIN.
            if let Err(e) = client.set_linger(Some(Duration::ZERO)) {
                tracing::debug!(error = %e, "Failed to arm linger for reset");
            }
        }
        RefusalMode::GracefulClose => {
            if let Err(e) = client.shutdown().await {
                tracing::debug!(error = %e, "Graceful shutdown failed");
            }
        }
    }

    drop(client);
}
