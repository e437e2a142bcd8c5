//! Simple TCP echo server for exercising the balancer.
//!
//! Accepts a client connection, reads one message, optionally delays,
//! and echoes it back tagged with the server name. Useful as a cheap
//! upstream when driving the forwarder by hand.

use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "echo-server", about = "TCP echo fixture")]
struct Args {
    /// Name reported in every response.
    name: String,

    /// Port to listen on.
    port: u16,

    /// Delay before echoing, in milliseconds.
    #[arg(default_value_t = 0)]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let delay = Duration::from_millis(args.delay_ms);

    let listener = TcpListener::bind(format!("[::]:{}", args.port)).await?;
    tracing::info!(
        server = %args.name,
        port = args.port,
        delay_ms = args.delay_ms,
        "Echo server listening"
    );

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let name = args.name.clone();
                tokio::spawn(handle_client(stream, name, delay));
            }
            Err(e) => {
                tracing::error!(error = %e, "Accept failed");
            }
        }
    }
}

async fn handle_client(mut stream: TcpStream, name: String, delay: Duration) {
    let mut buffer = [0u8; 1024];

    match stream.read(&mut buffer).await {
        Ok(0) => {}
        Ok(n) => {
            if !delay.is_zero() {
                tracing::info!(server = %name, delay_ms = delay.as_millis() as u64, "Delaying response");
                tokio::time::sleep(delay).await;
            }

            let request = String::from_utf8_lossy(&buffer[..n]);
            let response = format!("[{}] Echo: {}", name, request);
            if let Err(e) = stream.write_all(response.as_bytes()).await {
                tracing::error!(error = %e, "Failed to write response");
                return;
            }

            tracing::info!(server = %name, request = %request.trim(), "Handled request");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request");
        }
    }
}
