// Connection handling module
// Serves one request per TCP connection and hands valid paths to the player

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::Config;
use crate::handler::{self, RequestOutcome};
use crate::logger::{self, AccessLogEntry};

/// Per-connection settings taken from the configuration at startup
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub max_request_size: usize,
    pub read_timeout: Duration,
    pub access_log: bool,
    pub access_log_format: String,
}

impl ConnectionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_request_size: config.http.max_request_size,
            read_timeout: Duration::from_secs(config.performance.read_timeout),
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        }
    }
}

/// Accept a connection and process it in its own local task.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `settings` - Shared connection settings
/// * `on_valid_path` - Called with the file path after a successful 200 reply
pub fn accept_connection<H, Fut>(
    stream: TcpStream,
    peer_addr: SocketAddr,
    settings: &Rc<ConnectionSettings>,
    on_valid_path: H,
) where
    H: Fn(PathBuf) -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    if settings.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    let settings = Rc::clone(settings);
    tokio::task::spawn_local(async move {
        let started = Instant::now();
        let mut entry = AccessLogEntry::new(peer_addr.to_string());

        match serve_connection(stream, &settings).await {
            Ok(outcome) => {
                if let Some(path) = outcome.launch_path() {
                    // Detached: the player may run for hours
                    tokio::task::spawn_local(on_valid_path(path.to_path_buf()));
                }

                if settings.access_log {
                    entry.request_line.clone_from(&outcome.request_line);
                    entry.file = outcome.path.as_ref().ok().map(|p| p.display().to_string());
                    entry.status = outcome.status();
                    entry.body_bytes = outcome.response.len();
                    entry.request_time_us =
                        u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
                    logger::log_access(&entry, &settings.access_log_format);
                }
            }
            Err(e) => logger::log_connection_error(&peer_addr, &e),
        }
    });
}

/// Read the request, write the reply and close the connection.
///
/// Returns the outcome only if the whole reply was written and the
/// connection shut down cleanly.
async fn serve_connection<S>(
    mut stream: S,
    settings: &ConnectionSettings,
) -> io::Result<RequestOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Single bounded read; anything past the limit is ignored
    let mut buf = vec![0u8; settings.max_request_size];
    let n = tokio::time::timeout(settings.read_timeout, stream.read(&mut buf))
        .await
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::TimedOut,
                format!(
                    "no request received within {} seconds",
                    settings.read_timeout.as_secs()
                ),
            )
        })??;

    let outcome = handler::handle_request(&buf[..n]).await;

    stream.write_all(&outcome.response).await?;
    stream.shutdown().await?;
    drop(stream);

    Ok(outcome)
}
