// Server loop module
// Accepts connections until the shutdown signal fires

use std::future::Future;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::{accept_connection, ConnectionSettings};
use super::listener::{create_reusable_listener, resolve_bind_addr};
use crate::config::Config;
use crate::logger;

/// Bind the configured address and serve until `shutdown` is notified.
///
/// Must run inside a `LocalSet`: connections and launches are local tasks.
pub async fn run<H, Fut>(
    config: &Config,
    on_valid_path: H,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>>
where
    H: Fn(PathBuf) -> Fut + Clone + 'static,
    Fut: Future<Output = ()> + 'static,
{
    logger::log_starting();
    let addr = resolve_bind_addr(&config.server.host, config.server.port).await?;
    let listener = create_reusable_listener(addr)?;
    logger::log_server_start(&listener.local_addr()?, config);

    let settings = Rc::new(ConnectionSettings::from_config(config));
    start_server_loop(listener, settings, on_valid_path, shutdown).await;
    Ok(())
}

/// Accept loop. Accept errors are logged and never end the loop; only the
/// shutdown notification does.
pub async fn start_server_loop<H, Fut>(
    listener: TcpListener,
    settings: Rc<ConnectionSettings>,
    on_valid_path: H,
    shutdown: Arc<Notify>,
) where
    H: Fn(PathBuf) -> Fut + Clone + 'static,
    Fut: Future<Output = ()> + 'static,
{
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &settings, on_valid_path.clone());
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::mpsc;
    use tokio::task::LocalSet;

    fn settings() -> Rc<ConnectionSettings> {
        Rc::new(ConnectionSettings {
            max_request_size: 2048,
            read_timeout: Duration::from_secs(5),
            access_log: false,
            access_log_format: "combined".to_string(),
        })
    }

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vps-loop-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.canonicalize().unwrap().join("movie.mp4");
        std::fs::write(&file, b"data").unwrap();
        file
    }

    /// Start the loop on an ephemeral port; launches are sent to the channel
    fn spawn_server(
        shutdown: Arc<Notify>,
    ) -> (SocketAddr, mpsc::UnboundedReceiver<PathBuf>) {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        let on_valid_path = move |path: PathBuf| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(path);
            }
        };
        tokio::task::spawn_local(start_server_loop(listener, settings(), on_valid_path, shutdown));
        (addr, rx)
    }

    async fn send_request(addr: SocketAddr, request: &str) -> String {
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        response
    }

    /// Read until EOF; a reset after the reply (server closed with unread
    /// request bytes) ends the read instead of failing it
    async fn read_reply(client: &mut TcpStream) -> String {
        let mut reply = Vec::new();
        let mut chunk = [0u8; 512];
        loop {
            match client.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => reply.extend_from_slice(&chunk[..n]),
            }
        }
        String::from_utf8_lossy(&reply).into_owned()
    }

    #[tokio::test]
    async fn test_existing_file_is_launched_once() {
        let file = scratch_file("existing");
        let local = LocalSet::new();
        local
            .run_until(async {
                let (addr, mut rx) = spawn_server(Arc::new(Notify::new()));

                let request = format!("GET {} HTTP/1.1\r\n\r\n", file.display());
                let response = send_request(addr, &request).await;

                assert!(response.starts_with("HTTP/2 200\n"), "got: {response}");
                assert!(response.contains("Content-Type: application/json\n"));
                assert!(response.contains("Connection: close\n"));
                assert!(response.ends_with("\n\n{\"status\": 1}"));

                let launched = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(launched, file);
                assert!(rx.try_recv().is_err());
            })
            .await;
        std::fs::remove_dir_all(file.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_launched() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (addr, mut rx) = spawn_server(Arc::new(Notify::new()));

                let response =
                    send_request(addr, "GET /tmp/vps-missing.mp4 HTTP/1.1\r\n\r\n").await;
                assert!(response.starts_with("HTTP/2 404\n"), "got: {response}");
                assert!(response.ends_with("\n\n{\"status\": 0}"));

                let garbage = send_request(addr, "hello\r\n\r\n").await;
                assert!(garbage.starts_with("HTTP/2 404\n"));
                assert!(garbage.ends_with("\n\n{\"status\": 0}"));

                tokio::time::sleep(Duration::from_millis(50)).await;
                assert!(rx.try_recv().is_err());
            })
            .await;
    }

    #[tokio::test]
    async fn test_get_line_past_read_limit_is_ignored() {
        let file = scratch_file("truncated");
        let local = LocalSet::new();
        local
            .run_until(async {
                let (addr, mut rx) = spawn_server(Arc::new(Notify::new()));

                let request = format!(
                    "X-Padding: {}\r\nGET {} HTTP/1.1\r\n\r\n",
                    "a".repeat(2100),
                    file.display()
                );
                let mut client = TcpStream::connect(addr).await.unwrap();
                client.write_all(request.as_bytes()).await.unwrap();
                let response = read_reply(&mut client).await;

                assert!(response.starts_with("HTTP/2 404\n"), "got: {response}");
                assert!(response.ends_with("\n\n{\"status\": 0}"));

                tokio::time::sleep(Duration::from_millis(50)).await;
                assert!(rx.try_recv().is_err());
            })
            .await;
        std::fs::remove_dir_all(file.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_repeated_request_launches_twice() {
        let file = scratch_file("repeat");
        let local = LocalSet::new();
        local
            .run_until(async {
                let (addr, mut rx) = spawn_server(Arc::new(Notify::new()));
                let request = format!("GET {} HTTP/1.1\r\n\r\n", file.display());

                send_request(addr, &request).await;
                send_request(addr, &request).await;

                for _ in 0..2 {
                    let launched = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                        .await
                        .unwrap()
                        .unwrap();
                    assert_eq!(launched, file);
                }
            })
            .await;
        std::fs::remove_dir_all(file.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_hung_launch_does_not_block_accept() {
        let file = scratch_file("hung");
        let local = LocalSet::new();
        local
            .run_until(async {
                let listener =
                    create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
                let addr = listener.local_addr().unwrap();
                let on_valid_path = |_path: PathBuf| std::future::pending::<()>();
                tokio::task::spawn_local(start_server_loop(
                    listener,
                    settings(),
                    on_valid_path,
                    Arc::new(Notify::new()),
                ));

                let request = format!("GET {} HTTP/1.1\r\n\r\n", file.display());
                for _ in 0..3 {
                    let response = tokio::time::timeout(
                        Duration::from_secs(5),
                        send_request(addr, &request),
                    )
                    .await
                    .unwrap();
                    assert!(response.starts_with("HTTP/2 200\n"));
                }
            })
            .await;
        std::fs::remove_dir_all(file.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_dropped_client_does_not_stop_server() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let (addr, _rx) = spawn_server(Arc::new(Notify::new()));

                // connect and hang up without sending anything
                drop(TcpStream::connect(addr).await.unwrap());

                let response =
                    send_request(addr, "GET /tmp/vps-missing.mp4 HTTP/1.1\r\n\r\n").await;
                assert!(response.starts_with("HTTP/2 404\n"));
            })
            .await;
    }

    #[tokio::test]
    async fn test_shutdown_ends_loop() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let listener =
                    create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
                let shutdown = Arc::new(Notify::new());
                let handle = tokio::task::spawn_local(start_server_loop(
                    listener,
                    settings(),
                    |_path: PathBuf| async {},
                    Arc::clone(&shutdown),
                ));

                shutdown.notify_one();
                tokio::time::timeout(Duration::from_secs(5), handle)
                    .await
                    .unwrap()
                    .unwrap();
            })
            .await;
    }
}
