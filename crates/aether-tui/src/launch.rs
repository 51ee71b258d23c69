//! Launch dispatch and the close sentinel.
//!
//! A commit hands a [`LaunchRequest`] to the dispatcher, which posts it to the
//! backend, waits a short settle delay so the backend can finish spawning,
//! and then raises the [`CloseSentinel`]. The hosting shell watches the
//! sentinel (and the terminal title it is mirrored into) to know the
//! launcher is done.

use std::sync::Arc;
use std::time::Duration;

use aether_rpc::{ClientError, LaunchClient};
use aether_types::LaunchRequest;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Window title written when the launcher wants to be closed
pub const CLOSE_SENTINEL: &str = "__AETHER_LAUNCHER_CLOSE__";

/// Default wait between a completed launch and raising the sentinel
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(150);

/// Externally observable "close me" marker.
#[derive(Debug, Clone)]
pub struct CloseSentinel {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CloseSentinel {
    fn default() -> Self {
        Self::new()
    }
}

impl CloseSentinel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn raise(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_raised(&self) -> bool {
        *self.tx.borrow()
    }
}

/// How a dispatched launch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The backend answered (any status); the sentinel was raised
    Completed,
    /// The request never completed; the launcher stays open
    Failed,
}

#[derive(Debug, Clone)]
pub struct LaunchDispatcher {
    client: LaunchClient,
    settle: Duration,
    sentinel: CloseSentinel,
}

impl LaunchDispatcher {
    pub fn new(client: LaunchClient, settle: Duration, sentinel: CloseSentinel) -> Self {
        Self {
            client,
            settle,
            sentinel,
        }
    }

    pub fn sentinel(&self) -> &CloseSentinel {
        &self.sentinel
    }

    /// Post `request`, settle, then raise the sentinel.
    ///
    /// Failures are logged, never surfaced. A non-success status still
    /// counts as a completed request.
    pub async fn dispatch(&self, request: LaunchRequest) -> LaunchOutcome {
        match self.client.launch(&request).await {
            Ok(()) => info!(
                "Launched {:?} (web search: {})",
                request.message, request.search_in_web
            ),
            Err(ClientError::Status(code)) => {
                warn!("Backend answered launch of {:?} with {code}", request.message);
            }
            Err(e) => {
                error!(
                    "Launch of {:?} via {} failed: {e}",
                    request.message,
                    self.client.url()
                );
                return LaunchOutcome::Failed;
            }
        }

        tokio::time::sleep(self.settle).await;
        self.sentinel.raise();
        LaunchOutcome::Completed
    }

    /// Run [`dispatch`](Self::dispatch) on its own task so the UI keeps
    /// drawing.
    pub fn spawn(&self, request: LaunchRequest) -> JoinHandle<LaunchOutcome> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer every request on a fresh loopback port with `status`.
    async fn backend(status: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                drain_request(&mut stream).await;
                let response =
                    format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        format!("http://{addr}/run")
    }

    /// Read headers and the full body so the response is not cut short.
    async fn drain_request(stream: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let Ok(n) = stream.read(&mut chunk).await else {
                return;
            };
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length: usize = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }

    fn dispatcher(url: String) -> LaunchDispatcher {
        LaunchDispatcher::new(
            LaunchClient::new(url).unwrap(),
            Duration::from_millis(10),
            CloseSentinel::new(),
        )
    }

    #[test]
    fn test_sentinel_starts_lowered() {
        let sentinel = CloseSentinel::new();
        assert!(!sentinel.is_raised());

        let rx = sentinel.subscribe();
        sentinel.raise();
        assert!(sentinel.is_raised());
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn test_dispatch_raises_sentinel_after_completion() {
        let dispatcher = dispatcher(backend("200 OK").await);
        let mut rx = dispatcher.sentinel().subscribe();

        let outcome = dispatcher
            .dispatch(LaunchRequest::candidate("Firewall Config"))
            .await;

        assert_eq!(outcome, LaunchOutcome::Completed);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn test_error_status_still_closes() {
        let dispatcher = dispatcher(backend("500 Internal Server Error").await);

        let outcome = dispatcher.dispatch(LaunchRequest::web_search("fire")).await;

        assert_eq!(outcome, LaunchOutcome::Completed);
        assert!(dispatcher.sentinel().is_raised());
    }

    #[tokio::test]
    async fn test_unreachable_backend_keeps_launcher_open() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let dispatcher = dispatcher(format!("http://127.0.0.1:{port}/run"));

        let outcome = dispatcher.spawn(LaunchRequest::candidate("Firefox")).await.unwrap();

        assert_eq!(outcome, LaunchOutcome::Failed);
        assert!(!dispatcher.sentinel().is_raised());
    }
}
