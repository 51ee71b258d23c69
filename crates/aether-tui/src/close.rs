//! Bridge from external close requests to the launcher's cancel transition.
//!
//! The hosting shell can ask the launcher to go away with SIGUSR1 or
//! SIGTERM (Ctrl-C delivered as a signal works too). Each request is
//! forwarded over a channel to the UI task, which runs exactly the same
//! transition as pressing Escape.
//!
//! The other direction is [`close_for_sentinel`]: once a launch has
//! settled the launcher tells its host to hide it by setting the terminal
//! title to [`CLOSE_SENTINEL`].

use std::io::Write;

use crossterm::{execute, terminal::SetTitle};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::App;
use crate::launch::CLOSE_SENTINEL;

/// Where a close request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseSource {
    Interrupt,
    Terminate,
    User1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseRequest {
    pub source: CloseSource,
}

pub struct CloseBridge {
    tx: mpsc::Sender<CloseRequest>,
    rx: mpsc::Receiver<CloseRequest>,
}

impl Default for CloseBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl CloseBridge {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(4);
        Self { tx, rx }
    }

    /// Install the process signal handlers. Must be called inside a runtime.
    pub fn listen_for_signals(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match wait_for_signal().await {
                Ok(source) => {
                    info!("Close requested by {source:?}");
                    let _ = tx.send(CloseRequest { source }).await;
                }
                Err(e) => warn!("Could not install close signal handlers: {e}"),
            }
        });
    }

    /// Next close request. Never resolves to `None` while the bridge holds
    /// its own sender.
    pub async fn next(&mut self) -> Option<CloseRequest> {
        self.rx.recv().await
    }
}

/// Apply a close request to the app.
pub fn handle_close_request(app: &mut App, request: CloseRequest) {
    info!("Closing launcher ({:?})", request.source);
    app.cancel();
}

/// Announce the close to the host through the terminal title, then run the
/// cancel transition.
///
/// # Errors
///
/// Returns the write error if the title cannot be set; the app is left
/// untouched in that case.
pub fn close_for_sentinel<W: Write>(out: &mut W, app: &mut App) -> std::io::Result<()> {
    execute!(out, SetTitle(CLOSE_SENTINEL))?;
    info!("Close sentinel written");
    app.cancel();
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<CloseSource> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut user1 = signal(SignalKind::user_defined1())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = user1.recv() => Ok(CloseSource::User1),
        _ = terminate.recv() => Ok(CloseSource::Terminate),
        result = tokio::signal::ctrl_c() => result.map(|()| CloseSource::Interrupt),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<CloseSource> {
    tokio::signal::ctrl_c().await?;
    Ok(CloseSource::Interrupt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_reaches_bridge() {
        let mut bridge = CloseBridge::new();
        bridge
            .tx
            .send(CloseRequest {
                source: CloseSource::Terminate,
            })
            .await
            .unwrap();

        let request = bridge.next().await.unwrap();
        assert_eq!(request.source, CloseSource::Terminate);
    }

    #[tokio::test]
    async fn test_close_request_cancels_app() {
        let mut bridge = CloseBridge::new();
        let mut app = App::default();
        bridge
            .tx
            .send(CloseRequest {
                source: CloseSource::User1,
            })
            .await
            .unwrap();

        let request = bridge.next().await.unwrap();
        handle_close_request(&mut app, request);
        assert!(app.should_quit);
    }

    #[cfg(unix)]
    #[test]
    fn test_sentinel_sets_title_and_cancels() {
        let mut app = App::default();
        let mut out: Vec<u8> = Vec::new();

        close_for_sentinel(&mut out, &mut app).unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(written.contains(CLOSE_SENTINEL), "wrote {written:?}");
        assert!(app.should_quit);
    }

    #[cfg(unix)]
    struct BrokenPipe;

    #[cfg(unix)]
    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_sentinel_write_failure_is_reported() {
        let mut app = App::default();
        assert!(close_for_sentinel(&mut BrokenPipe, &mut app).is_err());
        assert!(!app.should_quit);
    }
}
