//! Persistent query channel to the launcher backend.
//!
//! One WebSocket is opened at startup and shared by every query. Sending is
//! fire-and-forget: [`QueryChannel::submit`] only enqueues the frame for a
//! writer task and returns the request's sequence number. A reader task
//! decodes replies and hands them to whoever drains [`QueryChannel::recv`].
//! Malformed frames are logged and skipped so the reader keeps running.

use std::sync::atomic::{AtomicU64, Ordering};

use aether_types::{QueryReply, QueryRequest};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::error::{ClientError, Result};
use crate::transport::{self, CodecError};

/// Buffered replies before the reader applies backpressure
const REPLY_BUFFER: usize = 64;

/// Client half of the query protocol
pub struct QueryChannel {
    outbound: mpsc::UnboundedSender<QueryRequest>,
    replies: mpsc::Receiver<QueryReply>,
    next_seq: AtomicU64,
}

impl QueryChannel {
    /// Open the WebSocket at `url` and start the reader and writer tasks.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::WebSocket` if the handshake fails.
    pub async fn connect_to(url: &str) -> Result<Self> {
        let (ws, _response) = tokio_tungstenite::connect_async(url).await?;
        debug!("Query channel open: {url}");

        let (mut sink, mut stream) = ws.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<QueryRequest>();
        let (reply_tx, reply_rx) = mpsc::channel(REPLY_BUFFER);

        tokio::spawn(async move {
            while let Some(request) = outbound_rx.recv().await {
                let frame = match transport::encode_request(&request) {
                    Ok(frame) => frame,
                    Err(e) => {
                        error!("Failed to encode query #{}: {e}", request.seq);
                        continue;
                    }
                };
                if let Err(e) = sink.send(frame).await {
                    error!("Query channel send failed: {e}");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => {
                        error!("Query channel read failed: {e}");
                        break;
                    }
                };
                match transport::decode_reply(frame) {
                    Ok(Some(reply)) => {
                        if reply_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(CodecError::Closed) => {
                        debug!("Backend closed the query channel");
                        break;
                    }
                    Err(e) => warn!("Dropping malformed reply: {e}"),
                }
            }
            debug!("Query channel reader finished");
        });

        Ok(Self {
            outbound: outbound_tx,
            replies: reply_rx,
            next_seq: AtomicU64::new(1),
        })
    }

    /// Queue `text` as the next query and return its sequence number.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ConnectionClosed` if the writer task is gone.
    pub fn submit(&self, text: &str) -> Result<u64> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.outbound
            .send(QueryRequest::new(text, seq))
            .map_err(|_| ClientError::ConnectionClosed)?;
        debug!("Queued query #{seq}: {text:?}");
        Ok(seq)
    }

    /// Next decoded reply, or `None` once the channel has closed.
    pub async fn recv(&mut self) -> Option<QueryReply> {
        self.replies.recv().await
    }
}
