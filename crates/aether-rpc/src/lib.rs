//! Backend channels for the Aether launcher.
//!
//! The launcher talks to its local backend over two channels:
//!
//! - [`query`]: a persistent WebSocket that carries one request per input
//!   change and streams replies back
//! - [`launch`]: a one-shot HTTP `POST /run` that asks the backend to start
//!   the chosen candidate (or run a web search)
//!
//! The remaining modules hold the frame codec ([`transport`]) and the error
//! type ([`error`]).
//!
//! # Example
//!
//! ```no_run
//! use aether_rpc::{QueryChannel, DEFAULT_QUERY_URL};
//!
//! # async fn example() -> Result<(), aether_rpc::ClientError> {
//! let mut channel = QueryChannel::connect_to(DEFAULT_QUERY_URL).await?;
//!
//! let seq = channel.submit("fire")?;
//! if let Some(reply) = channel.recv().await {
//!     println!("reply to #{seq}: {:?}", reply.outcome);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod launch;
pub mod query;
pub mod transport;

pub use error::{ClientError, Result};
pub use launch::LaunchClient;
pub use query::QueryChannel;
pub use transport::CodecError;

pub use aether_types::{LaunchRequest, QueryOutcome, QueryReply, QueryRequest};

/// Loopback WebSocket endpoint of the query channel.
pub const DEFAULT_QUERY_URL: &str = "ws://127.0.0.1:3000";

/// Loopback HTTP endpoint for launches.
pub const DEFAULT_LAUNCH_URL: &str = "http://127.0.0.1:3000/run";
