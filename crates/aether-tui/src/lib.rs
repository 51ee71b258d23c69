//! Terminal front end for the Aether launcher.
//!
//! The launcher sends every edit of the query to the backend over a
//! WebSocket, shows the candidates that come back with a sliding highlight,
//! and on Enter asks the backend to launch the selection (or search the web
//! for the typed text) before signalling the host to close it.

pub mod app;
pub mod close;
pub mod colors;
pub mod config;
pub mod highlight;
pub mod launch;
pub mod render;
pub mod selection;
