//! Per-connection transport state (§4.7, §GLOSSARY ServerClient).
//!
//! Grounded in `examples/original_source/Server/Client.c`: the rolling
//! keys, `quick_verification` byte, the 512-message backpressure kick and
//! the dev-cheat block all mirror `rr_server_client_init` /
//! `rr_server_client_write_message` there, re-expressed over
//! `tokio-tungstenite` instead of `libwebsockets`.

pub mod client;
pub mod dispatch;
pub mod handshake;
pub mod snapshot;

pub use client::{DevCheats, ServerClient};
pub use dispatch::handle_frame;
pub use handshake::{build_handshake_frame, verify_handshake_frame};
pub use snapshot::ViewState;
