//! Top-level server error type, unifying protocol, transport and sidecar
//! failures behind one `?`-friendly enum (teacher's `thiserror` usage).

use rysteria_protocol::ProtocolError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("account sidecar unavailable: {0}")]
    SidecarUnavailable(String),

    #[error("entity allocator exhausted")]
    EntitiesExhausted,
}

pub type ServerResult<T> = Result<T, ServerError>;
