use thiserror::Error;

/// Failures that can occur while decoding or encrypting a wire packet.
///
/// Per the session error taxonomy, every variant here is a *session*-class
/// error: the connection that produced it is closed, nothing is retried.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("packet ended before field `{field}` could be read")]
    UnexpectedEnd { field: &'static str },

    #[error("string field `{field}` exceeded {max} bytes")]
    StringTooLong { field: &'static str, max: usize },

    #[error("unrecognized packet header byte {0:#x}")]
    UnknownHeader(u8),

    #[error("quick verification mismatch: expected {expected:#x}, got {got:#x}")]
    QuickVerificationMismatch { expected: u8, got: u8 },

    #[error("requested verification mismatch on handshake reply")]
    VerificationMismatch,

    #[error("handshake frame was {0} bytes, expected exactly 1024")]
    HandshakeSize(usize),
}
