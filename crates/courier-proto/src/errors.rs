//! Error types for the wire codec.
//!
//! Codec failures are strongly typed so the transport layer can collapse
//! them into its own taxonomy without string matching.

use thiserror::Error;

/// Errors produced while encoding a command or decoding a response byte.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// A field contains an interior NUL byte, which would corrupt the
    /// NUL-terminated framing.
    #[error("field contains an embedded NUL byte")]
    EmbeddedNul,

    /// The response byte is not an ASCII digit.
    #[error("invalid status byte {0:#04x}")]
    InvalidStatusByte(u8),
}

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
