//! Response decoding and the per-operation interpretation tables.
//!
//! The server answers every request with exactly one ASCII-digit byte.
//! [`StatusCode`] decodes that byte; [`interpret`] is the pure mapping
//! from (operation kind, status) to the semantic [`Outcome`] plus the
//! display line the shell renders. Keeping the mapping a pure function
//! makes every row testable without a network.

use crate::command::CommandKind;
use crate::errors::{ProtocolError, Result};

/// Decoded single-byte server response.
///
/// Holds the digit value (`0..=9`), not the raw wire byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u8);

impl StatusCode {
    /// The success status every operation shares.
    pub const OK: Self = Self(0);

    /// Decode a raw response byte.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::InvalidStatusByte` if the byte is not an ASCII
    ///   digit.
    pub fn from_wire(byte: u8) -> Result<Self> {
        if byte.is_ascii_digit() {
            Ok(Self(byte - b'0'))
        } else {
            Err(ProtocolError::InvalidStatusByte(byte))
        }
    }

    /// Digit value of this status (`0..=9`).
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Three-way result category of every protocol operation.
///
/// Carries no payload; the accompanying display line describes which
/// case occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the operation.
    Ok,
    /// Operation-specific semantic rejection (duplicate registration,
    /// unknown user, already/not connected). Always recoverable.
    UserError,
    /// Transport failure, timeout, or an unrecognized status code.
    Error,
}

/// Interpreted response: outcome category plus its display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Semantic outcome of the operation.
    pub outcome: Outcome,
    /// Server-style line describing the case.
    pub line: &'static str,
}

impl Verdict {
    const fn new(outcome: Outcome, line: &'static str) -> Self {
        Self { outcome, line }
    }
}

/// Map an operation's response status to its semantic verdict.
///
/// Status codes outside an operation's documented set fall through to
/// that operation's generic failure row with [`Outcome::Error`]. The
/// `SEND` and `SENDATTACH` response contracts are undefined server-side,
/// so every status maps to failure for them.
pub fn interpret(kind: CommandKind, code: StatusCode) -> Verdict {
    match (kind, code.value()) {
        (CommandKind::Register, 0) => Verdict::new(Outcome::Ok, "REGISTER OK"),
        (CommandKind::Register, 1) => Verdict::new(Outcome::UserError, "USERNAME IN USE"),
        (CommandKind::Register, _) => Verdict::new(Outcome::Error, "REGISTER FAIL"),

        (CommandKind::Unregister, 0) => Verdict::new(Outcome::Ok, "UNREGISTER OK"),
        (CommandKind::Unregister, 1) => Verdict::new(Outcome::UserError, "USER DOES NOT EXIST"),
        (CommandKind::Unregister, _) => Verdict::new(Outcome::Error, "UNREGISTER FAIL"),

        (CommandKind::Connect, 0) => Verdict::new(Outcome::Ok, "CONNECT OK"),
        (CommandKind::Connect, 1) => {
            Verdict::new(Outcome::UserError, "CONNECT FAIL, USER DOES NOT EXIST")
        },
        (CommandKind::Connect, 2) => Verdict::new(Outcome::UserError, "USER ALREADY CONNECTED"),
        (CommandKind::Connect, _) => Verdict::new(Outcome::Error, "CONNECT FAIL"),

        (CommandKind::Disconnect, 0) => Verdict::new(Outcome::Ok, "DISCONNECT OK"),
        (CommandKind::Disconnect, 1) => {
            Verdict::new(Outcome::UserError, "DISCONNECT FAIL / USER DOES NOT EXIST")
        },
        (CommandKind::Disconnect, 2) => {
            Verdict::new(Outcome::UserError, "DISCONNECT FAIL / USER NOT CONNECTED")
        },
        (CommandKind::Disconnect, _) => Verdict::new(Outcome::Error, "DISCONNECT FAIL"),

        (CommandKind::Send, _) => Verdict::new(Outcome::Error, "SEND FAIL"),
        (CommandKind::SendAttach, _) => Verdict::new(Outcome::Error, "SENDATTACH FAIL"),
    }
}
