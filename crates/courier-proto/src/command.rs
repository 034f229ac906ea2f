//! Protocol commands and their wire framing.
//!
//! Every command encodes to an ordered sequence of NUL-terminated UTF-8
//! fields, keyword first. The fields are deliberately kept as separate
//! buffers: the transport writes them one by one, matching the framing
//! the server expects.
//!
//! The list-connected-users request has no documented body and therefore
//! no variant here; it never reaches the codec.

use bytes::{BufMut, Bytes, BytesMut};

use crate::errors::{ProtocolError, Result};

/// Maximum encoded length of a username, in bytes.
pub const USERNAME_MAX: usize = 62;

/// Maximum encoded length of an alias, in bytes.
pub const ALIAS_MAX: usize = 30;

/// Operation kind, used to select the response interpretation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Register an identity with the server.
    Register,
    /// Remove a registered identity.
    Unregister,
    /// Become reachable, advertising the client's listening port.
    Connect,
    /// Stop being reachable.
    Disconnect,
    /// Deliver a text message to another user.
    Send,
    /// Deliver a text message with a file attachment.
    SendAttach,
}

impl CommandKind {
    /// Wire keyword for this operation.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Register => "REGISTER",
            Self::Unregister => "UNREGISTER",
            Self::Connect => "CONNECT",
            Self::Disconnect => "DISCONNECT",
            Self::Send => "SEND",
            Self::SendAttach => "SENDATTACH",
        }
    }
}

/// A protocol command with its arguments.
///
/// # Invariants
///
/// - Field Order: [`Command::fields`] emits the keyword first, then the
///   arguments in the fixed order the server expects for that command.
/// - Clean Framing: every emitted field ends with exactly one NUL and
///   contains none elsewhere; arguments with interior NULs are rejected
///   during encoding.
///
/// Length limits on username and alias are a registration-form concern
/// and are validated before a command is built; the codec does not
/// re-check them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `REGISTER <username> <alias> <birth_date>`
    Register {
        /// Full name of the user.
        username: String,
        /// Unique handle used for all post-registration operations.
        alias: String,
        /// Birth date, already slash-separated (`dd/mm/yyyy`).
        birth_date: String,
    },
    /// `UNREGISTER <alias>`
    Unregister {
        /// Alias to remove.
        alias: String,
    },
    /// `CONNECT <alias> <client_port>`
    Connect {
        /// Alias of the connecting user.
        alias: String,
        /// Port this client advertises for peer delivery.
        client_port: u16,
    },
    /// `DISCONNECT <alias>`
    Disconnect {
        /// Alias of the disconnecting user.
        alias: String,
    },
    /// `SEND <dest> <message>`
    ///
    /// The field layout is documented; the server's response contract is
    /// not, so the engine does not yet drive this command over the wire.
    Send {
        /// Destination alias.
        dest: String,
        /// Message text.
        message: String,
    },
    /// `SENDATTACH <dest> <message> <file_path>`
    ///
    /// Same caveat as [`Command::Send`].
    SendAttach {
        /// Destination alias.
        dest: String,
        /// Message text.
        message: String,
        /// Path of the attached file.
        file_path: String,
    },
}

impl Command {
    /// Operation kind of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Register { .. } => CommandKind::Register,
            Self::Unregister { .. } => CommandKind::Unregister,
            Self::Connect { .. } => CommandKind::Connect,
            Self::Disconnect { .. } => CommandKind::Disconnect,
            Self::Send { .. } => CommandKind::Send,
            Self::SendAttach { .. } => CommandKind::SendAttach,
        }
    }

    /// Encode into the ordered sequence of NUL-terminated wire fields.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::EmbeddedNul` if any argument contains an
    ///   interior NUL byte.
    pub fn fields(&self) -> Result<Vec<Bytes>> {
        let mut out = Vec::with_capacity(4);
        push_field(&mut out, self.kind().keyword())?;

        match self {
            Self::Register { username, alias, birth_date } => {
                push_field(&mut out, username)?;
                push_field(&mut out, alias)?;
                push_field(&mut out, birth_date)?;
            },
            Self::Unregister { alias } | Self::Disconnect { alias } => {
                push_field(&mut out, alias)?;
            },
            Self::Connect { alias, client_port } => {
                push_field(&mut out, alias)?;
                push_field(&mut out, &client_port.to_string())?;
            },
            Self::Send { dest, message } => {
                push_field(&mut out, dest)?;
                push_field(&mut out, message)?;
            },
            Self::SendAttach { dest, message, file_path } => {
                push_field(&mut out, dest)?;
                push_field(&mut out, message)?;
                push_field(&mut out, file_path)?;
            },
        }

        Ok(out)
    }
}

/// Append one NUL-terminated field.
fn push_field(out: &mut Vec<Bytes>, text: &str) -> Result<()> {
    if text.as_bytes().contains(&0) {
        return Err(ProtocolError::EmbeddedNul);
    }

    let mut buf = BytesMut::with_capacity(text.len() + 1);
    buf.put_slice(text.as_bytes());
    buf.put_u8(0);
    out.push(buf.freeze());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(fields: &[Bytes]) -> Vec<u8> {
        fields.iter().flat_map(|f| f.iter().copied()).collect()
    }

    #[test]
    fn register_field_order_matches_wire_contract() {
        let command = Command::Register {
            username: "Bob Smith".to_owned(),
            alias: "bob".to_owned(),
            birth_date: "01/01/2000".to_owned(),
        };

        let fields = command.fields().unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(flat(&fields), b"REGISTER\0Bob Smith\0bob\001/01/2000\0");
    }

    #[test]
    fn connect_carries_decimal_port() {
        let command = Command::Connect { alias: "bob".to_owned(), client_port: 8080 };

        assert_eq!(flat(&command.fields().unwrap()), b"CONNECT\0bob\08080\0");
    }

    #[test]
    fn embedded_nul_is_rejected() {
        let command = Command::Unregister { alias: "bo\0b".to_owned() };

        assert_eq!(command.fields(), Err(ProtocolError::EmbeddedNul));
    }
}
