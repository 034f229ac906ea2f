//! Wire codec for the courier presence protocol.
//!
//! A request is a sequence of NUL-terminated UTF-8 fields sent as
//! independent writes: the command keyword first, then zero or more
//! arguments in a fixed, command-specific order. NUL terminators avoid
//! length prefixes for short identifiers. The response is a single
//! ASCII-digit byte, so the protocol is parseable without buffering.
//!
//! # Components
//!
//! - [`Command`]: a protocol command plus its arguments, encodable into
//!   ordered wire fields
//! - [`StatusCode`]: the decoded single-byte server response
//! - [`interpret`]: the pure (operation, status) → [`Verdict`] table
//!
//! This crate performs no I/O; driving a request over a connection is
//! the transport's job in `courier-client`.

#![forbid(unsafe_code)]

mod command;
mod errors;
mod status;

pub use command::{ALIAS_MAX, Command, CommandKind, USERNAME_MAX};
pub use errors::{ProtocolError, Result};
pub use status::{Outcome, StatusCode, Verdict, interpret};
