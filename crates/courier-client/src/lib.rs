//! Client core for the courier presence/messaging service.
//!
//! A user registers an identity, connects to become reachable, and
//! exchanges messages with other connected users through a central
//! server. This crate is the protocol engine behind whatever shell
//! renders the results: it owns the registered identity, runs one
//! request/response cycle per operation over a single-use TCP
//! connection, and maps the server's one-byte status into a structured
//! [`Report`] for the shell to display.
//!
//! # Components
//!
//! - [`Engine`]: one operation per supported command; each performs
//!   exactly one transport cycle (or fails locally first)
//! - [`transport`]: the one-shot connect/write/read/close cycle with a
//!   bounded response wait
//! - [`ClientIdentity`] / [`Registration`]: identity state and local
//!   registration-form validation
//! - [`ConnectionEndpoint`]: server and advertised client addresses
//!
//! # Concurrency
//!
//! Operations are `async fn(&mut self)` on [`Engine`]: the exclusive
//! borrow guarantees no two operations are in flight for the same
//! identity, and each call blocks its caller until the cycle completes
//! or the response wait expires. There is no cancellation path.

#![forbid(unsafe_code)]

mod endpoint;
mod engine;
mod identity;
pub mod transport;

pub use courier_proto::{Outcome, Verdict};
pub use endpoint::{ConfigError, ConnectionEndpoint, SERVER_PORT_MIN};
pub use engine::{Engine, Report};
pub use identity::{ClientIdentity, Registration, ValidationError};
pub use transport::{TransportConfig, TransportError};
