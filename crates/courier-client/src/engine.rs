//! Protocol engine: one operation per supported command.
//!
//! Each operation builds a command, drives it through exactly one
//! transport cycle, and maps the raw response to a [`Report`]. Local
//! rejections (form validation, missing identity) are reported before
//! any connection is opened. The engine mutates the identity only on the
//! two lifecycle transitions: a successful register sets it, a
//! successful unregister clears it.

use courier_proto::{Command, Outcome, Verdict, interpret};
use tracing::{debug, warn};

use crate::endpoint::ConnectionEndpoint;
use crate::identity::{ClientIdentity, Registration};
use crate::transport::{self, TransportConfig};

/// Structured outcome of one protocol operation, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Three-way result category.
    pub outcome: Outcome,
    /// Human-readable line describing which case occurred.
    pub line: String,
    /// True when the response wait expired. The shell raises its modal
    /// timeout notice exactly once per report with this flag set.
    pub timed_out: bool,
}

impl Report {
    fn from_verdict(verdict: Verdict) -> Self {
        Self { outcome: verdict.outcome, line: verdict.line.to_owned(), timed_out: false }
    }

    fn rejected(line: impl Into<String>) -> Self {
        Self { outcome: Outcome::UserError, line: line.into(), timed_out: false }
    }

    fn failed(line: impl Into<String>) -> Self {
        Self { outcome: Outcome::Error, line: line.into(), timed_out: false }
    }

    fn timeout(line: impl Into<String>) -> Self {
        Self { outcome: Outcome::Error, line: line.into(), timed_out: true }
    }

    fn not_registered() -> Self {
        Self::rejected("NOT REGISTERED")
    }
}

/// Client-side protocol engine.
///
/// Owns the connection endpoint, the transport configuration, and the
/// registered identity. `&mut self` on every operation statically
/// serializes operations for this identity; each call blocks its caller
/// for at most one connect/write/read/close cycle.
pub struct Engine {
    endpoint: ConnectionEndpoint,
    transport: TransportConfig,
    identity: Option<ClientIdentity>,
}

impl Engine {
    /// Create an engine with the default transport timing.
    pub fn new(endpoint: ConnectionEndpoint) -> Self {
        Self::with_transport(endpoint, TransportConfig::default())
    }

    /// Create an engine with explicit transport timing.
    pub fn with_transport(endpoint: ConnectionEndpoint, transport: TransportConfig) -> Self {
        Self { endpoint, transport, identity: None }
    }

    /// Currently registered identity, if any.
    pub fn identity(&self) -> Option<&ClientIdentity> {
        self.identity.as_ref()
    }

    /// True once a registration has been accepted and not yet undone.
    pub fn is_registered(&self) -> bool {
        self.identity.is_some()
    }

    /// Register an identity with the server.
    ///
    /// Invalid form input and registering on top of an existing identity
    /// are rejected locally; neither opens a connection. On a `0`
    /// response the identity becomes set; on `1` the alias is taken.
    pub async fn register(&mut self, form: Registration) -> Report {
        if let Some(identity) = &self.identity {
            return Report::rejected(format!("ALREADY REGISTERED AS {}", identity.alias));
        }
        if let Err(err) = form.validate() {
            debug!(%err, "registration form rejected locally");
            return Report::rejected("please fill in the fields to register");
        }

        let identity = form.into_identity();
        let command = Command::Register {
            username: identity.username.clone(),
            alias: identity.alias.clone(),
            birth_date: identity.wire_birth_date(),
        };

        let report = self.cycle(command).await;
        if report.outcome == Outcome::Ok {
            self.identity = Some(identity);
        }
        report
    }

    /// Remove the registered identity from the server.
    ///
    /// On a `0` response the identity is fully cleared; every later
    /// operation requiring one reports the precondition failure.
    pub async fn unregister(&mut self) -> Report {
        let Some(identity) = &self.identity else {
            return Report::not_registered();
        };

        let command = Command::Unregister { alias: identity.alias.clone() };
        let report = self.cycle(command).await;
        if report.outcome == Outcome::Ok {
            self.identity = None;
        }
        report
    }

    /// Become reachable, advertising this client's listening port.
    pub async fn connect(&mut self) -> Report {
        let Some(identity) = &self.identity else {
            return Report::not_registered();
        };

        let command = Command::Connect {
            alias: identity.alias.clone(),
            client_port: self.endpoint.client_port(),
        };
        self.cycle(command).await
    }

    /// Stop being reachable.
    pub async fn disconnect(&mut self) -> Report {
        let Some(identity) = &self.identity else {
            return Report::not_registered();
        };

        let command = Command::Disconnect { alias: identity.alias.clone() };
        self.cycle(command).await
    }

    /// Deliver a text message to another user.
    ///
    /// Not supported in this revision: the server's response contract
    /// for `SEND` is undefined, so no bytes are put on the wire.
    pub async fn send_message(&mut self, dest: &str, message: &str) -> Report {
        if self.identity.is_none() {
            return Report::not_registered();
        }

        let _ = message;
        warn!(dest, "SEND is not supported in this revision");
        Report::failed("SEND FAIL (not supported in this revision)")
    }

    /// Deliver a text message with a file attachment.
    ///
    /// Not supported in this revision, same as [`Engine::send_message`].
    pub async fn send_attachment(&mut self, dest: &str, message: &str, file_path: &str) -> Report {
        if self.identity.is_none() {
            return Report::not_registered();
        }

        let _ = (message, file_path);
        warn!(dest, "SENDATTACH is not supported in this revision");
        Report::failed("SENDATTACH FAIL (not supported in this revision)")
    }

    /// List the currently connected aliases.
    ///
    /// Not supported in this revision: the request body is undocumented,
    /// so nothing is sent.
    pub async fn connected_users(&mut self) -> Report {
        if self.identity.is_none() {
            return Report::not_registered();
        }

        warn!("CONNECTEDUSERS is not supported in this revision");
        Report::failed("CONNECTEDUSERS FAIL (not supported in this revision)")
    }

    /// Drive one command through a single transport cycle.
    async fn cycle(&self, command: Command) -> Report {
        let kind = command.kind();
        let fields = match command.fields() {
            Ok(fields) => fields,
            Err(err) => return Report::failed(format!("{} FAIL ({err})", kind.keyword())),
        };

        match transport::exchange(&self.endpoint, &fields, &self.transport).await {
            Ok(code) => {
                let verdict = interpret(kind, code);
                debug!(?kind, code = code.value(), outcome = ?verdict.outcome, "exchange done");
                Report::from_verdict(verdict)
            },
            Err(err) if err.is_timeout() => {
                warn!(?kind, "no response from server");
                Report::timeout(format!(
                    "{} FAIL (no data received within {:?})",
                    kind.keyword(),
                    self.transport.response_timeout
                ))
            },
            Err(err) => {
                debug!(?kind, %err, "exchange failed");
                Report::failed(format!("{} FAIL ({err})", kind.keyword()))
            },
        }
    }
}
