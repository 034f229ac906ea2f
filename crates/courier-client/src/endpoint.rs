//! Connection endpoint configuration.
//!
//! One [`ConnectionEndpoint`] is built at startup from the shell's
//! arguments and stays immutable for the process lifetime. It carries
//! the server address the engine dials plus the client's own advertised
//! address, which the server forwards to peers once this client
//! connects.

use thiserror::Error;

/// Lowest server port accepted; ports below are reserved.
pub const SERVER_PORT_MIN: u16 = 1024;

/// Endpoint validation errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Server port outside the accepted range.
    #[error("port must be in the range 1024 <= port <= 65535, got {0}")]
    PortOutOfRange(u16),
}

/// Server and advertised client addresses for one client process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEndpoint {
    server_host: String,
    server_port: u16,
    client_host: String,
    client_port: u16,
}

impl ConnectionEndpoint {
    /// Default server host.
    pub const DEFAULT_SERVER_HOST: &'static str = "localhost";
    /// Default server port.
    pub const DEFAULT_SERVER_PORT: u16 = 2137;
    /// Default advertised client host.
    pub const DEFAULT_CLIENT_HOST: &'static str = "localhost";
    /// Default advertised client port.
    pub const DEFAULT_CLIENT_PORT: u16 = 8080;

    /// Build a validated endpoint.
    ///
    /// # Errors
    ///
    /// - `ConfigError::PortOutOfRange` if the server port is below 1024.
    pub fn new(
        server_host: impl Into<String>,
        server_port: u16,
        client_host: impl Into<String>,
        client_port: u16,
    ) -> Result<Self, ConfigError> {
        if server_port < SERVER_PORT_MIN {
            return Err(ConfigError::PortOutOfRange(server_port));
        }

        Ok(Self {
            server_host: server_host.into(),
            server_port,
            client_host: client_host.into(),
            client_port,
        })
    }

    /// Server address in `host:port` form, ready for dialing.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Host this client advertises to peers.
    pub fn client_host(&self) -> &str {
        &self.client_host
    }

    /// Port this client advertises to peers.
    pub fn client_port(&self) -> u16 {
        self.client_port
    }
}

impl Default for ConnectionEndpoint {
    fn default() -> Self {
        Self {
            server_host: Self::DEFAULT_SERVER_HOST.to_owned(),
            server_port: Self::DEFAULT_SERVER_PORT,
            client_host: Self::DEFAULT_CLIENT_HOST.to_owned(),
            client_port: Self::DEFAULT_CLIENT_PORT,
        }
    }
}
