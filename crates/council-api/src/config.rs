//! Server configuration read from the environment.

use std::net::SocketAddr;

use council_event_store::SessionPaths;

use crate::error::AppError;

/// Bind address used when `HOST` is unset.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Where session logs live.
    pub paths: SessionPaths,
}

impl ApiConfig {
    /// Builds the configuration from a variable lookup, so callers other
    /// than `main` never need to touch the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` is not a valid port number or
    /// no session root can be determined.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let paths = SessionPaths::from_lookup(&lookup).map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self { host, port, paths })
    }

    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`ApiConfig::from_lookup`].
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a valid address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
