//! Error types for the gitid core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use thiserror::Error;

use crate::backend::Scope;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Backend errors
// ---------------------------------------------------------------------------

/// Errors raised by a [`crate::backend::ConfigBackend`] implementation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// `unset` was asked to remove a key that does not exist.
    #[error("key '{key}' is not set in {scope} config")]
    KeyNotFound { scope: Scope, key: String },

    /// Local scope was used outside of a git working tree.
    #[error("{scope} config is unavailable: {detail}")]
    ScopeUnavailable { scope: Scope, detail: String },

    /// The key or pattern was rejected before reaching the store.
    #[error("invalid config key or pattern '{0}'")]
    InvalidKey(String),

    /// A `git2` library error.
    #[error("git2 error: {0}")]
    Git(#[from] git2::Error),

    /// Generic I/O wrapper.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Identity errors
// ---------------------------------------------------------------------------

/// Errors from the identity store, resolver and active-identity manager.
///
/// Every variant carries the identifier, email, or key that failed so the
/// presentation layer can build a message without extra lookups.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The catalog holds no record for this email.
    #[error("identity not found for email '{email}'")]
    NotFound { email: String },

    /// Reading a key from the backend failed.
    #[error("failed to read '{key}': {source}")]
    ConfigRead {
        key: String,
        #[source]
        source: BackendError,
    },

    /// Writing or unsetting a key failed.
    #[error("failed to write '{key}': {source}")]
    ConfigWrite {
        key: String,
        #[source]
        source: BackendError,
    },

    /// A local-scope operation ran outside a git repository.
    #[error("{scope} identity is unavailable outside a git repository")]
    ScopeUnavailable { scope: Scope },

    /// The resolver exhausted every matching tier.
    #[error("identity not found: {identifier}")]
    IdentityNotFound { identifier: String },

    /// `user.name` or `user.email` is missing at the requested scope.
    #[error("no {scope} git identity configured")]
    NoIdentityConfigured { scope: Scope },
}

impl IdentityError {
    /// Wrap a backend read failure, surfacing scope problems as their own
    /// variant.
    pub(crate) fn read(key: &str, source: BackendError) -> Self {
        match source {
            BackendError::ScopeUnavailable { scope, .. } => Self::ScopeUnavailable { scope },
            source => Self::ConfigRead {
                key: key.to_string(),
                source,
            },
        }
    }

    /// Wrap a backend write failure, surfacing scope problems as their own
    /// variant.
    pub(crate) fn write(key: &str, source: BackendError) -> Self {
        match source {
            BackendError::ScopeUnavailable { scope, .. } => Self::ScopeUnavailable { scope },
            source => Self::ConfigWrite {
                key: key.to_string(),
                source,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading and validating the gitid settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
