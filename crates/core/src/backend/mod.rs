//! Key-value configuration backends.
//!
//! The identity store and active-identity manager never touch git config
//! files directly; they talk to a [`ConfigBackend`]. [`GitConfigBackend`]
//! persists through `git2`, [`MemoryBackend`] keeps everything in process and
//! is what the tests run against.

pub mod git;
pub mod memory;

use std::fmt;

use serde::Serialize;

use crate::errors::BackendError;

pub use git::GitConfigBackend;
pub use memory::MemoryBackend;

/// Which layer of git configuration an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Machine-wide, per-user configuration (`~/.gitconfig`).
    Global,
    /// Per-repository configuration (`.git/config`).
    Local,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Local => f.write_str("local"),
        }
    }
}

/// Minimal contract the identity core needs from a config store.
///
/// Implementations must read each scope in isolation: a `Local` read never
/// falls through to `Global`.
pub trait ConfigBackend: Send + Sync {
    /// Read a single value. `Ok(None)` when the key is not set.
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, BackendError>;

    /// Write a single value, replacing any existing one.
    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), BackendError>;

    /// Remove a key. Fails with [`BackendError::KeyNotFound`] if it is absent.
    fn unset(&self, scope: Scope, key: &str) -> Result<(), BackendError>;

    /// All `(key, value)` pairs whose key matches the regex `pattern`, in the
    /// store's natural order.
    fn entries(&self, scope: Scope, pattern: &str) -> Result<Vec<(String, String)>, BackendError>;

    /// Whether the process is operating inside a git working tree.
    fn is_in_project_context(&self) -> bool;
}
