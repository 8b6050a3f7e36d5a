//! Active identity (`user.name` / `user.email`) at global and local scope.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::backend::{ConfigBackend, Scope};
use crate::errors::{BackendError, IdentityError};
use crate::models::{ActiveIdentity, IdentityState};

pub const USER_NAME: &str = "user.name";
pub const USER_EMAIL: &str = "user.email";

/// Reads and writes the identity git will use for commits.
///
/// Independent of the catalog: the local identity does not have to match any
/// stored record.
#[derive(Clone)]
pub struct ActiveIdentityManager {
    backend: Arc<dyn ConfigBackend>,
}

impl ActiveIdentityManager {
    pub fn new(backend: Arc<dyn ConfigBackend>) -> Self {
        Self { backend }
    }

    /// Write `user.name` then `user.email` at `scope`.
    #[instrument(skip(self))]
    pub fn set_active(&self, scope: Scope, name: &str, email: &str) -> Result<(), IdentityError> {
        self.backend
            .set(scope, USER_NAME, name)
            .map_err(|e| IdentityError::write(USER_NAME, e))?;
        self.backend
            .set(scope, USER_EMAIL, email)
            .map_err(|e| IdentityError::write(USER_EMAIL, e))?;
        info!("active identity set");
        Ok(())
    }

    /// Read the active identity at exactly `scope`, with no fallback to the
    /// other scope.
    pub fn get_active(&self, scope: Scope) -> Result<ActiveIdentity, IdentityError> {
        let name = self.read(scope, USER_NAME)?;
        let email = self.read(scope, USER_EMAIL)?;
        match (name, email) {
            (Some(name), Some(email)) => Ok(ActiveIdentity { name, email }),
            _ => Err(IdentityError::NoIdentityConfigured { scope }),
        }
    }

    /// True only inside a repository whose own config sets both `user.name`
    /// and `user.email` to non-empty values.
    pub fn has_local_override(&self) -> bool {
        if !self.is_in_project_context() {
            return false;
        }
        let non_empty = |key: &str| match self.backend.get(Scope::Local, key) {
            Ok(Some(value)) => !value.is_empty(),
            Ok(None) => false,
            Err(e) => {
                warn!(key, error = %e, "could not read local identity");
                false
            }
        };
        non_empty(USER_NAME) && non_empty(USER_EMAIL)
    }

    /// Remove the repository's `user.name` / `user.email`. Keys that are
    /// already absent are not an error.
    #[instrument(skip(self))]
    pub fn clear_local_override(&self) -> Result<(), IdentityError> {
        for key in [USER_NAME, USER_EMAIL] {
            match self.backend.unset(Scope::Local, key) {
                Ok(()) => debug!(key, "local key removed"),
                Err(BackendError::KeyNotFound { .. }) => debug!(key, "local key already unset"),
                Err(e) => return Err(IdentityError::write(key, e)),
            }
        }
        info!("local identity cleared");
        Ok(())
    }

    pub fn is_in_project_context(&self) -> bool {
        self.backend.is_in_project_context()
    }

    /// Derive which identity is in effect from the current directory.
    pub fn state(&self) -> IdentityState {
        let global = self.get_active(Scope::Global).ok();
        if self.has_local_override() {
            if let Ok(local) = self.get_active(Scope::Local) {
                return IdentityState::LocalOverrideActive { local, global };
            }
        }
        match global {
            Some(global) => IdentityState::GlobalOnly { global },
            None => IdentityState::NoIdentityConfigured,
        }
    }

    fn read(&self, scope: Scope, key: &str) -> Result<Option<String>, IdentityError> {
        self.backend
            .get(scope, key)
            .map_err(|e| IdentityError::read(key, e))
    }
}
