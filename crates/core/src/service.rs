//! Identity operations composed from the store, resolver and active manager.
//!
//! This is what the CLI calls. Every method re-reads the backend; nothing is
//! cached between calls.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::active::ActiveIdentityManager;
use crate::backend::{ConfigBackend, Scope};
use crate::errors::IdentityError;
use crate::identity::{ConfigIdentityStore, IdentityRepository, IdentityResolver};
use crate::models::{Identity, IdentityState};

/// Entry point wiring one backend into every component.
#[derive(Clone)]
pub struct IdentityService {
    store: ConfigIdentityStore,
    active: ActiveIdentityManager,
}

impl IdentityService {
    pub fn new(backend: Arc<dyn ConfigBackend>) -> Self {
        Self {
            store: ConfigIdentityStore::new(backend.clone()),
            active: ActiveIdentityManager::new(backend),
        }
    }

    pub fn store(&self) -> &ConfigIdentityStore {
        &self.store
    }

    pub fn active(&self) -> &ActiveIdentityManager {
        &self.active
    }

    pub fn list(&self) -> Result<Vec<Identity>, IdentityError> {
        self.store.list()
    }

    pub fn resolve(&self, identifier: &str) -> Result<Identity, IdentityError> {
        IdentityResolver::new(&self.store).resolve(identifier)
    }

    /// Resolve `identifier` and make it the active identity at `scope`.
    #[instrument(skip(self))]
    pub fn switch_to(&self, identifier: &str, scope: Scope) -> Result<Identity, IdentityError> {
        let identity = self.resolve(identifier)?;
        self.active
            .set_active(scope, &identity.name, &identity.email)?;
        info!(email = %identity.email, "switched identity");
        Ok(identity)
    }

    /// Add to the catalog unless the email is already stored, then make it
    /// the repository's identity.
    #[instrument(skip(self))]
    pub fn add_local(&self, name: &str, email: &str, nickname: &str) -> Result<(), IdentityError> {
        if !self.active.is_in_project_context() {
            return Err(IdentityError::ScopeUnavailable {
                scope: Scope::Local,
            });
        }
        if !self.store.exists(email)? {
            self.store.add(name, email, nickname)?;
        }
        self.active.set_active(Scope::Local, name, email)
    }

    /// Resolve and delete.
    pub fn delete(&self, identifier: &str) -> Result<Identity, IdentityError> {
        let identity = self.resolve(identifier)?;
        self.store.delete(&identity.email)?;
        Ok(identity)
    }

    /// Resolve and set a nickname.
    pub fn set_nickname(&self, identifier: &str, nickname: &str) -> Result<Identity, IdentityError> {
        let identity = self.resolve(identifier)?;
        self.store.set_nickname(&identity.email, nickname)?;
        Ok(Identity {
            nickname: nickname.to_string(),
            ..identity
        })
    }

    /// Resolve and replace fields; `None` keeps the current value.
    pub fn edit(
        &self,
        identifier: &str,
        name: Option<&str>,
        email: Option<&str>,
        nickname: Option<&str>,
    ) -> Result<(Identity, Identity), IdentityError> {
        let old = self.resolve(identifier)?;
        let new = Identity::new(
            name.unwrap_or(&old.name),
            email.unwrap_or(&old.email),
            nickname.unwrap_or(&old.nickname),
        );
        self.store
            .update(&old.email, &new.name, &new.email, &new.nickname)?;
        Ok((old, new))
    }

    /// Catalog nickname for an active identity's email, empty if none.
    pub fn nickname_for(&self, email: &str) -> Result<String, IdentityError> {
        self.store.get_nickname(email)
    }

    pub fn state(&self) -> IdentityState {
        self.active.state()
    }
}
