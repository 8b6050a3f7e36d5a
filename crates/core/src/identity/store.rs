//! Identity catalog persisted in global git config.
//!
//! Each identity lives in its own subsection:
//!
//! ```ini
//! [identity "john_at_example_dot_com"]
//!     name = John Doe
//!     email = john@example.com
//!     nickname = johnny
//! ```
//!
//! None of the multi-key writes are atomic. A failure part way through leaves
//! the keys already written in place and returns the error.

use std::sync::{Arc, OnceLock};

use regex_lite::Regex;
use tracing::{debug, info, instrument, warn};

use super::codec::encode_email;
use crate::backend::{ConfigBackend, Scope};
use crate::errors::{BackendError, IdentityError};
use crate::models::Identity;

/// Top-level config section holding the catalog.
pub const SECTION: &str = "identity";

/// Matches `identity.<section>.name` and captures `<section>`.
static NAME_KEY: OnceLock<Regex> = OnceLock::new();

fn name_key() -> &'static Regex {
    NAME_KEY.get_or_init(|| {
        Regex::new(r"^identity\.(.+)\.name$").expect("name key regex must compile")
    })
}

/// Typed access to the identity catalog.
pub trait IdentityRepository {
    /// Write name, email and (when non-empty) nickname for an identity.
    fn add(&self, name: &str, email: &str, nickname: &str) -> Result<(), IdentityError>;

    /// Remove an identity. Fails with [`IdentityError::NotFound`] if its name
    /// or email key is already gone.
    fn delete(&self, email: &str) -> Result<(), IdentityError>;

    /// Overwrite the nickname. Does not check that the identity exists.
    fn set_nickname(&self, email: &str, nickname: &str) -> Result<(), IdentityError>;

    /// Nickname for `email`, or an empty string when none is set.
    fn get_nickname(&self, email: &str) -> Result<String, IdentityError>;

    /// Every stored identity in backend enumeration order. Sections whose
    /// `name` is empty are skipped.
    fn list(&self) -> Result<Vec<Identity>, IdentityError>;

    /// Replace `old_email`'s record with a new one: delete, then add.
    fn update(
        &self,
        old_email: &str,
        new_name: &str,
        new_email: &str,
        new_nickname: &str,
    ) -> Result<(), IdentityError>;

    fn has_nickname(&self, email: &str) -> Result<bool, IdentityError> {
        Ok(!self.get_nickname(email)?.is_empty())
    }

    /// Nicknames, names and emails in catalog order, for shell completion.
    fn completion_candidates(&self) -> Result<Vec<String>, IdentityError> {
        let mut candidates = Vec::new();
        for identity in self.list()? {
            if identity.has_nickname() {
                candidates.push(identity.nickname);
            }
            candidates.push(identity.name);
            candidates.push(identity.email);
        }
        Ok(candidates)
    }
}

/// [`IdentityRepository`] on top of a [`ConfigBackend`]'s global scope.
#[derive(Clone)]
pub struct ConfigIdentityStore {
    backend: Arc<dyn ConfigBackend>,
}

impl ConfigIdentityStore {
    pub fn new(backend: Arc<dyn ConfigBackend>) -> Self {
        Self { backend }
    }

    /// Whether a record with this email has a `name` key.
    pub fn exists(&self, email: &str) -> Result<bool, IdentityError> {
        let key = field_key(email, "name");
        let value = self
            .backend
            .get(Scope::Global, &key)
            .map_err(|e| IdentityError::read(&key, e))?;
        Ok(value.is_some())
    }

    fn write(&self, email: &str, field: &str, value: &str) -> Result<(), IdentityError> {
        let key = field_key(email, field);
        self.backend
            .set(Scope::Global, &key, value)
            .map_err(|e| IdentityError::write(&key, e))
    }

    fn read_section(&self, section: &str, field: &str) -> Result<Option<String>, IdentityError> {
        let key = format!("{}.{}.{}", SECTION, section, field);
        self.backend
            .get(Scope::Global, &key)
            .map_err(|e| IdentityError::read(&key, e))
    }

    /// Unset a required field, mapping a missing key to `NotFound`.
    fn remove(&self, email: &str, field: &str) -> Result<(), IdentityError> {
        let key = field_key(email, field);
        match self.backend.unset(Scope::Global, &key) {
            Ok(()) => Ok(()),
            Err(BackendError::KeyNotFound { .. }) => Err(IdentityError::NotFound {
                email: email.to_string(),
            }),
            Err(e) => Err(IdentityError::write(&key, e)),
        }
    }
}

impl IdentityRepository for ConfigIdentityStore {
    #[instrument(skip(self))]
    fn add(&self, name: &str, email: &str, nickname: &str) -> Result<(), IdentityError> {
        self.write(email, "name", name)?;
        self.write(email, "email", email)?;
        if !nickname.is_empty() {
            self.write(email, "nickname", nickname)?;
        }
        info!("identity added");
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete(&self, email: &str) -> Result<(), IdentityError> {
        self.remove(email, "name")?;
        self.remove(email, "email")?;

        let key = field_key(email, "nickname");
        match self.backend.unset(Scope::Global, &key) {
            Ok(()) | Err(BackendError::KeyNotFound { .. }) => {}
            Err(e) => return Err(IdentityError::write(&key, e)),
        }
        info!("identity deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    fn set_nickname(&self, email: &str, nickname: &str) -> Result<(), IdentityError> {
        self.write(email, "nickname", nickname)
    }

    fn get_nickname(&self, email: &str) -> Result<String, IdentityError> {
        Ok(self
            .read_section(&encode_email(email), "nickname")?
            .unwrap_or_default())
    }

    fn list(&self) -> Result<Vec<Identity>, IdentityError> {
        let pattern = format!(r"^{}\.", SECTION);
        let entries = self
            .backend
            .entries(Scope::Global, &pattern)
            .map_err(|e| IdentityError::read(&pattern, e))?;

        let mut identities = Vec::new();
        for (key, name) in entries {
            let Some(section) = name_key().captures(&key).and_then(|c| c.get(1)) else {
                continue;
            };
            let section = section.as_str();
            if name.is_empty() {
                debug!(section, "skipping identity with empty name");
                continue;
            }
            let email = self.read_section(section, "email")?.unwrap_or_else(|| {
                warn!(section, "identity has a name but no email");
                String::new()
            });
            let nickname = self.read_section(section, "nickname")?.unwrap_or_default();
            identities.push(Identity {
                name,
                email,
                nickname,
            });
        }
        debug!(count = identities.len(), "listed identities");
        Ok(identities)
    }

    #[instrument(skip(self))]
    fn update(
        &self,
        old_email: &str,
        new_name: &str,
        new_email: &str,
        new_nickname: &str,
    ) -> Result<(), IdentityError> {
        self.delete(old_email)?;
        self.add(new_name, new_email, new_nickname)
    }
}

fn field_key(email: &str, field: &str) -> String {
    format!("{}.{}.{}", SECTION, encode_email(email), field)
}
