//! Shared data types for identities and active-identity state.

use std::fmt;

use serde::Serialize;

/// A stored identity. `email` is the primary key; `nickname` is empty when
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub nickname: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            nickname: nickname.into(),
        }
    }

    pub fn has_nickname(&self) -> bool {
        !self.nickname.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_nickname() {
            write!(f, "{} ({} <{}>)", self.nickname, self.name, self.email)
        } else {
            write!(f, "{} <{}>", self.name, self.email)
        }
    }
}

/// The `user.name` / `user.email` pair git will use for commits at one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveIdentity {
    pub name: String,
    pub email: String,
}

impl ActiveIdentity {
    /// Attach a catalog nickname for display.
    pub fn with_nickname(&self, nickname: impl Into<String>) -> Identity {
        Identity::new(self.name.clone(), self.email.clone(), nickname)
    }
}

impl From<&Identity> for ActiveIdentity {
    fn from(identity: &Identity) -> Self {
        Self {
            name: identity.name.clone(),
            email: identity.email.clone(),
        }
    }
}

impl fmt::Display for ActiveIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Which identity git will use from the current directory.
///
/// Recomputed on demand; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IdentityState {
    NoIdentityConfigured,
    GlobalOnly {
        global: ActiveIdentity,
    },
    LocalOverrideActive {
        local: ActiveIdentity,
        global: Option<ActiveIdentity>,
    },
}

impl IdentityState {
    /// The identity commits made from here will carry, if any.
    pub fn effective(&self) -> Option<&ActiveIdentity> {
        match self {
            IdentityState::NoIdentityConfigured => None,
            IdentityState::GlobalOnly { global } => Some(global),
            IdentityState::LocalOverrideActive { local, .. } => Some(local),
        }
    }
}
