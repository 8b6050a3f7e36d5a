//! In-process [`ConfigBackend`] with git-like semantics.

use std::sync::{Mutex, MutexGuard, PoisonError};

use regex_lite::Regex;
use tracing::debug;

use super::{ConfigBackend, Scope};
use crate::errors::BackendError;

#[derive(Debug, Default)]
struct State {
    global: Vec<(String, String)>,
    local: Vec<(String, String)>,
    in_project: bool,
    /// Writes to keys matching this pattern fail.
    fail_writes: Option<Regex>,
    /// Reads of keys matching this pattern fail.
    fail_reads: Option<Regex>,
}

impl State {
    fn scope(&mut self, scope: Scope) -> Result<&mut Vec<(String, String)>, BackendError> {
        match scope {
            Scope::Global => Ok(&mut self.global),
            Scope::Local if self.in_project => Ok(&mut self.local),
            Scope::Local => Err(BackendError::ScopeUnavailable {
                scope,
                detail: "not inside a git working tree".into(),
            }),
        }
    }

    fn check_write(&self, key: &str) -> Result<(), BackendError> {
        refuse(&self.fail_writes, "write to", key)
    }

    fn check_read(&self, key: &str) -> Result<(), BackendError> {
        refuse(&self.fail_reads, "read of", key)
    }
}

fn refuse(fault: &Option<Regex>, action: &str, key: &str) -> Result<(), BackendError> {
    match fault {
        Some(re) if re.is_match(key) => Err(BackendError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("{} '{}' refused", action, key),
        ))),
        _ => Ok(()),
    }
}

fn compile_fault(pattern: Option<&str>) -> Result<Option<Regex>, BackendError> {
    pattern
        .map(|p| Regex::new(p).map_err(|_| BackendError::InvalidKey(p.to_string())))
        .transpose()
}

/// Config store held entirely in memory.
///
/// Keys keep insertion order, so enumeration behaves like a config file that
/// is only ever appended to. Local scope is available only after
/// [`MemoryBackend::in_project`] or [`MemoryBackend::set_in_project`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    /// Backend outside any project: local scope is unavailable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that behaves as if run inside a git working tree.
    pub fn in_project() -> Self {
        let backend = Self::new();
        backend.set_in_project(true);
        backend
    }

    pub fn set_in_project(&self, in_project: bool) {
        self.lock().in_project = in_project;
    }

    /// Make every `set`/`unset` on a key matching `pattern` fail with an I/O
    /// error. `None` clears the fault.
    pub fn fail_writes_matching(&self, pattern: Option<&str>) -> Result<(), BackendError> {
        self.lock().fail_writes = compile_fault(pattern)?;
        Ok(())
    }

    /// Make `get` on a key matching `pattern` fail, and `entries` fail when it
    /// would return such a key. `None` clears the fault.
    pub fn fail_reads_matching(&self, pattern: Option<&str>) -> Result<(), BackendError> {
        self.lock().fail_reads = compile_fault(pattern)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConfigBackend for MemoryBackend {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, BackendError> {
        let mut state = self.lock();
        state.check_read(key)?;
        let entries = state.scope(scope)?;
        Ok(entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.check_write(key)?;
        let entries = state.scope(scope)?;
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
        debug!(%scope, key, "memory config set");
        Ok(())
    }

    fn unset(&self, scope: Scope, key: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.check_write(key)?;
        let entries = state.scope(scope)?;
        let before = entries.len();
        entries.retain(|(k, _)| k != key);
        if entries.len() == before {
            return Err(BackendError::KeyNotFound {
                scope,
                key: key.to_string(),
            });
        }
        Ok(())
    }

    fn entries(&self, scope: Scope, pattern: &str) -> Result<Vec<(String, String)>, BackendError> {
        let re = Regex::new(pattern).map_err(|_| BackendError::InvalidKey(pattern.to_string()))?;
        let mut state = self.lock();
        let found: Vec<(String, String)> = state
            .scope(scope)?
            .iter()
            .filter(|(k, _)| re.is_match(k))
            .cloned()
            .collect();
        for (key, _) in &found {
            state.check_read(key)?;
        }
        Ok(found)
    }

    fn is_in_project_context(&self) -> bool {
        self.lock().in_project
    }
}
