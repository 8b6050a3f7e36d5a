//! [`ConfigBackend`] on real git configuration files via `git2`.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use git2::{Config, ConfigLevel, ErrorCode, Repository};
use tracing::{debug, info, instrument, warn};

use super::{ConfigBackend, Scope};
use crate::errors::BackendError;

/// Git configuration backend.
///
/// Global scope follows `git config --global`: both `~/.gitconfig` and the
/// XDG file (`$XDG_CONFIG_HOME/git/config`) are read, with `~/.gitconfig`
/// taking precedence. Writes go to `~/.gitconfig` when it exists, otherwise
/// to the XDG file when that exists, otherwise a new `~/.gitconfig`.
///
/// Local scope is the `.git/config` of the repository discovered from
/// `workdir`. Files are reopened on every call so changes made by other
/// processes are always observed.
#[derive(Debug, Clone)]
pub struct GitConfigBackend {
    gitconfig: PathBuf,
    xdg_config: Option<PathBuf>,
    workdir: PathBuf,
}

impl GitConfigBackend {
    /// Backend on the user's global git config, with the current directory as
    /// the starting point for repository discovery.
    pub fn discover() -> Result<Self, BackendError> {
        let workdir = std::env::current_dir()?;
        let home = dirs::home_dir().ok_or_else(|| {
            BackendError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot determine home directory for global git config",
            ))
        })?;
        let (gitconfig, xdg_config) =
            global_files(&home, std::env::var_os("XDG_CONFIG_HOME"));
        Ok(Self::with_global_files(gitconfig, Some(xdg_config), workdir))
    }

    /// Backend on a single explicit global config file and working directory.
    pub fn with_paths<G: AsRef<Path>, W: AsRef<Path>>(global_path: G, workdir: W) -> Self {
        Self::with_global_files(global_path.as_ref(), None::<PathBuf>, workdir)
    }

    /// Backend on an explicit `~/.gitconfig`-style file, an optional XDG
    /// config file, and a working directory.
    pub fn with_global_files<G, X, W>(gitconfig: G, xdg_config: Option<X>, workdir: W) -> Self
    where
        G: AsRef<Path>,
        X: AsRef<Path>,
        W: AsRef<Path>,
    {
        let backend = Self {
            gitconfig: gitconfig.as_ref().to_path_buf(),
            xdg_config: xdg_config.map(|p| p.as_ref().to_path_buf()),
            workdir: workdir.as_ref().to_path_buf(),
        };
        info!(
            global = %backend.gitconfig.display(),
            xdg = ?backend.xdg_config,
            "using git config backend"
        );
        backend
    }

    /// The file global-scope writes currently go to.
    pub fn global_write_target(&self) -> &Path {
        match &self.xdg_config {
            Some(xdg) if !self.gitconfig.exists() && xdg.exists() => xdg.as_path(),
            _ => self.gitconfig.as_path(),
        }
    }

    /// Every existing global file, layered at git's own levels.
    fn open_global_for_read(&self) -> Result<Config, BackendError> {
        let mut config = Config::new()?;
        if let Some(xdg) = self.xdg_config.as_ref().filter(|p| p.exists()) {
            config.add_file(xdg, ConfigLevel::XDG, false)?;
        }
        if self.gitconfig.exists() {
            config.add_file(&self.gitconfig, ConfigLevel::Global, false)?;
        }
        Ok(config)
    }

    fn open(&self, scope: Scope, write: bool) -> Result<Config, BackendError> {
        match scope {
            Scope::Global if write => Ok(Config::open(self.global_write_target())?),
            Scope::Global => self.open_global_for_read(),
            Scope::Local => {
                let repo = self.repository().ok_or_else(|| BackendError::ScopeUnavailable {
                    scope,
                    detail: format!("'{}' is not inside a git working tree", self.workdir.display()),
                })?;
                Ok(repo.config()?.open_level(ConfigLevel::Local)?)
            }
        }
    }

    fn repository(&self) -> Option<Repository> {
        Repository::discover(&self.workdir)
            .ok()
            .filter(|repo| !repo.is_bare())
    }
}

impl ConfigBackend for GitConfigBackend {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, BackendError> {
        let config = self.open(scope, false)?;
        match config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value))]
    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), BackendError> {
        let mut config = self.open(scope, true)?;
        config.set_str(key, value)?;
        debug!("config value written");
        Ok(())
    }

    #[instrument(skip(self))]
    fn unset(&self, scope: Scope, key: &str) -> Result<(), BackendError> {
        let mut config = self.open(scope, true)?;
        match config.remove(key) {
            Ok(()) => {
                debug!("config value removed");
                Ok(())
            }
            Err(e) if e.code() == ErrorCode::NotFound => Err(BackendError::KeyNotFound {
                scope,
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn entries(&self, scope: Scope, pattern: &str) -> Result<Vec<(String, String)>, BackendError> {
        let config = self.open(scope, false)?;
        let mut entries = config.entries(Some(pattern))?;
        let mut found = Vec::new();
        while let Some(entry) = entries.next() {
            let entry = entry?;
            match (entry.name(), entry.value()) {
                (Some(name), Some(value)) => found.push((name.to_string(), value.to_string())),
                _ => warn!(
                    key = %String::from_utf8_lossy(entry.name_bytes()),
                    "skipping config entry that is not valid UTF-8"
                ),
            }
        }
        drop(entries);

        // A key set in both global files is reported once, with the value that wins.
        let mut seen = HashSet::new();
        found.retain(|(name, _)| seen.insert(name.clone()));
        for (name, value) in &mut found {
            if let Ok(winner) = config.get_string(name) {
                *value = winner;
            }
        }
        debug!(%scope, pattern, count = found.len(), "enumerated config entries");
        Ok(found)
    }

    fn is_in_project_context(&self) -> bool {
        self.repository().is_some()
    }
}

/// `~/.gitconfig` and the XDG git config file under `home`. An unset or
/// empty `XDG_CONFIG_HOME` means `~/.config`.
fn global_files(home: &Path, xdg_config_home: Option<OsString>) -> (PathBuf, PathBuf) {
    let xdg_home = xdg_config_home
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(".config"));
    (home.join(".gitconfig"), xdg_home.join("git").join("config"))
}
