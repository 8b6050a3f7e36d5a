//! End-to-end identity flows against both backends.
//!
//! The git2 tests use a temporary global config file and a temporary
//! repository, so the user's real `~/.gitconfig` is never touched.

use std::path::Path;
use std::sync::Arc;

use git2::Repository;
use tempfile::TempDir;

use gitid_core::errors::IdentityError;
use gitid_core::{
    ActiveIdentity, ConfigBackend, GitConfigBackend, Identity, IdentityRepository,
    IdentityService, IdentityState, MemoryBackend, Scope,
};

// ===========================================================================
// Helpers
// ===========================================================================

/// Global config file plus a fresh repository inside `dir`.
fn git_backend_in_repo(dir: &TempDir) -> Arc<GitConfigBackend> {
    let repo_dir = dir.path().join("repo");
    Repository::init(&repo_dir).expect("init repo");
    Arc::new(GitConfigBackend::with_paths(
        dir.path().join("gitconfig"),
        &repo_dir,
    ))
}

fn git_backend_outside_repo(dir: &TempDir) -> Arc<GitConfigBackend> {
    let plain = dir.path().join("plain");
    std::fs::create_dir_all(&plain).unwrap();
    Arc::new(GitConfigBackend::with_paths(
        dir.path().join("gitconfig"),
        &plain,
    ))
}

fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn add_resolve_switch_global() {
    let service = IdentityService::new(Arc::new(MemoryBackend::new()));
    service
        .store()
        .add("John Doe", "john@example.com", "johnny")
        .unwrap();

    let identity = service.resolve("johnny").unwrap();
    service
        .active()
        .set_active(Scope::Global, &identity.name, &identity.email)
        .unwrap();

    assert_eq!(
        service.active().get_active(Scope::Global).unwrap(),
        ActiveIdentity {
            name: "John Doe".into(),
            email: "john@example.com".into(),
        }
    );
}

#[test]
fn local_override_leaves_global_alone() {
    let service = IdentityService::new(Arc::new(MemoryBackend::in_project()));
    service
        .active()
        .set_active(Scope::Global, "Global User", "global@example.com")
        .unwrap();

    assert!(!service.active().has_local_override());
    assert!(matches!(
        service.active().get_active(Scope::Local),
        Err(IdentityError::NoIdentityConfigured {
            scope: Scope::Local
        })
    ));

    service
        .active()
        .set_active(Scope::Local, "A", "a@b.com")
        .unwrap();
    assert!(service.active().has_local_override());
    assert_eq!(
        service.active().get_active(Scope::Global).unwrap().email,
        "global@example.com"
    );
}

#[test]
fn delete_then_list_and_nickname() {
    let service = IdentityService::new(Arc::new(MemoryBackend::new()));
    service
        .store()
        .add("John Doe", "john@example.com", "johnny")
        .unwrap();
    service.store().add("Ann", "ann@example.com", "").unwrap();

    service.store().delete("john@example.com").unwrap();

    let all = service.list().unwrap();
    assert!(all.iter().all(|i| i.email != "john@example.com"));
    assert_eq!(service.store().get_nickname("john@example.com").unwrap(), "");
    assert_eq!(all, vec![Identity::new("Ann", "ann@example.com", "")]);
}

// ===========================================================================
// git2 backend
// ===========================================================================

#[test]
fn git_backend_catalog_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let backend = git_backend_outside_repo(&dir);
    let service = IdentityService::new(backend.clone());

    service
        .store()
        .add("John Doe", "john@example.com", "johnny")
        .unwrap();
    service.store().add("Ann", "ann@example.com", "").unwrap();

    let contents = read_file(backend.global_write_target());
    assert!(contents.contains("john_at_example_dot_com"));

    let mut all = service.list().unwrap();
    all.sort_by(|a, b| a.email.cmp(&b.email));
    assert_eq!(
        all,
        vec![
            Identity::new("Ann", "ann@example.com", ""),
            Identity::new("John Doe", "john@example.com", "johnny"),
        ]
    );

    assert_eq!(service.resolve("johnny").unwrap().name, "John Doe");
    assert_eq!(service.resolve("ann@").unwrap().name, "Ann");

    service.store().delete("john@example.com").unwrap();
    assert_eq!(service.list().unwrap().len(), 1);
    assert!(matches!(
        service.store().delete("john@example.com"),
        Err(IdentityError::NotFound { .. })
    ));
}

#[test]
fn git_backend_local_scope() {
    let dir = tempfile::tempdir().unwrap();
    let backend = git_backend_in_repo(&dir);
    let service = IdentityService::new(backend.clone());

    service.store().add("Work", "me@work.com", "work").unwrap();
    service.store().add("Home", "me@home.org", "home").unwrap();
    service.switch_to("home", Scope::Global).unwrap();

    assert!(backend.is_in_project_context());
    assert!(!service.active().has_local_override());
    assert!(matches!(
        service.state(),
        IdentityState::GlobalOnly { .. }
    ));

    service.switch_to("work", Scope::Local).unwrap();
    assert!(service.active().has_local_override());
    assert_eq!(
        service.state().effective().map(|a| a.email.clone()).as_deref(),
        Some("me@work.com")
    );
    assert_eq!(
        service.active().get_active(Scope::Global).unwrap().email,
        "me@home.org"
    );

    let local_config = read_file(&dir.path().join("repo").join(".git").join("config"));
    assert!(local_config.contains("me@work.com"));

    service.active().clear_local_override().unwrap();
    assert!(!service.active().has_local_override());
    service.active().clear_local_override().unwrap();
}

#[test]
fn git_backend_local_outside_repository() {
    let dir = tempfile::tempdir().unwrap();
    let service = IdentityService::new(git_backend_outside_repo(&dir));

    assert!(!service.active().is_in_project_context());
    assert!(!service.active().has_local_override());
    assert!(matches!(
        service.active().set_active(Scope::Local, "A", "a@b.com"),
        Err(IdentityError::ScopeUnavailable { .. })
    ));
}

#[test]
fn git_backend_partial_local_is_not_an_override() {
    let dir = tempfile::tempdir().unwrap();
    let backend = git_backend_in_repo(&dir);
    let service = IdentityService::new(backend.clone());

    backend.set(Scope::Local, "user.name", "Only Name").unwrap();
    backend
        .set(Scope::Global, "user.email", "global@example.com")
        .unwrap();
    assert!(!service.active().has_local_override());
}

#[test]
fn git_backend_reads_and_writes_xdg_global_config() {
    let dir = tempfile::tempdir().unwrap();
    let gitconfig = dir.path().join(".gitconfig");
    let xdg = dir.path().join(".config").join("git").join("config");
    std::fs::create_dir_all(xdg.parent().unwrap()).unwrap();
    std::fs::write(&xdg, "[user]\n\tname = X\n\temail = x@y.z\n").unwrap();

    let backend = Arc::new(GitConfigBackend::with_global_files(
        &gitconfig,
        Some(&xdg),
        dir.path(),
    ));
    let service = IdentityService::new(backend);

    assert_eq!(
        service.state(),
        IdentityState::GlobalOnly {
            global: ActiveIdentity {
                name: "X".into(),
                email: "x@y.z".into(),
            }
        }
    );

    service.store().add("Work", "me@work.com", "work").unwrap();
    service.switch_to("work", Scope::Global).unwrap();

    assert!(!gitconfig.exists());
    let contents = read_file(&xdg);
    assert!(contents.contains("me_at_work_dot_com"));
    assert_eq!(
        service.active().get_active(Scope::Global).unwrap().email,
        "me@work.com"
    );
}
