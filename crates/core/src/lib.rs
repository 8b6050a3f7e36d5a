//! gitid core library.
//!
//! Keeps a catalog of named git identities inside the global git config and
//! switches the active `user.name` / `user.email` at global or repository
//! scope: config backends, the identity store and resolver, the active
//! identity manager, and the tool's own settings.

pub mod active;
pub mod backend;
pub mod config;
pub mod errors;
pub mod identity;
pub mod models;
pub mod service;

// Re-exports for convenience.
pub use active::ActiveIdentityManager;
pub use backend::{ConfigBackend, GitConfigBackend, MemoryBackend, Scope};
pub use config::AppConfig;
pub use identity::{ConfigIdentityStore, IdentityRepository, IdentityResolver};
pub use models::{ActiveIdentity, Identity, IdentityState};
pub use service::IdentityService;
