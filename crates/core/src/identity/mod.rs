//! Identity catalog and identifier resolution.
//!
//! Identities are stored in the global git config under `identity.<section>`
//! where `<section>` is the encoded email (see [`codec`]). The resolver maps a
//! nickname, email, or name (exact or partial) to one stored identity.

pub mod codec;
pub mod resolver;
pub mod store;

pub use codec::encode_email;
pub use resolver::{IdentityResolver, MatchTier};
pub use store::{ConfigIdentityStore, IdentityRepository};
