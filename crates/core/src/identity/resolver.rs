//! Free-form identifier resolution.
//!
//! Lookup order (first tier with a hit wins, ties go to catalog order):
//! 1. Exact nickname
//! 2. Exact email
//! 3. Exact name
//! 4. Identifier contained in email
//! 5. Identifier contained in name

use tracing::debug;

use super::store::IdentityRepository;
use crate::errors::IdentityError;
use crate::models::Identity;

/// Which rule produced a resolver match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Nickname,
    Email,
    Name,
    PartialEmail,
    PartialName,
}

impl MatchTier {
    pub const ORDER: [MatchTier; 5] = [
        MatchTier::Nickname,
        MatchTier::Email,
        MatchTier::Name,
        MatchTier::PartialEmail,
        MatchTier::PartialName,
    ];

    fn matches(self, identity: &Identity, identifier: &str) -> bool {
        match self {
            MatchTier::Nickname => identity.nickname == identifier,
            MatchTier::Email => identity.email == identifier,
            MatchTier::Name => identity.name == identifier,
            MatchTier::PartialEmail => identity.email.contains(identifier),
            MatchTier::PartialName => identity.name.contains(identifier),
        }
    }
}

/// Resolves identifiers against a freshly read catalog.
pub struct IdentityResolver<'a, R: IdentityRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: IdentityRepository + ?Sized> IdentityResolver<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Resolve `identifier` to exactly one stored identity.
    pub fn resolve(&self, identifier: &str) -> Result<Identity, IdentityError> {
        let identities = self.repo.list()?;
        match find_match(&identities, identifier) {
            Some((identity, tier)) => {
                debug!(identifier, ?tier, email = %identity.email, "identifier resolved");
                Ok(identity.clone())
            }
            None => Err(IdentityError::IdentityNotFound {
                identifier: identifier.to_string(),
            }),
        }
    }
}

/// Apply the tiers to an already loaded catalog.
pub fn find_match<'i>(identities: &'i [Identity], identifier: &str) -> Option<(&'i Identity, MatchTier)> {
    MatchTier::ORDER.iter().find_map(|&tier| {
        identities
            .iter()
            .find(|identity| tier.matches(identity, identifier))
            .map(|identity| (identity, tier))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::identity::store::ConfigIdentityStore;

    fn catalog(entries: &[(&str, &str, &str)]) -> ConfigIdentityStore {
        let store = ConfigIdentityStore::new(Arc::new(MemoryBackend::new()));
        for (name, email, nickname) in entries {
            store.add(name, email, nickname).unwrap();
        }
        store
    }

    #[test]
    fn test_nickname_beats_partial_email() {
        let store = catalog(&[("Bob", "a@x.com", "w"), ("Ann", "w@y.com", "")]);
        let found = IdentityResolver::new(&store).resolve("w").unwrap();
        assert_eq!(found.email, "a@x.com");
    }

    #[test]
    fn test_exact_email_beats_substring() {
        let store = catalog(&[("One", "xa@b.comy", ""), ("Two", "a@b.com", "")]);
        let found = IdentityResolver::new(&store).resolve("a@b.com").unwrap();
        assert_eq!(found.name, "Two");
    }

    #[test]
    fn test_exact_name_beats_partial_email() {
        let store = catalog(&[("X", "ann@corp.com", ""), ("ann", "other@corp.com", "")]);
        let found = IdentityResolver::new(&store).resolve("ann").unwrap();
        assert_eq!(found.email, "other@corp.com");
    }

    #[test]
    fn test_partial_email_beats_partial_name() {
        let store = catalog(&[("corp person", "p@home.com", ""), ("Q", "q@corp.com", "")]);
        let found = IdentityResolver::new(&store).resolve("corp").unwrap();
        assert_eq!(found.email, "q@corp.com");
    }

    #[test]
    fn test_partial_name() {
        let store = catalog(&[("John Doe", "jd@example.com", "")]);
        let found = IdentityResolver::new(&store).resolve("Doe").unwrap();
        assert_eq!(found.email, "jd@example.com");
    }

    #[test]
    fn test_first_match_wins_within_tier() {
        let store = catalog(&[
            ("Alpha", "alpha@work.com", "dup"),
            ("Beta", "beta@work.com", "dup"),
        ]);
        let found = IdentityResolver::new(&store).resolve("dup").unwrap();
        assert_eq!(found.name, "Alpha");

        // No preference for the tighter substring match.
        let found = IdentityResolver::new(&store).resolve("work").unwrap();
        assert_eq!(found.name, "Alpha");
    }

    #[test]
    fn test_not_found() {
        let store = catalog(&[("John Doe", "john@example.com", "johnny")]);
        let result = IdentityResolver::new(&store).resolve("zzz-nonexistent");
        assert!(matches!(
            result,
            Err(IdentityError::IdentityNotFound { ref identifier }) if identifier == "zzz-nonexistent"
        ));
    }

    #[test]
    fn test_empty_catalog() {
        let store = catalog(&[]);
        assert!(IdentityResolver::new(&store).resolve("anyone").is_err());
    }

    #[test]
    fn test_find_match_reports_tier() {
        let identities = vec![Identity::new("John Doe", "john@example.com", "johnny")];
        let cases = [
            ("johnny", MatchTier::Nickname),
            ("john@example.com", MatchTier::Email),
            ("John Doe", MatchTier::Name),
            ("example", MatchTier::PartialEmail),
            ("Doe", MatchTier::PartialName),
        ];
        for (identifier, tier) in cases {
            assert_eq!(find_match(&identities, identifier).map(|(_, t)| t), Some(tier));
        }
    }
}
