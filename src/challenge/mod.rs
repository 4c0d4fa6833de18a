//! Challenge authenticators.
//!
//! An authenticator publishes the proof material for one challenge type so
//! the remote validator can reach it. New challenge types plug in through
//! [`AuthenticatorRegistry`]; the engine core never needs to change.

use std::collections::HashMap;

use crate::{api, error::Result, key::AccountKey};

mod http01;

pub use self::http01::{HttpAuthenticator, CHALLENGE_PREFIX};

/// Capability contract for one challenge type.
pub trait Authenticator: Send + Sync {
    /// Publishes proof material reachable by the remote validator.
    ///
    /// Invoked once per challenge; must have no side effects beyond the
    /// publish. The returned handle owns the published artifact until
    /// cleanup.
    fn prepare(
        &self,
        account_key: &AccountKey,
        challenge: &api::Challenge,
        key_authorization: &str,
    ) -> Result<Box<dyn ProofHandle>>;
}

/// Owns one published proof artifact.
///
/// The artifact is exclusively this handle's for the duration of one
/// challenge and is released on every exit path, so stale proof data never
/// outlives the attempt.
pub trait ProofHandle: Send {
    /// Removes the published artifact.
    ///
    /// Called on success and on failure, possibly after a partial prepare.
    /// Implementations log failures instead of raising, so cleanup can
    /// never mask the primary result. Calling it twice is a no-op.
    fn cleanup(&mut self);
}

/// Guard that runs [`ProofHandle::cleanup`] when dropped.
pub(crate) struct CleanupGuard {
    handle: Box<dyn ProofHandle>,
}

impl CleanupGuard {
    pub(crate) fn new(handle: Box<dyn ProofHandle>) -> CleanupGuard {
        CleanupGuard { handle }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.handle.cleanup();
    }
}

/// Authenticators keyed by challenge type, e.g. `"http-01"`.
#[derive(Default)]
pub struct AuthenticatorRegistry {
    inner: HashMap<String, Box<dyn Authenticator>>,
}

impl AuthenticatorRegistry {
    pub fn new() -> AuthenticatorRegistry {
        AuthenticatorRegistry::default()
    }

    /// Registers an authenticator for a challenge type, replacing any
    /// previous one for that type.
    pub fn register(
        &mut self,
        challenge_type: impl Into<String>,
        authenticator: Box<dyn Authenticator>,
    ) {
        self.inner.insert(challenge_type.into(), authenticator);
    }

    pub fn supports(&self, challenge_type: &str) -> bool {
        self.inner.contains_key(challenge_type)
    }

    pub fn get(&self, challenge_type: &str) -> Option<&dyn Authenticator> {
        self.inner.get(challenge_type).map(Box::as_ref)
    }
}

impl std::fmt::Debug for AuthenticatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatorRegistry")
            .field("types", &self.inner.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{CountingAuthenticator, CountingState};

    #[test]
    fn test_registry_lookup() {
        let (authenticator, _state) = CountingAuthenticator::new();
        let mut registry = AuthenticatorRegistry::new();
        registry.register("http-01", Box::new(authenticator));

        assert!(registry.supports("http-01"));
        assert!(!registry.supports("dns-01"));
        assert!(registry.get("http-01").is_some());
    }

    #[test]
    fn test_cleanup_guard_runs_on_drop() {
        let (authenticator, state) = CountingAuthenticator::new();
        let handle = authenticator
            .prepare(
                &crate::test::test_account_key(),
                &api::Challenge::default(),
                "token.thumb",
            )
            .unwrap();

        {
            let _guard = CleanupGuard::new(handle);
            assert_eq!(CountingState::cleanups(&state), 0);
        }

        assert_eq!(CountingState::cleanups(&state), 1);
    }
}
