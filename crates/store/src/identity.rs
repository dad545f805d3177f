//! Identity provider contract.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use vitrine_common::{AppError, AppResult, IdGenerator};

use crate::Principal;

/// External authentication collaborator.
///
/// Yields an opaque [`Principal`] on login. The provider keeps its own
/// session state: logging in while a provider session exists fails with
/// `AlreadyAuthenticated`, recoverable by clearing and retrying.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate and obtain a principal. Suspends until a principal is
    /// obtained or authentication fails.
    async fn login(&self) -> AppResult<Principal>;

    /// Clear the provider session. Synchronous from the caller's view.
    fn logout(&self);
}

/// Identity provider that mints opaque local principals.
///
/// Suitable for embedded deployments and tests; a hosted deployment
/// substitutes its own provider behind the same trait.
pub struct LocalIdentity {
    current: Mutex<Option<Principal>>,
    fixed: Option<Principal>,
    id_gen: IdGenerator,
}

impl LocalIdentity {
    /// Provider that mints a fresh principal per login.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            fixed: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Provider that always authenticates as `principal`.
    #[must_use]
    pub fn with_principal(principal: Principal) -> Self {
        Self {
            current: Mutex::new(None),
            fixed: Some(principal),
            id_gen: IdGenerator::new(),
        }
    }
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn login(&self) -> AppResult<Principal> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| AppError::Internal("identity provider state poisoned".to_string()))?;
        if current.is_some() {
            return Err(AppError::AlreadyAuthenticated);
        }

        let principal = self
            .fixed
            .clone()
            .unwrap_or_else(|| Principal::new(self.id_gen.generate_token()));
        debug!(principal = %principal, "local identity issued principal");
        *current = Some(principal.clone());
        Ok(principal)
    }

    fn logout(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_login_fails_until_cleared() {
        let identity = LocalIdentity::new();
        identity.login().await.unwrap();

        let err = identity.login().await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyAuthenticated));

        identity.logout();
        identity.login().await.unwrap();
    }

    #[tokio::test]
    async fn test_fixed_principal_is_stable() {
        let identity = LocalIdentity::with_principal(Principal::from("alice"));
        let first = identity.login().await.unwrap();
        identity.logout();
        let second = identity.login().await.unwrap();
        assert_eq!(first, second);
    }
}
