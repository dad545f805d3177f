//! Authorization guard and session handling.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use vitrine_common::{AppError, AppResult};
use vitrine_store::{GalleryStore, IdentityProvider, Principal, Role};

/// Transient binding of a principal to a role.
///
/// Created on successful login, destroyed on logout. Its absence implies
/// [`Role::Guest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Principal the session was established for.
    pub principal: Principal,
    /// Role at the last probe.
    pub role: Role,
}

/// Authentication state machine.
///
/// `Unauthenticated -> Authenticating -> Authenticated`, back to
/// `Unauthenticated` on logout or login failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No session.
    Unauthenticated,
    /// Login in flight.
    Authenticating,
    /// Session established.
    Authenticated(Session),
}

/// Gates every mutating operation on the caller's role.
///
/// The guard holds the session explicitly; role state is never read from
/// ambient globals. Role derivation always queries the store, and any
/// probe failure degrades to Guest (fail-closed) — the only error this
/// subsystem swallows.
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn GalleryStore>,
    state: RwLock<AuthState>,
}

impl AuthService {
    /// Create a guard over the given identity provider and store.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn GalleryStore>) -> Self {
        Self {
            identity,
            store,
            state: RwLock::new(AuthState::Unauthenticated),
        }
    }

    /// Current state of the authentication machine.
    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// Principal of the active session, if any.
    pub async fn principal(&self) -> Option<Principal> {
        match &*self.state.read().await {
            AuthState::Authenticated(session) => Some(session.principal.clone()),
            AuthState::Unauthenticated | AuthState::Authenticating => None,
        }
    }

    /// Establish a session.
    ///
    /// If the identity provider reports a stale session
    /// (`AlreadyAuthenticated`), the guard clears it and retries exactly
    /// once before surfacing the failure.
    pub async fn login(&self) -> AppResult<Session> {
        *self.state.write().await = AuthState::Authenticating;

        let principal = match self.identity.login().await {
            Ok(principal) => principal,
            Err(AppError::AlreadyAuthenticated) => {
                debug!("stale provider session; clearing and retrying login once");
                self.identity.logout();
                match self.identity.login().await {
                    Ok(principal) => principal,
                    Err(err) => {
                        *self.state.write().await = AuthState::Unauthenticated;
                        return Err(err);
                    }
                }
            }
            Err(err) => {
                *self.state.write().await = AuthState::Unauthenticated;
                return Err(err);
            }
        };

        let role = self.probe_role(&principal).await;
        let session = Session { principal, role };
        *self.state.write().await = AuthState::Authenticated(session.clone());
        Ok(session)
    }

    /// Destroy the session. No remote call is involved; the caller
    /// observes the cleared state immediately.
    pub async fn logout(&self) {
        self.identity.logout();
        *self.state.write().await = AuthState::Unauthenticated;
    }

    /// Role of the caller, derived by querying the store with the active
    /// session's principal. Guest when no session exists or the probe
    /// fails.
    pub async fn current_role(&self) -> Role {
        let Some(principal) = self.principal().await else {
            return Role::Guest;
        };
        let role = self.probe_role(&principal).await;
        // Keep the displayed session role in step with the latest probe.
        let mut state = self.state.write().await;
        if let AuthState::Authenticated(session) = &mut *state {
            session.role = role;
        }
        role
    }

    /// Refuse unless the caller holds the Admin role; returns the
    /// caller's principal for the store call that follows. The store
    /// re-checks authoritatively either way.
    pub async fn require_admin(&self) -> AppResult<Principal> {
        let Some(principal) = self.principal().await else {
            return Err(AppError::AuthenticationRequired);
        };
        match self.probe_role(&principal).await {
            Role::Admin => Ok(principal),
            Role::User | Role::Guest => Err(AppError::AuthorizationDenied(
                "admin role required".to_string(),
            )),
        }
    }

    async fn probe_role(&self, principal: &Principal) -> Role {
        match self.store.current_role(Some(principal)).await {
            Ok(role) => role,
            Err(err) => {
                warn!(error = %err, "role probe failed; defaulting to guest");
                Role::Guest
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use vitrine_store::{LocalIdentity, MemoryStore};

    fn guard_with_admin(principal: &str) -> AuthService {
        let store = Arc::new(MemoryStore::with_admin(Principal::from(principal)));
        let identity = Arc::new(LocalIdentity::with_principal(Principal::from(principal)));
        AuthService::new(identity, store)
    }

    #[tokio::test]
    async fn test_login_establishes_admin_session() {
        let guard = guard_with_admin("alice");
        assert_eq!(guard.state().await, AuthState::Unauthenticated);

        let session = guard.login().await.unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(guard.current_role().await, Role::Admin);

        guard.logout().await;
        assert_eq!(guard.state().await, AuthState::Unauthenticated);
        assert_eq!(guard.current_role().await, Role::Guest);
    }

    #[tokio::test]
    async fn test_login_recovers_from_stale_provider_session() {
        let store = Arc::new(MemoryStore::with_admin(Principal::from("alice")));
        let identity = Arc::new(LocalIdentity::with_principal(Principal::from("alice")));
        // Occupy the provider directly so the guard sees a stale session.
        identity.login().await.unwrap();

        let guard = AuthService::new(identity, store);
        let session = guard.login().await.unwrap();
        assert_eq!(session.principal, Principal::from("alice"));
    }

    #[tokio::test]
    async fn test_require_admin_without_session() {
        let guard = guard_with_admin("alice");
        let err = guard.require_admin().await.unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn test_require_admin_denies_plain_user() {
        let store = Arc::new(MemoryStore::with_admin(Principal::from("alice")));
        let identity = Arc::new(LocalIdentity::with_principal(Principal::from("bob")));
        let guard = AuthService::new(identity, store);

        guard.login().await.unwrap();
        let err = guard.require_admin().await.unwrap_err();
        assert!(matches!(err, AppError::AuthorizationDenied(_)));
    }
}
