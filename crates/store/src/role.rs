//! Roles, principals, and user profiles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization level of a caller.
///
/// Exactly one role is derived per active session; callers without a
/// session are [`Role::Guest`]. Only [`Role::Admin`] may mutate the
/// gallery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Unauthenticated or unknown caller; read-only.
    #[default]
    Guest,
    /// Authenticated caller without management rights; read-only.
    User,
    /// The single privileged role.
    Admin,
}

impl Role {
    /// Returns whether this role may mutate the gallery.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => write!(f, "guest"),
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Opaque caller identity issued by the identity provider.
///
/// The subsystem never inspects the token; it only forwards it to the
/// store, which derives the caller's role from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Wrap an opaque identity token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Display profile attached to a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_role_is_guest() {
        assert_eq!(Role::default(), Role::Guest);
        assert!(!Role::Guest.is_admin());
        assert!(!Role::User.is_admin());
        assert!(Role::Admin.is_admin());
    }
}
