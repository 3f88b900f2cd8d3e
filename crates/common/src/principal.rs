//! # Principals
//!
//! A principal is an authenticated identity making a request against the
//! vault: the owner behind a validated API key.
//!
//! Roles are enforced server-side on every operation. Anything a caller
//! asserts about its own role is ignored; the role comes from the key
//! registry at validation time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The access level of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access: may delete any file, list all files, and issue or
    /// revoke keys on behalf of other owners.
    Admin,

    /// Access to the principal's own files and keys only.
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated identity on the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// The owner identity this principal acts as.
    pub id: Uuid,
    /// The principal's access level.
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this principal may manage (delete, revoke) a resource owned
    /// by `owner_id`.
    pub fn can_manage(&self, owner_id: &Uuid) -> bool {
        self.is_admin() || self.id == *owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_roundtrip() {
        assert_eq!(Role::parse(Role::Admin.as_str()), Role::Admin);
        assert_eq!(Role::parse(Role::User.as_str()), Role::User);
        // unknown strings never grant elevated access
        assert_eq!(Role::parse("superuser"), Role::User);
    }

    #[test]
    fn test_can_manage() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let user = Principal {
            id: owner,
            role: Role::User,
        };
        assert!(user.can_manage(&owner));
        assert!(!user.can_manage(&other));

        let admin = Principal {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(admin.can_manage(&owner));
        assert!(admin.can_manage(&other));
    }
}
