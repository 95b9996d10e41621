use serde::{Deserialize, Serialize};

/// Admin role, stored as text in `admin_users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

/// The two authorization tiers used by the guards. Most write operations
/// take `AdminOrAbove`; user deletion takes `SuperAdminOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTier {
    AdminOrAbove,
    SuperAdminOnly,
}

impl RoleTier {
    pub fn allows(self, role: Role) -> bool {
        match self {
            RoleTier::AdminOrAbove => matches!(role, Role::Admin | Role::SuperAdmin),
            RoleTier::SuperAdminOnly => role == Role::SuperAdmin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_tier_allows_both_roles() {
        assert!(RoleTier::AdminOrAbove.allows(Role::Admin));
        assert!(RoleTier::AdminOrAbove.allows(Role::SuperAdmin));
    }

    #[test]
    fn super_admin_tier_rejects_plain_admin() {
        assert!(!RoleTier::SuperAdminOnly.allows(Role::Admin));
        assert!(RoleTier::SuperAdminOnly.allows(Role::SuperAdmin));
    }

    #[test]
    fn role_serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super_admin\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let parsed: Role = serde_json::from_str("\"super_admin\"").unwrap();
        assert_eq!(parsed, Role::SuperAdmin);
    }
}
