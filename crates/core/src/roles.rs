//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles_and_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PROFESSOR: &str = "professor";
pub const ROLE_STUDENT: &str = "student";

/// Every role a user account may hold.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_PROFESSOR, ROLE_STUDENT];

/// Returns `true` if `role` is one of [`ALL_ROLES`].
pub fn is_valid_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_seeded_roles_are_valid() {
        for role in ALL_ROLES {
            assert!(is_valid_role(role));
        }
        assert!(!is_valid_role("dean"));
        assert!(!is_valid_role("Admin"));
    }
}
