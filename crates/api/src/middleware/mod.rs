//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireProfessor`] -- Requires the `professor` role.
//! - [`rbac::RequireStudent`] -- Requires the `student` role.

pub mod auth;
pub mod rbac;
