//! The identity every domain operation runs under.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::{ROLE_ADMIN, ROLE_PROFESSOR, ROLE_STUDENT};
use crate::types::DbId;

/// Who is performing an operation.
///
/// Built by the HTTP layer from a verified token and passed explicitly into
/// every lifecycle operation. The domain trusts it without re-checking
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: DbId,
    pub role: String,
}

impl ActorContext {
    pub fn new(user_id: DbId, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn is_professor(&self) -> bool {
        self.role == ROLE_PROFESSOR
    }

    pub fn is_student(&self) -> bool {
        self.role == ROLE_STUDENT
    }

    /// Fail with [`CoreError::Forbidden`] unless the actor holds `role`.
    ///
    /// `action` completes the sentence "Only <role> users may ...".
    pub fn require_role(&self, role: &str, action: &str) -> Result<(), CoreError> {
        if self.role == role {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Only {role} users may {action}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_predicates() {
        assert!(ActorContext::new(1, "admin").is_admin());
        assert!(ActorContext::new(1, "professor").is_professor());
        assert!(ActorContext::new(1, "student").is_student());
        assert!(!ActorContext::new(1, "student").is_admin());
    }

    #[test]
    fn require_role_rejects_other_roles() {
        let actor = ActorContext::new(7, "student");
        assert!(actor.require_role(ROLE_STUDENT, "submit projects").is_ok());

        let err = actor
            .require_role(ROLE_PROFESSOR, "approve projects")
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(msg) if msg.contains("approve projects")));
    }
}
