//! Audit trail vocabulary.
//!
//! Audit rows are written in the same transaction as the change they record,
//! so an entry exists if and only if the change committed.

/// Known action names for audit log entries.
pub mod action_types {
    pub const LOGIN: &str = "login";
    pub const LOGIN_LOCKED: &str = "login_locked";
    pub const PROJECT_CREATE: &str = "project_create";
    pub const PROJECT_APPROVE: &str = "project_approve";
    pub const PROJECT_REJECT: &str = "project_reject";
    pub const PROJECT_COMPLETE: &str = "project_complete";
    pub const PROJECT_DELETE: &str = "project_delete";
    pub const PROFESSOR_ASSIGN: &str = "professor_assign";
    pub const COUNCIL_CREATE: &str = "council_create";
    pub const COUNCIL_ASSIGN: &str = "council_assign";
    pub const COUNCIL_MEMBER_ADD: &str = "council_member_add";
    pub const SCORE_SUBMIT: &str = "score_submit";
    pub const COMMENT_ADD: &str = "comment_add";
    pub const PROGRESS_UPDATE: &str = "progress_update";
    pub const MESSAGE_SEND: &str = "message_send";
    pub const USER_REGISTER: &str = "user_register";
    pub const USER_CREATE: &str = "user_create";
    pub const USER_UPDATE: &str = "user_update";
    pub const USER_DELETE: &str = "user_delete";
    pub const PASSWORD_RESET: &str = "password_reset";
    pub const CONFIG_CHANGE: &str = "config_change";

    pub const ALL: &[&str] = &[
        LOGIN,
        LOGIN_LOCKED,
        PROJECT_CREATE,
        PROJECT_APPROVE,
        PROJECT_REJECT,
        PROJECT_COMPLETE,
        PROJECT_DELETE,
        PROFESSOR_ASSIGN,
        COUNCIL_CREATE,
        COUNCIL_ASSIGN,
        COUNCIL_MEMBER_ADD,
        SCORE_SUBMIT,
        COMMENT_ADD,
        PROGRESS_UPDATE,
        MESSAGE_SEND,
        USER_REGISTER,
        USER_CREATE,
        USER_UPDATE,
        USER_DELETE,
        PASSWORD_RESET,
        CONFIG_CHANGE,
    ];
}

/// Entity names recorded alongside an action.
pub mod entities {
    pub const PROJECT: &str = "project";
    pub const COUNCIL: &str = "council";
    pub const COUNCIL_MEMBER: &str = "council_member";
    pub const SCORE: &str = "score";
    pub const MESSAGE: &str = "message";
    pub const USER: &str = "user";
    pub const SYSTEM_CONFIG: &str = "system_config";
}

/// Returns `true` if `action` is a known action name.
pub fn is_known_action(action: &str) -> bool {
    action_types::ALL.contains(&action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_actions() {
        assert!(is_known_action(action_types::SCORE_SUBMIT));
        assert!(is_known_action("login"));
        assert!(!is_known_action("job_submit"));
    }
}
