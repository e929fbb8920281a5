//! Notification drafts produced by lifecycle operations.
//!
//! A draft is what a committed change wants to tell somebody. The
//! persistence layer publishes drafts on the event bus only after its
//! transaction commits; a background task stores them in `notifications`.

use serde::{Deserialize, Serialize};

use crate::council::CouncilRole;
use crate::types::{DbId, Timestamp};

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Success,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "info" => Some(Severity::Info),
            "warning" => Some(Severity::Warning),
            "success" => Some(Severity::Success),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

/// A notification waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub recipient_id: DbId,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub link: Option<String>,
}

impl NotificationDraft {
    pub fn new(
        recipient_id: DbId,
        title: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            recipient_id,
            title: title.into(),
            message: message.into(),
            severity,
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Front-end route for a project detail page.
pub fn project_link(project_id: DbId) -> String {
    format!("/projects/{project_id}")
}

/// Front-end route for a council detail page.
pub fn council_link(council_id: DbId) -> String {
    format!("/councils/{council_id}")
}

/// Front-end route for the message inbox.
pub fn messages_link() -> String {
    "/messages".to_string()
}

fn format_date(at: Timestamp) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

// ---------------------------------------------------------------------------
// Wording
// ---------------------------------------------------------------------------

pub fn project_submitted(professor_id: DbId, project_id: DbId, title: &str) -> NotificationDraft {
    NotificationDraft::new(
        professor_id,
        "New project submitted",
        format!("A student submitted the project '{title}' for your review."),
        Severity::Info,
    )
    .with_link(project_link(project_id))
}

pub fn project_approved(student_id: DbId, project_id: DbId, title: &str) -> NotificationDraft {
    NotificationDraft::new(
        student_id,
        "Project approved",
        format!("Your project '{title}' has been approved."),
        Severity::Success,
    )
    .with_link(project_link(project_id))
}

pub fn project_rejected(
    student_id: DbId,
    project_id: DbId,
    title: &str,
    reason: &str,
) -> NotificationDraft {
    NotificationDraft::new(
        student_id,
        "Project rejected",
        format!("Your project '{title}' was rejected. Reason: {reason}"),
        Severity::Error,
    )
    .with_link(project_link(project_id))
}

pub fn defense_scheduled(
    recipient_id: DbId,
    project_id: DbId,
    title: &str,
    council_name: &str,
    defense_date: Timestamp,
) -> NotificationDraft {
    NotificationDraft::new(
        recipient_id,
        "Defense scheduled",
        format!(
            "The project '{title}' will be defended before council '{council_name}' on {}.",
            format_date(defense_date)
        ),
        Severity::Info,
    )
    .with_link(project_link(project_id))
}

pub fn council_seat_assigned(
    professor_id: DbId,
    council_id: DbId,
    council_name: &str,
    role: CouncilRole,
    defense_date: Timestamp,
) -> NotificationDraft {
    NotificationDraft::new(
        professor_id,
        "Council assignment",
        format!(
            "You were appointed {} of council '{council_name}' (defense on {}).",
            role.label(),
            format_date(defense_date)
        ),
        Severity::Info,
    )
    .with_link(council_link(council_id))
}

pub fn supervisor_assigned(professor_id: DbId, project_id: DbId, title: &str) -> NotificationDraft {
    NotificationDraft::new(
        professor_id,
        "New supervision",
        format!("You were assigned to supervise the project '{title}'."),
        Severity::Info,
    )
    .with_link(project_link(project_id))
}

pub fn supervisor_changed(student_id: DbId, project_id: DbId, title: &str) -> NotificationDraft {
    NotificationDraft::new(
        student_id,
        "Supervisor assigned",
        format!("A supervisor was assigned to your project '{title}'."),
        Severity::Info,
    )
    .with_link(project_link(project_id))
}

pub fn comment_added(student_id: DbId, project_id: DbId, title: &str) -> NotificationDraft {
    NotificationDraft::new(
        student_id,
        "New comment",
        format!("Your supervisor commented on the project '{title}'."),
        Severity::Info,
    )
    .with_link(project_link(project_id))
}

pub fn progress_reported(
    professor_id: DbId,
    project_id: DbId,
    title: &str,
    percentage: i32,
) -> NotificationDraft {
    NotificationDraft::new(
        professor_id,
        "Progress update",
        format!("The project '{title}' reported {percentage}% progress."),
        Severity::Info,
    )
    .with_link(project_link(project_id))
}

pub fn project_withdrawn(professor_id: DbId, title: &str) -> NotificationDraft {
    NotificationDraft::new(
        professor_id,
        "Project withdrawn",
        format!("The student withdrew the project '{title}'."),
        Severity::Warning,
    )
}

pub fn message_received(receiver_id: DbId) -> NotificationDraft {
    NotificationDraft::new(
        receiver_id,
        "New message",
        "You have a new message.",
        Severity::Info,
    )
    .with_link(messages_link())
}

pub fn project_completed(
    student_id: DbId,
    project_id: DbId,
    title: &str,
    final_score: f64,
) -> NotificationDraft {
    NotificationDraft::new(
        student_id,
        "Defense completed",
        format!("Your project '{title}' has been graded. Final score: {final_score:.2}"),
        Severity::Success,
    )
    .with_link(project_link(project_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_names_round_trip() {
        for s in [
            Severity::Info,
            Severity::Warning,
            Severity::Success,
            Severity::Error,
        ] {
            assert_eq!(Severity::parse(s.as_str()), Some(s));
        }
        assert_eq!(Severity::parse("critical"), None);
    }

    #[test]
    fn completion_message_formats_two_decimals() {
        let draft = project_completed(3, 11, "Compiler in Rust", 8.0);
        assert_eq!(draft.recipient_id, 3);
        assert_eq!(draft.severity, Severity::Success);
        assert!(draft.message.ends_with("Final score: 8.00"));
        assert_eq!(draft.link.as_deref(), Some("/projects/11"));
    }

    #[test]
    fn rejection_carries_reason() {
        let draft = project_rejected(3, 11, "Chatbot", "scope too broad");
        assert_eq!(draft.severity, Severity::Error);
        assert!(draft.message.contains("scope too broad"));
    }
}
