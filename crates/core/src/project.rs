//! Project creation, supervision, and visibility rules.

use crate::actor::ActorContext;
use crate::error::CoreError;
use crate::lifecycle::{ensure_supervisor, ProjectSnapshot};
use crate::notification::{self, NotificationDraft};
use crate::roles::{ROLE_ADMIN, ROLE_STUDENT};
use crate::status::ProjectStatus;
use crate::types::DbId;

pub const MAX_TITLE_LENGTH: usize = 500;
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Academic years accepted for a project.
pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

/// Semester numbers: two regular terms plus a summer term.
pub const MIN_SEMESTER: i16 = 1;
pub const MAX_SEMESTER: i16 = 3;

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Project title is required".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Project title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Project description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate free text written by a professor (comments, rejection reasons).
///
/// `field` names the text in the error message.
pub fn validate_comment(text: &str, field: &str) -> Result<(), CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_academic_term(year: i32, semester: i16) -> Result<(), CoreError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(CoreError::Validation(format!(
            "Year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
        )));
    }
    if !(MIN_SEMESTER..=MAX_SEMESTER).contains(&semester) {
        return Err(CoreError::Validation(format!(
            "Semester must be between {MIN_SEMESTER} and {MAX_SEMESTER}, got {semester}"
        )));
    }
    Ok(())
}

/// Notifications for a freshly inserted project: its supervisor, if one was
/// chosen, is told there is something to review.
pub fn submission_notifications(
    project_id: DbId,
    title: &str,
    professor_id: Option<DbId>,
) -> Vec<NotificationDraft> {
    professor_id
        .map(|id| notification::project_submitted(id, project_id, title))
        .into_iter()
        .collect()
}

/// Only students submit projects, always on their own behalf.
pub fn ensure_can_submit(actor: &ActorContext) -> Result<(), CoreError> {
    actor.require_role(ROLE_STUDENT, "submit projects")
}

/// A supervisor comment. Allowed in every status, including after a
/// rejection or a graded defense.
pub fn plan_comment(
    project: &ProjectSnapshot,
    actor: &ActorContext,
    text: &str,
) -> Result<NotificationDraft, CoreError> {
    ensure_supervisor(project, actor)?;
    validate_comment(text, "Comment")?;
    Ok(notification::comment_added(
        project.student_id,
        project.id,
        &project.title,
    ))
}

/// Admin sets (or replaces) the supervising professor of a non-terminal
/// project.
pub fn plan_professor_assignment(
    project: &ProjectSnapshot,
    actor: &ActorContext,
    professor_id: DbId,
) -> Result<Vec<NotificationDraft>, CoreError> {
    actor.require_role(ROLE_ADMIN, "assign supervisors")?;
    if project.status.is_terminal() {
        return Err(CoreError::Conflict(format!(
            "Project {} is {} and can no longer change supervisor",
            project.id, project.status
        )));
    }
    Ok(vec![
        notification::supervisor_assigned(professor_id, project.id, &project.title),
        notification::supervisor_changed(project.student_id, project.id, &project.title),
    ])
}

/// The owning student withdraws a project that has not been taken up yet:
/// only Pending and Rejected projects may be deleted. A Pending project's
/// supervisor is told it is gone.
pub fn plan_deletion(
    project: &ProjectSnapshot,
    actor: &ActorContext,
) -> Result<Vec<NotificationDraft>, CoreError> {
    actor.require_role(ROLE_STUDENT, "delete projects")?;
    if project.student_id != actor.user_id {
        return Err(CoreError::Unauthorized(format!(
            "Project {} is not yours",
            project.id
        )));
    }
    match project.status {
        ProjectStatus::Pending => Ok(project
            .professor_id
            .map(|id| notification::project_withdrawn(id, &project.title))
            .into_iter()
            .collect()),
        ProjectStatus::Rejected => Ok(Vec::new()),
        other => Err(CoreError::Conflict(format!(
            "Project {} is {other}; only pending or rejected projects can be deleted",
            project.id
        ))),
    }
}

/// Whether `actor` may read a project.
///
/// `sits_on_council` tells whether the actor holds a seat on the project's
/// council; the caller looks that up.
pub fn can_view(project: &ProjectSnapshot, actor: &ActorContext, sits_on_council: bool) -> bool {
    actor.role == ROLE_ADMIN
        || project.student_id == actor.user_id
        || project.professor_id == Some(actor.user_id)
        || sits_on_council
}
