//! Student progress reports.

use crate::actor::ActorContext;
use crate::error::CoreError;
use crate::lifecycle::ProjectSnapshot;
use crate::notification::{self, NotificationDraft};
use crate::project::{validate_title, MAX_DESCRIPTION_LENGTH};
use crate::roles::ROLE_STUDENT;

pub const MIN_PERCENTAGE: i32 = 0;
pub const MAX_PERCENTAGE: i32 = 100;

/// Percentage must be in range and strictly above the last reported value.
/// A project with no report yet starts from 0%, so the first report must be
/// at least 1%.
pub fn validate_percentage(latest: Option<i32>, percentage: i32) -> Result<(), CoreError> {
    if !(MIN_PERCENTAGE..=MAX_PERCENTAGE).contains(&percentage) {
        return Err(CoreError::Validation(format!(
            "Progress must be between {MIN_PERCENTAGE} and {MAX_PERCENTAGE}%, got {percentage}%"
        )));
    }
    let baseline = latest.unwrap_or(MIN_PERCENTAGE);
    if percentage <= baseline {
        return Err(CoreError::Validation(format!(
            "Progress must increase: current progress is {baseline}%, got {percentage}%"
        )));
    }
    Ok(())
}

/// Plan a progress report by the project's own student.
///
/// Returns the notification for the supervisor, if the project has one.
pub fn plan_progress_report(
    project: &ProjectSnapshot,
    actor: &ActorContext,
    title: &str,
    description: &str,
    latest: Option<i32>,
    percentage: i32,
) -> Result<Option<NotificationDraft>, CoreError> {
    actor.require_role(ROLE_STUDENT, "report progress")?;
    if project.student_id != actor.user_id {
        return Err(CoreError::Unauthorized(format!(
            "Project {} is not yours",
            project.id
        )));
    }
    if project.status.is_terminal() {
        return Err(CoreError::Conflict(format!(
            "Project {} is {} and no longer accepts progress reports",
            project.id, project.status
        )));
    }
    validate_title(title)?;
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Progress description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    validate_percentage(latest, percentage)?;

    Ok(project.professor_id.map(|professor_id| {
        notification::progress_reported(professor_id, project.id, &project.title, percentage)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ProjectStatus;

    fn project(status: ProjectStatus) -> ProjectSnapshot {
        ProjectSnapshot {
            id: 3,
            title: "Sensor mesh".into(),
            student_id: 8,
            professor_id: Some(9),
            status,
            council_id: None,
        }
    }

    #[test]
    fn percentage_bounds_and_monotonicity() {
        assert!(validate_percentage(None, 1).is_ok());
        assert!(validate_percentage(None, 100).is_ok());
        assert!(validate_percentage(None, 101).is_err());
        assert!(validate_percentage(None, -1).is_err());
        assert!(validate_percentage(Some(40), 41).is_ok());
        assert!(validate_percentage(Some(40), 40).is_err());
        assert!(validate_percentage(Some(40), 20).is_err());
    }

    #[test]
    fn first_report_must_exceed_zero() {
        assert!(matches!(
            validate_percentage(None, 0),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            validate_percentage(Some(100), 100),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn owner_reports_and_supervisor_is_told() {
        let actor = ActorContext::new(8, ROLE_STUDENT);
        let draft = plan_progress_report(
            &project(ProjectStatus::Approved),
            &actor,
            "Prototype",
            "",
            Some(10),
            35,
        )
        .unwrap()
        .unwrap();
        assert_eq!(draft.recipient_id, 9);
        assert!(draft.message.contains("35%"));
    }

    #[test]
    fn other_student_refused() {
        let actor = ActorContext::new(99, ROLE_STUDENT);
        assert!(matches!(
            plan_progress_report(&project(ProjectStatus::Approved), &actor, "x", "", None, 5),
            Err(CoreError::Unauthorized(_))
        ));
    }

    #[test]
    fn closed_project_refused() {
        let actor = ActorContext::new(8, ROLE_STUDENT);
        assert!(matches!(
            plan_progress_report(&project(ProjectStatus::Rejected), &actor, "x", "", None, 5),
            Err(CoreError::Conflict(_))
        ));
    }
}
