//! Status transitions driven by people: approval, rejection, and council
//! assignment.
//!
//! Each planner takes a snapshot of the project as it stands under the row
//! lock, checks who is asking and whether the move is legal, and returns the
//! new status together with the notifications to send once the change has
//! committed. Completion is driven by scores and lives in
//! [`scoring`](crate::scoring).

use serde::Serialize;

use crate::actor::ActorContext;
use crate::error::CoreError;
use crate::notification::{self, NotificationDraft};
use crate::project::validate_comment;
use crate::roles::{ROLE_ADMIN, ROLE_PROFESSOR};
use crate::status::ProjectStatus;
use crate::types::{DbId, Timestamp};

/// The fields of a project that lifecycle rules look at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSnapshot {
    pub id: DbId,
    pub title: String,
    pub student_id: DbId,
    pub professor_id: Option<DbId>,
    pub status: ProjectStatus,
    pub council_id: Option<DbId>,
}

/// Result of a successful plan: the status to write and who to tell.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub status: ProjectStatus,
    pub notifications: Vec<NotificationDraft>,
}

/// The council a project is being assigned to.
#[derive(Debug, Clone, Copy)]
pub struct CouncilTarget<'a> {
    pub id: DbId,
    pub name: &'a str,
}

/// Fail with [`CoreError::Conflict`] unless `from → to` is in the lifecycle.
pub fn ensure_transition(from: ProjectStatus, to: ProjectStatus) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Cannot move a project from '{from}' to '{to}'"
        )))
    }
}

/// The actor must be the professor assigned to supervise the project.
pub fn ensure_supervisor(project: &ProjectSnapshot, actor: &ActorContext) -> Result<(), CoreError> {
    actor.require_role(ROLE_PROFESSOR, "review projects")?;
    if project.professor_id != Some(actor.user_id) {
        return Err(CoreError::Unauthorized(format!(
            "You are not the supervising professor of project {}",
            project.id
        )));
    }
    Ok(())
}

/// Pending → Approved, by the supervising professor.
pub fn plan_approval(
    project: &ProjectSnapshot,
    actor: &ActorContext,
) -> Result<Transition, CoreError> {
    ensure_supervisor(project, actor)?;
    ensure_transition(project.status, ProjectStatus::Approved)?;

    Ok(Transition {
        status: ProjectStatus::Approved,
        notifications: vec![notification::project_approved(
            project.student_id,
            project.id,
            &project.title,
        )],
    })
}

/// Pending → Rejected, by the supervising professor, with a reason.
pub fn plan_rejection(
    project: &ProjectSnapshot,
    actor: &ActorContext,
    reason: &str,
) -> Result<Transition, CoreError> {
    ensure_supervisor(project, actor)?;
    validate_comment(reason, "Rejection reason")?;
    ensure_transition(project.status, ProjectStatus::Rejected)?;

    Ok(Transition {
        status: ProjectStatus::Rejected,
        notifications: vec![notification::project_rejected(
            project.student_id,
            project.id,
            &project.title,
            reason.trim(),
        )],
    })
}

/// Approved/InProgress → InProgress, by an admin.
///
/// Re-assigning an in-progress project overwrites its council and defense
/// date and notifies everybody again.
pub fn plan_council_assignment(
    project: &ProjectSnapshot,
    actor: &ActorContext,
    council: CouncilTarget<'_>,
    defense_date: Timestamp,
) -> Result<Transition, CoreError> {
    actor.require_role(ROLE_ADMIN, "assign councils")?;
    ensure_transition(project.status, ProjectStatus::InProgress)?;

    let mut notifications = Vec::with_capacity(2);
    if let Some(professor_id) = project.professor_id {
        notifications.push(notification::defense_scheduled(
            professor_id,
            project.id,
            &project.title,
            council.name,
            defense_date,
        ));
    }
    notifications.push(notification::defense_scheduled(
        project.student_id,
        project.id,
        &project.title,
        council.name,
        defense_date,
    ));

    Ok(Transition {
        status: ProjectStatus::InProgress,
        notifications,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const STUDENT: DbId = 100;
    const PROFESSOR: DbId = 200;

    fn project(status: ProjectStatus) -> ProjectSnapshot {
        ProjectSnapshot {
            id: 1,
            title: "Distributed cache".into(),
            student_id: STUDENT,
            professor_id: Some(PROFESSOR),
            status,
            council_id: None,
        }
    }

    fn professor(id: DbId) -> ActorContext {
        ActorContext::new(id, ROLE_PROFESSOR)
    }

    fn admin() -> ActorContext {
        ActorContext::new(1, ROLE_ADMIN)
    }

    fn defense() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2026, 6, 15, 8, 30, 0).unwrap()
    }

    #[test]
    fn supervisor_approves_pending_project() {
        let plan = plan_approval(&project(ProjectStatus::Pending), &professor(PROFESSOR)).unwrap();
        assert_eq!(plan.status, ProjectStatus::Approved);
        assert_eq!(plan.notifications.len(), 1);
        assert_eq!(plan.notifications[0].recipient_id, STUDENT);
    }

    #[test]
    fn other_professor_cannot_approve() {
        let err = plan_approval(&project(ProjectStatus::Pending), &professor(201)).unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    #[test]
    fn unsupervised_project_cannot_be_approved() {
        let mut p = project(ProjectStatus::Pending);
        p.professor_id = None;
        assert!(matches!(
            plan_approval(&p, &professor(PROFESSOR)),
            Err(CoreError::Unauthorized(_))
        ));
    }

    #[test]
    fn student_cannot_approve() {
        let err = plan_approval(
            &project(ProjectStatus::Pending),
            &ActorContext::new(STUDENT, "student"),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn approving_twice_is_a_conflict() {
        let err =
            plan_approval(&project(ProjectStatus::Approved), &professor(PROFESSOR)).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn rejection_requires_reason() {
        let err = plan_rejection(&project(ProjectStatus::Pending), &professor(PROFESSOR), "  ")
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn rejection_only_from_pending() {
        for status in [
            ProjectStatus::Approved,
            ProjectStatus::InProgress,
            ProjectStatus::Completed,
            ProjectStatus::Rejected,
        ] {
            let err = plan_rejection(&project(status), &professor(PROFESSOR), "incomplete")
                .unwrap_err();
            assert!(matches!(err, CoreError::Conflict(_)), "from {status}");
        }
        let plan =
            plan_rejection(&project(ProjectStatus::Pending), &professor(PROFESSOR), "incomplete")
                .unwrap();
        assert_eq!(plan.status, ProjectStatus::Rejected);
    }

    #[test]
    fn council_assignment_notifies_professor_and_student() {
        let council = CouncilTarget { id: 9, name: "Council A" };
        let plan = plan_council_assignment(
            &project(ProjectStatus::Approved),
            &admin(),
            council,
            defense(),
        )
        .unwrap();
        assert_eq!(plan.status, ProjectStatus::InProgress);
        let recipients: Vec<_> = plan.notifications.iter().map(|n| n.recipient_id).collect();
        assert_eq!(recipients, vec![PROFESSOR, STUDENT]);
        assert!(plan.notifications[1].message.contains("2026-06-15 08:30 UTC"));
    }

    #[test]
    fn council_reassignment_allowed_while_in_progress() {
        let council = CouncilTarget { id: 9, name: "Council B" };
        assert!(plan_council_assignment(
            &project(ProjectStatus::InProgress),
            &admin(),
            council,
            defense()
        )
        .is_ok());
    }

    #[test]
    fn council_assignment_guarded_by_status() {
        let council = CouncilTarget { id: 9, name: "Council A" };
        for status in [
            ProjectStatus::Pending,
            ProjectStatus::Completed,
            ProjectStatus::Rejected,
        ] {
            let err =
                plan_council_assignment(&project(status), &admin(), council, defense()).unwrap_err();
            assert!(matches!(err, CoreError::Conflict(_)), "from {status}");
        }
    }

    #[test]
    fn only_admin_assigns_councils() {
        let council = CouncilTarget { id: 9, name: "Council A" };
        let err = plan_council_assignment(
            &project(ProjectStatus::Approved),
            &professor(PROFESSOR),
            council,
            defense(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }
}
