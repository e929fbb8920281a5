//! Transactional lifecycle operations, plus direct messages, which share
//! the commit-then-notify shape.
//!
//! Every method follows the same shape: open a transaction, lock the rows
//! the change depends on, let `capstone_core` decide what may happen, write
//! the change and its audit entry, commit, and only then publish the
//! resulting [`PlatformEvent`] with the notifications it owes. A refused
//! change rolls back and publishes nothing.

use capstone_core::actor::ActorContext;
use capstone_core::audit::{action_types, entities};
use capstone_core::council::{self, SeatRequest};
use capstone_core::error::CoreError;
use capstone_core::lifecycle::{self, CouncilTarget};
use capstone_core::notification::{self, NotificationDraft};
use capstone_core::project as project_rules;
use capstone_core::roles::{ROLE_ADMIN, ROLE_PROFESSOR};
use capstone_core::types::{DbId, Timestamp};
use capstone_core::{message as message_rules, progress, scoring};
use capstone_events::{event_types, EventBus, PlatformEvent};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::{
    AuditLogRepo, CommentRepo, CouncilMemberRepo, CouncilRepo, MessageRepo, ProgressRepo,
    ProjectRepo, ScoreRepo, SystemConfigRepo, UserRepo,
};
use crate::error::LifecycleError;
use crate::models::audit::CreateAuditLog;
use crate::models::comment::ProfessorComment;
use crate::models::message::{Message, SendMessage};
use crate::models::council::{Council, CouncilMember, CouncilDetail, CreateCouncil};
use crate::models::progress::{CreateProgress, ProjectProgress};
use crate::models::project::{CreateProject, Project};
use crate::models::score::ScoreOutcome;

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// Constraint guarding one seat per professor per council.
const UQ_COUNCIL_MEMBER: &str = "uq_council_members_council_professor";

/// A student's project submission. Term and status are filled in by
/// [`LifecycleRepo::create_project`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub professor_id: Option<DbId>,
}

/// Entry point for every state-changing project, council and message
/// operation.
pub struct LifecycleRepo;

impl LifecycleRepo {
    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// A student submits a project. It starts `Pending` in the configured
    /// academic term.
    pub async fn create_project(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        input: &NewProject,
    ) -> Result<Project, LifecycleError> {
        project_rules::ensure_can_submit(actor)?;
        project_rules::validate_title(&input.title)?;
        project_rules::validate_description(&input.description)?;

        let term = SystemConfigRepo::academic_term(pool).await?;
        project_rules::validate_academic_term(term.year, term.semester)?;

        let mut tx = pool.begin().await?;
        if let Some(professor_id) = input.professor_id {
            require_active_professor(&mut tx, professor_id).await?;
        }

        let project = ProjectRepo::insert(
            &mut tx,
            &CreateProject {
                title: input.title.trim().to_string(),
                description: input.description.trim().to_string(),
                student_id: actor.user_id,
                professor_id: input.professor_id,
                year: term.year,
                semester: term.semester,
            },
        )
        .await?;

        audit(
            &mut tx,
            actor,
            action_types::PROJECT_CREATE,
            entities::PROJECT,
            project.id,
            Some(json!({ "year": term.year, "semester": term.semester })),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            project_id = project.id,
            student_id = actor.user_id,
            "Project submitted"
        );
        bus.publish(
            event(event_types::PROJECT_SUBMITTED, entities::PROJECT, project.id, actor)
                .with_notifications(project_rules::submission_notifications(
                    project.id,
                    &project.title,
                    project.professor_id,
                )),
        );
        Ok(project)
    }

    /// Pending → Approved by the supervising professor.
    pub async fn approve(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        project_id: DbId,
    ) -> Result<Project, LifecycleError> {
        let mut tx = pool.begin().await?;
        let current = lock_project(&mut tx, project_id).await?;
        let plan = lifecycle::plan_approval(&current.snapshot()?, actor)?;

        let project = ProjectRepo::mark_approved(&mut tx, project_id).await?;
        audit(
            &mut tx,
            actor,
            action_types::PROJECT_APPROVE,
            entities::PROJECT,
            project_id,
            None,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id, professor_id = actor.user_id, "Project approved");
        bus.publish(
            event(event_types::PROJECT_APPROVED, entities::PROJECT, project_id, actor)
                .with_payload(json!({ "status": plan.status }))
                .with_notifications(plan.notifications),
        );
        Ok(project)
    }

    /// Pending → Rejected by the supervising professor. The reason is kept
    /// on the project and sent to the student.
    pub async fn reject(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        project_id: DbId,
        reason: &str,
    ) -> Result<Project, LifecycleError> {
        let mut tx = pool.begin().await?;
        let current = lock_project(&mut tx, project_id).await?;
        let plan = lifecycle::plan_rejection(&current.snapshot()?, actor, reason)?;

        let project = ProjectRepo::mark_rejected(&mut tx, project_id, reason.trim()).await?;
        audit(
            &mut tx,
            actor,
            action_types::PROJECT_REJECT,
            entities::PROJECT,
            project_id,
            Some(json!({ "reason": reason.trim() })),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id, professor_id = actor.user_id, "Project rejected");
        bus.publish(
            event(event_types::PROJECT_REJECTED, entities::PROJECT, project_id, actor)
                .with_payload(json!({ "status": plan.status }))
                .with_notifications(plan.notifications),
        );
        Ok(project)
    }

    /// Admin points an Approved or InProgress project at a council.
    pub async fn assign_council(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        project_id: DbId,
        council_id: DbId,
        defense_date: Timestamp,
    ) -> Result<Project, LifecycleError> {
        actor.require_role(ROLE_ADMIN, "assign councils")?;

        let mut tx = pool.begin().await?;
        let council = CouncilRepo::lock_shared(&mut tx, council_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: entities::COUNCIL,
                id: council_id,
            })?;
        let (project, notifications) =
            assign_in_tx(&mut tx, actor, project_id, &council, defense_date).await?;
        tx.commit().await?;

        tracing::info!(project_id, council_id, "Project assigned to council");
        bus.publish(
            event(event_types::COUNCIL_ASSIGNED, entities::PROJECT, project_id, actor)
                .with_payload(json!({ "council_id": council_id, "defense_date": defense_date }))
                .with_notifications(notifications),
        );
        Ok(project)
    }

    /// Admin sets or replaces the supervising professor.
    pub async fn assign_professor(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        project_id: DbId,
        professor_id: DbId,
    ) -> Result<Project, LifecycleError> {
        let mut tx = pool.begin().await?;
        let current = lock_project(&mut tx, project_id).await?;
        let notifications =
            project_rules::plan_professor_assignment(&current.snapshot()?, actor, professor_id)?;
        require_active_professor(&mut tx, professor_id).await?;

        let project = ProjectRepo::set_professor(&mut tx, project_id, professor_id).await?;
        audit(
            &mut tx,
            actor,
            action_types::PROFESSOR_ASSIGN,
            entities::PROJECT,
            project_id,
            Some(json!({ "previous": current.professor_id, "professor_id": professor_id })),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id, professor_id, "Supervisor assigned");
        bus.publish(
            event(event_types::SUPERVISOR_ASSIGNED, entities::PROJECT, project_id, actor)
                .with_notifications(notifications),
        );
        Ok(project)
    }

    /// The supervising professor leaves a comment for the student. Comments
    /// live in `professor_comments` only; the project row keeps the
    /// rejection reason.
    pub async fn add_comment(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        project_id: DbId,
        text: &str,
    ) -> Result<ProfessorComment, LifecycleError> {
        let mut tx = pool.begin().await?;
        let current = lock_project(&mut tx, project_id).await?;
        let draft = project_rules::plan_comment(&current.snapshot()?, actor, text)?;

        let comment = CommentRepo::insert(&mut tx, project_id, actor.user_id, text.trim()).await?;
        audit(
            &mut tx,
            actor,
            action_types::COMMENT_ADD,
            entities::PROJECT,
            project_id,
            Some(json!({ "comment_id": comment.id })),
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(project_id, comment_id = comment.id, "Comment added");
        bus.publish(
            event(event_types::COMMENT_ADDED, entities::PROJECT, project_id, actor)
                .with_notifications([draft]),
        );
        Ok(comment)
    }

    /// The project's student reports progress. Percentages must strictly
    /// increase; the project row lock keeps concurrent reports ordered.
    pub async fn record_progress(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        project_id: DbId,
        input: &CreateProgress,
    ) -> Result<ProjectProgress, LifecycleError> {
        let mut tx = pool.begin().await?;
        let current = lock_project(&mut tx, project_id).await?;
        let latest = ProgressRepo::latest_percentage(&mut tx, project_id).await?;
        let draft = progress::plan_progress_report(
            &current.snapshot()?,
            actor,
            &input.title,
            &input.description,
            latest,
            input.percentage,
        )?;

        let report = ProgressRepo::insert(
            &mut tx,
            project_id,
            input.title.trim(),
            input.description.trim(),
            input.percentage,
            actor.user_id,
        )
        .await?;
        audit(
            &mut tx,
            actor,
            action_types::PROGRESS_UPDATE,
            entities::PROJECT,
            project_id,
            Some(json!({ "percentage": input.percentage })),
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(project_id, percentage = input.percentage, "Progress recorded");
        bus.publish(
            event(event_types::PROGRESS_REPORTED, entities::PROJECT, project_id, actor)
                .with_payload(json!({ "percentage": input.percentage }))
                .with_notifications(draft),
        );
        Ok(report)
    }

    /// The owning student withdraws a Pending or Rejected project. Its
    /// progress log and comments are removed with it.
    pub async fn delete_project(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        project_id: DbId,
    ) -> Result<(), LifecycleError> {
        let mut tx = pool.begin().await?;
        let current = lock_project(&mut tx, project_id).await?;
        let snapshot = current.snapshot()?;
        let notifications = project_rules::plan_deletion(&snapshot, actor)?;

        ProjectRepo::delete(&mut tx, project_id).await?;
        audit(
            &mut tx,
            actor,
            action_types::PROJECT_DELETE,
            entities::PROJECT,
            project_id,
            Some(json!({ "title": current.title, "status": snapshot.status })),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(project_id, student_id = actor.user_id, "Project deleted");
        bus.publish(
            event(event_types::PROJECT_DELETED, entities::PROJECT, project_id, actor)
                .with_notifications(notifications),
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Councils
    // -----------------------------------------------------------------------

    /// Admin creates a council with its seats and, optionally, assigns
    /// projects to it for the council's defense date. All or nothing.
    pub async fn create_council(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        input: &CreateCouncil,
    ) -> Result<CouncilDetail, LifecycleError> {
        actor.require_role(ROLE_ADMIN, "create councils")?;
        council::validate_council_name(&input.name)?;
        council::validate_seats(&input.members)?;

        let mut tx = pool.begin().await?;
        let created = CouncilRepo::insert(
            &mut tx,
            input.name.trim(),
            input.defense_date,
            input.location.as_deref(),
            input.description.as_deref(),
        )
        .await?;

        let mut seat_notifications = Vec::with_capacity(input.members.len());
        for seat in &input.members {
            require_active_professor(&mut tx, seat.professor_id).await?;
            let member = insert_seat(&mut tx, created.id, seat).await?;
            seat_notifications.push(notification::council_seat_assigned(
                member.professor_id,
                created.id,
                &created.name,
                seat.role,
                created.defense_date,
            ));
        }
        audit(
            &mut tx,
            actor,
            action_types::COUNCIL_CREATE,
            entities::COUNCIL,
            created.id,
            Some(json!({ "members": input.members.len() })),
        )
        .await?;

        // Lock projects in id order so two councils claiming overlapping
        // projects cannot deadlock.
        let mut project_ids = input.project_ids.clone();
        project_ids.sort_unstable();
        project_ids.dedup();

        let mut assignments = Vec::with_capacity(project_ids.len());
        for project_id in project_ids {
            let (_, notifications) =
                assign_in_tx(&mut tx, actor, project_id, &created, created.defense_date).await?;
            assignments.push((project_id, notifications));
        }
        tx.commit().await?;

        tracing::info!(
            council_id = created.id,
            members = input.members.len(),
            projects = assignments.len(),
            "Council created"
        );
        bus.publish(
            event(event_types::COUNCIL_CREATED, entities::COUNCIL, created.id, actor)
                .with_notifications(seat_notifications),
        );
        for (project_id, notifications) in assignments {
            bus.publish(
                event(event_types::COUNCIL_ASSIGNED, entities::PROJECT, project_id, actor)
                    .with_payload(json!({
                        "council_id": created.id,
                        "defense_date": created.defense_date,
                    }))
                    .with_notifications(notifications),
            );
        }

        CouncilRepo::detail(pool, created.id)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!("Council {} vanished after commit", created.id)).into()
            })
    }

    /// Admin adds a seat to an existing council. Refused once any of the
    /// council's projects has been scored.
    pub async fn add_council_member(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        council_id: DbId,
        seat: &SeatRequest,
    ) -> Result<CouncilMember, LifecycleError> {
        actor.require_role(ROLE_ADMIN, "manage council members")?;

        let mut tx = pool.begin().await?;
        let target = CouncilRepo::lock(&mut tx, council_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: entities::COUNCIL,
                id: council_id,
            })?;
        let scores = CouncilMemberRepo::count_scores(&mut tx, council_id).await?;
        council::ensure_membership_open(council_id, scores)?;
        require_active_professor(&mut tx, seat.professor_id).await?;

        let member = insert_seat(&mut tx, council_id, seat).await?;
        audit(
            &mut tx,
            actor,
            action_types::COUNCIL_MEMBER_ADD,
            entities::COUNCIL_MEMBER,
            member.id,
            Some(json!({
                "council_id": council_id,
                "professor_id": seat.professor_id,
                "role": seat.role.as_str(),
            })),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(council_id, professor_id = seat.professor_id, "Council member added");
        bus.publish(
            event(event_types::COUNCIL_MEMBER_ADDED, entities::COUNCIL, council_id, actor)
                .with_notifications([notification::council_seat_assigned(
                    seat.professor_id,
                    council_id,
                    &target.name,
                    seat.role,
                    target.defense_date,
                )]),
        );
        Ok(member)
    }

    // -----------------------------------------------------------------------
    // Scoring
    // -----------------------------------------------------------------------

    /// A council member scores a project.
    ///
    /// The project row is locked for the whole upsert-and-recompute, so of
    /// several concurrent final scores exactly one observes the complete
    /// set and completes the project. The council is share-locked so its
    /// membership cannot change underneath.
    pub async fn submit_score(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        project_id: DbId,
        council_member_id: DbId,
        value: f64,
        comment: Option<&str>,
    ) -> Result<ScoreOutcome, LifecycleError> {
        // Cheap checks first so a bad value never opens a transaction.
        scoring::validate_score(value)?;
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        scoring::validate_score_comment(comment)?;

        let mut tx = pool.begin().await?;
        let current = lock_project(&mut tx, project_id).await?;
        let member = CouncilMemberRepo::find_in_tx(&mut tx, council_member_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: entities::COUNCIL_MEMBER,
                id: council_member_id,
            })?;
        CouncilRepo::lock_shared(&mut tx, member.council_id).await?;

        let member_ids = CouncilMemberRepo::member_ids(&mut tx, member.council_id).await?;
        let existing: Vec<_> = ScoreRepo::list_for_project_tx(&mut tx, project_id)
            .await?
            .iter()
            .map(|s| s.entry())
            .collect();

        let plan = scoring::plan_submission(
            &current.snapshot()?,
            &member.seat(),
            actor,
            value,
            comment,
            &member_ids,
            &existing,
        )?;

        let score = ScoreRepo::upsert(&mut tx, project_id, council_member_id, value, comment).await?;
        audit(
            &mut tx,
            actor,
            action_types::SCORE_SUBMIT,
            entities::SCORE,
            score.id,
            Some(json!({
                "project_id": project_id,
                "council_member_id": council_member_id,
                "value": value,
                "replaced": plan.replaces_existing,
            })),
        )
        .await?;

        let mut completion_notifications: Vec<NotificationDraft> = Vec::new();
        let final_score = match plan.completion {
            Some(completion) => {
                ProjectRepo::mark_completed(&mut tx, project_id, completion.final_score).await?;
                audit(
                    &mut tx,
                    actor,
                    action_types::PROJECT_COMPLETE,
                    entities::PROJECT,
                    project_id,
                    Some(json!({ "final_score": completion.final_score })),
                )
                .await?;
                completion_notifications = completion.notifications;
                Some(completion.final_score)
            }
            None => None,
        };
        tx.commit().await?;

        tracing::info!(
            project_id,
            council_member_id,
            value,
            replaced = plan.replaces_existing,
            "Score recorded"
        );
        bus.publish(
            event(event_types::SCORE_SUBMITTED, entities::PROJECT, project_id, actor)
                .with_payload(json!({ "council_member_id": council_member_id, "value": value })),
        );
        if let Some(final_score) = final_score {
            tracing::info!(project_id, final_score, "Project completed");
            bus.publish(
                event(event_types::PROJECT_COMPLETED, entities::PROJECT, project_id, actor)
                    .with_payload(json!({ "final_score": final_score }))
                    .with_notifications(completion_notifications),
            );
        }

        Ok(ScoreOutcome {
            score,
            completed: final_score.is_some(),
            final_score,
        })
    }

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    /// Send a direct message to another active user, who is notified.
    pub async fn send_message(
        pool: &PgPool,
        bus: &EventBus,
        actor: &ActorContext,
        input: &SendMessage,
    ) -> Result<Message, LifecycleError> {
        let draft = message_rules::plan_message(actor, input.receiver_id, &input.content)?;

        let mut tx = pool.begin().await?;
        if !UserRepo::is_active(&mut tx, input.receiver_id).await? {
            return Err(CoreError::NotFound {
                entity: entities::USER,
                id: input.receiver_id,
            }
            .into());
        }
        let message =
            MessageRepo::insert(&mut tx, actor.user_id, input.receiver_id, input.content.trim())
                .await?;
        audit(
            &mut tx,
            actor,
            action_types::MESSAGE_SEND,
            entities::MESSAGE,
            message.id,
            Some(json!({ "receiver_id": input.receiver_id })),
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(
            message_id = message.id,
            sender_id = actor.user_id,
            receiver_id = input.receiver_id,
            "Message sent"
        );
        bus.publish(
            event(event_types::MESSAGE_SENT, entities::MESSAGE, message.id, actor)
                .with_notifications([draft]),
        );
        Ok(message)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn lock_project(tx: &mut Tx<'_>, project_id: DbId) -> Result<Project, LifecycleError> {
    ProjectRepo::lock(tx, project_id).await?.ok_or_else(|| {
        CoreError::NotFound {
            entity: entities::PROJECT,
            id: project_id,
        }
        .into()
    })
}

async fn require_active_professor(tx: &mut Tx<'_>, user_id: DbId) -> Result<(), LifecycleError> {
    match UserRepo::find_active_with_role(tx, user_id, ROLE_PROFESSOR).await? {
        Some(_) => Ok(()),
        None => Err(CoreError::Validation(format!(
            "User {user_id} is not an active professor"
        ))
        .into()),
    }
}

/// Insert a seat, turning a duplicate professor into a conflict.
async fn insert_seat(
    tx: &mut Tx<'_>,
    council_id: DbId,
    seat: &SeatRequest,
) -> Result<CouncilMember, LifecycleError> {
    match CouncilMemberRepo::insert(tx, council_id, seat.professor_id, seat.role).await {
        Ok(member) => Ok(member),
        Err(sqlx::Error::Database(db_err)) if db_err.constraint() == Some(UQ_COUNCIL_MEMBER) => {
            Err(CoreError::Conflict(format!(
                "Professor {} already sits on council {council_id}",
                seat.professor_id
            ))
            .into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Lock, plan and write one council assignment inside `tx`.
async fn assign_in_tx(
    tx: &mut Tx<'_>,
    actor: &ActorContext,
    project_id: DbId,
    council: &Council,
    defense_date: Timestamp,
) -> Result<(Project, Vec<NotificationDraft>), LifecycleError> {
    let current = lock_project(tx, project_id).await?;
    let plan = lifecycle::plan_council_assignment(
        &current.snapshot()?,
        actor,
        CouncilTarget {
            id: council.id,
            name: &council.name,
        },
        defense_date,
    )?;

    let project = ProjectRepo::assign_council(tx, project_id, council.id, defense_date).await?;
    audit(
        tx,
        actor,
        action_types::COUNCIL_ASSIGN,
        entities::PROJECT,
        project_id,
        Some(json!({
            "council_id": council.id,
            "previous_council_id": current.council_id,
            "defense_date": defense_date,
        })),
    )
    .await?;
    Ok((project, plan.notifications))
}

async fn audit(
    tx: &mut Tx<'_>,
    actor: &ActorContext,
    action: &'static str,
    entity: &'static str,
    entity_id: DbId,
    details: Option<serde_json::Value>,
) -> Result<(), sqlx::Error> {
    let mut entry = CreateAuditLog::new(actor.user_id, action, entity, entity_id);
    if let Some(details) = details {
        entry = entry.with_details(details);
    }
    AuditLogRepo::insert(tx, &entry).await?;
    Ok(())
}

fn event(
    event_type: &str,
    entity: &'static str,
    entity_id: DbId,
    actor: &ActorContext,
) -> PlatformEvent {
    PlatformEvent::new(event_type)
        .with_source(entity, entity_id)
        .with_actor(actor.user_id)
}
