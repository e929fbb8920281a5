//! Defense scoring: validating a council member's score and deciding when a
//! project is complete.
//!
//! A project completes the moment every member of its council has scored
//! it. The final score is the plain mean of those scores, rounded to two
//! decimals. A council without members never completes a project.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::actor::ActorContext;
use crate::error::CoreError;
use crate::lifecycle::{ensure_transition, ProjectSnapshot};
use crate::notification::{self, NotificationDraft};
use crate::roles::ROLE_PROFESSOR;
use crate::status::ProjectStatus;
use crate::types::DbId;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Maximum length of the comment attached to a score.
pub const MAX_SCORE_COMMENT_LENGTH: usize = 2_000;

/// A council seat as seen by the scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub id: DbId,
    pub council_id: DbId,
    pub professor_id: DbId,
}

/// One recorded score, keyed by the seat that gave it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub council_member_id: DbId,
    pub value: f64,
}

/// What happens when a project's last outstanding score arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub final_score: f64,
    pub notifications: Vec<NotificationDraft>,
}

/// Outcome of planning a score submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePlan {
    /// `true` when the seat already had a score that will be overwritten.
    pub replaces_existing: bool,
    pub completion: Option<Completion>,
}

/// A score must be a finite number in `[MIN_SCORE, MAX_SCORE]`.
pub fn validate_score(value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(CoreError::Validation(format!(
            "Score must be between {MIN_SCORE} and {MAX_SCORE}, got {value}"
        )));
    }
    Ok(())
}

pub fn validate_score_comment(comment: Option<&str>) -> Result<(), CoreError> {
    if let Some(text) = comment {
        if text.chars().count() > MAX_SCORE_COMMENT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Score comment must be at most {MAX_SCORE_COMMENT_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Round to two decimals, half away from zero.
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The final score if every member has scored, `None` otherwise.
///
/// Only scores from seats in `member_ids` count; scores left behind by a
/// previous council are ignored.
pub fn evaluate_completion(member_ids: &[DbId], scores: &[ScoreEntry]) -> Option<f64> {
    if member_ids.is_empty() {
        return None;
    }

    let by_member: HashMap<DbId, f64> = scores
        .iter()
        .filter(|s| member_ids.contains(&s.council_member_id))
        .map(|s| (s.council_member_id, s.value))
        .collect();

    if by_member.len() != member_ids.len() {
        return None;
    }

    let total: f64 = by_member.values().sum();
    Some(round_score(total / by_member.len() as f64))
}

/// Check that `actor` may score `project` from `seat`.
pub fn authorize_submission(
    project: &ProjectSnapshot,
    seat: &Seat,
    actor: &ActorContext,
) -> Result<(), CoreError> {
    actor.require_role(ROLE_PROFESSOR, "submit scores")?;
    if seat.professor_id != actor.user_id {
        return Err(CoreError::Unauthorized(format!(
            "Council seat {} does not belong to you",
            seat.id
        )));
    }
    if project.council_id != Some(seat.council_id) {
        return Err(CoreError::Unauthorized(format!(
            "Council seat {} is not on the council evaluating project {}",
            seat.id, project.id
        )));
    }
    Ok(())
}

/// Plan a score submission against the project as it stands under lock.
///
/// `member_ids` are the seats of the project's current council and
/// `existing` the scores already stored for the project. The submission
/// replaces any earlier score from the same seat.
pub fn plan_submission(
    project: &ProjectSnapshot,
    seat: &Seat,
    actor: &ActorContext,
    value: f64,
    comment: Option<&str>,
    member_ids: &[DbId],
    existing: &[ScoreEntry],
) -> Result<ScorePlan, CoreError> {
    validate_score(value)?;
    validate_score_comment(comment)?;
    authorize_submission(project, seat, actor)?;

    match project.status {
        ProjectStatus::InProgress => {}
        ProjectStatus::Completed => {
            return Err(CoreError::Conflict(format!(
                "Project {} is already graded; scores can no longer change",
                project.id
            )))
        }
        other => {
            return Err(CoreError::Conflict(format!(
                "Project {} is '{other}' and is not open for scoring",
                project.id
            )))
        }
    }

    let replaces_existing = existing.iter().any(|s| s.council_member_id == seat.id);

    let mut merged: Vec<ScoreEntry> = existing
        .iter()
        .filter(|s| s.council_member_id != seat.id)
        .copied()
        .collect();
    merged.push(ScoreEntry {
        council_member_id: seat.id,
        value,
    });

    let completion = match evaluate_completion(member_ids, &merged) {
        Some(final_score) => {
            ensure_transition(project.status, ProjectStatus::Completed)?;
            Some(Completion {
                final_score,
                notifications: vec![notification::project_completed(
                    project.student_id,
                    project.id,
                    &project.title,
                    final_score,
                )],
            })
        }
        None => None,
    };

    Ok(ScorePlan {
        replaces_existing,
        completion,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const COUNCIL: DbId = 7;

    fn project() -> ProjectSnapshot {
        ProjectSnapshot {
            id: 1,
            title: "Search engine".into(),
            student_id: 100,
            professor_id: Some(200),
            status: ProjectStatus::InProgress,
            council_id: Some(COUNCIL),
        }
    }

    /// Seats 11, 12, 13 held by professors 201, 202, 203.
    fn seat(n: DbId) -> Seat {
        Seat {
            id: 10 + n,
            council_id: COUNCIL,
            professor_id: 200 + n,
        }
    }

    fn professor(n: DbId) -> ActorContext {
        ActorContext::new(200 + n, ROLE_PROFESSOR)
    }

    /// Feed submissions through the planner the way the transaction does,
    /// keeping the stored scores and status in memory.
    struct Board {
        project: ProjectSnapshot,
        members: Vec<DbId>,
        scores: Vec<ScoreEntry>,
        final_score: Option<f64>,
    }

    impl Board {
        fn new(members: Vec<DbId>) -> Self {
            Self {
                project: project(),
                members,
                scores: Vec::new(),
                final_score: None,
            }
        }

        fn submit(&mut self, n: DbId, value: f64) -> Result<ScorePlan, CoreError> {
            let seat = seat(n);
            let plan = plan_submission(
                &self.project,
                &seat,
                &professor(n),
                value,
                None,
                &self.members,
                &self.scores,
            )?;
            self.scores.retain(|s| s.council_member_id != seat.id);
            self.scores.push(ScoreEntry {
                council_member_id: seat.id,
                value,
            });
            if let Some(c) = &plan.completion {
                self.project.status = ProjectStatus::Completed;
                self.final_score = Some(c.final_score);
            }
            Ok(plan)
        }
    }

    #[test]
    fn score_bounds() {
        assert!(validate_score(0.0).is_ok());
        assert!(validate_score(10.0).is_ok());
        assert!(validate_score(7.25).is_ok());
        assert!(validate_score(-0.01).is_err());
        assert!(validate_score(10.5).is_err());
        assert!(validate_score(f64::NAN).is_err());
        assert!(validate_score(f64::INFINITY).is_err());
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_score(8.0), 8.0);
        assert_eq!(round_score(7.666_666), 7.67);
        assert_eq!(round_score(7.125), 7.13);
    }

    #[test]
    fn three_members_complete_on_third_score() {
        let mut board = Board::new(vec![11, 12, 13]);

        assert!(board.submit(1, 8.0).unwrap().completion.is_none());
        assert!(board.submit(2, 9.0).unwrap().completion.is_none());
        assert_eq!(board.project.status, ProjectStatus::InProgress);
        assert_eq!(board.final_score, None);

        let plan = board.submit(3, 7.0).unwrap();
        let completion = plan.completion.expect("third score completes the project");
        assert_eq!(completion.final_score, 8.0);
        assert_eq!(completion.notifications[0].recipient_id, 100);
        assert!(completion.notifications[0].message.contains("8.00"));
        assert_eq!(board.project.status, ProjectStatus::Completed);
    }

    #[test]
    fn council_without_members_never_completes() {
        assert_eq!(evaluate_completion(&[], &[]), None);
        assert_eq!(
            evaluate_completion(
                &[],
                &[ScoreEntry {
                    council_member_id: 11,
                    value: 9.0
                }]
            ),
            None
        );
    }

    #[test]
    fn resubmission_replaces_previous_value() {
        let mut board = Board::new(vec![11, 12]);
        assert!(!board.submit(1, 4.0).unwrap().replaces_existing);
        assert!(board.submit(1, 6.0).unwrap().replaces_existing);
        assert_eq!(board.scores.len(), 1);
        assert_eq!(board.scores[0].value, 6.0);

        let completion = board.submit(2, 9.0).unwrap().completion.unwrap();
        assert_eq!(completion.final_score, 7.5);
    }

    #[test]
    fn edits_after_completion_are_refused() {
        let mut board = Board::new(vec![11]);
        board.submit(1, 9.0).unwrap();
        assert_matches!(board.submit(1, 3.0), Err(CoreError::Conflict(_)));
        assert_eq!(board.final_score, Some(9.0));
    }

    #[test]
    fn out_of_range_rejected_before_anything_else() {
        let mut board = Board::new(vec![11, 12]);
        assert_matches!(board.submit(1, 10.5), Err(CoreError::Validation(_)));
        assert!(board.scores.is_empty());
    }

    #[test]
    fn scores_from_former_council_are_ignored() {
        let scores = [
            ScoreEntry {
                council_member_id: 99,
                value: 1.0,
            },
            ScoreEntry {
                council_member_id: 11,
                value: 9.0,
            },
        ];
        assert_eq!(evaluate_completion(&[11], &scores), Some(9.0));
        assert_eq!(evaluate_completion(&[11, 12], &scores), None);
    }

    #[test]
    fn seat_must_belong_to_actor() {
        let err = plan_submission(&project(), &seat(1), &professor(2), 8.0, None, &[11], &[])
            .unwrap_err();
        assert_matches!(err, CoreError::Unauthorized(_));
    }

    #[test]
    fn seat_must_sit_on_projects_council() {
        let foreign = Seat {
            id: 50,
            council_id: COUNCIL + 1,
            professor_id: 201,
        };
        let err =
            plan_submission(&project(), &foreign, &professor(1), 8.0, None, &[11], &[]).unwrap_err();
        assert_matches!(err, CoreError::Unauthorized(_));
    }

    #[test]
    fn project_must_be_in_progress() {
        let mut p = project();
        p.status = ProjectStatus::Approved;
        let err = plan_submission(&p, &seat(1), &professor(1), 8.0, None, &[11], &[]).unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));
    }

    #[test]
    fn long_comment_rejected() {
        let text = "x".repeat(MAX_SCORE_COMMENT_LENGTH + 1);
        assert!(validate_score_comment(Some(&text)).is_err());
        assert!(validate_score_comment(Some("clear presentation")).is_ok());
        assert!(validate_score_comment(None).is_ok());
    }
}
