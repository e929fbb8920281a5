//! Repositories for `councils` and `council_members`.

use std::collections::HashMap;

use capstone_core::council::CouncilRole;
use capstone_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::ScoreRepo;
use crate::models::council::{
    Council, CouncilDetail, CouncilMember, CouncilMemberDetail, CouncilProject,
    CouncilProjectRow, ProfessorSeat,
};
use crate::models::score::ScoreDetail;

const COUNCIL_COLUMNS: &str =
    "id, name, defense_date, location, description, created_at, updated_at";

const MEMBER_COLUMNS: &str =
    "id, council_id, professor_id, role, assigned_at, created_at, updated_at";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// Provides CRUD operations for defense councils.
pub struct CouncilRepo;

impl CouncilRepo {
    /// Insert a council row. Seats are added separately.
    pub async fn insert(
        tx: &mut Tx<'_>,
        name: &str,
        defense_date: Timestamp,
        location: Option<&str>,
        description: Option<&str>,
    ) -> Result<Council, sqlx::Error> {
        let query = format!(
            "INSERT INTO councils (name, defense_date, location, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {COUNCIL_COLUMNS}"
        );
        sqlx::query_as::<_, Council>(&query)
            .bind(name)
            .bind(defense_date)
            .bind(location)
            .bind(description)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Council>, sqlx::Error> {
        let query = format!("SELECT {COUNCIL_COLUMNS} FROM councils WHERE id = $1");
        sqlx::query_as::<_, Council>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Take a shared lock on the council row.
    ///
    /// Score submissions hold this so that a concurrent seat change, which
    /// takes [`CouncilRepo::lock`], cannot interleave with them.
    pub async fn lock_shared(tx: &mut Tx<'_>, id: DbId) -> Result<Option<Council>, sqlx::Error> {
        let query = format!("SELECT {COUNCIL_COLUMNS} FROM councils WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, Council>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Take an exclusive lock on the council row.
    pub async fn lock(tx: &mut Tx<'_>, id: DbId) -> Result<Option<Council>, sqlx::Error> {
        let query = format!("SELECT {COUNCIL_COLUMNS} FROM councils WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Council>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// All councils, most recent defense first. A professor filter limits
    /// the list to councils where they hold a seat.
    pub async fn list(
        pool: &PgPool,
        professor_id: Option<DbId>,
    ) -> Result<Vec<Council>, sqlx::Error> {
        let query = format!(
            "SELECT {COUNCIL_COLUMNS} FROM councils c
             WHERE $1::BIGINT IS NULL
                OR EXISTS (
                    SELECT 1 FROM council_members cm
                    WHERE cm.council_id = c.id AND cm.professor_id = $1)
             ORDER BY c.defense_date DESC, c.id DESC"
        );
        sqlx::query_as::<_, Council>(&query)
            .bind(professor_id)
            .fetch_all(pool)
            .await
    }

    /// A council with its seat holders and its docket. Each docket entry
    /// carries the scores recorded against it.
    pub async fn detail(pool: &PgPool, id: DbId) -> Result<Option<CouncilDetail>, sqlx::Error> {
        let Some(council) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let members = CouncilMemberRepo::list_details(pool, id).await?;

        let rows = sqlx::query_as::<_, CouncilProjectRow>(
            "SELECT p.id, p.title, p.student_id, s.full_name AS student_name, s.student_code,
                    ps.name AS status, p.defense_date, p.final_score
             FROM projects p
             JOIN users s ON s.id = p.student_id
             JOIN project_statuses ps ON ps.id = p.status_id
             WHERE p.council_id = $1
             ORDER BY p.defense_date NULLS LAST, p.id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        let mut scores_by_project: HashMap<DbId, Vec<ScoreDetail>> = HashMap::new();
        for score in ScoreRepo::list_for_council(pool, id).await? {
            scores_by_project
                .entry(score.project_id)
                .or_default()
                .push(score);
        }
        let projects = rows
            .into_iter()
            .map(|project| CouncilProject {
                scores: scores_by_project.remove(&project.id).unwrap_or_default(),
                project,
            })
            .collect();

        Ok(Some(CouncilDetail {
            council,
            members,
            projects,
        }))
    }
}

/// Provides operations on council seats.
pub struct CouncilMemberRepo;

impl CouncilMemberRepo {
    /// Give `professor_id` a seat. A second seat for the same professor on
    /// the same council violates `uq_council_members_council_professor`.
    pub async fn insert(
        tx: &mut Tx<'_>,
        council_id: DbId,
        professor_id: DbId,
        role: CouncilRole,
    ) -> Result<CouncilMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO council_members (council_id, professor_id, role)
             VALUES ($1, $2, $3)
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, CouncilMember>(&query)
            .bind(council_id)
            .bind(professor_id)
            .bind(role.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_in_tx(
        tx: &mut Tx<'_>,
        id: DbId,
    ) -> Result<Option<CouncilMember>, sqlx::Error> {
        let query = format!("SELECT {MEMBER_COLUMNS} FROM council_members WHERE id = $1");
        sqlx::query_as::<_, CouncilMember>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Seat ids of the council's current members.
    pub async fn member_ids(tx: &mut Tx<'_>, council_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM council_members WHERE council_id = $1 ORDER BY id")
            .bind(council_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Number of scores already recorded against any seat of the council.
    pub async fn count_scores(tx: &mut Tx<'_>, council_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM scores s
             JOIN council_members cm ON cm.id = s.council_member_id
             WHERE cm.council_id = $1",
        )
        .bind(council_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Seats with the holder's display name, chairman first.
    pub async fn list_details(
        pool: &PgPool,
        council_id: DbId,
    ) -> Result<Vec<CouncilMemberDetail>, sqlx::Error> {
        sqlx::query_as::<_, CouncilMemberDetail>(
            "SELECT cm.id, cm.council_id, cm.professor_id, u.full_name AS professor_name,
                    cm.role, cm.assigned_at
             FROM council_members cm
             JOIN users u ON u.id = cm.professor_id
             WHERE cm.council_id = $1
             ORDER BY CASE cm.role
                        WHEN 'chairman' THEN 1
                        WHEN 'secretary' THEN 2
                        ELSE 3
                      END,
                      cm.id",
        )
        .bind(council_id)
        .fetch_all(pool)
        .await
    }

    /// Every seat a professor holds, most recent defense first.
    pub async fn list_for_professor(
        pool: &PgPool,
        professor_id: DbId,
    ) -> Result<Vec<ProfessorSeat>, sqlx::Error> {
        sqlx::query_as::<_, ProfessorSeat>(
            "SELECT cm.id, cm.council_id, c.name AS council_name, c.defense_date, c.location,
                    cm.role, cm.assigned_at
             FROM council_members cm
             JOIN councils c ON c.id = cm.council_id
             WHERE cm.professor_id = $1
             ORDER BY c.defense_date DESC, cm.id DESC",
        )
        .bind(professor_id)
        .fetch_all(pool)
        .await
    }
}
