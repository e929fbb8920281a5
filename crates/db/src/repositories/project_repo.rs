//! Repository for the `projects` table.
//!
//! Status-changing writes take a transaction: they are only ever issued by
//! [`LifecycleRepo`](super::LifecycleRepo) after it has locked the row and
//! checked the transition with `capstone_core`.

use capstone_core::status::ProjectStatus;
use capstone_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::{clamp_limit, clamp_offset};
use crate::models::project::{
    CreateProject, Project, ProjectExportRecord, ProjectFilter, ProjectStatistics,
    StatisticsScope, StatusCount, YearCount,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, student_id, professor_id, status_id, year, \
                        semester, start_date, defense_date, council_id, final_score, \
                        professor_comment, created_at, updated_at";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// Provides query and lifecycle-write operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find a project by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects matching `filter`, newest first.
    pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects p
             WHERE ($1::SMALLINT IS NULL OR p.status_id = $1)
               AND ($2::INTEGER IS NULL OR p.year = $2)
               AND ($3::SMALLINT IS NULL OR p.semester = $3)
               AND ($4::BIGINT IS NULL OR p.student_id = $4)
               AND ($5::BIGINT IS NULL
                    OR p.professor_id = $5
                    OR EXISTS (
                        SELECT 1 FROM council_members cm
                        WHERE cm.council_id = p.council_id AND cm.professor_id = $5))
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(filter.status_id)
            .bind(filter.year)
            .bind(filter.semester)
            .bind(filter.student_id)
            .bind(filter.involving_professor_id)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// Whether `user_id` holds a seat on the council evaluating the project.
    pub async fn is_council_member(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM projects p
                JOIN council_members cm ON cm.council_id = p.council_id
                WHERE p.id = $1 AND cm.professor_id = $2
             )",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Counts per status and per year, and the mean final score of
    /// completed projects, within `scope`.
    pub async fn statistics(
        pool: &PgPool,
        scope: StatisticsScope,
    ) -> Result<ProjectStatistics, sqlx::Error> {
        const SCOPE: &str = "($1::INTEGER IS NULL OR year = $1)
                             AND ($2::BIGINT IS NULL OR professor_id = $2)";

        let by_status = sqlx::query_as::<_, StatusCount>(&format!(
            "SELECT status_id, COUNT(*) AS count FROM projects
             WHERE {SCOPE}
             GROUP BY status_id
             ORDER BY status_id"
        ))
        .bind(scope.year)
        .bind(scope.professor_id)
        .fetch_all(pool)
        .await?;

        let by_year = sqlx::query_as::<_, YearCount>(&format!(
            "SELECT year, COUNT(*) AS count FROM projects
             WHERE {SCOPE}
             GROUP BY year
             ORDER BY year"
        ))
        .bind(scope.year)
        .bind(scope.professor_id)
        .fetch_all(pool)
        .await?;

        let average_final_score: Option<f64> = sqlx::query_scalar(&format!(
            "SELECT AVG(final_score) FROM projects
             WHERE final_score IS NOT NULL AND {SCOPE}"
        ))
        .bind(scope.year)
        .bind(scope.professor_id)
        .fetch_one(pool)
        .await?;

        Ok(ProjectStatistics {
            total: by_status.iter().map(|s| s.count).sum(),
            by_status,
            average_final_score,
            by_year,
        })
    }

    /// Rows for the CSV register, ordered by year, semester, and student.
    pub async fn export_rows(
        pool: &PgPool,
        year: Option<i32>,
    ) -> Result<Vec<ProjectExportRecord>, sqlx::Error> {
        sqlx::query_as::<_, ProjectExportRecord>(
            "SELECT s.student_code, s.full_name AS student_name, p.title,
                    prof.full_name AS supervisor_name, p.status_id, p.final_score,
                    p.year, p.semester
             FROM projects p
             JOIN users s ON s.id = p.student_id
             LEFT JOIN users prof ON prof.id = p.professor_id
             WHERE ($1::INTEGER IS NULL OR p.year = $1)
             ORDER BY p.year DESC, p.semester DESC, s.student_code NULLS LAST, p.id",
        )
        .bind(year)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Transactional writes
    // -----------------------------------------------------------------------

    /// Insert a new project in `Pending`.
    pub async fn insert(tx: &mut Tx<'_>, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (title, description, student_id, professor_id, status_id, year, semester)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.student_id)
            .bind(input.professor_id)
            .bind(ProjectStatus::Pending.id())
            .bind(input.year)
            .bind(input.semester)
            .fetch_one(&mut **tx)
            .await
    }

    /// Load a project and hold its row lock until the transaction ends.
    pub async fn lock(tx: &mut Tx<'_>, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Pending → Approved: stamp the start date.
    pub async fn mark_approved(tx: &mut Tx<'_>, id: DbId) -> Result<Project, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status_id = $2, start_date = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Approved.id())
            .fetch_one(&mut **tx)
            .await
    }

    /// Pending → Rejected: keep the reason on the project.
    pub async fn mark_rejected(
        tx: &mut Tx<'_>,
        id: DbId,
        reason: &str,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status_id = $2, professor_comment = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Rejected.id())
            .bind(reason)
            .fetch_one(&mut **tx)
            .await
    }

    /// Point the project at a council and defense date, status InProgress.
    pub async fn assign_council(
        tx: &mut Tx<'_>,
        id: DbId,
        council_id: DbId,
        defense_date: Timestamp,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status_id = $2, council_id = $3, defense_date = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::InProgress.id())
            .bind(council_id)
            .bind(defense_date)
            .fetch_one(&mut **tx)
            .await
    }

    /// InProgress → Completed with the final score.
    pub async fn mark_completed(
        tx: &mut Tx<'_>,
        id: DbId,
        final_score: f64,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status_id = $2, final_score = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Completed.id())
            .bind(final_score)
            .fetch_one(&mut **tx)
            .await
    }

    /// Replace the supervising professor.
    pub async fn set_professor(
        tx: &mut Tx<'_>,
        id: DbId,
        professor_id: DbId,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET professor_id = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(professor_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Remove a project. Its progress log, comments and scores go with it.
    pub async fn delete(tx: &mut Tx<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
