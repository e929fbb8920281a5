//! Repository for the `scores` table.

use capstone_core::types::DbId;
use sqlx::PgPool;

use crate::models::score::{Score, ScoreDetail};

const COLUMNS: &str = "id, project_id, council_member_id, value, comment, created_at, updated_at";

const DETAIL_SELECT: &str =
    "SELECT s.id, s.project_id, s.council_member_id, cm.professor_id,
            u.full_name AS professor_name, cm.role AS member_role,
            s.value, s.comment, s.updated_at
     FROM scores s
     JOIN council_members cm ON cm.id = s.council_member_id
     JOIN users u ON u.id = cm.professor_id";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

pub struct ScoreRepo;

impl ScoreRepo {
    /// Insert or overwrite the score a seat gave a project.
    ///
    /// Keyed on `uq_scores_project_member`, so resubmitting replaces the
    /// value and comment in place.
    pub async fn upsert(
        tx: &mut Tx<'_>,
        project_id: DbId,
        council_member_id: DbId,
        value: f64,
        comment: Option<&str>,
    ) -> Result<Score, sqlx::Error> {
        let query = format!(
            "INSERT INTO scores (project_id, council_member_id, value, comment)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_scores_project_member
             DO UPDATE SET value = EXCLUDED.value, comment = EXCLUDED.comment
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Score>(&query)
            .bind(project_id)
            .bind(council_member_id)
            .bind(value)
            .bind(comment)
            .fetch_one(&mut **tx)
            .await
    }

    /// Scores recorded for a project, read inside the caller's transaction.
    pub async fn list_for_project_tx(
        tx: &mut Tx<'_>,
        project_id: DbId,
    ) -> Result<Vec<Score>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scores WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, Score>(&query)
            .bind(project_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Scores for a project with the grading professor's name and seat role.
    pub async fn list_details(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ScoreDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE s.project_id = $1 ORDER BY s.id");
        sqlx::query_as::<_, ScoreDetail>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Scores given by the seats of one council, across its projects.
    pub async fn list_for_council(
        pool: &PgPool,
        council_id: DbId,
    ) -> Result<Vec<ScoreDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} WHERE cm.council_id = $1 ORDER BY s.project_id, s.id"
        );
        sqlx::query_as::<_, ScoreDetail>(&query)
            .bind(council_id)
            .fetch_all(pool)
            .await
    }
}
