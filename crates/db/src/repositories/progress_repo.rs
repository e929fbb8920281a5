//! Repository for the `project_progress` table.

use capstone_core::types::DbId;
use sqlx::PgPool;

use crate::models::progress::ProjectProgress;

const COLUMNS: &str =
    "id, project_id, title, description, percentage, updated_by, created_at, updated_at";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

pub struct ProgressRepo;

impl ProgressRepo {
    pub async fn insert(
        tx: &mut Tx<'_>,
        project_id: DbId,
        title: &str,
        description: &str,
        percentage: i32,
        updated_by: DbId,
    ) -> Result<ProjectProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_progress (project_id, title, description, percentage, updated_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectProgress>(&query)
            .bind(project_id)
            .bind(title)
            .bind(description)
            .bind(percentage)
            .bind(updated_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// Highest percentage reported so far, if any report exists.
    pub async fn latest_percentage(
        tx: &mut Tx<'_>,
        project_id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(percentage) FROM project_progress WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Reports for a project, oldest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_progress WHERE project_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, ProjectProgress>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
