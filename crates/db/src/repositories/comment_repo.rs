//! Repository for the `professor_comments` table.

use capstone_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::ProfessorComment;

const COLUMNS: &str = "id, project_id, professor_id, comment_text, created_at, updated_at";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

pub struct CommentRepo;

impl CommentRepo {
    pub async fn insert(
        tx: &mut Tx<'_>,
        project_id: DbId,
        professor_id: DbId,
        text: &str,
    ) -> Result<ProfessorComment, sqlx::Error> {
        let query = format!(
            "INSERT INTO professor_comments (project_id, professor_id, comment_text)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProfessorComment>(&query)
            .bind(project_id)
            .bind(professor_id)
            .bind(text)
            .fetch_one(&mut **tx)
            .await
    }

    /// Comments on a project, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProfessorComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM professor_comments
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProfessorComment>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
