//! Repository for the `system_configs` key/value table.

use chrono::Datelike;
use sqlx::PgPool;

use crate::models::system_config::{
    AcademicTerm, SystemConfig, KEY_CURRENT_SEMESTER, KEY_CURRENT_YEAR,
};

const COLUMNS: &str = "id, config_key, value, description, created_at, updated_at";

pub struct SystemConfigRepo;

impl SystemConfigRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<SystemConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM system_configs ORDER BY config_key");
        sqlx::query_as::<_, SystemConfig>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<SystemConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM system_configs WHERE config_key = $1");
        sqlx::query_as::<_, SystemConfig>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or overwrite a key. `description` is kept when `None`.
    pub async fn set(
        pool: &PgPool,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<SystemConfig, sqlx::Error> {
        let query = format!(
            "INSERT INTO system_configs (config_key, value, description)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_system_configs_config_key
             DO UPDATE SET value = EXCLUDED.value,
                           description = COALESCE(EXCLUDED.description, system_configs.description)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SystemConfig>(&query)
            .bind(key)
            .bind(value)
            .bind(description)
            .fetch_one(pool)
            .await
    }

    /// The term new projects are filed under.
    ///
    /// Missing or unparsable values fall back to the current calendar year
    /// and the first semester.
    pub async fn academic_term(pool: &PgPool) -> Result<AcademicTerm, sqlx::Error> {
        let year = Self::get(pool, KEY_CURRENT_YEAR)
            .await?
            .and_then(|c| c.value.trim().parse::<i32>().ok())
            .unwrap_or_else(|| chrono::Utc::now().year());
        let semester = Self::get(pool, KEY_CURRENT_SEMESTER)
            .await?
            .and_then(|c| c.value.trim().parse::<i16>().ok())
            .unwrap_or(1);
        Ok(AcademicTerm { year, semester })
    }
}
