//! Schema-wide conventions every migration must follow.

use sqlx::PgPool;

async fn public_tables(pool: &PgPool) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT table_name::TEXT
         FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_type = 'BASE TABLE'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

/// Entity ids are bigint; only lookup tables use smallint.
#[sqlx::test(migrations = "../../db/migrations")]
async fn ids_are_bigint_or_smallint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name::TEXT, data_type::TEXT
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        assert!(
            data_type == "bigint" || data_type == "smallint",
            "{table}.id is {data_type}"
        );
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn every_table_has_timestamptz_audit_columns(pool: PgPool) {
    for table in public_tables(&pool).await {
        for col in ["created_at", "updated_at"] {
            let data_type: Option<String> = sqlx::query_scalar(
                "SELECT data_type::TEXT
                 FROM information_schema.columns
                 WHERE table_schema = 'public' AND table_name = $1 AND column_name = $2",
            )
            .bind(&table)
            .bind(col)
            .fetch_optional(&pool)
            .await
            .unwrap();

            let data_type = data_type.unwrap_or_else(|| panic!("{table} is missing {col}"));
            assert_eq!(data_type, "timestamp with time zone", "{table}.{col}");
        }
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn text_columns_are_not_varchar(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name::TEXT, column_name::TEXT
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND data_type = 'character varying'
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(rows.is_empty(), "VARCHAR columns found: {rows:?}");
}

/// Every foreign key column is indexed and carries an explicit rule.
#[sqlx::test(migrations = "../../db/migrations")]
async fn foreign_keys_are_indexed_with_explicit_rules(pool: PgPool) {
    let fks: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT tc.table_name::TEXT, kcu.column_name::TEXT,
                rc.delete_rule::TEXT, rc.update_rule::TEXT
         FROM information_schema.table_constraints tc
         JOIN information_schema.key_column_usage kcu
             ON tc.constraint_name = kcu.constraint_name
            AND tc.table_schema = kcu.table_schema
         JOIN information_schema.referential_constraints rc
             ON rc.constraint_name = tc.constraint_name
            AND rc.constraint_schema = tc.table_schema
         WHERE tc.constraint_type = 'FOREIGN KEY'
           AND tc.table_schema = 'public'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!fks.is_empty());
    for (table, column, delete_rule, update_rule) in &fks {
        let indexed: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM pg_indexes
                WHERE schemaname = 'public'
                  AND tablename = $1
                  AND indexdef LIKE '%(' || $2 || '%'
             )",
        )
        .bind(table)
        .bind(column)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(indexed, "FK column {table}.{column} has no index");
        assert!(
            delete_rule != "NO ACTION" || update_rule != "NO ACTION",
            "FK {table}.{column} has no explicit ON DELETE / ON UPDATE rule"
        );
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lookup_rows_are_seeded(pool: PgPool) {
    let roles: Vec<String> = sqlx::query_scalar("SELECT name FROM roles ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(roles, ["admin", "professor", "student"]);

    let statuses: Vec<(i16, String)> =
        sqlx::query_as("SELECT id, name FROM project_statuses ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    let names: Vec<&str> = statuses.iter().map(|(_, n)| n.as_str()).collect();
    assert_eq!(
        names,
        ["pending", "approved", "in_progress", "completed", "rejected"]
    );
    for (id, name) in &statuses {
        let status = capstone_core::status::ProjectStatus::from_id(*id).unwrap();
        assert_eq!(status.name(), name.as_str());
    }
}
