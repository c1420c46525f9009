//! Additive schema healing.
//!
//! Tables created by older tooling (or by hand) may lack columns this crate
//! writes. On startup every expected nullable column is checked against the
//! live table and missing ones are added. Nothing is ever dropped or retyped.

use std::collections::HashSet;

use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};

/// Storage class of an expected column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Timestamp,
}

impl ColumnKind {
    /// SQL type used when the column has to be added.
    pub fn sql_type(self, backend: DatabaseBackend) -> &'static str {
        match (self, backend) {
            (ColumnKind::Text, _) => "TEXT",
            (ColumnKind::Integer, _) => "INTEGER",
            (ColumnKind::Timestamp, DatabaseBackend::Postgres) => "TIMESTAMPTZ",
            (ColumnKind::Timestamp, DatabaseBackend::MySql) => "TIMESTAMP NULL",
            (ColumnKind::Timestamp, DatabaseBackend::Sqlite) => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> ExpectedColumn {
    ExpectedColumn { name, kind }
}

pub const JOBS_TABLE: &str = "jobs";
pub const FEED_CURSOR_TABLE: &str = "feed_cursor";

/// Nullable columns of `jobs` that may be added after the fact.
pub const JOB_COLUMNS: &[ExpectedColumn] = &[
    col("status", ColumnKind::Text),
    col("title", ColumnKind::Text),
    col("job_title", ColumnKind::Text),
    col("description", ColumnKind::Text),
    col("job_url", ColumnKind::Text),
    col("application_url", ColumnKind::Text),
    col("source", ColumnKind::Text),
    col("source_url", ColumnKind::Text),
    col("employer_name", ColumnKind::Text),
    col("employer_orgnr", ColumnKind::Text),
    col("employer_description", ColumnKind::Text),
    col("employer_homepage", ColumnKind::Text),
    col("municipality", ColumnKind::Text),
    col("county", ColumnKind::Text),
    col("extent", ColumnKind::Text),
    col("engagement_type", ColumnKind::Text),
    col("start_time", ColumnKind::Text),
    col("sector", ColumnKind::Text),
    col("position_count", ColumnKind::Integer),
    col("published", ColumnKind::Timestamp),
    col("expires", ColumnKind::Timestamp),
    col("application_due", ColumnKind::Timestamp),
    col("application_due_text", ColumnKind::Text),
    col("upstream_updated_at", ColumnKind::Timestamp),
];

/// Nullable columns of `feed_cursor` that may be added after the fact.
pub const FEED_CURSOR_COLUMNS: &[ExpectedColumn] = &[
    col("last_seen_date", ColumnKind::Timestamp),
    col("title", ColumnKind::Text),
    col("home_page_url", ColumnKind::Text),
    col("feed_url", ColumnKind::Text),
    col("description", ColumnKind::Text),
];

fn quote_ident(backend: DatabaseBackend, ident: &str) -> String {
    match backend {
        DatabaseBackend::MySql => format!("`{ident}`"),
        DatabaseBackend::Postgres | DatabaseBackend::Sqlite => format!("\"{ident}\""),
    }
}

/// Names of the columns `table` currently has.
pub async fn existing_columns<C: ConnectionTrait>(
    db: &C,
    table: &str,
) -> Result<HashSet<String>, DbErr> {
    let backend = db.get_database_backend();
    let sql = match backend {
        DatabaseBackend::Sqlite => "SELECT name FROM pragma_table_info(?)",
        DatabaseBackend::Postgres => {
            "SELECT column_name::text AS name FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1"
        }
        DatabaseBackend::MySql => {
            "SELECT column_name AS name FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name = ?"
        }
    };

    let rows = db
        .query_all(Statement::from_sql_and_values(backend, sql, [table.into()]))
        .await?;

    rows.iter()
        .map(|row| row.try_get::<String>("", "name"))
        .collect()
}

/// Add every column in `expected` that `table` lacks.
///
/// Returns the names of the columns that were added.
pub async fn ensure_columns<C: ConnectionTrait>(
    db: &C,
    table: &str,
    expected: &[ExpectedColumn],
) -> Result<Vec<&'static str>, DbErr> {
    let backend = db.get_database_backend();
    let existing = existing_columns(db, table).await?;
    let mut added = Vec::new();

    for column in expected {
        if existing.contains(column.name) {
            continue;
        }
        tracing::info!(table, column = column.name, "Adding missing column");
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            quote_ident(backend, table),
            quote_ident(backend, column.name),
            column.kind.sql_type(backend)
        );
        db.execute_unprepared(&sql).await?;
        added.push(column.name);
    }

    Ok(added)
}

/// Heal `jobs` and `feed_cursor`.
pub async fn ensure_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    ensure_columns(db, JOBS_TABLE, JOB_COLUMNS).await?;
    ensure_columns(db, FEED_CURSOR_TABLE, FEED_CURSOR_COLUMNS).await?;
    Ok(())
}
