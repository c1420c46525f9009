//! Database connection utilities.

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Configure SQLite-specific pragmas for better performance and concurrency.
///
/// This sets:
/// - `journal_mode=WAL` - Write-ahead logging for better concurrent access
/// - `busy_timeout=5000` - Wait up to 5 seconds for locks instead of failing immediately
/// - `synchronous=NORMAL` - Good balance of safety and performance with WAL
async fn configure_sqlite(db: &DatabaseConnection) -> Result<(), DbErr> {
    use sea_orm::ConnectionTrait;

    for pragma in [
        "PRAGMA journal_mode=WAL",
        "PRAGMA busy_timeout=5000",
        "PRAGMA synchronous=NORMAL",
    ] {
        db.execute_unprepared(pragma).await?;
    }

    Ok(())
}

fn is_sqlite_file(database_url: &str) -> bool {
    database_url.starts_with("sqlite://") && !is_in_memory(database_url)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Establish a connection to the database with the driver's default pool size.
///
/// For SQLite database files, this automatically configures WAL journal mode,
/// a 5 second busy timeout and NORMAL synchronous mode.
///
/// # Arguments
/// * `database_url` - Database connection string (e.g., `sqlite://jobs.db?mode=rwc` or `postgres:///jobs`)
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    if is_sqlite_file(database_url) {
        configure_sqlite(&db).await?;
    }

    Ok(db)
}

/// Establish a connection with an explicit pool size.
///
/// Fetch workers may each hold a connection while committing, so callers size
/// the pool above their fetch concurrency. In-memory SQLite keeps the
/// driver's single shared connection, since every extra connection would see
/// its own empty database.
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established.
pub async fn connect_with_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);
    if !is_in_memory(database_url) {
        options.max_connections(max_connections.max(1)).min_connections(1);
    }

    let db = Database::connect(options).await?;

    if is_sqlite_file(database_url) {
        configure_sqlite(&db).await?;
    }

    tracing::debug!(max_connections, "Database connected");
    Ok(db)
}

/// Run pending migrations, then add any expected column a hand-made or older
/// table is missing.
///
/// # Errors
/// Returns `DbErr` if a migration or schema check fails.
#[cfg(feature = "migrate")]
pub async fn prepare_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    use sea_orm_migration::MigratorTrait;

    crate::migration::Migrator::up(db, None).await?;
    crate::schema::ensure_schema(db).await?;
    Ok(())
}

/// Establish a connection to the database and bring the schema up to date.
///
/// This is the recommended way to initialize the database for applications
/// using jobfeed.
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established or migrations fail.
///
/// # Example
/// ```ignore
/// let db = jobfeed::connect_and_migrate("sqlite://jobs.db?mode=rwc").await?;
/// ```
#[cfg(feature = "migrate")]
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = connect(database_url).await?;
    prepare_schema(&db).await?;
    Ok(db)
}
