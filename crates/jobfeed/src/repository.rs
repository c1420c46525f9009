//! Storage operations for jobs, the feed cursor and system parameters.
//!
//! Every job write is transactional: the parent row and all of its child
//! collections commit together or not at all.

pub mod cursor;
mod errors;
mod jobs;
mod parameters;

pub use cursor::{
    CursorUpdate, clear as clear_cursor, read as read_cursor, write as write_cursor,
};
pub use errors::{RepositoryError, Result};
pub use jobs::{count_jobs, find_job, find_locations, save_job};
pub use parameters::{get_parameter, set_parameter};

#[cfg(test)]
mod tests {
    use super::*;
    use jobs::build_job_on_conflict;
    use sea_orm::{DbErr, EntityTrait, QueryTrait, Set};

    use crate::entity::job::{ActiveModel, Entity as Job};

    #[test]
    fn test_repository_error_invalid_input() {
        let err = RepositoryError::invalid_input("job id is empty");
        let msg = err.to_string();
        assert!(msg.contains("Invalid input"));
        assert!(msg.contains("job id is empty"));
    }

    #[test]
    fn test_repository_error_database_from_db_err() {
        let db_err = DbErr::RecordNotFound("test".to_string());
        let repo_err: RepositoryError = db_err.into();
        assert!(repo_err.to_string().contains("Database error"));
    }

    #[test]
    fn test_cursor_update_new() {
        let update = CursorUpdate::new("abc");
        assert_eq!(update.next_locator, "abc");
        assert!(update.last_seen_date.is_none());
        assert!(update.metadata.title.is_none());
    }

    /// The upsert must overwrite mutable fields but never `created_at`.
    #[test]
    fn test_job_upsert_query_builds() {
        let now = chrono::Utc::now().fixed_offset();
        let model = ActiveModel {
            id: Set("job-1".to_string()),
            status: Set(Some("ACTIVE".to_string())),
            title: Set(Some("Utvikler".to_string())),
            created_at: Set(now),
            synced_at: Set(now),
            ..Default::default()
        };

        let sql = Job::insert(model)
            .on_conflict(build_job_on_conflict())
            .build(sea_orm::DatabaseBackend::Sqlite)
            .to_string();

        assert!(sql.contains("ON CONFLICT (\"id\")"), "{sql}");
        assert!(sql.contains("DO UPDATE"), "{sql}");
        assert!(sql.contains("\"title\" = \"excluded\".\"title\""), "{sql}");
        assert!(
            sql.contains("\"synced_at\" = \"excluded\".\"synced_at\""),
            "{sql}"
        );
        assert!(
            !sql.contains("\"created_at\" = \"excluded\""),
            "created_at must be preserved: {sql}"
        );
    }
}
