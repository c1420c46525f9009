use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait};

use crate::entity::feed_cursor::{self, Column, Entity as FeedCursor};
use crate::feed::FeedMetadata;

use super::errors::{RepositoryError, Result};

/// Everything written with a cursor advance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorUpdate {
    /// Bare page locator to resume from.
    pub next_locator: String,
    /// Newest summary timestamp seen on the page being committed.
    pub last_seen_date: Option<DateTime<Utc>>,
    pub metadata: FeedMetadata,
}

impl CursorUpdate {
    pub fn new(next_locator: impl Into<String>) -> Self {
        Self {
            next_locator: next_locator.into(),
            ..Default::default()
        }
    }
}

/// Read the stored cursor, if any.
///
/// Only one row is ever kept; if a foreign writer left several, the newest
/// (highest id) wins.
pub async fn read(db: &DatabaseConnection) -> Result<Option<feed_cursor::Model>> {
    Ok(FeedCursor::find()
        .order_by_desc(Column::Id)
        .one(db)
        .await?)
}

/// Replace the stored cursor.
///
/// Delete and insert run in one transaction, so a reader sees either the old
/// row or the new one and never an empty table.
pub async fn write(db: &DatabaseConnection, update: &CursorUpdate) -> Result<feed_cursor::Model> {
    if update.next_locator.is_empty() {
        return Err(RepositoryError::invalid_input("cursor locator is empty"));
    }

    let txn = db.begin().await?;
    FeedCursor::delete_many().exec(&txn).await?;

    let model = feed_cursor::ActiveModel {
        next_locator: Set(update.next_locator.clone()),
        last_seen_date: Set(update.last_seen_date.map(|t| t.fixed_offset())),
        updated_at: Set(Utc::now().fixed_offset()),
        title: Set(update.metadata.title.clone()),
        home_page_url: Set(update.metadata.home_page_url.clone()),
        feed_url: Set(update.metadata.feed_url.clone()),
        description: Set(update.metadata.description.clone()),
        ..Default::default()
    };
    let saved = FeedCursor::insert(model)
        .exec_with_returning(&txn)
        .await?;
    txn.commit().await?;

    tracing::debug!(locator = %saved.next_locator, "Cursor advanced");
    Ok(saved)
}

/// Remove the stored cursor so the next run starts from its anchor.
pub async fn clear(db: &DatabaseConnection) -> Result<u64> {
    let result = FeedCursor::delete_many().exec(db).await?;
    Ok(result.rows_affected)
}
