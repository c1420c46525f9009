//! FeedCursor entity - the single resumption point of the feed walk.
//!
//! The table holds at most one row. Writers replace it wholesale inside a
//! transaction (see [`crate::repository::cursor`]).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feed_cursor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Page to fetch first on the next run. Bare locator; rows written by
    /// older tooling may hold a full `/api/v1/feed/<id>` URL.
    #[sea_orm(column_type = "Text")]
    pub next_locator: String,

    /// Newest summary timestamp seen on the page that produced this cursor.
    pub last_seen_date: Option<DateTimeWithTimeZone>,

    pub updated_at: DateTimeWithTimeZone,

    // ─── Feed metadata ───────────────────────────────────────────────────────
    pub title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub home_page_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub feed_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
