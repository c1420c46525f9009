//! Job entity - one row per posting identity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Job model - denormalized projection of the latest detail record.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    /// Upstream posting identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Upstream status (`ACTIVE`, `INACTIVE`, ...).
    pub status: Option<String>,

    // ─── Posting ─────────────────────────────────────────────────────────────
    pub title: Option<String>,
    /// Official job title, as opposed to the ad headline.
    pub job_title: Option<String>,
    /// HTML body of the ad.
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub job_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub application_url: Option<String>,
    pub source: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub source_url: Option<String>,

    // ─── Employer ────────────────────────────────────────────────────────────
    pub employer_name: Option<String>,
    pub employer_orgnr: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub employer_description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub employer_homepage: Option<String>,

    // ─── Place (first work location) ─────────────────────────────────────────
    pub municipality: Option<String>,
    pub county: Option<String>,

    // ─── Terms ───────────────────────────────────────────────────────────────
    pub extent: Option<String>,
    pub engagement_type: Option<String>,
    pub start_time: Option<String>,
    pub sector: Option<String>,
    pub position_count: Option<i32>,

    // ─── Dates ───────────────────────────────────────────────────────────────
    pub published: Option<DateTimeWithTimeZone>,
    pub expires: Option<DateTimeWithTimeZone>,
    /// Parsed application deadline, when the upstream value is a date.
    pub application_due: Option<DateTimeWithTimeZone>,
    /// Raw application deadline, kept even when it is free text.
    pub application_due_text: Option<String>,
    /// Last change upstream (`sistEndret`, else the ad's `updated`).
    pub upstream_updated_at: Option<DateTimeWithTimeZone>,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// First time this identity was stored. Never rewritten.
    pub created_at: DateTimeWithTimeZone,
    /// Last time this identity was written.
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::job_location::Entity")]
    Locations,
    #[sea_orm(has_many = "super::job_contact::Entity")]
    Contacts,
    #[sea_orm(has_many = "super::job_category::Entity")]
    Categories,
    #[sea_orm(has_many = "super::job_occupation::Entity")]
    Occupations,
}

impl Related<super::job_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

impl Related<super::job_contact::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contacts.def()
    }
}

impl Related<super::job_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::job_occupation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Occupations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
