use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::OnConflict,
};

use crate::entity::job::{self, Column, Entity as Job};
use crate::entity::{job_category, job_contact, job_location, job_occupation};
use crate::sync::{
    CategoryRecord, ContactRecord, JobRecord, LocationRecord, NormalizedJob, OccupationRecord,
};

use super::errors::{RepositoryError, Result};

/// Columns overwritten when an existing job is re-ingested.
///
/// Everything except the key and `created_at`.
const UPDATE_COLUMNS: [Column; 25] = [
    Column::Status,
    Column::Title,
    Column::JobTitle,
    Column::Description,
    Column::JobUrl,
    Column::ApplicationUrl,
    Column::Source,
    Column::SourceUrl,
    Column::EmployerName,
    Column::EmployerOrgnr,
    Column::EmployerDescription,
    Column::EmployerHomepage,
    Column::Municipality,
    Column::County,
    Column::Extent,
    Column::EngagementType,
    Column::StartTime,
    Column::Sector,
    Column::PositionCount,
    Column::Published,
    Column::Expires,
    Column::ApplicationDue,
    Column::ApplicationDueText,
    Column::UpstreamUpdatedAt,
    Column::SyncedAt,
];

/// Conflict clause for the parent upsert: last write wins on every mutable field.
pub(crate) fn build_job_on_conflict() -> OnConflict {
    OnConflict::column(Column::Id)
        .update_columns(UPDATE_COLUMNS)
        .to_owned()
}

fn job_active_model(job: &JobRecord) -> job::ActiveModel {
    let now = Utc::now().fixed_offset();
    job::ActiveModel {
        id: Set(job.id.clone()),
        status: Set(job.status.clone()),
        title: Set(job.title.clone()),
        job_title: Set(job.job_title.clone()),
        description: Set(job.description.clone()),
        job_url: Set(job.job_url.clone()),
        application_url: Set(job.application_url.clone()),
        source: Set(job.source.clone()),
        source_url: Set(job.source_url.clone()),
        employer_name: Set(job.employer_name.clone()),
        employer_orgnr: Set(job.employer_orgnr.clone()),
        employer_description: Set(job.employer_description.clone()),
        employer_homepage: Set(job.employer_homepage.clone()),
        municipality: Set(job.municipality.clone()),
        county: Set(job.county.clone()),
        extent: Set(job.extent.clone()),
        engagement_type: Set(job.engagement_type.clone()),
        start_time: Set(job.start_time.clone()),
        sector: Set(job.sector.clone()),
        position_count: Set(job.position_count),
        published: Set(job.published.map(|t| t.fixed_offset())),
        expires: Set(job.expires.map(|t| t.fixed_offset())),
        application_due: Set(job.application_due.map(|t| t.fixed_offset())),
        application_due_text: Set(job.application_due_text.clone()),
        upstream_updated_at: Set(job.upstream_updated_at.map(|t| t.fixed_offset())),
        created_at: Set(now),
        synced_at: Set(now),
    }
}

fn location_model(job_id: &str, loc: &LocationRecord) -> job_location::ActiveModel {
    job_location::ActiveModel {
        job_id: Set(job_id.to_string()),
        address: Set(loc.address.clone()),
        city: Set(loc.city.clone()),
        postal_code: Set(loc.postal_code.clone()),
        country: Set(loc.country.clone()),
        municipality: Set(loc.municipality.clone()),
        county: Set(loc.county.clone()),
        ..Default::default()
    }
}

fn contact_model(job_id: &str, contact: &ContactRecord) -> job_contact::ActiveModel {
    job_contact::ActiveModel {
        job_id: Set(job_id.to_string()),
        name: Set(contact.name.clone()),
        email: Set(contact.email.clone()),
        phone: Set(contact.phone.clone()),
        role: Set(contact.role.clone()),
        title: Set(contact.title.clone()),
        ..Default::default()
    }
}

fn category_model(job_id: &str, cat: &CategoryRecord) -> job_category::ActiveModel {
    job_category::ActiveModel {
        job_id: Set(job_id.to_string()),
        category_type: Set(cat.category_type.clone()),
        code: Set(cat.code.clone()),
        name: Set(cat.name.clone()),
        ..Default::default()
    }
}

fn occupation_model(job_id: &str, occ: &OccupationRecord) -> job_occupation::ActiveModel {
    job_occupation::ActiveModel {
        job_id: Set(job_id.to_string()),
        level1: Set(occ.level1.clone()),
        level2: Set(occ.level2.clone()),
        ..Default::default()
    }
}

/// Replace all child rows of one entity type for `job_id`.
async fn replace_children<E, C>(
    conn: &C,
    job_id_column: E::Column,
    job_id: &str,
    models: Vec<E::ActiveModel>,
) -> Result<()>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    C: ConnectionTrait,
{
    E::delete_many()
        .filter(job_id_column.eq(job_id))
        .exec(conn)
        .await?;
    if !models.is_empty() {
        E::insert_many(models).exec_without_returning(conn).await?;
    }
    Ok(())
}

/// Commit one normalized job as a single transaction.
///
/// The parent row is upserted by id. Each child collection is deleted and
/// re-inserted, so after commit the stored children are exactly the ones in
/// `record`. `created_at` keeps its first value; `synced_at` moves forward.
///
/// # Errors
/// Returns `RepositoryError::Database` if any statement fails; nothing from
/// this record is kept in that case.
pub async fn save_job(db: &DatabaseConnection, record: &NormalizedJob) -> Result<()> {
    let job_id = record.job.id.as_str();
    if job_id.is_empty() {
        return Err(RepositoryError::invalid_input("job id is empty"));
    }

    let txn = db.begin().await?;

    Job::insert(job_active_model(&record.job))
        .on_conflict(build_job_on_conflict())
        .exec_without_returning(&txn)
        .await?;

    replace_children::<job_location::Entity, _>(
        &txn,
        job_location::Column::JobId,
        job_id,
        record
            .locations
            .iter()
            .map(|l| location_model(job_id, l))
            .collect(),
    )
    .await?;
    replace_children::<job_contact::Entity, _>(
        &txn,
        job_contact::Column::JobId,
        job_id,
        record
            .contacts
            .iter()
            .map(|c| contact_model(job_id, c))
            .collect(),
    )
    .await?;
    replace_children::<job_category::Entity, _>(
        &txn,
        job_category::Column::JobId,
        job_id,
        record
            .categories
            .iter()
            .map(|c| category_model(job_id, c))
            .collect(),
    )
    .await?;
    replace_children::<job_occupation::Entity, _>(
        &txn,
        job_occupation::Column::JobId,
        job_id,
        record
            .occupations
            .iter()
            .map(|o| occupation_model(job_id, o))
            .collect(),
    )
    .await?;

    txn.commit().await?;

    tracing::debug!(
        job_id,
        locations = record.locations.len(),
        contacts = record.contacts.len(),
        categories = record.categories.len(),
        occupations = record.occupations.len(),
        "Saved job"
    );
    Ok(())
}

/// Find a job by id.
pub async fn find_job(db: &DatabaseConnection, id: &str) -> Result<Option<job::Model>> {
    Ok(Job::find_by_id(id.to_string()).one(db).await?)
}

/// Total number of stored jobs.
pub async fn count_jobs(db: &DatabaseConnection) -> Result<u64> {
    Ok(Job::find().count(db).await?)
}

/// Stored locations of a job, in insertion order.
pub async fn find_locations(
    db: &DatabaseConnection,
    job_id: &str,
) -> Result<Vec<job_location::Model>> {
    Ok(job_location::Entity::find()
        .filter(job_location::Column::JobId.eq(job_id))
        .order_by_asc(job_location::Column::Id)
        .all(db)
        .await?)
}
