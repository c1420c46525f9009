//! Detail record → storable rows.
//!
//! Pure functions, no I/O. Child collections are deduplicated here so the
//! persistence layer can insert them as-is.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::feed::{AdContent, Category, DetailRecord, Occupation, WorkLocation};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Detail record has no identity")]
    MissingIdentity,
}

/// Parent row values derived from one detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobRecord {
    pub id: String,
    pub status: Option<String>,
    pub title: Option<String>,
    pub job_title: Option<String>,
    pub description: Option<String>,
    pub job_url: Option<String>,
    pub application_url: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub employer_name: Option<String>,
    pub employer_orgnr: Option<String>,
    pub employer_description: Option<String>,
    pub employer_homepage: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
    pub extent: Option<String>,
    pub engagement_type: Option<String>,
    pub start_time: Option<String>,
    pub sector: Option<String>,
    pub position_count: Option<i32>,
    pub published: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub application_due: Option<DateTime<Utc>>,
    pub application_due_text: Option<String>,
    pub upstream_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationRecord {
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryRecord {
    pub category_type: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccupationRecord {
    pub level1: Option<String>,
    pub level2: Option<String>,
}

/// A parent record with all of its child collections, committed as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedJob {
    pub job: JobRecord,
    pub locations: Vec<LocationRecord>,
    pub contacts: Vec<ContactRecord>,
    pub categories: Vec<CategoryRecord>,
    pub occupations: Vec<OccupationRecord>,
}

/// Parse an upstream timestamp, accepting the shapes the feed actually sends.
///
/// RFC 3339 values keep their offset; naive date-times and bare dates are
/// taken as UTC. Anything else (e.g. "Snarest") is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

fn parse_opt(raw: Option<&String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| parse_timestamp(s))
}

fn position_count(value: Option<&serde_json::Value>) -> Option<i32> {
    match value? {
        serde_json::Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Keep the first occurrence of every distinct element.
fn dedup_preserving_order<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn location_record(loc: &WorkLocation) -> LocationRecord {
    LocationRecord {
        address: loc.address.clone(),
        city: loc.city.clone(),
        postal_code: loc.postal_code.clone(),
        country: loc.country.clone(),
        municipality: loc.municipal.clone(),
        county: loc.county.clone(),
    }
}

fn category_record(cat: &Category) -> CategoryRecord {
    CategoryRecord {
        category_type: cat.category_type.clone(),
        code: cat.code.clone(),
        name: cat.name.clone(),
    }
}

fn occupation_record(occ: &Occupation) -> OccupationRecord {
    OccupationRecord {
        level1: occ.level1.clone(),
        level2: occ.level2.clone(),
    }
}

/// Map one detail record to a parent row plus deduplicated child rows.
///
/// # Errors
/// Returns [`NormalizeError::MissingIdentity`] when the record has no usable id.
pub fn normalize(record: &DetailRecord) -> Result<NormalizedJob, NormalizeError> {
    let id = record
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(NormalizeError::MissingIdentity)?
        .to_string();

    let empty = AdContent::default();
    let ad = record.content.as_ref().unwrap_or(&empty);
    let employer = ad
        .employer
        .clone()
        .map(|e| e.into_employer())
        .unwrap_or_default();

    let locations = dedup_preserving_order(ad.work_locations.iter().map(location_record).collect());
    let first_location = locations.first();

    let job = JobRecord {
        id,
        status: record.status.as_ref().map(|s| s.as_str().to_string()),
        title: ad.title.clone(),
        job_title: ad.job_title.clone(),
        description: ad.description.clone(),
        job_url: ad.link.clone(),
        application_url: ad.application_url.clone(),
        source: ad.source.clone(),
        source_url: ad.source_url.clone(),
        employer_name: employer.name,
        employer_orgnr: employer.orgnr,
        employer_description: employer.description,
        employer_homepage: employer.homepage,
        municipality: first_location.and_then(|l| l.municipality.clone()),
        county: first_location.and_then(|l| l.county.clone()),
        extent: ad.extent.clone(),
        engagement_type: ad.engagement_type.clone(),
        start_time: ad.start_time.clone(),
        sector: ad.sector.clone(),
        position_count: position_count(ad.position_count.as_ref()),
        published: parse_opt(ad.published.as_ref()),
        expires: parse_opt(ad.expires.as_ref()),
        application_due: parse_opt(ad.application_due.as_ref()),
        application_due_text: ad.application_due.clone(),
        upstream_updated_at: parse_opt(record.last_changed.as_ref())
            .or_else(|| parse_opt(ad.updated.as_ref())),
    };

    let contacts = ad
        .contact_list
        .iter()
        .map(|c| ContactRecord {
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            role: c.role.clone(),
            title: c.title.clone(),
        })
        .collect();

    Ok(NormalizedJob {
        job,
        locations,
        contacts,
        categories: dedup_preserving_order(ad.category_list.iter().map(category_record).collect()),
        occupations: dedup_preserving_order(
            ad.occupation_categories
                .iter()
                .map(occupation_record)
                .collect(),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: serde_json::Value) -> DetailRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T11:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:00:00.000123"), Some(
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
                + chrono::Duration::microseconds(123)
        ));
        assert_eq!(
            parse_timestamp("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("30.01.2025"),
            Some(Utc.with_ymd_and_hms(2025, 1, 30, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("Snarest"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_missing_identity_is_rejected() {
        let no_id = record(json!({"status": "ACTIVE", "ad_content": {"title": "x"}}));
        assert_eq!(normalize(&no_id), Err(NormalizeError::MissingIdentity));

        let blank_id = record(json!({"uuid": "  ", "ad_content": {}}));
        assert_eq!(normalize(&blank_id), Err(NormalizeError::MissingIdentity));
    }

    #[test]
    fn test_maps_parent_fields() {
        let job = normalize(&record(json!({
            "uuid": "a",
            "status": "ACTIVE",
            "sistEndret": "2024-03-02T08:00:00",
            "ad_content": {
                "title": "Kokk søkes",
                "jobtitle": "Kokk",
                "description": "<p>Lag mat</p>",
                "link": "https://arbeidsplassen.nav.no/stillinger/stilling/a",
                "applicationUrl": "https://apply.example/a",
                "applicationDue": "Snarest",
                "source": "AMEDIA",
                "sourceurl": "https://source.example/a",
                "employer": {"name": "Hotell AS", "orgnr": "999", "description": "Hotell", "homepage": "https://hotell.example"},
                "engagementtype": "Fast",
                "extent": "Heltid",
                "starttime": "Etter avtale",
                "positioncount": "2",
                "sector": "Privat",
                "published": "2024-03-01T09:00:00",
                "updated": "2024-03-01T09:30:00",
                "expires": "2024-04-01T00:00:00",
                "workLocations": [
                    {"address": "Gate 1", "city": "OSLO", "postalCode": "0150", "country": "NORGE", "municipal": "OSLO", "county": "OSLO"}
                ]
            }
        })))
        .unwrap()
        .job;

        assert_eq!(job.id, "a");
        assert_eq!(job.status.as_deref(), Some("ACTIVE"));
        assert_eq!(job.job_title.as_deref(), Some("Kokk"));
        assert_eq!(job.employer_orgnr.as_deref(), Some("999"));
        assert_eq!(job.municipality.as_deref(), Some("OSLO"));
        assert_eq!(job.position_count, Some(2));
        assert_eq!(job.application_due, None);
        assert_eq!(job.application_due_text.as_deref(), Some("Snarest"));
        assert_eq!(
            job.upstream_updated_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap())
        );
        assert_eq!(
            job.published,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_updated_is_fallback_for_upstream_timestamp() {
        let job = normalize(&record(json!({
            "uuid": "a",
            "ad_content": {"updated": "2024-03-01T09:30:00"}
        })))
        .unwrap()
        .job;
        assert_eq!(
            job.upstream_updated_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_bare_string_employer() {
        let job = normalize(&record(json!({
            "uuid": "a",
            "ad_content": {"employer": "Kommunen"}
        })))
        .unwrap()
        .job;
        assert_eq!(job.employer_name.as_deref(), Some("Kommunen"));
        assert_eq!(job.employer_orgnr, None);
        assert_eq!(job.employer_homepage, None);
    }

    #[test]
    fn test_child_deduplication() {
        let normalized = normalize(&record(json!({
            "uuid": "a",
            "ad_content": {
                "workLocations": [
                    {"city": "OSLO", "postalCode": "0150", "country": "NORGE"},
                    {"country": "NORGE", "postalCode": "0150", "city": "OSLO"},
                    {"city": "OSLO", "postalCode": "0151", "country": "NORGE"}
                ],
                "contactList": [
                    {"name": "Kari", "email": "kari@example.no"},
                    {"name": "Kari", "email": "kari@example.no"}
                ],
                "categoryList": [
                    {"categoryType": "STYRK08", "code": "5120", "name": "Kokker"},
                    {"categoryType": "STYRK08", "code": "5120", "name": "Kokker"},
                    {"categoryType": "ESCO", "code": "5120", "name": "Kokker"}
                ],
                "occupationCategories": [
                    {"level1": "Reiseliv", "level2": "Kokk"},
                    {"level1": "Reiseliv", "level2": "Kokk"}
                ]
            }
        })))
        .unwrap();

        assert_eq!(normalized.locations.len(), 2);
        assert_eq!(normalized.locations[0].postal_code.as_deref(), Some("0150"));
        assert_eq!(normalized.locations[1].postal_code.as_deref(), Some("0151"));
        assert_eq!(normalized.contacts.len(), 2);
        assert_eq!(normalized.categories.len(), 2);
        assert_eq!(normalized.occupations.len(), 1);
    }

    #[test]
    fn test_record_without_content_normalizes_to_bare_parent() {
        let normalized = normalize(&record(json!({"uuid": "a", "status": "INACTIVE"}))).unwrap();
        assert_eq!(normalized.job.status.as_deref(), Some("INACTIVE"));
        assert!(normalized.locations.is_empty());
        assert!(normalized.job.title.is_none());
    }

    #[test]
    fn test_position_count_variants() {
        assert_eq!(position_count(Some(&json!(3))), Some(3));
        assert_eq!(position_count(Some(&json!(" 4 "))), Some(4));
        assert_eq!(position_count(Some(&json!("flere"))), None);
        assert_eq!(position_count(Some(&json!(null))), None);
        assert_eq!(position_count(None), None);
    }
}
