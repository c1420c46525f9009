//! Wire types for the job feed API.
//!
//! Feed pages follow the JSON Feed layout. Detail records carry the posting
//! itself under `ad_content`, with most nested fields optional because the
//! upstream omits or nulls them freely.

use serde::{Deserialize, Deserializer};

use super::error::FeedError;

/// Path prefix shared by page URLs.
pub const FEED_PATH: &str = "/api/v1/feed";

/// Path prefix for detail records.
pub const ENTRY_PATH: &str = "/api/v1/feedentry";

/// Deserialize `null` (or a missing field, with `#[serde(default)]`) as an empty vec.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where a traversal starts when there is no explicit locator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    /// The oldest page of the feed.
    Begin,
    /// The newest page of the feed.
    #[default]
    MostRecent,
}

/// A single page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// `GET /feed`
    First,
    /// `GET /feed?last=true`
    Last,
    /// `GET /feed/{locator}`
    Locator(String),
}

impl From<Anchor> for PageRequest {
    fn from(anchor: Anchor) -> Self {
        match anchor {
            Anchor::Begin => PageRequest::First,
            Anchor::MostRecent => PageRequest::Last,
        }
    }
}

impl PageRequest {
    /// Build a locator request, accepting bare ids and stored page URLs.
    pub fn locator(raw: &str) -> Result<Self, FeedError> {
        locator_from_url(raw).map(|id| PageRequest::Locator(id.to_string()))
    }

    /// The locator this request points at, if any.
    pub fn as_locator(&self) -> Option<&str> {
        match self {
            PageRequest::Locator(id) => Some(id),
            PageRequest::First | PageRequest::Last => None,
        }
    }
}

/// Check that a page locator is a single non-empty path segment.
pub fn validate_locator(locator: &str) -> Result<&str, FeedError> {
    let valid = !locator.is_empty()
        && locator != "."
        && locator != ".."
        && locator
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'));
    if valid {
        Ok(locator)
    } else {
        Err(FeedError::InvalidLocator(locator.to_string()))
    }
}

/// Reduce a stored page reference to its bare locator.
///
/// Older cursors stored the full next-page URL (`/api/v1/feed/<id>`, possibly
/// absolute). Anything after the last `/feed/` segment is the locator.
pub fn locator_from_url(raw: &str) -> Result<&str, FeedError> {
    let trimmed = raw.trim();
    let tail = match trimmed.rfind("/feed/") {
        Some(pos) => &trimmed[pos + "/feed/".len()..],
        None => trimmed,
    };
    let tail = tail.split(['?', '#']).next().unwrap_or(tail);
    validate_locator(tail.trim_end_matches('/'))
}

/// A lightweight item reference on a feed page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedItemRef {
    #[serde(default)]
    pub id: String,
    /// Raw summary timestamp, parsed lazily so a bad value never fails the page.
    #[serde(default)]
    pub date_modified: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Descriptive feed fields carried on every page and copied into the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub home_page_url: Option<String>,
    pub feed_url: Option<String>,
}

/// One page of the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub next_id: Option<String>,
    #[serde(default)]
    pub next_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<FeedItemRef>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub home_page_url: Option<String>,
    #[serde(default)]
    pub feed_url: Option<String>,
}

impl FeedPage {
    /// Locator of the following page, from `next_id` or else `next_url`.
    ///
    /// Absent or blank values mean this is the last page. A value that is
    /// present but not a usable locator is an error, never end of chain.
    pub fn next_locator(&self) -> Result<Option<String>, FeedError> {
        if let Some(id) = self.next_id.as_deref().map(str::trim)
            && !id.is_empty()
        {
            return validate_locator(id).map(|id| Some(id.to_string()));
        }
        match self.next_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => locator_from_url(url).map(|id| Some(id.to_string())),
            _ => Ok(None),
        }
    }

    pub fn metadata(&self) -> FeedMetadata {
        FeedMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            home_page_url: self.home_page_url.clone(),
            feed_url: self.feed_url.clone(),
        }
    }
}

/// Upstream posting status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum JobStatus {
    Active,
    Inactive,
    Other(String),
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "ACTIVE" => JobStatus::Active,
            "INACTIVE" => JobStatus::Inactive,
            _ => JobStatus::Other(value),
        }
    }
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Active => "ACTIVE",
            JobStatus::Inactive => "INACTIVE",
            JobStatus::Other(s) => s,
        }
    }
}

/// Structured employer information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Employer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub orgnr: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

/// Employer as sent upstream: usually an object, occasionally a bare name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EmployerField {
    Structured(Employer),
    Name(String),
}

impl EmployerField {
    /// Collapse to the structured form; a bare string becomes the name.
    pub fn into_employer(self) -> Employer {
        match self {
            EmployerField::Structured(employer) => employer,
            EmployerField::Name(name) => Employer {
                name: Some(name),
                ..Employer::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLocation {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub municipal: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub category_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Occupation {
    #[serde(default)]
    pub level1: Option<String>,
    #[serde(default)]
    pub level2: Option<String>,
}

/// The posting body of a detail record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdContent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "jobtitle")]
    pub job_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub application_url: Option<String>,
    /// Often free text ("Snarest") rather than a date.
    #[serde(default)]
    pub application_due: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, rename = "sourceurl")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub employer: Option<EmployerField>,
    #[serde(default, rename = "engagementtype")]
    pub engagement_type: Option<String>,
    #[serde(default)]
    pub extent: Option<String>,
    #[serde(default, rename = "starttime")]
    pub start_time: Option<String>,
    /// Number or numeric string upstream.
    #[serde(default, rename = "positioncount")]
    pub position_count: Option<serde_json::Value>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub work_locations: Vec<WorkLocation>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contact_list: Vec<Contact>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category_list: Vec<Category>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub occupation_categories: Vec<Occupation>,
}

impl AdContent {
    /// True when the body carries no field at all, as with `"ad_content": {}`.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Full representation of one posting.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DetailRecord {
    #[serde(default, rename = "uuid")]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default, rename = "sistEndret")]
    pub last_changed: Option<String>,
    #[serde(default, rename = "ad_content")]
    pub content: Option<AdContent>,
}
