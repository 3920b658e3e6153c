use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job listing
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub employer: String,
    pub field: String,
    pub location: String,
    pub salary: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub description: String,
    pub featured: bool,
    pub posted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewJob {
    pub title: String,
    pub employer: String,
    pub field: String,
    pub location: String,
    pub salary: String,
    pub job_type: String,
    pub description: String,
    pub featured: bool,
    pub posted_by: Option<Uuid>,
}

/// Partial update of a job; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct JobChanges {
    pub title: Option<String>,
    pub employer: Option<String>,
    pub field: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub description: Option<String>,
    pub featured: Option<bool>,
}

impl JobChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.employer.is_none()
            && self.field.is_none()
            && self.location.is_none()
            && self.salary.is_none()
            && self.job_type.is_none()
            && self.description.is_none()
            && self.featured.is_none()
    }
}

/// Filters for listing jobs.
///
/// `title` matches title or field, `location` matches location and `q`
/// matches title, employer or field. All matches are case-insensitive
/// substring matches and are combined with AND.
#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    pub title: Option<String>,
    pub location: Option<String>,
    pub q: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(Role::Candidate),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A registered account. Admins are accounts with the admin role.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub notes: String,
    pub address: String,
    pub resume_file_id: Option<Uuid>,
    pub passport_file_id: Option<Uuid>,
    pub permit_file_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub address: Option<String>,
    pub resume_file_id: Option<Uuid>,
    pub passport_file_id: Option<Uuid>,
    pub permit_file_id: Option<Uuid>,
}

impl CandidateChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.notes.is_none()
            && self.address.is_none()
            && self.resume_file_id.is_none()
            && self.passport_file_id.is_none()
            && self.permit_file_id.is_none()
    }
}

/// `q` matches name, email or phone
#[derive(Debug, Clone, Default)]
pub struct CandidateQuery {
    pub q: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Review state of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    #[serde(rename = "In Review")]
    InReview,
    Interview,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::InReview => "In Review",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Hired => "Hired",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Applied" => Ok(ApplicationStatus::Applied),
            "In Review" => Ok(ApplicationStatus::InReview),
            "Interview" => Ok(ApplicationStatus::Interview),
            "Hired" => Ok(ApplicationStatus::Hired),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!(
                "Unknown status '{}'. Expected one of: Applied, In Review, Interview, Hired, Rejected",
                other
            )),
        }
    }
}

/// A document attached to an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub id: Uuid,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationNote {
    pub admin_id: Uuid,
    pub admin_name: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub job_employer: String,
    pub candidate_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub status: ApplicationStatus,
    pub files: Vec<FileReference>,
    pub notes: Vec<ApplicationNote>,
    pub job_removed: bool,
    pub candidate_removed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub job_title: String,
    pub job_employer: String,
    pub candidate_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub files: Vec<FileReference>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationChanges {
    pub message: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationChanges {
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.phone.is_none() && self.email.is_none() && self.status.is_none()
    }
}

/// `q` matches applicant name, email or job title
#[derive(Debug, Clone, Default)]
pub struct ApplicationQuery {
    pub status: Option<ApplicationStatus>,
    pub candidate_id: Option<Uuid>,
    pub q: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Metadata of one document held by the blob store. `id` is the identifier
/// the store assigned to the bytes.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub field: String,
    pub uploader_id: Option<Uuid>,
    pub size: i64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn reference(&self) -> FileReference {
        FileReference {
            id: self.id,
            field: self.field.clone(),
            original_name: Some(self.original_name.clone()),
            filename: Some(self.filename.clone()),
        }
    }
}
