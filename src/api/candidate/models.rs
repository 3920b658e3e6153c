use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::models::{Application, Candidate, FileReference};

/// Fields a candidate may change on their own profile
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,
    pub resume_file_id: Option<Uuid>,
    pub passport_file_id: Option<Uuid>,
    pub permit_file_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AdminUpdateCandidate {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 20000, message = "Notes must be at most 20000 characters"))]
    pub notes: Option<String>,
    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateSearch {
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_file_id: Option<Uuid>,
    pub passport_file_id: Option<Uuid>,
    pub permit_file_id: Option<Uuid>,
    pub files: Vec<FileReference>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct CandidateListResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
pub struct CandidateDetailResponse {
    pub candidate: Candidate,
    pub applications: Vec<Application>,
}
