use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::Job;

/// Response wrapping a single job
#[derive(Serialize, Deserialize)]
pub struct JobResponse {
    pub job: Job,
}

/// Response for job listings
#[derive(Serialize, Deserialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
}

/// Response for a created job
#[derive(Serialize, Deserialize)]
pub struct JobCreatedResponse {
    pub ok: bool,
    pub id: Uuid,
}
