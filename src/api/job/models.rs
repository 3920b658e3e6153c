use serde::Deserialize;
use validator::Validate;

use crate::db::models::{JobChanges, NewJob};

/// Public search parameters: `title` matches title or field, `location` matches location
#[derive(Debug, Default, Deserialize)]
pub struct JobSearch {
    pub title: Option<String>,
    pub location: Option<String>,
}

/// Admin listing parameters
#[derive(Debug, Default, Deserialize)]
pub struct AdminJobSearch {
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// Job model for creating and validating jobs
#[derive(Deserialize, Debug, Validate)]
pub struct CreateJob {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "Employer must be at most 200 characters"))]
    pub employer: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default, rename = "type")]
    pub job_type: String,
    #[serde(default)]
    #[validate(length(max = 20000, message = "Description must be at most 20000 characters"))]
    pub description: String,
    #[serde(default)]
    pub featured: bool,
}

impl CreateJob {
    pub fn into_new_job(self) -> NewJob {
        NewJob {
            title: self.title.trim().to_string(),
            employer: self.employer.trim().to_string(),
            field: self.field.trim().to_string(),
            location: self.location,
            salary: self.salary,
            job_type: self.job_type,
            description: self.description,
            featured: self.featured,
            posted_by: None,
        }
    }
}

#[derive(Deserialize, Debug, Default, Validate)]
pub struct UpdateJob {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    pub employer: Option<String>,
    pub field: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    #[validate(length(max = 20000, message = "Description must be at most 20000 characters"))]
    pub description: Option<String>,
    pub featured: Option<bool>,
}

impl From<UpdateJob> for JobChanges {
    fn from(update: UpdateJob) -> Self {
        JobChanges {
            title: update.title.map(|t| t.trim().to_string()),
            employer: update.employer,
            field: update.field,
            location: update.location,
            salary: update.salary,
            job_type: update.job_type,
            description: update.description,
            featured: update.featured,
        }
    }
}
