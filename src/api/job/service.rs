use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::api::pagination::{non_blank, Paging};
use crate::db::models::{Job, JobChanges, JobQuery};
use crate::db::{ApplicationRepository, JobRepository};
use super::models::{AdminJobSearch, CreateJob, JobSearch, UpdateJob};

/// Public search returns at most this many jobs
pub const SEARCH_LIMIT: i64 = 200;
const ADMIN_DEFAULT_LIMIT: i64 = 200;
const ADMIN_MAX_LIMIT: i64 = 1000;

/// Job service containing business logic for listings
pub struct JobService {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl JobService {
    pub fn new(jobs: Arc<dyn JobRepository>, applications: Arc<dyn ApplicationRepository>) -> Self {
        Self { jobs, applications }
    }

    pub async fn search(&self, search: &JobSearch) -> Result<Vec<Job>, ServiceError> {
        let query = JobQuery {
            title: non_blank(&search.title),
            location: non_blank(&search.location),
            q: None,
            limit: SEARCH_LIMIT,
            offset: 0,
        };
        Ok(self.jobs.list(&query).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Job, ServiceError> {
        self.jobs
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Job"))
    }

    pub async fn admin_list(&self, search: &AdminJobSearch) -> Result<Vec<Job>, ServiceError> {
        let paging = Paging { limit: search.limit, page: search.page };
        let (limit, offset) = paging.resolve(ADMIN_DEFAULT_LIMIT, ADMIN_MAX_LIMIT);
        let query = JobQuery {
            q: non_blank(&search.q),
            limit,
            offset,
            ..JobQuery::default()
        };
        Ok(self.jobs.list(&query).await?)
    }

    /// Create a job posted by `admin_id`
    pub async fn create(&self, admin_id: Uuid, request: CreateJob) -> Result<Job, ServiceError> {
        let mut new_job = request.into_new_job();
        if new_job.title.is_empty() {
            return Err(ServiceError::validation("Missing title"));
        }
        new_job.posted_by = Some(admin_id);

        info!("Service: Creating job title={} employer={}", new_job.title, new_job.employer);
        let job = self.jobs.create(&new_job).await?;
        info!("Service: Job created successfully with id={}", job.id);
        Ok(job)
    }

    pub async fn update(&self, id: Uuid, request: UpdateJob) -> Result<Job, ServiceError> {
        let changes = JobChanges::from(request);
        if changes.is_empty() {
            return Err(ServiceError::validation("No fields to update"));
        }
        if changes.title.as_deref() == Some("") {
            return Err(ServiceError::validation("Title cannot be blank"));
        }

        info!("Service: Updating job {}", id);
        self.jobs
            .update(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Job"))
    }

    /// Delete a job; its applications are kept and flagged `jobRemoved`
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.jobs.delete(id).await? {
            warn!("Service: Delete of unknown job {}", id);
            return Err(ServiceError::not_found("Job"));
        }
        let flagged = self.applications.mark_job_removed(id).await?;
        info!("Service: Job {} deleted, {} applications flagged", id, flagged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Repositories;

    fn service() -> JobService {
        let repos = Repositories::in_memory();
        JobService::new(repos.jobs, repos.applications)
    }

    fn create_request(title: &str) -> CreateJob {
        CreateJob {
            title: title.to_string(),
            employer: "Northern Logistics".to_string(),
            field: "Transport".to_string(),
            location: "Winnipeg, MB".to_string(),
            salary: "$24/h".to_string(),
            job_type: "Full-time".to_string(),
            description: String::new(),
            featured: false,
        }
    }

    #[actix_web::test]
    async fn blank_title_is_rejected() {
        let service = service();
        let err = service.create(Uuid::new_v4(), create_request("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[actix_web::test]
    async fn update_requires_fields_and_existing_job() {
        let service = service();
        let job = service.create(Uuid::new_v4(), create_request("Driver")).await.unwrap();

        let err = service.update(job.id, UpdateJob::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let update = UpdateJob { featured: Some(true), ..UpdateJob::default() };
        assert!(service.update(job.id, update).await.unwrap().featured);

        let update = UpdateJob { featured: Some(true), ..UpdateJob::default() };
        let err = service.update(Uuid::new_v4(), update).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[actix_web::test]
    async fn search_ignores_blank_filters() {
        let service = service();
        service.create(Uuid::new_v4(), create_request("Driver")).await.unwrap();
        let search = JobSearch { title: Some(" ".into()), location: None };
        assert_eq!(service.search(&search).await.unwrap().len(), 1);
    }
}
