pub mod application;
pub mod auth;
pub mod candidate;
pub mod error;
pub mod file;
pub mod health;
pub mod identity;
pub mod job;
pub mod pagination;
pub mod validation;

use std::sync::Arc;

use actix_web::web::{self, Data, ServiceConfig};

use crate::auth::SessionKeys;
use crate::db::Repositories;
use crate::storage::BlobStore;
use application::{handlers::{admin_application_config, application_config}, ApplicationService};
use auth::{handlers::auth_config, AuthService};
use candidate::{handlers::{admin_candidate_config, candidate_config}, CandidateService};
use file::{handlers::file_config, FileService};
use health::{health_config, HealthProbe};
use job::{handlers::{admin_job_config, job_config}, JobService};

/// Knobs the services need beyond their repositories
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub max_payload_size: usize,
    pub max_upload_size: usize,
    pub bcrypt_cost: u32,
}

/// Everything the HTTP layer shares across workers. Built once by the
/// process entry point (or a test) and cloned into each `App`.
#[derive(Clone)]
pub struct Services {
    jobs: Data<JobService>,
    auth: Data<AuthService>,
    files: Data<FileService>,
    applications: Data<ApplicationService>,
    candidates: Data<CandidateService>,
    keys: Data<SessionKeys>,
    probe: Data<HealthProbe>,
    max_payload_size: usize,
}

impl Services {
    pub fn new(
        repos: Repositories,
        blobs: Arc<dyn BlobStore>,
        keys: SessionKeys,
        probe: HealthProbe,
        settings: &ServiceSettings,
    ) -> Self {
        Self {
            jobs: Data::new(JobService::new(repos.jobs.clone(), repos.applications.clone())),
            auth: Data::new(AuthService::new(repos.candidates.clone(), settings.bcrypt_cost)),
            files: Data::new(FileService::new(repos.files.clone(), blobs, settings.max_upload_size)),
            applications: Data::new(ApplicationService::new(
                repos.applications.clone(),
                repos.jobs.clone(),
                repos.candidates.clone(),
                repos.files.clone(),
            )),
            candidates: Data::new(CandidateService::new(
                repos.candidates,
                repos.applications,
                repos.files,
            )),
            keys: Data::new(keys),
            probe: Data::new(probe),
            max_payload_size: settings.max_payload_size,
        }
    }

    /// Register shared state, extractor configs and every route
    pub fn configure(&self, config: &mut ServiceConfig) {
        config
            .app_data(self.jobs.clone())
            .app_data(self.auth.clone())
            .app_data(self.files.clone())
            .app_data(self.applications.clone())
            .app_data(self.candidates.clone())
            .app_data(self.keys.clone())
            .app_data(self.probe.clone())
            .app_data(web::PayloadConfig::default().limit(self.max_payload_size))
            .app_data(validation::json_config(self.max_payload_size))
            .app_data(validation::query_config())
            .app_data(validation::path_config())
            .configure(health_config)
            .configure(api_config);
    }
}

/// Routes under `/api`
pub fn api_config(config: &mut ServiceConfig) {
    config.service(
        web::scope("/api")
            .configure(auth_config)
            .configure(job_config)
            .configure(file_config)
            .configure(candidate_config)
            .configure(application_config)
            .service(
                web::scope("/admin")
                    .configure(admin_job_config)
                    .configure(admin_application_config)
                    .configure(admin_candidate_config),
            ),
    );
}
