use actix_web::{
    delete, get, post, put,
    web::{Data, Path, Query, ServiceConfig, scope},
    HttpResponse,
};
use actix_web_validator::Json;
use serde_json::json;
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::api::identity::AdminIdentity;
use super::dto::{JobCreatedResponse, JobListResponse, JobResponse};
use super::models::{AdminJobSearch, CreateJob, JobSearch, UpdateJob};
use super::service::JobService;

#[get("")]
async fn search_jobs(
    service: Data<JobService>,
    search: Query<JobSearch>,
) -> Result<HttpResponse, ServiceError> {
    let jobs = service.search(&search).await?;
    Ok(HttpResponse::Ok().json(JobListResponse { jobs }))
}

#[get("/{id}")]
async fn get_job(service: Data<JobService>, id: Path<Uuid>) -> Result<HttpResponse, ServiceError> {
    let job = service.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JobResponse { job }))
}

#[get("")]
async fn admin_list_jobs(
    _admin: AdminIdentity,
    service: Data<JobService>,
    search: Query<AdminJobSearch>,
) -> Result<HttpResponse, ServiceError> {
    let jobs = service.admin_list(&search).await?;
    Ok(HttpResponse::Ok().json(JobListResponse { jobs }))
}

#[post("")]
async fn admin_create_job(
    AdminIdentity(admin): AdminIdentity,
    service: Data<JobService>,
    job: Json<CreateJob>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.create(admin.id, job.into_inner()).await?;
    Ok(HttpResponse::Created().json(JobCreatedResponse { ok: true, id: job.id }))
}

#[get("/{id}")]
async fn admin_get_job(
    _admin: AdminIdentity,
    service: Data<JobService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JobResponse { job }))
}

#[put("/{id}")]
async fn admin_update_job(
    _admin: AdminIdentity,
    service: Data<JobService>,
    id: Path<Uuid>,
    update: Json<UpdateJob>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.update(id.into_inner(), update.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "job": job })))
}

#[delete("/{id}")]
async fn admin_delete_job(
    _admin: AdminIdentity,
    service: Data<JobService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    service.delete(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(scope("/jobs").service(search_jobs).service(get_job));
}

pub fn admin_job_config(config: &mut ServiceConfig) {
    config.service(
        scope("/jobs")
            .service(admin_list_jobs)
            .service(admin_create_job)
            .service(admin_get_job)
            .service(admin_update_job)
            .service(admin_delete_job),
    );
}
