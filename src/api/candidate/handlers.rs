use actix_web::{
    delete, get, put,
    web::{Data, Path, Query, ServiceConfig, scope},
    HttpResponse,
};
use actix_web_validator::Json;
use serde_json::json;
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::api::identity::{AdminIdentity, Identity};
use super::models::{
    AdminUpdateCandidate, CandidateDetailResponse, CandidateListResponse, CandidateSearch,
    ProfileResponse, UpdateProfile,
};
use super::service::CandidateService;

#[get("/candidate/profile")]
async fn get_profile(
    identity: Identity,
    service: Data<CandidateService>,
) -> Result<HttpResponse, ServiceError> {
    let profile = service.profile(&identity).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse { profile }))
}

#[put("/candidate/profile")]
async fn update_profile(
    identity: Identity,
    service: Data<CandidateService>,
    request: Json<UpdateProfile>,
) -> Result<HttpResponse, ServiceError> {
    let profile = service.update_profile(&identity, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse { profile }))
}

#[get("")]
async fn admin_list_candidates(
    _admin: AdminIdentity,
    service: Data<CandidateService>,
    search: Query<CandidateSearch>,
) -> Result<HttpResponse, ServiceError> {
    let candidates = service.admin_list(&search).await?;
    Ok(HttpResponse::Ok().json(CandidateListResponse { candidates }))
}

#[get("/{id}")]
async fn admin_get_candidate(
    _admin: AdminIdentity,
    service: Data<CandidateService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let (candidate, applications) = service.admin_get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CandidateDetailResponse { candidate, applications }))
}

#[put("/{id}")]
async fn admin_update_candidate(
    _admin: AdminIdentity,
    service: Data<CandidateService>,
    id: Path<Uuid>,
    request: Json<AdminUpdateCandidate>,
) -> Result<HttpResponse, ServiceError> {
    let candidate = service.admin_update(id.into_inner(), request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "candidate": candidate })))
}

#[delete("/{id}")]
async fn admin_delete_candidate(
    _admin: AdminIdentity,
    service: Data<CandidateService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    service.admin_delete(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

/// Profile routes are plain resources so `/candidate/upload` can live
/// alongside them in the file handlers
pub fn candidate_config(config: &mut ServiceConfig) {
    config.service(get_profile).service(update_profile);
}

pub fn admin_candidate_config(config: &mut ServiceConfig) {
    config.service(
        scope("/candidates")
            .service(admin_list_candidates)
            .service(admin_get_candidate)
            .service(admin_update_candidate)
            .service(admin_delete_candidate),
    );
}
