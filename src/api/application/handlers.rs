use actix_web::{
    get, patch, post, put,
    web::{self, Data, Path, Query, ServiceConfig, scope},
    HttpResponse,
};
use actix_web_validator::Json;
use serde_json::json;
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::api::identity::{AdminIdentity, Identity};
use super::dto::{
    ApplicationCreatedResponse, ApplicationListResponse, ApplicationResponse, BulkUpdateResponse,
    NoteAddedResponse,
};
use super::models::{
    AdminApplicationSearch, BulkStatusUpdate, NoteRequest, PatchApplication, StatusUpdate,
    SubmitApplication,
};
use super::service::ApplicationService;

/// Mounted at both `/applications` and `/apply`
async fn submit_application(
    identity: Option<Identity>,
    service: Data<ApplicationService>,
    request: Json<SubmitApplication>,
) -> Result<HttpResponse, ServiceError> {
    let application = service.submit(identity.as_ref(), request.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApplicationCreatedResponse { ok: true, id: application.id }))
}

#[get("/mine")]
async fn my_applications(
    identity: Identity,
    service: Data<ApplicationService>,
) -> Result<HttpResponse, ServiceError> {
    let applications = service.mine(&identity).await?;
    Ok(HttpResponse::Ok().json(ApplicationListResponse { applications }))
}

#[get("/{id}")]
async fn get_application(
    identity: Identity,
    service: Data<ApplicationService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let application = service.get(&identity, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApplicationResponse { application }))
}

#[patch("/{id}")]
async fn patch_application(
    identity: Identity,
    service: Data<ApplicationService>,
    id: Path<Uuid>,
    request: Json<PatchApplication>,
) -> Result<HttpResponse, ServiceError> {
    let application = service.patch(&identity, id.into_inner(), request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "application": application })))
}

#[get("")]
async fn admin_list_applications(
    _admin: AdminIdentity,
    service: Data<ApplicationService>,
    search: Query<AdminApplicationSearch>,
) -> Result<HttpResponse, ServiceError> {
    let applications = service.admin_list(&search).await?;
    Ok(HttpResponse::Ok().json(ApplicationListResponse { applications }))
}

#[post("")]
async fn admin_bulk_status(
    _admin: AdminIdentity,
    service: Data<ApplicationService>,
    request: Json<BulkStatusUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let updated = service.set_status_many(&request.ids, &request.status).await?;
    Ok(HttpResponse::Ok().json(BulkUpdateResponse { ok: true, updated }))
}

#[get("/{id}")]
async fn admin_get_application(
    _admin: AdminIdentity,
    service: Data<ApplicationService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let application = service.admin_get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApplicationResponse { application }))
}

#[put("/{id}")]
async fn admin_update_application(
    _admin: AdminIdentity,
    service: Data<ApplicationService>,
    id: Path<Uuid>,
    request: Json<StatusUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let application = service.set_status(id.into_inner(), &request.status).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "application": application })))
}

#[post("/{id}/notes")]
async fn admin_add_note(
    AdminIdentity(admin): AdminIdentity,
    service: Data<ApplicationService>,
    id: Path<Uuid>,
    request: Json<NoteRequest>,
) -> Result<HttpResponse, ServiceError> {
    let note = service.add_note(&admin, id.into_inner(), &request.note).await?;
    Ok(HttpResponse::Created().json(NoteAddedResponse { ok: true, note }))
}

pub fn application_config(config: &mut ServiceConfig) {
    config
        .service(web::resource("/apply").route(web::post().to(submit_application)))
        .service(
            scope("/applications")
                .route("", web::post().to(submit_application))
                // before /{id} so "mine" is not parsed as an id
                .service(my_applications)
                .service(get_application)
                .service(patch_application),
        );
}

pub fn admin_application_config(config: &mut ServiceConfig) {
    config.service(
        scope("/applications")
            .service(admin_list_applications)
            .service(admin_bulk_status)
            .service(admin_get_application)
            .service(admin_update_application)
            .service(admin_add_note),
    );
}
