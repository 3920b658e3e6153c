use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{Application, ApplicationNote};

#[derive(Serialize)]
pub struct ApplicationResponse {
    pub application: Application,
}

#[derive(Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<Application>,
}

#[derive(Serialize, Deserialize)]
pub struct ApplicationCreatedResponse {
    pub ok: bool,
    pub id: Uuid,
}

#[derive(Serialize, Deserialize)]
pub struct BulkUpdateResponse {
    pub ok: bool,
    pub updated: u64,
}

#[derive(Serialize)]
pub struct NoteAddedResponse {
    pub ok: bool,
    pub note: ApplicationNote,
}
