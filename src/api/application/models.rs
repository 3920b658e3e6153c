use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// A file reference as sent by the client; the server fills in the names
#[derive(Debug, Clone, Deserialize)]
pub struct FileReferenceInput {
    pub id: Uuid,
    pub field: Option<String>,
}

/// Body of `POST /applications`. Contact fields are only required from
/// anonymous applicants.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplication {
    pub job_id: Option<Uuid>,
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 10000, message = "Message must be at most 10000 characters"))]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Vec<FileReferenceInput>,
}

/// Owners may send message/phone/email, admins may send status
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PatchApplication {
    #[validate(length(max = 10000, message = "Message must be at most 10000 characters"))]
    pub message: Option<String>,
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusUpdate {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkStatusUpdate {
    #[validate(length(min = 1, message = "At least one id is required"))]
    pub ids: Vec<Uuid>,
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NoteRequest {
    #[validate(length(min = 1, max = 5000, message = "Note must be between 1 and 5000 characters"))]
    pub note: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminApplicationSearch {
    pub status: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}
