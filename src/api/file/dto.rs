use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::FileRecord;

/// One entry of the upload response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub field: String,
}

impl From<FileRecord> for UploadedFile {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            original_name: record.original_name,
            field: record.field,
        }
    }
}
