use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::api::identity::Identity;
use crate::db::models::FileRecord;
use crate::db::FileRepository;
use crate::storage::{BlobStore, StoredBlob};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file part read from an upload request
#[derive(Debug)]
pub struct IncomingFile {
    pub field: String,
    pub original_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// An authorized download: the metadata record and the blob body
pub struct OpenedFile {
    pub record: FileRecord,
    pub blob: StoredBlob,
}

impl OpenedFile {
    pub fn content_type(&self) -> &str {
        if !self.record.mime_type.is_empty() {
            return &self.record.mime_type;
        }
        self.blob
            .content_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
    }
}

/// Stores uploaded documents and decides who may read them back
pub struct FileService {
    files: Arc<dyn FileRepository>,
    blobs: Arc<dyn BlobStore>,
    max_upload_size: usize,
}

impl FileService {
    pub fn new(files: Arc<dyn FileRepository>, blobs: Arc<dyn BlobStore>, max_upload_size: usize) -> Self {
        Self { files, blobs, max_upload_size }
    }

    /// Largest accepted file, in bytes
    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }

    /// Write the bytes to the blob store, then record the metadata under the
    /// identifier the store assigned. A failed metadata write leaves the blob
    /// orphaned.
    pub async fn store(
        &self,
        uploader: Option<&Identity>,
        upload: IncomingFile,
    ) -> Result<FileRecord, ServiceError> {
        if upload.data.len() > self.max_upload_size {
            return Err(ServiceError::validation(format!(
                "File exceeds maximum size of {} bytes",
                self.max_upload_size
            )));
        }

        let mime_type = upload
            .content_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
        let size = upload.data.len() as i64;

        let id = self.blobs.put(upload.data, &mime_type).await?;

        let record = FileRecord {
            id,
            filename: stored_filename(&upload.original_name),
            original_name: upload.original_name,
            field: upload.field,
            uploader_id: uploader.map(|u| u.id),
            size,
            mime_type,
            uploaded_at: Utc::now(),
        };
        let record = self.files.create(&record).await.map_err(|e| {
            error!("Service: Blob {} stored but metadata write failed", id);
            ServiceError::from(e)
        })?;

        info!(
            "Service: Stored file {} field={} size={} uploader={:?}",
            record.id, record.field, record.size, record.uploader_id
        );
        Ok(record)
    }

    /// Open a file for download. Only admins and the uploader may read a
    /// file; every other caller gets the same 403 whether or not it exists.
    pub async fn open(&self, requester: Option<&Identity>, id: Uuid) -> Result<OpenedFile, ServiceError> {
        let is_admin = requester.is_some_and(Identity::is_admin);
        let record = self.files.find(id).await?;

        let record = match record {
            Some(record) if is_admin || owns(requester, &record) => record,
            None if is_admin => return Err(ServiceError::not_found("File")),
            _ => {
                warn!("Service: File {} denied to {:?}", id, requester.map(|r| r.id));
                return Err(ServiceError::Forbidden);
            }
        };

        let Some(blob) = self.blobs.get(record.id).await? else {
            error!("Service: File record {} has no blob", record.id);
            return Err(ServiceError::not_found("File"));
        };

        Ok(OpenedFile { record, blob })
    }
}

fn owns(requester: Option<&Identity>, record: &FileRecord) -> bool {
    match (requester, record.uploader_id) {
        (Some(requester), Some(uploader)) => requester.id == uploader,
        _ => false,
    }
}

/// Store-side name: the last path component of the client name with anything
/// outside `[A-Za-z0-9._-]` replaced
pub fn stored_filename(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Role;
    use crate::db::Repositories;
    use crate::storage::MemoryBlobStore;

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "someone@example.ca".into(),
            name: "Someone".into(),
            role,
        }
    }

    fn incoming(name: &str, data: &'static [u8]) -> IncomingFile {
        IncomingFile {
            field: "resume".into(),
            original_name: name.into(),
            content_type: Some("application/pdf".into()),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn stored_filename_strips_paths_and_odd_characters() {
        assert_eq!(stored_filename("C:\\docs\\my cv.pdf"), "my_cv.pdf");
        assert_eq!(stored_filename("../../etc/passwd"), "passwd");
        assert_eq!(stored_filename(".."), "file");
        assert_eq!(stored_filename("résumé.pdf"), "r_sum_.pdf");
    }

    #[actix_web::test]
    async fn oversized_file_is_rejected_before_storage() {
        let blobs = Arc::new(MemoryBlobStore::default());
        let service = FileService::new(Repositories::in_memory().files, blobs.clone(), 4);
        let err = service.store(None, incoming("cv.pdf", b"12345")).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
        assert!(blobs.is_empty());
    }

    #[actix_web::test]
    async fn only_uploader_and_admin_can_open() {
        let blobs = Arc::new(MemoryBlobStore::default());
        let service = FileService::new(Repositories::in_memory().files, blobs, 1024);
        let owner = identity(Role::Candidate);
        let record = service.store(Some(&owner), incoming("cv.pdf", b"%PDF")).await.unwrap();

        assert!(service.open(Some(&owner), record.id).await.is_ok());
        assert!(service.open(Some(&identity(Role::Admin)), record.id).await.is_ok());

        let stranger = identity(Role::Candidate);
        let err = service.open(Some(&stranger), record.id).await.err().unwrap();
        assert!(matches!(err, ServiceError::Forbidden));
        let err = service.open(None, record.id).await.err().unwrap();
        assert!(matches!(err, ServiceError::Forbidden));
    }

    #[actix_web::test]
    async fn missing_file_is_404_for_admin_and_403_for_others() {
        let service = FileService::new(
            Repositories::in_memory().files,
            Arc::new(MemoryBlobStore::default()),
            1024,
        );
        let id = Uuid::new_v4();
        let err = service.open(Some(&identity(Role::Admin)), id).await.err().unwrap();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = service.open(Some(&identity(Role::Candidate)), id).await.err().unwrap();
        assert!(matches!(err, ServiceError::Forbidden));
    }

    #[actix_web::test]
    async fn blob_failure_is_a_storage_error() {
        let blobs = Arc::new(MemoryBlobStore::default());
        blobs.fail_writes(true);
        let service = FileService::new(Repositories::in_memory().files, blobs, 1024);

        let err = service.store(None, incoming("cv.pdf", b"%PDF")).await.unwrap_err();
        assert!(matches!(err, ServiceError::StorageError(_)));
    }
}
