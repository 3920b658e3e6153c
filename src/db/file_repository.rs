use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::db::models::FileRecord;
use crate::db::RepositoryError;

/// Storage of uploaded document metadata. The bytes live in the blob store.
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create(&self, record: &FileRecord) -> Result<FileRecord, RepositoryError>;

    async fn find(&self, id: Uuid) -> Result<Option<FileRecord>, RepositoryError>;

    /// Records for whichever of `ids` exist, in no particular order
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<FileRecord>, RepositoryError>;
}

const FILE_COLUMNS: &str = "id, filename, original_name, field, uploader_id, size, mime_type, uploaded_at";

pub struct PgFileRepository {
    pool: Pool<Postgres>,
}

impl PgFileRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn create(&self, record: &FileRecord) -> Result<FileRecord, RepositoryError> {
        debug!(
            "Recording file {} ({}, {} bytes, field={})",
            record.id, record.original_name, record.size, record.field
        );

        let sql = format!(
            r#"
            INSERT INTO files (id, filename, original_name, field, uploader_id, size, mime_type, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {FILE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, FileRecord>(&sql)
            .bind(record.id)
            .bind(&record.filename)
            .bind(&record.original_name)
            .bind(&record.field)
            .bind(record.uploader_id)
            .bind(record.size)
            .bind(&record.mime_type)
            .bind(record.uploaded_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "file"))
    }

    async fn find(&self, id: Uuid) -> Result<Option<FileRecord>, RepositoryError> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1");
        Ok(sqlx::query_as::<_, FileRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<FileRecord>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, FileRecord>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }
}
