use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::db::models::{
    Application, ApplicationChanges, ApplicationNote, ApplicationQuery, ApplicationStatus,
    FileReference, NewApplication,
};
use crate::db::{like_pattern, RepositoryError};

/// Storage of job applications
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// New applications always start as `Applied`
    async fn create(&self, application: &NewApplication) -> Result<Application, RepositoryError>;

    async fn find(&self, id: Uuid) -> Result<Option<Application>, RepositoryError>;

    /// Newest first, filtered and paged by `query`
    async fn list(&self, query: &ApplicationQuery) -> Result<Vec<Application>, RepositoryError>;

    async fn update(
        &self,
        id: Uuid,
        changes: &ApplicationChanges,
    ) -> Result<Option<Application>, RepositoryError>;

    /// Returns the number of applications whose status was set
    async fn set_status_many(
        &self,
        ids: &[Uuid],
        status: ApplicationStatus,
    ) -> Result<u64, RepositoryError>;

    /// Returns `false` when no application has this id
    async fn add_note(&self, id: Uuid, note: &ApplicationNote) -> Result<bool, RepositoryError>;

    async fn mark_job_removed(&self, job_id: Uuid) -> Result<u64, RepositoryError>;

    async fn mark_candidate_removed(&self, candidate_id: Uuid) -> Result<u64, RepositoryError>;
}

const APPLICATION_COLUMNS: &str = "id, job_id, job_title, job_employer, candidate_id, name, email, phone, message, status, files, notes, job_removed, candidate_removed, created_at, updated_at";

/// Database representation of an application
#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    job_title: String,
    job_employer: String,
    candidate_id: Option<Uuid>,
    name: String,
    email: String,
    phone: String,
    message: String,
    status: String,
    files: Json<Vec<FileReference>>,
    notes: Json<Vec<ApplicationNote>>,
    job_removed: bool,
    candidate_removed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = RepositoryError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: row.id,
            job_id: row.job_id,
            job_title: row.job_title,
            job_employer: row.job_employer,
            candidate_id: row.candidate_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            message: row.message,
            status: row.status.parse().map_err(RepositoryError::Corrupt)?,
            files: row.files.0,
            notes: row.notes.0,
            job_removed: row.job_removed,
            candidate_removed: row.candidate_removed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_applications(rows: Vec<ApplicationRow>) -> Result<Vec<Application>, RepositoryError> {
    rows.into_iter().map(Application::try_from).collect()
}

pub struct PgApplicationRepository {
    pool: Pool<Postgres>,
}

impl PgApplicationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn create(&self, application: &NewApplication) -> Result<Application, RepositoryError> {
        debug!(
            "Creating application for job={} candidate={:?} with {} files",
            application.job_id,
            application.candidate_id,
            application.files.len()
        );

        let sql = format!(
            r#"
            INSERT INTO applications
                (id, job_id, job_title, job_employer, candidate_id, name, email, phone, message, status, files)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {APPLICATION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(application.job_id)
            .bind(&application.job_title)
            .bind(&application.job_employer)
            .bind(application.candidate_id)
            .bind(&application.name)
            .bind(&application.email)
            .bind(&application.phone)
            .bind(&application.message)
            .bind(ApplicationStatus::Applied.as_str())
            .bind(Json(&application.files))
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Application>, RepositoryError> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1");
        sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Application::try_from)
            .transpose()
    }

    async fn list(&self, query: &ApplicationQuery) -> Result<Vec<Application>, RepositoryError> {
        debug!("Listing applications: {:?}", query);

        let sql = format!(
            r#"
            SELECT {APPLICATION_COLUMNS} FROM applications
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR candidate_id = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR email ILIKE $3 OR job_title ILIKE $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(query.status.map(|s| s.as_str()))
            .bind(query.candidate_id)
            .bind(query.q.as_deref().map(like_pattern))
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        into_applications(rows)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ApplicationChanges,
    ) -> Result<Option<Application>, RepositoryError> {
        debug!("Updating application {}", id);

        let sql = format!(
            r#"
            UPDATE applications SET
                message = COALESCE($2, message),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        );
        sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .bind(changes.message.as_deref())
            .bind(changes.phone.as_deref())
            .bind(changes.email.as_deref())
            .bind(changes.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?
            .map(Application::try_from)
            .transpose()
    }

    async fn set_status_many(
        &self,
        ids: &[Uuid],
        status: ApplicationStatus,
    ) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            debug!("Bulk status update called with empty id list");
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE applications SET status = $1, updated_at = NOW() WHERE id = ANY($2)",
        )
        .bind(status.as_str())
        .bind(ids)
        .execute(&self.pool)
        .await?;

        debug!("Bulk status update to {}: {} rows", status, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn add_note(&self, id: Uuid, note: &ApplicationNote) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE applications SET notes = notes || $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(Json(vec![note]))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_job_removed(&self, job_id: Uuid) -> Result<u64, RepositoryError> {
        let result = sqlx::query("UPDATE applications SET job_removed = TRUE WHERE job_id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn mark_candidate_removed(&self, candidate_id: Uuid) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("UPDATE applications SET candidate_removed = TRUE WHERE candidate_id = $1")
                .bind(candidate_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
