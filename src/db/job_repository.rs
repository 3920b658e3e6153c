use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::db::models::{Job, JobChanges, JobQuery, NewJob};
use crate::db::{like_pattern, RepositoryError};

/// Storage of job listings
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &NewJob) -> Result<Job, RepositoryError>;

    async fn find(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;

    /// Newest first, filtered and paged by `query`
    async fn list(&self, query: &JobQuery) -> Result<Vec<Job>, RepositoryError>;

    /// Returns `None` when no job has this id
    async fn update(&self, id: Uuid, changes: &JobChanges) -> Result<Option<Job>, RepositoryError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

const JOB_COLUMNS: &str = "id, title, employer, field, location, salary, job_type, description, featured, posted_by, created_at, updated_at";

/// Repository for Job database operations
pub struct PgJobRepository {
    pool: Pool<Postgres>,
}

impl PgJobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn create(&self, job: &NewJob) -> Result<Job, RepositoryError> {
        debug!("Creating job: title={}, employer={}", job.title, job.employer);

        let sql = format!(
            r#"
            INSERT INTO jobs (id, title, employer, field, location, salary, job_type, description, featured, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {JOB_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Job>(&sql)
            .bind(Uuid::new_v4())
            .bind(&job.title)
            .bind(&job.employer)
            .bind(&job.field)
            .bind(&job.location)
            .bind(&job.salary)
            .bind(&job.job_type)
            .bind(&job.description)
            .bind(job.featured)
            .bind(job.posted_by)
            .fetch_one(&self.pool)
            .await?;

        debug!("Job created with id={}", row.id);
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, query: &JobQuery) -> Result<Vec<Job>, RepositoryError> {
        debug!("Listing jobs: {:?}", query);

        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE ($1::text IS NULL OR title ILIKE $1 OR field ILIKE $1)
              AND ($2::text IS NULL OR location ILIKE $2)
              AND ($3::text IS NULL OR title ILIKE $3 OR employer ILIKE $3 OR field ILIKE $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#
        );
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(query.title.as_deref().map(like_pattern))
            .bind(query.location.as_deref().map(like_pattern))
            .bind(query.q.as_deref().map(like_pattern))
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update(&self, id: Uuid, changes: &JobChanges) -> Result<Option<Job>, RepositoryError> {
        debug!("Updating job {}", id);

        let sql = format!(
            r#"
            UPDATE jobs SET
                title = COALESCE($2, title),
                employer = COALESCE($3, employer),
                field = COALESCE($4, field),
                location = COALESCE($5, location),
                salary = COALESCE($6, salary),
                job_type = COALESCE($7, job_type),
                description = COALESCE($8, description),
                featured = COALESCE($9, featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(changes.title.as_deref())
            .bind(changes.employer.as_deref())
            .bind(changes.field.as_deref())
            .bind(changes.location.as_deref())
            .bind(changes.salary.as_deref())
            .bind(changes.job_type.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.featured)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("Deleted job {}: {} rows", id, result.rows_affected());
        Ok(result.rows_affected() > 0)
    }
}
