use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::db::models::{Candidate, CandidateChanges, CandidateQuery, NewCandidate};
use crate::db::{like_pattern, RepositoryError};

/// Storage of candidate and admin accounts
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered
    async fn create(&self, candidate: &NewCandidate) -> Result<Candidate, RepositoryError>;

    async fn find(&self, id: Uuid) -> Result<Option<Candidate>, RepositoryError>;

    /// `email` must already be lower-cased
    async fn find_by_email(&self, email: &str) -> Result<Option<Candidate>, RepositoryError>;

    async fn list(&self, query: &CandidateQuery) -> Result<Vec<Candidate>, RepositoryError>;

    async fn update(
        &self,
        id: Uuid,
        changes: &CandidateChanges,
    ) -> Result<Option<Candidate>, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

const CANDIDATE_COLUMNS: &str = "id, name, email, phone, password_hash, role, notes, address, resume_file_id, passport_file_id, permit_file_id, created_at, updated_at";

/// Database representation of an account
#[derive(Debug, FromRow)]
struct CandidateRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    password_hash: String,
    role: String,
    notes: String,
    address: String,
    resume_file_id: Option<Uuid>,
    passport_file_id: Option<Uuid>,
    permit_file_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = RepositoryError;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        Ok(Candidate {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(RepositoryError::Corrupt)?,
            notes: row.notes,
            address: row.address,
            resume_file_id: row.resume_file_id,
            passport_file_id: row.passport_file_id,
            permit_file_id: row.permit_file_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgCandidateRepository {
    pool: Pool<Postgres>,
}

impl PgCandidateRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateRepository for PgCandidateRepository {
    async fn create(&self, candidate: &NewCandidate) -> Result<Candidate, RepositoryError> {
        debug!("Creating {} account for {}", candidate.role.as_str(), candidate.email);

        let sql = format!(
            r#"
            INSERT INTO candidates (id, name, email, phone, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CANDIDATE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&candidate.name)
            .bind(&candidate.email)
            .bind(&candidate.phone)
            .bind(&candidate.password_hash)
            .bind(candidate.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "email"))?;

        row.try_into()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Candidate>, RepositoryError> {
        let sql = format!("SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE id = $1");
        sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Candidate::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Candidate>, RepositoryError> {
        let sql = format!("SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE email = $1");
        sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(Candidate::try_from)
            .transpose()
    }

    async fn list(&self, query: &CandidateQuery) -> Result<Vec<Candidate>, RepositoryError> {
        debug!("Listing candidates: {:?}", query);

        let sql = format!(
            r#"
            SELECT {CANDIDATE_COLUMNS} FROM candidates
            WHERE role = 'candidate'
              AND ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1 OR phone ILIKE $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );
        sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(query.q.as_deref().map(like_pattern))
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Candidate::try_from)
            .collect()
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &CandidateChanges,
    ) -> Result<Option<Candidate>, RepositoryError> {
        debug!("Updating candidate {}", id);

        let sql = format!(
            r#"
            UPDATE candidates SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                notes = COALESCE($5, notes),
                address = COALESCE($6, address),
                resume_file_id = COALESCE($7, resume_file_id),
                passport_file_id = COALESCE($8, passport_file_id),
                permit_file_id = COALESCE($9, permit_file_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CANDIDATE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.email.as_deref())
            .bind(changes.phone.as_deref())
            .bind(changes.notes.as_deref())
            .bind(changes.address.as_deref())
            .bind(changes.resume_file_id)
            .bind(changes.passport_file_id)
            .bind(changes.permit_file_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "email"))?
            .map(Candidate::try_from)
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
