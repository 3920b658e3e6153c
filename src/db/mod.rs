pub mod application_repository;
pub mod candidate_repository;
pub mod connection;
pub mod file_repository;
pub mod job_repository;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod migrations;
pub mod models;

use std::sync::Arc;

use sqlx::{Pool, Postgres};
use thiserror::Error;

pub use application_repository::{ApplicationRepository, PgApplicationRepository};
pub use candidate_repository::{CandidateRepository, PgCandidateRepository};
pub use file_repository::{FileRepository, PgFileRepository};
pub use job_repository::{JobRepository, PgJobRepository};

/// Errors surfaced by the repositories
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected the write
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value could not be mapped back into its model
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into `Conflict`
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return RepositoryError::Conflict(format!("{} already exists", what));
            }
        }
        RepositoryError::Database(err)
    }
}

/// Escape `%`, `_` and `\` so user input is matched literally inside ILIKE
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// The full set of repositories handed to the services
#[derive(Clone)]
pub struct Repositories {
    pub jobs: Arc<dyn JobRepository>,
    pub candidates: Arc<dyn CandidateRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub files: Arc<dyn FileRepository>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL, sharing one pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            jobs: Arc::new(PgJobRepository::new(pool.clone())),
            candidates: Arc::new(PgCandidateRepository::new(pool.clone())),
            applications: Arc::new(PgApplicationRepository::new(pool.clone())),
            files: Arc::new(PgFileRepository::new(pool)),
        }
    }

    /// Process-local repositories with no database behind them
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryDatabase::default());
        Self {
            jobs: store.clone(),
            candidates: store.clone(),
            applications: store.clone(),
            files: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("nurse"), "%nurse%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }
}
