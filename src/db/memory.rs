//! Process-local repositories.
//!
//! Backs the integration tests and lets the HTTP surface run without a
//! PostgreSQL instance. Rows live in insertion order; listings walk them
//! newest first, mirroring the `ORDER BY created_at DESC` of the SQL side.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::db::models::{
    Application, ApplicationChanges, ApplicationNote, ApplicationQuery, ApplicationStatus,
    Candidate, CandidateChanges, CandidateQuery, FileRecord, Job, JobChanges, JobQuery,
    NewApplication, NewCandidate, NewJob, Role,
};
use crate::db::{
    ApplicationRepository, CandidateRepository, FileRepository, JobRepository, RepositoryError,
};

#[derive(Default)]
struct Tables {
    jobs: Vec<Job>,
    candidates: Vec<Candidate>,
    applications: Vec<Application>,
    files: Vec<FileRecord>,
}

#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A poisoned lock only means another test thread panicked mid-write
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn page<T>(rows: impl Iterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
    rows.skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl JobRepository for MemoryDatabase {
    async fn create(&self, job: &NewJob) -> Result<Job, RepositoryError> {
        let now = Utc::now();
        let row = Job {
            id: Uuid::new_v4(),
            title: job.title.clone(),
            employer: job.employer.clone(),
            field: job.field.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
            job_type: job.job_type.clone(),
            description: job.description.clone(),
            featured: job.featured,
            posted_by: job.posted_by,
            created_at: now,
            updated_at: now,
        };
        self.tables().jobs.push(row.clone());
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        Ok(self.tables().jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list(&self, query: &JobQuery) -> Result<Vec<Job>, RepositoryError> {
        let tables = self.tables();
        let rows = tables.jobs.iter().rev().filter(|j| {
            query
                .title
                .as_deref()
                .map_or(true, |t| contains(&j.title, t) || contains(&j.field, t))
                && query
                    .location
                    .as_deref()
                    .map_or(true, |l| contains(&j.location, l))
                && query.q.as_deref().map_or(true, |q| {
                    contains(&j.title, q) || contains(&j.employer, q) || contains(&j.field, q)
                })
        });
        Ok(page(rows.cloned(), query.limit, query.offset))
    }

    async fn update(&self, id: Uuid, changes: &JobChanges) -> Result<Option<Job>, RepositoryError> {
        let mut tables = self.tables();
        let Some(job) = tables.jobs.iter_mut().find(|j| j.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.title {
            job.title = v.clone();
        }
        if let Some(v) = &changes.employer {
            job.employer = v.clone();
        }
        if let Some(v) = &changes.field {
            job.field = v.clone();
        }
        if let Some(v) = &changes.location {
            job.location = v.clone();
        }
        if let Some(v) = &changes.salary {
            job.salary = v.clone();
        }
        if let Some(v) = &changes.job_type {
            job.job_type = v.clone();
        }
        if let Some(v) = &changes.description {
            job.description = v.clone();
        }
        if let Some(v) = changes.featured {
            job.featured = v;
        }
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        let before = tables.jobs.len();
        tables.jobs.retain(|j| j.id != id);
        Ok(tables.jobs.len() != before)
    }
}

#[async_trait]
impl CandidateRepository for MemoryDatabase {
    async fn create(&self, candidate: &NewCandidate) -> Result<Candidate, RepositoryError> {
        let mut tables = self.tables();
        if tables.candidates.iter().any(|c| c.email == candidate.email) {
            return Err(RepositoryError::Conflict("email already exists".to_string()));
        }
        let now = Utc::now();
        let row = Candidate {
            id: Uuid::new_v4(),
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
            password_hash: candidate.password_hash.clone(),
            role: candidate.role,
            notes: String::new(),
            address: String::new(),
            resume_file_id: None,
            passport_file_id: None,
            permit_file_id: None,
            created_at: now,
            updated_at: now,
        };
        tables.candidates.push(row.clone());
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Candidate>, RepositoryError> {
        Ok(self.tables().candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Candidate>, RepositoryError> {
        Ok(self
            .tables()
            .candidates
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn list(&self, query: &CandidateQuery) -> Result<Vec<Candidate>, RepositoryError> {
        let tables = self.tables();
        let rows = tables.candidates.iter().rev().filter(|c| {
            c.role == Role::Candidate
                && query.q.as_deref().map_or(true, |q| {
                    contains(&c.name, q) || contains(&c.email, q) || contains(&c.phone, q)
                })
        });
        Ok(page(rows.cloned(), query.limit, query.offset))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &CandidateChanges,
    ) -> Result<Option<Candidate>, RepositoryError> {
        let mut tables = self.tables();
        if let Some(email) = &changes.email {
            if tables.candidates.iter().any(|c| c.id != id && &c.email == email) {
                return Err(RepositoryError::Conflict("email already exists".to_string()));
            }
        }
        let Some(candidate) = tables.candidates.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.name {
            candidate.name = v.clone();
        }
        if let Some(v) = &changes.email {
            candidate.email = v.clone();
        }
        if let Some(v) = &changes.phone {
            candidate.phone = v.clone();
        }
        if let Some(v) = &changes.notes {
            candidate.notes = v.clone();
        }
        if let Some(v) = &changes.address {
            candidate.address = v.clone();
        }
        if let Some(v) = changes.resume_file_id {
            candidate.resume_file_id = Some(v);
        }
        if let Some(v) = changes.passport_file_id {
            candidate.passport_file_id = Some(v);
        }
        if let Some(v) = changes.permit_file_id {
            candidate.permit_file_id = Some(v);
        }
        candidate.updated_at = Utc::now();
        Ok(Some(candidate.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        let before = tables.candidates.len();
        tables.candidates.retain(|c| c.id != id);
        Ok(tables.candidates.len() != before)
    }
}

#[async_trait]
impl ApplicationRepository for MemoryDatabase {
    async fn create(&self, application: &NewApplication) -> Result<Application, RepositoryError> {
        let now = Utc::now();
        let row = Application {
            id: Uuid::new_v4(),
            job_id: application.job_id,
            job_title: application.job_title.clone(),
            job_employer: application.job_employer.clone(),
            candidate_id: application.candidate_id,
            name: application.name.clone(),
            email: application.email.clone(),
            phone: application.phone.clone(),
            message: application.message.clone(),
            status: ApplicationStatus::Applied,
            files: application.files.clone(),
            notes: Vec::new(),
            job_removed: false,
            candidate_removed: false,
            created_at: now,
            updated_at: now,
        };
        self.tables().applications.push(row.clone());
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Application>, RepositoryError> {
        Ok(self
            .tables()
            .applications
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list(&self, query: &ApplicationQuery) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.tables();
        let rows = tables.applications.iter().rev().filter(|a| {
            query.status.map_or(true, |s| a.status == s)
                && query.candidate_id.map_or(true, |c| a.candidate_id == Some(c))
                && query.q.as_deref().map_or(true, |q| {
                    contains(&a.name, q) || contains(&a.email, q) || contains(&a.job_title, q)
                })
        });
        Ok(page(rows.cloned(), query.limit, query.offset))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ApplicationChanges,
    ) -> Result<Option<Application>, RepositoryError> {
        let mut tables = self.tables();
        let Some(application) = tables.applications.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.message {
            application.message = v.clone();
        }
        if let Some(v) = &changes.phone {
            application.phone = v.clone();
        }
        if let Some(v) = &changes.email {
            application.email = v.clone();
        }
        if let Some(v) = changes.status {
            application.status = v;
        }
        application.updated_at = Utc::now();
        Ok(Some(application.clone()))
    }

    async fn set_status_many(
        &self,
        ids: &[Uuid],
        status: ApplicationStatus,
    ) -> Result<u64, RepositoryError> {
        let mut tables = self.tables();
        let mut updated = 0;
        for application in tables.applications.iter_mut().filter(|a| ids.contains(&a.id)) {
            application.status = status;
            application.updated_at = Utc::now();
            updated += 1;
        }
        Ok(updated)
    }

    async fn add_note(&self, id: Uuid, note: &ApplicationNote) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        match tables.applications.iter_mut().find(|a| a.id == id) {
            Some(application) => {
                application.notes.push(note.clone());
                application.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_job_removed(&self, job_id: Uuid) -> Result<u64, RepositoryError> {
        let mut tables = self.tables();
        let mut updated = 0;
        for application in tables.applications.iter_mut().filter(|a| a.job_id == job_id) {
            application.job_removed = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn mark_candidate_removed(&self, candidate_id: Uuid) -> Result<u64, RepositoryError> {
        let mut tables = self.tables();
        let mut updated = 0;
        for application in tables
            .applications
            .iter_mut()
            .filter(|a| a.candidate_id == Some(candidate_id))
        {
            application.candidate_removed = true;
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl FileRepository for MemoryDatabase {
    async fn create(&self, record: &FileRecord) -> Result<FileRecord, RepositoryError> {
        let mut tables = self.tables();
        if tables.files.iter().any(|f| f.id == record.id) {
            return Err(RepositoryError::Conflict("file already exists".to_string()));
        }
        tables.files.push(record.clone());
        Ok(record.clone())
    }

    async fn find(&self, id: Uuid) -> Result<Option<FileRecord>, RepositoryError> {
        Ok(self.tables().files.iter().find(|f| f.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<FileRecord>, RepositoryError> {
        Ok(self
            .tables()
            .files
            .iter()
            .filter(|f| ids.contains(&f.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_job(title: &str, field: &str, location: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            employer: "Maple Foods".to_string(),
            field: field.to_string(),
            location: location.to_string(),
            ..NewJob::default()
        }
    }

    #[actix_web::test]
    async fn job_list_filters_and_orders_newest_first() {
        let db = MemoryDatabase::default();
        JobRepository::create(&db, &new_job("Line Cook", "Hospitality", "Toronto, ON")).await.unwrap();
        JobRepository::create(&db, &new_job("Welder", "Trades", "Calgary, AB")).await.unwrap();
        JobRepository::create(&db, &new_job("Sous Chef", "Hospitality", "Toronto, ON")).await.unwrap();

        let all = JobRepository::list(&db, &JobQuery { limit: 10, ..JobQuery::default() })
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].title, "Sous Chef");

        let hospitality = JobRepository::list(
            &db,
            &JobQuery {
                title: Some("hospitality".into()),
                location: Some("toronto".into()),
                limit: 10,
                ..JobQuery::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(hospitality.len(), 2);

        let paged = JobRepository::list(&db, &JobQuery { limit: 1, offset: 1, ..JobQuery::default() })
            .await
            .unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].title, "Welder");
    }

    #[actix_web::test]
    async fn duplicate_email_is_a_conflict() {
        let db = MemoryDatabase::default();
        let candidate = NewCandidate {
            name: "Ada".into(),
            email: "ada@example.ca".into(),
            phone: String::new(),
            password_hash: "hash".into(),
            role: Role::Candidate,
        };
        CandidateRepository::create(&db, &candidate).await.unwrap();
        let err = CandidateRepository::create(&db, &candidate).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[actix_web::test]
    async fn bulk_status_only_touches_listed_ids() {
        let db = MemoryDatabase::default();
        let new = NewApplication {
            job_id: Uuid::new_v4(),
            job_title: "Welder".into(),
            job_employer: "Maple Foods".into(),
            candidate_id: None,
            name: "Ada".into(),
            email: "ada@example.ca".into(),
            phone: String::new(),
            message: String::new(),
            files: Vec::new(),
        };
        let first = ApplicationRepository::create(&db, &new).await.unwrap();
        let second = ApplicationRepository::create(&db, &new).await.unwrap();

        let updated = db
            .set_status_many(&[first.id, Uuid::new_v4()], ApplicationStatus::Interview)
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let second = ApplicationRepository::find(&db, second.id).await.unwrap().unwrap();
        assert_eq!(second.status, ApplicationStatus::Applied);
    }
}
