use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::api::identity::Identity;
use crate::api::pagination::{non_blank, Paging};
use crate::db::models::{
    Application, ApplicationQuery, Candidate, CandidateChanges, CandidateQuery, FileReference, Role,
};
use crate::db::{ApplicationRepository, CandidateRepository, FileRepository};
use super::models::{AdminUpdateCandidate, CandidateSearch, Profile, UpdateProfile};

const ADMIN_DEFAULT_LIMIT: i64 = 50;
const ADMIN_MAX_LIMIT: i64 = 500;
const HISTORY_LIMIT: i64 = 500;

/// Candidate self-service and account management for admins
pub struct CandidateService {
    candidates: Arc<dyn CandidateRepository>,
    applications: Arc<dyn ApplicationRepository>,
    files: Arc<dyn FileRepository>,
}

impl CandidateService {
    pub fn new(
        candidates: Arc<dyn CandidateRepository>,
        applications: Arc<dyn ApplicationRepository>,
        files: Arc<dyn FileRepository>,
    ) -> Self {
        Self { candidates, applications, files }
    }

    async fn applications_of(&self, candidate_id: Uuid) -> Result<Vec<Application>, ServiceError> {
        let query = ApplicationQuery {
            candidate_id: Some(candidate_id),
            limit: HISTORY_LIMIT,
            ..ApplicationQuery::default()
        };
        Ok(self.applications.list(&query).await?)
    }

    async fn build_profile(&self, candidate: Candidate) -> Result<Profile, ServiceError> {
        let mut files: Vec<FileReference> = Vec::new();
        for application in self.applications_of(candidate.id).await? {
            for reference in application.files {
                if !files.iter().any(|f| f.id == reference.id) {
                    files.push(reference);
                }
            }
        }

        Ok(Profile {
            name: candidate.name,
            email: candidate.email,
            phone: candidate.phone,
            resume_file_id: candidate.resume_file_id,
            passport_file_id: candidate.passport_file_id,
            permit_file_id: candidate.permit_file_id,
            files,
        })
    }

    pub async fn profile(&self, identity: &Identity) -> Result<Profile, ServiceError> {
        let candidate = self
            .candidates
            .find(identity.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Candidate"))?;
        self.build_profile(candidate).await
    }

    /// Document pointers must name files the candidate uploaded
    pub async fn update_profile(
        &self,
        identity: &Identity,
        request: UpdateProfile,
    ) -> Result<Profile, ServiceError> {
        let changes = CandidateChanges {
            name: request.name.map(|n| n.trim().to_string()),
            phone: request.phone.map(|p| p.trim().to_string()),
            resume_file_id: request.resume_file_id,
            passport_file_id: request.passport_file_id,
            permit_file_id: request.permit_file_id,
            ..CandidateChanges::default()
        };
        if changes.is_empty() {
            return Err(ServiceError::validation("No fields to update"));
        }
        if changes.name.as_deref() == Some("") {
            return Err(ServiceError::validation("Name cannot be blank"));
        }

        let pointers: Vec<Uuid> = [changes.resume_file_id, changes.passport_file_id, changes.permit_file_id]
            .into_iter()
            .flatten()
            .collect();
        if !pointers.is_empty() {
            let owned = self.files.find_many(&pointers).await?;
            let all_owned = pointers.iter().all(|id| {
                owned
                    .iter()
                    .any(|f| f.id == *id && f.uploader_id == Some(identity.id))
            });
            if !all_owned {
                warn!("Service: Candidate {} pointed profile at foreign files", identity.id);
                return Err(ServiceError::validation("Unknown file reference"));
            }
        }

        let candidate = self
            .candidates
            .update(identity.id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Candidate"))?;
        info!("Service: Candidate {} updated their profile", candidate.id);
        self.build_profile(candidate).await
    }

    pub async fn admin_list(&self, search: &CandidateSearch) -> Result<Vec<Candidate>, ServiceError> {
        let paging = Paging { limit: search.limit, page: search.page };
        let (limit, offset) = paging.resolve(ADMIN_DEFAULT_LIMIT, ADMIN_MAX_LIMIT);
        let query = CandidateQuery { q: non_blank(&search.q), limit, offset };
        Ok(self.candidates.list(&query).await?)
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Candidate, ServiceError> {
        self.candidates
            .find(id)
            .await?
            .filter(|c| c.role == Role::Candidate)
            .ok_or_else(|| ServiceError::not_found("Candidate"))
    }

    pub async fn admin_get(&self, id: Uuid) -> Result<(Candidate, Vec<Application>), ServiceError> {
        let candidate = self.find_candidate(id).await?;
        let applications = self.applications_of(id).await?;
        Ok((candidate, applications))
    }

    pub async fn admin_update(
        &self,
        id: Uuid,
        request: AdminUpdateCandidate,
    ) -> Result<Candidate, ServiceError> {
        let changes = CandidateChanges {
            name: request.name.map(|n| n.trim().to_string()),
            email: request.email.map(|e| e.trim().to_lowercase()),
            phone: request.phone,
            notes: request.notes,
            address: request.address,
            ..CandidateChanges::default()
        };
        if changes.is_empty() {
            return Err(ServiceError::validation("No fields to update"));
        }
        self.find_candidate(id).await?;

        info!("Service: Admin updating candidate {}", id);
        self.candidates
            .update(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Candidate"))
    }

    /// Remove the account; its applications stay and are flagged
    pub async fn admin_delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.find_candidate(id).await?;
        if !self.candidates.delete(id).await? {
            return Err(ServiceError::not_found("Candidate"));
        }
        let flagged = self.applications.mark_candidate_removed(id).await?;
        info!("Service: Candidate {} deleted, {} applications flagged", id, flagged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::db::models::{FileRecord, NewApplication, NewCandidate};
    use crate::db::Repositories;

    async fn candidate(repos: &Repositories, email: &str) -> Identity {
        let account = repos
            .candidates
            .create(&NewCandidate {
                name: "Riley".into(),
                email: email.into(),
                phone: "204-555-0101".into(),
                password_hash: String::new(),
                role: Role::Candidate,
            })
            .await
            .unwrap();
        Identity { id: account.id, email: account.email, name: account.name, role: Role::Candidate }
    }

    async fn file(repos: &Repositories, uploader: Option<Uuid>) -> FileRecord {
        repos
            .files
            .create(&FileRecord {
                id: Uuid::new_v4(),
                filename: "cv.pdf".into(),
                original_name: "cv.pdf".into(),
                field: "resume".into(),
                uploader_id: uploader,
                size: 4,
                mime_type: "application/pdf".into(),
                uploaded_at: Utc::now(),
            })
            .await
            .unwrap()
    }

    fn service(repos: &Repositories) -> CandidateService {
        CandidateService::new(repos.candidates.clone(), repos.applications.clone(), repos.files.clone())
    }

    #[actix_web::test]
    async fn profile_lists_unique_files_across_applications() {
        let repos = Repositories::in_memory();
        let riley = candidate(&repos, "riley@example.ca").await;
        let record = file(&repos, Some(riley.id)).await;

        for _ in 0..2 {
            repos
                .applications
                .create(&NewApplication {
                    job_id: Uuid::new_v4(),
                    job_title: "Cook".into(),
                    job_employer: "Diner".into(),
                    candidate_id: Some(riley.id),
                    name: "Riley".into(),
                    email: "riley@example.ca".into(),
                    phone: String::new(),
                    message: String::new(),
                    files: vec![record.reference()],
                })
                .await
                .unwrap();
        }

        let profile = service(&repos).profile(&riley).await.unwrap();
        assert_eq!(profile.files.len(), 1);
        assert_eq!(profile.files[0].id, record.id);
    }

    #[actix_web::test]
    async fn profile_pointers_must_be_own_uploads() {
        let repos = Repositories::in_memory();
        let riley = candidate(&repos, "riley@example.ca").await;
        let own = file(&repos, Some(riley.id)).await;
        let foreign = file(&repos, Some(Uuid::new_v4())).await;
        let service = service(&repos);

        let request = UpdateProfile { resume_file_id: Some(foreign.id), ..UpdateProfile::default() };
        let err = service.update_profile(&riley, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let request = UpdateProfile { resume_file_id: Some(own.id), ..UpdateProfile::default() };
        let profile = service.update_profile(&riley, request).await.unwrap();
        assert_eq!(profile.resume_file_id, Some(own.id));
    }

    #[actix_web::test]
    async fn delete_flags_applications() {
        let repos = Repositories::in_memory();
        let riley = candidate(&repos, "riley@example.ca").await;
        let application = repos
            .applications
            .create(&NewApplication {
                job_id: Uuid::new_v4(),
                job_title: "Cook".into(),
                job_employer: "Diner".into(),
                candidate_id: Some(riley.id),
                name: "Riley".into(),
                email: "riley@example.ca".into(),
                phone: String::new(),
                message: String::new(),
                files: Vec::new(),
            })
            .await
            .unwrap();

        service(&repos).admin_delete(riley.id).await.unwrap();

        let application = repos.applications.find(application.id).await.unwrap().unwrap();
        assert!(application.candidate_removed);
        let err = service(&repos).admin_delete(riley.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
