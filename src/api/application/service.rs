use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::api::identity::Identity;
use crate::api::pagination::{non_blank, Paging};
use crate::db::models::{
    Application, ApplicationChanges, ApplicationNote, ApplicationQuery, ApplicationStatus,
    FileReference, NewApplication,
};
use crate::db::{ApplicationRepository, CandidateRepository, FileRepository, JobRepository};
use super::models::{AdminApplicationSearch, FileReferenceInput, PatchApplication, SubmitApplication};

const ADMIN_DEFAULT_LIMIT: i64 = 50;
const ADMIN_MAX_LIMIT: i64 = 500;
/// Upper bound on a candidate's own listing
pub const OWN_APPLICATIONS_LIMIT: i64 = 500;

fn parse_status(status: &str) -> Result<ApplicationStatus, ServiceError> {
    status.parse().map_err(ServiceError::ValidationError)
}

/// Application intake, review and candidate self-service
pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    jobs: Arc<dyn JobRepository>,
    candidates: Arc<dyn CandidateRepository>,
    files: Arc<dyn FileRepository>,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        jobs: Arc<dyn JobRepository>,
        candidates: Arc<dyn CandidateRepository>,
        files: Arc<dyn FileRepository>,
    ) -> Self {
        Self { applications, jobs, candidates, files }
    }

    /// Create an application for a job.
    ///
    /// Checks run in a fixed order: job reference present, contact details
    /// for anonymous applicants, job exists, every file reference names a
    /// stored file.
    pub async fn submit(
        &self,
        applicant: Option<&Identity>,
        request: SubmitApplication,
    ) -> Result<Application, ServiceError> {
        let job_id = request
            .job_id
            .ok_or_else(|| ServiceError::validation("Missing jobId"))?;

        let body_name = non_blank(&request.name);
        let body_email = non_blank(&request.email);
        let body_phone = non_blank(&request.phone);
        if applicant.is_none() && (body_name.is_none() || body_email.is_none()) {
            return Err(ServiceError::validation("Name and email are required"));
        }

        let job = self
            .jobs
            .find(job_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Job"))?;

        let files = self.resolve_files(&request.files).await?;

        let (name, email, phone) = match applicant {
            Some(identity) => {
                let profile = self.candidates.find(identity.id).await?;
                let pick = |profile_value: Option<&String>, body: Option<String>, fallback: &str| {
                    profile_value
                        .filter(|v| !v.trim().is_empty())
                        .cloned()
                        .or(body)
                        .unwrap_or_else(|| fallback.to_string())
                };
                (
                    pick(profile.as_ref().map(|p| &p.name), body_name, &identity.name),
                    pick(profile.as_ref().map(|p| &p.email), body_email, &identity.email),
                    pick(profile.as_ref().map(|p| &p.phone), body_phone, ""),
                )
            }
            None => (
                body_name.unwrap_or_default(),
                body_email.unwrap_or_default(),
                body_phone.unwrap_or_default(),
            ),
        };

        let new_application = NewApplication {
            job_id: job.id,
            job_title: job.title,
            job_employer: job.employer,
            candidate_id: applicant.map(|a| a.id),
            name,
            email: email.to_lowercase(),
            phone,
            message: request.message.unwrap_or_default(),
            files,
        };

        let application = self.applications.create(&new_application).await?;
        info!(
            "Service: Application {} submitted for job {} with {} files",
            application.id,
            application.job_id,
            application.files.len()
        );
        Ok(application)
    }

    /// Complete client references from the stored file records
    async fn resolve_files(
        &self,
        inputs: &[FileReferenceInput],
    ) -> Result<Vec<FileReference>, ServiceError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = inputs.iter().map(|f| f.id).collect();
        let records: HashMap<Uuid, _> = self
            .files
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        let mut references: Vec<FileReference> = Vec::with_capacity(inputs.len());
        for input in inputs {
            let Some(record) = records.get(&input.id) else {
                warn!("Service: Application references unknown file {}", input.id);
                return Err(ServiceError::validation(format!("Unknown file reference {}", input.id)));
            };
            if references.iter().any(|r| r.id == input.id) {
                continue;
            }
            let mut reference = record.reference();
            if let Some(field) = non_blank(&input.field) {
                reference.field = field;
            }
            references.push(reference);
        }
        Ok(references)
    }

    pub async fn mine(&self, identity: &Identity) -> Result<Vec<Application>, ServiceError> {
        let query = ApplicationQuery {
            candidate_id: Some(identity.id),
            limit: OWN_APPLICATIONS_LIMIT,
            ..ApplicationQuery::default()
        };
        Ok(self.applications.list(&query).await?)
    }

    async fn find(&self, id: Uuid) -> Result<Application, ServiceError> {
        self.applications
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Application"))
    }

    /// Owner or admin only
    pub async fn get(&self, identity: &Identity, id: Uuid) -> Result<Application, ServiceError> {
        let application = self.find(id).await?;
        if !identity.is_admin() && application.candidate_id != Some(identity.id) {
            return Err(ServiceError::Forbidden);
        }
        Ok(application)
    }

    /// Admins change status. Owners change contact details and message, and
    /// only while the application is still `Applied`.
    pub async fn patch(
        &self,
        identity: &Identity,
        id: Uuid,
        request: PatchApplication,
    ) -> Result<Application, ServiceError> {
        let application = self.find(id).await?;

        let changes = if identity.is_admin() {
            ApplicationChanges {
                status: non_blank(&request.status).map(|s| parse_status(&s)).transpose()?,
                ..ApplicationChanges::default()
            }
        } else if application.candidate_id == Some(identity.id) {
            let changes = ApplicationChanges {
                message: request.message,
                phone: request.phone.map(|p| p.trim().to_string()),
                email: non_blank(&request.email).map(|e| e.to_lowercase()),
                status: None,
            };
            if !changes.is_empty() && application.status != ApplicationStatus::Applied {
                warn!("Service: Edit of application {} in status {}", id, application.status);
                return Err(ServiceError::Conflict(
                    "Application can only be edited while its status is Applied".to_string(),
                ));
            }
            changes
        } else {
            return Err(ServiceError::Forbidden);
        };

        if changes.is_empty() {
            return Err(ServiceError::validation("No fields to update"));
        }

        info!("Service: Updating application {}", id);
        self.applications
            .update(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Application"))
    }

    pub async fn admin_list(&self, search: &AdminApplicationSearch) -> Result<Vec<Application>, ServiceError> {
        let status = non_blank(&search.status)
            .map(|s| parse_status(&s))
            .transpose()?;
        let paging = Paging { limit: search.limit, page: search.page };
        let (limit, offset) = paging.resolve(ADMIN_DEFAULT_LIMIT, ADMIN_MAX_LIMIT);

        let query = ApplicationQuery {
            status,
            candidate_id: None,
            q: non_blank(&search.q),
            limit,
            offset,
        };
        Ok(self.applications.list(&query).await?)
    }

    pub async fn admin_get(&self, id: Uuid) -> Result<Application, ServiceError> {
        self.find(id).await
    }

    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<Application, ServiceError> {
        let status = parse_status(status)?;
        let changes = ApplicationChanges { status: Some(status), ..ApplicationChanges::default() };

        let application = self
            .applications
            .update(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Application"))?;
        info!("Service: Application {} moved to {}", id, status);
        Ok(application)
    }

    /// Returns how many applications were updated; unknown ids are skipped
    pub async fn set_status_many(&self, ids: &[Uuid], status: &str) -> Result<u64, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::validation("At least one id is required"));
        }
        let status = parse_status(status)?;
        let updated = self.applications.set_status_many(ids, status).await?;
        info!("Service: Bulk status {} applied to {}/{} applications", status, updated, ids.len());
        Ok(updated)
    }

    pub async fn add_note(
        &self,
        admin: &Identity,
        id: Uuid,
        note: &str,
    ) -> Result<ApplicationNote, ServiceError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(ServiceError::validation("Note cannot be empty"));
        }

        let note = ApplicationNote {
            admin_id: admin.id,
            admin_name: admin.name.clone(),
            note: note.to_string(),
            created_at: Utc::now(),
        };
        if !self.applications.add_note(id, &note).await? {
            return Err(ServiceError::not_found("Application"));
        }
        info!("Service: Admin {} added a note to application {}", admin.id, id);
        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewJob, Role};
    use crate::db::Repositories;

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "pat@example.ca".into(),
            name: "Pat".into(),
            role,
        }
    }

    async fn setup() -> (ApplicationService, Uuid) {
        let repos = Repositories::in_memory();
        let job = repos
            .jobs
            .create(&NewJob { title: "Welder".into(), employer: "Prairie Steel".into(), ..NewJob::default() })
            .await
            .unwrap();
        let service = ApplicationService::new(repos.applications, repos.jobs, repos.candidates, repos.files);
        (service, job.id)
    }

    fn anonymous(job_id: Uuid) -> SubmitApplication {
        SubmitApplication {
            job_id: Some(job_id),
            name: Some("Sam".into()),
            email: Some("Sam@Example.ca".into()),
            ..SubmitApplication::default()
        }
    }

    #[actix_web::test]
    async fn submit_checks_run_in_order() {
        let (service, job_id) = setup().await;

        let err = service.submit(None, SubmitApplication::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(ref m) if m == "Missing jobId"));

        let request = SubmitApplication { job_id: Some(Uuid::new_v4()), ..SubmitApplication::default() };
        let err = service.submit(None, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let mut request = anonymous(job_id);
        request.job_id = Some(Uuid::new_v4());
        let err = service.submit(None, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let mut request = anonymous(job_id);
        request.files = vec![FileReferenceInput { id: Uuid::new_v4(), field: None }];
        let err = service.submit(None, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[actix_web::test]
    async fn anonymous_submission_copies_job() {
        let (service, job_id) = setup().await;
        let application = service.submit(None, anonymous(job_id)).await.unwrap();
        assert_eq!(application.job_title, "Welder");
        assert_eq!(application.job_employer, "Prairie Steel");
        assert_eq!(application.email, "sam@example.ca");
        assert_eq!(application.candidate_id, None);
        assert_eq!(application.status, ApplicationStatus::Applied);
    }

    #[actix_web::test]
    async fn owner_edits_only_while_applied() {
        let (service, job_id) = setup().await;
        let owner = identity(Role::Candidate);
        let admin = identity(Role::Admin);
        let request = SubmitApplication { job_id: Some(job_id), ..SubmitApplication::default() };
        let application = service.submit(Some(&owner), request).await.unwrap();
        assert_eq!(application.name, "Pat");

        let edit = || PatchApplication { message: Some("Available from May".into()), ..PatchApplication::default() };
        let updated = service.patch(&owner, application.id, edit()).await.unwrap();
        assert_eq!(updated.message, "Available from May");

        let err = service.patch(&identity(Role::Candidate), application.id, edit()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));

        let review = PatchApplication { status: Some("In Review".into()), ..PatchApplication::default() };
        service.patch(&admin, application.id, review).await.unwrap();

        let err = service.patch(&owner, application.id, edit()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[actix_web::test]
    async fn unknown_status_is_rejected() {
        let (service, job_id) = setup().await;
        let application = service.submit(None, anonymous(job_id)).await.unwrap();
        let err = service.set_status(application.id, "Shortlisted").await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[actix_web::test]
    async fn notes_are_appended() {
        let (service, job_id) = setup().await;
        let admin = identity(Role::Admin);
        let application = service.submit(None, anonymous(job_id)).await.unwrap();

        service.add_note(&admin, application.id, "Called, no answer").await.unwrap();
        service.add_note(&admin, application.id, "Interview booked").await.unwrap();

        let application = service.admin_get(application.id).await.unwrap();
        let notes: Vec<_> = application.notes.iter().map(|n| n.note.as_str()).collect();
        assert_eq!(notes, ["Called, no answer", "Interview booked"]);

        let err = service.add_note(&admin, Uuid::new_v4(), "lost").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
