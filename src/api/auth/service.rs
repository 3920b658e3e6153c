use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use crate::api::error::ServiceError;
use crate::auth::password::{hash_password, is_valid_password, verify_password, PASSWORD_LENGTH};
use crate::db::models::{Candidate, NewCandidate, Role};
use crate::db::CandidateRepository;
use super::models::{normalize_email, LoginRequest, RegisterRequest};

/// Account registration and credential checks
pub struct AuthService {
    candidates: Arc<dyn CandidateRepository>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(candidates: Arc<dyn CandidateRepository>, bcrypt_cost: u32) -> Self {
        Self { candidates, bcrypt_cost }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Candidate, ServiceError> {
        self.create_account(
            request.name.trim(),
            &request.email,
            request.phone.trim(),
            request.password,
            Role::Candidate,
        )
        .await
    }

    /// Create an admin account; used by the `create-admin` command
    pub async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password: String,
    ) -> Result<Candidate, ServiceError> {
        self.create_account(name.trim(), email, "", password, Role::Admin).await
    }

    async fn create_account(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        password: String,
        role: Role,
    ) -> Result<Candidate, ServiceError> {
        if name.is_empty() {
            return Err(ServiceError::validation("Name is required"));
        }
        if !is_valid_password(&password) {
            return Err(ServiceError::validation(format!(
                "Password must be exactly {} letters or digits",
                PASSWORD_LENGTH
            )));
        }

        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ServiceError::validation("Email is required"));
        }
        if self.candidates.find_by_email(&email).await?.is_some() {
            warn!("Service: Registration rejected, {} already registered", email);
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let cost = self.bcrypt_cost;
        let password_hash = web::block(move || hash_password(&password, cost))
            .await?
            .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {}", e)))?;

        let account = self
            .candidates
            .create(&NewCandidate {
                name: name.to_string(),
                email,
                phone: phone.to_string(),
                password_hash,
                role,
            })
            .await?;
        info!("Service: Registered {} account {}", account.role.as_str(), account.id);
        Ok(account)
    }

    /// Returns the account when the credentials match. Unknown emails and
    /// wrong passwords fail identically.
    pub async fn login(&self, request: LoginRequest) -> Result<Candidate, ServiceError> {
        let invalid = || ServiceError::Unauthorized("Invalid credentials".to_string());

        let email = normalize_email(&request.email);
        let Some(account) = self.candidates.find_by_email(&email).await? else {
            warn!("Service: Login for unknown email {}", email);
            return Err(invalid());
        };

        let hash = account.password_hash.clone();
        let password = request.password;
        let matches = web::block(move || verify_password(&password, &hash)).await?;
        if !matches {
            warn!("Service: Wrong password for account {}", account.id);
            return Err(invalid());
        }

        info!("Service: Account {} logged in", account.id);
        Ok(account)
    }
}
