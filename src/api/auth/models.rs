use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::models::{Candidate, Role};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl From<&Candidate> for SessionUser {
    fn from(account: &Candidate) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            role: account.role,
            name: account.name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub user: SessionUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredResponse {
    pub ok: bool,
    pub id: Uuid,
}

/// Emails are stored and compared lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
