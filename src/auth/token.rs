use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{Candidate, Role};

/// Claims carried by the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies session tokens (HS256)
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    secure_cookies: bool,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_hours: i64, secure_cookies: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
            secure_cookies,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub fn issue(&self, account: &Candidate) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            role: account.role,
            name: account.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Checks signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(role: Role) -> Candidate {
        let now = Utc::now();
        Candidate {
            id: Uuid::new_v4(),
            name: "Ada Lovelace".into(),
            email: "ada@example.ca".into(),
            phone: String::new(),
            password_hash: String::new(),
            role,
            notes: String::new(),
            address: String::new(),
            resume_file_id: None,
            passport_file_id: None,
            permit_file_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let keys = SessionKeys::new("a-test-secret-of-some-length", 1, false);
        let admin = account(Role::Admin);
        let token = keys.issue(&admin).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.email, "ada@example.ca");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let keys = SessionKeys::new("a-test-secret-of-some-length", 1, false);
        let other = SessionKeys::new("another-secret-entirely-here", 1, false);
        let token = other.issue(&account(Role::Candidate)).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Validation allows 60s of leeway, so expire well past it
        let keys = SessionKeys::new("a-test-secret-of-some-length", -1, false);
        let token = keys.issue(&account(Role::Candidate)).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let keys = SessionKeys::new("a-test-secret-of-some-length", 1, false);
        assert!(keys.verify("not.a.token").is_err());
    }
}
