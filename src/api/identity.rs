use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::auth::{Claims, SessionKeys, TOKEN_COOKIE};
use crate::db::models::Role;

/// The caller asserted by a valid session cookie.
///
/// Extracting `Identity` rejects the request with 401 when the cookie is
/// missing or invalid; `Option<Identity>` treats such callers as anonymous.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

fn identify(req: &HttpRequest) -> Result<Identity, ServiceError> {
    let keys = req
        .app_data::<web::Data<SessionKeys>>()
        .ok_or_else(|| ServiceError::InternalError("session keys are not configured".to_string()))?;

    let cookie = req
        .cookie(TOKEN_COOKIE)
        .filter(|c| !c.value().is_empty())
        .ok_or_else(|| ServiceError::Unauthorized("Not authenticated".to_string()))?;

    keys.verify(cookie.value())
        .map(Identity::from)
        .map_err(|_| ServiceError::Unauthorized("Invalid token".to_string()))
}

impl FromRequest for Identity {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identify(req))
    }
}

/// An authenticated caller holding the admin role; anyone else gets 403
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

impl FromRequest for AdminIdentity {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identify(req).and_then(|identity| {
            if identity.is_admin() {
                Ok(AdminIdentity(identity))
            } else {
                Err(ServiceError::Forbidden)
            }
        }))
    }
}
