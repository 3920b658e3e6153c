use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    post,
    web::{Data, ServiceConfig, scope},
    HttpResponse,
};
use actix_web_validator::Json;
use serde_json::json;

use crate::api::error::ServiceError;
use crate::auth::{SessionKeys, TOKEN_COOKIE};
use crate::db::models::Candidate;
use super::models::{LoginRequest, LoginResponse, RegisterRequest, RegisteredResponse, SessionUser};
use super::service::AuthService;

fn session_cookie(keys: &SessionKeys, account: &Candidate) -> Result<Cookie<'static>, ServiceError> {
    let token = keys
        .issue(account)
        .map_err(|e| ServiceError::InternalError(format!("failed to sign session token: {}", e)))?;

    Ok(Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(keys.secure_cookies())
        .max_age(CookieDuration::seconds(keys.ttl().num_seconds()))
        .finish())
}

#[post("/register")]
async fn register(
    service: Data<AuthService>,
    keys: Data<SessionKeys>,
    request: Json<RegisterRequest>,
) -> Result<HttpResponse, ServiceError> {
    let account = service.register(request.into_inner()).await?;
    let cookie = session_cookie(&keys, &account)?;
    Ok(HttpResponse::Created()
        .cookie(cookie)
        .json(RegisteredResponse { ok: true, id: account.id }))
}

#[post("/login")]
async fn login(
    service: Data<AuthService>,
    keys: Data<SessionKeys>,
    request: Json<LoginRequest>,
) -> Result<HttpResponse, ServiceError> {
    let account = service.login(request.into_inner()).await?;
    let cookie = session_cookie(&keys, &account)?;
    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        ok: true,
        user: SessionUser::from(&account),
    }))
}

#[post("/logout")]
async fn logout(keys: Data<SessionKeys>) -> HttpResponse {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(keys.secure_cookies())
        .finish();
    cookie.make_removal();
    HttpResponse::Ok().cookie(cookie).json(json!({ "ok": true }))
}

pub fn auth_config(config: &mut ServiceConfig) {
    config.service(
        scope("/auth")
            .service(register)
            .service(login)
            .service(logout),
    );
}
