use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::{Pool, Postgres};
use tracing::error;

/// What the health probes check: the PostgreSQL pool, or nothing when the
/// service runs on in-memory repositories
#[derive(Clone)]
pub enum HealthProbe {
    Postgres(Pool<Postgres>),
    #[cfg(any(test, feature = "test-utils"))]
    InMemory,
}

impl HealthProbe {
    async fn check(&self) -> Result<&'static str, sqlx::Error> {
        match self {
            HealthProbe::Postgres(pool) => {
                sqlx::query("SELECT 1").fetch_one(pool).await?;
                Ok("connected")
            }
            #[cfg(any(test, feature = "test-utils"))]
            HealthProbe::InMemory => Ok("in_memory"),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// General health including database connectivity
#[get("/health")]
async fn health_check(probe: web::Data<HealthProbe>) -> impl Responder {
    match probe.check().await {
        Ok(database) => HttpResponse::Ok().json(HealthResponse { status: "healthy", database }),
        Err(e) => {
            error!("Health check failed: {:?}", e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "unhealthy",
                database: "disconnected",
            })
        }
    }
}

/// Readiness: 503 while the database is unreachable
#[get("/ready")]
async fn readiness_check(probe: web::Data<HealthProbe>) -> impl Responder {
    match probe.check().await {
        Ok(database) => HttpResponse::Ok().json(HealthResponse { status: "ready", database }),
        Err(e) => {
            error!("Readiness check failed: database unavailable: {:?}", e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "not_ready",
                database: "disconnected",
            })
        }
    }
}

#[get("/live")]
async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse { status: "alive", database: "not_checked" })
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config
        .service(health_check)
        .service(readiness_check)
        .service(liveness_check);
}
