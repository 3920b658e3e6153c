use std::sync::Arc;

use actix_web::{middleware::Logger, App, HttpServer};
use tracing::info;

use crate::api::{health::HealthProbe, ServiceSettings, Services};
use crate::auth::SessionKeys;
use crate::cli::StartupError;
use crate::config::Config;
use crate::db::{self, Repositories};
use crate::shutdown::ShutdownCoordinator;
use crate::storage::{BlobStore, ObjectStorageClient};

/// Connect, migrate and serve until a shutdown signal arrives
pub async fn serve(config: Config) -> Result<(), StartupError> {
    let pool = db::connection::get_connection(&config.database_url, config.max_db_connections).await?;

    info!("Starting job-board application");
    info!("Configuration loaded successfully:");
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Max upload size: {} bytes", config.max_upload_size);
    info!("  - Max database connections: {}", config.max_db_connections);
    info!("  - Object store: {} bucket={}", config.storage_base_url, config.storage_bucket);
    info!("Database connection pool established");

    // Auto-migrate when starting the server
    db::migrations::run_migrations(&pool).await?;

    let blobs: Arc<dyn BlobStore> = Arc::new(ObjectStorageClient::new(
        config.storage_base_url.clone(),
        config.storage_bucket.clone(),
    ));
    let services = Services::new(
        Repositories::postgres(pool.clone()),
        blobs,
        SessionKeys::new(&config.jwt_secret, config.session_ttl_hours, config.secure_cookies),
        HealthProbe::Postgres(pool.clone()),
        &ServiceSettings {
            max_payload_size: config.max_payload_size,
            max_upload_size: config.max_upload_size,
            bcrypt_cost: config.bcrypt_cost,
        },
    );

    let server = HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| services.configure(cfg))
    });

    info!("Server starting on http://{}:{}", config.host, config.port);

    let server = server.bind((config.host.as_str(), config.port))?.run();
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let coordinator = ShutdownCoordinator::new(server_handle, server_task, pool);
    coordinator.wait_for_shutdown().await?;
    Ok(())
}
