use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;

use crate::api::auth::AuthService;
use crate::api::error::ServiceError;
use crate::config::Config;
use crate::db::{self, Repositories};
use crate::server;

#[derive(Parser)]
#[command(about = "job board API server")]
pub struct Cmd {
    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand)]
enum SubCommandType {
    /// Run migrations and serve HTTP (the default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Create an admin account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// Exactly six letters or digits
        #[arg(long)]
        password: String,
    },
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Service(#[from] ServiceError),
}

impl Cmd {
    /// Run the chosen subcommand. Arguments are parsed before any
    /// configuration is loaded, so `--help` works without an environment.
    pub async fn run(self, config: Config) -> Result<(), StartupError> {
        match self.command.unwrap_or(SubCommandType::Serve) {
            SubCommandType::Serve => server::serve(config).await,
            SubCommandType::Migrate => {
                let pool = db::connection::get_connection(&config.database_url, 1).await?;
                db::migrations::run_migrations(&pool).await?;
                pool.close().await;
                Ok(())
            }
            SubCommandType::CreateAdmin { email, name, password } => {
                let pool = db::connection::get_connection(&config.database_url, 1).await?;
                db::migrations::run_migrations(&pool).await?;

                let repos = Repositories::postgres(pool.clone());
                let auth = AuthService::new(repos.candidates, config.bcrypt_cost);
                let admin = auth.create_admin(&name, &email, password).await?;
                info!("Created admin {} <{}>", admin.id, admin.email);

                pool.close().await;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn defaults_to_serve() {
        let cmd = Cmd::try_parse_from(["job-board"]).unwrap();
        assert!(cmd.command.is_none());
    }

    #[test]
    fn create_admin_takes_its_flags() {
        let cmd = Cmd::try_parse_from([
            "job-board",
            "create-admin",
            "--email",
            "ops@example.ca",
            "--name",
            "Ops",
            "--password",
            "admin1",
        ])
        .unwrap();
        match cmd.command {
            Some(SubCommandType::CreateAdmin { email, name, password }) => {
                assert_eq!(email, "ops@example.ca");
                assert_eq!(name, "Ops");
                assert_eq!(password, "admin1");
            }
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn help_and_bad_arguments_need_no_configuration() {
        let help = Cmd::try_parse_from(["job-board", "--help"]).err().unwrap();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);

        let bad = Cmd::try_parse_from(["job-board", "create-admin", "--email", "a@b.ca"]).err().unwrap();
        assert_eq!(bad.kind(), ErrorKind::MissingRequiredArgument);
    }
}
