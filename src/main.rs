use clap::Parser;
use job_board::{cli::Cmd, config::Config, telemetry};
use tracing::error;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Arguments first so --help and usage errors need no environment
    let cmd = Cmd::parse();

    // Load configuration from environment
    let config = Config::from_env().map_err(std::io::Error::other)?;

    telemetry::init(&config.log_dir)?;

    cmd.run(config).await.map_err(|e| {
        error!("{}", e);
        std::io::Error::other(e)
    })
}
