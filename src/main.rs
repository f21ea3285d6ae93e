mod config;
mod error;
mod github;
mod http;
mod infrastructure;
mod postman;
mod setup;

use anyhow::{anyhow, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::SetupConfig;
use http::ReqwestTransport;
use infrastructure::logging::{BoundaryLogger, TraceContext};
use setup::{ConsolePrompter, SetupOrchestrator, ShellProfile};

fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr, so prompts on stdout stay readable)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = SetupConfig::from_env().map_err(|e| anyhow!(e))?;
    let transport = ReqwestTransport::new(config.http_timeout)?;
    let logger = BoundaryLogger::new(TraceContext::from_env_or_generate());

    info!(
        trace_id = %logger.trace_id(),
        work_dir = %config.work_dir.display(),
        github_api = %config.github_api_url,
        "Starting Postman CI setup"
    );

    let mut orchestrator = SetupOrchestrator::new(
        config,
        transport,
        ConsolePrompter::stdio(),
        ShellProfile::bashrc(),
        logger,
    );

    match orchestrator.run() {
        Ok(report) if report.workflow_active => {
            info!(
                repository = %report.repository,
                commit = %report.commit.commit_sha,
                "Setup complete"
            );
            Ok(())
        }
        Ok(report) => {
            warn!(repository = %report.repository, "Workflow committed but not reported active");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Setup failed: {}", e);
            std::process::exit(1);
        }
    }
}
