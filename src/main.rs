use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use icm_extract::config::{self, Cli, Config};
use icm_extract::{Extractor, Runner, logging};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = config::load_env_file(std::env::args().skip(1)) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    // usage errors exit with status 2
    let cli = Cli::parse();
    logging::init(cli.log_format);

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let client = match config.client() {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(error = %err, "could not build the ICM client");
            return ExitCode::FAILURE;
        }
    };

    let extractor = Extractor::new(Arc::new(client), config.sink()).scope(config.scope.clone());
    let mut runner = Runner::new(Arc::new(extractor), config.credentials.clone())
        .retry(config.retry.clone())
        .backoff(config.backoff())
        .schedule(config.schedule.clone());

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("shutdown requested"),
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        }
    };

    runner.run_until(shutdown).await;
    ExitCode::SUCCESS
}
