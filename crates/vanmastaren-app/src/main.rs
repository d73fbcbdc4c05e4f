use clap::Parser;
use std::sync::Arc;

use vanmastaren_infrastructure::logging;
use vanmastaren_lib::application::services::{ConfigService, DB_PATH_ENV};
use vanmastaren_lib::presentation::cli::{self, Cli};
use vanmastaren_lib::presentation::error::CommandError;
use vanmastaren_lib::presentation::state::AppState;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let config_path = cli.config.clone().unwrap_or_else(ConfigService::default_path);
    // An env override must not end up in the written file.
    let first_run = !config_path.exists() && std::env::var_os(DB_PATH_ENV).is_none();
    let config = Arc::new(ConfigService::load(&config_path)?);
    if first_run {
        config.save()?;
    }

    logging::init_logger(&config.config().log_dir, config.get_log_level().as_str())?;

    let state = AppState::new(config).await?;
    let result = cli::run(cli, &state).await;
    state.shutdown().await;

    result
}
