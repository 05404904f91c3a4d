//! StudyVoice CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use study_voice::cli::{
    app::{config_overrides, load_merged_config, run, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use study_voice::infrastructure::XdgConfigStore;

/// Environment variable holding the log filter (e.g. `study_voice=debug`)
const LOG_ENV: &str = "STUDY_VOICE_LOG";

fn init_logging(verbose: bool) {
    let default = if verbose { "study_voice=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let presenter = Presenter::new();

    let overrides = config_overrides(&cli);
    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        command => {
            let overrides = match overrides {
                Ok(c) => c,
                Err(e) => {
                    presenter.error(&e);
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            };
            let config = load_merged_config(overrides).await;
            run(command, config).await
        }
    }
}
