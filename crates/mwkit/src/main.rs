mod cli;
mod commands;
mod error;
mod output;
mod registry_file;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mwkit_config::{Config, ConfigError};
use mwkit_core::UiFactory;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::registry_file::RegistryFile;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Loaded before tracing so `log_level` can seed the filter.
    let config = mwkit_config::load_config();
    let log_level = config.as_ref().ok().and_then(|c| c.log_level.clone());
    init_tracing(cli.global.verbose, log_level.as_deref());

    if let Err(err) = run(cli, config).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, configured: Option<&str>) {
    let filter = match (verbosity, configured) {
        (0, Some(level)) => level,
        (0, None) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli, config: Result<Config, ConfigError>) -> Result<(), CliError> {
    match cli.command {
        // Config commands work even with a broken config file
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "mwkit", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let config = config?;
            let path = cli
                .global
                .registry
                .clone()
                .unwrap_or_else(|| config.resolve_registry_path());
            let registry = RegistryFile::open(path)?;
            let factory = UiFactory::new(registry.store().clone(), config.to_factory_config()?);

            tracing::debug!(
                command = ?cmd,
                registry = %registry.path().display(),
                "dispatching command"
            );
            let result = commands::dispatch(cmd, &factory, &cli.global).await;
            factory.actions().shutdown().await;

            // Partial progress (e.g. a batch where one device failed) is kept.
            registry.save_if_changed()?;
            result
        }
    }
}
