//! Config subcommand handlers.

use std::path::PathBuf;

use mwkit_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Update one key of `cfg` from its string form.
fn set_value(cfg: &mut Config, key: &str, value: &str) -> Result<(), CliError> {
    match key {
        "registry_path" => cfg.registry_path = Some(PathBuf::from(value)),
        "action_queue_capacity" => {
            cfg.action_queue_capacity = value.parse().map_err(|_| CliError::Validation {
                field: key.into(),
                reason: format!("expected a positive integer, got '{value}'"),
            })?;
            cfg.to_factory_config()?;
        }
        "log_level" => cfg.log_level = Some(value.to_owned()),
        other => {
            return Err(CliError::Validation {
                field: "key".into(),
                reason: format!(
                    "unknown key '{other}' (expected registry_path, action_queue_capacity or log_level)"
                ),
            });
        }
    }
    Ok(())
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
        }
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let text = format!(
                "{}registry (effective) = \"{}\"",
                toml::to_string_pretty(&cfg).map_err(|e| CliError::Render(e.to_string()))?,
                cfg.resolve_registry_path().display()
            );
            output::print_output(&text, global.quiet);
        }
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            set_value(&mut cfg, &key, &value)?;
            config::save_config(&cfg)?;
            output::print_output(&format!("Set {key} = {value}"), global.quiet);
        }
    }
    Ok(())
}
