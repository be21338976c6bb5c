//! Long-running device operations: factory reset, logging and session
//! download. Each one goes through the factory's action queue.

use std::path::PathBuf;

use serde::Serialize;
use tabled::Tabled;

use mwkit_core::{ActionState, MacAddress, SensorConfigurationVm, SensorModule, UiFactory};

use crate::cli::{DownloadArgs, GlobalOpts, LogArgs};
use crate::error::CliError;
use crate::output;

use super::item::parse_item;
use super::sessions::parse_session_id;

// ── reset ───────────────────────────────────────────────────────────

pub async fn reset(factory: &UiFactory, raw: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let mac = MacAddress::new(raw);
    let device = factory
        .registry()
        .device_and_metadata(&mac)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "device".into(),
            identifier: mac.to_string(),
            list_command: "devices".into(),
        })?;
    let vm = factory.make_about_device_vm(device);
    vm.reset().await?;
    output::print_output(&format!("Factory reset {mac}"), global.quiet);
    Ok(())
}

// ── log ─────────────────────────────────────────────────────────────

/// Parse `module` or `module@hz`.
fn parse_sensor(raw: &str) -> Result<(SensorModule, Option<f32>), CliError> {
    let (name, rate) = match raw.split_once('@') {
        Some((name, rate)) => (name, Some(rate)),
        None => (raw, None),
    };
    let module = name.trim().parse::<SensorModule>().map_err(|_| CliError::Validation {
        field: "sensor".into(),
        reason: format!("unknown sensor '{name}'"),
    })?;
    let hz = rate
        .map(|r| {
            r.trim().parse::<f32>().map_err(|_| CliError::Validation {
                field: "sensor".into(),
                reason: format!("'{r}' is not a sampling rate"),
            })
        })
        .transpose()?;
    Ok((module, hz))
}

fn apply_sensor(
    vm: &mut SensorConfigurationVm,
    module: SensorModule,
    hz: Option<f32>,
) -> Result<(), CliError> {
    match hz {
        Some(hz) if !vm.set_frequency(module, hz) => Err(CliError::Validation {
            field: "sensor".into(),
            reason: format!("{module} rate must be a positive number, got {hz}"),
        }),
        Some(_) => Ok(()),
        None => {
            if !vm.config().is_enabled(module) {
                vm.toggle(module);
            }
            Ok(())
        }
    }
}

#[derive(Clone, Serialize, Tabled)]
struct ProgressRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Result")]
    result: String,
}

fn state_text(state: &ActionState) -> String {
    match state {
        ActionState::NotStarted => "not started".into(),
        ActionState::Working => "working".into(),
        ActionState::Completed => "logging".into(),
        ActionState::Error(message) => format!("failed: {message}"),
    }
}

pub async fn log(factory: &UiFactory, args: &LogArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let item = parse_item(&args.item)?;
    let mut sensors = factory.make_sensor_configuration_vm(item.clone());
    if sensors.devices().is_empty() {
        return Err(CliError::NotFound {
            resource_type: "item".into(),
            identifier: item.to_string(),
            list_command: "devices".into(),
        });
    }
    for raw in &args.sensors {
        let (module, hz) = parse_sensor(raw)?;
        apply_sensor(&mut sensors, module, hz)?;
    }
    if !sensors.can_start() {
        return Err(CliError::Validation {
            field: "sensor".into(),
            reason: "enable at least one sensor".into(),
        });
    }

    let mut action = factory
        .make_action_log_vm(item)
        .with_configuration(sensors.into_config());
    let failed = action.start().await;

    let rows: Vec<ProgressRow> = action
        .states()
        .map(|(mac, state)| ProgressRow {
            mac: mac.to_string(),
            result: state_text(state),
        })
        .collect();
    let out = output::render_list(global.output, &rows, ProgressRow::clone, |r| {
        format!("{}\t{}", r.mac, r.result)
    })?;
    output::print_output(&out, global.quiet);

    if failed > 0 {
        return Err(CliError::OperationFailed {
            message: format!("{failed} of {} devices failed to start logging", rows.len()),
        });
    }
    Ok(())
}

// ── download ────────────────────────────────────────────────────────

pub async fn download(
    factory: &UiFactory,
    args: &DownloadArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = parse_session_id(&args.session)?;
    let sessions = factory.make_past_sessions_vm();
    let export = sessions.download(&id).await?;

    std::fs::create_dir_all(&args.dir)?;
    let path: PathBuf = args.dir.join(&export.filename);
    std::fs::write(&path, &export.bytes)?;
    tracing::info!(%id, path = %path.display(), bytes = export.bytes.len(), "exported session");
    output::print_output(&path.display().to_string(), global.quiet);
    Ok(())
}
