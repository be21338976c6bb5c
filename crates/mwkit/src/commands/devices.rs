//! Device list handler.

use tabled::Tabled;

use mwkit_core::{KnownDevice, UiFactory};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Local")]
    local: String,
}

impl From<&KnownDevice> for DeviceRow {
    fn from(d: &KnownDevice) -> Self {
        Self {
            mac: d.mac().to_string(),
            name: output::or_dash(d.name()),
            model: d.meta.model.to_string(),
            serial: output::or_dash(&d.meta.serial),
            state: d.connection.to_string(),
            signal: signal_cell(d),
            local: if d.is_locally_known() { "yes" } else { "cloud" }.into(),
        }
    }
}

/// Signal dots plus the raw reading, e.g. `●●●○ -62`.
pub(crate) fn signal_cell(d: &KnownDevice) -> String {
    let lit = usize::from(d.signal().dots());
    let dots = format!("{}{}", "●".repeat(lit), "○".repeat(4 - lit));
    match d.rssi {
        Some(rssi) => format!("{dots} {rssi}"),
        None => dots,
    }
}

pub fn handle(factory: &UiFactory, global: &GlobalOpts) -> Result<(), CliError> {
    let devices = factory.registry().devices();
    let out = output::render_list(
        global.output,
        &devices,
        |d| DeviceRow::from(d),
        |d| d.mac().to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
