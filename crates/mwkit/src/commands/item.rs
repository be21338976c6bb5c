//! Handlers for commands that target one ITEM (a device or a group).

use serde::Serialize;
use tabled::Tabled;

use mwkit_core::{
    AboutDeviceVm, ConnectionState, Item, KnownItemVm, MacAddress, Model, SignalLevel, UiFactory,
};

use crate::cli::{ForgetArgs, GlobalOpts, GroupArgs, RenameArgs};
use crate::error::CliError;
use crate::output;

use super::devices::signal_cell;

// ── Resolution ──────────────────────────────────────────────────────

pub(crate) fn parse_item(raw: &str) -> Result<Item, CliError> {
    Ok(raw.parse::<Item>()?)
}

/// Resolve user input to a view-model. The factory's navigation path
/// panics on unknown items, so user input is checked first.
pub(crate) fn item_vm(factory: &UiFactory, raw: &str) -> Result<KnownItemVm, CliError> {
    let item = parse_item(raw)?;
    if factory.resolve_item(&item).is_none() {
        return Err(not_found(&item));
    }
    Ok(factory.make_item_vm(&item))
}

fn not_found(item: &Item) -> CliError {
    let (resource_type, list_command) = match item {
        Item::Known(_) => ("device", "devices"),
        Item::Group(_) => ("group", "groups"),
    };
    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier: item.to_string(),
        list_command: list_command.into(),
    }
}

// ── show ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ItemView {
    item: String,
    name: String,
    is_group: bool,
    macs: Vec<MacAddress>,
    models: Vec<(MacAddress, Model)>,
    rssi: SignalLevel,
    connection: ConnectionState,
    locally_known: bool,
}

impl From<&KnownItemVm> for ItemView {
    fn from(vm: &KnownItemVm) -> Self {
        Self {
            item: vm.item().to_string(),
            name: vm.name().to_owned(),
            is_group: vm.is_group(),
            macs: vm.macs(),
            models: vm.models(),
            rssi: vm.rssi(),
            connection: vm.connection(),
            locally_known: vm.is_locally_known(),
        }
    }
}

fn item_detail(v: &ItemView) -> String {
    let models = v
        .models
        .iter()
        .map(|(mac, model)| format!("{model} ({mac})"))
        .collect::<Vec<_>>()
        .join(", ");
    [
        format!("Item:       {}", v.item),
        format!("Name:       {}", v.name),
        format!("Kind:       {}", if v.is_group { "group" } else { "device" }),
        format!("Members:    {}", v.macs.len()),
        format!("Models:     {}", output::or_dash(&models)),
        format!("Signal:     {}", v.rssi),
        format!("Connection: {}", v.connection),
        format!("Local:      {}", if v.locally_known { "yes" } else { "no" }),
    ]
    .join("\n")
}

pub fn show(factory: &UiFactory, raw: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let vm = item_vm(factory, raw)?;
    let view = ItemView::from(&vm);
    let out = output::render_single(global.output, &view, item_detail, |v| v.item.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── history ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HistoryView {
    title: String,
    item: String,
    devices: Vec<HistoryEntry>,
}

#[derive(Serialize, Tabled)]
struct HistoryEntry {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Signal")]
    signal: String,
}

impl From<&AboutDeviceVm> for HistoryEntry {
    fn from(vm: &AboutDeviceVm) -> Self {
        Self {
            index: vm.index(),
            mac: vm.mac().to_string(),
            name: vm.meta().name.clone(),
            model: vm.meta().model.to_string(),
            state: vm.connection().to_string(),
            signal: signal_cell(vm.device()),
        }
    }
}

/// Uses the lenient batch path: an unknown item shows an "Error" title
/// and no rows instead of failing.
pub fn history(factory: &UiFactory, raw: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let item = parse_item(raw)?;
    let screen = factory.make_history_screen_vm(item);
    let view = HistoryView {
        title: screen.title().to_owned(),
        item: screen.item().to_string(),
        devices: screen.vms().iter().map(HistoryEntry::from).collect(),
    };
    let out = output::render_single(
        global.output,
        &view,
        |v| {
            format!(
                "{}\n{}",
                v.title,
                tabled::Table::new(&v.devices).with(tabled::settings::Style::rounded())
            )
        },
        |v| {
            v.devices
                .iter()
                .map(|d| d.mac.clone())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Mutations ───────────────────────────────────────────────────────

pub fn rename(factory: &UiFactory, args: &RenameArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let vm = item_vm(factory, &args.item)?;
    vm.rename(&args.name)?;
    output::print_output(
        &format!("Renamed {} to '{}'", vm.item(), args.name.trim()),
        global.quiet,
    );
    Ok(())
}

pub fn group(factory: &UiFactory, args: &GroupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (first, rest) = args.items.split_first().ok_or_else(|| CliError::Validation {
        field: "items".into(),
        reason: "a group needs at least one member".into(),
    })?;
    let vm = item_vm(factory, first)?;
    let others = rest
        .iter()
        .map(|raw| parse_item(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let id = vm.group_with(&others, &args.name)?;
    let out = Item::Group(id).to_string();
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn disband(factory: &UiFactory, raw: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let vm = item_vm(factory, raw)?;
    vm.disband_group()?;
    output::print_output(&format!("Disbanded {}", vm.name()), global.quiet);
    Ok(())
}

pub fn forget(factory: &UiFactory, args: &ForgetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let vm = item_vm(factory, &args.item)?;
    if args.everywhere {
        vm.forget_globally()?;
    } else {
        vm.forget_locally()?;
    }
    let scope = if args.everywhere { "everywhere" } else { "on this host" };
    output::print_output(&format!("Forgot {} {scope}", vm.name()), global.quiet);
    Ok(())
}

pub fn connect(factory: &UiFactory, raw: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let mut vm = item_vm(factory, raw)?;
    vm.connect()?;
    vm.refresh();
    output::print_output(
        &format!("{}: {}", vm.name(), vm.connection()),
        global.quiet,
    );
    Ok(())
}
