//! Command dispatch: bridges CLI args -> factory view-models -> output.

pub mod actions;
pub mod config_cmd;
pub mod devices;
pub mod groups;
pub mod item;
pub mod sessions;

use mwkit_core::UiFactory;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a registry-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    factory: &UiFactory,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices => devices::handle(factory, global),
        Command::Groups => groups::handle(factory, global),
        Command::Sessions(args) => sessions::handle(factory, args, global),
        Command::Show(args) => item::show(factory, &args.item, global),
        Command::History(args) => item::history(factory, &args.item, global),
        Command::Rename(args) => item::rename(factory, &args, global),
        Command::Group(args) => item::group(factory, &args, global),
        Command::Disband(args) => item::disband(factory, &args.item, global),
        Command::Forget(args) => item::forget(factory, &args, global),
        Command::Connect(args) => item::connect(factory, &args.item, global),
        Command::Reset(args) => actions::reset(factory, &args.mac, global).await,
        Command::Log(args) => actions::log(factory, &args, global).await,
        Command::Download(args) => actions::download(factory, &args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
