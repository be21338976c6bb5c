//! Session list, rename and delete handlers.

use tabled::Tabled;

use mwkit_core::{Session, SessionId, UiFactory};

use crate::cli::{GlobalOpts, SessionsArgs, SessionsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Recorded")]
    date: String,
    #[tabled(rename = "Devices")]
    devices: usize,
}

impl From<&Session> for SessionRow {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            date: s.date.format("%Y-%m-%d %H:%M").to_string(),
            devices: s.devices.len(),
        }
    }
}

pub(crate) fn parse_session_id(raw: &str) -> Result<SessionId, CliError> {
    raw.trim().parse().map_err(|e| CliError::Validation {
        field: "session".into(),
        reason: format!("'{raw}' is not a session id: {e}"),
    })
}

pub fn handle(
    factory: &UiFactory,
    args: SessionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut vm = factory.make_past_sessions_vm();

    match args.command.unwrap_or(SessionsCommand::List) {
        SessionsCommand::List => {
            let out = output::render_list(
                global.output,
                vm.sessions(),
                |s| SessionRow::from(s),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
        }
        SessionsCommand::Rename { id, name } => {
            let id = parse_session_id(&id)?;
            vm.rename(&id, &name)?;
            output::print_output(&format!("Renamed session {id}"), global.quiet);
        }
        SessionsCommand::Delete { id } => {
            let id = parse_session_id(&id)?;
            vm.delete(&id)?;
            output::print_output(&format!("Deleted session {id}"), global.quiet);
        }
    }
    Ok(())
}
