//! Group list handler.

use tabled::Tabled;

use mwkit_core::{DeviceGroup, Item, UiFactory};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Members")]
    members: String,
}

impl From<&DeviceGroup> for GroupRow {
    fn from(g: &DeviceGroup) -> Self {
        Self {
            item: Item::Group(g.id).to_string(),
            name: g.name.clone(),
            members: g
                .members
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

pub fn handle(factory: &UiFactory, global: &GlobalOpts) -> Result<(), CliError> {
    let groups = factory.registry().groups();
    let out = output::render_list(
        global.output,
        &groups,
        |g| GroupRow::from(g),
        |g| Item::Group(g.id).to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
