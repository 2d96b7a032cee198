//! `networks`: show the VLAN mapping the importer will use.

use serde::Serialize;
use tabled::Tabled;

use unires_core::{NetworkRef, Session, list_networks};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct NetworkEntry {
    vlan: u16,
    name: String,
    id: String,
    subnet: Option<String>,
}

impl From<&NetworkRef> for NetworkEntry {
    fn from(n: &NetworkRef) -> Self {
        Self {
            vlan: n.vlan,
            name: n.name.clone(),
            id: n.id.clone(),
            subnet: n.subnet.map(|s| s.to_string()),
        }
    }
}

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "VLAN")]
    vlan: u16,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Subnet")]
    subnet: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&NetworkEntry> for NetworkRow {
    fn from(n: &NetworkEntry) -> Self {
        Self {
            vlan: n.vlan,
            name: n.name.clone(),
            subnet: n.subnet.clone().unwrap_or_else(|| "-".into()),
            id: n.id.clone(),
        }
    }
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let map = list_networks(session).await?;
    let entries: Vec<NetworkEntry> = map.iter().map(NetworkEntry::from).collect();

    let out = output::render_list(&global.output, &entries, |n| NetworkRow::from(n), |n| {
        format!("{}\t{}\t{}", n.vlan, n.id, n.name)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
