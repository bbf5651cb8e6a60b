//! Device listing handler.

use tabled::Tabled;

use myheat_core::{DeviceSummary, EntryConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&DeviceSummary> for DeviceRow {
    fn from(d: &DeviceSummary) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            city: d.city.clone().unwrap_or_default(),
            severity: output::cell(d.severity),
            status: d.severity_desc.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: &EntryConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let devices = util::client(config)?.get_devices().await?;
    let out = output::render_list(&global.output, &devices, |d| DeviceRow::from(d), |d| {
        d.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
