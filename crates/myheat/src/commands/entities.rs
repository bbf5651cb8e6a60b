//! Entity listing handler.

use serde::Serialize;
use serde_json::{Map, Value};
use tabled::Tabled;

use myheat_core::{EntityDescription, EntityView, Entry, EntryConfig, Snapshot, StateValue};

use crate::cli::{EntitiesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Report ──────────────────────────────────────────────────────────

/// One entity with its state in the current snapshot.
#[derive(Debug, Serialize)]
pub struct EntityReport {
    #[serde(flatten)]
    pub description: EntityDescription,
    pub state: StateValue,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl EntityReport {
    pub fn new(view: &dyn EntityView, snapshot: Option<&Snapshot>) -> Self {
        Self {
            description: view.description().clone(),
            state: view.state(snapshot),
            attributes: view.attributes(snapshot),
        }
    }
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    unique_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Unit")]
    unit: String,
}

fn row(report: &EntityReport, color: bool) -> EntityRow {
    EntityRow {
        unique_id: report.description.unique_id.clone(),
        name: report.description.name.clone(),
        platform: report.description.platform.to_string(),
        state: output::paint_state(&report.state, color),
        unit: report.description.unit.unwrap_or_default().to_owned(),
    }
}

/// Reports for every entity, optionally limited to one platform.
pub fn collect(entry: &Entry, platform: Option<&str>) -> Vec<EntityReport> {
    let snapshot = entry.coordinator().snapshot();
    entry
        .entities()
        .views()
        .into_iter()
        .filter(|view| platform.is_none_or(|p| view.description().platform.to_string() == p))
        .map(|view| EntityReport::new(view, snapshot.as_deref()))
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: EntryConfig,
    args: EntitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let entry = Entry::setup(config).await?;
    let reports = collect(&entry, args.platform.as_deref());
    entry.unload().await;

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &reports,
        |r| row(r, color),
        |r| format!("{}\t{}", r.description.unique_id, r.state),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
