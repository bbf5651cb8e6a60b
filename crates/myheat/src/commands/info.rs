//! Device state handler.

use std::fmt::Write;

use tabled::Tabled;

use myheat_core::{DeviceInfo, Eng, EntryConfig, Env, Heater};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct HeaterRow {
    #[tabled(rename = "Heater")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Flow °C")]
    flow: String,
    #[tabled(rename = "Return °C")]
    ret: String,
    #[tabled(rename = "Target °C")]
    target: String,
    #[tabled(rename = "Pressure")]
    pressure: String,
    #[tabled(rename = "Modulation %")]
    modulation: String,
    #[tabled(rename = "Burner")]
    burner: &'static str,
}

impl From<&Heater> for HeaterRow {
    fn from(h: &Heater) -> Self {
        let burner = match (h.disabled, h.burner_heating, h.burner_water) {
            (true, _, _) => "disabled",
            (false, true, _) => "heating",
            (false, false, true) => "water",
            (false, false, false) => "off",
        };
        Self {
            id: h.id,
            name: h.name.clone(),
            flow: output::cell(h.flow_temp),
            ret: output::cell(h.return_temp),
            target: output::cell(h.target_temp),
            pressure: output::cell(h.pressure),
            modulation: output::cell(h.modulation),
            burner,
        }
    }
}

#[derive(Tabled)]
struct EnvRow {
    #[tabled(rename = "Env")]
    id: i64,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Demand")]
    demand: bool,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Env> for EnvRow {
    fn from(e: &Env) -> Self {
        Self {
            id: e.id,
            kind: e.kind.clone(),
            name: e.name.clone(),
            value: output::cell(e.value),
            target: e.target.map_or_else(|| "off".into(), |t| t.to_string()),
            demand: e.demand,
            status: e.severity_desc.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct EngRow {
    #[tabled(rename = "Eng")]
    id: i64,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "On")]
    turned_on: bool,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Eng> for EngRow {
    fn from(e: &Eng) -> Self {
        Self {
            id: e.id,
            kind: e.kind.clone(),
            name: e.name.clone(),
            turned_on: e.turned_on,
            status: e.severity_desc.clone().unwrap_or_default(),
        }
    }
}

// ── Detail view ─────────────────────────────────────────────────────

fn detail(info: &DeviceInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "City:        {}",
        info.city.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "Weather:     {}",
        info.weather_temp
            .map_or_else(|| "-".into(), |t| format!("{t:.1} °C"))
    );
    let _ = writeln!(
        out,
        "Severity:    {} {}",
        output::cell(info.severity),
        info.severity_desc.as_deref().unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "Data actual: {}",
        if info.data_actual { "yes" } else { "no" }
    );
    let _ = writeln!(out, "Alarms:      {}", info.alarm_count());

    if !info.heaters.is_empty() {
        let rows: Vec<HeaterRow> = info.heaters.iter().map(HeaterRow::from).collect();
        let _ = write!(out, "\n{}\n", output::render_table(&rows));
    }
    if !info.envs.is_empty() {
        let rows: Vec<EnvRow> = info.envs.iter().map(EnvRow::from).collect();
        let _ = write!(out, "\n{}\n", output::render_table(&rows));
    }
    if !info.engs.is_empty() {
        let rows: Vec<EngRow> = info.engs.iter().map(EngRow::from).collect();
        let _ = write!(out, "\n{}\n", output::render_table(&rows));
    }
    out.trim_end().to_owned()
}

/// One `kind id` line per record.
fn record_ids(info: &DeviceInfo) -> String {
    let heaters = info.heaters.iter().map(|h| format!("heater {}", h.id));
    let envs = info.envs.iter().map(|e| format!("env {}", e.id));
    let engs = info.engs.iter().map(|e| format!("eng {}", e.id));
    heaters.chain(envs).chain(engs).collect::<Vec<_>>().join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: &EntryConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let info = util::client(config)?.get_device_info(None).await?;
    // Structured formats emit the payload exactly as received.
    let out = output::render_single(
        &global.output,
        info.raw(),
        |_| detail(&info),
        |_| record_ids(&info),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info() -> DeviceInfo {
        DeviceInfo::from_data(json!({
            "heaters": [{"id": 13, "name": "Boiler", "flowTemp": 56, "burnerWater": true}],
            "envs": [{"id": 21, "type": "boiler_temperature", "name": "DHW", "target": null}],
            "engs": [{"id": 40, "type": "pump", "name": "Pump", "turnedOn": true}],
            "alarms": {},
            "dataActual": true,
            "severity": 1,
            "severityDesc": "ok",
            "weatherTemp": "-6.78999999999996",
            "city": "Town"
        }))
        .unwrap()
    }

    #[test]
    fn record_ids_list_every_record() {
        assert_eq!(record_ids(&info()), "heater 13\nenv 21\neng 40");
    }

    #[test]
    fn detail_shows_summary_and_tables() {
        let text = detail(&info());
        assert!(text.contains("Town"));
        assert!(text.contains("-6.8 °C"));
        assert!(text.contains("water"));
        assert!(text.contains("off"));
        assert!(text.contains("Pump"));
    }
}
