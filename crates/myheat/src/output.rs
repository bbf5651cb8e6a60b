//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use myheat_core::StateValue;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Entity state text, green for on and dimmed for off.
pub fn paint_state(state: &StateValue, color: bool) -> String {
    let text = state.to_string();
    if !color {
        return text;
    }
    match state {
        StateValue::Bool(true) => text.green().to_string(),
        StateValue::Bool(false) => text.dimmed().to_string(),
        StateValue::Unknown => text.yellow().to_string(),
        StateValue::Number(_) | StateValue::Text(_) => text,
    }
}

/// `ok` in green or `failed` in red.
pub fn paint_outcome(success: bool, color: bool) -> String {
    match (success, color) {
        (true, true) => "ok".green().to_string(),
        (false, true) => "failed".red().to_string(),
        (true, false) => "ok".into(),
        (false, false) => "failed".into(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string,
/// since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Cell text for an optional value.
pub fn cell<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        id: i64,
        name: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 12,
                name: "Bridge".into(),
            },
            Row {
                id: 10,
                name: "Dacha".into(),
            },
        ]
    }

    fn render(format: &OutputFormat) -> String {
        render_list(
            format,
            &rows(),
            |r| Row {
                id: r.id,
                name: r.name.clone(),
            },
            |r| r.id.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn plain_prints_one_id_per_line() {
        assert_eq!(render(&OutputFormat::Plain), "12\n10");
    }

    #[test]
    fn compact_json_is_a_single_line() {
        assert_eq!(
            render(&OutputFormat::JsonCompact),
            r#"[{"id":12,"name":"Bridge"},{"id":10,"name":"Dacha"}]"#
        );
    }

    #[test]
    fn table_has_headers_and_rows() {
        let table = render(&OutputFormat::Table);
        assert!(table.contains("name"));
        assert!(table.contains("Dacha"));
    }

    #[test]
    fn uncolored_states_are_plain_text() {
        assert_eq!(paint_state(&StateValue::Bool(true), false), "on");
        assert_eq!(paint_state(&StateValue::Unknown, false), "unknown");
        assert_eq!(paint_outcome(false, false), "failed");
        assert!(paint_state(&StateValue::Bool(true), true).contains("on"));
    }
}
