//! Continuous polling handler.
//!
//! Sets the entry up (retrying every scan interval while the device is not
//! ready), starts the coordinator and prints one line per completed
//! refresh until Ctrl-C or `--count` updates.

use std::fmt::Write;
use std::time::Duration;

use futures_util::StreamExt;
use tracing::{info, warn};

use myheat_core::{CoreError, Entry, EntryConfig, Snapshot, UpdateStatus};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::refresh::RefreshReport;

/// Structured form of one watch line.
#[derive(Debug, serde::Serialize)]
struct WatchLine {
    #[serde(flatten)]
    report: RefreshReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weather_temp: Option<f64>,
}

impl WatchLine {
    fn new(status: &UpdateStatus, snapshot: Option<&Snapshot>) -> Self {
        Self {
            report: RefreshReport::new(status, snapshot.map(Snapshot::data_actual)),
            severity: snapshot.and_then(|s| s.info().severity),
            weather_temp: snapshot.and_then(|s| s.info().weather_temp),
        }
    }

    fn text(&self, color: bool) -> String {
        let at = self
            .report
            .at
            .map_or_else(|| "-".into(), |at| at.format("%Y-%m-%d %H:%M:%S").to_string());
        let mut line = format!(
            "{at}  #{}  {}",
            self.report.sequence,
            output::paint_outcome(self.report.success, color)
        );
        if let (Some(kind), Some(error)) = (&self.report.kind, &self.report.error) {
            let _ = write!(line, "  {kind}: {error}");
            return line;
        }
        if let Some(severity) = self.severity {
            let _ = write!(line, "  severity {severity}");
        }
        if let Some(temp) = self.weather_temp {
            let _ = write!(line, "  outside {temp:.1}°C");
        }
        if self.report.data_actual == Some(false) {
            line.push_str("  (stale)");
        }
        line
    }
}

fn render(line: &WatchLine, global: &GlobalOpts, color: bool) -> Result<String, CliError> {
    Ok(match global.output {
        OutputFormat::Json | OutputFormat::JsonCompact => serde_json::to_string(line)?,
        OutputFormat::Yaml => format!("---\n{}", serde_yaml::to_string(line)?),
        OutputFormat::Table | OutputFormat::Plain => line.text(color),
    })
}

/// Set the entry up, retrying while the device is not ready.
///
/// Returns `None` when interrupted before setup succeeded.
async fn setup_with_retry(
    config: EntryConfig,
    interval: Duration,
    global: &GlobalOpts,
    shutdown: &mut (impl Future<Output = std::io::Result<()>> + Unpin),
) -> Result<Option<Entry>, CliError> {
    loop {
        tokio::select! {
            biased;
            _ = &mut *shutdown => return Ok(None),
            result = Entry::setup(config.clone()) => match result {
                Ok(entry) => return Ok(Some(entry)),
                Err(CoreError::NotReady { kind, reason }) => {
                    warn!(%kind, %reason, retry_secs = interval.as_secs(), "device not ready");
                    if !global.quiet {
                        eprintln!("Device not ready ({reason}); retrying in {}s", interval.as_secs());
                    }
                }
                Err(err) => return Err(err.into()),
            },
        }

        tokio::select! {
            biased;
            _ = &mut *shutdown => return Ok(None),
            () = tokio::time::sleep(interval) => {}
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    mut config: EntryConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(secs) = args.interval {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be greater than zero".into(),
            });
        }
        config.scan_interval = Duration::from_secs(secs);
    }
    let interval = config.scan_interval;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let Some(entry) = setup_with_retry(config, interval, global, &mut shutdown).await? else {
        return Ok(());
    };

    let result = follow(&entry, args.count, global, &mut shutdown).await;
    entry.unload().await;
    result
}

/// Print the current status, then one line per update.
async fn follow(
    entry: &Entry,
    count: Option<u64>,
    global: &GlobalOpts,
    shutdown: &mut (impl Future<Output = std::io::Result<()>> + Unpin),
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let coordinator = entry.coordinator();
    let first = WatchLine::new(&coordinator.status(), coordinator.snapshot().as_deref());
    output::print_output(&render(&first, global, color)?, global.quiet);

    let mut printed = 1;
    if count.is_some_and(|count| printed >= count) {
        return Ok(());
    }

    let mut updates = coordinator.subscribe().into_stream();
    entry.start().await;
    info!(entry = %entry.id(), interval_secs = coordinator.scan_interval().as_secs(), "watching");

    loop {
        tokio::select! {
            biased;
            _ = &mut *shutdown => {
                info!("shutdown requested");
                return Ok(());
            }
            update = updates.next() => {
                let Some(status) = update else { return Ok(()) };
                let line = WatchLine::new(&status, coordinator.snapshot().as_deref());
                output::print_output(&render(&line, global, color)?, global.quiet);
                printed += 1;
                if count.is_some_and(|count| printed >= count) {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use myheat_api::ErrorKind;
    use myheat_core::RefreshOutcome;

    #[test]
    fn failed_update_names_the_failure_kind() {
        let status = UpdateStatus {
            sequence: 4,
            outcome: Some(RefreshOutcome::Failed {
                kind: ErrorKind::Timeout,
                message: myheat_api::Error::Timeout {
                    timeout: std::time::Duration::from_secs(10),
                }
                .to_string(),
            }),
            at: None,
        };
        let text = WatchLine::new(&status, None).text(false);
        assert_eq!(text, "-  #4  failed  timeout: Request timed out after 10s");
    }

    #[test]
    fn successful_update_without_snapshot_is_terse() {
        let status = UpdateStatus {
            sequence: 1,
            outcome: Some(RefreshOutcome::Success),
            at: None,
        };
        assert_eq!(WatchLine::new(&status, None).text(false), "-  #1  ok");
    }
}
