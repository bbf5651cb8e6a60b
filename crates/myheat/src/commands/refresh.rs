//! One-shot refresh handler.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use myheat_core::{Coordinator, CoreError, EntryConfig, RefreshOutcome, UpdateStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

/// Outcome of one refresh attempt as shown to the user.
#[derive(Debug, Serialize)]
pub struct RefreshReport {
    pub sequence: u64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_actual: Option<bool>,
}

impl RefreshReport {
    pub fn new(status: &UpdateStatus, data_actual: Option<bool>) -> Self {
        let (kind, error) = match status.outcome {
            Some(RefreshOutcome::Failed { kind, ref message }) => {
                (Some(kind.to_string()), Some(message.clone()))
            }
            _ => (None, None),
        };
        Self {
            sequence: status.sequence,
            success: status.last_update_success(),
            kind,
            error,
            at: status.at,
            data_actual,
        }
    }
}

fn detail(report: &RefreshReport, color: bool) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "Refresh #{}: {}",
        report.sequence,
        output::paint_outcome(report.success, color)
    );
    if let Some(ref error) = report.error {
        let _ = write!(out, " ({error})");
    }
    if report.data_actual == Some(false) {
        let _ = write!(out, "\nDevice reports stale data");
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: &EntryConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = Coordinator::new(util::client(config)?, config.scan_interval);
    let outcome = coordinator.refresh().await;

    let data_actual = coordinator
        .snapshot()
        .map(|snapshot| snapshot.data_actual());
    let report = RefreshReport::new(&coordinator.status(), data_actual);
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| detail(r, color),
        |r| output::paint_outcome(r.success, false),
    )?;
    output::print_output(&out, global.quiet);

    match outcome {
        RefreshOutcome::Success => Ok(()),
        RefreshOutcome::Failed { kind, message } => Err(CoreError::NotReady {
            kind,
            reason: message,
        }
        .into()),
    }
}
