//! Row-Level Invalid Value Policy

use serde::{Deserialize, Serialize};
use tracing::warn;

/// What a stage does with a row it cannot map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidPolicy {
    /// Map the row to the stage's reserved code or slot
    Keep,
    /// Drop the row
    Skip,
    /// Fail the run
    #[default]
    Error,
}

/// Log and count rows dropped by a `skip` policy
pub(crate) fn record_dropped(stage: &str, dropped: usize) {
    if dropped == 0 {
        return;
    }
    warn!("{} dropped {} rows with invalid values", stage, dropped);
    metrics::counter!("feature_rows_dropped_total", "stage" => stage.to_string())
        .increment(dropped as u64);
}
