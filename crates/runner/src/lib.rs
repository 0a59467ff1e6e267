//! House Prices Training Table Runner
//!
//! Loads the raw sales and lookup tables, fits the feature pipeline, and
//! persists the resulting training table.

mod houseprices;
pub mod settings;

pub use houseprices::{house_price_pipeline, FEATURES_COLUMN, LABEL_COLUMN};

use anyhow::Context;
use dataset::RecordSet;
use feature_engine::{FittedPipelineState, Pipeline};
use settings::RunnerConfig;
use std::str::FromStr;
use storage::SqliteStore;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Outcome of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub input_rows: usize,
    pub output_rows: usize,
    /// Length of every assembled feature vector
    pub feature_len: usize,
}

/// Initialize logging
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let level = Level::from_str(level).with_context(|| format!("invalid log level {}", level))?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("failed to set tracing subscriber")
}

/// Fit the pipeline on `raw` and produce the training table
pub fn build_training_table(
    pipeline: &Pipeline,
    raw: RecordSet,
) -> anyhow::Result<(FittedPipelineState, RecordSet, RunSummary)> {
    let input_rows = raw.num_rows();
    let (state, training) = pipeline
        .fit_transform(raw)
        .context("feature pipeline failed")?;

    let features = training.to_matrix(FEATURES_COLUMN)?;
    let (output_rows, feature_len) = features.dim();
    info!(
        "Feature matrix: {} rows x {} features from {} input rows",
        output_rows, feature_len, input_rows
    );

    let summary = RunSummary {
        input_rows,
        output_rows,
        feature_len,
    };
    Ok((state, training, summary))
}

/// Load, fit, transform and save against the configured SQLite store
pub async fn run(config: &RunnerConfig) -> anyhow::Result<RunSummary> {
    let store = SqliteStore::connect(&config.database_url)
        .await
        .with_context(|| format!("cannot open {}", config.database_url))?;

    let raw = store
        .load(&config.source_table)
        .await
        .with_context(|| format!("cannot load {}", config.source_table))?;
    let lookup = store
        .load(&config.lookup_table)
        .await
        .with_context(|| format!("cannot load {}", config.lookup_table))?;
    info!(
        "Loaded {} raw rows and {} lookup rows",
        raw.num_rows(),
        lookup.num_rows()
    );

    let pipeline = house_price_pipeline(lookup, &config.lookup_key, &config.stages)?;
    let (_, training, summary) = build_training_table(&pipeline, raw)?;

    store
        .save(&training, &config.sink_table, config.save_mode)
        .await
        .with_context(|| format!("cannot save {}", config.sink_table))?;

    Ok(summary)
}
