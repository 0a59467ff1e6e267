//! House Prices Feature Pipeline - Main Entry Point
//!
//! Usage: `houseprices-features [config-file]`

use runner::settings::RunnerConfig;
use runner::{init_logging, run};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = RunnerConfig::load(config_path.as_deref())?;
    init_logging(&config.log_level, config.log_json)?;

    info!("=== House Prices Feature Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let summary = run(&config).await?;
    info!(
        "Wrote {} rows with {} features to {}",
        summary.output_rows, summary.feature_len, config.sink_table
    );

    Ok(())
}
