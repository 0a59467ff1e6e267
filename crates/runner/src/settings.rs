//! Runner Settings

use config::{Config, ConfigError, Environment, File};
use feature_engine::InvalidPolicy;
use serde::{Deserialize, Serialize};
use storage::SaveMode;

/// Where tables come from and go to, and how the stages behave
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// SQLite database holding the raw, lookup and training tables
    pub database_url: String,

    /// Raw house sales table
    pub source_table: String,

    /// Sub class -> family interest lookup table
    pub lookup_table: String,

    /// Join key column in the lookup table
    pub lookup_key: String,

    /// Output table
    pub sink_table: String,
    pub save_mode: SaveMode,

    /// trace, debug, info, warn or error
    pub log_level: String,
    pub log_json: bool,

    pub stages: StageConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://houseprices.db".to_string(),
            source_table: "rawdata".to_string(),
            lookup_table: "subconversion".to_string(),
            lookup_key: "msSubClass".to_string(),
            sink_table: "training".to_string(),
            save_mode: SaveMode::Overwrite,
            log_level: "info".to_string(),
            log_json: false,
            stages: StageConfig::default(),
        }
    }
}

/// Per-stage settings of the house prices pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// LotArea cut points
    pub lot_area_splits: Vec<f64>,
    /// LotArea values outside the cut points
    pub lot_area_policy: InvalidPolicy,
    /// MSSubClass values unseen at fit time
    pub sub_class_policy: InvalidPolicy,
    /// LotArea buckets unseen at fit time
    pub lot_bucket_policy: InvalidPolicy,
    /// MSZoning values unseen at fit time, or null
    pub zoning_policy: InvalidPolicy,
    /// faminterest values unseen at fit time, or null after an unmatched join
    pub family_policy: InvalidPolicy,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            lot_area_splits: vec![0.0, 4000.0, 8000.0, 12000.0, 18000.0, f64::INFINITY],
            lot_area_policy: InvalidPolicy::Skip,
            sub_class_policy: InvalidPolicy::Keep,
            lot_bucket_policy: InvalidPolicy::Skip,
            zoning_policy: InvalidPolicy::Skip,
            family_policy: InvalidPolicy::Keep,
        }
    }
}

impl RunnerConfig {
    /// Layer defaults, then the config file (`houseprices.toml` unless a path
    /// is given), then `HOUSEPRICES_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `HOUSEPRICES_STAGES__ZONING_POLICY=keep`.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path),
            None => File::with_name("houseprices").required(false),
        };

        Config::builder()
            .add_source(Config::try_from(&RunnerConfig::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix("HOUSEPRICES")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_config() {
        let config = RunnerConfig::load(Some("does-not-exist-but-required"));
        assert!(config.is_err());

        let config = RunnerConfig::load(None).unwrap();
        assert_eq!(config.source_table, "rawdata");
        assert_eq!(config.save_mode, SaveMode::Overwrite);
        assert_eq!(config.stages.zoning_policy, InvalidPolicy::Skip);
        assert_eq!(config.stages.lot_area_splits.len(), 6);
        assert!(config.stages.lot_area_splits[5].is_infinite());
    }
}
