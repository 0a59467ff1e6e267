//! Numeric Bucketing

use crate::error::{FeatureError, Result};
use crate::policy::{record_dropped, InvalidPolicy};
use dataset::{ColumnType, Field, RecordSet, Schema, Value};
use serde::{Deserialize, Serialize};

/// Strictly increasing cut points. Bucket `i` is `[splits[i], splits[i + 1])`,
/// except the last bucket which also holds the final cut point itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketBoundaries {
    splits: Vec<f64>,
}

impl BucketBoundaries {
    /// Validate cut points. Use infinities for unbounded outer buckets.
    pub fn new(splits: Vec<f64>) -> Result<Self> {
        if splits.len() < 2 {
            return Err(FeatureError::ConfigError(format!(
                "bucketizer needs at least 2 cut points, got {}",
                splits.len()
            )));
        }
        if splits.iter().any(|s| s.is_nan()) {
            return Err(FeatureError::ConfigError(
                "bucketizer cut points contain NaN".to_string(),
            ));
        }
        if let Some(pair) = splits.windows(2).find(|w| w[0] >= w[1]) {
            return Err(FeatureError::ConfigError(format!(
                "bucketizer cut points must be strictly increasing: {} >= {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { splits })
    }

    pub fn splits(&self) -> &[f64] {
        &self.splits
    }

    pub fn num_buckets(&self) -> usize {
        self.splits.len() - 1
    }

    /// Bucket holding `value`, or `None` when it is NaN or outside the outer cuts
    pub fn bucket(&self, value: f64) -> Option<usize> {
        let first = self.splits[0];
        let last = self.splits[self.splits.len() - 1];
        if value.is_nan() || value < first || value > last {
            return None;
        }
        if value == last {
            return Some(self.num_buckets() - 1);
        }
        Some(self.splits.partition_point(|&cut| cut <= value) - 1)
    }
}

/// Bucketizer stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucketizer {
    pub input: String,
    pub output: String,
    boundaries: BucketBoundaries,
    pub policy: InvalidPolicy,
}

impl Bucketizer {
    /// Create a bucketizer; fails with `ConfigError` on bad cut points
    pub fn new(
        input: impl Into<String>,
        output: impl Into<String>,
        splits: Vec<f64>,
        policy: InvalidPolicy,
    ) -> Result<Self> {
        Ok(Self {
            input: input.into(),
            output: output.into(),
            boundaries: BucketBoundaries::new(splits)?,
            policy,
        })
    }

    pub fn boundaries(&self) -> &BucketBoundaries {
        &self.boundaries
    }

    pub(crate) fn label(&self) -> String {
        format!("bucketizer({} -> {})", self.input, self.output)
    }

    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        match schema.field(&self.input) {
            Some(field) if field.dtype.is_numeric() => Ok(()),
            Some(field) => Err(FeatureError::SchemaError(format!(
                "bucketizer input column {} is {}, expected a number",
                self.input, field.dtype
            ))),
            None => Err(FeatureError::SchemaError(format!(
                "bucketizer input column {} not found",
                self.input
            ))),
        }
    }

    /// Boundaries are configured, not learned; fitting checks the input and
    /// freezes them.
    pub fn fit(&self, data: &RecordSet) -> Result<BucketBoundaries> {
        self.check_schema(data.schema())?;
        Ok(self.boundaries.clone())
    }

    /// Append the bucket index column
    pub fn transform(&self, boundaries: &BucketBoundaries, data: RecordSet) -> Result<RecordSet> {
        self.check_schema(data.schema())?;

        let mut keep = vec![true; data.num_rows()];
        let mut buckets = Vec::with_capacity(data.num_rows());
        for (row, value) in data.column(&self.input)?.into_iter().enumerate() {
            let bucket = match (value.as_f64().and_then(|x| boundaries.bucket(x)), self.policy) {
                (Some(b), _) => Value::Int(b as i64),
                (None, InvalidPolicy::Keep) => Value::Int(boundaries.num_buckets() as i64),
                (None, InvalidPolicy::Skip) => {
                    keep[row] = false;
                    Value::Null
                }
                (None, InvalidPolicy::Error) => {
                    return Err(FeatureError::InvalidValueError {
                        stage: self.label(),
                        row,
                        value: value.to_string(),
                    })
                }
            };
            buckets.push(bucket);
        }

        let data = data.with_column(Field::new(self.output.clone(), ColumnType::Int), buckets)?;

        let dropped = keep.iter().filter(|k| !**k).count();
        record_dropped(&self.label(), dropped);
        Ok(if dropped > 0 { data.filter_rows(&keep) } else { data })
    }
}
