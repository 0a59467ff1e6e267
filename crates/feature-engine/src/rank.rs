//! Partitioned Ranking

use crate::error::{FeatureError, Result};
use dataset::{ColumnType, Field, RecordSet, Schema, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Rank of `order` (descending) within rows sharing a `partition` value.
///
/// Ranks are 1-based with gaps: tied rows share a rank and the next distinct
/// value skips by the size of the tie. Nulls sort last and tie with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionRank {
    pub partition: String,
    pub order: String,
    pub output: String,
}

impl PartitionRank {
    pub fn new(
        partition: impl Into<String>,
        order: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            partition: partition.into(),
            order: order.into(),
            output: output.into(),
        }
    }

    pub(crate) fn label(&self) -> String {
        format!("rank({} by {} -> {})", self.order, self.partition, self.output)
    }

    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        if !schema.contains(&self.partition) {
            return Err(FeatureError::SchemaError(format!(
                "rank partition column {} not found",
                self.partition
            )));
        }
        match schema.field(&self.order) {
            Some(field) if field.dtype.is_numeric() => Ok(()),
            Some(field) => Err(FeatureError::SchemaError(format!(
                "rank order column {} is {}, expected a number",
                self.order, field.dtype
            ))),
            None => Err(FeatureError::SchemaError(format!(
                "rank order column {} not found",
                self.order
            ))),
        }
    }

    /// Append the rank column; row order is unchanged
    pub fn transform(&self, data: RecordSet) -> Result<RecordSet> {
        self.check_schema(data.schema())?;

        let keys = data.column(&self.partition)?;
        let order: Vec<Option<f64>> = data
            .column(&self.order)?
            .into_iter()
            .map(Value::as_f64)
            .collect();

        let mut partitions: HashMap<Option<String>, Vec<usize>> = HashMap::new();
        for (row, key) in keys.into_iter().enumerate() {
            let key = (!key.is_null()).then(|| key.to_string());
            partitions.entry(key).or_default().push(row);
        }

        let mut ranks = vec![0i64; data.num_rows()];
        for rows in partitions.values_mut() {
            rows.sort_by(|&a, &b| descending_nulls_last(order[a], order[b]));

            let mut rank = 0i64;
            for (pos, &row) in rows.iter().enumerate() {
                let tied = pos > 0
                    && descending_nulls_last(order[rows[pos - 1]], order[row]) == Ordering::Equal;
                if !tied {
                    rank = pos as i64 + 1;
                }
                ranks[row] = rank;
            }
        }

        let ranks = ranks.into_iter().map(Value::Int).collect();
        Ok(data.with_column(Field::new(self.output.clone(), ColumnType::Int), ranks)?)
    }
}

fn descending_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        // -0.0 + 0.0 is 0.0, so signed zeros tie
        (Some(a), Some(b)) => (b + 0.0).total_cmp(&(a + 0.0)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
