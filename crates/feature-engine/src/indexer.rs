//! Categorical Indexing
//!
//! Maps each distinct value of a categorical column to a dense integer code.
//! Codes are assigned by descending frequency, ties broken by first
//! appearance, and one extra code is reserved for values absent at fit time.

use crate::error::{FeatureError, Result};
use crate::policy::{record_dropped, InvalidPolicy};
use dataset::{ColumnType, Field, RecordSet, Schema, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Learned value -> code mapping for one column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryIndex {
    /// Category labels, position = code
    labels: Vec<String>,
    codes: HashMap<String, i64>,
}

impl CategoryIndex {
    /// Build the index from the observed values. Nulls are not categories.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        // label -> (count, first seen position)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        for (pos, value) in values.into_iter().enumerate() {
            if value.is_null() {
                continue;
            }
            counts
                .entry(value.to_string())
                .or_insert((0, pos))
                .0 += 1;
        }

        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_b.cmp(count_a).then(first_a.cmp(first_b))
        });

        let labels: Vec<String> = ranked.into_iter().map(|(label, _)| label).collect();
        let codes = labels
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code as i64))
            .collect();

        Self { labels, codes }
    }

    /// Labels in code order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of categories seen at fit time
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Code assigned to null and unseen values
    pub fn reserved_code(&self) -> i64 {
        self.labels.len() as i64
    }

    /// Number of codes including the reserved one
    pub fn cardinality(&self) -> usize {
        self.labels.len() + 1
    }

    /// Code of a value, if it was seen at fit time
    pub fn code(&self, value: &Value) -> Option<i64> {
        if value.is_null() {
            return None;
        }
        self.codes.get(&value.to_string()).copied()
    }
}

/// Indexer stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalIndexer {
    pub input: String,
    pub output: String,
    pub policy: InvalidPolicy,
}

impl CategoricalIndexer {
    pub fn new(input: impl Into<String>, output: impl Into<String>, policy: InvalidPolicy) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            policy,
        }
    }

    pub(crate) fn label(&self) -> String {
        format!("indexer({} -> {})", self.input, self.output)
    }

    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        match schema.field(&self.input) {
            None => Err(FeatureError::SchemaError(format!(
                "indexer input column {} not found",
                self.input
            ))),
            Some(field) if matches!(field.dtype, ColumnType::Vector(_)) => {
                Err(FeatureError::SchemaError(format!(
                    "indexer input column {} is a vector",
                    self.input
                )))
            }
            Some(_) => Ok(()),
        }
    }

    /// Learn the category index from `data`
    pub fn fit(&self, data: &RecordSet) -> Result<CategoryIndex> {
        self.check_schema(data.schema())?;
        let index = CategoryIndex::from_values(data.column(&self.input)?);
        debug!(
            "{} learned {} categories: {:?}",
            self.label(),
            index.len(),
            index.labels()
        );
        Ok(index)
    }

    /// Append the integer code column
    pub fn transform(&self, index: &CategoryIndex, data: RecordSet) -> Result<RecordSet> {
        self.check_schema(data.schema())?;

        let mut keep = vec![true; data.num_rows()];
        let mut codes = Vec::with_capacity(data.num_rows());
        for (row, value) in data.column(&self.input)?.into_iter().enumerate() {
            let code = match (index.code(value), self.policy) {
                (Some(code), _) => Value::Int(code),
                (None, InvalidPolicy::Keep) => Value::Int(index.reserved_code()),
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
            codes.push(code);
        }

        let field = Field::new(self.output.clone(), ColumnType::Int)
            .with_cardinality(index.cardinality());
        let data = data.with_column(field, codes)?;

        let dropped = keep.iter().filter(|k| !**k).count();
        record_dropped(&self.label(), dropped);
        Ok(if dropped > 0 { data.filter_rows(&keep) } else { data })
    }
}
