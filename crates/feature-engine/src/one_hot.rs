//! One-Hot Encoding
//!
//! Expands indexed categorical columns into binary indicator vectors. Every
//! slot is kept, including the reserved slot for unseen values.

use crate::error::{FeatureError, Result};
use dataset::{ColumnType, Field, RecordSet, Schema, Value};
use serde::{Deserialize, Serialize};

/// Cardinality of each input column, captured at fit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotModel {
    cardinalities: Vec<usize>,
}

impl OneHotModel {
    pub fn cardinalities(&self) -> &[usize] {
        &self.cardinalities
    }
}

/// Encoder stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl OneHotEncoder {
    /// Pair each input column with an output column
    pub fn new(inputs: Vec<String>, outputs: Vec<String>) -> Result<Self> {
        if inputs.is_empty() || inputs.len() != outputs.len() {
            return Err(FeatureError::ConfigError(format!(
                "one-hot encoder needs matching input/output lists, got {} inputs and {} outputs",
                inputs.len(),
                outputs.len()
            )));
        }
        for (i, name) in outputs.iter().enumerate() {
            if outputs[..i].contains(name) {
                return Err(FeatureError::ConfigError(format!(
                    "one-hot encoder produces column {} twice",
                    name
                )));
            }
        }
        Ok(Self { inputs, outputs })
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub(crate) fn label(&self) -> String {
        format!("one-hot({})", self.inputs.join(", "))
    }

    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        for input in &self.inputs {
            match schema.field(input) {
                Some(field) if field.dtype == ColumnType::Int => {}
                Some(field) => {
                    return Err(FeatureError::SchemaError(format!(
                        "one-hot input column {} is {}, expected indexed codes",
                        input, field.dtype
                    )))
                }
                None => {
                    return Err(FeatureError::SchemaError(format!(
                        "one-hot input column {} not found",
                        input
                    )))
                }
            }
        }
        Ok(())
    }

    /// Capture the cardinality each indexer attached to its output column
    pub fn fit(&self, data: &RecordSet) -> Result<OneHotModel> {
        self.check_schema(data.schema())?;

        let cardinalities = self
            .inputs
            .iter()
            .map(|input| match data.schema().field(input).and_then(|f| f.cardinality) {
                Some(cardinality) if cardinality > 0 => Ok(cardinality),
                _ => Err(FeatureError::SchemaError(format!(
                    "one-hot input column {} has no known cardinality; index it first",
                    input
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(OneHotModel { cardinalities })
    }

    /// Append one indicator vector column per input
    pub fn transform(&self, model: &OneHotModel, data: RecordSet) -> Result<RecordSet> {
        self.check_schema(data.schema())?;
        if model.cardinalities.len() != self.inputs.len() {
            return Err(FeatureError::FitNotRunError(self.label()));
        }

        let mut data = data;
        for ((input, output), &cardinality) in self
            .inputs
            .iter()
            .zip(&self.outputs)
            .zip(&model.cardinalities)
        {
            if let Some(current) = data.schema().field(input).and_then(|f| f.cardinality) {
                if current != cardinality {
                    return Err(FeatureError::SchemaError(format!(
                        "one-hot input column {} has {} codes, encoder was fitted with {}",
                        input, current, cardinality
                    )));
                }
            }

            let vectors = data
                .column(input)?
                .into_iter()
                .map(|code| Value::Vector(encode(code, cardinality)))
                .collect();
            data = data.with_column(
                Field::new(output.clone(), ColumnType::Vector(cardinality)),
                vectors,
            )?;
        }
        Ok(data)
    }
}

/// Indicator vector with a single 1. Nulls and out-of-range codes use the
/// reserved last slot.
fn encode(code: &Value, cardinality: usize) -> Vec<f64> {
    let reserved = cardinality - 1;
    let slot = match code.as_i64() {
        Some(c) if c >= 0 && (c as usize) < cardinality => c as usize,
        _ => reserved,
    };
    let mut vector = vec![0.0; cardinality];
    vector[slot] = 1.0;
    vector
}
