//! Feature Vector Assembly

use crate::error::{FeatureError, Result};
use crate::policy::{record_dropped, InvalidPolicy};
use dataset::{ColumnType, Field, RecordSet, Schema, Value};
use serde::{Deserialize, Serialize};

/// Name and width of every assembled input, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorLayout {
    columns: Vec<(String, usize)>,
}

impl VectorLayout {
    pub fn columns(&self) -> &[(String, usize)] {
        &self.columns
    }

    /// Length of the assembled vector
    pub fn len(&self) -> usize {
        self.columns.iter().map(|(_, width)| width).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Assembler stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorAssembler {
    inputs: Vec<String>,
    pub output: String,
    /// Handling of null scalar inputs
    pub policy: InvalidPolicy,
}

impl VectorAssembler {
    pub fn new(
        inputs: Vec<String>,
        output: impl Into<String>,
        policy: InvalidPolicy,
    ) -> Result<Self> {
        if inputs.is_empty() {
            return Err(FeatureError::ConfigError(
                "assembler has no input columns".to_string(),
            ));
        }
        Ok(Self {
            inputs,
            output: output.into(),
            policy,
        })
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub(crate) fn label(&self) -> String {
        format!("assembler(-> {})", self.output)
    }

    /// Resolve the layout the inputs have in `schema`
    pub fn layout(&self, schema: &Schema) -> Result<VectorLayout> {
        let columns = self
            .inputs
            .iter()
            .map(|input| {
                let field = schema
                    .field(input)
                    .ok_or_else(|| FeatureError::MissingColumnError(input.clone()))?;
                if field.dtype == ColumnType::Str {
                    return Err(FeatureError::SchemaError(format!(
                        "assembler input column {} is a string",
                        input
                    )));
                }
                Ok((input.clone(), field.dtype.width()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(VectorLayout { columns })
    }

    /// Freeze the layout seen at fit time
    pub fn fit(&self, data: &RecordSet) -> Result<VectorLayout> {
        self.layout(data.schema())
    }

    /// Append the assembled vector column
    pub fn transform(&self, layout: &VectorLayout, data: RecordSet) -> Result<RecordSet> {
        let current = self.layout(data.schema())?;
        if &current != layout {
            return Err(FeatureError::SchemaError(format!(
                "assembler inputs changed shape since fit: {:?} vs {:?}",
                current.columns, layout.columns
            )));
        }

        let indices = self
            .inputs
            .iter()
            .map(|input| data.schema().require(input))
            .collect::<dataset::Result<Vec<_>>>()?;

        let mut keep = vec![true; data.num_rows()];
        let mut vectors = Vec::with_capacity(data.num_rows());
        for (row_idx, row) in data.rows().iter().enumerate() {
            let mut vector = Vec::with_capacity(layout.len());
            for (&idx, (name, width)) in indices.iter().zip(&layout.columns) {
                match &row[idx] {
                    Value::Vector(v) => vector.extend_from_slice(v),
                    Value::Null => match self.policy {
                        InvalidPolicy::Keep => {
                            vector.extend(std::iter::repeat(f64::NAN).take(*width))
                        }
                        InvalidPolicy::Skip => {
                            keep[row_idx] = false;
                            break;
                        }
                        InvalidPolicy::Error => {
                            return Err(FeatureError::InvalidValueError {
                                stage: self.label(),
                                row: row_idx,
                                value: format!("null in {}", name),
                            })
                        }
                    },
                    other => vector.push(other.as_f64().unwrap_or(f64::NAN)),
                }
            }
            vectors.push(if keep[row_idx] {
                Value::Vector(vector)
            } else {
                Value::Null
            });
        }

        let field = Field::new(self.output.clone(), ColumnType::Vector(layout.len()));
        let data = data.with_column(field, vectors)?;

        let dropped = keep.iter().filter(|k| !**k).count();
        record_dropped(&self.label(), dropped);
        Ok(if dropped > 0 { data.filter_rows(&keep) } else { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded() -> RecordSet {
        RecordSet::from_columns(vec![
            (
                Field::new("LACats", ColumnType::Vector(3)),
                vec![
                    Value::Vector(vec![1.0, 0.0, 0.0]),
                    Value::Vector(vec![0.0, 0.0, 1.0]),
                ],
            ),
            (
                Field::new("ZoningCats", ColumnType::Vector(2)),
                vec![Value::Vector(vec![0.0, 1.0]), Value::Vector(vec![1.0, 0.0])],
            ),
            (
                Field::new("arearank", ColumnType::Int),
                vec![Value::Int(3), Value::Null],
            ),
        ])
        .unwrap()
    }

    fn assembler(inputs: &[&str], policy: InvalidPolicy) -> VectorAssembler {
        VectorAssembler::new(inputs.iter().map(|s| s.to_string()).collect(), "features", policy)
            .unwrap()
    }

    #[test]
    fn test_concatenates_in_declared_order() {
        let assembler = assembler(&["ZoningCats", "LACats"], InvalidPolicy::Error);
        let data = encoded();
        let layout = assembler.fit(&data).unwrap();
        let out = assembler.transform(&layout, data).unwrap();

        assert_eq!(layout.len(), 5);
        assert_eq!(out.schema().field("features").unwrap().dtype, ColumnType::Vector(5));
        assert_eq!(out.rows()[0][3], Value::Vector(vec![0.0, 1.0, 1.0, 0.0, 0.0]));
        assert_eq!(out.rows()[1][3], Value::Vector(vec![1.0, 0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_missing_column() {
        let err = assembler(&["LACats", "famCats"], InvalidPolicy::Error)
            .fit(&encoded())
            .unwrap_err();
        assert_eq!(err, FeatureError::MissingColumnError("famCats".into()));
    }

    #[test]
    fn test_null_scalar_policies() {
        let data = encoded();

        let keep = assembler(&["LACats", "arearank"], InvalidPolicy::Keep);
        let layout = keep.fit(&data).unwrap();
        let out = keep.transform(&layout, data.clone()).unwrap();
        assert_eq!(out.num_rows(), 2);
        assert!(out.rows()[1][3].as_vector().unwrap()[3].is_nan());

        let skip = assembler(&["LACats", "arearank"], InvalidPolicy::Skip);
        let out = skip.transform(&layout, data.clone()).unwrap();
        assert_eq!(out.num_rows(), 1);
        assert_eq!(out.rows()[0][3], Value::Vector(vec![1.0, 0.0, 0.0, 3.0]));

        let error = assembler(&["LACats", "arearank"], InvalidPolicy::Error);
        assert!(matches!(
            error.transform(&layout, data),
            Err(FeatureError::InvalidValueError { row: 1, .. })
        ));
    }

    #[test]
    fn test_layout_drift_rejected() {
        let assembler = assembler(&["LACats"], InvalidPolicy::Error);
        let layout = assembler.fit(&encoded()).unwrap();

        let wider = RecordSet::from_columns(vec![(
            Field::new("LACats", ColumnType::Vector(4)),
            vec![Value::Vector(vec![0.0, 0.0, 0.0, 1.0])],
        )])
        .unwrap();
        assert!(matches!(
            assembler.transform(&layout, wider),
            Err(FeatureError::SchemaError(_))
        ));
    }
}
