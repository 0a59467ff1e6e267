//! Column Projection
//!
//! Selects, renames and casts a fixed subset of raw columns into the working
//! schema. Rows are neither filtered nor reordered.

use crate::error::{FeatureError, Result};
use dataset::{ColumnType, Field, RecordSet, Schema};
use serde::{Deserialize, Serialize};

/// One projected column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name in the input
    pub source: String,
    /// Output name, defaults to `source`
    pub alias: Option<String>,
    /// Target type, defaults to the source type
    pub cast: Option<ColumnType>,
}

impl ColumnSpec {
    /// Keep a column as is
    pub fn keep(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alias: None,
            cast: None,
        }
    }

    /// Keep a column under a new name
    pub fn renamed(source: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alias: Some(alias.into()),
            cast: None,
        }
    }

    /// Same column, cast to `to`
    pub fn with_cast(self, to: ColumnType) -> Self {
        Self {
            cast: Some(to),
            ..self
        }
    }

    /// Name the column has after projection
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.source)
    }
}

/// Projection stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProjection {
    columns: Vec<ColumnSpec>,
}

impl ColumnProjection {
    /// Create a projection; output names must be unique
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self> {
        if columns.is_empty() {
            return Err(FeatureError::ConfigError(
                "projection selects no columns".to_string(),
            ));
        }
        for (i, spec) in columns.iter().enumerate() {
            if columns[..i]
                .iter()
                .any(|other| other.output_name() == spec.output_name())
            {
                return Err(FeatureError::ConfigError(format!(
                    "projection produces column {} twice",
                    spec.output_name()
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub(crate) fn label(&self) -> String {
        format!("projection({} columns)", self.columns.len())
    }

    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        for spec in &self.columns {
            if !schema.contains(&spec.source) {
                return Err(FeatureError::SchemaError(format!(
                    "projection source column {} not found",
                    spec.source
                )));
            }
        }
        Ok(())
    }

    /// Apply the projection
    pub fn transform(&self, data: RecordSet) -> Result<RecordSet> {
        self.check_schema(data.schema())?;

        let mut fields = Vec::with_capacity(self.columns.len());
        let mut sources = Vec::with_capacity(self.columns.len());
        for spec in &self.columns {
            let idx = data.schema().require(&spec.source)?;
            let source = &data.schema().fields()[idx];
            let field = match spec.cast {
                Some(dtype) if dtype != source.dtype => Field::new(spec.output_name(), dtype),
                _ => Field {
                    name: spec.output_name().to_string(),
                    ..source.clone()
                },
            };
            sources.push((idx, spec.cast));
            fields.push(field);
        }

        let (_, rows) = data.into_parts();
        let rows = rows
            .into_iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|&(idx, cast)| match cast {
                        Some(dtype) => row[idx].cast(dtype),
                        None => row[idx].clone(),
                    })
                    .collect()
            })
            .collect();

        Ok(RecordSet::new(Schema::new(fields)?, rows)?)
    }
}
