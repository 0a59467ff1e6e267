//! Auxiliary Lookup Join
//!
//! Left-outer-joins the working record set with an external lookup table.

use crate::error::{FeatureError, JoinSide, Result};
use dataset::{Field, RecordSet, Schema, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Lookup column appended to every joined row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinAttribute {
    /// Column in the lookup table
    pub source: String,
    /// Name in the output
    pub alias: String,
}

impl JoinAttribute {
    pub fn new(source: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alias: alias.into(),
        }
    }
}

/// Normalised key so that `60`, `60.0` and `"60"` meet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Integer(i64),
    /// Bits of a non-integral float
    Fraction(u64),
    Text(String),
}

impl JoinKey {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Vector(_) => None,
            Value::Int(v) => Some(JoinKey::Integer(*v)),
            Value::Float(v) => Self::of_float(*v),
            Value::Str(s) => {
                let trimmed = s.trim();
                if let Ok(v) = trimmed.parse::<i64>() {
                    Some(JoinKey::Integer(v))
                } else if let Ok(v) = trimmed.parse::<f64>() {
                    Self::of_float(v)
                } else {
                    Some(JoinKey::Text(s.clone()))
                }
            }
        }
    }

    fn of_float(v: f64) -> Option<Self> {
        if v.is_nan() {
            return None;
        }
        // integral floats in i64 range meet integer keys; -0.0 lands on 0
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v < -(i64::MIN as f64) {
            Some(JoinKey::Integer(v as i64))
        } else {
            Some(JoinKey::Fraction(v.to_bits()))
        }
    }
}

/// Join stage configuration; owns the lookup table
#[derive(Debug, Clone, PartialEq)]
pub struct LookupJoin {
    lookup: RecordSet,
    left_key: String,
    right_key: String,
    attributes: Vec<JoinAttribute>,
}

impl LookupJoin {
    /// Create a join. The lookup side is validated here.
    pub fn new(
        lookup: RecordSet,
        left_key: impl Into<String>,
        right_key: impl Into<String>,
        attributes: Vec<JoinAttribute>,
    ) -> Result<Self> {
        let right_key = right_key.into();
        if !lookup.schema().contains(&right_key) {
            return Err(FeatureError::JoinKeyError {
                side: JoinSide::Right,
                column: right_key,
            });
        }
        if attributes.is_empty() {
            return Err(FeatureError::ConfigError(
                "join appends no lookup columns".to_string(),
            ));
        }
        for attribute in &attributes {
            if !lookup.schema().contains(&attribute.source) {
                return Err(FeatureError::SchemaError(format!(
                    "lookup column {} not found",
                    attribute.source
                )));
            }
        }
        Ok(Self {
            lookup,
            left_key: left_key.into(),
            right_key,
            attributes,
        })
    }

    pub fn lookup(&self) -> &RecordSet {
        &self.lookup
    }

    pub(crate) fn label(&self) -> String {
        format!("join({} = {})", self.left_key, self.right_key)
    }

    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        if !schema.contains(&self.left_key) {
            return Err(FeatureError::JoinKeyError {
                side: JoinSide::Left,
                column: self.left_key.clone(),
            });
        }
        for attribute in &self.attributes {
            if schema.contains(&attribute.alias) {
                return Err(FeatureError::SchemaError(format!(
                    "joined column {} already exists",
                    attribute.alias
                )));
            }
        }
        Ok(())
    }

    /// Join `data` with the lookup table. Unmatched rows get nulls; a row
    /// matching several lookup rows is emitted once per match.
    pub fn transform(&self, data: RecordSet) -> Result<RecordSet> {
        self.check_schema(data.schema())?;

        let right_idx = self.lookup.schema().require(&self.right_key)?;
        let attribute_idx = self
            .attributes
            .iter()
            .map(|a| self.lookup.schema().require(&a.source))
            .collect::<dataset::Result<Vec<_>>>()?;

        let mut matches: HashMap<JoinKey, Vec<usize>> = HashMap::new();
        for (row, values) in self.lookup.rows().iter().enumerate() {
            if let Some(key) = JoinKey::of(&values[right_idx]) {
                matches.entry(key).or_default().push(row);
            }
        }

        let mut fields = data.schema().fields().to_vec();
        for (attribute, &idx) in self.attributes.iter().zip(&attribute_idx) {
            let source = &self.lookup.schema().fields()[idx];
            fields.push(Field::new(attribute.alias.clone(), source.dtype));
        }

        let left_idx = data.schema().require(&self.left_key)?;
        let input_rows = data.num_rows();
        let (_, rows) = data.into_parts();
        let mut joined = Vec::with_capacity(rows.len());

        for row in rows {
            let hits = JoinKey::of(&row[left_idx]).and_then(|key| matches.get(&key));
            match hits {
                Some(hits) => {
                    for &hit in hits {
                        let right = &self.lookup.rows()[hit];
                        let mut out = row.clone();
                        out.extend(attribute_idx.iter().map(|&i| right[i].clone()));
                        joined.push(out);
                    }
                }
                None => {
                    let mut out = row;
                    out.extend(attribute_idx.iter().map(|_| Value::Null));
                    joined.push(out);
                }
            }
        }

        debug!("{} produced {} rows from {}", self.label(), joined.len(), input_rows);
        Ok(RecordSet::new(Schema::new(fields)?, joined)?)
    }
}
