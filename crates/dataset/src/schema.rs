//! Column Types and Schemas

use crate::{DatasetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Int,
    Float,
    Str,
    /// Dense float vector of a fixed length
    Vector(usize),
}

impl ColumnType {
    /// Whether values of this type can be bucketed or ranked
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::Float)
    }

    /// Number of slots the column occupies in an assembled feature vector
    pub fn width(&self) -> usize {
        match self {
            ColumnType::Vector(len) => *len,
            _ => 1,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Int => write!(f, "int"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Str => write!(f, "string"),
            ColumnType::Vector(len) => write!(f, "vector[{}]", len),
        }
    }
}

/// Named, typed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub dtype: ColumnType,
    /// Number of distinct codes for an indexed categorical column,
    /// reserved code included
    pub cardinality: Option<usize>,
}

impl Field {
    /// Create a field without categorical metadata
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
            cardinality: None,
        }
    }

    /// Attach the number of codes an indexer produced for this column
    pub fn with_cardinality(mut self, cardinality: usize) -> Self {
        self.cardinality = Some(cardinality);
        self
    }
}

/// Ordered set of fields valid at one point in the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Create a schema, rejecting duplicate names
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(DatasetError::DuplicateColumn(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of a column
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Position of a column that must exist
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))
    }

    /// Column names in order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Append a field, or replace the field of the same name in place.
    /// Returns the position the field ended up at.
    pub(crate) fn upsert(&mut self, field: Field) -> usize {
        match self.index_of(&field.name) {
            Some(idx) => {
                self.fields[idx] = field;
                idx
            }
            None => {
                self.fields.push(field);
                self.fields.len() - 1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Schema::new(vec![
            Field::new("LotArea", ColumnType::Int),
            Field::new("LotArea", ColumnType::Float),
        ]);
        assert_eq!(result, Err(DatasetError::DuplicateColumn("LotArea".into())));
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut schema = Schema::new(vec![
            Field::new("a", ColumnType::Int),
            Field::new("b", ColumnType::Str),
        ])
        .unwrap();

        assert_eq!(schema.upsert(Field::new("a", ColumnType::Float)), 0);
        assert_eq!(schema.upsert(Field::new("c", ColumnType::Int)), 2);
        assert_eq!(schema.names(), vec!["a", "b", "c"]);
        assert_eq!(schema.field("a").map(|f| f.dtype), Some(ColumnType::Float));
    }

    #[test]
    fn test_width() {
        assert_eq!(ColumnType::Float.width(), 1);
        assert_eq!(ColumnType::Vector(7).width(), 7);
    }
}
