//! Row-Oriented Record Set

use crate::schema::{Field, Schema};
use crate::value::Value;
use crate::{DatasetError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Table of rows sharing one schema. Row identity is positional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl RecordSet {
    /// Create a record set, checking every row against the schema
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(DatasetError::ArityMismatch {
                    row: row_idx,
                    expected: schema.len(),
                    actual: row.len(),
                });
            }
            for (field, value) in schema.fields().iter().zip(row) {
                check_value(field, row_idx, value)?;
            }
        }
        Ok(Self { schema, rows })
    }

    /// Record set with no rows
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Build from whole columns, all of the same length
    pub fn from_columns(columns: Vec<(Field, Vec<Value>)>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, |(_, values)| values.len());
        let mut fields = Vec::with_capacity(columns.len());
        let mut rows: Vec<Vec<Value>> = (0..num_rows)
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();

        for (field, values) in columns {
            if values.len() != num_rows {
                return Err(DatasetError::LengthMismatch {
                    column: field.name,
                    expected: num_rows,
                    actual: values.len(),
                });
            }
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
            fields.push(field);
        }

        Self::new(Schema::new(fields)?, rows)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split into schema and rows
    pub fn into_parts(self) -> (Schema, Vec<Vec<Value>>) {
        (self.schema, self.rows)
    }

    /// Borrow every cell of one column
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.schema.require(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Append a column, or replace the column of the same name in place
    pub fn with_column(mut self, field: Field, values: Vec<Value>) -> Result<Self> {
        if values.len() != self.rows.len() {
            return Err(DatasetError::LengthMismatch {
                column: field.name,
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        for (row_idx, value) in values.iter().enumerate() {
            check_value(&field, row_idx, value)?;
        }

        let width = self.schema.len();
        let idx = self.schema.upsert(field);
        for (row, value) in self.rows.iter_mut().zip(values) {
            if idx < width {
                row[idx] = value;
            } else {
                row.push(value);
            }
        }
        Ok(self)
    }

    /// Keep the rows whose mask entry is true
    pub fn filter_rows(self, keep: &[bool]) -> Self {
        let rows = self
            .rows
            .into_iter()
            .zip(keep)
            .filter_map(|(row, &k)| k.then_some(row))
            .collect();
        Self {
            schema: self.schema,
            rows,
        }
    }

    /// Export a vector or numeric column as a dense `rows x width` matrix
    pub fn to_matrix(&self, name: &str) -> Result<Array2<f64>> {
        let idx = self.schema.require(name)?;
        let width = self.schema.fields()[idx].dtype.width();
        let mut flat = Vec::with_capacity(self.rows.len() * width);

        for (row_idx, row) in self.rows.iter().enumerate() {
            match &row[idx] {
                Value::Vector(v) if v.len() == width => flat.extend_from_slice(v),
                other => match other.as_f64() {
                    Some(x) if width == 1 => flat.push(x),
                    _ => {
                        return Err(DatasetError::NotNumeric {
                            column: name.to_string(),
                            row: row_idx,
                        })
                    }
                },
            }
        }

        Array2::from_shape_vec((self.rows.len(), width), flat).map_err(|_| {
            DatasetError::NotNumeric {
                column: name.to_string(),
                row: 0,
            }
        })
    }

    /// Export a numeric scalar column, e.g. the regression label
    pub fn to_column_vector(&self, name: &str) -> Result<Array1<f64>> {
        self.column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.as_f64().ok_or_else(|| DatasetError::NotNumeric {
                    column: name.to_string(),
                    row,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Array1::from)
    }
}

fn check_value(field: &Field, row: usize, value: &Value) -> Result<()> {
    if value.conforms_to(field.dtype) {
        Ok(())
    } else {
        Err(DatasetError::TypeMismatch {
            column: field.name.clone(),
            row,
            expected: field.dtype,
            actual: value.kind().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;
    use proptest::prelude::*;

    fn sample() -> RecordSet {
        RecordSet::from_columns(vec![
            (
                Field::new("MSZoning", ColumnType::Str),
                vec!["RL".into(), "RM".into(), Value::Null],
            ),
            (
                Field::new("LotArea", ColumnType::Int),
                vec![Value::Int(8450), Value::Int(9600), Value::Int(11250)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_columns() {
        let records = sample();
        assert_eq!(records.num_rows(), 3);
        assert_eq!(records.schema().names(), vec!["MSZoning", "LotArea"]);
        assert_eq!(records.rows()[1], vec![Value::from("RM"), Value::Int(9600)]);
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let schema = Schema::new(vec![Field::new("LotArea", ColumnType::Int)]).unwrap();
        let err = RecordSet::new(schema, vec![vec![Value::from("big")]]).unwrap_err();
        assert!(matches!(err, DatasetError::TypeMismatch { row: 0, .. }));
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let schema = Schema::new(vec![Field::new("a", ColumnType::Int)]).unwrap();
        let err = RecordSet::new(schema, vec![vec![Value::Int(1), Value::Int(2)]]).unwrap_err();
        assert_eq!(
            err,
            DatasetError::ArityMismatch {
                row: 0,
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_with_column_appends_and_replaces() {
        let records = sample()
            .with_column(
                Field::new("rank", ColumnType::Int),
                vec![Value::Int(1), Value::Int(2), Value::Int(3)],
            )
            .unwrap()
            .with_column(
                Field::new("MSZoning", ColumnType::Int),
                vec![Value::Int(0), Value::Int(1), Value::Int(2)],
            )
            .unwrap();

        assert_eq!(records.schema().names(), vec!["MSZoning", "LotArea", "rank"]);
        assert_eq!(records.rows()[2], vec![Value::Int(2), Value::Int(11250), Value::Int(3)]);
    }

    #[test]
    fn test_with_column_length_checked() {
        let err = sample()
            .with_column(Field::new("x", ColumnType::Int), vec![Value::Int(1)])
            .unwrap_err();
        assert!(matches!(err, DatasetError::LengthMismatch { expected: 3, actual: 1, .. }));
    }

    #[test]
    fn test_filter_rows() {
        let records = sample().filter_rows(&[true, false, true]);
        assert_eq!(records.num_rows(), 2);
        assert_eq!(records.rows()[1][1], Value::Int(11250));
    }

    #[test]
    fn test_to_matrix() {
        let records = RecordSet::from_columns(vec![(
            Field::new("features", ColumnType::Vector(2)),
            vec![Value::Vector(vec![1.0, 0.0]), Value::Vector(vec![0.0, 1.0])],
        )])
        .unwrap();

        let matrix = records.to_matrix("features").unwrap();
        assert_eq!(matrix.shape(), &[2, 2]);
        assert_eq!(matrix[[1, 1]], 1.0);

        let lot = sample().to_column_vector("LotArea").unwrap();
        assert_eq!(lot.to_vec(), vec![8450.0, 9600.0, 11250.0]);
        assert!(sample().to_column_vector("MSZoning").is_err());
    }

    proptest! {
        #[test]
        fn prop_filter_rows_keeps_marked_rows_in_order(
            keep in prop::collection::vec(any::<bool>(), 0..64)
        ) {
            let values: Vec<Value> = (0..keep.len() as i64).map(Value::Int).collect();
            let records = RecordSet::from_columns(vec![(Field::new("Id", ColumnType::Int), values)])
                .unwrap()
                .filter_rows(&keep);

            let expected: Vec<Value> = keep
                .iter()
                .enumerate()
                .filter(|(_, k)| **k)
                .map(|(i, _)| Value::Int(i as i64))
                .collect();
            let kept: Vec<Value> = records.rows().iter().map(|r| r[0].clone()).collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
