//! SQLite Table Store

use crate::{SaveMode, StorageError};
use dataset::{ColumnType, Field, RecordSet, Schema, Value};
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Row, TypeInfo, ValueRef};
use std::str::FromStr;
use tracing::{debug, info};

/// Table store backed by a SQLite database
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `url`, e.g. `sqlite://houseprices.db`
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // One long-lived connection: runs are sequential, and an in-memory
        // database only exists for the connection that created it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        info!("Connected to SQLite store at {}", url);
        Ok(Self { pool })
    }

    /// Names of all tables, sorted
    pub async fn table_names(&self) -> Result<Vec<String>, StorageError> {
        let names: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    /// Load a whole table. Column types come from the declared SQLite types.
    pub async fn load(&self, table: &str) -> Result<RecordSet, StorageError> {
        let columns: Vec<(String, String)> =
            sqlx::query_as("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
                .bind(table)
                .fetch_all(&self.pool)
                .await?;
        if columns.is_empty() {
            return Err(StorageError::NotFound(table.to_string()));
        }

        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, declared)| Field::new(name.clone(), column_type(declared)))
            .collect();

        let sql = format!("SELECT * FROM {}", quote_ident(table));
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let rows = rows
            .iter()
            .map(|row| {
                fields
                    .iter()
                    .enumerate()
                    .map(|(idx, field)| decode_cell(row, idx).map(|v| v.cast(field.dtype)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Loaded {} rows from {}", rows.len(), table);
        Ok(RecordSet::new(Schema::new(fields)?, rows)?)
    }

    /// Save a record set as a table. All writes happen in one transaction.
    pub async fn save(
        &self,
        records: &RecordSet,
        table: &str,
        mode: SaveMode,
    ) -> Result<(), StorageError> {
        let fields = records.schema().fields();
        if fields.is_empty() {
            return Err(StorageError::InvalidData(format!(
                "cannot create table {} without columns",
                table
            )));
        }

        let name = quote_ident(table);
        let mut tx = self.pool.begin().await?;

        let existing: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1")
                .bind(table)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            match mode {
                SaveMode::ErrorIfExists => {
                    return Err(StorageError::AlreadyExists(table.to_string()))
                }
                SaveMode::Overwrite => {
                    sqlx::query(&format!("DROP TABLE {}", name))
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        let columns = fields
            .iter()
            .map(|f| format!("{} {}", quote_ident(&f.name), sql_type(f.dtype)))
            .collect::<Vec<_>>()
            .join(", ");
        sqlx::query(&format!("CREATE TABLE {} ({})", name, columns))
            .execute(&mut *tx)
            .await?;

        let placeholders = (1..=fields.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let insert = format!("INSERT INTO {} VALUES ({})", name, placeholders);
        for row in records.rows() {
            let mut query = sqlx::query(&insert);
            for value in row {
                query = bind_value(query, value)?;
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        info!("Saved {} rows to {}", records.num_rows(), table);
        Ok(())
    }
}

/// Map a declared column type to a record set type using SQLite's affinity rules
fn column_type(declared: &str) -> ColumnType {
    let declared = declared.to_ascii_uppercase();
    if declared.contains("INT") {
        ColumnType::Int
    } else if ["REAL", "FLOA", "DOUB", "NUMERIC", "DECIMAL"]
        .iter()
        .any(|t| declared.contains(t))
    {
        ColumnType::Float
    } else {
        ColumnType::Str
    }
}

fn sql_type(dtype: ColumnType) -> &'static str {
    match dtype {
        ColumnType::Int => "INTEGER",
        ColumnType::Float => "REAL",
        // vectors are stored as JSON arrays
        ColumnType::Str | ColumnType::Vector(_) => "TEXT",
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Decode a cell by its storage class
fn decode_cell(row: &SqliteRow, idx: usize) -> Result<Value, StorageError> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw.type_info().name().to_string();

    Ok(match storage_class.as_str() {
        "INTEGER" => Value::Int(row.try_get::<i64, _>(idx)?),
        "REAL" => Value::Float(row.try_get::<f64, _>(idx)?),
        "TEXT" => Value::Str(row.try_get::<String, _>(idx)?),
        other => {
            return Err(StorageError::InvalidData(format!(
                "unsupported SQLite value of type {} in column {}",
                other, idx
            )))
        }
    })
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Result<Query<'q, Sqlite, SqliteArguments<'q>>, StorageError> {
    Ok(match value {
        Value::Null => query.bind(None::<String>),
        Value::Int(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Str(s) => query.bind(s.clone()),
        Value::Vector(v) => query.bind(serde_json::to_string(v)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    fn training() -> RecordSet {
        RecordSet::from_columns(vec![
            (
                Field::new("MSZoning", ColumnType::Str),
                vec![Value::from("RL"), Value::Null],
            ),
            (
                Field::new("label", ColumnType::Float),
                vec![Value::Float(208500.0), Value::Float(181500.0)],
            ),
            (
                Field::new("arearank", ColumnType::Int),
                vec![Value::Int(1), Value::Int(2)],
            ),
            (
                Field::new("features", ColumnType::Vector(2)),
                vec![Value::Vector(vec![1.0, 0.0]), Value::Vector(vec![0.0, 1.0])],
            ),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = store().await;
        store.save(&training(), "training", SaveMode::Overwrite).await.unwrap();

        let loaded = store.load("training").await.unwrap();
        assert_eq!(
            loaded.schema().names(),
            vec!["MSZoning", "label", "arearank", "features"]
        );
        assert_eq!(loaded.schema().fields()[1].dtype, ColumnType::Float);
        assert_eq!(loaded.rows()[0][0], Value::from("RL"));
        assert_eq!(loaded.rows()[1][0], Value::Null);
        assert_eq!(loaded.rows()[1][2], Value::Int(2));
        assert_eq!(loaded.rows()[0][3], Value::from("[1.0,0.0]"));
    }

    #[tokio::test]
    async fn test_overwrite_and_error_if_exists() {
        let store = store().await;
        store.save(&training(), "training", SaveMode::Overwrite).await.unwrap();
        store.save(&training(), "training", SaveMode::Overwrite).await.unwrap();
        assert_eq!(store.load("training").await.unwrap().num_rows(), 2);

        let err = store
            .save(&training(), "training", SaveMode::ErrorIfExists)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert_eq!(store.table_names().await.unwrap(), vec!["training".to_string()]);
    }

    #[tokio::test]
    async fn test_load_casts_to_declared_type() {
        let store = store().await;
        sqlx::query("CREATE TABLE rawdata (MSSubClass INTEGER, LotArea TEXT, SalePrice REAL)")
            .execute(&store.pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO rawdata VALUES (60, '8450', 208500), (20, NULL, 181500.5)")
            .execute(&store.pool)
            .await
            .unwrap();

        let raw = store.load("rawdata").await.unwrap();
        assert_eq!(
            raw.rows()[0],
            vec![Value::Int(60), Value::from("8450"), Value::Float(208500.0)]
        );
        assert_eq!(raw.rows()[1][1], Value::Null);
        assert_eq!(raw.rows()[1][2], Value::Float(181500.5));
    }

    #[tokio::test]
    async fn test_missing_table() {
        let store = store().await;
        assert!(matches!(
            store.load("subconversion").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
