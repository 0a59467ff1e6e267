//! Full run against a SQLite file

use dataset::{ColumnType, Field, RecordSet, Value};
use runner::run;
use runner::settings::RunnerConfig;
use storage::{SaveMode, SqliteStore};

fn database_url(name: &str) -> String {
    let path = std::env::temp_dir().join(format!("{}-{}.db", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    format!("sqlite://{}", path.display())
}

async fn seed(url: &str) {
    let store = SqliteStore::connect(url).await.unwrap();

    // raw exports keep everything as text
    let text = |values: &[&str]| values.iter().map(|v| Value::from(*v)).collect::<Vec<_>>();
    let raw = RecordSet::from_columns(vec![
        (Field::new("Id", ColumnType::Str), text(&["1", "2", "3", "4"])),
        (Field::new("MSSubClass", ColumnType::Str), text(&["60", "20", "60", "70"])),
        (Field::new("MSZoning", ColumnType::Str), text(&["RL", "RL", "RM", "RL"])),
        (Field::new("LotArea", ColumnType::Str), text(&["8450", "3500", "11250", "14000"])),
        (Field::new("GrLivArea", ColumnType::Str), text(&["1710", "1262", "1786", "1717"])),
        (
            Field::new("SalePrice", ColumnType::Str),
            text(&["208500", "181500", "223500", "140000"]),
        ),
    ])
    .unwrap();
    store.save(&raw, "rawdata", SaveMode::Overwrite).await.unwrap();

    let lookup = RecordSet::from_columns(vec![
        (
            Field::new("msSubClass", ColumnType::Int),
            vec![Value::Int(60), Value::Int(20), Value::Int(70)],
        ),
        (
            Field::new("FamilyInterest", ColumnType::Str),
            text(&["family", "investor", "family"]),
        ),
    ])
    .unwrap();
    store.save(&lookup, "subconversion", SaveMode::Overwrite).await.unwrap();
}

#[tokio::test]
async fn test_run_writes_training_table() {
    let url = database_url("houseprices-run");
    seed(&url).await;

    let config = RunnerConfig {
        database_url: url.clone(),
        ..RunnerConfig::default()
    };
    let summary = run(&config).await.unwrap();
    assert_eq!(summary.input_rows, 4);
    assert_eq!(summary.output_rows, 4);
    // 3 sub classes, 3 lot buckets, 2 zonings, 2 interests, plus reserved slots
    assert_eq!(summary.feature_len, 4 + 4 + 3 + 3);

    let store = SqliteStore::connect(&url).await.unwrap();
    let training = store.load("training").await.unwrap();
    assert_eq!(training.num_rows(), 4);
    assert_eq!(training.schema().field("label").unwrap().dtype, ColumnType::Float);
    let label = training.schema().index_of("label").unwrap();
    assert_eq!(training.rows()[0][label], Value::Float(208500.0));

    // rerun overwrites rather than appends
    run(&config).await.unwrap();
    assert_eq!(store.load("training").await.unwrap().num_rows(), 4);
}

#[tokio::test]
async fn test_run_fails_without_lookup_table() {
    let url = database_url("houseprices-missing");
    let store = SqliteStore::connect(&url).await.unwrap();
    let raw = RecordSet::from_columns(vec![(
        Field::new("MSSubClass", ColumnType::Int),
        vec![Value::Int(60)],
    )])
    .unwrap();
    store.save(&raw, "rawdata", SaveMode::Overwrite).await.unwrap();

    let config = RunnerConfig {
        database_url: url,
        ..RunnerConfig::default()
    };
    assert!(run(&config).await.is_err());
}
