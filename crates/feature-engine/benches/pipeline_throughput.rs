use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dataset::{ColumnType, Field, RecordSet, Value};
use feature_engine::{
    Bucketizer, CategoricalIndexer, InvalidPolicy, OneHotEncoder, PartitionRank, Pipeline,
    VectorAssembler,
};

const ZONES: [&str; 5] = ["RL", "RM", "FV", "RH", "C (all)"];

fn synthetic(rows: usize) -> RecordSet {
    let zoning = (0..rows).map(|i| Value::from(ZONES[i % ZONES.len()])).collect();
    let lot_area = (0..rows)
        .map(|i| Value::Float(((i * 7919) % 25_000) as f64))
        .collect();
    let living = (0..rows)
        .map(|i| Value::Int(((i * 104_729) % 3_000) as i64 + 400))
        .collect();

    RecordSet::from_columns(vec![
        (Field::new("MSZoning", ColumnType::Str), zoning),
        (Field::new("LotArea", ColumnType::Float), lot_area),
        (Field::new("GrLivArea", ColumnType::Int), living),
    ])
    .expect("synthetic data is well formed")
}

fn pipeline() -> Pipeline {
    Pipeline::new(vec![
        Bucketizer::new(
            "LotArea",
            "LABuckets",
            vec![0.0, 4000.0, 8000.0, 12000.0, 18000.0, f64::INFINITY],
            InvalidPolicy::Skip,
        )
        .expect("valid cut points")
        .into(),
        CategoricalIndexer::new("LABuckets", "LAIndexed", InvalidPolicy::Skip).into(),
        CategoricalIndexer::new("MSZoning", "MSZoningIndexed", InvalidPolicy::Skip).into(),
        PartitionRank::new("MSZoning", "GrLivArea", "arearank").into(),
        OneHotEncoder::new(
            vec!["LAIndexed".into(), "MSZoningIndexed".into()],
            vec!["LACats".into(), "ZoningCats".into()],
        )
        .expect("matching lists")
        .into(),
        VectorAssembler::new(
            vec!["LACats".into(), "ZoningCats".into()],
            "features",
            InvalidPolicy::Error,
        )
        .expect("inputs listed")
        .into(),
    ])
}

fn bench_fit_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_fit_transform");
    let pipeline = pipeline();

    for rows in [1_460usize, 10_000, 100_000] {
        let data = synthetic(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &data, |b, data| {
            b.iter(|| {
                let (_, out) = pipeline.fit_transform(black_box(data.clone())).unwrap();
                black_box(out.num_rows())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fit_transform);
criterion_main!(benches);
