//! House prices stage list

use crate::settings::StageConfig;
use dataset::{ColumnType, RecordSet};
use feature_engine::{
    Bucketizer, CategoricalIndexer, ColumnProjection, ColumnSpec, InvalidPolicy, JoinAttribute,
    LookupJoin, OneHotEncoder, PartitionRank, Pipeline, Result, VectorAssembler,
};

pub const FEATURES_COLUMN: &str = "features";
pub const LABEL_COLUMN: &str = "label";

/// Indexed columns and the encoded vectors they become, in assembly order
const ENCODED: [(&str, &str); 4] = [
    ("MSSubIndexed", "msSubCats"),
    ("LAIndexed", "LACats"),
    ("MSZoningIndexed", "ZoningCats"),
    ("famIndexed", "famCats"),
];

/// Build the pipeline: projection, LotArea bucketing, indexing, living area
/// rank, family interest join, one-hot encoding and assembly.
pub fn house_price_pipeline(
    lookup: RecordSet,
    lookup_key: &str,
    stages: &StageConfig,
) -> Result<Pipeline> {
    // Raw tables are often imported as text, so every consumed column is cast
    let projection = ColumnProjection::new(vec![
        ColumnSpec::keep("MSSubClass").with_cast(ColumnType::Int),
        ColumnSpec::keep("LotArea").with_cast(ColumnType::Float),
        ColumnSpec::keep("MSZoning").with_cast(ColumnType::Str),
        ColumnSpec::keep("GrLivArea").with_cast(ColumnType::Int),
        ColumnSpec::renamed("SalePrice", LABEL_COLUMN).with_cast(ColumnType::Float),
    ])?;

    let lot_area = Bucketizer::new(
        "LotArea",
        "LABuckets",
        stages.lot_area_splits.clone(),
        stages.lot_area_policy,
    )?;

    let family = LookupJoin::new(
        lookup,
        "MSSubClass",
        lookup_key,
        vec![JoinAttribute::new("FamilyInterest", "faminterest")],
    )?;

    let encoder = OneHotEncoder::new(
        ENCODED.iter().map(|(input, _)| input.to_string()).collect(),
        ENCODED.iter().map(|(_, output)| output.to_string()).collect(),
    )?;

    let assembler = VectorAssembler::new(
        ENCODED.iter().map(|(_, output)| output.to_string()).collect(),
        FEATURES_COLUMN,
        InvalidPolicy::Error,
    )?;

    Ok(Pipeline::new(vec![
        projection.into(),
        lot_area.into(),
        CategoricalIndexer::new("MSSubClass", "MSSubIndexed", stages.sub_class_policy).into(),
        CategoricalIndexer::new("LABuckets", "LAIndexed", stages.lot_bucket_policy).into(),
        CategoricalIndexer::new("MSZoning", "MSZoningIndexed", stages.zoning_policy).into(),
        PartitionRank::new("MSZoning", "GrLivArea", "arearank").into(),
        family.into(),
        CategoricalIndexer::new("faminterest", "famIndexed", stages.family_policy).into(),
        encoder.into(),
        assembler.into(),
    ]))
}
