//! Feature Engineering Engine
//!
//! Provides fit/transform stages that derive, bucket, index, join and encode
//! columns, and the pipeline that runs them in a fixed order to produce one
//! feature vector per record.

mod assembler;
mod bucketizer;
mod error;
mod indexer;
mod join;
mod one_hot;
mod pipeline;
mod policy;
mod projection;
mod rank;
mod stage;

pub use assembler::{VectorAssembler, VectorLayout};
pub use bucketizer::{BucketBoundaries, Bucketizer};
pub use error::{FeatureError, JoinSide, Result};
pub use indexer::{CategoricalIndexer, CategoryIndex};
pub use join::{JoinAttribute, LookupJoin};
pub use one_hot::{OneHotEncoder, OneHotModel};
pub use pipeline::{FittedPipelineState, Pipeline};
pub use policy::InvalidPolicy;
pub use projection::{ColumnProjection, ColumnSpec};
pub use rank::PartitionRank;
pub use stage::{Stage, StageState};
