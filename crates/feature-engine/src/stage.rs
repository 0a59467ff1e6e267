//! Pipeline Stages

use crate::assembler::{VectorAssembler, VectorLayout};
use crate::bucketizer::{BucketBoundaries, Bucketizer};
use crate::error::{FeatureError, Result};
use crate::indexer::{CategoricalIndexer, CategoryIndex};
use crate::join::LookupJoin;
use crate::one_hot::{OneHotEncoder, OneHotModel};
use crate::projection::ColumnProjection;
use crate::rank::PartitionRank;
use dataset::{RecordSet, Schema};

/// One configured transformation step
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Project(ColumnProjection),
    Index(CategoricalIndexer),
    Bucketize(Bucketizer),
    Rank(PartitionRank),
    Join(LookupJoin),
    OneHot(OneHotEncoder),
    Assemble(VectorAssembler),
}

/// What a stage learned during fit
#[derive(Debug, Clone, PartialEq)]
pub enum StageState {
    /// Stage has nothing to learn
    Stateless,
    Index(CategoryIndex),
    Buckets(BucketBoundaries),
    OneHot(OneHotModel),
    Assemble(VectorLayout),
}

impl Stage {
    /// Human readable name used in logs and errors
    pub fn label(&self) -> String {
        match self {
            Stage::Project(s) => s.label(),
            Stage::Index(s) => s.label(),
            Stage::Bucketize(s) => s.label(),
            Stage::Rank(s) => s.label(),
            Stage::Join(s) => s.label(),
            Stage::OneHot(s) => s.label(),
            Stage::Assemble(s) => s.label(),
        }
    }

    /// Validate the incoming schema at the stage boundary
    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        match self {
            Stage::Project(s) => s.check_schema(schema),
            Stage::Index(s) => s.check_schema(schema),
            Stage::Bucketize(s) => s.check_schema(schema),
            Stage::Rank(s) => s.check_schema(schema),
            Stage::Join(s) => s.check_schema(schema),
            Stage::OneHot(s) => s.check_schema(schema),
            Stage::Assemble(s) => s.layout(schema).map(|_| ()),
        }
    }

    /// Learn the stage parameters from `data`
    pub fn fit(&self, data: &RecordSet) -> Result<StageState> {
        self.check_schema(data.schema())?;
        Ok(match self {
            Stage::Index(s) => StageState::Index(s.fit(data)?),
            Stage::Bucketize(s) => StageState::Buckets(s.fit(data)?),
            Stage::OneHot(s) => StageState::OneHot(s.fit(data)?),
            Stage::Assemble(s) => StageState::Assemble(s.fit(data)?),
            Stage::Project(_) | Stage::Rank(_) | Stage::Join(_) => StageState::Stateless,
        })
    }

    /// Apply the stage with the state it was fitted to
    pub fn transform(&self, state: &StageState, data: RecordSet) -> Result<RecordSet> {
        self.check_schema(data.schema())?;
        match (self, state) {
            (Stage::Project(s), StageState::Stateless) => s.transform(data),
            (Stage::Rank(s), StageState::Stateless) => s.transform(data),
            (Stage::Join(s), StageState::Stateless) => s.transform(data),
            (Stage::Index(s), StageState::Index(index)) => s.transform(index, data),
            (Stage::Bucketize(s), StageState::Buckets(boundaries)) => s.transform(boundaries, data),
            (Stage::OneHot(s), StageState::OneHot(model)) => s.transform(model, data),
            (Stage::Assemble(s), StageState::Assemble(layout)) => s.transform(layout, data),
            _ => Err(FeatureError::FitNotRunError(self.label())),
        }
    }
}

impl From<ColumnProjection> for Stage {
    fn from(stage: ColumnProjection) -> Self {
        Stage::Project(stage)
    }
}

impl From<CategoricalIndexer> for Stage {
    fn from(stage: CategoricalIndexer) -> Self {
        Stage::Index(stage)
    }
}

impl From<Bucketizer> for Stage {
    fn from(stage: Bucketizer) -> Self {
        Stage::Bucketize(stage)
    }
}

impl From<PartitionRank> for Stage {
    fn from(stage: PartitionRank) -> Self {
        Stage::Rank(stage)
    }
}

impl From<LookupJoin> for Stage {
    fn from(stage: LookupJoin) -> Self {
        Stage::Join(stage)
    }
}

impl From<OneHotEncoder> for Stage {
    fn from(stage: OneHotEncoder) -> Self {
        Stage::OneHot(stage)
    }
}

impl From<VectorAssembler> for Stage {
    fn from(stage: VectorAssembler) -> Self {
        Stage::Assemble(stage)
    }
}
