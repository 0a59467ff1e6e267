//! Pipeline Orchestration
//!
//! Holds the ordered stage list. `fit` learns every stage's parameters in
//! declared order and returns them as a `FittedPipelineState`; `transform`
//! replays the stages with that state.

use crate::error::{FeatureError, Result};
use crate::stage::{Stage, StageState};
use dataset::{RecordSet, Schema};
use std::time::Instant;
use tracing::{debug, info};

/// Parameters learned by one `Pipeline::fit` call.
///
/// The default value is the unfitted state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FittedPipelineState {
    /// Schema of the dataset the pipeline was fitted on
    input_schema: Option<Schema>,
    /// Stage labels, in order, of the pipeline that produced this state
    signature: Vec<String>,
    states: Vec<StageState>,
}

impl FittedPipelineState {
    /// State of a pipeline that has not been fitted
    pub fn unfit() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.input_schema.is_some()
    }

    pub fn input_schema(&self) -> Option<&Schema> {
        self.input_schema.as_ref()
    }

    /// Learned state per stage, in stage order
    pub fn stage_states(&self) -> &[StageState] {
        &self.states
    }
}

/// Ordered, fixed list of stages
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    fn signature(&self) -> Vec<String> {
        self.stages.iter().map(Stage::label).collect()
    }

    /// Fit every stage in order, each against the output of the stages before it
    pub fn fit(&self, data: &RecordSet) -> Result<FittedPipelineState> {
        self.fit_transform(data.clone()).map(|(state, _)| state)
    }

    /// Fit, returning the learned state together with the transformed training data
    pub fn fit_transform(&self, data: RecordSet) -> Result<(FittedPipelineState, RecordSet)> {
        let start = Instant::now();
        let input_schema = data.schema().clone();
        info!(
            "Fitting pipeline of {} stages on {} rows",
            self.stages.len(),
            data.num_rows()
        );

        let mut states = Vec::with_capacity(self.stages.len());
        let mut current = data;
        for stage in &self.stages {
            let state = stage.fit(&current)?;
            debug!("Fitted {}: {:?}", stage.label(), state);
            current = stage.transform(&state, current)?;
            info!("{} -> {} rows", stage.label(), current.num_rows());
            states.push(state);
        }

        info!("Pipeline fitted in {:.0?}", start.elapsed());
        let state = FittedPipelineState {
            input_schema: Some(input_schema),
            signature: self.signature(),
            states,
        };
        Ok((state, current))
    }

    /// Apply every stage in order with previously learned state.
    ///
    /// Columns no stage reads may be missing, and raw types may differ from
    /// fit time as long as the stage reading them accepts the new type.
    pub fn transform(&self, state: &FittedPipelineState, data: RecordSet) -> Result<RecordSet> {
        if !state.is_fitted() || state.signature != self.signature() {
            return Err(FeatureError::PipelineNotFittedError);
        }

        let start = Instant::now();
        info!(
            "Transforming {} rows through {} stages",
            data.num_rows(),
            self.stages.len()
        );

        let mut current = data;
        for (stage, stage_state) in self.stages.iter().zip(&state.states) {
            current = stage.transform(stage_state, current)?;
            debug!("{} -> {} rows", stage.label(), current.num_rows());
        }

        info!(
            "Pipeline produced {} rows in {:.0?}",
            current.num_rows(),
            start.elapsed()
        );
        Ok(current)
    }
}
