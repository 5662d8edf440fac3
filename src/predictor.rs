//! The serving context: a fitted model plus the matching preprocessor
//! state, immutable after load and shared read-only by every request.

use crate::artifacts::ArtifactMeta;
use crate::data::Record;
use crate::model::FittedModel;
use crate::preprocess::{Preprocessor, PreprocessorState};
use crate::risk::RiskLevel;
use serde::Serialize;
use thiserror::Error;

/// Binary decision threshold on the probability.
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("scoring produced a non-finite probability")]
    InvalidScore,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub prediction: i32,
    pub probability: f64,
    pub risk_level: RiskLevel,
}

pub struct Predictor {
    model: FittedModel,
    preprocessor: Preprocessor,
    meta: ArtifactMeta,
}

impl Predictor {
    pub fn new(model: FittedModel, state: PreprocessorState, meta: ArtifactMeta) -> Self {
        Self {
            model,
            preprocessor: Preprocessor::from_state(state),
            meta,
        }
    }

    pub fn meta(&self) -> &ArtifactMeta {
        &self.meta
    }

    /// Transform one raw record through the prediction-time pipeline and
    /// score it. Deterministic: the same record always yields the same
    /// probability against a fixed artifact pair.
    pub fn predict(&self, record: &Record) -> Result<PredictionOutcome, PredictError> {
        let features = self.preprocessor.transform_record(record);
        let probability = self.model.predict_proba(&features);
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(PredictError::InvalidScore);
        }
        Ok(PredictionOutcome {
            prediction: (probability >= DECISION_THRESHOLD) as i32,
            probability,
            risk_level: RiskLevel::from_probability(probability),
        })
    }
}
