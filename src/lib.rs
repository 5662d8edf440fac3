//! diarisk — Diabetes risk prediction with a train/serve-consistent
//! preprocessing pipeline.
//!
//! Modular structure:
//! - [`data`] — Column tables, record representation, CSV loading
//! - [`preprocess`] — Cleaning, feature engineering, encoding, scaling
//! - [`model`] — Swappable classification strategies (forest/logistic/svm)
//! - [`train`] — Offline training run and evaluation metrics
//! - [`artifacts`] — Persisted model + preprocessor pair
//! - [`predictor`] — Immutable serving context
//! - [`risk`] — Probability → risk tier mapping
//! - [`service`] — axum HTTP API
//! - [`logging`] — Structured JSON logging

pub mod artifacts;
pub mod config;
pub mod data;
pub mod logging;
pub mod model;
pub mod predictor;
pub mod preprocess;
pub mod risk;
pub mod service;
pub mod train;

pub use artifacts::{ArtifactMeta, ArtifactError};
pub use config::ServiceConfig;
pub use data::{FieldValue, Record};
pub use model::{FittedModel, ModelKind};
pub use predictor::{PredictionOutcome, Predictor};
pub use preprocess::{Preprocessor, PreprocessorState};
pub use risk::RiskLevel;
pub use train::TrainingReport;
