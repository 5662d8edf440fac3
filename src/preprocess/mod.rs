//! Cleaning, feature engineering, encoding, and scaling — fitted once at
//! training time, mirrored exactly at prediction time.

pub mod clean;
pub mod encode;
mod pipeline;

pub use pipeline::{stratified_split, Preprocessor, PreprocessError};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Standard-scaler parameters for the numeric columns, fitted on the
/// training split only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub columns: Vec<String>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

/// Everything learned from the training set that serving depends on. This
/// struct is the binding contract between train and serve: it is persisted
/// verbatim and reloaded read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorState {
    /// Imputation medians per numeric column.
    pub medians: BTreeMap<String, f64>,
    /// Imputation modes per categorical column.
    pub modes: BTreeMap<String, String>,
    /// [p1, p99] outlier caps per numeric column, fixed at fit time.
    pub caps: BTreeMap<String, (f64, f64)>,
    /// Categories with training frequency below 1%, per column.
    pub rare: BTreeMap<String, BTreeSet<String>>,
    /// Sorted category tables per categorical column; position = index.
    pub encoders: BTreeMap<String, Vec<String>>,
    pub scaler: ScalerParams,
    /// The ordered feature list the model was fitted on.
    pub feature_names: Vec<String>,
}
