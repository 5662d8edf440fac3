//! Offline training run: CSV → preprocessing → stratified split → fit →
//! evaluation report → artifact pair.

pub mod metrics;

use crate::artifacts::{self, ArtifactMeta};
use crate::config::ServiceConfig;
use crate::data;
use crate::model;
use crate::predictor::DECISION_THRESHOLD;
use crate::preprocess::{stratified_split, Preprocessor};
use metrics::ClassificationReport;
use ndarray::Array2;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Everything the training run measured, alongside the persisted pair's
/// metadata.
#[derive(Debug, Serialize)]
pub struct TrainingReport {
    pub model_kind: String,
    pub samples: usize,
    pub positives: usize,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub roc_auc: Option<f64>,
    pub report: ClassificationReport,
    /// (feature, importance) sorted descending; empty when the strategy
    /// exposes none.
    pub feature_importance: Vec<(String, f64)>,
    pub meta: ArtifactMeta,
}

fn select_rows(x: &Array2<f64>, idx: &[usize]) -> Array2<f64> {
    let mut out = Array2::zeros((idx.len(), x.ncols()));
    for (r, &i) in idx.iter().enumerate() {
        out.row_mut(r).assign(&x.row(i));
    }
    out
}

fn predict_matrix(model: &model::FittedModel, x: &Array2<f64>) -> (Vec<f64>, Vec<u8>) {
    let mut probas = Vec::with_capacity(x.nrows());
    let mut preds = Vec::with_capacity(x.nrows());
    for row in x.rows() {
        let p = model.predict_proba(row.as_slice().unwrap_or(&[]));
        probas.push(p);
        preds.push((p >= DECISION_THRESHOLD) as u8);
    }
    (probas, preds)
}

/// Run the complete training pipeline and persist the artifact pair.
pub fn run(config: &ServiceConfig, csv_path: &Path) -> anyhow::Result<TrainingReport> {
    let rows = data::load_csv(csv_path)?;
    let (mut preprocessor, x, y) = Preprocessor::fit(&rows)?;

    let positives = y.iter().filter(|&&l| l == 1).count();
    info!(
        samples = y.len(),
        positives,
        positive_rate = 100.0 * positives as f64 / y.len() as f64,
        "dataset summary"
    );

    let (train_idx, test_idx) = stratified_split(&y, config.training.test_size, config.training.seed);
    let mut x_train = select_rows(&x, &train_idx);
    let mut x_test = select_rows(&x, &test_idx);
    let y_train: Vec<u8> = train_idx.iter().map(|&i| y[i]).collect();
    let y_test: Vec<u8> = test_idx.iter().map(|&i| y[i]).collect();

    preprocessor.fit_scaler(&mut x_train);
    preprocessor.scale_matrix(&mut x_test);

    let kind = config.model.kind;
    info!(model = kind.as_str(), train = y_train.len(), test = y_test.len(), "fitting model");
    let fitted = model::fit(
        kind,
        &config.model.forest,
        &config.model.logistic,
        &config.model.svm,
        &x_train,
        &y_train,
    )?;

    let (_, train_preds) = predict_matrix(&fitted, &x_train);
    let (test_probas, test_preds) = predict_matrix(&fitted, &x_test);

    let train_accuracy = metrics::accuracy(&y_train, &train_preds);
    let test_accuracy = metrics::accuracy(&y_test, &test_preds);
    let roc_auc = metrics::roc_auc(&y_test, &test_probas);
    let report = metrics::classification_report(&y_test, &test_preds);

    info!(train_accuracy, "training accuracy");
    info!(test_accuracy, "test accuracy");
    match roc_auc {
        Some(auc) => info!(roc_auc = auc, "test ROC AUC"),
        None => info!("test ROC AUC undefined (single class in test split)"),
    }
    info!("classification report:\n{}", report);

    let feature_importance = match fitted.feature_importance() {
        Some(importance) => {
            let mut ranked: Vec<(String, f64)> = preprocessor
                .state
                .feature_names
                .iter()
                .cloned()
                .zip(importance)
                .collect();
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            for (feature, value) in ranked.iter().take(10) {
                info!(feature = feature.as_str(), importance = *value, "feature importance");
            }
            ranked
        }
        None => Vec::new(),
    };

    let meta = artifacts::save_pair(
        &config.artifacts.model_path,
        &config.artifacts.preprocessor_path,
        &fitted,
        &preprocessor.state,
    )?;

    Ok(TrainingReport {
        model_kind: kind.as_str().to_string(),
        samples: y.len(),
        positives,
        train_accuracy,
        test_accuracy,
        roc_auc,
        report,
        feature_importance,
        meta,
    })
}
