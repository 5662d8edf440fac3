//! The fit pipeline (training path) and the record transform (serving
//! path). The two must stay consistent: the transform consumes only the
//! fitted [`PreprocessorState`], never recomputing statistics.

use super::clean::{self, BUCKETS};
use super::encode;
use super::{PreprocessorState, ScalerParams};
use crate::data::{
    FieldValue, Record, BINARY_COLUMNS, BUCKET_COLUMNS, CATEGORICAL_COLUMNS, FEATURE_ORDER,
    LABEL_COLUMN, LOG_COLUMNS, NUMERIC_COLUMNS,
};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

/// Training frequency below which a category collapses to `"Other"`.
const RARE_THRESHOLD: f64 = 0.01;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("training set is empty")]
    EmptyDataset,
    #[error("feature matrix construction failed: {0}")]
    Shape(String),
}

/// Fitted preprocessor. Construct with [`Preprocessor::fit`] or wrap a
/// state reloaded from an artifact.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    pub state: PreprocessorState,
}

impl Preprocessor {
    pub fn from_state(state: PreprocessorState) -> Self {
        Self { state }
    }

    /// Run the full training-path pipeline over raw records: impute, cap
    /// outliers, add log columns, collapse rare categories, round, derive
    /// buckets, and encode. Returns the fitted preprocessor (scaler still
    /// unfitted — it is learned on the training split only), the unscaled
    /// feature matrix, and the labels.
    pub fn fit(rows: &[Record]) -> Result<(Self, Array2<f64>, Vec<u8>), PreprocessError> {
        if rows.is_empty() {
            return Err(PreprocessError::EmptyDataset);
        }
        let mut rows = rows.to_vec();
        let mut state = PreprocessorState {
            feature_names: FEATURE_ORDER.iter().map(|s| s.to_string()).collect(),
            ..PreprocessorState::default()
        };

        impute(&mut rows, &mut state);
        cap_outliers(&mut rows, &mut state);
        add_log_columns(&mut rows);
        collapse_rare(&mut rows, &mut state);
        round_floats(&mut rows);
        derive_buckets(&mut rows);

        let mut encoded_cols: Vec<&str> = CATEGORICAL_COLUMNS.to_vec();
        encoded_cols.extend_from_slice(&BUCKET_COLUMNS);
        state.encoders = encode::fit_tables(&rows, &encoded_cols);
        encode::apply_tables(&mut rows, &state.encoders);

        let labels: Vec<u8> = rows
            .iter()
            .map(|r| {
                let v = r.get(LABEL_COLUMN).and_then(|v| v.as_number()).unwrap_or(0.0);
                (v != 0.0) as u8
            })
            .collect();

        let n = rows.len();
        let d = state.feature_names.len();
        let mut flat = Vec::with_capacity(n * d);
        for row in &rows {
            for name in &state.feature_names {
                flat.push(row.get(name).and_then(|v| v.as_number()).unwrap_or(0.0));
            }
        }
        let matrix = Array2::from_shape_vec((n, d), flat)
            .map_err(|e| PreprocessError::Shape(e.to_string()))?;

        tracing::info!(
            rows = n,
            features = d,
            positives = labels.iter().filter(|&&l| l == 1).count(),
            "preprocessing fitted"
        );
        Ok((Self { state }, matrix, labels))
    }

    /// Fit the standard scaler on the training matrix and scale it in
    /// place. Zero-variance columns scale by 1.
    pub fn fit_scaler(&mut self, x_train: &mut Array2<f64>) {
        let mut scaler = ScalerParams::default();
        for &col in NUMERIC_COLUMNS.iter() {
            let Some(pos) = self.feature_index(col) else {
                continue;
            };
            let column = x_train.column(pos);
            let n = column.len() as f64;
            let mean = column.sum() / n;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            let std = if std.is_finite() && std > 0.0 { std } else { 1.0 };
            scaler.columns.push(col.to_string());
            scaler.means.push(mean);
            scaler.stds.push(std);
        }
        self.state.scaler = scaler;
        self.scale_matrix(x_train);
    }

    /// Apply the fitted scaling parameters to a feature matrix.
    pub fn scale_matrix(&self, x: &mut Array2<f64>) {
        for (i, col) in self.state.scaler.columns.iter().enumerate() {
            if let Some(pos) = self.feature_index(col) {
                let mean = self.state.scaler.means[i];
                let std = self.state.scaler.stds[i];
                for v in x.column_mut(pos).iter_mut() {
                    *v = (*v - mean) / std;
                }
            }
        }
    }

    /// The prediction-time transform. For one raw record: inject 0 for any
    /// expected feature absent from the input, select and order the
    /// training-time feature list, encode categoricals (rare collapse, then
    /// index-0 fallback for unseen values), and apply the fitted scaling.
    /// Pure and total: the same record always yields the same vector and no
    /// input value can make it fail.
    pub fn transform_record(&self, record: &Record) -> Vec<f64> {
        let state = &self.state;
        let mut out = Vec::with_capacity(state.feature_names.len());
        for name in &state.feature_names {
            let cell = record.get(name);
            match state.encoders.get(name) {
                Some(classes) => {
                    let raw = cell
                        .map(|v| v.to_category())
                        .unwrap_or_else(|| "0".to_string());
                    let is_rare = state
                        .rare
                        .get(name)
                        .map_or(false, |set| set.contains(&raw));
                    let category = if is_rare { "Other" } else { raw.as_str() };
                    out.push(encode::lookup(classes, category) as f64);
                }
                None => out.push(cell.and_then(|v| v.as_number()).unwrap_or(0.0)),
            }
        }
        for (i, col) in state.scaler.columns.iter().enumerate() {
            if let Some(pos) = self.feature_index(col) {
                out[pos] = (out[pos] - state.scaler.means[i]) / state.scaler.stds[i];
            }
        }
        out
    }

    fn feature_index(&self, column: &str) -> Option<usize> {
        self.state.feature_names.iter().position(|f| f == column)
    }
}

fn impute(rows: &mut [Record], state: &mut PreprocessorState) {
    for &col in NUMERIC_COLUMNS.iter() {
        let present: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.get(col).and_then(|v| v.as_number()))
            .collect();
        let med = clean::median(&present);
        state.medians.insert(col.to_string(), med);
        for row in rows.iter_mut() {
            if row.get(col).and_then(|v| v.as_number()).is_none() {
                row.insert(col.to_string(), FieldValue::Number(med));
            }
        }
    }

    for &col in CATEGORICAL_COLUMNS.iter() {
        let present: Vec<String> = rows
            .iter()
            .filter_map(|r| r.get(col).map(|v| v.to_category()))
            .collect();
        let fill = clean::mode(&present).unwrap_or_else(|| "Unknown".to_string());
        state.modes.insert(col.to_string(), fill.clone());
        for row in rows.iter_mut() {
            if !row.contains_key(col) {
                row.insert(col.to_string(), FieldValue::Text(fill.clone()));
            }
        }
    }

    for &col in BINARY_COLUMNS.iter() {
        for row in rows.iter_mut() {
            if row.get(col).and_then(|v| v.as_number()).is_none() {
                row.insert(col.to_string(), FieldValue::Number(0.0));
            }
        }
    }

    for row in rows.iter_mut() {
        if row.get(LABEL_COLUMN).and_then(|v| v.as_number()).is_none() {
            row.insert(LABEL_COLUMN.to_string(), FieldValue::Number(0.0));
        }
    }
}

fn cap_outliers(rows: &mut [Record], state: &mut PreprocessorState) {
    for &col in NUMERIC_COLUMNS.iter() {
        let values: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.get(col).and_then(|v| v.as_number()))
            .collect();
        let lower = clean::percentile(&values, 0.01);
        let upper = clean::percentile(&values, 0.99);
        state.caps.insert(col.to_string(), (lower, upper));
        for row in rows.iter_mut() {
            if let Some(v) = row.get(col).and_then(|v| v.as_number()) {
                row.insert(col.to_string(), FieldValue::Number(v.clamp(lower, upper)));
            }
        }
    }
}

// The log companions are computed and carried through the cleaned frame but
// never selected into the feature vector. Dropping them would change the
// cleaned-data shape, so they stay.
fn add_log_columns(rows: &mut [Record]) {
    for &col in LOG_COLUMNS.iter() {
        let log_col = format!("{}_log", col);
        for row in rows.iter_mut() {
            if let Some(v) = row.get(col).and_then(|v| v.as_number()) {
                row.insert(log_col.clone(), FieldValue::Number(v.ln_1p()));
            }
        }
    }
}

fn collapse_rare(rows: &mut [Record], state: &mut PreprocessorState) {
    let total = rows.len() as f64;
    for &col in CATEGORICAL_COLUMNS.iter() {
        let mut counts: std::collections::BTreeMap<String, usize> = Default::default();
        for row in rows.iter() {
            if let Some(v) = row.get(col) {
                *counts.entry(v.to_category()).or_insert(0) += 1;
            }
        }
        let rare: std::collections::BTreeSet<String> = counts
            .into_iter()
            .filter(|(_, n)| (*n as f64) / total < RARE_THRESHOLD)
            .map(|(v, _)| v)
            .collect();
        if !rare.is_empty() {
            for row in rows.iter_mut() {
                if let Some(v) = row.get(col) {
                    if rare.contains(&v.to_category()) {
                        row.insert(col.to_string(), FieldValue::Text("Other".to_string()));
                    }
                }
            }
        }
        state.rare.insert(col.to_string(), rare);
    }
}

fn round_floats(rows: &mut [Record]) {
    let mut float_cols: Vec<String> = NUMERIC_COLUMNS.iter().map(|s| s.to_string()).collect();
    float_cols.extend(LOG_COLUMNS.iter().map(|s| format!("{}_log", s)));
    for row in rows.iter_mut() {
        for col in &float_cols {
            if let Some(v) = row.get(col).and_then(|v| v.as_number()) {
                row.insert(col.clone(), FieldValue::Number(clean::round2(v)));
            }
        }
    }
}

fn derive_buckets(rows: &mut [Record]) {
    for spec in BUCKETS.iter() {
        for row in rows.iter_mut() {
            if let Some(v) = row.get(spec.source).and_then(|v| v.as_number()) {
                row.insert(
                    spec.column.to_string(),
                    FieldValue::Text(spec.label_for(v).to_string()),
                );
            }
        }
    }
}

/// Stratified train/test split: per-class seeded shuffle, then an
/// `test_size` cut, so label proportions are preserved in both halves.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for class in [0u8, 1u8] {
        let mut idx: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        if idx.is_empty() {
            continue;
        }
        idx.shuffle(&mut rng);
        let mut n_test = (idx.len() as f64 * test_size).round() as usize;
        if n_test >= idx.len() {
            n_test = idx.len() - 1;
        }
        test.extend_from_slice(&idx[..n_test]);
        train.extend_from_slice(&idx[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}
