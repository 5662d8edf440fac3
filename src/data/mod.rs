//! Column tables, the loosely typed record representation, and CSV loading.
//! Column names and the final feature order are fixed contracts shared by
//! the trainer and the service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Continuous measurement columns.
pub const NUMERIC_COLUMNS: [&str; 7] = [
    "age",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
    "hdl_cholesterol",
    "triglycerides",
    "sleep_hours",
];

/// 0/1 flag columns. Missing values default to 0.
pub const BINARY_COLUMNS: [&str; 5] = [
    "hypertension",
    "heart_disease",
    "physical_inactivity",
    "prediabetes",
    "high_blood_pressure",
];

/// Free-form categorical columns supplied by callers.
pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    "gender",
    "smoking_history",
    "obesity_status",
    "dietary_habits",
    "alcohol_use",
];

/// Categorical columns derived by binning continuous values.
pub const BUCKET_COLUMNS: [&str; 4] = ["age_group", "bmi_category", "HbA1c_risk", "glucose_risk"];

/// Source columns that get an `ln(1+x)` companion column during training.
/// The companions are carried through the cleaned frame but never selected
/// into the feature vector.
pub const LOG_COLUMNS: [&str; 5] = [
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
    "hdl_cholesterol",
    "triglycerides",
];

pub const LABEL_COLUMN: &str = "diabetes";

/// The ordered feature list the model is fitted on. Serving must produce
/// vectors in exactly this order.
pub const FEATURE_ORDER: [&str; 21] = [
    "age",
    "hypertension",
    "heart_disease",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
    "physical_inactivity",
    "prediabetes",
    "high_blood_pressure",
    "hdl_cholesterol",
    "triglycerides",
    "sleep_hours",
    "gender",
    "smoking_history",
    "obesity_status",
    "dietary_habits",
    "alcohol_use",
    "age_group",
    "bmi_category",
    "HbA1c_risk",
    "glucose_risk",
];

/// One cell of a record. Training data and prediction requests both reduce
/// to this before entering the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Stringify for category-table lookups. Whole numbers print without a
    /// fractional part so an injected `0` matches the string `"0"`.
    pub fn to_category(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// One observation as a column → value map. A missing cell is an absent key.
pub type Record = BTreeMap<String, FieldValue>;

/// Load a labeled CSV into records. Empty cells become missing keys; cells
/// that parse as numbers become [`FieldValue::Number`], everything else is
/// kept as text.
pub fn load_csv(path: &Path) -> anyhow::Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let raw = result?;
        let mut record = Record::new();
        for (name, cell) in headers.iter().zip(raw.iter()) {
            if cell.is_empty() {
                continue;
            }
            let value = match cell.parse::<f64>() {
                Ok(n) => FieldValue::Number(n),
                Err(_) => FieldValue::Text(cell.to_string()),
            };
            record.insert(name.to_string(), value);
        }
        rows.push(record);
    }
    tracing::info!(rows = rows.len(), path = %path.display(), "loaded training data");
    Ok(rows)
}
