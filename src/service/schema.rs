//! Request/response bodies for the prediction API, plus the static
//! feature-schema table served by `GET /features`.

use crate::data::{FieldValue, Record};
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One raw patient record. Typed extraction is the schema boundary:
/// missing or mistyped fields are rejected before the pipeline runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub age: f64,
    pub hypertension: i64,
    pub heart_disease: i64,
    pub bmi: f64,
    #[serde(rename = "HbA1c_level")]
    pub hba1c_level: f64,
    pub blood_glucose_level: f64,
    pub physical_inactivity: i64,
    pub prediabetes: i64,
    pub high_blood_pressure: i64,
    pub hdl_cholesterol: f64,
    pub triglycerides: f64,
    pub sleep_hours: f64,
    pub gender: String,
    pub smoking_history: String,
    pub obesity_status: String,
    pub dietary_habits: String,
    pub alcohol_use: String,
}

impl PredictionRequest {
    /// Lower into the pipeline's record representation. The derived bucket
    /// columns are intentionally absent; the transform injects them.
    pub fn into_record(self) -> Record {
        let mut r = Record::new();
        r.insert("age".into(), FieldValue::Number(self.age));
        r.insert("hypertension".into(), FieldValue::Number(self.hypertension as f64));
        r.insert("heart_disease".into(), FieldValue::Number(self.heart_disease as f64));
        r.insert("bmi".into(), FieldValue::Number(self.bmi));
        r.insert("HbA1c_level".into(), FieldValue::Number(self.hba1c_level));
        r.insert(
            "blood_glucose_level".into(),
            FieldValue::Number(self.blood_glucose_level),
        );
        r.insert(
            "physical_inactivity".into(),
            FieldValue::Number(self.physical_inactivity as f64),
        );
        r.insert("prediabetes".into(), FieldValue::Number(self.prediabetes as f64));
        r.insert(
            "high_blood_pressure".into(),
            FieldValue::Number(self.high_blood_pressure as f64),
        );
        r.insert("hdl_cholesterol".into(), FieldValue::Number(self.hdl_cholesterol));
        r.insert("triglycerides".into(), FieldValue::Number(self.triglycerides));
        r.insert("sleep_hours".into(), FieldValue::Number(self.sleep_hours));
        r.insert("gender".into(), FieldValue::Text(self.gender));
        r.insert("smoking_history".into(), FieldValue::Text(self.smoking_history));
        r.insert("obesity_status".into(), FieldValue::Text(self.obesity_status));
        r.insert("dietary_habits".into(), FieldValue::Text(self.dietary_habits));
        r.insert("alcohol_use".into(), FieldValue::Text(self.alcohol_use));
        r
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: i32,
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub message: String,
}

/// Static metadata for all 17 input fields: type, description, and the
/// accepted range or values. No computation, no model access.
pub fn feature_schema() -> Value {
    json!({
        "age": {"type": "float", "description": "Age in years", "range": "0-120"},
        "hypertension": {"type": "integer", "description": "Hypertension status", "values": "0 (No), 1 (Yes)"},
        "heart_disease": {"type": "integer", "description": "Heart disease status", "values": "0 (No), 1 (Yes)"},
        "bmi": {"type": "float", "description": "Body Mass Index", "range": "10-60"},
        "HbA1c_level": {"type": "float", "description": "HbA1c level", "range": "3-10"},
        "blood_glucose_level": {"type": "float", "description": "Blood glucose level", "range": "50-300"},
        "physical_inactivity": {"type": "integer", "description": "Physical inactivity", "values": "0 (Active), 1 (Inactive)"},
        "prediabetes": {"type": "integer", "description": "Prediabetes status", "values": "0 (No), 1 (Yes)"},
        "high_blood_pressure": {"type": "integer", "description": "High blood pressure", "values": "0 (No), 1 (Yes)"},
        "hdl_cholesterol": {"type": "float", "description": "HDL Cholesterol", "range": "10-100"},
        "triglycerides": {"type": "float", "description": "Triglycerides level", "range": "50-300"},
        "sleep_hours": {"type": "float", "description": "Average sleep hours per night", "range": "0-12"},
        "gender": {"type": "string", "description": "Gender", "values": "M (Male), F (Female)"},
        "smoking_history": {"type": "string", "description": "Smoking history", "values": "never, former, current, ever, not current, No Info"},
        "obesity_status": {"type": "string", "description": "Obesity status", "values": "Underweight, Normal, Overweight, Obese"},
        "dietary_habits": {"type": "string", "description": "Dietary habits", "values": "Healthy, High-sugar, High-energy, Low-fiber, Mixed"},
        "alcohol_use": {"type": "string", "description": "Alcohol consumption", "values": "None, Moderate, Heavy"}
    })
}
