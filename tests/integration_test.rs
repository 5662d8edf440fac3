//! Integration test: config load, full training run over a synthetic CSV,
//! artifact round-trip, and end-to-end prediction.

use diarisk::config::ServiceConfig;
use diarisk::model::{ForestParams, ModelKind};
use diarisk::risk::RiskLevel;
use diarisk::service::schema::PredictionRequest;
use diarisk::{artifacts, train, Predictor};
use std::io::Write;
use std::path::Path;

#[test]
fn config_load_default() {
    let c = ServiceConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.training.test_size, 0.2);
    assert_eq!(c.training.seed, 42);
    assert_eq!(c.model.kind, ModelKind::Forest);
    assert_eq!(c.http.bind_addr, "0.0.0.0:8000");
}

/// Deterministic synthetic dataset: high glucose/HbA1c rows are labeled
/// diabetic. Includes missing cells and one sub-1% category.
fn write_csv(path: &Path, rows: usize) {
    let mut f = std::fs::File::create(path).unwrap();
    writeln!(
        f,
        "age,hypertension,heart_disease,bmi,HbA1c_level,blood_glucose_level,\
         physical_inactivity,prediabetes,high_blood_pressure,hdl_cholesterol,\
         triglycerides,sleep_hours,gender,smoking_history,obesity_status,\
         dietary_habits,alcohol_use,diabetes"
    )
    .unwrap();
    for i in 0..rows {
        let sick = i % 3 == 0;
        let age = 25 + (i % 50);
        let bmi = 20.0 + (i % 15) as f64;
        let hba1c = if sick { 7.5 } else { 5.0 };
        let glucose = if sick { 180 } else { 90 };
        let gender = if i % 2 == 0 { "M" } else { "F" };
        let smoking = if i == 7 { "pipe" } else { "never" };
        // row 11 has missing age and hdl cells
        let (age_cell, hdl_cell) = if i == 11 {
            (String::new(), String::new())
        } else {
            (age.to_string(), format!("{}", 40 + (i % 20)))
        };
        writeln!(
            f,
            "{},{},0,{},{},{},{},{},0,{},{},{},{},{},Normal,Mixed,Moderate,{}",
            age_cell,
            i % 2,
            bmi,
            hba1c,
            glucose,
            u8::from(sick),
            u8::from(sick),
            hdl_cell,
            120 + (i % 60),
            5.5,
            gender,
            smoking,
            u8::from(sick),
        )
        .unwrap();
    }
}

fn small_forest_config(dir: &Path) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.artifacts.model_path = dir.join("model.json");
    config.artifacts.preprocessor_path = dir.join("preprocessor.json");
    config.model.forest = ForestParams {
        n_trees: 20,
        max_depth: 6,
        min_samples_split: 2,
        min_samples_leaf: 1,
        seed: 42,
    };
    config
}

fn sample_request() -> PredictionRequest {
    serde_json::from_value(serde_json::json!({
        "age": 45.0, "hypertension": 0, "heart_disease": 0, "bmi": 28.5,
        "HbA1c_level": 6.2, "blood_glucose_level": 140.0,
        "physical_inactivity": 1, "prediabetes": 1, "high_blood_pressure": 0,
        "hdl_cholesterol": 45.0, "triglycerides": 150.0, "sleep_hours": 6.5,
        "gender": "M", "smoking_history": "never", "obesity_status": "Overweight",
        "dietary_habits": "Mixed", "alcohol_use": "Moderate"
    }))
    .unwrap()
}

#[test]
fn train_persist_load_predict() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("diabetes.csv");
    write_csv(&csv, 150);
    let config = small_forest_config(dir.path());

    let report = train::run(&config, &csv).unwrap();
    assert_eq!(report.samples, 150);
    assert_eq!(report.positives, 50);
    assert!((0.0..=1.0).contains(&report.train_accuracy));
    assert!((0.0..=1.0).contains(&report.test_accuracy));
    // the synthetic labels follow glucose/HbA1c exactly, so the fit should
    // be close to perfect on held-out data
    assert!(report.test_accuracy > 0.9);
    assert!(report.roc_auc.unwrap() > 0.9);
    assert!(!report.feature_importance.is_empty());
    // ranking is descending
    let imp = &report.feature_importance;
    assert!(imp.windows(2).all(|w| w[0].1 >= w[1].1));

    // reload the persisted pair and serve a prediction from it
    let (model, state, meta) = artifacts::load_pair(
        &config.artifacts.model_path,
        &config.artifacts.preprocessor_path,
    )
    .unwrap();
    assert_eq!(meta.run_id, report.meta.run_id);

    let predictor = Predictor::new(model, state, meta);
    let record = sample_request().into_record();
    let a = predictor.predict(&record).unwrap();
    let b = predictor.predict(&record).unwrap();
    assert_eq!(a.probability, b.probability);
    assert!(a.prediction == 0 || a.prediction == 1);
    assert!((0.0..=1.0).contains(&a.probability));
    assert_eq!(a.risk_level, RiskLevel::from_probability(a.probability));
    assert_eq!(a.prediction == 1, a.probability >= 0.5);
}

#[test]
fn rare_training_category_never_breaks_serving() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("diabetes.csv");
    write_csv(&csv, 150);
    let config = small_forest_config(dir.path());
    train::run(&config, &csv).unwrap();

    let (model, state, meta) = artifacts::load_pair(
        &config.artifacts.model_path,
        &config.artifacts.preprocessor_path,
    )
    .unwrap();
    // "pipe" appeared once in 150 rows, so it collapsed to "Other"
    assert!(state.rare["smoking_history"].contains("pipe"));
    let predictor = Predictor::new(model, state, meta);

    for smoking in ["pipe", "never", "completely-new-value"] {
        let mut request = sample_request();
        request.smoking_history = smoking.to_string();
        let outcome = predictor.predict(&request.into_record()).unwrap();
        assert!((0.0..=1.0).contains(&outcome.probability));
    }
}

#[test]
fn logistic_strategy_trains_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("diabetes.csv");
    write_csv(&csv, 150);
    let mut config = small_forest_config(dir.path());
    config.model.kind = ModelKind::Logistic;

    let report = train::run(&config, &csv).unwrap();
    assert_eq!(report.model_kind, "logistic");
    assert!(report.test_accuracy > 0.8);
    assert!(!report.feature_importance.is_empty());
}

#[test]
fn kernel_strategy_trains_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("diabetes.csv");
    write_csv(&csv, 120);
    let mut config = small_forest_config(dir.path());
    config.model.kind = ModelKind::Svm;

    let report = train::run(&config, &csv).unwrap();
    assert_eq!(report.model_kind, "svm");
    assert!((0.0..=1.0).contains(&report.test_accuracy));
    // kernel models expose no per-feature decomposition
    assert!(report.feature_importance.is_empty());
}
