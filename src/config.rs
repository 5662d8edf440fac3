//! Service configuration: artifact locations, training parameters, model
//! selection, HTTP bind address, logging.

use crate::model::{ForestParams, KernelParams, LogisticParams, ModelKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Persisted model + preprocessor pair
    pub artifacts: ArtifactsConfig,
    /// Offline training run parameters
    pub training: TrainingConfig,
    /// Which classifier the trainer fits, and its parameters
    pub model: ModelConfig,
    /// HTTP server
    pub http: HttpConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    pub model_path: PathBuf,
    pub preprocessor_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Labeled CSV consumed by `diarisk train`
    pub csv_path: PathBuf,
    /// Held-out fraction for evaluation
    pub test_size: f64,
    /// Split seed
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub kind: ModelKind,
    pub forest: ForestParams,
    pub logistic: LogisticParams,
    pub svm: KernelParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactsConfig::default(),
            training: TrainingConfig::default(),
            model: ModelConfig::default(),
            http: HttpConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("diabetes_model.json"),
            preprocessor_path: PathBuf::from("diabetes_preprocessor.json"),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("diabetes_raw_dataset.csv"),
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::Forest,
            forest: ForestParams::default(),
            logistic: LogisticParams::default(),
            svm: KernelParams::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl ServiceConfig {
    /// Load from a JSON file if present; otherwise return defaults.
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<ServiceConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }
}
