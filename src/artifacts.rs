//! Persistence of the trained pair: model + fitted preprocessor state as
//! two JSON files that must be loaded together. The preprocessor state's
//! SHA-256 fingerprint is recorded in both artifacts so a pair stitched
//! together from different training runs is rejected at load time.

use crate::model::FittedModel;
use crate::preprocess::PreprocessorState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Bump when the artifact layout changes incompatibly.
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact malformed: {0}")]
    Format(#[from] serde_json::Error),
    #[error("artifact version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("model and preprocessor artifacts come from different training runs")]
    PairMismatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub version: u32,
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// SHA-256 of the canonical preprocessor-state JSON.
    pub fingerprint: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    meta: ArtifactMeta,
    model: FittedModel,
}

#[derive(Debug, Serialize, Deserialize)]
struct PreprocessorArtifact {
    meta: ArtifactMeta,
    state: PreprocessorState,
}

/// Canonical fingerprint of a fitted state. All state maps are ordered, so
/// the JSON encoding is stable.
pub fn fingerprint(state: &PreprocessorState) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(state)?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Persist a freshly trained pair, minting a shared run id.
pub fn save_pair(
    model_path: &Path,
    preprocessor_path: &Path,
    model: &FittedModel,
    state: &PreprocessorState,
) -> Result<ArtifactMeta, ArtifactError> {
    let meta = ArtifactMeta {
        version: ARTIFACT_VERSION,
        run_id: Uuid::new_v4(),
        created_at: Utc::now(),
        fingerprint: fingerprint(state)?,
    };
    let model_artifact = ModelArtifact {
        meta: meta.clone(),
        model: model.clone(),
    };
    let pre_artifact = PreprocessorArtifact {
        meta: meta.clone(),
        state: state.clone(),
    };
    std::fs::write(model_path, serde_json::to_vec_pretty(&model_artifact)?)?;
    std::fs::write(
        preprocessor_path,
        serde_json::to_vec_pretty(&pre_artifact)?,
    )?;
    tracing::info!(
        run_id = %meta.run_id,
        model = %model_path.display(),
        preprocessor = %preprocessor_path.display(),
        "artifacts saved"
    );
    Ok(meta)
}

/// Load and pair-check the two artifacts.
pub fn load_pair(
    model_path: &Path,
    preprocessor_path: &Path,
) -> Result<(FittedModel, PreprocessorState, ArtifactMeta), ArtifactError> {
    let model_artifact: ModelArtifact =
        serde_json::from_slice(&std::fs::read(model_path)?)?;
    let pre_artifact: PreprocessorArtifact =
        serde_json::from_slice(&std::fs::read(preprocessor_path)?)?;

    for meta in [&model_artifact.meta, &pre_artifact.meta] {
        if meta.version != ARTIFACT_VERSION {
            return Err(ArtifactError::Version {
                found: meta.version,
                expected: ARTIFACT_VERSION,
            });
        }
    }
    if model_artifact.meta.run_id != pre_artifact.meta.run_id {
        return Err(ArtifactError::PairMismatch);
    }
    if model_artifact.meta.fingerprint != fingerprint(&pre_artifact.state)? {
        return Err(ArtifactError::PairMismatch);
    }
    Ok((model_artifact.model, pre_artifact.state, model_artifact.meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForestModel, ForestParams};
    use ndarray::Array2;

    fn fitted_model() -> FittedModel {
        let x = Array2::from_shape_vec((8, 1), vec![-4., -3., -2., -1., 1., 2., 3., 4.]).unwrap();
        let y = vec![0, 0, 0, 0, 1, 1, 1, 1];
        let params = ForestParams {
            n_trees: 3,
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 7,
        };
        FittedModel::Forest(ForestModel::fit(&params, &x, &y))
    }

    fn fitted_state() -> PreprocessorState {
        let mut state = PreprocessorState::default();
        state.feature_names = vec!["age".to_string()];
        state.medians.insert("age".to_string(), 40.0);
        state
    }

    #[test]
    fn pair_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let pre_path = dir.path().join("preprocessor.json");
        let state = fitted_state();
        let meta = save_pair(&model_path, &pre_path, &fitted_model(), &state).unwrap();

        let (_, loaded_state, loaded_meta) = load_pair(&model_path, &pre_path).unwrap();
        assert_eq!(loaded_state, state);
        assert_eq!(loaded_meta.run_id, meta.run_id);
        assert_eq!(loaded_meta.fingerprint, fingerprint(&state).unwrap());
    }

    #[test]
    fn mixed_runs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = fitted_state();
        let m1 = dir.path().join("m1.json");
        let p1 = dir.path().join("p1.json");
        let m2 = dir.path().join("m2.json");
        let p2 = dir.path().join("p2.json");
        save_pair(&m1, &p1, &fitted_model(), &state).unwrap();
        save_pair(&m2, &p2, &fitted_model(), &state).unwrap();

        let err = load_pair(&m1, &p2).unwrap_err();
        assert!(matches!(err, ArtifactError::PairMismatch));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_pair(&dir.path().join("nope.json"), &dir.path().join("also-nope.json"))
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Io(_)));
    }
}
