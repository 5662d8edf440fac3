//! Request handlers for the prediction API.

use super::AppState;
use crate::logging::{AuditLine, StructuredLogger};
use crate::service::schema::{feature_schema, PredictionRequest, PredictionResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// API error response body.
#[derive(Debug, Serialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

/// Build a JSON error response.
fn api_error(status: StatusCode, message: &str) -> Response {
    let body = ApiError {
        error: ApiErrorDetail {
            message: message.to_string(),
            error_type: "api_error".to_string(),
        },
    };
    (status, Json(body)).into_response()
}

/// `GET /` — liveness marker.
pub async fn root_handler() -> Response {
    Json(json!({
        "message": "Diabetes Prediction API",
        "status": "active",
    }))
    .into_response()
}

/// `GET /health` — whether the artifact pair is loaded.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    let loaded = state.predictor.is_some();
    Json(json!({
        "status": if loaded { "healthy" } else { "degraded" },
        "model_loaded": loaded,
    }))
    .into_response()
}

/// `GET /features` — static input-field metadata.
pub async fn features_handler() -> Response {
    Json(feature_schema()).into_response()
}

/// `POST /predict` — transform one record, score it, bucket the
/// probability into a risk tier.
///
/// 503 when no model is loaded, 500 on any scoring failure; the typed
/// extractor already turned malformed bodies into client errors.
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictionRequest>,
) -> Response {
    let Some(predictor) = state.predictor.as_ref() else {
        return api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "model not trained or loaded; run `diarisk train` first",
        );
    };

    let record = request.into_record();
    match predictor.predict(&record) {
        Ok(outcome) => {
            let run_id = predictor.meta().run_id.to_string();
            let audit = AuditLine {
                ts: Utc::now().to_rfc3339(),
                probability: outcome.probability,
                risk_level: outcome.risk_level.as_str(),
                prediction: outcome.prediction,
                run_id: Some(run_id.as_str()),
            };
            StructuredLogger::emit_json(&audit, &mut std::io::stdout().lock());

            Json(PredictionResponse {
                prediction: outcome.prediction,
                probability: outcome.probability,
                message: outcome.risk_level.advisory().to_string(),
                risk_level: outcome.risk_level,
            })
            .into_response()
        }
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("prediction error: {}", e),
        ),
    }
}
