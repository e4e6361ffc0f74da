use async_trait::async_trait;
use axum::{routing::post, Router};
use serde::Serialize;
use thiserror::Error;

use crate::error::ApiError;
use crate::state::AppState;

pub mod client;
pub mod fallback;
pub mod handlers;
pub mod parser;

/// Estimated nutrients for one food, per 100g serving. Transient: returned
/// to the client to pre-fill a food entry, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientEstimate {
    pub calories: f64,
    pub carbohydrates: f64,
    pub proteins: f64,
    pub fats: f64,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference service error: {0}")]
    Upstream(String),

    #[error("model output contained no usable nutrient values")]
    Unparseable,
}

impl From<InferenceError> for ApiError {
    fn from(e: InferenceError) -> Self {
        ApiError::Inference(e.to_string())
    }
}

/// Best-effort nutrient estimator. Implementations are expected to degrade
/// to the static fallback table before surfacing an error.
#[async_trait]
pub trait NutrientInference: Send + Sync {
    async fn infer_description(&self, description: &str)
        -> Result<NutrientEstimate, InferenceError>;
    async fn infer_image(&self, image: &[u8]) -> Result<NutrientEstimate, InferenceError>;
}

pub fn router() -> Router<AppState> {
    Router::new().route("/nutrient-inference", post(handlers::infer_nutrients))
}
