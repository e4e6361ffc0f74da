use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{fallback, parser, InferenceError, NutrientEstimate, NutrientInference};
use crate::config::InferenceConfig;

const UNKNOWN_FOOD: &str = "Unknown food";

/// Hugging Face Inference API client. One attempt per call, bounded by the
/// configured request timeout; a timeout counts as a failed inference.
pub struct HfClient {
    http: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct ImageLabel {
    label: String,
}

impl HfClient {
    pub fn new(config: &InferenceConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, InferenceError> {
        let url = format!("{}/models/{}", self.base_url, self.text_model);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "inputs": prompt }))
            .send()
            .await
            .map_err(|e| InferenceError::Upstream(e.to_string()))?;
        if !response.status().is_success() {
            return Err(InferenceError::Upstream(format!(
                "text generation returned {}",
                response.status()
            )));
        }
        let body: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| InferenceError::Upstream(e.to_string()))?;
        body.into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| InferenceError::Upstream("empty text generation response".into()))
    }

    async fn classify_image(&self, image: &[u8]) -> Result<String, InferenceError> {
        let url = format!("{}/models/{}", self.base_url, self.image_model);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| InferenceError::Upstream(e.to_string()))?;
        if !response.status().is_success() {
            return Err(InferenceError::Upstream(format!(
                "image classification returned {}",
                response.status()
            )));
        }
        let labels: Vec<ImageLabel> = response
            .json()
            .await
            .map_err(|e| InferenceError::Upstream(e.to_string()))?;
        Ok(labels
            .into_iter()
            .next()
            .map(|l| l.label)
            .unwrap_or_else(|| UNKNOWN_FOOD.to_string()))
    }
}

fn nutrient_prompt(label: &str) -> String {
    format!(
        "What are the nutritional values of {} per 100g serving? \
         Answer with four comma-separated numbers: \
         calories, carbohydrates (g), proteins (g), fats (g).",
        label
    )
}

/// Turns the outcome of a generation call into an estimate, consulting the
/// static lookup table before giving up.
fn resolve_estimate(
    generated: Result<String, InferenceError>,
    label: &str,
) -> Result<NutrientEstimate, InferenceError> {
    match generated {
        Ok(text) => {
            if let Ok(estimate) = parser::parse_estimate(&text, label) {
                return Ok(estimate);
            }
            debug!(label, "model output unusable, trying fallback table");
            fallback::lookup(label).ok_or(InferenceError::Unparseable)
        }
        Err(err) => {
            warn!(error = %err, label, "inference call failed, trying fallback table");
            fallback::lookup(label).ok_or(err)
        }
    }
}

#[async_trait]
impl NutrientInference for HfClient {
    async fn infer_description(
        &self,
        description: &str,
    ) -> Result<NutrientEstimate, InferenceError> {
        let generated = self.generate_text(&nutrient_prompt(description)).await;
        resolve_estimate(generated, description)
    }

    async fn infer_image(&self, image: &[u8]) -> Result<NutrientEstimate, InferenceError> {
        let label = match self.classify_image(image).await {
            Ok(label) => label,
            Err(err) => {
                warn!(error = %err, "image classification failed");
                UNKNOWN_FOOD.to_string()
            }
        };
        let generated = self.generate_text(&nutrient_prompt(&label)).await;
        resolve_estimate(generated, &label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable() -> Result<String, InferenceError> {
        Err(InferenceError::Upstream("connection refused".into()))
    }

    #[test]
    fn parseable_reply_wins_over_fallback() {
        let estimate = resolve_estimate(
            Ok("Roughly 89, 23, 1.1, 0.3 per serving.".into()),
            "banana",
        )
        .unwrap();
        assert_eq!(estimate.calories, 89.0);
        assert_eq!(estimate.confidence, 0.8);
    }

    #[test]
    fn unreachable_service_falls_back_to_table() {
        let estimate = resolve_estimate(unreachable(), "banana split").unwrap();
        assert_eq!(
            (
                estimate.calories,
                estimate.carbohydrates,
                estimate.proteins,
                estimate.fats
            ),
            (105.0, 27.0, 1.3, 0.4)
        );
        assert_eq!(estimate.confidence, 0.6);
    }

    #[test]
    fn unparseable_reply_falls_back_to_table() {
        let estimate =
            resolve_estimate(Ok("I cannot help with that.".into()), "apple pie").unwrap();
        assert_eq!(estimate.calories, 95.0);
        assert_eq!(estimate.confidence, 0.6);
    }

    #[test]
    fn degenerate_reply_falls_back_to_table() {
        let estimate = resolve_estimate(Ok("0, 0, 0, 0".into()), "boiled egg").unwrap();
        assert_eq!(estimate.calories, 78.0);
    }

    #[test]
    fn fallback_miss_surfaces_the_upstream_error() {
        let err = resolve_estimate(unreachable(), "durian smoothie").unwrap_err();
        assert!(matches!(err, InferenceError::Upstream(_)));

        let err = resolve_estimate(Ok("no numbers".into()), "durian smoothie").unwrap_err();
        assert!(matches!(err, InferenceError::Unparseable));
    }

    #[test]
    fn prompt_names_the_food() {
        assert!(nutrient_prompt("fried rice").contains("fried rice"));
    }
}
