use axum::{extract::State, Json};
use base64ct::{Base64, Encoding};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::NutrientEstimate;
use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage;

#[derive(Debug, Deserialize)]
pub struct InferenceRequest {
    pub description: Option<String>,
    /// Base64 image payload, optionally with a `data:image/...;base64,` prefix.
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InferenceResponse {
    pub success: bool,
    pub data: NutrientEstimate,
}

#[instrument(skip(state, payload))]
pub async fn infer_nutrients(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<InferenceRequest>,
) -> Result<Json<InferenceResponse>, ApiError> {
    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let estimate = if let Some(image) = payload.image.filter(|i| !i.is_empty()) {
        let (bytes, content_type) = decode_image_payload(&image)?;
        let mut estimate = state.inference.infer_image(&bytes).await?;

        // Photo upload is best-effort; losing the url must not lose the estimate.
        match storage::store_food_photo(
            &*state.storage,
            user_id,
            Bytes::from(bytes),
            &content_type,
        )
        .await
        {
            Ok(url) => estimate.image_url = Some(url),
            Err(e) => warn!(error = %e, user_id = %user_id, "food photo upload failed"),
        }
        estimate
    } else if let Some(description) = description {
        state.inference.infer_description(description).await?
    } else {
        return Err(ApiError::validation(
            "Either food description or image is required",
        ));
    };

    info!(
        user_id = %user_id,
        label = estimate.food_label.as_deref().unwrap_or(""),
        confidence = estimate.confidence,
        "nutrients inferred"
    );
    Ok(Json(InferenceResponse {
        success: true,
        data: estimate,
    }))
}

fn decode_image_payload(input: &str) -> Result<(Vec<u8>, String), ApiError> {
    let (content_type, b64) = match input.strip_prefix("data:") {
        Some(rest) => match rest.split_once(";base64,") {
            Some((mime, data)) => (mime.to_string(), data),
            None => return Err(ApiError::validation("Malformed data url")),
        },
        None => ("image/jpeg".to_string(), input),
    };
    let bytes = Base64::decode_vec(b64.trim())
        .map_err(|_| ApiError::validation("Invalid base64 image"))?;
    if bytes.is_empty() {
        return Err(ApiError::validation("Empty image payload"));
    }
    Ok((bytes, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_base64() {
        let encoded = Base64::encode_string(b"fake-jpeg-bytes");
        let (bytes, content_type) = decode_image_payload(&encoded).unwrap();
        assert_eq!(bytes, b"fake-jpeg-bytes");
        assert_eq!(content_type, "image/jpeg");
    }

    #[test]
    fn decodes_data_url_and_keeps_mime() {
        let encoded = format!("data:image/png;base64,{}", Base64::encode_string(b"png!"));
        let (bytes, content_type) = decode_image_payload(&encoded).unwrap();
        assert_eq!(bytes, b"png!");
        assert_eq!(content_type, "image/png");
    }

    #[test]
    fn rejects_garbage_base64() {
        assert!(decode_image_payload("!!!not base64!!!").is_err());
    }

    #[test]
    fn rejects_data_url_without_base64_marker() {
        assert!(decode_image_payload("data:image/png,rawbytes").is_err());
    }
}
