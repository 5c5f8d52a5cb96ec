use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::json;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::fal::FalError;
use crate::models::{AppState, GenerateImageRequest, GenerateImageResponse};
use crate::routes::{bad_json, require_prompt};

const IMAGE_TIMEOUT: Duration = Duration::from_secs(120);

/// POST /api/generate-image
///
/// Forwards a text prompt to the text-to-image model, requesting a single
/// square image, and returns its URL.
///
/// # Errors
///
/// 400 if the prompt is missing or blank (no upstream call is made),
/// 500 with the upstream message if the forwarded call fails.
pub async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> AppResult<Json<GenerateImageResponse>> {
    let Json(req) = payload.map_err(bad_json)?;
    let prompt = require_prompt(req.prompt)?;

    tracing::info!(prompt = %prompt, "generating image");

    let input = json!({
        "prompt": prompt,
        "image_size": "square_hd",
        "num_images": 1,
    });

    let result = state
        .fal
        .run(&state.http, &state.config.image_model, &input, IMAGE_TIMEOUT)
        .await
        .map_err(|e| AppError::upstream("Failed to generate image", e))?;

    let image_url = result
        .pointer("/images/0/url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            AppError::upstream(
                "Failed to generate image",
                FalError {
                    status: None,
                    message: "upstream response missing images[0].url".to_string(),
                    body: None,
                },
            )
        })?;

    Ok(Json(GenerateImageResponse {
        image_url: image_url.to_string(),
        success: true,
    }))
}
