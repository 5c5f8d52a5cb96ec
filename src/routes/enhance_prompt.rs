use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::json;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::fal::FalError;
use crate::models::{AppState, EnhancePromptRequest, EnhancePromptResponse};
use crate::routes::{bad_json, require_prompt};

const ENHANCE_TIMEOUT: Duration = Duration::from_secs(60);

/// POST /api/enhance-video-prompt
///
/// Forwards the (possibly caller-augmented) prompt to the prompt rewriting
/// model and returns the rewritten prompt. Text-only on purpose, to avoid
/// biasing the rewrite towards any single ingredient image.
///
/// # Errors
///
/// 400 if the prompt is missing or blank, 500 with the upstream message if
/// the forwarded call fails.
pub async fn enhance_prompt(
    State(state): State<AppState>,
    payload: Result<Json<EnhancePromptRequest>, JsonRejection>,
) -> AppResult<Json<EnhancePromptResponse>> {
    let Json(req) = payload.map_err(bad_json)?;
    let prompt = require_prompt(req.prompt)?;

    tracing::info!(prompt = %prompt, "enhancing video prompt");

    let input = json!({ "input_concept": prompt });

    let result = state
        .fal
        .run(
            &state.http,
            &state.config.prompt_model,
            &input,
            ENHANCE_TIMEOUT,
        )
        .await
        .map_err(|e| AppError::upstream("Failed to enhance prompt", e))?;

    let enhanced = result
        .pointer("/prompt")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            AppError::upstream(
                "Failed to enhance prompt",
                FalError {
                    status: None,
                    message: "upstream response missing prompt".to_string(),
                    body: None,
                },
            )
        })?;

    Ok(Json(EnhancePromptResponse {
        enhanced_prompt: enhanced.to_string(),
        success: true,
    }))
}
