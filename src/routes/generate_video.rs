use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::json;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::fal::FalError;
use crate::models::{AppState, GenerateVideoRequest, GenerateVideoResponse};
use crate::routes::{bad_json, require_prompt};

/// Reference-to-video runs take minutes, not seconds.
const VIDEO_TIMEOUT: Duration = Duration::from_secs(600);

/// Fixed clip length forwarded to the video model.
const CLIP_DURATION: &str = "8s";

pub const MAX_REFERENCE_IMAGES: usize = 3;

/// POST /api/generate-video
///
/// Forwards 1-3 reference image URLs plus a scene prompt to the
/// image(s)-to-video model and returns the resulting video URL. Resolution
/// defaults to 720p and audio synthesis to on when the caller omits them.
///
/// # Errors
///
/// 400 on an empty/missing image list, more than 3 images, or a missing
/// prompt (each before any upstream call); 500 with the upstream message and
/// any structured validation detail if the forwarded call fails.
pub async fn generate_video(
    State(state): State<AppState>,
    payload: Result<Json<GenerateVideoRequest>, JsonRejection>,
) -> AppResult<Json<GenerateVideoResponse>> {
    let Json(req) = payload.map_err(bad_json)?;

    let image_urls = match req.image_urls {
        Some(urls) if !urls.is_empty() => urls,
        _ => return Err(AppError::BadRequest("At least one image URL is required")),
    };
    if image_urls.len() > MAX_REFERENCE_IMAGES {
        return Err(AppError::BadRequest("Maximum 3 images allowed"));
    }
    let prompt = require_prompt(req.prompt)?;

    tracing::info!(
        image_count = image_urls.len(),
        prompt = %prompt,
        resolution = %req.resolution,
        "generating video"
    );

    let input = json!({
        "image_urls": image_urls,
        "prompt": prompt,
        "duration": CLIP_DURATION,
        "resolution": req.resolution,
        "generate_audio": req.generate_audio,
    });

    let result = state
        .fal
        .run(&state.http, &state.config.video_model, &input, VIDEO_TIMEOUT)
        .await
        .map_err(|e| AppError::upstream_with_validation("Failed to generate video", e))?;

    let video_url = result
        .pointer("/video/url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            AppError::upstream(
                "Failed to generate video",
                FalError {
                    status: None,
                    message: "upstream response missing video.url".to_string(),
                    body: None,
                },
            )
        })?;

    Ok(Json(GenerateVideoResponse {
        video_url: video_url.to_string(),
        success: true,
    }))
}
