pub mod enhance_prompt;
pub mod generate_image;
pub mod generate_video;

use axum::extract::rejection::JsonRejection;

use crate::error::AppError;

/// A prompt must be present and non-blank; anything else is a client error.
pub(crate) fn require_prompt(prompt: Option<String>) -> Result<String, AppError> {
    match prompt {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(AppError::BadRequest("Prompt is required")),
    }
}

pub(crate) fn bad_json(rejection: JsonRejection) -> AppError {
    tracing::warn!(detail = %rejection.body_text(), "rejected request body");
    AppError::BadRequest("Invalid JSON body")
}
