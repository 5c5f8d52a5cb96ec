use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::fal::FalError;

#[derive(Debug)]
pub enum AppError {
    /// Invalid input, detected before any upstream call -> 400 `{ error }`.
    BadRequest(&'static str),
    /// Forwarded call failed -> 500 `{ error, details, validationErrors? }`.
    Upstream {
        error: &'static str,
        source: FalError,
        /// Include the upstream's structured body as `validationErrors`.
        with_validation: bool,
    },
    /// Internal error -> 500 with JSON body; logged.
    Anyhow(anyhow::Error),
}

impl AppError {
    pub const fn upstream(error: &'static str, source: FalError) -> Self {
        Self::Upstream {
            error,
            source,
            with_validation: false,
        }
    }

    /// Like [`Self::upstream`] but surfaces any structured validation detail
    /// the upstream returned.
    pub const fn upstream_with_validation(error: &'static str, source: FalError) -> Self {
        Self::Upstream {
            error,
            source,
            with_validation: true,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Anyhow(e)
    }
}

#[derive(Serialize)]
struct ClientErrBody {
    error: &'static str,
}

#[derive(Serialize)]
struct UpstreamErrBody {
    error: &'static str,
    details: String,
    #[serde(rename = "validationErrors", skip_serializing_if = "Option::is_none")]
    validation_errors: Option<JsonValue>,
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ClientErrBody { error })).into_response()
            }
            Self::Upstream {
                error,
                source,
                with_validation,
            } => {
                tracing::error!(details = %source, "{error}");
                let body = UpstreamErrBody {
                    error,
                    details: source.message,
                    validation_errors: if with_validation { source.body } else { None },
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            Self::Anyhow(err) => {
                tracing::error!("{:#}", err);
                let body = Json(ErrBody {
                    error: err.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
