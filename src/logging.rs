use crate::config::Config;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Request, Response, header};
use axum::middleware::Next;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Keep guards alive for the lifetime of the app.
pub struct LogGuards {
    _file_guard: Option<WorkerGuard>,
}

fn split_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let file = path
        .file_name()
        .unwrap_or_else(|| OsStr::new("mixlab.log"))
        .to_string_lossy()
        .to_string();
    (dir, file)
}

pub fn init_logging(config: &Config) -> LogGuards {
    let filter = EnvFilter::new(config.log_filter());

    // Stdout layer (pretty enough, ANSI enabled)
    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_ansi(true)
        .compact()
        // requires tracing-subscriber "chrono" feature
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S".to_string(),
        ));

    // Optional file layer (ANSI disabled)
    let (file_layer, guard) = {
        let path: &Path = config.log_file.as_ref();

        let (dir, file) = split_path(path);
        let appender = tracing_appender::rolling::never(dir, file);
        let (nb, guard) = tracing_appender::non_blocking(appender);

        let layer = fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .compact()
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(
                "%Y-%m-%d %H:%M:%S".to_string(),
            ))
            .with_writer(nb);

        (Some(layer), Some(guard))
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer);

    if let Some(file_layer) = file_layer {
        subscriber.with(file_layer).init();
    } else {
        subscriber.init();
    }

    LogGuards { _file_guard: guard }
}

/// Logs request & response bodies (dev-friendly).
/// Skips likely-binary responses, truncates previews.
/// Includes the request-id for correlation.
pub async fn log_payloads(req: Request<Body>, next: Next) -> Response<Body> {
    // Capture request-id (inserted by SetRequestIdLayer)
    let req_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let (req_parts, req_body) = req.into_parts();
    let req = match axum::body::to_bytes(req_body, 64 * 1024).await {
        Ok(bytes) => {
            let preview = if bytes.len() > 16 * 1024 {
                format!(
                    "{}… [truncated]",
                    String::from_utf8_lossy(&bytes[..16 * 1024])
                )
            } else {
                String::from_utf8_lossy(&bytes).to_string()
            };
            tracing::debug!(request_id=%req_id, request_body=%preview, "request body");
            Request::from_parts(req_parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::warn!(request_id=%req_id, error=%e, "failed reading request body");
            Request::from_parts(req_parts, Body::empty())
        }
    };

    let res: Response<Body> = next.run(req).await;

    let res_ct = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let (res_parts, res_body) = res.into_parts();
    if res_ct.starts_with("image/") || res_ct.starts_with("application/octet-stream") {
        return Response::from_parts(res_parts, res_body);
    }
    match axum::body::to_bytes(res_body, 64 * 1024).await {
        Ok(bytes) => {
            let preview = if bytes.len() > 16 * 1024 {
                format!(
                    "{}… [truncated]",
                    String::from_utf8_lossy(&bytes[..16 * 1024])
                )
            } else {
                String::from_utf8_lossy(&bytes).to_string()
            };
            tracing::debug!(request_id=%req_id, response_body=%preview, "response body");
            Response::from_parts(res_parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::warn!(request_id=%req_id, error=%e, "failed reading response body");
            Response::from_parts(res_parts, Body::empty())
        }
    }
}
