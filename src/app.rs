use crate::{logging::log_payloads, models::AppState, routes};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::time::Duration;

use tower::ServiceBuilder;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, info_span};

async fn healthz() -> Json<&'static str> {
    Json("ok")
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.and_then(|o| o.parse::<axum::http::HeaderValue>().ok()) {
        Some(origin) => layer.allow_origin([origin]),
        None => layer.allow_origin(Any),
    }
}

pub fn build_app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let method = req.method().to_string();
            let uri = req.uri().to_string();
            let client_ip = req
                .extensions()
                .get::<ConnectInfo<std::net::SocketAddr>>()
                .map(|ci| ci.0.to_string())
                .unwrap_or_else(|| "-".into());
            let rid = req
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");

            info_span!("http", method=%method, uri=%uri, client_ip=%client_ip, request_id=%rid)
        })
        .on_request(|_req: &Request<Body>, _span: &Span| {
            tracing::info!("request started");
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &Span| {
            tracing::info!(status=%res.status(), latency_ms=%latency.as_millis(), "response completed");
        })
        .on_failure(
            |_class: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                tracing::error!(latency_ms=%latency.as_millis(), "request failed");
            },
        );

    // Request-ID middleware comes first so everything downstream
    // has access to the x-request-id header.
    let request_id_layer = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id());

    let cors = cors_layer(state.config.cors_origin.as_deref());

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/generate-image",
            post(routes::generate_image::generate_image),
        )
        .route(
            "/api/generate-video",
            post(routes::generate_video::generate_video),
        )
        .route(
            "/api/enhance-video-prompt",
            post(routes::enhance_prompt::enhance_prompt),
        )
        .with_state(state)
        .layer(request_id_layer)
        .layer(from_fn(log_payloads))
        .layer(cors)
        .layer(trace)
}
