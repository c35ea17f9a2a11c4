//! Per-request logging and `x-request-id` handling.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

fn request_id(request: &Request) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Log every request once on arrival and once on completion. Server errors are
/// logged at error level, client errors at warn.
pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let req_id = request_id(&request);

    tracing::debug!(request_id = %req_id, method = %method, uri = %uri, "incoming request");

    let response = next.run(request).await;
    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    match status {
        s if s.is_server_error() => tracing::error!(
            request_id = %req_id, method = %method, uri = %uri,
            status = s.as_u16(), duration_ms, "request failed"
        ),
        s if s.is_client_error() => tracing::warn!(
            request_id = %req_id, method = %method, uri = %uri,
            status = s.as_u16(), duration_ms, "request rejected"
        ),
        _ => tracing::info!(
            request_id = %req_id, method = %method, uri = %uri,
            status = status.as_u16(), duration_ms, "request completed"
        ),
    }

    response
}

pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}
