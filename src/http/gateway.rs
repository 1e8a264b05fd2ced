//! Gateway adapter
//!
//! Turns a hyper request into the normalized request descriptor, runs the
//! todo handler, and turns its response descriptor back into hyper's type.
//! Body-size limits are enforced here, before the handler sees the request.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header::CONTENT_LENGTH;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;

use super::response::GatewayResponse;
use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Normalized request descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Bytes>,
}

impl GatewayRequest {
    pub fn new(method: Method, path: impl Into<String>, body: Option<Bytes>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn serve(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let access_log = state.config.logging.access_log;
    if access_log {
        logger::log_request(&method, &path);
    }

    let response = match read_request(req, state.config.performance.max_body_size).await {
        Ok(request) => handler::handle(state.store.as_ref(), request).await,
        Err(rejection) => rejection,
    };

    if access_log {
        logger::log_response(&method, &path, response.status);
    }
    Ok(response.into_hyper())
}

/// Collect the body, rejecting anything larger than `max_body_size`
async fn read_request(
    req: Request<Incoming>,
    max_body_size: u64,
) -> Result<GatewayRequest, GatewayResponse> {
    if exceeds_declared_length(req.headers(), max_body_size) {
        return Err(payload_too_large());
    }

    let (parts, body) = req.into_parts();
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(payload_too_large());
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return Err(GatewayResponse::message(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ));
        }
    };

    Ok(GatewayRequest::new(
        parts.method,
        parts.uri.path(),
        (!bytes.is_empty()).then_some(bytes),
    ))
}

/// Check the declared Content-Length against the limit
fn exceeds_declared_length(headers: &HeaderMap, max_body_size: u64) -> bool {
    let Some(content_length) = headers.get(CONTENT_LENGTH) else {
        return false;
    };
    match content_length.to_str().map(str::parse::<u64>) {
        Ok(Ok(size)) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            true
        }
        Ok(Ok(_)) => false,
        _ => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            false
        }
    }
}

fn payload_too_large() -> GatewayResponse {
    GatewayResponse::message(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
}
