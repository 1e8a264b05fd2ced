//! HTTP response building module
//!
//! The normalized response descriptor handed back by the handler, and its
//! conversion into a hyper response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::logger;

/// Headers attached to every response
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "content-type"),
    ("Access-Control-Allow-Methods", "GET,POST,PUT,DELETE,OPTIONS"),
];

/// Normalized response descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub headers: &'static [(&'static str, &'static str)],
    /// JSON text, empty for 204
    pub body: String,
}

impl GatewayResponse {
    /// Response with no body
    pub const fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: &CORS_HEADERS,
            body: String::new(),
        }
    }

    /// Response with a JSON-encoded body
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self {
                status,
                headers: &CORS_HEADERS,
                body,
            },
            Err(e) => {
                logger::log_error(&format!("Failed to serialize response: {e}"));
                Self::message(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }

    /// `{ "message": ... }` body, used for every error
    pub fn message(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            headers: &CORS_HEADERS,
            body: serde_json::json!({ "message": message }).to_string(),
        }
    }

    pub fn into_hyper(self) -> Response<Full<Bytes>> {
        let status = self.status;
        let mut builder = Response::builder().status(status);
        for (name, value) in self.headers {
            builder = builder.header(*name, *value);
        }
        if !self.body.is_empty() {
            builder = builder.header("Content-Type", "application/json");
        }

        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                logger::log_error(&format!("Failed to build {status} response: {e}"));
                Response::new(Full::new(Bytes::new()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[derive(Serialize)]
    struct MessageBody<'a> {
        message: &'a str,
    }

    #[test]
    fn test_message_body() {
        let resp = GatewayResponse::message(StatusCode::BAD_REQUEST, "title is required");
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body, r#"{"message":"title is required"}"#);
        assert_eq!(resp.headers, &CORS_HEADERS);
    }

    #[test]
    fn test_empty_has_no_body() {
        let resp = GatewayResponse::empty(StatusCode::NO_CONTENT);
        assert!(resp.body.is_empty());
    }

    #[tokio::test]
    async fn test_into_hyper_sets_headers() {
        let resp = GatewayResponse::json(StatusCode::CREATED, &MessageBody { message: "ok" })
            .into_hyper();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let headers = resp.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-headers"], "content-type");
        assert_eq!(
            headers["access-control-allow-methods"],
            "GET,POST,PUT,DELETE,OPTIONS"
        );
        assert_eq!(headers["content-type"], "application/json");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"message":"ok"}"#);
    }

    #[test]
    fn test_into_hyper_empty_has_no_content_type() {
        let resp = GatewayResponse::empty(StatusCode::NO_CONTENT).into_hyper();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp.headers().get("content-type").is_none());
        assert_eq!(resp.headers().len(), 3);
    }
}
