//! Request routing dispatch module
//!
//! Single entry point of the todo handler: matches method and path, parses
//! the body for POST/PUT, runs the operation and translates any error into
//! a `{ message }` response.

use hyper::body::Bytes;
use hyper::{Method, StatusCode};
use serde_json::{Map, Value};

use super::error::HandlerError;
use super::todos;
use crate::http::{GatewayRequest, GatewayResponse};
use crate::logger;
use crate::store::TodoStore;
use crate::todo::ValidationError;

/// Parsed JSON request body; non-object bodies read as empty
pub type RequestBody = Map<String, Value>;

/// Operation selected for a method and path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Preflight,
    List,
    Create,
    Update(&'a str),
    Delete(&'a str),
    NotFound,
}

impl<'a> Route<'a> {
    pub fn resolve(method: &Method, path: &'a str) -> Self {
        if *method == Method::OPTIONS {
            return Self::Preflight;
        }
        if path == "/todos" {
            return match *method {
                Method::GET => Self::List,
                Method::POST => Self::Create,
                _ => Self::NotFound,
            };
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match (method, segments.as_slice()) {
            (&Method::PUT, ["todos", id]) => Self::Update(*id),
            (&Method::DELETE, ["todos", id]) => Self::Delete(*id),
            _ => Self::NotFound,
        }
    }
}

/// Handle one normalized request against `store`
pub async fn handle(store: &dyn TodoStore, request: GatewayRequest) -> GatewayResponse {
    let route = Route::resolve(&request.method, &request.path);
    if route == Route::Preflight {
        return GatewayResponse::empty(StatusCode::NO_CONTENT);
    }

    match dispatch(store, route, &request).await {
        Ok(response) => response,
        Err(err) => error_response(&err),
    }
}

async fn dispatch(
    store: &dyn TodoStore,
    route: Route<'_>,
    request: &GatewayRequest,
) -> Result<GatewayResponse, HandlerError> {
    // Parsed ahead of routing, so a malformed POST/PUT body is a 400 on any path
    let body = if matches!(request.method, Method::POST | Method::PUT) {
        parse_body(request.body.as_ref())?
    } else {
        RequestBody::new()
    };

    match route {
        Route::List => todos::list(store).await,
        Route::Create => todos::create(store, &body).await,
        Route::Update(id) => todos::update(store, id, &body).await,
        Route::Delete(id) => todos::delete(store, id).await,
        Route::Preflight | Route::NotFound => Err(HandlerError::RouteNotFound),
    }
}

fn parse_body(raw: Option<&Bytes>) -> Result<RequestBody, HandlerError> {
    let Some(raw) = raw.filter(|b| !b.is_empty()) else {
        return Ok(RequestBody::new());
    };
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(RequestBody::new()),
        Err(_) => Err(ValidationError::InvalidJson.into()),
    }
}

fn error_response(err: &HandlerError) -> GatewayResponse {
    if err.is_unexpected() {
        logger::log_unhandled_error(err);
    }
    GatewayResponse::message(err.status_code(), &err.public_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_collection_routes() {
        assert_eq!(Route::resolve(&Method::GET, "/todos"), Route::List);
        assert_eq!(Route::resolve(&Method::POST, "/todos"), Route::Create);
        assert_eq!(Route::resolve(&Method::PUT, "/todos"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::GET, "/todos/"), Route::NotFound);
    }

    #[test]
    fn test_resolve_item_routes() {
        assert_eq!(Route::resolve(&Method::PUT, "/todos/abc"), Route::Update("abc"));
        assert_eq!(Route::resolve(&Method::DELETE, "/todos/abc"), Route::Delete("abc"));
        assert_eq!(Route::resolve(&Method::PUT, "/todos/abc/"), Route::Update("abc"));
        assert_eq!(Route::resolve(&Method::GET, "/todos/abc"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::PUT, "/todos/a/b"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::DELETE, "/items/abc"), Route::NotFound);
    }

    #[test]
    fn test_id_is_taken_verbatim() {
        assert_eq!(
            Route::resolve(&Method::PUT, "/todos/a%20b"),
            Route::Update("a%20b")
        );
    }

    #[test]
    fn test_options_is_preflight_everywhere() {
        assert_eq!(Route::resolve(&Method::OPTIONS, "/todos"), Route::Preflight);
        assert_eq!(Route::resolve(&Method::OPTIONS, "/anything/else"), Route::Preflight);
    }

    #[test]
    fn test_unknown_methods() {
        assert_eq!(Route::resolve(&Method::PATCH, "/todos/abc"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::HEAD, "/todos"), Route::NotFound);
    }

    #[test]
    fn test_parse_body() {
        assert!(parse_body(None).unwrap().is_empty());
        assert!(parse_body(Some(&Bytes::new())).unwrap().is_empty());
        assert!(parse_body(Some(&Bytes::from_static(b"null"))).unwrap().is_empty());
        assert!(parse_body(Some(&Bytes::from_static(b"[1]"))).unwrap().is_empty());

        let map = parse_body(Some(&Bytes::from_static(br#"{"title":"x"}"#))).unwrap();
        assert_eq!(map.get("title"), Some(&Value::String("x".to_string())));

        let err = parse_body(Some(&Bytes::from_static(b"{nope"))).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Invalid JSON");
    }
}
