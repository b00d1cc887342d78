//! Lets HTML forms, which can only `POST`, reach `PUT` and `DELETE` routes.
//!
//! A `POST` carrying `_method=PUT` (or `DELETE`, `PATCH`) in its query
//! string or urlencoded body is rewritten to that method before routing.
//! The body is left untouched for the handler.

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::error::AppError;

/// Name of the override field.
pub const METHOD_FIELD: &str = "_method";

const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub async fn method_override(request: Request, next: Next) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let mut method = parts
        .uri
        .query()
        .and_then(|query| find_method(query.as_bytes()));

    let body = if method.is_none() && is_form(&parts.headers) {
        let bytes = match to_bytes(body, BODY_LIMIT).await {
            Ok(bytes) => bytes,
            Err(err) => return AppError::BadRequest(err.to_string()).into_response(),
        };
        method = find_method(&bytes);
        Body::from(bytes)
    } else {
        body
    };

    if let Some(method) = method {
        debug!(uri = %parts.uri, %method, "overriding request method");
        parts.method = method;
    }

    next.run(Request::from_parts(parts, body)).await
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Finds a supported override in urlencoded input.
fn find_method(encoded: &[u8]) -> Option<Method> {
    let (_, value) = url::form_urlencoded::parse(encoded).find(|(key, _)| key == METHOD_FIELD)?;
    match value.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "DELETE" => Some(Method::DELETE),
        "PATCH" => Some(Method::PATCH),
        _ => None,
    }
}
