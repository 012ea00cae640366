//! HTTP response building module
//!
//! Builders for the plain-text, JSON and error responses the service returns.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::ServiceError;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Build a response with explicit `Content-Length`; `HEAD` gets an empty body
fn build_response(
    status: StatusCode,
    content_type: &str,
    body: Bytes,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { body };

    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 plain-text response
pub fn build_text_response(content: impl Into<String>, is_head: bool) -> Response<Full<Bytes>> {
    build_response(
        StatusCode::OK,
        TEXT_PLAIN,
        Bytes::from(content.into()),
        is_head,
    )
}

/// Build JSON response
pub fn build_json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build_response(status, APPLICATION_JSON, Bytes::from(json), is_head),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                APPLICATION_JSON,
                Bytes::from_static(br#"{"error":"Internal server error"}"#),
                is_head,
            )
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Build JSON error response for a failed handler
///
/// The underlying cause is only included when `expose_details` is set.
pub fn build_error_response(
    err: &ServiceError,
    expose_details: bool,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = ErrorBody {
        error: err.kind(),
        message: err.public_message(),
        detail: expose_details.then(|| err.to_string()),
    };
    build_json_response(err.status(), &body, is_head)
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<Full<Bytes>> {
    build_response(
        StatusCode::NOT_FOUND,
        TEXT_PLAIN,
        Bytes::from_static(b"404 Not Found"),
        is_head,
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(is_head: bool) -> Response<Full<Bytes>> {
    let mut resp = build_response(
        StatusCode::METHOD_NOT_ALLOWED,
        TEXT_PLAIN,
        Bytes::from_static(b"405 Method Not Allowed"),
        is_head,
    );
    resp.headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static("GET, HEAD"));
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
