//! HTTP response building module
//!
//! Builders for the response shapes the router emits: served files,
//! redirects and the fixed error bodies.

use crate::http::ResponseBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::Response;

/// Fixed body sent for every not-found outcome without a custom page.
pub const NOT_FOUND_BODY: &str = "<h1>404 Not Found</h1>";
pub const FORBIDDEN_BODY: &str = "<h1>403 Forbidden</h1>";
pub const INTERNAL_ERROR_BODY: &str = "<h1>500 Internal Server Error</h1>";

/// Wrap a buffered body in the unified response body type.
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Build a 200 response for a served file.
pub fn build_file_response(content: Vec<u8>, content_type: &str) -> Response<ResponseBody> {
    let content_length = content.len();
    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(full_body(content))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build a 302 redirect response.
pub fn build_redirect_response(target: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(302)
        .header("Location", target)
        .header("Content-Type", "text/plain")
        .body(full_body("Redirecting..."))
        .unwrap_or_else(|e| {
            log_build_error("302", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build a 404 response with the fixed HTML body.
pub fn build_404_response() -> Response<ResponseBody> {
    build_fixed_error(404, NOT_FOUND_BODY)
}

/// Build a 403 response with the fixed HTML body.
pub fn build_403_response() -> Response<ResponseBody> {
    build_fixed_error(403, FORBIDDEN_BODY)
}

/// Build a 500 response with the fixed HTML body.
pub fn build_500_response() -> Response<ResponseBody> {
    build_fixed_error(500, INTERNAL_ERROR_BODY)
}

/// Build an error response carrying a configured custom page.
pub fn build_error_page(
    status: u16,
    content: Vec<u8>,
    content_type: &str,
) -> Response<ResponseBody> {
    let content_length = content.len();
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(full_body(content))
        .unwrap_or_else(|e| {
            log_build_error("error page", &e);
            Response::new(full_body(Bytes::new()))
        })
}

fn build_fixed_error(status: u16, body: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", body.len())
        .body(full_body(body))
        .unwrap_or_else(|e| {
            log_build_error("error", &e);
            Response::new(full_body(body))
        })
}

fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
