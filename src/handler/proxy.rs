//! Reverse proxy forwarding module
//!
//! Forwards requests mounted under the instance location to the upstream
//! base URL, streaming the upstream response back unchanged.

use crate::config::ServerInstance;
use crate::http::{self, ResponseBody};
use crate::logger;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::header::HOST;
use hyper::{Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;

/// Forward one request to the upstream.
///
/// Paths outside the mounted location are not proxied and get a 404.
pub async fn forward(
    req: Request<Incoming>,
    instance: &ServerInstance,
    upstream: &str,
    client: &Client<HttpConnector, Incoming>,
) -> Response<ResponseBody> {
    let Some(remainder) = strip_location(&instance.location, req.uri().path()) else {
        return http::build_404_response();
    };

    let target = build_target_uri(upstream, &remainder, req.uri().query());
    let Ok(uri) = target.parse::<Uri>() else {
        logger::log_error(&format!("Invalid upstream target: {target}"));
        return internal_error(instance).await;
    };

    let (mut parts, body) = req.into_parts();
    parts.uri = uri;
    // The client sets the Host header from the upstream authority.
    parts.headers.remove(HOST);

    match client.request(Request::from_parts(parts, body)).await {
        Ok(response) => response.map(BodyExt::boxed),
        Err(err) => {
            logger::log_error(&format!("Upstream request failed: {err}"));
            internal_error(instance).await
        }
    }
}

/// 500 response for upstream failures.
///
/// Proxy instances have no root, so `internalErrorPath` is taken relative
/// to the working directory when configured; `/` means unset.
async fn internal_error(instance: &ServerInstance) -> Response<ResponseBody> {
    if instance.internal_error_path == "/" {
        return http::build_500_response();
    }
    match tokio::fs::read(&instance.internal_error_path).await {
        Ok(content) => {
            let content_type = crate::http::mime::get_content_type(
                std::path::Path::new(&instance.internal_error_path)
                    .extension()
                    .and_then(|e| e.to_str()),
            );
            http::build_error_page(500, content, content_type)
        }
        Err(_) => http::build_500_response(),
    }
}

/// Strip the mounted location prefix from a request path.
///
/// Returns the remainder (always starting with `/`) when the path falls
/// under the location; `/` mounts everything.
pub fn strip_location(location: &str, path: &str) -> Option<String> {
    if location == "/" {
        return Some(path.to_string());
    }
    let prefix = format!("/{location}");
    if path == prefix {
        return Some("/".to_string());
    }
    path.strip_prefix(&format!("{prefix}/"))
        .map(|rest| format!("/{rest}"))
}

/// Join the upstream base URL, the remainder path and the query string.
fn build_target_uri(upstream: &str, remainder: &str, query: Option<&str>) -> String {
    let base = upstream.trim_end_matches('/');
    match query {
        Some(q) => format!("{base}{remainder}?{q}"),
        None => format!("{base}{remainder}"),
    }
}
