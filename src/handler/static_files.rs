//! Static file serving module
//!
//! Resolves request paths against the instance root, with `.html` fallback,
//! the `/index` directory redirect and configured custom error pages.

use crate::config::{FileTypeFilter, ServerInstance};
use crate::http::{self, mime, ResponseBody};
use crate::logger;
use hyper::Response;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Outcome of resolving a request path against the root directory.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A regular file to serve (either the path itself or its `.html`
    /// fallback).
    File(PathBuf),
    /// `/index` with an `index.html` on disk redirects to `/`.
    RedirectToRoot,
    NotFound,
}

/// Serve one request for a static instance.
pub async fn serve(
    instance: &ServerInstance,
    root: &str,
    filter: Option<&FileTypeFilter>,
    path: &str,
) -> Response<ResponseBody> {
    if has_traversal(path) {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return not_found(root, instance).await;
    }

    if instance.redirect_html_extension {
        if let Some(target) = strip_html_extension(path) {
            return http::build_redirect_response(&target);
        }
    }

    match resolve(root, path).await {
        Resolution::RedirectToRoot => http::build_redirect_response("/"),
        Resolution::File(file_path) => {
            let extension = file_path.extension().and_then(|e| e.to_str());
            if let Some(filter) = filter {
                if !filter.permits(extension) {
                    return forbidden(root, instance).await;
                }
            }
            let content_type = mime::get_content_type(extension);
            match fs::read(&file_path).await {
                Ok(content) => http::build_file_response(content, content_type),
                // A read failure surfaces exactly like a miss.
                Err(_) => not_found(root, instance).await,
            }
        }
        Resolution::NotFound => not_found(root, instance).await,
    }
}

/// Resolve a request path: the file itself first, then the `.html`
/// fallback. Directories and filesystem errors both count as misses.
pub async fn resolve(root: &str, path: &str) -> Resolution {
    let candidate = PathBuf::from(format!("{root}{path}"));
    if is_regular_file(&candidate).await {
        return Resolution::File(candidate);
    }

    let with_html = PathBuf::from(format!("{root}{path}.html"));
    if is_regular_file(&with_html).await {
        if path == "/index" {
            return Resolution::RedirectToRoot;
        }
        return Resolution::File(with_html);
    }

    Resolution::NotFound
}

async fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

/// Reject any path with a `..` component before it touches the filesystem.
fn has_traversal(path: &str) -> bool {
    Path::new(path)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
}

/// `/about.html` redirects to `/about`; `/index.html` redirects to `/`.
fn strip_html_extension(path: &str) -> Option<String> {
    let stripped = path.strip_suffix(".html")?;
    if stripped == "/index" {
        Some("/".to_string())
    } else {
        Some(stripped.to_string())
    }
}

/// 404 response, using the configured custom page when present.
async fn not_found(root: &str, instance: &ServerInstance) -> Response<ResponseBody> {
    match load_error_page(root, &instance.not_found_path).await {
        Some((content, content_type)) => http::build_error_page(404, content, content_type),
        None => http::build_404_response(),
    }
}

/// 403 response for file type filter rejections.
async fn forbidden(root: &str, instance: &ServerInstance) -> Response<ResponseBody> {
    match load_error_page(root, &instance.forbidden_path).await {
        Some((content, content_type)) => http::build_error_page(403, content, content_type),
        None => http::build_403_response(),
    }
}

/// Load a configured error page relative to the root. `/` means unset.
async fn load_error_page(root: &str, page: &str) -> Option<(Vec<u8>, &'static str)> {
    if page == "/" {
        return None;
    }
    let path = Path::new(root).join(page);
    let content = fs::read(&path).await.ok()?;
    let content_type = mime::get_content_type(path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}
