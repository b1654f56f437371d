// Configuration types module
// Defines the raw (unvalidated) entry shape and the validated instance types

use hyper::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// Listen port used when an entry does not set `port`.
pub const DEFAULT_PORT: u16 = 8080;

/// One entry of the JSON configuration array, exactly as parsed.
///
/// Every field stays a raw `serde_json::Value` so the validator owns all
/// type checking and can label failures with the ordinal of the offending
/// server, instead of surfacing an opaque deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawServerConfig {
    pub root: Option<Value>,
    pub proxy: Option<Value>,
    pub port: Option<Value>,
    pub location: Option<Value>,
    pub headers: Option<Value>,
    pub redirect_html_extension: Option<Value>,
    pub not_found_path: Option<Value>,
    pub internal_error_path: Option<Value>,
    pub forbidden_path: Option<Value>,
    pub allowed_file_types: Option<Value>,
    pub forbidden_file_types: Option<Value>,
}

/// What an instance does with the requests it receives.
///
/// The `root`/`proxy` exclusivity (and the options that only make sense for
/// one of the two) is encoded in the variants, so the router never has to
/// re-check field combinations at request time.
#[derive(Debug, Clone)]
pub enum ServerMode {
    /// Serve files from a local directory.
    Static {
        root: String,
        headers: HeaderMap,
        file_filter: Option<FileTypeFilter>,
    },
    /// Forward every request under the mounted location to an upstream.
    Proxy { upstream: String },
}

/// Extension filter for static instances.
///
/// Holds lowercase extensions without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTypeFilter {
    Allowed(HashSet<String>),
    Forbidden(HashSet<String>),
}

impl FileTypeFilter {
    /// Whether a file with the given extension may be served.
    ///
    /// Files without an extension pass a forbidden-list but fail an
    /// allowed-list.
    pub fn permits(&self, extension: Option<&str>) -> bool {
        let listed = |set: &HashSet<String>| {
            extension.is_some_and(|ext| set.contains(&ext.to_ascii_lowercase()))
        };
        match self {
            Self::Allowed(set) => listed(set),
            Self::Forbidden(set) => !listed(set),
        }
    }
}

/// A fully validated server instance.
///
/// Constructed once at startup, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct ServerInstance {
    pub mode: ServerMode,
    pub port: u16,
    /// URL prefix the instance is mounted under, slash-normalized.
    pub location: String,
    pub redirect_html_extension: bool,
    /// Custom error pages relative to the root, slash-normalized.
    /// The bare `/` means "not configured".
    pub not_found_path: String,
    pub internal_error_path: String,
    pub forbidden_path: String,
}

impl ServerInstance {
    pub fn is_proxy(&self) -> bool {
        matches!(self.mode, ServerMode::Proxy { .. })
    }
}
