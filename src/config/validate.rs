//! Configuration validation module
//!
//! Turns raw JSON entries into validated `ServerInstance` values. All
//! entries are checked before any listener binds: every failure is
//! collected and reported together, and a single bad entry prevents the
//! whole batch from starting.

use crate::config::types::{
    FileTypeFilter, RawServerConfig, ServerInstance, ServerMode, DEFAULT_PORT,
};
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A validation failure, labeled with the 1-based ordinal of the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub server_number: usize,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (server #{})", self.message, self.server_number)
    }
}

impl std::error::Error for ConfigError {}

fn error(server_number: usize, message: impl Into<String>) -> ConfigError {
    ConfigError {
        server_number,
        message: message.into(),
    }
}

/// Validate every entry, collecting all failures.
///
/// Batch-atomic: if any entry is invalid the whole configuration is
/// rejected and no instance is returned. Listen ports must be unique
/// across entries: with `SO_REUSEPORT` enabled on every listener a
/// duplicate bind would succeed silently and the kernel would split
/// traffic between the colliding instances, so duplicates (explicit or
/// via the default port) are configuration errors.
pub fn validate_all(entries: &[RawServerConfig]) -> Result<Vec<ServerInstance>, Vec<ConfigError>> {
    let mut instances = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();
    let mut bound_ports: HashMap<u16, usize> = HashMap::new();

    for (index, entry) in entries.iter().enumerate() {
        let server_number = index + 1;
        match validate(server_number, entry) {
            Ok(instance) => {
                if let Some(first) = bound_ports.get(&instance.port) {
                    errors.push(error(
                        server_number,
                        format!(
                            "port {} is already used by server #{first}.",
                            instance.port
                        ),
                    ));
                } else {
                    bound_ports.insert(instance.port, server_number);
                    instances.push(instance);
                }
            }
            Err(err) => errors.push(err),
        }
    }

    if errors.is_empty() {
        Ok(instances)
    } else {
        Err(errors)
    }
}

/// Validate a single entry, failing on the first offending field.
pub fn validate(server_number: usize, raw: &RawServerConfig) -> Result<ServerInstance, ConfigError> {
    if raw.proxy.is_some() && raw.port.is_some() {
        return Err(error(
            server_number,
            "'proxy' and 'port' cannot be set on the same server.",
        ));
    }
    if raw.proxy.is_some() && raw.headers.is_some() {
        return Err(error(
            server_number,
            "the 'headers' configuration cannot be used on the same server as a 'proxy'.",
        ));
    }
    if raw.proxy.is_none() && raw.root.is_none() {
        return Err(error(
            server_number,
            "a 'root' or 'proxy' is required in order to start a server.",
        ));
    }

    let proxy = optional_string(server_number, raw.proxy.as_ref(), "proxy")?;
    let root = optional_string(server_number, raw.root.as_ref(), "root")?;
    let port = optional_port(server_number, raw.port.as_ref())?;
    let location = optional_string(server_number, raw.location.as_ref(), "location")?;
    let redirect_html_extension = optional_bool(
        server_number,
        raw.redirect_html_extension.as_ref(),
        "redirectHtmlExtension",
    )?;
    let not_found_path = optional_string(server_number, raw.not_found_path.as_ref(), "notFoundPath")?;
    let internal_error_path = optional_string(
        server_number,
        raw.internal_error_path.as_ref(),
        "internalErrorPath",
    )?;
    let forbidden_path =
        optional_string(server_number, raw.forbidden_path.as_ref(), "forbiddenPath")?;

    if raw.allowed_file_types.is_some() && raw.forbidden_file_types.is_some() {
        return Err(error(
            server_number,
            "only one of 'allowedFileTypes' and 'forbiddenFileTypes' may be set.",
        ));
    }

    let file_filter = if let Some(set) =
        parse_file_types(server_number, raw.allowed_file_types.as_ref(), "allowedFileTypes")?
    {
        Some(FileTypeFilter::Allowed(set))
    } else {
        parse_file_types(
            server_number,
            raw.forbidden_file_types.as_ref(),
            "forbiddenFileTypes",
        )?
        .map(FileTypeFilter::Forbidden)
    };

    let headers = parse_headers(server_number, raw.headers.as_ref())?;

    let mode = if let Some(upstream) = proxy {
        ServerMode::Proxy { upstream }
    } else if let Some(root) = root {
        ServerMode::Static {
            root,
            headers,
            file_filter,
        }
    } else {
        // Guarded above; kept so the match is total without panicking.
        return Err(error(
            server_number,
            "a 'root' or 'proxy' is required in order to start a server.",
        ));
    };

    Ok(ServerInstance {
        mode,
        port,
        location: strip_outer_slashes(location.as_deref()),
        redirect_html_extension,
        not_found_path: strip_outer_slashes(not_found_path.as_deref()),
        internal_error_path: strip_outer_slashes(internal_error_path.as_deref()),
        forbidden_path: strip_outer_slashes(forbidden_path.as_deref()),
    })
}

/// Strip all leading and trailing slashes from a path-like value.
///
/// The bare `/`, an empty string and an absent value all normalize to `/`.
/// Normalization is idempotent.
pub fn strip_outer_slashes(value: Option<&str>) -> String {
    let Some(value) = value else {
        return "/".to_string();
    };
    let stripped = value.trim_start_matches('/').trim_end_matches('/');
    if stripped.is_empty() {
        "/".to_string()
    } else {
        stripped.to_string()
    }
}

fn optional_string(
    server_number: usize,
    value: Option<&Value>,
    field: &str,
) -> Result<Option<String>, ConfigError> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(error(
            server_number,
            format!("'{field}' must be of type string."),
        )),
    }
}

fn optional_bool(
    server_number: usize,
    value: Option<&Value>,
    field: &str,
) -> Result<bool, ConfigError> {
    match value {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(error(
            server_number,
            format!("'{field}' must be of type boolean."),
        )),
    }
}

fn optional_port(server_number: usize, value: Option<&Value>) -> Result<u16, ConfigError> {
    match value {
        None => Ok(DEFAULT_PORT),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .filter(|p| *p > 0)
            .ok_or_else(|| {
                error(
                    server_number,
                    "'port' must be an integer between 1 and 65535.",
                )
            }),
        Some(_) => Err(error(server_number, "'port' must be of type number.")),
    }
}

fn parse_headers(
    server_number: usize,
    value: Option<&Value>,
) -> Result<HeaderMap, ConfigError> {
    let Some(value) = value else {
        return Ok(HeaderMap::new());
    };
    let Value::Object(map) = value else {
        return Err(error(
            server_number,
            "'headers' must be an object with string values.",
        ));
    };

    let mut headers = HeaderMap::with_capacity(map.len());
    for (name, value) in map {
        let Value::String(value) = value else {
            return Err(error(
                server_number,
                "'headers' must be an object with string values.",
            ));
        };
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            error(
                server_number,
                "'headers' contains an invalid header name or value.",
            )
        })?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            error(
                server_number,
                "'headers' contains an invalid header name or value.",
            )
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn parse_file_types(
    server_number: usize,
    value: Option<&Value>,
    field: &str,
) -> Result<Option<HashSet<String>>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let Value::Array(items) = value else {
        return Err(error(
            server_number,
            format!("'{field}' must be an array of strings."),
        ));
    };

    let mut set = HashSet::with_capacity(items.len());
    for item in items {
        let Value::String(ext) = item else {
            return Err(error(
                server_number,
                format!("'{field}' must be an array of strings."),
            ));
        };
        set.insert(ext.trim_start_matches('.').to_ascii_lowercase());
    }
    Ok(Some(set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawServerConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_root_and_proxy_is_rejected() {
        let err = validate(1, &raw(json!({}))).unwrap_err();
        assert!(err.message.contains("required"));
        assert_eq!(err.server_number, 1);
    }

    #[test]
    fn proxy_and_port_conflict() {
        let entry = raw(json!({ "proxy": "http://127.0.0.1:9000", "port": 8080 }));
        let err = validate(1, &entry).unwrap_err();
        assert!(err.message.contains("'proxy' and 'port'"));
    }

    #[test]
    fn proxy_and_headers_conflict() {
        let entry = raw(json!({
            "proxy": "http://127.0.0.1:9000",
            "headers": { "X-Test": "1" }
        }));
        assert!(validate(1, &entry).is_err());
    }

    #[test]
    fn both_file_type_filters_rejected() {
        let entry = raw(json!({
            "root": "./public",
            "allowedFileTypes": ["html"],
            "forbiddenFileTypes": ["exe"]
        }));
        let err = validate(1, &entry).unwrap_err();
        assert!(err.message.contains("allowedFileTypes"));
    }

    #[test]
    fn field_types_are_checked() {
        assert!(validate(1, &raw(json!({ "root": 5 }))).is_err());
        assert!(validate(1, &raw(json!({ "proxy": 5 }))).is_err());
        assert!(validate(1, &raw(json!({ "root": "./p", "port": "80" }))).is_err());
        assert!(validate(1, &raw(json!({ "root": "./p", "location": 1 }))).is_err());
        assert!(validate(1, &raw(json!({ "root": "./p", "redirectHtmlExtension": "yes" }))).is_err());
        assert!(validate(1, &raw(json!({ "root": "./p", "notFoundPath": 404 }))).is_err());
        assert!(validate(1, &raw(json!({ "root": "./p", "headers": "nope" }))).is_err());
        assert!(validate(1, &raw(json!({ "root": "./p", "allowedFileTypes": "html" }))).is_err());
    }

    #[test]
    fn port_range_is_checked() {
        let err = validate(1, &raw(json!({ "root": "./p", "port": 70000 }))).unwrap_err();
        assert!(err.message.contains("between"));
        assert!(validate(1, &raw(json!({ "root": "./p", "port": 0 }))).is_err());
    }

    #[test]
    fn static_mode_is_built() {
        let entry = raw(json!({
            "root": "./public",
            "port": 3000,
            "headers": { "X-Served-By": "multiserve" },
            "allowedFileTypes": [".HTML", "css"]
        }));
        let instance = validate(1, &entry).unwrap();
        assert_eq!(instance.port, 3000);
        match instance.mode {
            ServerMode::Static {
                root,
                headers,
                file_filter,
            } => {
                assert_eq!(root, "./public");
                assert_eq!(headers.get("x-served-by").unwrap(), "multiserve");
                let expected: HashSet<String> =
                    ["html", "css"].iter().map(ToString::to_string).collect();
                assert_eq!(file_filter, Some(FileTypeFilter::Allowed(expected)));
            }
            ServerMode::Proxy { .. } => panic!("expected static mode"),
        }
    }

    #[test]
    fn proxy_mode_is_built_with_defaults() {
        let entry = raw(json!({
            "proxy": "http://127.0.0.1:9000",
            "location": "/api/"
        }));
        let instance = validate(2, &entry).unwrap();
        assert!(instance.is_proxy());
        assert_eq!(instance.port, DEFAULT_PORT);
        assert_eq!(instance.location, "api");
        assert_eq!(instance.not_found_path, "/");
    }

    #[test]
    fn slash_normalization() {
        assert_eq!(strip_outer_slashes(None), "/");
        assert_eq!(strip_outer_slashes(Some("/")), "/");
        assert_eq!(strip_outer_slashes(Some("//foo/bar//")), "foo/bar");
        assert_eq!(strip_outer_slashes(Some("foo/bar")), "foo/bar");
        assert_eq!(strip_outer_slashes(Some("//")), "/");
    }

    #[test]
    fn slash_normalization_is_idempotent() {
        for input in ["/", "//foo/bar//", "foo", "///", "/a/b/c/"] {
            let once = strip_outer_slashes(Some(input));
            assert_eq!(strip_outer_slashes(Some(&once)), once);
        }
    }

    #[test]
    fn batch_collects_every_error() {
        let entries = vec![
            raw(json!({})),
            raw(json!({ "root": "./public" })),
            raw(json!({ "proxy": "http://x", "port": 80 })),
        ];
        let errors = validate_all(&entries).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].server_number, 1);
        assert_eq!(errors[1].server_number, 3);
    }

    #[test]
    fn batch_succeeds_when_all_entries_are_valid() {
        let entries = vec![
            raw(json!({ "root": "./public", "port": 3000 })),
            raw(json!({ "proxy": "http://127.0.0.1:9000" })),
        ];
        let instances = validate_all(&entries).unwrap();
        assert_eq!(instances.len(), 2);
    }

    #[test]
    fn duplicate_ports_are_rejected() {
        let entries = vec![
            raw(json!({ "root": "./a", "port": 3000 })),
            raw(json!({ "root": "./b", "port": 3000 })),
        ];
        let errors = validate_all(&entries).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].server_number, 2);
        assert!(errors[0].message.contains("already used by server #1"));
    }

    #[test]
    fn default_port_collides_with_explicit_binding() {
        // A proxy entry may not set 'port' and falls back to the default,
        // so explicitly binding the default port elsewhere clashes with it.
        let entries = vec![
            raw(json!({ "root": "./public", "port": DEFAULT_PORT })),
            raw(json!({ "proxy": "http://127.0.0.1:9000" })),
        ];
        let errors = validate_all(&entries).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].server_number, 2);
    }

    #[test]
    fn error_display_names_the_ordinal() {
        let err = validate(3, &raw(json!({}))).unwrap_err();
        assert!(err.to_string().ends_with("(server #3)"));
    }
}
