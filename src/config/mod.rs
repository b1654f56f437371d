//! Configuration module
//!
//! Loading, validation and the validated per-instance types.

pub mod types;
pub mod validate;

pub use types::{FileTypeFilter, RawServerConfig, ServerInstance, ServerMode, DEFAULT_PORT};
pub use validate::{strip_outer_slashes, validate_all, ConfigError};

use std::path::Path;

/// Load the raw configuration array from a JSON file.
///
/// Parse errors are not specially handled here; they propagate to `main`.
pub fn load_raw(path: &Path) -> Result<Vec<RawServerConfig>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let entries = serde_json::from_str(&text)?;
    Ok(entries)
}
