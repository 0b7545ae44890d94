//! Schema loading from various sources.
//!
//! Handles loading schema documents from files, strings, and HTTP URLs.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::LoadError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a schema from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_schema(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), "loading schema file");
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_schema_str(&content)
}

/// Load a schema from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_schema_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load a schema from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the response
/// isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_schema_url(url: &str) -> Result<Value, LoadError> {
    let network_error = |source: reqwest::Error| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    debug!(url, "fetching schema");
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network_error)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a schema from a file path or URL.
///
/// Automatically detects whether the source is a URL or file path.
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_schema_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_schema_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_schema(Path::new(source))
    }
}

/// Check a document against its JSON Schema meta-schema.
///
/// The document is compiled into a validator, which also resolves its
/// `$ref`s, so run this after local references have been checked.
///
/// # Errors
///
/// Returns `LoadError::InvalidSchema` pointing at the first offending keyword.
pub fn check_meta_schema(schema: &Value) -> Result<(), LoadError> {
    jsonschema::validator_for(schema)
        .map(|_| ())
        .map_err(|e| LoadError::InvalidSchema {
            path: format!("#{}", e.instance_path),
            message: e.to_string(),
        })
}

/// Percent-decode a URI fragment such as `#/definitions/a%20b`.
///
/// # Errors
///
/// Returns `LoadError::UnresolvedReference` if the decoded bytes aren't UTF-8.
pub fn decode_fragment(fragment: &str) -> Result<String, LoadError> {
    urlencoding::decode(fragment)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| LoadError::UnresolvedReference {
            path: "#".to_string(),
            reference: fragment.to_string(),
        })
}

/// Navigate a JSON Pointer fragment (e.g., "#/definitions/foo" or "#/allOf/0").
///
/// The fragment may start with '#'; an empty pointer selects the whole document.
pub fn navigate_fragment<'v>(schema: &'v Value, fragment: &str) -> Result<&'v Value, LoadError> {
    schema
        .pointer(fragment.trim_start_matches('#'))
        .ok_or_else(|| LoadError::UnresolvedReference {
            path: "#".to_string(),
            reference: fragment.to_string(),
        })
}
