//! Error types for schema loading and struct integrity checks.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::TypeSet;

/// Errors while loading a schema document or building its graph.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    // Schema errors (exit code 2)
    #[error("invalid schema at {path}: {message}")]
    InvalidSchema { path: String, message: String },

    #[error("unresolved reference \"{reference}\" at {path}")]
    UnresolvedReference { path: String, reference: String },

    #[error("circular reference detected: {}", chain.join(" -> "))]
    CircularReference { chain: Vec<String> },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors from the struct integrity check.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("{} without a single type: {}", count_label(conflicts), property_names(conflicts))]
    TypeConflicts { conflicts: Vec<TypeConflict> },
}

fn count_label(conflicts: &[TypeConflict]) -> String {
    match conflicts.len() {
        1 => "1 property".to_string(),
        n => format!("{} properties", n),
    }
}

fn property_names(conflicts: &[TypeConflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.property.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl IntegrityError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            IntegrityError::TypeConflicts { .. } => 1,
        }
    }

    pub fn conflicts(&self) -> &[TypeConflict] {
        match self {
            IntegrityError::TypeConflicts { conflicts } => conflicts,
        }
    }
}

/// A property whose declared types don't collapse to exactly one.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TypeConflict {
    /// Name of the offending property.
    pub property: String,
    /// The declared types; empty when none were declared.
    pub types: TypeSet,
}

impl std::fmt::Display for TypeConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.types.is_empty() {
            write!(f, "{}: no type declared", self.property)
        } else {
            write!(
                f,
                "{}: expected exactly one type, got {}",
                self.property, self.types
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JsonType;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("test.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let err = LoadError::InvalidSchema {
            path: "/properties/id/type".into(),
            message: "unknown type \"text\"".into(),
        };
        assert_eq!(err.exit_code(), 2);

        let err = LoadError::UnresolvedReference {
            path: "/properties/owner".into(),
            reference: "#/definitions/Missing".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn circular_reference_display() {
        let err = LoadError::CircularReference {
            chain: vec!["#/definitions/a".into(), "#/definitions/b".into()],
        };
        assert_eq!(
            err.to_string(),
            "circular reference detected: #/definitions/a -> #/definitions/b"
        );
    }

    #[test]
    fn integrity_error_names_properties() {
        let err = IntegrityError::TypeConflicts {
            conflicts: vec![
                TypeConflict {
                    property: "age".into(),
                    types: [JsonType::String, JsonType::Number].into_iter().collect(),
                },
                TypeConflict {
                    property: "misc".into(),
                    types: TypeSet::new(),
                },
            ],
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "2 properties without a single type: age, misc"
        );
    }

    #[test]
    fn type_conflict_display() {
        let conflict = TypeConflict {
            property: "age".into(),
            types: [JsonType::String, JsonType::Number].into_iter().collect(),
        };
        assert_eq!(
            conflict.to_string(),
            "age: expected exactly one type, got [string,number]"
        );

        let conflict = TypeConflict {
            property: "misc".into(),
            types: TypeSet::new(),
        };
        assert_eq!(conflict.to_string(), "misc: no type declared");
    }
}
