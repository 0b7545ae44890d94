//! Struct integrity check.
//!
//! A generated struct has one statically typed field per property, so every
//! property must declare exactly one type. `[string]` is fine, `[string, number]`
//! is not.

use tracing::debug;

use crate::description::SchemaDescription;
use crate::error::{IntegrityError, TypeConflict};

/// Check that every property of `description` has exactly one type.
///
/// All offending properties are reported together, in property order.
///
/// # Errors
///
/// Returns `IntegrityError::TypeConflicts` listing each property whose type
/// set is empty or holds more than one type.
pub fn validate_struct_integrity(description: &SchemaDescription) -> Result<(), IntegrityError> {
    let conflicts: Vec<TypeConflict> = description
        .properties
        .iter()
        .filter(|p| p.types.single().is_none())
        .map(|p| TypeConflict {
            property: p.name.clone(),
            types: p.types.clone(),
        })
        .collect();

    if conflicts.is_empty() {
        Ok(())
    } else {
        debug!(
            schema = description.name(),
            conflicts = conflicts.len(),
            "struct integrity check failed"
        );
        Err(IntegrityError::TypeConflicts { conflicts })
    }
}
