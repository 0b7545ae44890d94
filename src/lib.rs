//! Schema Inspector
//!
//! Flattens a JSON Schema object into a struct-ready description: a name and
//! an ordered list of typed properties.
//!
//! A schema document is first built into a [`SchemaGraph`], an arena of
//! schema nodes linked by combinator membership and `$ref` targets. The
//! resolver then walks a root node's direct properties and the members of its
//! `allOf`, `anyOf` and `oneOf` lists, producing a [`SchemaDescription`].
//! Because a generated struct has one statically typed field per property,
//! [`validate_struct_integrity`] rejects any property whose type is a union.
//!
//! # Example
//!
//! ```
//! use schema_inspect::{build_graph, get_object_description, validate_struct_integrity, BuildOptions};
//! use serde_json::json;
//!
//! let document = json!({
//!     "title": "Pet",
//!     "required": ["name"],
//!     "properties": {
//!         "name": { "type": "string" },
//!         "age": { "type": "integer" }
//!     },
//!     "allOf": [
//!         { "title": "HasOwner", "properties": { "owner": { "type": "string" } } },
//!         { "title": "HasTag", "properties": { "tag": { "type": "string" } } }
//!     ]
//! });
//!
//! let graph = build_graph(&document, &BuildOptions::new()).unwrap();
//! let root = graph.root().unwrap();
//! let description = get_object_description(&graph, root);
//!
//! assert_eq!(description.name(), "Pet");
//! let names: Vec<&str> = description.properties.iter().map(|p| p.name.as_str()).collect();
//! assert_eq!(names, ["name", "age", "owner", "tag"]);
//! assert!(description.properties[0].required);
//! assert!(validate_struct_integrity(&description).is_ok());
//! ```
//!
//! # Resolution Rules
//!
//! | Source | Included | `required` looked up in | `reference` |
//! |--------|----------|-------------------------|-------------|
//! | Root `properties` | always | root | the property's own `$ref` |
//! | Combinator member `properties` | only when the combinator has 2+ members | root | the member's `$ref`, if the property has one |
//!
//! Properties are emitted in source order: root properties, then `allOf`,
//! `anyOf`, `oneOf` members.

mod builder;
mod description;
mod error;
mod graph;
mod integrity;
mod loader;
mod resolver;
mod types;

pub use builder::{build_graph, load_graph, BuildOptions};
pub use description::{Property, SchemaDescription};
pub use error::{IntegrityError, LoadError, TypeConflict};
pub use graph::{NodeId, PropertyDef, SchemaGraph, SchemaNode};
pub use integrity::validate_struct_integrity;
pub use loader::{
    check_meta_schema, decode_fragment, is_url, load_schema, load_schema_auto, load_schema_str,
    navigate_fragment,
};
pub use resolver::{
    embedded_schema_names, get_object_description, get_resolved_properties, is_leaf_schema,
    is_required_property,
};
pub use types::{json_type_name, Combinator, JsonType, TypeSet, UNDEFINED_TYPE};

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
