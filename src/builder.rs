//! Builds a [`SchemaGraph`] from a JSON Schema document.
//!
//! Only document-local references (`#`, `#/definitions/...`, `#/$defs/...`)
//! are followed. Each reference target becomes exactly one node no matter how
//! many places point at it, so recursive schemas turn into back-edges instead
//! of unbounded expansion.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::LoadError;
use crate::graph::{NodeId, PropertyDef, SchemaGraph, SchemaNode};
use crate::loader::{check_meta_schema, decode_fragment, load_schema_auto, navigate_fragment};
use crate::resolver::is_leaf_schema;
use crate::types::{json_type_name, Combinator, JsonType, TypeSet};

/// Options for building a schema graph.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// JSON Pointer fragment selecting the root schema, e.g. `#/definitions/Pet`.
    /// Defaults to the whole document.
    pub root: String,
    /// Validate the document against its meta-schema before building.
    pub check_meta: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            root: "#".to_string(),
            check_meta: true,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the root schema by JSON Pointer fragment.
    pub fn root(mut self, pointer: impl Into<String>) -> Self {
        self.root = pointer.into();
        self
    }

    /// Enable or disable meta-schema validation.
    pub fn check_meta(mut self, check: bool) -> Self {
        self.check_meta = check;
        self
    }
}

/// Load a schema from a file path or URL and build its graph.
///
/// # Errors
///
/// Returns any loading error, or the first error from [`build_graph`].
pub fn load_graph(source: &str, options: &BuildOptions) -> Result<SchemaGraph, LoadError> {
    let document = load_schema_auto(source)?;
    build_graph(&document, options)
}

/// Build the schema graph of `document`, rooted at `options.root`.
///
/// # Errors
///
/// Returns `LoadError::InvalidSchema` for malformed keywords (or a failed
/// meta-schema check), `LoadError::UnresolvedReference` for a `$ref` that is
/// not document-local or does not exist, and `LoadError::CircularReference`
/// when `$ref`s loop without ever reaching a schema body.
///
/// References are checked while the graph is built, before the meta-schema
/// check compiles the document.
pub fn build_graph(document: &Value, options: &BuildOptions) -> Result<SchemaGraph, LoadError> {
    let root_key = pointer_key(&decode_fragment(&options.root)?);
    let root_value = navigate_fragment(document, &root_key)?;

    let mut builder = GraphBuilder::new(document);
    let root = builder.alloc(&root_key);
    builder.targets.insert(root_key.clone(), root);
    builder.fill_node(root, root_value, &root_key)?;
    builder.graph.set_root(root);

    builder.inherit_reference_types()?;
    builder.check_reference_chains()?;

    if options.check_meta {
        check_meta_schema(document)?;
    }

    debug!(
        root = %root_key,
        nodes = builder.graph.len(),
        "built schema graph"
    );
    Ok(builder.graph)
}

// --- Internal implementation ---

struct GraphBuilder<'a> {
    document: &'a Value,
    graph: SchemaGraph,
    /// JSON Pointer of each node, indexed like the graph.
    paths: Vec<String>,
    /// Reference targets already turned into nodes.
    targets: HashMap<String, NodeId>,
    /// Properties that point at a named schema without declaring a type.
    untyped_refs: Vec<(NodeId, usize)>,
}

impl<'a> GraphBuilder<'a> {
    fn new(document: &'a Value) -> Self {
        Self {
            document,
            graph: SchemaGraph::new(),
            paths: Vec::new(),
            targets: HashMap::new(),
            untyped_refs: Vec::new(),
        }
    }

    fn alloc(&mut self, path: &str) -> NodeId {
        self.paths.push(path.to_string());
        self.graph.add(SchemaNode::new())
    }

    fn fill_node(&mut self, id: NodeId, value: &'a Value, path: &str) -> Result<(), LoadError> {
        let map = match value {
            Value::Object(map) => map,
            // `true` / `false` schemas carry no structure.
            Value::Bool(_) => return Ok(()),
            other => {
                return Err(LoadError::InvalidSchema {
                    path: path.to_string(),
                    message: format!("expected object or boolean, got {}", json_type_name(other)),
                })
            }
        };

        let types = parse_types(map, path)?;
        {
            let node = self.graph.node_mut(id);
            node.id = string_keyword(map, "$id").or_else(|| string_keyword(map, "id"));
            node.title = string_keyword(map, "title");
            node.description = string_keyword(map, "description");
            node.types = types;
            node.required = required_names(map);
        }

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            let target = self.resolve_ref(reference, path)?;
            self.graph.node_mut(id).reference = Some(target);
        }

        if let Some(props) = map.get("properties").and_then(Value::as_object) {
            let mut defs = Vec::with_capacity(props.len());
            for (name, prop) in props {
                let prop_path = format!("{}/properties/{}", path, escape_token(name));
                defs.push(self.build_property(name, prop, &prop_path)?);
            }
            for (index, def) in defs.iter().enumerate() {
                if def.reference.is_some() && def.types.is_empty() {
                    self.untyped_refs.push((id, index));
                }
            }
            self.graph.node_mut(id).properties = defs;
        }

        for kind in Combinator::ALL {
            let Some(members) = map.get(kind.keyword()).and_then(Value::as_array) else {
                continue;
            };
            for (i, member) in members.iter().enumerate() {
                let member_path = format!("{}/{}/{}", path, kind.keyword(), i);
                let member_id = self.alloc(&member_path);
                self.fill_node(member_id, member, &member_path)?;
                self.graph.push_member(id, kind, member_id);
            }
        }

        Ok(())
    }

    fn build_property(
        &mut self,
        name: &str,
        value: &'a Value,
        path: &str,
    ) -> Result<PropertyDef, LoadError> {
        let mut def = PropertyDef {
            name: name.to_string(),
            ..PropertyDef::default()
        };

        match value {
            Value::Object(map) => {
                def.description = string_keyword(map, "description");
                def.types = parse_types(map, path)?;
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    def.reference = Some(self.resolve_ref(reference, path)?);
                }
            }
            Value::Bool(_) => {}
            other => {
                return Err(LoadError::InvalidSchema {
                    path: path.to_string(),
                    message: format!("expected object or boolean, got {}", json_type_name(other)),
                })
            }
        }

        Ok(def)
    }

    /// Node for a document-local `$ref`, building it on first use.
    fn resolve_ref(&mut self, reference: &str, path: &str) -> Result<NodeId, LoadError> {
        let unresolved = || LoadError::UnresolvedReference {
            path: path.to_string(),
            reference: reference.to_string(),
        };

        if !reference.starts_with('#') {
            return Err(unresolved());
        }

        let key = pointer_key(&decode_fragment(reference).map_err(|_| unresolved())?);
        if let Some(id) = self.targets.get(&key) {
            trace!(reference = %key, "reusing reference target");
            return Ok(*id);
        }

        let target = navigate_fragment(self.document, &key).map_err(|_| unresolved())?;
        let id = self.alloc(&key);
        self.targets.insert(key.clone(), id);
        trace!(reference = %key, node = id.index(), "building reference target");
        self.fill_node(id, target, &key)?;
        Ok(id)
    }

    /// Give each untyped reference property the type of the schema it names.
    fn inherit_reference_types(&mut self) -> Result<(), LoadError> {
        for (node, index) in std::mem::take(&mut self.untyped_refs) {
            let Some(target) = self.graph.node(node).properties[index].reference else {
                continue;
            };
            let body = self.graph.node(self.dereference(target)?);
            let types = if body.types.is_empty() && !body.properties.is_empty() {
                TypeSet::from(JsonType::Object)
            } else {
                body.types.clone()
            };
            self.graph.node_mut(node).properties[index].types = types;
        }
        Ok(())
    }

    fn check_reference_chains(&self) -> Result<(), LoadError> {
        for index in 0..self.graph.len() {
            self.dereference(NodeId(index))?;
        }
        Ok(())
    }

    /// Follow `$ref` links from `start` through bare reference nodes until a
    /// node with a schema body.
    fn dereference(&self, start: NodeId) -> Result<NodeId, LoadError> {
        let mut seen: Vec<NodeId> = Vec::new();
        let mut current = start;
        loop {
            let node = self.graph.node(current);
            match node.reference {
                Some(next) if is_bare(node) => {
                    if seen.contains(&current) {
                        let mut chain: Vec<String> =
                            seen.iter().map(|id| self.paths[id.index()].clone()).collect();
                        chain.push(self.paths[current.index()].clone());
                        return Err(LoadError::CircularReference { chain });
                    }
                    seen.push(current);
                    current = next;
                }
                _ => return Ok(current),
            }
        }
    }
}

/// A node that is nothing but a `$ref`.
fn is_bare(node: &SchemaNode) -> bool {
    node.types.is_empty() && node.properties.is_empty() && is_leaf_schema(node)
}

fn parse_types(map: &Map<String, Value>, path: &str) -> Result<TypeSet, LoadError> {
    let type_path = format!("{}/type", path);
    match map.get("type") {
        None => Ok(TypeSet::new()),
        Some(Value::String(name)) => parse_type_name(name, &type_path).map(TypeSet::from),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let item_path = format!("{}/{}", type_path, i);
                match item {
                    Value::String(name) => parse_type_name(name, &item_path),
                    other => Err(LoadError::InvalidSchema {
                        path: item_path,
                        message: format!("expected string, got {}", json_type_name(other)),
                    }),
                }
            })
            .collect(),
        Some(other) => Err(LoadError::InvalidSchema {
            path: type_path,
            message: format!("expected string or array, got {}", json_type_name(other)),
        }),
    }
}

fn parse_type_name(name: &str, path: &str) -> Result<JsonType, LoadError> {
    JsonType::parse(name).ok_or_else(|| LoadError::InvalidSchema {
        path: path.to_string(),
        message: format!("unknown type \"{}\"", name),
    })
}

fn string_keyword(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

fn required_names(map: &Map<String, Value>) -> Vec<String> {
    map.get("required")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Canonical `#`-prefixed form of a pointer fragment.
fn pointer_key(fragment: &str) -> String {
    let path = fragment.strip_prefix('#').unwrap_or(fragment);
    if path.is_empty() {
        "#".to_string()
    } else if path.starts_with('/') {
        format!("#{}", path)
    } else {
        format!("#/{}", path)
    }
}

/// Escape a key for use as a JSON Pointer token (`~` -> `~0`, `/` -> `~1`).
fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(document: &Value) -> SchemaGraph {
        build_graph(document, &BuildOptions::new()).unwrap()
    }

    fn root_node(graph: &SchemaGraph) -> &SchemaNode {
        graph.node(graph.root().unwrap())
    }

    #[test]
    fn builds_root_fields() {
        let graph = build(&json!({
            "$id": "https://example.com/pet.json",
            "title": "Pet",
            "description": "A pet",
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": { "type": "string", "description": "Pet name" },
                "age": { "type": "integer" }
            }
        }));

        let root = root_node(&graph);
        assert_eq!(root.id.as_deref(), Some("https://example.com/pet.json"));
        assert_eq!(root.title.as_deref(), Some("Pet"));
        assert_eq!(root.description.as_deref(), Some("A pet"));
        assert_eq!(root.types.single(), Some(JsonType::Object));
        assert_eq!(root.required, ["name"]);

        let names: Vec<&str> = root.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["name", "age"]);
        assert_eq!(root.properties[0].description.as_deref(), Some("Pet name"));
        assert_eq!(root.properties[1].description, None);
    }

    #[test]
    fn legacy_id_keyword() {
        let graph = build(&json!({ "id": "urn:legacy", "title": "Old" }));
        assert_eq!(root_node(&graph).id.as_deref(), Some("urn:legacy"));
    }

    #[test]
    fn union_types_kept_in_order() {
        let graph = build(&json!({
            "properties": { "age": { "type": ["string", "number"] } }
        }));
        let age = &root_node(&graph).properties[0];
        assert_eq!(age.types.to_string(), "[string,number]");
    }

    #[test]
    fn unknown_type_is_rejected() {
        let doc = json!({ "properties": { "age": { "type": "text" } } });
        let result = build_graph(&doc, &BuildOptions::new().check_meta(false));
        assert!(matches!(
            result,
            Err(LoadError::InvalidSchema { path, .. }) if path == "#/properties/age/type"
        ));
    }

    #[test]
    fn combinator_members_become_nodes() {
        let graph = build(&json!({
            "title": "Pet",
            "allOf": [
                { "title": "HasOwner", "properties": { "owner": { "type": "string" } } },
                { "title": "HasTag", "properties": { "tag": { "type": "string" } } }
            ],
            "oneOf": [ true ]
        }));

        let root = root_node(&graph);
        assert_eq!(root.all_of.len(), 2);
        assert!(root.any_of.is_empty());
        assert_eq!(root.one_of.len(), 1);
        assert_eq!(graph.node(root.all_of[1]).title.as_deref(), Some("HasTag"));
    }

    #[test]
    fn shared_reference_target_built_once() {
        let graph = build(&json!({
            "definitions": {
                "Address": { "title": "Address", "type": "object" }
            },
            "properties": {
                "home": { "$ref": "#/definitions/Address" },
                "work": { "$ref": "#/definitions/Address" }
            }
        }));

        let root = root_node(&graph);
        assert_eq!(root.properties[0].reference, root.properties[1].reference);
        // root + Address
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn reference_property_inherits_target_type() {
        let graph = build(&json!({
            "definitions": {
                "Address": {
                    "title": "Address",
                    "properties": { "street": { "type": "string" } }
                },
                "Code": { "type": "string" }
            },
            "properties": {
                "home": { "$ref": "#/definitions/Address" },
                "code": { "$ref": "#/definitions/Code" },
                "pinned": { "$ref": "#/definitions/Code", "type": "integer" }
            }
        }));

        let props = &root_node(&graph).properties;
        assert_eq!(props[0].types.single(), Some(JsonType::Object));
        assert_eq!(props[1].types.single(), Some(JsonType::String));
        assert_eq!(props[2].types.single(), Some(JsonType::Integer));
    }

    #[test]
    fn self_reference_is_back_edge() {
        let graph = build(&json!({
            "title": "Node",
            "type": "object",
            "properties": {
                "value": { "type": "string" },
                "parent": { "$ref": "#" }
            }
        }));

        let root_id = graph.root().unwrap();
        let parent = &graph.node(root_id).properties[1];
        assert_eq!(parent.reference, Some(root_id));
        assert_eq!(parent.types.single(), Some(JsonType::Object));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn mutual_references_terminate() {
        let graph = build(&json!({
            "definitions": {
                "A": { "title": "A", "type": "object", "properties": { "b": { "$ref": "#/definitions/B" } } },
                "B": { "title": "B", "type": "object", "properties": { "a": { "$ref": "#/definitions/A" } } }
            },
            "properties": { "start": { "$ref": "#/definitions/A" } }
        }));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn bare_reference_loop_is_rejected() {
        let doc = json!({
            "definitions": {
                "A": { "$ref": "#/definitions/B" },
                "B": { "$ref": "#/definitions/A" }
            },
            "properties": { "start": { "$ref": "#/definitions/A" } }
        });
        let result = build_graph(&doc, &BuildOptions::new());
        match result {
            Err(LoadError::CircularReference { chain }) => {
                assert_eq!(
                    chain,
                    ["#/definitions/A", "#/definitions/B", "#/definitions/A"]
                );
            }
            other => panic!("expected circular reference, got {:?}", other),
        }
    }

    #[test]
    fn external_reference_is_unresolved() {
        let doc = json!({
            "properties": { "owner": { "$ref": "person.json" } }
        });
        let result = build_graph(&doc, &BuildOptions::new());
        assert!(matches!(
            result,
            Err(LoadError::UnresolvedReference { path, reference })
                if path == "#/properties/owner" && reference == "person.json"
        ));
    }

    #[test]
    fn missing_local_reference_is_unresolved() {
        let doc = json!({
            "properties": { "owner": { "$ref": "#/definitions/Person" } }
        });
        let result = build_graph(&doc, &BuildOptions::new());
        assert!(matches!(result, Err(LoadError::UnresolvedReference { .. })));
    }

    #[test]
    fn percent_encoded_reference() {
        let graph = build(&json!({
            "definitions": {
                "a b": { "title": "Spaced", "type": "object" }
            },
            "properties": { "x": { "$ref": "#/definitions/a%20b" } }
        }));

        let x = &root_node(&graph).properties[0];
        let target = x.reference.unwrap();
        assert_eq!(graph.node(target).title.as_deref(), Some("Spaced"));
        assert_eq!(x.types.single(), Some(JsonType::Object));
    }

    #[test]
    fn encoded_and_plain_references_share_target() {
        let doc = json!({
            "definitions": {
                "a b": { "title": "Spaced", "type": "object" }
            },
            "properties": {
                "x": { "$ref": "#/definitions/a%20b" },
                "y": { "$ref": "#/definitions/a b" }
            }
        });
        let graph = build_graph(&doc, &BuildOptions::new().check_meta(false)).unwrap();

        let props = &root_node(&graph).properties;
        assert_eq!(props[0].reference, props[1].reference);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn empty_key_pointer_is_not_root() {
        let doc = json!({
            "": { "title": "EmptyKey", "type": "object" },
            "title": "Document"
        });
        let graph = build_graph(&doc, &BuildOptions::new().root("#/")).unwrap();
        assert_eq!(root_node(&graph).title.as_deref(), Some("EmptyKey"));
    }

    #[test]
    fn unresolved_reference_reported_before_meta_check() {
        let doc = json!({
            "definitions": { "Bad": { "type": 42 } },
            "properties": { "owner": { "$ref": "#/definitions/Missing" } }
        });
        let result = build_graph(&doc, &BuildOptions::new());
        assert!(matches!(result, Err(LoadError::UnresolvedReference { .. })));
    }

    #[test]
    fn meta_check_runs_after_building() {
        let doc = json!({
            "definitions": { "Unused": { "minLength": "long" } },
            "properties": { "name": { "type": "string" } }
        });
        assert!(build_graph(&doc, &BuildOptions::new().check_meta(false)).is_ok());
        assert!(matches!(
            build_graph(&doc, &BuildOptions::new()),
            Err(LoadError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn combinator_member_reference() {
        let graph = build(&json!({
            "definitions": {
                "HasOwner": { "title": "HasOwner", "type": "object" }
            },
            "anyOf": [
                { "$ref": "#/definitions/HasOwner" },
                { "title": "Inline" }
            ]
        }));

        let root = root_node(&graph);
        let member = graph.node(root.any_of[0]);
        let target = member.reference.unwrap();
        assert_eq!(graph.node(target).title.as_deref(), Some("HasOwner"));
        assert_eq!(graph.node(root.any_of[1]).reference, None);
    }

    #[test]
    fn root_selected_by_pointer() {
        let doc = json!({
            "definitions": {
                "Pet": {
                    "title": "Pet",
                    "properties": { "owner": { "$ref": "#/definitions/Person" } }
                },
                "Person": { "title": "Person", "type": "object" }
            }
        });
        let graph = build_graph(&doc, &BuildOptions::new().root("#/definitions/Pet")).unwrap();

        let root = root_node(&graph);
        assert_eq!(root.title.as_deref(), Some("Pet"));
        let owner = root.properties[0].reference.unwrap();
        assert_eq!(graph.node(owner).title.as_deref(), Some("Person"));
    }

    #[test]
    fn missing_root_pointer() {
        let doc = json!({ "definitions": {} });
        let result = build_graph(&doc, &BuildOptions::new().root("definitions/Nope"));
        assert!(matches!(
            result,
            Err(LoadError::UnresolvedReference { reference, .. }) if reference == "#/definitions/Nope"
        ));
    }

    #[test]
    fn non_schema_value_rejected() {
        let doc = json!({ "allOf": [ 42, {} ] });
        let result = build_graph(&doc, &BuildOptions::new().check_meta(false));
        assert!(matches!(
            result,
            Err(LoadError::InvalidSchema { path, .. }) if path == "#/allOf/0"
        ));
    }

    #[test]
    fn pointer_key_normalizes() {
        assert_eq!(pointer_key(""), "#");
        assert_eq!(pointer_key("#"), "#");
        assert_eq!(pointer_key("#/"), "#/");
        assert_eq!(pointer_key("#/definitions/Pet"), "#/definitions/Pet");
        assert_eq!(pointer_key("/definitions/Pet"), "#/definitions/Pet");
        assert_eq!(pointer_key("definitions/Pet"), "#/definitions/Pet");
    }
}
