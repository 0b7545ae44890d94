//! Property resolution - flattens a root schema and its combinators into one
//! property list.

use tracing::{debug, trace};

use crate::description::{Property, SchemaDescription};
use crate::graph::{NodeId, PropertyDef, SchemaGraph, SchemaNode};
use crate::types::Combinator;

/// Resolve the description of `root`: identity fields plus the flattened
/// property list.
///
/// Missing `$id`, `title` or `description` stay `None` and read as `""`
/// through the description's accessors.
///
/// # Panics
///
/// Panics if `root` does not belong to `graph`.
pub fn get_object_description(graph: &SchemaGraph, root: NodeId) -> SchemaDescription {
    let node = graph.node(root);
    let properties = get_resolved_properties(graph, root);

    debug!(
        title = node.title_str(),
        properties = properties.len(),
        "resolved object description"
    );

    SchemaDescription {
        id: node.id.clone(),
        name: node.title.clone(),
        description: node.description.clone(),
        properties,
        schema: root,
    }
}

/// Resolve every property visible on `root`.
///
/// Direct properties come first, in declaration order, followed by the
/// properties of each `allOf`, `anyOf` and `oneOf` member. A combinator only
/// contributes when it has more than one member.
///
/// `required` is always looked up in the root's `required` list, including
/// for properties contributed by combinator members.
///
/// # Panics
///
/// Panics if `root` does not belong to `graph`.
pub fn get_resolved_properties(graph: &SchemaGraph, root: NodeId) -> Vec<Property> {
    let node = graph.node(root);

    let mut resolved: Vec<Property> = node
        .properties
        .iter()
        .map(|def| resolve_property(node, def, def.reference))
        .collect();

    for member_id in contributing_members(node) {
        let member = graph.node(member_id);
        trace!(
            member = member_id.index(),
            properties = member.properties.len(),
            "collecting combinator member properties"
        );
        for def in &member.properties {
            // References are attributed to the enclosing member, not the property.
            let reference = def.reference.and(member.reference);
            resolved.push(resolve_property(node, def, reference));
        }
    }

    resolved
}

/// Whether `name` appears in `root`'s `required` list.
///
/// # Panics
///
/// Panics if `root` does not belong to `graph`.
pub fn is_required_property(graph: &SchemaGraph, root: NodeId, name: &str) -> bool {
    is_required(graph.node(root), name)
}

/// Titles of the referenced schemas that `root` composes via its combinators.
///
/// Only members carrying a `$ref` are reported, in the same order as
/// [`get_resolved_properties`] visits them. An untitled target yields `""`.
///
/// # Panics
///
/// Panics if `root` does not belong to `graph`.
pub fn embedded_schema_names(graph: &SchemaGraph, root: NodeId) -> Vec<String> {
    contributing_members(graph.node(root))
        .filter_map(|member| graph.node(member).reference)
        .map(|target| graph.node(target).title_str().to_string())
        .collect()
}

/// Whether `node` is free of `allOf`, `anyOf` and `oneOf` entries.
pub fn is_leaf_schema(node: &SchemaNode) -> bool {
    Combinator::ALL
        .iter()
        .all(|kind| node.combinator(*kind).is_empty())
}

// --- Internal implementation ---

/// Combinator members that contribute properties, in traversal order.
///
/// Collections with a single member are skipped.
fn contributing_members(node: &SchemaNode) -> impl Iterator<Item = NodeId> + '_ {
    Combinator::ALL
        .into_iter()
        .map(move |kind| node.combinator(kind))
        .filter(|members| members.len() > 1)
        .flat_map(|members| members.iter().copied())
}

fn resolve_property(root: &SchemaNode, def: &PropertyDef, reference: Option<NodeId>) -> Property {
    Property {
        name: def.name.clone(),
        description: def.description.clone(),
        types: def.types.clone(),
        required: is_required(root, &def.name),
        reference,
    }
}

fn is_required(node: &SchemaNode, name: &str) -> bool {
    node.required.iter().any(|r| r == name)
}
