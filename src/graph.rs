//! Arena-backed schema graph.
//!
//! Nodes are owned by [`SchemaGraph`] and addressed by [`NodeId`]. References
//! between schemas (`$ref`) are stored as ids, so a reference cycle is just a
//! back-edge in the arena and output records never borrow graph storage.

use crate::types::{Combinator, TypeSet};

/// Index of a node inside a [`SchemaGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A property declared directly under a schema's `properties`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub description: Option<String>,
    pub types: TypeSet,
    /// Schema this property points at when its value is a named schema.
    pub reference: Option<NodeId>,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, types: impl Into<TypeSet>) -> Self {
        Self {
            name: name.into(),
            types: types.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn reference(mut self, target: NodeId) -> Self {
        self.reference = Some(target);
        self
    }
}

/// One (sub-)schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub types: TypeSet,
    pub properties: Vec<PropertyDef>,
    pub required: Vec<String>,
    pub all_of: Vec<NodeId>,
    pub any_of: Vec<NodeId>,
    pub one_of: Vec<NodeId>,
    /// Target of this node's `$ref`, if any.
    pub reference: Option<NodeId>,
}

impl SchemaNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Members of the given combinator, in source order.
    pub fn combinator(&self, kind: Combinator) -> &[NodeId] {
        match kind {
            Combinator::AllOf => &self.all_of,
            Combinator::AnyOf => &self.any_of,
            Combinator::OneOf => &self.one_of,
        }
    }

    pub(crate) fn combinator_mut(&mut self, kind: Combinator) -> &mut Vec<NodeId> {
        match kind {
            Combinator::AllOf => &mut self.all_of,
            Combinator::AnyOf => &mut self.any_of,
            Combinator::OneOf => &mut self.one_of,
        }
    }

    /// Title, or `""` when absent.
    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// Owns every node of a parsed schema document.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
    root: Option<NodeId>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id. The first node added becomes the root
    /// unless [`SchemaGraph::set_root`] says otherwise.
    pub fn add(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.root.get_or_insert(id);
        id
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// The root node id, `None` for an empty graph.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different graph. Use [`SchemaGraph::get`]
    /// for ids of unknown origin.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Look up a node, `None` if `id` is out of range for this graph.
    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add `member` to `parent`'s combinator list.
    pub fn push_member(&mut self, parent: NodeId, kind: Combinator, member: NodeId) {
        self.node_mut(parent).combinator_mut(kind).push(member);
    }
}
