//! Flattened, struct-ready view of a schema.

use serde_json::{json, Value};

use crate::graph::{NodeId, SchemaGraph};
use crate::resolver::embedded_schema_names;
use crate::types::TypeSet;

/// A resolved property of a [`SchemaDescription`].
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub description: Option<String>,
    pub types: TypeSet,
    /// Whether the root schema lists this property as required.
    pub required: bool,
    /// Named schema this property refers to. Lookup-only, into the graph
    /// the description was resolved from.
    pub reference: Option<NodeId>,
}

impl Property {
    /// Description, or `""` when absent.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Textual form of the declared type set, e.g. `string` or `[string,number]`.
    pub fn type_name(&self) -> String {
        self.types.to_string()
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Title of the referenced schema, or `""` when there is no reference.
    pub fn ref_schema_name<'g>(&self, graph: &'g SchemaGraph) -> &'g str {
        self.reference
            .and_then(|id| graph.get(id))
            .map(|node| node.title_str())
            .unwrap_or_default()
    }

    fn to_value(&self, graph: &SchemaGraph) -> Value {
        let reference = match self.reference {
            Some(_) => Value::String(self.ref_schema_name(graph).to_string()),
            None => Value::Null,
        };
        json!({
            "name": self.name,
            "description": self.description(),
            "type": self.type_name(),
            "required": self.required,
            "reference": reference,
        })
    }
}

/// A root schema resolved into a name and a flat property list.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescription {
    pub id: Option<String>,
    /// The root schema's `title`.
    pub name: Option<String>,
    pub description: Option<String>,
    pub properties: Vec<Property>,
    /// The root node this description was built from.
    pub schema: NodeId,
}

impl SchemaDescription {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Titles of the named schemas the root composes through its combinators.
    pub fn embedded_schema_names(&self, graph: &SchemaGraph) -> Vec<String> {
        embedded_schema_names(graph, self.schema)
    }

    pub fn has_embedded_schema(&self, graph: &SchemaGraph) -> bool {
        !self.embedded_schema_names(graph).is_empty()
    }

    /// JSON rendering used by the CLI. Absent strings render as `""`.
    pub fn to_value(&self, graph: &SchemaGraph) -> Value {
        let properties: Vec<Value> = self.properties.iter().map(|p| p.to_value(graph)).collect();
        json!({
            "id": self.id(),
            "name": self.name(),
            "description": self.description(),
            "properties": properties,
        })
    }
}
