//! Core types for schema inspection.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Textual form of an empty type set.
pub const UNDEFINED_TYPE: &str = "undefined";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A JSON Schema primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    /// Parse a type keyword value.
    ///
    /// Returns `None` for unknown values (caller should error).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(JsonType::String),
            "number" => Some(JsonType::Number),
            "integer" => Some(JsonType::Integer),
            "boolean" => Some(JsonType::Boolean),
            "object" => Some(JsonType::Object),
            "array" => Some(JsonType::Array),
            "null" => Some(JsonType::Null),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Null => "null",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, de-duplicated set of declared types.
///
/// A schema may declare a union (`["string", "number"]`) before validation;
/// struct generation needs exactly one member, see [`TypeSet::single`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeSet(Vec<JsonType>);

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type, keeping first-seen order. Duplicates are ignored.
    pub fn insert(&mut self, ty: JsonType) {
        if !self.0.contains(&ty) {
            self.0.push(ty);
        }
    }

    pub fn contains(&self, ty: JsonType) -> bool {
        self.0.contains(&ty)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = JsonType> + '_ {
        self.0.iter().copied()
    }

    /// The declared type when exactly one is present.
    pub fn single(&self) -> Option<JsonType> {
        match self.0.as_slice() {
            [ty] => Some(*ty),
            _ => None,
        }
    }
}

impl From<JsonType> for TypeSet {
    fn from(ty: JsonType) -> Self {
        TypeSet(vec![ty])
    }
}

impl FromIterator<JsonType> for TypeSet {
    fn from_iter<I: IntoIterator<Item = JsonType>>(iter: I) -> Self {
        let mut set = TypeSet::new();
        for ty in iter {
            set.insert(ty);
        }
        set
    }
}

/// `undefined` when empty, the bare name for one type, `[a,b]` for a union.
impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str(UNDEFINED_TYPE),
            [ty] => write!(f, "{}", ty),
            types => {
                let names: Vec<&str> = types.iter().map(JsonType::as_str).collect();
                write!(f, "[{}]", names.join(","))
            }
        }
    }
}

impl Serialize for TypeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A combinator keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    AllOf,
    AnyOf,
    OneOf,
}

impl Combinator {
    /// All combinators in traversal order.
    pub const ALL: [Combinator; 3] = [Combinator::AllOf, Combinator::AnyOf, Combinator::OneOf];

    /// Returns the schema keyword for this combinator.
    pub fn keyword(&self) -> &'static str {
        match self {
            Combinator::AllOf => "allOf",
            Combinator::AnyOf => "anyOf",
            Combinator::OneOf => "oneOf",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_type_parse_valid() {
        assert_eq!(JsonType::parse("string"), Some(JsonType::String));
        assert_eq!(JsonType::parse("integer"), Some(JsonType::Integer));
        assert_eq!(JsonType::parse("null"), Some(JsonType::Null));
    }

    #[test]
    fn json_type_parse_invalid() {
        assert_eq!(JsonType::parse("String"), None);
        assert_eq!(JsonType::parse("int"), None);
        assert_eq!(JsonType::parse(""), None);
    }

    #[test]
    fn type_set_display() {
        assert_eq!(TypeSet::new().to_string(), "undefined");
        assert_eq!(TypeSet::from(JsonType::String).to_string(), "string");

        let union: TypeSet = [JsonType::String, JsonType::Number].into_iter().collect();
        assert_eq!(union.to_string(), "[string,number]");
    }

    #[test]
    fn type_set_ignores_duplicates() {
        let set: TypeSet = [JsonType::String, JsonType::String, JsonType::Null]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), [JsonType::String, JsonType::Null]);
    }

    #[test]
    fn type_set_single() {
        assert_eq!(
            TypeSet::from(JsonType::Boolean).single(),
            Some(JsonType::Boolean)
        );
        assert_eq!(TypeSet::new().single(), None);

        let union: TypeSet = [JsonType::Object, JsonType::Null].into_iter().collect();
        assert_eq!(union.single(), None);
    }

    #[test]
    fn combinator_keywords_in_order() {
        let keywords: Vec<&str> = Combinator::ALL.iter().map(|c| c.keyword()).collect();
        assert_eq!(keywords, ["allOf", "anyOf", "oneOf"]);
    }
}
