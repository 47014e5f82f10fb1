use crate::extensions::{Extensible, ExtensionMap};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON pointer prefix under which registered schemas are referenced
pub const SCHEMA_POINTER_PREFIX: &str = "#/components/schemas/";

/// OpenAPI Schema Object (the subset this crate produces and consumes)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaNode {
    /// Reference to a registered schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "date-time")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Human readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaNode>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// Enum values, passed through untouched
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    /// Vendor extensions (`x-` keys)
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

impl SchemaNode {
    /// A scalar schema of the given type
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    /// An empty object schema: `{type: object, properties: {}}`
    pub fn object() -> Self {
        Self {
            schema_type: Some("object".to_string()),
            properties: Some(IndexMap::new()),
            ..Default::default()
        }
    }

    /// An array schema wrapping `items`
    pub fn array_of(items: SchemaNode) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// An array of empty objects: `{type: array, items: {type: object, properties: {}}}`
    pub fn object_array() -> Self {
        Self::array_of(Self::object())
    }

    /// A `$ref` pointing at the registered schema `name`
    pub fn reference_to(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", SCHEMA_POINTER_PREFIX, name)),
            ..Default::default()
        }
    }

    pub fn is_array(&self) -> bool {
        self.schema_type.as_deref() == Some("array")
    }

    /// The schema name a `$ref` points at (its last path component)
    pub fn referenced_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|reference| reference.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }

    /// Appends names to the required set, skipping duplicates
    pub fn add_required<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut names = names.into_iter().peekable();
        if names.peek().is_none() {
            return;
        }

        let required = self.required.get_or_insert_with(Vec::new);
        for name in names {
            if !required.contains(&name) {
                required.push(name);
            }
        }
    }

    /// Merges properties (and their required names) into this node.
    ///
    /// Array nodes receive the properties on their `items` object, so the
    /// same call works for both shapes a registered body schema can take.
    pub fn merge_properties(&mut self, properties: IndexMap<String, SchemaNode>, required: Vec<String>) {
        match self.items.as_deref_mut() {
            Some(items) => items.absorb_properties(properties, required),
            None => self.absorb_properties(properties, required),
        }
    }

    fn absorb_properties(&mut self, properties: IndexMap<String, SchemaNode>, required: Vec<String>) {
        let existing = self.properties.get_or_insert_with(IndexMap::new);
        merge_property_maps(existing, properties);
        self.add_required(required);
    }

    /// Recursive deep merge: properties are unioned key by key, required
    /// sets are unioned, every other field present on `other` wins.
    pub fn deep_merge(&mut self, other: SchemaNode) {
        let SchemaNode {
            reference,
            schema_type,
            format,
            description,
            properties,
            required,
            items,
            enum_values,
            minimum,
            maximum,
            extensions,
        } = other;

        if reference.is_some() {
            self.reference = reference;
        }
        if schema_type.is_some() {
            self.schema_type = schema_type;
        }
        if format.is_some() {
            self.format = format;
        }
        if description.is_some() {
            self.description = description;
        }
        if enum_values.is_some() {
            self.enum_values = enum_values;
        }
        if minimum.is_some() {
            self.minimum = minimum;
        }
        if maximum.is_some() {
            self.maximum = maximum;
        }
        if let Some(properties) = properties {
            let existing = self.properties.get_or_insert_with(IndexMap::new);
            merge_property_maps(existing, properties);
        }
        if let Some(required) = required {
            self.add_required(required);
        }
        if let Some(theirs) = items {
            if let Some(mine) = self.items.as_deref_mut() {
                mine.deep_merge(*theirs);
            } else {
                self.items = Some(theirs);
            }
        }
        self.extensions.extend(extensions);
    }
}

pub(crate) fn merge_property_maps(existing: &mut IndexMap<String, SchemaNode>, incoming: IndexMap<String, SchemaNode>) {
    for (name, node) in incoming {
        match existing.get_mut(&name) {
            Some(current) => current.deep_merge(node),
            None => {
                existing.insert(name, node);
            }
        }
    }
}

impl Extensible for SchemaNode {
    fn extensions_mut(&mut self) -> &mut ExtensionMap {
        &mut self.extensions
    }
}
