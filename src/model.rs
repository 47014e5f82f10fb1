//! Introspection over externally described models.
//!
//! Models reach the document from the host in one of two shapes: an entity
//! exposing a per-attribute documentation mapping, or a representer exposing
//! a list of attributes that each carry a documentation sub-object. Both are
//! modelled as capabilities of [`ModelIntrospect`]; a model offering neither
//! simply has no required attributes.

use crate::schema::SchemaNode;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

/// Documentation attached to a single model attribute
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AttributeDocumentation {
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    pub format: Option<String>,
    #[serde(alias = "desc")]
    pub description: Option<String>,
    pub required: bool,
    /// Exposed name, when it differs from the attribute name
    #[serde(rename = "as")]
    pub alias: Option<String>,
    #[serde(rename = "enum", alias = "values")]
    pub enum_values: Option<Vec<Value>>,
    pub items: Option<SchemaNode>,
}

impl AttributeDocumentation {
    fn to_property(&self) -> SchemaNode {
        SchemaNode {
            schema_type: self.data_type.clone(),
            format: self.format.clone(),
            description: self.description.clone(),
            enum_values: self.enum_values.clone(),
            items: self.items.clone().map(Box::new),
            ..Default::default()
        }
    }
}

/// Entity-style model: documentation keyed by attribute name
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EntityModel {
    pub documentation: IndexMap<String, AttributeDocumentation>,
}

/// One attribute of a representer-style model
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RepresentableAttribute {
    pub name: String,
    pub documentation: Option<AttributeDocumentation>,
}

/// Representer-style model: an ordered attribute list
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RepresentableModel {
    pub attributes: Vec<RepresentableAttribute>,
}

/// A model with ready-made properties and no introspection capability
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlainModel {
    pub properties: IndexMap<String, SchemaNode>,
}

/// Capabilities a model descriptor may expose.
pub trait ModelIntrospect {
    /// Per-attribute documentation mapping
    fn documentation(&self) -> Option<&IndexMap<String, AttributeDocumentation>> {
        None
    }

    /// Attribute list where each attribute carries its own documentation
    fn attribute_map(&self) -> Option<&[RepresentableAttribute]> {
        None
    }
}

impl ModelIntrospect for EntityModel {
    fn documentation(&self) -> Option<&IndexMap<String, AttributeDocumentation>> {
        Some(&self.documentation)
    }
}

impl ModelIntrospect for RepresentableModel {
    fn attribute_map(&self) -> Option<&[RepresentableAttribute]> {
        Some(&self.attributes)
    }
}

impl ModelIntrospect for PlainModel {}

/// A model as declared in a route manifest
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelDefinition {
    Entity(EntityModel),
    Representable(RepresentableModel),
    Plain(PlainModel),
}

impl ModelDefinition {
    fn as_introspect(&self) -> &dyn ModelIntrospect {
        match self {
            ModelDefinition::Entity(model) => model,
            ModelDefinition::Representable(model) => model,
            ModelDefinition::Plain(model) => model,
        }
    }

    /// Properties described by the model, keyed by exposed name
    pub fn properties(&self) -> IndexMap<String, SchemaNode> {
        match self {
            ModelDefinition::Entity(model) => model
                .documentation
                .iter()
                .map(|(name, doc)| (doc.alias.clone().unwrap_or_else(|| name.clone()), doc.to_property()))
                .collect(),
            ModelDefinition::Representable(model) => model
                .attributes
                .iter()
                .map(|attribute| {
                    let property = attribute
                        .documentation
                        .as_ref()
                        .map(AttributeDocumentation::to_property)
                        .unwrap_or_default();
                    (attribute.name.clone(), property)
                })
                .collect(),
            ModelDefinition::Plain(model) => model.properties.clone(),
        }
    }
}

impl ModelIntrospect for ModelDefinition {
    fn documentation(&self) -> Option<&IndexMap<String, AttributeDocumentation>> {
        self.as_introspect().documentation()
    }

    fn attribute_map(&self) -> Option<&[RepresentableAttribute]> {
        self.as_introspect().attribute_map()
    }
}

/// Extracts required-property names from a model descriptor.
pub struct RequiredAttributeResolver;

impl RequiredAttributeResolver {
    /// Required attribute names; the documentation mapping is consulted
    /// first, then the attribute list, and neither yields an empty list.
    pub fn required_attributes(model: &dyn ModelIntrospect) -> Vec<String> {
        if let Some(documentation) = model.documentation() {
            return documentation
                .iter()
                .filter(|(_, doc)| doc.required)
                .map(|(name, doc)| doc.alias.clone().unwrap_or_else(|| name.clone()))
                .collect();
        }

        if let Some(attributes) = model.attribute_map() {
            return attributes
                .iter()
                .filter(|attribute| attribute.documentation.as_ref().is_some_and(|doc| doc.required))
                .map(|attribute| attribute.name.clone())
                .collect();
        }

        debug!("Model exposes no documentation capability, no required attributes");
        Vec::new()
    }
}

/// Builds the object schema registered for a model.
pub struct BuildModelSchema;

impl BuildModelSchema {
    /// `{type: object, properties, required?}`, omitting `required` when empty
    pub fn build(model: &dyn ModelIntrospect, properties: IndexMap<String, SchemaNode>) -> SchemaNode {
        let mut schema = SchemaNode {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            ..Default::default()
        };
        schema.add_required(RequiredAttributeResolver::required_attributes(model));
        schema
    }
}
