use crate::schema::{SchemaNode, SCHEMA_POINTER_PREFIX};
use indexmap::IndexMap;
use log::debug;

/// Build-scoped mapping from schema name to schema node.
///
/// One registry belongs to one document build and is threaded by reference
/// through every route processed in that build. Lookups only see entries
/// registered earlier in the same build, so `$ref` substitution depends on
/// the order in which routes and models are added.
///
/// Names are unique keys: registering an existing name replaces the previous
/// entry (last write wins).
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, SchemaNode>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SchemaNode> {
        self.schemas.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registers `node` under `name`, returning the entry it replaced
    pub fn set(&mut self, name: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        let name = name.into();
        let previous = self.schemas.insert(name.clone(), node);
        if previous.is_some() {
            debug!("Schema {} overwritten by a later registration", name);
        }
        previous
    }

    /// Deep-merges properties and required names into the entry `name`.
    ///
    /// Returns `false` (and changes nothing) when no such entry exists.
    pub fn merge(
        &mut self,
        name: &str,
        properties: IndexMap<String, SchemaNode>,
        required: Vec<String>,
    ) -> bool {
        match self.schemas.get_mut(name) {
            Some(schema) => {
                schema.merge_properties(properties, required);
                true
            }
            None => {
                debug!("Cannot merge into unknown schema: {}", name);
                false
            }
        }
    }

    /// JSON pointer used to reference the schema `name`
    pub fn pointer(name: &str) -> String {
        format!("{}{}", SCHEMA_POINTER_PREFIX, name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Get all registered schemas
    pub fn schemas(&self) -> &IndexMap<String, SchemaNode> {
        &self.schemas
    }

    pub fn into_schemas(self) -> IndexMap<String, SchemaNode> {
        self.schemas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.is_empty());

        registry.set("User", SchemaNode::object());

        assert!(registry.contains("User"));
        assert_eq!(registry.get("User"), Some(&SchemaNode::object()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_overwrites_last_write_wins() {
        let mut registry = SchemaRegistry::new();
        registry.set("postItems", SchemaNode::object());

        let previous = registry.set("postItems", SchemaNode::object_array());

        assert_eq!(previous, Some(SchemaNode::object()));
        assert_eq!(registry.get("postItems"), Some(&SchemaNode::object_array()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_merge_into_existing() {
        let mut registry = SchemaRegistry::new();
        registry.set("postItems", SchemaNode::object());

        let mut properties = IndexMap::new();
        properties.insert("name".to_string(), SchemaNode::typed("string"));
        assert!(registry.merge("postItems", properties, vec!["name".to_string()]));

        let schema = registry.get("postItems").unwrap();
        assert!(schema.properties.as_ref().unwrap().contains_key("name"));
        assert_eq!(schema.required, Some(vec!["name".to_string()]));
    }

    #[test]
    fn test_merge_into_missing_is_noop() {
        let mut registry = SchemaRegistry::new();
        assert!(!registry.merge("nothing", IndexMap::new(), Vec::new()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_pointer() {
        assert_eq!(SchemaRegistry::pointer("Tag"), "#/components/schemas/Tag");
    }

    #[test]
    fn test_preserves_registration_order() {
        let mut registry = SchemaRegistry::new();
        registry.set("B", SchemaNode::object());
        registry.set("A", SchemaNode::object());
        let names: Vec<&String> = registry.schemas().keys().collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
