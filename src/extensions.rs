//! Vendor extension overlay.
//!
//! Extension bags are plain key/value maps attached at root, info, path,
//! operation or schema scope. Every key is written with an `x-` prefix; the
//! `for` key of a schema bag only selects the target response and is never
//! written. Targets that cannot be resolved are skipped without error.

use crate::openapi_builder::{Operation, PathItem};
use crate::registry::SchemaRegistry;
use crate::route::{HttpMethod, Route};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

/// Vendor extension entries, keyed as declared or as written (`x-…`)
pub type ExtensionMap = IndexMap<String, Value>;

/// Key that routes a schema bag to a response status
const ROUTING_KEY: &str = "x-for";

/// Document nodes that can carry vendor extensions
pub trait Extensible {
    fn extensions_mut(&mut self) -> &mut ExtensionMap;
}

/// Extension bags declared on a route
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtensionSettings {
    /// Operation extensions declared alongside the route description
    pub x: Option<ExtensionMap>,
    pub x_operation: Option<ExtensionMap>,
    pub x_path: Option<ExtensionMap>,
    pub x_schema: Option<SchemaExtensions>,
}

/// Schema-scope bags, each targeting the schema of one response status
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaExtensions {
    Many(Vec<ExtensionMap>),
    One(ExtensionMap),
}

impl SchemaExtensions {
    pub fn bags(&self) -> Vec<&ExtensionMap> {
        match self {
            SchemaExtensions::Many(bags) => bags.iter().collect(),
            SchemaExtensions::One(bag) => vec![bag],
        }
    }
}

/// Overlays extension bags onto finished document nodes.
pub struct ExtensionMerger;

impl ExtensionMerger {
    /// Applies every route-level bag to the path item holding the route's operation
    pub fn add(path_item: &mut PathItem, route: &Route, registry: &mut SchemaRegistry) {
        let settings = &route.settings;

        if let Some(extensions) = &settings.x {
            Self::add_extension_to(path_item.operation_mut(route.method), extensions);
        }
        if let Some(extensions) = &settings.x_operation {
            Self::add_extensions_to_operation(extensions, path_item, route.method);
        }
        if let Some(extensions) = &settings.x_path {
            Self::add_extensions_to_path(extensions, path_item);
        }
        if let Some(extensions) = &settings.x_schema {
            Self::add_extensions_to_schema(extensions, path_item, route.method, registry);
        }
    }

    pub fn add_extensions_to_root<T: Extensible>(extensions: Option<&ExtensionMap>, root: &mut T) {
        if let Some(extensions) = extensions {
            Self::add_extension_to(Some(root), extensions);
        }
    }

    pub fn add_extensions_to_info<T: Extensible>(extensions: Option<&ExtensionMap>, info: &mut T) {
        if let Some(extensions) = extensions {
            Self::add_extension_to(Some(info), extensions);
        }
    }

    pub fn add_extensions_to_operation(extensions: &ExtensionMap, path_item: &mut PathItem, method: HttpMethod) {
        Self::add_extension_to(path_item.operation_mut(method), extensions);
    }

    pub fn add_extensions_to_path(extensions: &ExtensionMap, path_item: &mut PathItem) {
        Self::add_extension_to(Some(path_item), extensions);
    }

    pub fn add_extensions_to_schema(
        extensions: &SchemaExtensions,
        path_item: &PathItem,
        method: HttpMethod,
        registry: &mut SchemaRegistry,
    ) {
        for bag in extensions.bags() {
            Self::setup_schema(bag, path_item.operation(method), registry);
        }
    }

    /// Writes `x-`-prefixed entries onto `target`; an absent target is skipped.
    /// Keys starting with `x-for` carry routing metadata and are never written.
    pub fn add_extension_to<T: Extensible + ?Sized>(target: Option<&mut T>, extensions: &ExtensionMap) {
        let Some(target) = target else {
            debug!("Extension target missing, skipping {} entries", extensions.len());
            return;
        };

        let entries = target.extensions_mut();
        for (key, value) in extensions {
            let key = format!("x-{}", key);
            if key.starts_with(ROUTING_KEY) {
                continue;
            }
            entries.insert(key, value.clone());
        }
    }

    fn setup_schema(bag: &ExtensionMap, operation: Option<&Operation>, registry: &mut SchemaRegistry) {
        let Some(status) = bag.get("for").and_then(status_key) else {
            debug!("Schema extension without a target status, skipping");
            return;
        };

        let Some(schema_name) = operation.and_then(|operation| Self::find_schema(&status, operation)) else {
            debug!("No referenced schema for response {}, skipping extension", status);
            return;
        };

        Self::add_extension_to(registry.get_mut(&schema_name), bag);
    }

    /// Name of the schema referenced by the response at `status`, directly
    /// or through array items
    fn find_schema(status: &str, operation: &Operation) -> Option<String> {
        let schema = operation.responses.get(status)?.schema.as_ref()?;

        if schema.reference.is_some() {
            return schema.referenced_name().map(str::to_string);
        }

        schema
            .items
            .as_ref()
            .and_then(|items| items.referenced_name())
            .map(str::to_string)
    }
}

fn status_key(value: &Value) -> Option<String> {
    match value {
        Value::String(status) => Some(status.clone()),
        Value::Number(status) => Some(status.to_string()),
        _ => None,
    }
}
