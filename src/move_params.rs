//! Moves body-located parameters into a registered request-body schema.
//!
//! Write operations may declare their body as a flat list of parameters,
//! using bracket notation for nested members:
//!
//! ```text
//! name           (body, string, required)
//! prefs[theme]   (body, string)
//! prefs[locale]  (body, string, required)
//! ```
//!
//! [`ParameterMover`] folds such a list into one schema registered in the
//! [`SchemaRegistry`] and replaces the body parameters with a single body
//! parameter referencing it.

use crate::operation_id;
use crate::registry::SchemaRegistry;
use crate::route::{HttpMethod, Parameter, ParameterLocation, Route};
use crate::schema::{merge_property_maps, SchemaNode};
use indexmap::IndexMap;
use log::debug;

/// Rewrites body parameters of write operations into a schema reference.
pub struct ParameterMover;

/// A body parameter together with the bracket segments of its name that
/// have not been consumed by the enclosing levels yet.
#[derive(Debug, Clone)]
struct NestedParam {
    segments: Vec<String>,
    param: Parameter,
}

impl NestedParam {
    fn new(param: Parameter) -> Self {
        Self {
            segments: tokenize(&param.name),
            param,
        }
    }

    fn is_flat(&self) -> bool {
        self.segments.len() <= 1
    }

    fn key(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or_default()
    }

    fn descend(mut self) -> Self {
        if !self.segments.is_empty() {
            self.segments.remove(0);
        }
        self
    }
}

/// Properties and required names collected for one object level
#[derive(Debug, Default)]
struct ObjectDraft {
    properties: IndexMap<String, SchemaNode>,
    required: Vec<String>,
}

impl ObjectDraft {
    fn absorb(&mut self, properties: IndexMap<String, SchemaNode>, required: Vec<String>) {
        merge_property_maps(&mut self.properties, properties);
        for name in required {
            if !self.required.contains(&name) {
                self.required.push(name);
            }
        }
    }

    fn into_object(self) -> SchemaNode {
        let mut node = SchemaNode::object();
        node.merge_properties(self.properties, self.required);
        node
    }
}

impl ParameterMover {
    /// Only write verbs with at least one body-located parameter qualify
    pub fn can_be_moved(params: &[Parameter], method: HttpMethod) -> bool {
        method.is_write() && includes_body_param(params)
    }

    /// Folds the body parameters of `params` into a schema registered for
    /// `route` and returns the rewritten parameter list.
    ///
    /// Non-body parameters keep their order; the body parameters are
    /// replaced by one parameter appended at the end. A lone array-typed
    /// body parameter is kept as is, with its type moved into an inline
    /// `schema`, and nothing is registered.
    pub fn to_schema(
        mut params: Vec<Parameter>,
        path: &str,
        route: &Route,
        registry: &mut SchemaRegistry,
    ) -> Vec<Parameter> {
        unify(&mut params);

        let (movable, mut kept): (Vec<Parameter>, Vec<Parameter>) =
            params.into_iter().partition(Parameter::is_body);

        if movable.is_empty() {
            debug!("No body parameters for {} {}", route.method, path);
            return kept;
        }

        if movable.len() == 1 && movable[0].is_array_typed() {
            debug!("Single array body parameter {} kept inline", movable[0].name);
            kept.extend(movable.into_iter().map(correct_array_param));
            return kept;
        }

        kept.push(Self::parent_schema_of_params(movable, path, route, registry));
        kept
    }

    fn parent_schema_of_params(
        params: Vec<Parameter>,
        path: &str,
        route: &Route,
        registry: &mut SchemaRegistry,
    ) -> Parameter {
        let schema_name = format!("{}{}", route.method.as_lower(), operation_id::model_token(path));
        debug!("Moving {} body parameters into schema {}", params.len(), schema_name);

        let root = if should_expose_as_array(&params) {
            SchemaNode::object_array()
        } else {
            SchemaNode::object()
        };
        registry.set(schema_name.clone(), root);

        let members: Vec<NestedParam> = params.into_iter().map(NestedParam::new).collect();
        let draft = build_level(members, registry);
        registry.merge(&schema_name, draft.properties, draft.required);

        if let Some(description) = route.description.as_deref().filter(|d| !d.is_empty()) {
            if let Some(schema) = registry.get_mut(&schema_name) {
                schema.description = Some(description.to_string());
            }
        }

        build_body_parameter(&schema_name, route.body_name.as_deref())
    }
}

/// Splits `a[b][c]` into `["a", "b", "c"]`
fn tokenize(name: &str) -> Vec<String> {
    let mut parts = name.split('[');
    let mut segments = vec![parts.next().unwrap_or_default().to_string()];
    segments.extend(parts.map(|part| part.strip_suffix(']').unwrap_or(part).to_string()));
    segments
}

fn includes_body_param(params: &[Parameter]) -> bool {
    params.iter().any(Parameter::declares_body)
}

/// Copies legacy locations into `in` and reclassifies form fields as body
/// members when the route has a body.
fn unify(params: &mut [Parameter]) {
    for param in params.iter_mut() {
        if let Some(location) = param.legacy_location.take() {
            param.location = Some(location);
        }
    }

    if includes_body_param(params) {
        for param in params.iter_mut() {
            if param.location == Some(ParameterLocation::FormData) {
                param.location = Some(ParameterLocation::Body);
            }
        }
    }
}

/// A group counts as array-typed only when every member is declared `array`;
/// a member without a declared type makes the group an object.
fn should_expose_as_array(params: &[Parameter]) -> bool {
    params.iter().all(Parameter::is_array_typed)
}

fn correct_array_param(mut param: Parameter) -> Parameter {
    param.data_type = None;
    let items = param.items.take();
    param.schema = Some(SchemaNode {
        schema_type: Some("array".to_string()),
        items: items.map(Box::new),
        ..Default::default()
    });
    param
}

fn build_body_parameter(schema_name: &str, body_name: Option<&str>) -> Parameter {
    Parameter {
        name: body_name.unwrap_or(schema_name).to_string(),
        location: Some(ParameterLocation::Body),
        required: true,
        schema: Some(SchemaNode::reference_to(schema_name)),
        ..Default::default()
    }
}

/// Builds the properties of one object level: flat members become direct
/// properties, bracketed members are grouped by their next segment.
fn build_level(members: Vec<NestedParam>, registry: &SchemaRegistry) -> ObjectDraft {
    let (flat, nested): (Vec<NestedParam>, Vec<NestedParam>) =
        members.into_iter().partition(NestedParam::is_flat);

    let mut draft = ObjectDraft::default();

    if !flat.is_empty() {
        let (properties, required) = build_properties(flat, registry);
        draft.absorb(properties, required);
    }

    if !nested.is_empty() {
        draft.absorb(build_nested_properties(nested, registry), Vec::new());
    }

    draft
}

fn build_properties(
    members: Vec<NestedParam>,
    registry: &SchemaRegistry,
) -> (IndexMap<String, SchemaNode>, Vec<String>) {
    let mut params: Vec<(String, Parameter)> = members
        .into_iter()
        .map(|member| (member.key().to_string(), member.param))
        .collect();

    let all_arrays = params.iter().all(|(_, param)| param.is_array_typed());
    if all_arrays {
        for (_, param) in params.iter_mut() {
            prepare_nested_type(param);
        }
    }

    let mut properties = IndexMap::new();
    let mut required = Vec::new();

    for (name, param) in params {
        let property = if param.is_array_typed() {
            document_as_array(&param, registry)
        } else {
            document_as_property(&param, registry)
        };

        if param.is_body() && param.required && !required.contains(&name) {
            required.push(name.clone());
        }
        properties.insert(name, property);
    }

    (properties, required)
}

/// Groups bracketed members by their first segment, in order of first
/// appearance, and builds one child node per group.
fn build_nested_properties(
    members: Vec<NestedParam>,
    registry: &SchemaRegistry,
) -> IndexMap<String, SchemaNode> {
    let mut groups: IndexMap<String, Vec<NestedParam>> = IndexMap::new();
    for member in members {
        groups.entry(member.key().to_string()).or_default().push(member);
    }

    let mut properties = IndexMap::new();
    for (key, group) in groups {
        let as_array = group.iter().all(|member| member.param.is_array_typed());
        let children: Vec<NestedParam> = group.into_iter().map(NestedParam::descend).collect();
        let object = build_level(children, registry).into_object();

        let node = if as_array {
            SchemaNode::array_of(object)
        } else {
            object
        };
        properties.insert(key, node);
    }

    properties
}

/// Unwraps an array parameter's element descriptor onto the parameter itself
fn prepare_nested_type(param: &mut Parameter) {
    let Some(items) = param.items.take() else {
        return;
    };

    param.data_type = if items.is_array() {
        Some("string".to_string())
    } else if items.reference.is_some() {
        Some("object".to_string())
    } else {
        items.schema_type.clone()
    };

    if items.format.is_some() {
        param.format = items.format.clone();
    }

    if param.data_type.as_deref() == Some("object") {
        param.items = Some(items);
    }
}

fn document_as_array(param: &Parameter, registry: &SchemaRegistry) -> SchemaNode {
    SchemaNode {
        schema_type: Some("array".to_string()),
        description: non_blank(&param.description),
        items: document_as_property(param, registry).items,
        ..Default::default()
    }
}

/// Inlines the parameter's schema fields, or references a registered schema
/// when the declared type names one.
fn document_as_property(param: &Parameter, registry: &SchemaRegistry) -> SchemaNode {
    let mut property = SchemaNode {
        format: non_blank(&param.format),
        description: non_blank(&param.description),
        minimum: param.minimum.clone().filter(|v| !v.is_null()),
        maximum: param.maximum.clone().filter(|v| !v.is_null()),
        items: param.items.clone().map(Box::new),
        enum_values: param.enum_values.clone().filter(|values| !values.is_empty()),
        ..Default::default()
    };

    match non_blank(&param.data_type) {
        Some(data_type) if registry.contains(&data_type) => {
            property.reference = Some(SchemaRegistry::pointer(&data_type));
        }
        data_type => property.schema_type = data_type,
    }

    property
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}
