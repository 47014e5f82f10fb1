use crate::extensions::{Extensible, ExtensionMap, ExtensionMerger};
use crate::model::{BuildModelSchema, ModelDefinition};
use crate::move_params::ParameterMover;
use crate::operation_id;
use crate::path_string::PathTemplater;
use crate::registry::SchemaRegistry;
use crate::route::{HttpMethod, Parameter, Route};
use crate::schema::SchemaNode;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// OpenAPI version written into every document
pub const OPENAPI_VERSION: &str = "3.0.1";

const DEFAULT_TITLE: &str = "API title";

/// OpenAPI document builder.
///
/// One builder is one build session: it owns the schema registry that
/// models and synthesized request bodies are registered into.
pub struct OpenApiBuilder {
    /// Declared info options
    info: InfoOptions,
    options: DocumentOptions,
    /// Root-level vendor extensions
    root_extensions: Option<ExtensionMap>,
    /// Paths collection (path template -> PathItem)
    paths: IndexMap<String, PathItem>,
    registry: SchemaRegistry,
}

/// Path rendering options for a build
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Substitute the route version into `{version}` instead of dropping it
    pub add_version: bool,
    /// Prefix every path with `base_path`
    pub add_base_path: bool,
    pub base_path: Option<String>,
}

/// Info section as declared by the host
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InfoOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub terms_of_service_url: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_url: Option<String>,
    pub license: Option<String>,
    pub license_url: Option<String>,
    /// Info-level vendor extensions
    pub x: Option<ExtensionMap>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// API version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }

    pub fn operation_mut(&mut self, method: HttpMethod) -> Option<&mut Operation> {
        self.slot(method).as_mut()
    }

    /// Stores `operation` under `method`, replacing any previous one
    pub fn set_operation(&mut self, method: HttpMethod, operation: Operation) {
        *self.slot(method) = Some(operation);
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Parameters after body parameters have been moved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Responses keyed by status code
    pub responses: IndexMap<String, Response>,
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

/// Response object, keyed by status code on its operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<IndexMap<String, SchemaNode>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    pub info: Info,
    pub paths: IndexMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(flatten)]
    pub extensions: ExtensionMap,
}

impl Extensible for Info {
    fn extensions_mut(&mut self) -> &mut ExtensionMap {
        &mut self.extensions
    }
}

impl Extensible for PathItem {
    fn extensions_mut(&mut self) -> &mut ExtensionMap {
        &mut self.extensions
    }
}

impl Extensible for Operation {
    fn extensions_mut(&mut self) -> &mut ExtensionMap {
        &mut self.extensions
    }
}

impl Extensible for OpenApiDocument {
    fn extensions_mut(&mut self) -> &mut ExtensionMap {
        &mut self.extensions
    }
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info and a fresh registry
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: InfoOptions::default(),
            options: DocumentOptions::default(),
            root_extensions: None,
            paths: IndexMap::new(),
            registry: SchemaRegistry::new(),
        }
    }

    pub fn with_info(mut self, info: InfoOptions) -> Self {
        self.info = info;
        self
    }

    pub fn with_options(mut self, options: DocumentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_root_extensions(mut self, extensions: Option<ExtensionMap>) -> Self {
        self.root_extensions = extensions;
        self
    }

    /// Registers a model schema under `name`. Register models before the
    /// routes that refer to them so parameter types resolve to `$ref`s.
    pub fn add_model(&mut self, name: &str, model: &ModelDefinition) {
        debug!("Adding model: {}", name);
        let schema = BuildModelSchema::build(model, model.properties());
        self.registry.set(name, schema);
    }

    /// Add a route to the OpenAPI document
    pub fn add_route(&mut self, route: &Route) {
        debug!("Adding route: {} {}", route.method, route.path);

        let path = PathTemplater::path(route, &self.options);

        let mut parameters = route.parameters.clone();
        if ParameterMover::can_be_moved(&parameters, route.method) {
            parameters = ParameterMover::to_schema(parameters, &path, route, &mut self.registry);
        }

        let operation = Operation {
            summary: non_blank(route.description.as_deref()),
            description: non_blank(route.detail.as_deref()),
            operation_id: Some(operation_id::build(route, &path)),
            tags: Some(vec![PathTemplater::item(route)]),
            parameters: if parameters.is_empty() { None } else { Some(parameters) },
            responses: route.responses.clone(),
            extensions: ExtensionMap::new(),
        };

        let path_item = self.paths.entry(path).or_default();
        path_item.set_operation(route.method, operation);
        ExtensionMerger::add(path_item, route, &mut self.registry);
    }

    /// Schemas registered so far
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let mut info = Self::build_info(&self.info);
        ExtensionMerger::add_extensions_to_info(self.info.x.as_ref(), &mut info);

        let components = if self.registry.is_empty() {
            None
        } else {
            Some(Components {
                schemas: Some(self.registry.into_schemas()),
            })
        };

        let mut document = OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            paths: self.paths,
            components,
            extensions: ExtensionMap::new(),
        };
        ExtensionMerger::add_extensions_to_root(self.root_extensions.as_ref(), &mut document);

        document
    }

    fn build_info(options: &InfoOptions) -> Info {
        let contact = Contact {
            name: non_blank(options.contact_name.as_deref()),
            email: non_blank(options.contact_email.as_deref()),
            url: non_blank(options.contact_url.as_deref()),
        };
        let license = License {
            name: non_blank(options.license.as_deref()),
            url: non_blank(options.license_url.as_deref()),
        };

        Info {
            title: non_blank(options.title.as_deref()).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: non_blank(options.description.as_deref()),
            terms_of_service: non_blank(options.terms_of_service_url.as_deref()),
            contact: (contact != Contact::default()).then_some(contact),
            license: (license != License::default()).then_some(license),
            version: non_blank(options.version.as_deref()),
            extensions: ExtensionMap::new(),
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::ParameterLocation;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn body(name: &str, data_type: &str, required: bool) -> Parameter {
        Parameter::new(name, ParameterLocation::Body, data_type, required)
    }

    fn created(schema: Value) -> IndexMap<String, Response> {
        IndexMap::from([(
            "201".to_string(),
            Response {
                description: "created".to_string(),
                schema: Some(serde_json::from_value(schema).unwrap()),
                ..Default::default()
            },
        )])
    }

    #[test]
    fn test_new_builder() {
        let builder = OpenApiBuilder::new();

        assert!(builder.paths.is_empty());
        assert!(builder.registry().is_empty());
        assert_eq!(builder.options, DocumentOptions::default());
    }

    #[test]
    fn test_add_simple_get_route() {
        let mut builder = OpenApiBuilder::new();
        builder.add_route(&Route::new(HttpMethod::Get, "/users"));

        assert_eq!(builder.paths.len(), 1);
        let path_item = &builder.paths["/users"];
        assert!(path_item.post.is_none());

        let operation = path_item.get.as_ref().unwrap();
        assert_eq!(operation.operation_id.as_deref(), Some("getUsers"));
        assert_eq!(operation.tags, Some(vec!["User".to_string()]));
        assert!(operation.parameters.is_none());
        assert!(operation.summary.is_none());
    }

    #[test]
    fn test_add_route_with_path_parameter() {
        let mut builder = OpenApiBuilder::new();
        let mut route = Route::new(HttpMethod::Get, "/users/:id(.json)");
        route.parameters.push(Parameter::new("id", ParameterLocation::Path, "integer", true));
        builder.add_route(&route);

        let operation = builder.paths["/users/{id}"].get.as_ref().unwrap();
        let parameters = operation.parameters.as_ref().unwrap();
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].location, Some(ParameterLocation::Path));
        assert_eq!(operation.operation_id.as_deref(), Some("getUsersId"));
    }

    #[test]
    fn test_add_multiple_routes_same_path() {
        let mut builder = OpenApiBuilder::new();
        builder.add_route(&Route::new(HttpMethod::Get, "/users"));
        builder.add_route(&Route::new(HttpMethod::Post, "/users"));

        assert_eq!(builder.paths.len(), 1);
        let path_item = &builder.paths["/users"];
        assert!(path_item.get.is_some());
        assert!(path_item.post.is_some());
    }

    #[test]
    fn test_post_route_moves_body_params() {
        let mut builder = OpenApiBuilder::new();
        let mut route = Route::new(HttpMethod::Post, "/items");
        route.parameters = vec![body("name", "string", true), body("price", "number", false)];
        builder.add_route(&route);

        let operation = builder.paths["/items"].post.as_ref().unwrap();
        let value = serde_json::to_value(operation.parameters.as_ref().unwrap()).unwrap();
        assert_eq!(
            value,
            json!([{
                "name": "postItems",
                "in": "body",
                "required": true,
                "schema": {"$ref": "#/components/schemas/postItems"}
            }])
        );
        assert!(builder.registry().contains("postItems"));
    }

    #[test]
    fn test_get_route_keeps_body_params() {
        let mut builder = OpenApiBuilder::new();
        let mut route = Route::new(HttpMethod::Get, "/items");
        route.parameters = vec![body("name", "string", true)];
        builder.add_route(&route);

        let operation = builder.paths["/items"].get.as_ref().unwrap();
        assert_eq!(operation.parameters.as_ref().unwrap()[0].name, "name");
        assert!(builder.registry().is_empty());
    }

    #[test]
    fn test_models_resolve_to_refs() {
        let mut builder = OpenApiBuilder::new();
        let model: ModelDefinition = serde_json::from_value(json!({
            "entity": {"documentation": {"street": {"type": "string", "required": true}}}
        }))
        .unwrap();
        builder.add_model("Address", &model);

        let mut route = Route::new(HttpMethod::Put, "/people/:id");
        route.parameters = vec![body("address", "Address", true)];
        builder.add_route(&route);

        let schema = serde_json::to_value(builder.registry().get("putPeople").unwrap()).unwrap();
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {"address": {"$ref": "#/components/schemas/Address"}},
                "required": ["address"]
            })
        );
    }

    #[test]
    fn test_route_extensions_are_applied() {
        let mut builder = OpenApiBuilder::new();
        let mut route = Route::new(HttpMethod::Post, "/items");
        route.parameters = vec![body("name", "string", true)];
        route.responses = created(json!({"$ref": "#/components/schemas/postItems"}));
        route.settings = serde_json::from_value(json!({
            "x_operation": {"internal": true},
            "x_path": {"group": "catalog"},
            "x_schema": {"for": 201, "audited": true}
        }))
        .unwrap();
        builder.add_route(&route);

        let document = serde_json::to_value(builder.build()).unwrap();
        assert_eq!(document["paths"]["/items"]["x-group"], json!("catalog"));
        assert_eq!(document["paths"]["/items"]["post"]["x-internal"], json!(true));
        assert_eq!(document["components"]["schemas"]["postItems"]["x-audited"], json!(true));
    }

    #[test]
    fn test_build_document_no_schemas() {
        let mut builder = OpenApiBuilder::new();
        builder.add_route(&Route::new(HttpMethod::Get, "/health"));

        let document = builder.build();

        assert_eq!(document.openapi, "3.0.1");
        assert_eq!(document.info.title, "API title");
        assert!(document.components.is_none());
    }

    #[test]
    fn test_info_omits_blank_members() {
        let info = InfoOptions {
            title: Some("Shop".to_string()),
            description: Some("  ".to_string()),
            version: Some("2.0".to_string()),
            contact_email: Some("ops@example.com".to_string()),
            license: Some(String::new()),
            x: Some(IndexMap::from([("logo".to_string(), json!("logo.png"))])),
            ..Default::default()
        };
        let document = OpenApiBuilder::new().with_info(info).build();

        let value = serde_json::to_value(&document.info).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Shop",
                "contact": {"email": "ops@example.com"},
                "version": "2.0",
                "x-logo": "logo.png"
            })
        );
    }

    #[test]
    fn test_root_extensions_and_options() {
        let options = DocumentOptions {
            add_version: true,
            add_base_path: true,
            base_path: Some("/api".to_string()),
        };
        let mut builder = OpenApiBuilder::new()
            .with_options(options)
            .with_root_extensions(Some(IndexMap::from([("audience".to_string(), json!("public"))])));

        let mut route = Route::new(HttpMethod::Get, "/{version}/things");
        route.version = Some(crate::route::RouteVersion::Single("v2".to_string()));
        builder.add_route(&route);

        let document = builder.build();
        assert!(document.paths.contains_key("/api/v2/things"));
        assert_eq!(document.extensions.get("x-audience"), Some(&json!("public")));
    }

    #[test]
    fn test_summary_and_description_from_route() {
        let mut builder = OpenApiBuilder::new();
        let mut route = Route::new(HttpMethod::Delete, "/items/:id");
        route.description = Some("Remove an item".to_string());
        route.detail = Some("Soft-deletes the item.".to_string());
        route.nickname = Some("destroyItem".to_string());
        builder.add_route(&route);

        let operation = builder.paths["/items/{id}"].delete.as_ref().unwrap();
        assert_eq!(operation.summary.as_deref(), Some("Remove an item"));
        assert_eq!(operation.description.as_deref(), Some("Soft-deletes the item."));
        assert_eq!(operation.operation_id.as_deref(), Some("destroyItem"));
        assert_eq!(operation.tags, Some(vec!["Item".to_string()]));
    }
}
