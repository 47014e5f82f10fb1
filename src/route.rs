//! Route input model handed over by the host framework.
//!
//! Route discovery itself happens outside this crate; the host describes each
//! endpoint as a [`Route`] (usually loaded from a manifest, see
//! [`crate::parser`]). Routes are read-only inputs: the engine clones the
//! parameter list it rewrites and never mutates the route.

use crate::extensions::ExtensionSettings;
use crate::openapi_builder::Response;
use crate::schema::SchemaNode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// HTTP methods a route can be declared with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum HttpMethod {
    /// HTTP GET method
    #[default]
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
    /// HTTP HEAD method
    Head,
}

impl HttpMethod {
    /// Get the HTTP method as an upper-case string
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Lower-case form, used for operation keys and generated names
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }

    /// Write verbs are the only ones whose body parameters get moved into a schema
    pub fn is_write(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The location where a parameter value is carried in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    /// Query string parameter (e.g., `?page=1&limit=10`)
    Query,
    /// Path parameter embedded in the URL (e.g., `/users/{id}`)
    Path,
    /// HTTP header parameter
    Header,
    /// Request body member
    Body,
    /// Form field; treated as body whenever the route has any body parameter
    FormData,
}

/// A declared request parameter.
///
/// Names may use bracket notation (`parent[child][grandchild]`) to describe
/// members of nested body objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,
    /// Location declared under the legacy `param_type` key
    #[serde(rename = "param_type", skip_serializing)]
    pub legacy_location: Option<ParameterLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared data type (`string`, `integer`, `array`, or a schema name)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub required: bool,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    /// Element descriptor for array-typed parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
}

impl Parameter {
    /// Create a new Parameter
    pub fn new(name: &str, location: ParameterLocation, data_type: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            location: Some(location),
            data_type: Some(data_type.to_string()),
            required,
            ..Default::default()
        }
    }

    pub fn is_body(&self) -> bool {
        self.location == Some(ParameterLocation::Body)
    }

    /// Body-located under either the `in` key or the legacy key
    pub fn declares_body(&self) -> bool {
        self.is_body() || self.legacy_location == Some(ParameterLocation::Body)
    }

    pub fn is_array_typed(&self) -> bool {
        self.data_type.as_deref() == Some("array")
    }
}

/// API version attached to a route; hosts may hand it over nested in lists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RouteVersion {
    Single(String),
    Many(Vec<RouteVersion>),
}

impl RouteVersion {
    /// The literal version, unwrapping nested lists by their first element
    pub fn resolve(&self) -> Option<&str> {
        match self {
            RouteVersion::Single(version) => Some(version.as_str()),
            RouteVersion::Many(versions) => versions.first().and_then(RouteVersion::resolve),
        }
    }
}

/// Complete information about a single API endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Route {
    pub method: HttpMethod,
    /// Raw framework path (e.g. `/{version}/users/:id(.json)`)
    pub path: String,
    pub version: Option<RouteVersion>,
    /// Short description, used as the operation summary
    pub description: Option<String>,
    /// Long-form operation description
    pub detail: Option<String>,
    /// Explicit operationId
    pub nickname: Option<String>,
    /// Explicit name for the synthesized body parameter
    pub body_name: Option<String>,
    pub parameters: Vec<Parameter>,
    /// Declared responses keyed by status code
    pub responses: IndexMap<String, Response>,
    pub settings: ExtensionSettings,
}

impl Route {
    /// Create a new Route with minimal required fields
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_parse_is_case_insensitive() {
        assert_eq!("post".parse::<HttpMethod>(), Ok(HttpMethod::Post));
        assert_eq!("PATCH".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert_eq!("Put".parse::<HttpMethod>(), Ok(HttpMethod::Put));
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_write_verbs() {
        assert!(HttpMethod::Post.is_write());
        assert!(HttpMethod::Put.is_write());
        assert!(HttpMethod::Patch.is_write());
        assert!(!HttpMethod::Get.is_write());
        assert!(!HttpMethod::Delete.is_write());
    }

    #[test]
    fn test_parameter_deserializes_legacy_location() {
        let param: Parameter = serde_json::from_value(json!({
            "name": "raw_hash",
            "type": "object",
            "param_type": "body"
        }))
        .unwrap();

        assert!(param.location.is_none());
        assert!(!param.is_body());
        assert!(param.declares_body());
    }

    #[test]
    fn test_parameter_serialization_skips_legacy_key() {
        let mut param = Parameter::new("id", ParameterLocation::Path, "integer", true);
        param.legacy_location = Some(ParameterLocation::Path);

        let value = serde_json::to_value(&param).unwrap();
        assert_eq!(
            value,
            json!({"name": "id", "in": "path", "type": "integer", "required": true})
        );
    }

    #[test]
    fn test_form_data_location_name() {
        let param: Parameter = serde_json::from_value(json!({"name": "f", "in": "formData"})).unwrap();
        assert_eq!(param.location, Some(ParameterLocation::FormData));
    }

    #[test]
    fn test_route_version_unwraps_nested_lists() {
        let version: RouteVersion = serde_json::from_value(json!([["v2", "v1"], "v0"])).unwrap();
        assert_eq!(version.resolve(), Some("v2"));

        let empty: RouteVersion = serde_json::from_value(json!([])).unwrap();
        assert_eq!(empty.resolve(), None);
    }

    #[test]
    fn test_route_deserialize() {
        let route: Route = serde_json::from_value(json!({
            "method": "put",
            "path": "/settings",
            "parameters": [{"name": "prefs[theme]", "in": "body", "type": "string"}]
        }))
        .unwrap();

        assert_eq!(route.method, HttpMethod::Put);
        assert_eq!(route.parameters.len(), 1);
        assert!(route.responses.is_empty());
    }
}
