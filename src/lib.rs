//! OpenAPI from routes - OpenAPI documents from framework route descriptions.
//!
//! Route discovery happens in the host web framework; this library takes the
//! routes it describes (method, raw path, version, flat parameter list,
//! responses, vendor extension settings) and turns them into an OpenAPI 3.0
//! document. Body parameters of write operations, including bracketed nested
//! names such as `address[street]`, are folded into a request-body schema
//! registered under `components.schemas`.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Collects route manifests from a file or directory
//! 2. [`parser`] - Loads YAML/JSON manifests into [`route::Route`] and model definitions
//! 3. [`path_string`] - Renders framework paths as OpenAPI path templates
//! 4. [`move_params`] - Moves body parameters into a registered schema
//! 5. [`model`] - Required-attribute resolution for declared models
//! 6. [`extensions`] - Overlays `x-` vendor extensions onto document nodes
//! 7. [`openapi_builder`] - Assembles the document around one [`registry::SchemaRegistry`]
//! 8. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_routes::openapi_builder::OpenApiBuilder;
//! use openapi_from_routes::route::{HttpMethod, Parameter, ParameterLocation, Route};
//!
//! let mut route = Route::new(HttpMethod::Post, "/items");
//! route.parameters = vec![
//!     Parameter::new("name", ParameterLocation::Body, "string", true),
//!     Parameter::new("size[width]", ParameterLocation::Body, "integer", false),
//! ];
//!
//! let mut builder = OpenApiBuilder::new();
//! builder.add_route(&route);
//! let document = builder.build();
//!
//! let schemas = document.components.unwrap().schemas.unwrap();
//! assert!(schemas.contains_key("postItems"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod error;
pub mod extensions;
pub mod model;
pub mod move_params;
pub mod openapi_builder;
pub mod operation_id;
pub mod parser;
pub mod path_string;
pub mod registry;
pub mod route;
pub mod scanner;
pub mod schema;
pub mod serializer;
