//! OpenAPI from routes - OpenAPI 3.1 documents generated from an application's routes.
//!
//! Applications describe their axum routes as a tree of [`route_tree::RouteNode`]s, either in
//! code or in YAML/JSON route manifests, and attach [`documentation::RouteDocs`] to any node.
//! Documentation is inherited down the tree, so tags, parameters or error responses shared by
//! a group of routes are declared once.
//!
//! # Architecture
//!
//! 1. [`route_tree`] - Route tree model mirroring the host router
//! 2. [`documentation`] - Per-route documentation and its inheritance rules
//! 3. [`collector`] - Flattens a route tree into documented routes
//! 4. [`schema_context`] / [`example_context`] - Component schemas and examples of a spec
//! 5. [`openapi_builder`] - Assembles one OpenAPI document per spec
//! 6. [`serializer`] - Serializes documents to YAML or JSON
//! 7. [`routes`] / [`swagger_ui`] - axum router serving the documents and a Swagger UI page
//! 8. [`manifest`] / [`scanner`] - Loads route trees and configuration from files
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_routes::{
//!     collector::RouteCollector,
//!     config::{DocsConfig, PluginConfig, SecuritySchemeConfig},
//!     documentation::{BodyDocs, ResponseDocs, RouteDocs, TypeDescriptor},
//!     openapi_builder::OpenApiBuilder,
//!     route_tree::{HttpMethod, RouteNode},
//!     serializer::serialize_yaml,
//! };
//!
//! let config = PluginConfig::new(
//!     DocsConfig::new()
//!         .title("Users")
//!         .version("1.0.0")
//!         .security_scheme("jwt", SecuritySchemeConfig::bearer("JWT"))
//!         .default_security_scheme("jwt"),
//! );
//!
//! let tree = RouteNode::root().child(
//!     RouteNode::path("users")
//!         .documented(RouteDocs::new().tag("users"))
//!         .child(
//!             RouteNode::parameter("id")
//!                 .documented(RouteDocs::new().path_parameter("id", TypeDescriptor::integer()))
//!                 .child(RouteNode::authenticated(vec!["jwt".into()], false).child(
//!                     RouteNode::method(HttpMethod::Get)
//!                         .documented(RouteDocs::new().response(
//!                             "200",
//!                             ResponseDocs::new("The user").body(BodyDocs::new(TypeDescriptor::string())),
//!                         ))
//!                         .handle(),
//!                 )),
//!         ),
//! );
//!
//! let routes = RouteCollector::new(&config).collect(&tree);
//! let document = OpenApiBuilder::new(&config).build_spec("api", &routes).unwrap();
//! assert!(document.paths["/users/{id}"].get.is_some());
//!
//! let yaml = serialize_yaml(&document).unwrap();
//! println!("{}", yaml);
//! ```
//!
//! # Serving
//!
//! [`routes::docs_router`] builds every spec once and returns an `axum::Router` serving
//! `{root}/{spec}.json` and the Swagger UI, ready to be merged into the application router.
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod collector;
pub mod config;
pub mod documentation;
pub mod error;
pub mod example_context;
pub mod manifest;
pub mod openapi_builder;
pub mod openapi_model;
pub mod route_tree;
pub mod routes;
pub mod scanner;
pub mod schema_context;
pub mod serializer;
pub mod swagger_ui;

pub use error::{Error, Result};
