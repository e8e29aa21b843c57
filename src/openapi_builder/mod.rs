//! OpenAPI document assembly.
//!
//! [`OpenApiBuilder`] turns collected routes into one [`OpenApiDocument`] per spec. For every
//! spec it resolves the effective configuration, prepares the schema and example contexts from
//! the spec's routes and then runs the object builders:
//!
//! - [`info`] - Info, servers and tags
//! - [`parameter`] - Parameters
//! - [`body`] - Request bodies and responses
//! - [`security`] - Security schemes and requirements
//! - [`operation`] - Operations and path items
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::collector::RouteCollector;
//! use openapi_from_routes::config::{DocsConfig, PluginConfig};
//! use openapi_from_routes::documentation::RouteDocs;
//! use openapi_from_routes::openapi_builder::OpenApiBuilder;
//! use openapi_from_routes::route_tree::{HttpMethod, RouteNode};
//!
//! let config = PluginConfig::new(DocsConfig::new().title("Pets").version("1.0.0"));
//! let tree = RouteNode::root().child(
//!     RouteNode::path("pets").child(
//!         RouteNode::method(HttpMethod::Get)
//!             .documented(RouteDocs::new().summary("List pets"))
//!             .handle(),
//!     ),
//! );
//!
//! let routes = RouteCollector::new(&config).collect(&tree);
//! let document = OpenApiBuilder::new(&config).build_spec("api", &routes).unwrap();
//! assert!(document.paths.contains_key("/pets"));
//! ```

pub mod body;
pub mod info;
pub mod operation;
pub mod parameter;
pub mod security;

use crate::collector::RouteMeta;
use crate::config::{DocsConfig, PluginConfig};
use crate::error::{Error, Result};
use crate::example_context::ExampleContext;
use crate::openapi_model::{Components, OpenApiDocument, OPENAPI_VERSION};
use crate::schema_context::SchemaContext;
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};

/// Shared contexts handed to the object builders while building one document
pub struct Contexts {
    pub schemas: SchemaContext,
    pub examples: ExampleContext,
}

impl Contexts {
    pub fn new(docs: &DocsConfig) -> Self {
        Self {
            schemas: SchemaContext::new(docs.schemas.clone()),
            examples: ExampleContext::new(docs.examples.clone()),
        }
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::new(&DocsConfig::default())
    }

    /// Registers all schemas and examples of the routes up front, in route order
    pub fn collect(&mut self, routes: &[RouteMeta]) -> Result<()> {
        self.schemas.collect(routes)?;
        self.examples.collect(routes)
    }
}

/// OpenAPI document builder
pub struct OpenApiBuilder<'a> {
    config: &'a PluginConfig,
}

impl<'a> OpenApiBuilder<'a> {
    pub fn new(config: &'a PluginConfig) -> Self {
        debug!("Initializing OpenApiBuilder");
        Self { config }
    }

    /// All spec ids to build: the default spec, every configured spec and every spec a route
    /// was assigned to. The default spec comes first.
    pub fn spec_ids(&self, routes: &[RouteMeta]) -> Vec<String> {
        let others: BTreeSet<&String> = self
            .config
            .specs
            .keys()
            .chain(routes.iter().map(|r| &r.spec_id))
            .filter(|id| **id != self.config.default_spec_id)
            .collect();

        let mut ids = vec![self.config.default_spec_id.clone()];
        ids.extend(others.into_iter().cloned());
        ids
    }

    /// Builds the document of one spec from the routes assigned to it.
    ///
    /// # Errors
    ///
    /// Fails for a spec id that is neither the default, configured, nor used by any route, and
    /// when a route references an unknown schema or example.
    pub fn build_spec(&self, spec_id: &str, routes: &[RouteMeta]) -> Result<OpenApiDocument> {
        let known = spec_id == self.config.default_spec_id
            || self.config.specs.contains_key(spec_id)
            || routes.iter().any(|r| r.spec_id == spec_id);
        if !known {
            return Err(Error::UnknownSpec(spec_id.to_string()));
        }

        let routes = operation::distinct_routes(routes.iter().filter(|r| r.spec_id == spec_id).cloned().collect());
        info!("Building spec '{}' with {} routes", spec_id, routes.len());

        let docs = self.config.resolve(spec_id);
        let mut ctx = Contexts::new(&docs);
        ctx.collect(&routes)?;

        let paths = operation::build_paths(&routes, &docs.security, &mut ctx)?;
        let components = Components {
            schemas: ctx.schemas.into_schemas(),
            examples: ctx.examples.into_examples(),
            security_schemes: security::build_security_schemes(&docs.security.schemes),
        };

        let mut document = OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: info::build_info(&docs.info),
            servers: info::build_servers(&docs.servers),
            paths,
            components: if components.is_empty() { None } else { Some(components) },
            tags: info::build_tags(&docs.tags, &routes),
            external_docs: docs.external_docs.clone(),
        };

        if let Some(hook) = &self.config.post_build {
            debug!("Running post-build hook for spec '{}'", spec_id);
            hook(&mut document, spec_id);
        }
        Ok(document)
    }

    /// Builds the documents of every spec, keyed by spec id.
    pub fn build_all(&self, routes: &[RouteMeta]) -> Result<BTreeMap<String, OpenApiDocument>> {
        self.spec_ids(routes)
            .into_iter()
            .map(|id| {
                let document = self.build_spec(&id, routes)?;
                Ok((id, document))
            })
            .collect()
    }
}
