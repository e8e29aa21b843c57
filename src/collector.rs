//! Route collection.
//!
//! The [`RouteCollector`] walks a [`RouteNode`] tree depth-first and flattens it into a list of
//! [`RouteMeta`]s: one per node that has a handler and an HTTP method in scope. While walking it
//! builds the URL from path and parameter selectors, merges the documentation of every ancestor
//! into the route's own and tracks whether the route sits behind an authentication gate.

use crate::config::PluginConfig;
use crate::documentation::RouteDocs;
use crate::route_tree::{HttpMethod, RouteNode, RouteSelector};
use log::debug;

/// A single documented route, ready for the builders.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMeta {
    pub method: HttpMethod,
    /// OpenAPI style URL, e.g. `/users/{id}`
    pub path: String,
    /// Documentation merged from the route and all its ancestors
    pub documentation: RouteDocs,
    pub protected: bool,
    /// The spec this route is published in
    pub spec_id: String,
}

impl RouteMeta {
    pub fn new(method: HttpMethod, path: impl Into<String>, documentation: RouteDocs) -> Self {
        Self {
            method,
            path: path.into(),
            documentation,
            protected: false,
            spec_id: crate::config::DEFAULT_SPEC_ID.to_string(),
        }
    }
}

/// State carried from a node to its children
#[derive(Clone)]
struct WalkState {
    segments: Vec<String>,
    method: Option<HttpMethod>,
    documentation: RouteDocs,
    authenticated: bool,
    trailing_slash: bool,
}

/// Flattens route trees into [`RouteMeta`]s.
pub struct RouteCollector<'a> {
    config: &'a PluginConfig,
}

impl<'a> RouteCollector<'a> {
    pub fn new(config: &'a PluginConfig) -> Self {
        Self { config }
    }

    /// Collects every documented route of the tree, in tree order.
    ///
    /// Hidden routes and routes rejected by the configured path filter are dropped.
    pub fn collect(&self, root: &RouteNode) -> Vec<RouteMeta> {
        let mut routes = Vec::new();
        let state = WalkState {
            segments: Vec::new(),
            method: None,
            documentation: RouteDocs::default(),
            authenticated: false,
            trailing_slash: false,
        };
        self.walk(root, state, &mut routes);
        debug!("Collected {} routes", routes.len());
        routes
    }

    fn walk(&self, node: &RouteNode, mut state: WalkState, routes: &mut Vec<RouteMeta>) {
        match &node.selector {
            RouteSelector::Root | RouteSelector::Other(_) => {}
            RouteSelector::Path(segments) => {
                state.trailing_slash = false;
                state.segments.extend(
                    segments
                        .split('/')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
            }
            RouteSelector::Parameter(name) => {
                state.trailing_slash = false;
                state.segments.push(parameter_segment(name));
            }
            RouteSelector::Method(method) => state.method = Some(*method),
            RouteSelector::Authenticated { optional, .. } => {
                if !optional {
                    state.authenticated = true;
                }
            }
            RouteSelector::TrailingSlash => state.trailing_slash = true,
        }

        if let Some(docs) = &node.documentation {
            state.documentation = RouteDocs::inherit(&state.documentation, docs);
        }

        if node.handler {
            match state.method {
                Some(method) => {
                    if let Some(route) = self.finish(method, &state) {
                        routes.push(route);
                    }
                }
                None => debug!("Skipping handler without method at /{}", state.segments.join("/")),
            }
        }

        for child in &node.children {
            self.walk(child, state.clone(), routes);
        }
    }

    fn finish(&self, method: HttpMethod, state: &WalkState) -> Option<RouteMeta> {
        let mut path = format!("/{}", state.segments.join("/"));
        if state.trailing_slash && path != "/" {
            path.push('/');
        }

        let docs = &state.documentation;
        if docs.hidden {
            debug!("Skipping hidden route: {} {}", method, path);
            return None;
        }
        if !self.config.accepts(method, &path) {
            debug!("Route rejected by path filter: {} {}", method, path);
            return None;
        }

        let protected = docs
            .protected
            .unwrap_or(state.authenticated || !docs.security_scheme_names.is_empty());
        let spec_id = docs
            .spec_id
            .clone()
            .unwrap_or_else(|| self.config.assign_spec(&path, &docs.tags));

        debug!("Collected route: {} {} (spec: {}, protected: {})", method, path, spec_id, protected);
        Some(RouteMeta {
            method,
            path,
            documentation: docs.clone(),
            protected,
            spec_id,
        })
    }
}

/// Converts a parameter selector name into its URL segment
fn parameter_segment(name: &str) -> String {
    let name = name.trim_start_matches('{').trim_end_matches('}');
    if name == "..." {
        return "{...}".to_string();
    }
    let name = name.trim_end_matches('?').trim_end_matches("...");
    format!("{{{}}}", name)
}
