//! Route tree model mirroring the host router.
//!
//! axum does not expose the structure of a `Router`, so applications describe their routes
//! with a small tree of [`RouteNode`]s. Each node carries one [`RouteSelector`] (a path
//! segment, a method, an authentication gate, ...), optional documentation and a flag telling
//! whether a handler is installed at that node. The [`collector`](crate::collector) walks this
//! tree to produce flat route descriptions.
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::documentation::RouteDocs;
//! use openapi_from_routes::route_tree::{HttpMethod, RouteNode};
//!
//! let tree = RouteNode::root().child(
//!     RouteNode::path("users")
//!         .documented(RouteDocs::new().tag("users"))
//!         .child(RouteNode::method(HttpMethod::Get).handle())
//!         .child(
//!             RouteNode::parameter("id")
//!                 .child(RouteNode::method(HttpMethod::Get).handle()),
//!         ),
//! );
//! assert_eq!(tree.children.len(), 1);
//! ```

use crate::documentation::RouteDocs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP methods a route can be selected by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    /// Upper-case method name, e.g. `GET`
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            "TRACE" => Ok(HttpMethod::Trace),
            other => Err(crate::error::Error::InvalidArgument(format!(
                "unsupported HTTP method: {}",
                other
            ))),
        }
    }
}

/// What a single node of the route tree matches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSelector {
    /// The tree root, matches nothing by itself
    Root,
    /// One or more constant path segments, e.g. `api/v1`
    Path(String),
    /// A path parameter segment: `{id}`, optional `{id?}` or the tailcard `{...}`
    Parameter(String),
    /// Restricts the subtree to one HTTP method
    Method(HttpMethod),
    /// Authentication gate. Optional authentication does not protect a route.
    Authenticated { providers: Vec<String>, optional: bool },
    /// Explicit trailing slash
    TrailingSlash,
    /// Constraint selectors (headers, accept types, ...) that do not change the URL
    Other(String),
}

/// A node in the route tree.
#[derive(Debug, Clone)]
pub struct RouteNode {
    pub selector: RouteSelector,
    /// Documentation attached at this level, inherited by the whole subtree
    pub documentation: Option<RouteDocs>,
    /// Whether a handler is installed at this node
    pub handler: bool,
    pub children: Vec<RouteNode>,
}

impl RouteNode {
    pub fn new(selector: RouteSelector) -> Self {
        Self {
            selector,
            documentation: None,
            handler: false,
            children: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(RouteSelector::Root)
    }

    pub fn path(segments: impl Into<String>) -> Self {
        Self::new(RouteSelector::Path(segments.into()))
    }

    /// Path parameter node; `name` is given without braces (`id`, `id?`, `...`)
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::new(RouteSelector::Parameter(name.into()))
    }

    pub fn method(method: HttpMethod) -> Self {
        Self::new(RouteSelector::Method(method))
    }

    pub fn authenticated(providers: Vec<String>, optional: bool) -> Self {
        Self::new(RouteSelector::Authenticated { providers, optional })
    }

    pub fn child(mut self, child: RouteNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn documented(mut self, docs: RouteDocs) -> Self {
        self.documentation = Some(docs);
        self
    }

    /// Marks this node as having a handler installed
    pub fn handle(mut self) -> Self {
        self.handler = true;
        self
    }

    /// Counts the nodes of this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(RouteNode::node_count).sum::<usize>()
    }
}
