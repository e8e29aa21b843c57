//! Route manifests.
//!
//! A manifest describes routes and, optionally, configuration in YAML or JSON. It is the file
//! based counterpart of building a [`RouteNode`] tree in code:
//!
//! ```yaml
//! config:
//!   info:
//!     title: Pet Store
//! routes:
//!   - path: /pets
//!     documentation:
//!       tags: [pets]
//!     children:
//!       - method: get
//!         documentation:
//!           summary: List pets
//!       - path: "{id}"
//!         authenticated: {}
//!         method: delete
//! ```
//!
//! Each manifest route becomes a chain of nodes: its path segments, then the authentication
//! gate, then the method. Documentation and children hang off the last node of the chain.

use crate::config::PluginConfig;
use crate::documentation::RouteDocs;
use crate::error::{Error, Result};
use crate::route_tree::{HttpMethod, RouteNode, RouteSelector};
use crate::scanner::FileScanner;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of one manifest file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub config: Option<PluginConfig>,
    pub routes: Vec<ManifestRoute>,
}

/// Authentication gate of a manifest route
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestAuth {
    pub providers: Vec<String>,
    pub optional: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestRoute {
    /// Path below the parent, e.g. `/users/{id}`; parameters are written in braces
    pub path: Option<String>,
    /// HTTP method; a route with a method installs a handler
    pub method: Option<String>,
    pub authenticated: Option<ManifestAuth>,
    pub documentation: Option<RouteDocs>,
    pub children: Vec<ManifestRoute>,
}

impl ManifestRoute {
    /// Converts the route and its children into a node chain.
    pub fn to_node(&self) -> Result<RouteNode> {
        let mut chain: Vec<RouteNode> = self.path.as_deref().map(path_nodes).unwrap_or_default();

        if let Some(auth) = &self.authenticated {
            chain.push(RouteNode::authenticated(auth.providers.clone(), auth.optional));
        }
        let method = self.method.as_deref().map(str::parse::<HttpMethod>).transpose()?;
        if let Some(method) = method {
            chain.push(RouteNode::method(method));
        }

        let mut last = chain.pop().unwrap_or_else(|| RouteNode::new(RouteSelector::Root));
        last.documentation = self.documentation.clone();
        last.handler = method.is_some();
        for child in &self.children {
            last.children.push(child.to_node()?);
        }

        Ok(chain.into_iter().rev().fold(last, |inner, mut outer| {
            outer.children.push(inner);
            outer
        }))
    }
}

/// Splits a path into constant and parameter nodes. Consecutive constant segments share one
/// node; a trailing `/` adds a trailing slash selector.
fn path_nodes(path: &str) -> Vec<RouteNode> {
    let mut nodes = Vec::new();
    let mut constant: Vec<&str> = Vec::new();

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment.starts_with('{') && segment.ends_with('}') {
            if !constant.is_empty() {
                nodes.push(RouteNode::path(constant.join("/")));
                constant.clear();
            }
            nodes.push(RouteNode::parameter(segment));
        } else {
            constant.push(segment);
        }
    }
    if !constant.is_empty() {
        nodes.push(RouteNode::path(constant.join("/")));
    }
    if path.len() > 1 && path.ends_with('/') {
        nodes.push(RouteNode::new(RouteSelector::TrailingSlash));
    }
    nodes
}

impl Manifest {
    /// The route tree of this manifest
    pub fn to_tree(&self) -> Result<RouteNode> {
        let mut root = RouteNode::root();
        for route in &self.routes {
            root.children.push(route.to_node()?);
        }
        Ok(root)
    }
}

/// Parses YAML or JSON depending on the file extension. Anything but `.json` is read as YAML.
fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| Error::Manifest {
        file: path.to_path_buf(),
        message,
    })
}

/// Loads a single manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    debug!("Loading manifest {}", path.display());
    parse_file(path)
}

/// Loads a configuration file (the `config` section of a manifest on its own).
pub fn load_config(path: &Path) -> Result<PluginConfig> {
    debug!("Loading config {}", path.display());
    parse_file(path)
}

/// Routes and configuration gathered from one or more manifests
#[derive(Debug)]
pub struct LoadedManifests {
    pub config: PluginConfig,
    pub tree: RouteNode,
    pub files: usize,
}

/// Loads a manifest file, or every manifest below a directory in path order.
///
/// The route trees are placed side by side under one root; configurations are merged in file
/// order, later files taking precedence.
pub fn load(path: &Path) -> Result<LoadedManifests> {
    let files = if path.is_dir() {
        let scan = FileScanner::new(path.to_path_buf()).scan()?;
        for warning in &scan.warnings {
            warn!("{}", warning);
        }
        scan.manifest_files
    } else if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        return Err(Error::InvalidArgument(format!("manifest path does not exist: {}", path.display())));
    };

    let mut config = PluginConfig::default();
    let mut tree = RouteNode::root();
    for file in &files {
        let manifest = load_manifest(file)?;
        let subtree = manifest.to_tree().map_err(|e| Error::Manifest {
            file: file.clone(),
            message: e.to_string(),
        })?;
        debug!("{}: {} routes", file.display(), manifest.routes.len());

        if let Some(file_config) = manifest.config {
            config = config.merge(file_config);
        }
        tree.children.extend(subtree.children);
    }

    info!("Loaded {} manifest files", files.len());
    Ok(LoadedManifests {
        config,
        tree,
        files: files.len(),
    })
}
