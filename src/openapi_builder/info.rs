//! Info, server and tag objects.

use crate::collector::RouteMeta;
use crate::config::InfoConfig;
use crate::openapi_model::{Info, Server, Tag};
use std::collections::BTreeSet;

const DEFAULT_TITLE: &str = "API";
const DEFAULT_VERSION: &str = "latest";

pub fn build_info(config: &InfoConfig) -> Info {
    Info {
        title: config.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        version: config.version.clone().unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        summary: config.summary.clone(),
        description: config.description.clone(),
        terms_of_service: config.terms_of_service.clone(),
        contact: config.contact.clone(),
        license: config.license.clone(),
    }
}

pub fn build_servers(servers: &[Server]) -> Vec<Server> {
    servers.to_vec()
}

/// Declared tags in configuration order, followed by the tags routes use without declaring
/// them (sorted, name only).
pub fn build_tags(declared: &[Tag], routes: &[RouteMeta]) -> Vec<Tag> {
    let mut tags = declared.to_vec();
    let undeclared: BTreeSet<&String> = routes
        .iter()
        .flat_map(|r| r.documentation.tags.iter())
        .filter(|name| !declared.iter().any(|t| &t.name == *name))
        .collect();
    tags.extend(undeclared.into_iter().map(|name| Tag {
        name: name.clone(),
        description: None,
        external_docs: None,
    }));
    tags
}
