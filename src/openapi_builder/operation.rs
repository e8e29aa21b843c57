//! Operations and path items.

use super::body::{build_request_body, build_response};
use super::parameter::build_parameter;
use super::security::build_security_requirements;
use super::Contexts;
use crate::collector::RouteMeta;
use crate::config::SecurityConfig;
use crate::error::Result;
use crate::openapi_model::{Operation, PathItem};
use crate::route_tree::HttpMethod;
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};

const UNAUTHORIZED: &str = "401";

pub fn build_operation(route: &RouteMeta, security: &SecurityConfig, ctx: &mut Contexts) -> Result<Operation> {
    debug!("Building operation: {} {}", route.method, route.path);
    let docs = &route.documentation;

    let parameters = docs
        .request
        .parameters
        .iter()
        .map(|p| build_parameter(p, ctx))
        .collect::<Result<Vec<_>>>()?;

    let request_body = docs
        .request
        .body
        .as_ref()
        .map(|body| build_request_body(body, ctx))
        .transpose()?;

    let mut responses = BTreeMap::new();
    for (status, response) in &docs.responses {
        responses.insert(status.clone(), build_response(response, ctx)?);
    }
    if route.protected && !responses.contains_key(UNAUTHORIZED) {
        if let Some(unauthorized) = &security.default_unauthorized_response {
            responses.insert(UNAUTHORIZED.to_string(), build_response(unauthorized, ctx)?);
        }
    }

    Ok(Operation {
        tags: docs.tags.clone(),
        summary: docs.summary.clone(),
        description: docs.description.clone(),
        external_docs: docs.external_docs.clone(),
        operation_id: docs.operation_id.clone(),
        parameters,
        request_body,
        responses,
        deprecated: docs.deprecated,
        security: build_security_requirements(route, security),
    })
}

/// Drops every route whose method and URL were already seen, keeping the first one.
pub fn distinct_routes(routes: Vec<RouteMeta>) -> Vec<RouteMeta> {
    let mut seen = HashSet::new();
    routes
        .into_iter()
        .filter(|route| {
            let first = seen.insert((route.method, route.path.clone()));
            if !first {
                warn!("Duplicate route {} {}, keeping the first one", route.method, route.path);
            }
            first
        })
        .collect()
}

/// Builds one path item per URL. A second operation for the same method and URL is dropped
/// before anything of it is built.
pub fn build_paths(
    routes: &[RouteMeta],
    security: &SecurityConfig,
    ctx: &mut Contexts,
) -> Result<BTreeMap<String, PathItem>> {
    let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();

    for route in routes {
        let path_item = paths.entry(route.path.clone()).or_default();
        let slot = match route.method {
            HttpMethod::Get => &mut path_item.get,
            HttpMethod::Post => &mut path_item.post,
            HttpMethod::Put => &mut path_item.put,
            HttpMethod::Delete => &mut path_item.delete,
            HttpMethod::Patch => &mut path_item.patch,
            HttpMethod::Options => &mut path_item.options,
            HttpMethod::Head => &mut path_item.head,
            HttpMethod::Trace => &mut path_item.trace,
        };
        if slot.is_some() {
            warn!("Duplicate route {} {}, keeping the first one", route.method, route.path);
            continue;
        }
        *slot = Some(build_operation(route, security, ctx)?);
    }

    Ok(paths)
}
