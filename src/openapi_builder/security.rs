use crate::collector::RouteMeta;
use crate::config::{SecurityConfig, SecuritySchemeConfig};
use crate::openapi_model::SecurityScheme;
use log::{debug, warn};
use std::collections::BTreeMap;

pub fn build_security_scheme(config: &SecuritySchemeConfig) -> SecurityScheme {
    SecurityScheme {
        scheme_type: config.scheme_type.as_str().to_string(),
        description: config.description.clone(),
        name: config.name.clone(),
        location: config.location.map(|l| l.as_str().to_string()),
        scheme: config.scheme.clone(),
        bearer_format: config.bearer_format.clone(),
        flows: config.flows.clone(),
        open_id_connect_url: config.open_id_connect_url.clone(),
    }
}

pub fn build_security_schemes(
    schemes: &BTreeMap<String, SecuritySchemeConfig>,
) -> BTreeMap<String, SecurityScheme> {
    schemes
        .iter()
        .map(|(name, scheme)| (name.clone(), build_security_scheme(scheme)))
        .collect()
}

/// Security requirements of a route. Only protected routes have any: the route's own scheme
/// names, or the configured defaults when it names none. Every scheme is one alternative.
pub fn build_security_requirements(
    route: &RouteMeta,
    config: &SecurityConfig,
) -> Vec<BTreeMap<String, Vec<String>>> {
    if !route.protected {
        return Vec::new();
    }

    let names = if route.documentation.security_scheme_names.is_empty() {
        &config.default_security_scheme_names
    } else {
        &route.documentation.security_scheme_names
    };
    if names.is_empty() {
        debug!("Protected route {} {} has no security schemes", route.method, route.path);
    }

    names
        .iter()
        .map(|name| {
            if !config.schemes.contains_key(name) {
                warn!("Route {} {} requires undeclared security scheme {}", route.method, route.path, name);
            }
            let mut requirement = BTreeMap::new();
            requirement.insert(name.clone(), Vec::new());
            requirement
        })
        .collect()
}
