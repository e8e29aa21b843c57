//! axum routes serving the generated documents and the Swagger UI.

use crate::collector::RouteCollector;
use crate::config::PluginConfig;
use crate::error::{Error, Result};
use crate::openapi_builder::OpenApiBuilder;
use crate::route_tree::RouteNode;
use crate::serializer::serialize_json;
use crate::swagger_ui::{render_index, SpecLink};
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::get;
use axum::Router;
use log::{debug, info};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds every document of `tree` once and returns a router serving them.
///
/// - `GET {root}/{spec}.json` - the document of each spec
/// - `GET {root}/{swagger_url}` - redirect to the UI page
/// - `GET {root}/{swagger_url}/index.html` - the UI page, unless the UI is disabled
///
/// # Errors
///
/// Fails when a document cannot be built or serialized, and when two of the served URLs
/// coincide.
pub fn docs_router(config: &PluginConfig, tree: &RouteNode) -> Result<Router> {
    let routes = RouteCollector::new(config).collect(tree);
    let documents = OpenApiBuilder::new(config).build_all(&routes)?;

    // Default spec first so it becomes the primary entry of the UI
    let mut ids: Vec<&String> = documents.keys().collect();
    ids.sort_by_key(|id| **id != config.default_spec_id);
    check_urls(config, &ids)?;

    let mut router = Router::new();
    let mut links = Vec::with_capacity(documents.len());

    for id in ids {
        let url = config.routing.spec_url(id);
        let json = serialize_json(&documents[id])?;
        debug!("Serving spec '{}' at {}", id, url);

        router = router.merge(Router::new().route(&url, get(spec_json)).with_state(Arc::new(json)));
        links.push(SpecLink::new(id.clone(), url));
    }

    if config.swagger_ui.enabled {
        let title = documents
            .get(&config.default_spec_id)
            .map(|doc| doc.info.title.clone())
            .unwrap_or_else(|| "API".to_string());
        let page = render_index(&config.swagger_ui, &title, &links);
        let base = config.routing.swagger_base();
        let index = config.routing.swagger_index();
        info!("Serving Swagger UI at {}", index);

        if base != index {
            let target = index.clone();
            router = router.route(&base, get(move || std::future::ready(Redirect::temporary(&target))));
        }
        router = router.merge(Router::new().route(&index, get(swagger_index)).with_state(Arc::new(page)));
    }

    Ok(router)
}

/// Every served URL must be distinct, axum panics on overlapping routes.
fn check_urls(config: &PluginConfig, ids: &[&String]) -> Result<()> {
    let mut served: BTreeMap<String, String> = BTreeMap::new();
    let mut claim = |url: String, what: String| match served.get(&url) {
        Some(other) => Err(Error::InvalidArgument(format!(
            "{} and {} are both served at {}",
            other, what, url
        ))),
        None => {
            served.insert(url, what);
            Ok(())
        }
    };

    for id in ids {
        claim(config.routing.spec_url(id), format!("spec '{}'", id))?;
    }
    if config.swagger_ui.enabled {
        let base = config.routing.swagger_base();
        let index = config.routing.swagger_index();
        if base != index {
            claim(base, "the Swagger UI redirect".to_string())?;
        }
        claim(index, "the Swagger UI page".to_string())?;
    }
    Ok(())
}

async fn spec_json(State(json): State<Arc<String>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], json.as_str().to_owned())
}

async fn swagger_index(State(page): State<Arc<String>>) -> Html<String> {
    Html(page.as_str().to_owned())
}
