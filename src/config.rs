//! Configuration layers.
//!
//! The effective configuration of a document is the global [`DocsConfig`] overlaid with the
//! per-spec [`DocsConfig`] of that document; per-route documentation is applied last by the
//! builders. Everything except the hooks deserializes from YAML or JSON.

use crate::documentation::{Example, ResponseDocs, TypeDescriptor};
use crate::openapi_model::{Contact, ExternalDocs, License, OAuthFlows, OpenApiDocument, Server, Tag};
use crate::route_tree::HttpMethod;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Spec id used when neither the route nor the spec assigner picks one
pub const DEFAULT_SPEC_ID: &str = "api";

/// Decides whether a route (method, URL) is documented at all
pub type PathFilter = Arc<dyn Fn(HttpMethod, &str) -> bool + Send + Sync>;
/// Picks the spec id of a route from its URL and tags
pub type SpecAssigner = Arc<dyn Fn(&str, &[String]) -> String + Send + Sync>;
/// Runs on every finished document together with its spec id
pub type PostBuild = Arc<dyn Fn(&mut OpenApiDocument, &str) + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InfoConfig {
    pub title: Option<String>,
    pub version: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
}

impl InfoConfig {
    fn merge(&self, over: &InfoConfig) -> InfoConfig {
        InfoConfig {
            title: over.title.clone().or_else(|| self.title.clone()),
            version: over.version.clone().or_else(|| self.version.clone()),
            summary: over.summary.clone().or_else(|| self.summary.clone()),
            description: over.description.clone().or_else(|| self.description.clone()),
            terms_of_service: over
                .terms_of_service
                .clone()
                .or_else(|| self.terms_of_service.clone()),
            contact: over.contact.clone().or_else(|| self.contact.clone()),
            license: over.license.clone().or_else(|| self.license.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SecuritySchemeType {
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "openIdConnect")]
    OpenIdConnect,
    #[serde(rename = "mutualTLS")]
    MutualTls,
}

impl SecuritySchemeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecuritySchemeType::ApiKey => "apiKey",
            SecuritySchemeType::Http => "http",
            SecuritySchemeType::OAuth2 => "oauth2",
            SecuritySchemeType::OpenIdConnect => "openIdConnect",
            SecuritySchemeType::MutualTls => "mutualTLS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

impl ApiKeyLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Cookie => "cookie",
        }
    }
}

/// A security scheme offered by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SecuritySchemeConfig {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,
    #[serde(default)]
    pub description: Option<String>,
    /// Name of the header, query parameter or cookie for `apiKey` schemes
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "in", default)]
    pub location: Option<ApiKeyLocation>,
    /// HTTP auth scheme for `http` schemes, e.g. `bearer` or `basic`
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub bearer_format: Option<String>,
    #[serde(default)]
    pub flows: Option<OAuthFlows>,
    #[serde(default)]
    pub open_id_connect_url: Option<String>,
}

impl SecuritySchemeConfig {
    pub fn new(scheme_type: SecuritySchemeType) -> Self {
        Self {
            scheme_type,
            description: None,
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
        }
    }

    pub fn bearer(bearer_format: impl Into<String>) -> Self {
        Self {
            scheme: Some("bearer".to_string()),
            bearer_format: Some(bearer_format.into()),
            ..Self::new(SecuritySchemeType::Http)
        }
    }

    pub fn api_key(name: impl Into<String>, location: ApiKeyLocation) -> Self {
        Self {
            name: Some(name.into()),
            location: Some(location),
            ..Self::new(SecuritySchemeType::ApiKey)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Schemes required by protected routes that do not name their own
    pub default_security_scheme_names: Vec<String>,
    /// Added as `401` to protected routes that do not document one
    pub default_unauthorized_response: Option<ResponseDocs>,
    pub schemes: BTreeMap<String, SecuritySchemeConfig>,
}

impl SecurityConfig {
    fn merge(&self, over: &SecurityConfig) -> SecurityConfig {
        let mut schemes = self.schemes.clone();
        schemes.extend(over.schemes.iter().map(|(k, v)| (k.clone(), v.clone())));
        SecurityConfig {
            default_security_scheme_names: if over.default_security_scheme_names.is_empty() {
                self.default_security_scheme_names.clone()
            } else {
                over.default_security_scheme_names.clone()
            },
            default_unauthorized_response: over
                .default_unauthorized_response
                .clone()
                .or_else(|| self.default_unauthorized_response.clone()),
            schemes,
        }
    }
}

/// Document-level settings. Used both globally and per spec.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub info: InfoConfig,
    pub servers: Vec<Server>,
    pub external_docs: Option<ExternalDocs>,
    pub tags: Vec<Tag>,
    pub security: SecurityConfig,
    /// Schemas addressable from routes through `TypeDescriptor::Reference`
    pub schemas: BTreeMap<String, TypeDescriptor>,
    /// Examples addressable from routes through `ExampleDescriptor::Reference`
    pub examples: BTreeMap<String, Example>,
}

impl DocsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.info.title = Some(title.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.info.version = Some(version.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    pub fn server(mut self, url: impl Into<String>, description: Option<&str>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description: description.map(str::to_string),
            variables: BTreeMap::new(),
        });
        self
    }

    pub fn tag(mut self, name: impl Into<String>, description: Option<&str>) -> Self {
        self.tags.push(Tag {
            name: name.into(),
            description: description.map(str::to_string),
            external_docs: None,
        });
        self
    }

    pub fn security_scheme(mut self, name: impl Into<String>, scheme: SecuritySchemeConfig) -> Self {
        self.security.schemes.insert(name.into(), scheme);
        self
    }

    pub fn default_security_scheme(mut self, name: impl Into<String>) -> Self {
        self.security.default_security_scheme_names.push(name.into());
        self
    }

    pub fn default_unauthorized_response(mut self, response: ResponseDocs) -> Self {
        self.security.default_unauthorized_response = Some(response);
        self
    }

    pub fn schema(mut self, id: impl Into<String>, schema: TypeDescriptor) -> Self {
        self.schemas.insert(id.into(), schema);
        self
    }

    pub fn example(mut self, name: impl Into<String>, example: Example) -> Self {
        self.examples.insert(name.into(), example);
        self
    }

    /// Overlays `over` on top of `self`.
    ///
    /// Single values of `over` win when set. Servers (by URL) and tags (by name) from `over`
    /// replace matching entries and append the rest; maps are unioned with `over` winning.
    pub fn merge(&self, over: &DocsConfig) -> DocsConfig {
        let mut servers = self.servers.clone();
        for server in &over.servers {
            match servers.iter_mut().find(|s| s.url == server.url) {
                Some(existing) => *existing = server.clone(),
                None => servers.push(server.clone()),
            }
        }

        let mut tags = self.tags.clone();
        for tag in &over.tags {
            match tags.iter_mut().find(|t| t.name == tag.name) {
                Some(existing) => *existing = tag.clone(),
                None => tags.push(tag.clone()),
            }
        }

        let mut schemas = self.schemas.clone();
        schemas.extend(over.schemas.iter().map(|(k, v)| (k.clone(), v.clone())));
        let mut examples = self.examples.clone();
        examples.extend(over.examples.iter().map(|(k, v)| (k.clone(), v.clone())));

        DocsConfig {
            info: self.info.merge(&over.info),
            servers,
            external_docs: over.external_docs.clone().or_else(|| self.external_docs.clone()),
            tags,
            security: self.security.merge(&over.security),
            schemas,
            examples,
        }
    }
}

/// Where the generated documents and the UI are mounted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Prefix of every docs route, e.g. `/docs`
    pub root_path: String,
    /// Path of the Swagger UI below `root_path`
    pub swagger_url: String,
    /// Path of each document below `root_path`; `{spec}` is replaced by the spec id
    pub openapi_url: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            root_path: String::new(),
            swagger_url: "swagger".to_string(),
            openapi_url: "{spec}.json".to_string(),
        }
    }
}

impl RoutingConfig {
    fn join(&self, tail: &str) -> String {
        let root = self.root_path.trim_matches('/');
        let tail = tail.trim_start_matches('/');
        if root.is_empty() {
            format!("/{}", tail)
        } else {
            format!("/{}/{}", root, tail)
        }
    }

    /// URL of the JSON document of `spec_id`
    pub fn spec_url(&self, spec_id: &str) -> String {
        self.join(&self.openapi_url.replace("{spec}", spec_id))
    }

    /// URL of the Swagger UI entry point
    pub fn swagger_base(&self) -> String {
        self.join(self.swagger_url.trim_matches('/'))
    }

    pub fn swagger_index(&self) -> String {
        format!("{}/index.html", self.swagger_base().trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocExpansion {
    List,
    Full,
    None,
}

impl DocExpansion {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocExpansion::List => "list",
            DocExpansion::Full => "full",
            DocExpansion::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiSort {
    None,
    Alpha,
    Method,
}

/// Options forwarded to Swagger UI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SwaggerUiConfig {
    pub enabled: bool,
    /// Base URL the Swagger UI bundle and stylesheet are loaded from
    pub cdn_url: String,
    pub doc_expansion: DocExpansion,
    pub display_operation_id: bool,
    pub show_tag_filter_input: bool,
    pub sort: UiSort,
    pub syntax_highlight: String,
    pub with_credentials: bool,
    pub persist_authorization: bool,
    /// `None` disables the online validator
    pub validator_url: Option<String>,
}

impl Default for SwaggerUiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cdn_url: "https://unpkg.com/swagger-ui-dist@5".to_string(),
            doc_expansion: DocExpansion::List,
            display_operation_id: false,
            show_tag_filter_input: false,
            sort: UiSort::None,
            syntax_highlight: "agate".to_string(),
            with_credentials: false,
            persist_authorization: false,
            validator_url: None,
        }
    }
}

/// Complete configuration: global docs, per-spec overrides, routing, UI and hooks.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    #[serde(flatten)]
    pub docs: DocsConfig,
    pub specs: BTreeMap<String, DocsConfig>,
    pub default_spec_id: String,
    pub routing: RoutingConfig,
    pub swagger_ui: SwaggerUiConfig,
    #[serde(skip)]
    pub path_filter: Option<PathFilter>,
    #[serde(skip)]
    pub spec_assigner: Option<SpecAssigner>,
    #[serde(skip)]
    pub post_build: Option<PostBuild>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            docs: DocsConfig::default(),
            specs: BTreeMap::new(),
            default_spec_id: DEFAULT_SPEC_ID.to_string(),
            routing: RoutingConfig::default(),
            swagger_ui: SwaggerUiConfig::default(),
            path_filter: None,
            spec_assigner: None,
            post_build: None,
        }
    }
}

impl fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConfig")
            .field("docs", &self.docs)
            .field("specs", &self.specs)
            .field("default_spec_id", &self.default_spec_id)
            .field("routing", &self.routing)
            .field("swagger_ui", &self.swagger_ui)
            .field("path_filter", &self.path_filter.is_some())
            .field("spec_assigner", &self.spec_assigner.is_some())
            .field("post_build", &self.post_build.is_some())
            .finish()
    }
}

impl PluginConfig {
    pub fn new(docs: DocsConfig) -> Self {
        Self {
            docs,
            ..Default::default()
        }
    }

    /// Adds or replaces the overrides of one spec
    pub fn spec(mut self, spec_id: impl Into<String>, docs: DocsConfig) -> Self {
        self.specs.insert(spec_id.into(), docs);
        self
    }

    pub fn with_path_filter(
        mut self,
        filter: impl Fn(HttpMethod, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.path_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_spec_assigner(
        mut self,
        assigner: impl Fn(&str, &[String]) -> String + Send + Sync + 'static,
    ) -> Self {
        self.spec_assigner = Some(Arc::new(assigner));
        self
    }

    pub fn with_post_build(
        mut self,
        hook: impl Fn(&mut OpenApiDocument, &str) + Send + Sync + 'static,
    ) -> Self {
        self.post_build = Some(Arc::new(hook));
        self
    }

    /// The effective document settings of one spec: global settings overlaid with the
    /// spec's own overrides
    pub fn resolve(&self, spec_id: &str) -> DocsConfig {
        match self.specs.get(spec_id) {
            Some(over) => self.docs.merge(over),
            None => self.docs.clone(),
        }
    }

    /// The spec a route belongs to when its documentation names none
    pub fn assign_spec(&self, url: &str, tags: &[String]) -> String {
        match &self.spec_assigner {
            Some(assigner) => assigner(url, tags),
            None => self.default_spec_id.clone(),
        }
    }

    pub fn accepts(&self, method: HttpMethod, url: &str) -> bool {
        self.path_filter.as_ref().map_or(true, |filter| filter(method, url))
    }

    /// Combines two configurations, `other` taking precedence. Hooks are kept from `self`
    /// unless `other` sets them.
    pub fn merge(self, other: PluginConfig) -> PluginConfig {
        let mut specs = self.specs;
        for (id, over) in other.specs {
            let merged = match specs.get(&id) {
                Some(existing) => existing.merge(&over),
                None => over,
            };
            specs.insert(id, merged);
        }

        PluginConfig {
            docs: self.docs.merge(&other.docs),
            specs,
            default_spec_id: if other.default_spec_id != DEFAULT_SPEC_ID {
                other.default_spec_id
            } else {
                self.default_spec_id
            },
            routing: if other.routing != RoutingConfig::default() {
                other.routing
            } else {
                self.routing
            },
            swagger_ui: if other.swagger_ui != SwaggerUiConfig::default() {
                other.swagger_ui
            } else {
                self.swagger_ui
            },
            path_filter: other.path_filter.or(self.path_filter),
            spec_assigner: other.spec_assigner.or(self.spec_assigner),
            post_build: other.post_build.or(self.post_build),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docs_merge_scalars_override_wins() {
        let base = DocsConfig::new().title("Base").version("1.0").description("base");
        let over = DocsConfig::new().title("Admin");

        let merged = base.merge(&over);
        assert_eq!(merged.info.title.as_deref(), Some("Admin"));
        assert_eq!(merged.info.version.as_deref(), Some("1.0"));
        assert_eq!(merged.info.description.as_deref(), Some("base"));
    }

    #[test]
    fn test_docs_merge_lists_by_key() {
        let base = DocsConfig::new()
            .server("https://a.example.com", Some("a"))
            .tag("users", Some("base users"))
            .tag("orders", None);
        let over = DocsConfig::new()
            .server("https://a.example.com", Some("a, overridden"))
            .server("https://b.example.com", None)
            .tag("users", Some("admin users"));

        let merged = base.merge(&over);
        assert_eq!(merged.servers.len(), 2);
        assert_eq!(merged.servers[0].description.as_deref(), Some("a, overridden"));
        assert_eq!(merged.servers[1].url, "https://b.example.com");

        let tags: Vec<_> = merged.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tags, vec!["users", "orders"]);
        assert_eq!(merged.tags[0].description.as_deref(), Some("admin users"));
    }

    #[test]
    fn test_security_merge() {
        let base = DocsConfig::new()
            .security_scheme("jwt", SecuritySchemeConfig::bearer("JWT"))
            .default_security_scheme("jwt");
        let over = DocsConfig::new()
            .security_scheme("key", SecuritySchemeConfig::api_key("X-Key", ApiKeyLocation::Header));

        let merged = base.merge(&over);
        assert_eq!(merged.security.schemes.len(), 2);
        assert_eq!(merged.security.default_security_scheme_names, vec!["jwt"]);

        let over = DocsConfig::new().default_security_scheme("key");
        assert_eq!(base.merge(&over).security.default_security_scheme_names, vec!["key"]);
    }

    #[test]
    fn test_resolve_uses_spec_overrides() {
        let config = PluginConfig::new(DocsConfig::new().title("Public").version("2"))
            .spec("internal", DocsConfig::new().title("Internal"));

        assert_eq!(config.resolve("internal").info.title.as_deref(), Some("Internal"));
        assert_eq!(config.resolve("internal").info.version.as_deref(), Some("2"));
        assert_eq!(config.resolve("api").info.title.as_deref(), Some("Public"));
    }

    #[test]
    fn test_spec_assigner_and_path_filter() {
        let config = PluginConfig::default();
        assert_eq!(config.assign_spec("/x", &[]), DEFAULT_SPEC_ID);
        assert!(config.accepts(HttpMethod::Get, "/x"));

        let config = config
            .with_spec_assigner(|url, _| if url.starts_with("/admin") { "admin".into() } else { "api".into() })
            .with_path_filter(|_, url| !url.starts_with("/internal"));
        assert_eq!(config.assign_spec("/admin/users", &[]), "admin");
        assert!(!config.accepts(HttpMethod::Get, "/internal/metrics"));
    }

    #[test]
    fn test_routing_urls() {
        let routing = RoutingConfig::default();
        assert_eq!(routing.spec_url("api"), "/api.json");
        assert_eq!(routing.swagger_base(), "/swagger");
        assert_eq!(routing.swagger_index(), "/swagger/index.html");

        let routing = RoutingConfig {
            root_path: "/docs/".to_string(),
            swagger_url: "/ui/".to_string(),
            ..Default::default()
        };
        assert_eq!(routing.spec_url("admin"), "/docs/admin.json");
        assert_eq!(routing.swagger_index(), "/docs/ui/index.html");

        let routing = RoutingConfig {
            openapi_url: "openapi/{spec}.json".to_string(),
            ..Default::default()
        };
        assert_eq!(routing.spec_url("admin"), "/openapi/admin.json");
    }

    #[test]
    fn test_plugin_config_from_yaml() {
        let yaml = r#"
info:
  title: Pet Store
  version: 1.0.0
servers:
  - url: https://pets.example.com
security:
  default_security_scheme_names: [jwt]
  schemes:
    jwt:
      type: http
      scheme: bearer
      bearer_format: JWT
specs:
  admin:
    info:
      title: Pet Store Admin
routing:
  root_path: /docs
swagger_ui:
  display_operation_id: true
"#;
        let config: PluginConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.docs.info.title.as_deref(), Some("Pet Store"));
        assert_eq!(config.docs.security.schemes["jwt"].scheme_type, SecuritySchemeType::Http);
        assert_eq!(config.default_spec_id, DEFAULT_SPEC_ID);
        assert_eq!(config.routing.root_path, "/docs");
        assert_eq!(config.routing.swagger_url, "swagger");
        assert!(config.swagger_ui.display_operation_id);
        assert_eq!(config.resolve("admin").info.title.as_deref(), Some("Pet Store Admin"));
    }

    #[test]
    fn test_plugin_config_merge() {
        let first = PluginConfig::new(DocsConfig::new().title("A"))
            .spec("admin", DocsConfig::new().version("1"));
        let mut second = PluginConfig::new(DocsConfig::new().version("9"))
            .spec("admin", DocsConfig::new().title("Admin"));
        second.routing.root_path = "/docs".to_string();

        let merged = first.merge(second);
        assert_eq!(merged.docs.info.title.as_deref(), Some("A"));
        assert_eq!(merged.docs.info.version.as_deref(), Some("9"));
        assert_eq!(merged.specs["admin"].info.title.as_deref(), Some("Admin"));
        assert_eq!(merged.specs["admin"].info.version.as_deref(), Some("1"));
        assert_eq!(merged.routing.root_path, "/docs");
    }
}
