//! Swagger UI entry page.
//!
//! The page only references the Swagger UI bundle and stylesheet on a CDN; no assets are
//! served by the crate itself.

use crate::config::{SwaggerUiConfig, UiSort};
use serde_json::{json, Map, Value};

/// One selectable document in the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLink {
    pub name: String,
    pub url: String,
}

impl SpecLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Options object handed to `SwaggerUIBundle`.
///
/// A single document is passed as `url`; several are passed as `urls` with the first one as
/// `urls.primaryName`.
pub fn ui_options(config: &SwaggerUiConfig, specs: &[SpecLink]) -> Value {
    let mut options = Map::new();

    match specs {
        [single] => {
            options.insert("url".into(), json!(single.url));
        }
        [primary, ..] => {
            let urls: Vec<Value> = specs
                .iter()
                .map(|spec| json!({ "name": spec.name, "url": spec.url }))
                .collect();
            options.insert("urls".into(), Value::Array(urls));
            options.insert("urls.primaryName".into(), json!(primary.name));
        }
        [] => {}
    }

    options.insert("dom_id".into(), json!("#swagger-ui"));
    options.insert("deepLinking".into(), json!(true));
    options.insert("docExpansion".into(), json!(config.doc_expansion.as_str()));
    options.insert("displayOperationId".into(), json!(config.display_operation_id));
    options.insert("filter".into(), json!(config.show_tag_filter_input));
    options.insert("syntaxHighlight".into(), json!({ "activated": true, "theme": config.syntax_highlight }));
    options.insert("withCredentials".into(), json!(config.with_credentials));
    options.insert("persistAuthorization".into(), json!(config.persist_authorization));
    options.insert(
        "validatorUrl".into(),
        config.validator_url.as_ref().map_or(Value::Null, |url| json!(url)),
    );

    match config.sort {
        UiSort::Alpha => {
            options.insert("operationsSorter".into(), json!("alpha"));
            options.insert("tagsSorter".into(), json!("alpha"));
        }
        UiSort::Method => {
            options.insert("operationsSorter".into(), json!("method"));
        }
        UiSort::None => {}
    }

    Value::Object(options)
}

/// Renders the `index.html` of the UI for the given documents.
pub fn render_index(config: &SwaggerUiConfig, title: &str, specs: &[SpecLink]) -> String {
    let cdn = config.cdn_url.trim_end_matches('/');
    // `</script>` inside a string literal would end the script element
    let options = ui_options(config, specs).to_string().replace("</", "<\\/");

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <link rel="stylesheet" href="{cdn}/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="{cdn}/swagger-ui-bundle.js" crossorigin></script>
  <script src="{cdn}/swagger-ui-standalone-preset.js" crossorigin></script>
  <script>
    window.onload = () => {{
      const options = {options};
      options.presets = [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset];
      options.plugins = [SwaggerUIBundle.plugins.DownloadUrl];
      options.layout = "StandaloneLayout";
      window.ui = SwaggerUIBundle(options);
    }};
  </script>
</body>
</html>
"#,
        title = escape_html(title),
        cdn = escape_html(cdn),
        options = options,
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
