//! Document output.

use crate::error::Result;
use crate::openapi_model::OpenApiDocument;
use log::debug;
use std::fs;
use std::path::Path;

/// YAML rendering of a document
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Rendering '{}' as YAML", doc.info.title);
    Ok(serde_yaml::to_string(doc)?)
}

/// Pretty-printed JSON rendering of a document.
///
/// ```
/// use openapi_from_routes::config::PluginConfig;
/// use openapi_from_routes::openapi_builder::OpenApiBuilder;
/// use openapi_from_routes::serializer::serialize_json;
///
/// let config = PluginConfig::default();
/// let doc = OpenApiBuilder::new(&config).build_spec("api", &[]).unwrap();
/// assert!(serialize_json(&doc).unwrap().contains("\"openapi\": \"3.1.0\""));
/// ```
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Rendering '{}' as JSON", doc.info.title);
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Writes a rendered document, creating missing parent directories. An existing file is
/// replaced.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
