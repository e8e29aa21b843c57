use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;

/// OpenAPI from routes - Generate OpenAPI documents from route manifests
#[derive(Parser, Debug)]
#[command(name = "openapi-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Route manifest file, or a directory of manifests
    #[arg(value_name = "MANIFEST_PATH")]
    pub manifest_path: PathBuf,

    /// Configuration file applied on top of the manifests' own configuration
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Spec to generate (defaults to the default spec id)
    #[arg(short = 's', long = "spec", value_name = "SPEC_ID")]
    pub spec: Option<String>,

    /// Serve the documents and the Swagger UI on this address instead of writing output
    #[arg(long = "serve", value_name = "ADDR")]
    pub serve: Option<SocketAddr>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn validate_args(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        anyhow::bail!("Manifest path does not exist: {}", args.manifest_path.display());
    }
    if let Some(config) = &args.config_path {
        if !config.is_file() {
            anyhow::bail!("Config file does not exist: {}", config.display());
        }
    }
    if args.serve.is_some() && args.output_path.is_some() {
        anyhow::bail!("--serve and --output cannot be combined");
    }

    info!("Manifest path: {}", args.manifest_path.display());
    match (&args.serve, &args.output_path) {
        (Some(addr), _) => info!("Serving on: {}", addr),
        (None, Some(output)) => info!("Output file: {} ({:?})", output.display(), args.output_format),
        (None, None) => info!("Output: stdout ({:?})", args.output_format),
    }

    Ok(args)
}

/// Generate the selected document and write it to the output file or stdout
pub fn run(args: &CliArgs) -> Result<()> {
    use crate::collector::RouteCollector;
    use crate::openapi_builder::OpenApiBuilder;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};

    let (config, tree) = load_inputs(args)?;

    let routes = RouteCollector::new(&config).collect(&tree);
    info!("Collected {} routes", routes.len());
    if routes.is_empty() {
        warn!("No routes found in the manifests");
    }

    let spec_id = args.spec.clone().unwrap_or_else(|| config.default_spec_id.clone());
    let document = OpenApiBuilder::new(&config)
        .build_spec(&spec_id, &routes)
        .with_context(|| format!("Failed to build spec '{}'", spec_id))?;

    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        info!("Wrote spec '{}' to {}", spec_id, output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Summary:");
    info!("  - Spec: {}", spec_id);
    info!("  - Routes: {}", routes.len());
    info!("  - Paths: {}", document.paths.len());
    info!(
        "  - Schemas: {}",
        document.components.as_ref().map_or(0, |c| c.schemas.len())
    );

    Ok(())
}

/// Serve every document and the Swagger UI until the process is stopped
pub async fn serve(args: &CliArgs, addr: SocketAddr) -> Result<()> {
    let (config, tree) = load_inputs(args)?;
    let router = crate::routes::docs_router(&config, &tree).context("Failed to build documents")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Swagger UI available at http://{}{}", addr, config.routing.swagger_index());
    axum::serve(listener, router).await.context("Server error")?;
    Ok(())
}

/// Loads the manifests and applies the optional config file on top of their configuration
fn load_inputs(args: &CliArgs) -> Result<(crate::config::PluginConfig, crate::route_tree::RouteNode)> {
    use crate::manifest::{load, load_config};

    let loaded = load(&args.manifest_path)
        .with_context(|| format!("Failed to load manifests from {}", args.manifest_path.display()))?;
    info!("Loaded {} manifest files", loaded.files);

    let mut config = loaded.config;
    if let Some(path) = &args.config_path {
        let file_config = load_config(path).with_context(|| format!("Failed to load config {}", path.display()))?;
        config = config.merge(file_config);
    }
    Ok((config, loaded.tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
config:
  info:
    title: Pets
    version: 1.0.0
routes:
  - path: /pets
    method: get
    documentation:
      summary: List pets
"#;

    fn args(manifest: PathBuf) -> CliArgs {
        CliArgs {
            manifest_path: manifest,
            config_path: None,
            output_format: OutputFormat::Json,
            output_path: None,
            spec: None,
            serve: None,
            verbose: false,
        }
    }

    #[test]
    fn test_parse_args() {
        let args = CliArgs::parse_from([
            "openapi-from-routes",
            "routes/",
            "-c",
            "config.yaml",
            "-f",
            "json",
            "-s",
            "admin",
            "--serve",
            "127.0.0.1:8080",
        ]);
        assert_eq!(args.manifest_path, PathBuf::from("routes/"));
        assert_eq!(args.config_path, Some(PathBuf::from("config.yaml")));
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.spec.as_deref(), Some("admin"));
        assert_eq!(args.serve, Some("127.0.0.1:8080".parse().unwrap()));
    }

    #[test]
    fn test_default_format_is_yaml() {
        let args = CliArgs::parse_from(["openapi-from-routes", "routes.yaml"]);
        assert_eq!(args.output_format, OutputFormat::Yaml);
        assert!(args.output_path.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_validate_rejects_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_args(args(temp_dir.path().join("missing.yaml"))).is_err());
    }

    #[test]
    fn test_validate_rejects_serve_with_output() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("routes.yaml");
        fs::write(&manifest, MANIFEST).unwrap();

        let mut args = args(manifest);
        args.serve = Some("127.0.0.1:0".parse().unwrap());
        args.output_path = Some(temp_dir.path().join("out.json"));
        assert!(validate_args(args).is_err());
    }

    #[test]
    fn test_run_writes_output_file() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("routes.yaml");
        fs::write(&manifest, MANIFEST).unwrap();

        let mut args = args(manifest);
        args.output_path = Some(temp_dir.path().join("out").join("openapi.json"));
        run(&args).unwrap();

        let content = fs::read_to_string(temp_dir.path().join("out/openapi.json")).unwrap();
        let document: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(document["info"]["title"], "Pets");
        assert_eq!(document["paths"]["/pets"]["get"]["summary"], "List pets");
    }

    #[test]
    fn test_config_file_overrides_manifest_config() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("routes.yaml");
        fs::write(&manifest, MANIFEST).unwrap();
        let config = temp_dir.path().join("config.json");
        fs::write(&config, r#"{"info": {"title": "Pets (staging)"}}"#).unwrap();

        let mut args = args(manifest);
        args.config_path = Some(config);
        args.output_path = Some(temp_dir.path().join("openapi.json"));
        run(&args).unwrap();

        let content = fs::read_to_string(temp_dir.path().join("openapi.json")).unwrap();
        let document: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(document["info"]["title"], "Pets (staging)");
        assert_eq!(document["info"]["version"], "1.0.0");
    }

    #[test]
    fn test_run_unknown_spec_fails() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("routes.yaml");
        fs::write(&manifest, MANIFEST).unwrap();

        let mut args = args(manifest);
        args.spec = Some("nope".to_string());
        let err = run(&args).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
