//! OpenAPI from routes - command-line tool for generating OpenAPI documents.
//!
//! Reads one route manifest or a directory of them and produces the OpenAPI 3.1 document of
//! one spec, or serves every spec together with a Swagger UI page.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-routes [OPTIONS] <MANIFEST_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! openapi-from-routes ./routes -o openapi.yaml
//! ```
//!
//! Generate the JSON document of the `admin` spec:
//! ```bash
//! openapi-from-routes ./routes -s admin -f json -o admin.json
//! ```
//!
//! Serve the documents and the Swagger UI:
//! ```bash
//! openapi-from-routes ./routes --serve 127.0.0.1:8080 -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_routes::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from routes starting...");

    let args = cli::validate_args(args)?;

    match args.serve {
        Some(addr) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::serve(&args, addr))?;
        }
        None => {
            cli::run(&args)?;
            info!("OpenAPI document generation completed successfully");
        }
    }

    Ok(())
}
