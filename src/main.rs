//! OpenAPI from routes - Command-line tool for generating OpenAPI documentation.
//!
//! This binary reads route manifests exported by a host web framework and
//! generates an OpenAPI 3.0 document, folding body parameters of write
//! operations into registered request schemas along the way.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-routes [OPTIONS] <MANIFEST_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation from a directory of manifests:
//! ```bash
//! openapi-from-routes ./api -o openapi.yaml
//! ```
//!
//! Generate JSON with versions substituted and a base path:
//! ```bash
//! openapi-from-routes ./api/routes.yaml -f json --add-version --base-path /api
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-routes ./api -v
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

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
