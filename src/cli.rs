use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// OpenAPI from routes - Generate an OpenAPI document from route manifests
#[derive(Parser, Debug)]
#[command(name = "openapi-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Manifest file, or a directory scanned for manifests
    #[arg(value_name = "MANIFEST_PATH")]
    pub manifest_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Substitute route versions into `{version}` path segments
    #[arg(long = "add-version")]
    pub add_version: bool,

    /// Prefix every path with this base path
    #[arg(long = "base-path", value_name = "PATH")]
    pub base_path: Option<String>,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        anyhow::bail!(
            "Manifest path does not exist: {}",
            args.manifest_path.display()
        );
    }

    if let Some(base_path) = &args.base_path {
        if !base_path.starts_with('/') {
            anyhow::bail!("Base path must start with '/': {}", base_path);
        }
    }

    info!("Manifest path: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::parser::{ApiManifest, ManifestParser};
    use crate::scanner::FileScanner;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};

    info!("Starting OpenAPI document generation...");

    // Step 1: Collect manifest files
    info!("Scanning for manifests...");
    let scanner = FileScanner::new(args.manifest_path.clone());
    let scan_result = scanner.scan()?;

    info!("Found {} manifest files", scan_result.manifest_files.len());
    for warning in &scan_result.warnings {
        log::warn!("{}", warning);
    }

    if scan_result.manifest_files.is_empty() {
        anyhow::bail!("No manifest files found at {}", args.manifest_path.display());
    }

    // Step 2: Parse manifests
    info!("Parsing manifests...");
    let manifests: Vec<ApiManifest> = ManifestParser::parse_files(&scan_result.manifest_files)
        .into_iter()
        .filter_map(|result| match result {
            Ok(parsed) => Some(parsed.manifest),
            Err(e) => {
                debug!("Skipping manifest due to parse error: {}", e);
                None
            }
        })
        .collect();

    info!("Successfully parsed {} manifests", manifests.len());

    if manifests.is_empty() {
        anyhow::bail!("No manifests could be parsed successfully");
    }

    let parsed_count = manifests.len();
    let mut manifest = ApiManifest::merge(manifests);
    apply_overrides(&mut manifest, &args);

    let route_count = manifest.routes.len();
    let model_count = manifest.models.len();
    if route_count == 0 {
        log::warn!("No routes declared in the manifests");
    }

    // Step 3: Build OpenAPI document
    info!("Building OpenAPI document...");
    let document = manifest.build();
    info!("OpenAPI document built successfully");

    // Step 4: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    // Step 5: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Manifests found: {}", scan_result.manifest_files.len());
    info!("  - Manifests parsed: {}", parsed_count);
    info!("  - Routes: {}", route_count);
    info!("  - Models: {}", model_count);
    info!(
        "  - Schemas: {}",
        document
            .components
            .as_ref()
            .and_then(|c| c.schemas.as_ref())
            .map_or(0, |s| s.len())
    );

    Ok(())
}

/// Command-line flags take precedence over the manifest's `options`
fn apply_overrides(manifest: &mut crate::parser::ApiManifest, args: &CliArgs) {
    let options = manifest.options.get_or_insert_with(Default::default);

    if args.add_version {
        options.add_version = true;
    }
    if let Some(base_path) = &args.base_path {
        options.add_base_path = true;
        options.base_path = Some(base_path.clone());
    }

    debug!("Effective document options: {:?}", options);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ApiManifest;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["openapi-from-routes", "api.yaml"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_arguments() {
        let args = args(&[]);

        assert_eq!(args.manifest_path, PathBuf::from("api.yaml"));
        assert!(matches!(args.output_format, OutputFormat::Yaml));
        assert!(args.output_path.is_none());
        assert!(!args.add_version);
        assert!(args.base_path.is_none());
    }

    #[test]
    fn test_all_arguments() {
        let args = args(&["-f", "json", "-o", "out/openapi.json", "-v", "--add-version", "--base-path", "/api"]);

        assert!(matches!(args.output_format, OutputFormat::Json));
        assert_eq!(args.output_path, Some(PathBuf::from("out/openapi.json")));
        assert!(args.verbose);
        assert!(args.add_version);
        assert_eq!(args.base_path.as_deref(), Some("/api"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut manifest: ApiManifest =
            serde_yaml::from_str("options: { add_version: false, base_path: /old }").unwrap();

        apply_overrides(&mut manifest, &args(&["--add-version", "--base-path", "/api"]));

        let options = manifest.options.unwrap();
        assert!(options.add_version);
        assert!(options.add_base_path);
        assert_eq!(options.base_path.as_deref(), Some("/api"));
    }

    #[test]
    fn test_no_flags_keep_manifest_options() {
        let mut manifest: ApiManifest =
            serde_yaml::from_str("options: { add_base_path: true, base_path: /v }").unwrap();

        apply_overrides(&mut manifest, &args(&[]));

        let options = manifest.options.unwrap();
        assert!(!options.add_version);
        assert_eq!(options.base_path.as_deref(), Some("/v"));
    }

    #[test]
    fn test_missing_manifest_path_is_rejected() {
        let args = CliArgs::try_parse_from(["openapi-from-routes", "/nonexistent/api.yaml"]).unwrap();
        assert!(parse_args_from_parsed(args).is_err());
    }
}
