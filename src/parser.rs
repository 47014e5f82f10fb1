use crate::error::{Error, Result};
use crate::extensions::ExtensionMap;
use crate::model::ModelDefinition;
use crate::openapi_builder::{DocumentOptions, InfoOptions, OpenApiBuilder, OpenApiDocument};
use crate::route::Route;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Parser for route manifests handed over by the host framework.
///
/// A manifest describes the routes, models and document settings of one
/// API (or one part of it). Manifests are written as YAML or JSON; the
/// format follows the file extension.
///
/// # Example
///
/// ```no_run
/// use openapi_from_routes::parser::ManifestParser;
/// use std::path::Path;
///
/// let parsed = ManifestParser::parse_file(Path::new("api/routes.yaml")).unwrap();
/// println!("Parsed {} routes", parsed.manifest.routes.len());
/// ```
pub struct ManifestParser;

/// Serialization formats a manifest can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
}

impl ManifestFormat {
    /// Picks the format from the file extension (`.json`, `.yaml`, `.yml`)
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Some(ManifestFormat::Json),
            Some("yaml") | Some("yml") => Some(ManifestFormat::Yaml),
            _ => None,
        }
    }
}

/// Routes, models and document settings declared by one manifest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiManifest {
    pub info: Option<InfoOptions>,
    pub options: Option<DocumentOptions>,
    /// Root-level vendor extensions
    pub x: Option<ExtensionMap>,
    /// Models keyed by the schema name they are registered under
    pub models: IndexMap<String, ModelDefinition>,
    pub routes: Vec<Route>,
}

/// A successfully parsed manifest with the file it came from
#[derive(Debug)]
pub struct ParsedManifest {
    pub path: PathBuf,
    pub manifest: ApiManifest,
}

impl ManifestParser {
    /// Reads and parses a single manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not a known manifest format,
    /// the file cannot be read, or its content does not describe a manifest.
    pub fn parse_file(path: &Path) -> Result<ParsedManifest> {
        debug!("Parsing manifest: {}", path.display());

        let format = ManifestFormat::from_path(path).ok_or_else(|| Error::UnsupportedFormat(path.to_path_buf()))?;
        let content = fs::read_to_string(path)?;
        let manifest = Self::parse_str(&content, format, path)?;

        debug!(
            "Parsed manifest {}: {} routes, {} models",
            path.display(),
            manifest.routes.len(),
            manifest.models.len()
        );

        Ok(ParsedManifest {
            path: path.to_path_buf(),
            manifest,
        })
    }

    /// Parses manifest content; `origin` only labels errors
    pub fn parse_str(content: &str, format: ManifestFormat, origin: &Path) -> Result<ApiManifest> {
        let parsed = match format {
            ManifestFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ManifestFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| Error::ParseError {
            file: origin.to_path_buf(),
            message,
        })
    }

    /// Parses several manifests, continuing past the ones that fail.
    ///
    /// Failures are logged as warnings and returned in place, one result per
    /// input path.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedManifest>> {
        debug!("Parsing {} manifests", paths.len());

        let results: Vec<Result<ParsedManifest>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| warn!("Failed to parse {}: {}", path.display(), e))
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

impl ApiManifest {
    /// Combines manifests into one.
    ///
    /// Routes are appended in order and models are unioned with later
    /// declarations winning. Info, options and root extensions come from the
    /// first manifest that declares them.
    pub fn merge<I>(manifests: I) -> ApiManifest
    where
        I: IntoIterator<Item = ApiManifest>,
    {
        let mut merged = ApiManifest::default();

        for manifest in manifests {
            if merged.info.is_none() {
                merged.info = manifest.info;
            }
            if merged.options.is_none() {
                merged.options = manifest.options;
            }
            if merged.x.is_none() {
                merged.x = manifest.x;
            }
            for (name, model) in manifest.models {
                if merged.models.contains_key(&name) {
                    debug!("Model {} redeclared, later declaration wins", name);
                }
                merged.models.insert(name, model);
            }
            merged.routes.extend(manifest.routes);
        }

        merged
    }

    /// Builds the document: models are registered first, then every route
    /// in declaration order.
    pub fn build(self) -> OpenApiDocument {
        let mut builder = OpenApiBuilder::new()
            .with_info(self.info.unwrap_or_default())
            .with_options(self.options.unwrap_or_default())
            .with_root_extensions(self.x);

        for (name, model) in &self.models {
            builder.add_model(name, model);
        }
        for route in &self.routes {
            builder.add_route(route);
        }

        builder.build()
    }
}
