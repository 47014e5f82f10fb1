use crate::parser::ManifestFormat;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// File scanner for collecting route manifests.
///
/// The `FileScanner` recursively walks a directory to find every manifest file
/// (`.json`, `.yaml`, `.yml`). It skips `target` and hidden directories
/// (those starting with `.`). A root that is itself a file is returned as is.
///
/// # Example
///
/// ```no_run
/// use openapi_from_routes::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./api"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} manifests", result.manifest_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Discovered manifest files, sorted by path
    pub manifest_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects manifest files.
    ///
    /// Entries that cannot be accessed are logged and recorded as warnings,
    /// but scanning continues. Results are sorted so merge order does not
    /// depend on the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path does not exist.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata = std::fs::metadata(&self.root_path)
            .with_context(|| format!("Failed to access path: {}", self.root_path.display()))?;

        if metadata.is_file() {
            debug!("Scanning single manifest: {}", self.root_path.display());
            return Ok(ScanResult {
                manifest_files: vec![self.root_path.clone()],
                warnings: Vec::new(),
            });
        }

        let mut manifest_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_target = file_name == "target";

                !is_hidden && !is_target
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && ManifestFormat::from_path(path).is_some() {
                        manifest_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        manifest_files.sort();
        debug!("Found {} manifest files under {}", manifest_files.len(), self.root_path.display());

        Ok(ScanResult {
            manifest_files,
            warnings,
        })
    }
}
