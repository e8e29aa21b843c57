use crate::error::{Error, Result};
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognised as route manifests
pub const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// File scanner for directories of route manifests.
///
/// The `FileScanner` recursively walks a directory and collects every YAML or JSON file. It
/// skips the `target` directory and hidden directories (those starting with `.`).
///
/// # Example
///
/// ```no_run
/// use openapi_from_routes::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./routes"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} manifests", result.manifest_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of a directory scan.
#[derive(Debug)]
pub struct ScanResult {
    /// Manifest files, sorted by path
    pub manifest_files: Vec<PathBuf>,
    /// Warning messages for entries that could not be accessed
    pub warnings: Vec<String>,
}

/// Whether `path` has one of the manifest extensions
pub fn is_manifest(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MANIFEST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all manifest files.
    ///
    /// Entries that cannot be accessed are logged and reported as warnings; scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "not a directory: {}",
                self.root_path.display()
            )));
        }

        let mut manifest_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path).into_iter().filter_entry(|e| {
            if e.path() == self.root_path {
                return true;
            }
            let file_name = e.file_name().to_string_lossy();
            !file_name.starts_with('.') && file_name != "target"
        }) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && is_manifest(path) {
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

        Ok(ScanResult {
            manifest_files,
            warnings,
        })
    }
}
