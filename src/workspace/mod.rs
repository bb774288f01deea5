//! Project file access.
//!
//! The core only touches the project through the [`FileSystem`] capability:
//! glob-based listing and text reads. [`WorkspaceFs`] implements it over a
//! directory on disk.

mod examples;
mod scanner;
#[cfg(test)]
mod tests;

pub use examples::{
    read_manifest, ExampleCorpusScanner, ExampleTest, ExampleTestSet, Manifest,
    EXAMPLE_TEST_PATTERN, MANIFEST_FILES, MAX_EXAMPLE_TESTS,
};

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directories skipped when searching for files to attach.
pub const SEARCH_EXCLUDES: &[&str] = &["node_modules", "dist"];

/// Maximum number of results returned for an attach-file search.
pub const SEARCH_LIMIT: usize = 100;

/// File access capability used by the generation pipeline.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// List up to `limit` files matching `pattern`, skipping any path that
    /// passes through a directory named in `exclude`. Paths are relative to
    /// the project root.
    async fn list_files(
        &self,
        pattern: &str,
        exclude: &[&str],
        limit: usize,
    ) -> io::Result<Vec<PathBuf>>;

    /// Read a file as UTF-8 text. Paths are relative to the project root and
    /// may not escape it.
    async fn read_text(&self, path: &Path) -> io::Result<String>;
}

/// [`FileSystem`] over a project directory.
#[derive(Debug, Clone)]
pub struct WorkspaceFs {
    root_path: PathBuf,
}

impl WorkspaceFs {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        let root_path = root_path.into();
        let root_path = std::fs::canonicalize(&root_path).unwrap_or(root_path);
        Self { root_path }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Resolve a project-relative path, refusing anything outside the root.
    ///
    /// Absolute paths are rejected. Symlinks and `..` components are resolved
    /// before the containment check.
    pub async fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        if path.is_absolute() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} is absolute; paths must be relative to the workspace root",
                    path.display()
                ),
            ));
        }

        let resolved = tokio::fs::canonicalize(self.root_path.join(path)).await?;
        if !resolved.starts_with(&self.root_path) {
            warn!("Refusing to read {} outside the workspace", path.display());
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is outside the workspace root", path.display()),
            ));
        }
        Ok(resolved)
    }
}

#[async_trait]
impl FileSystem for WorkspaceFs {
    async fn list_files(
        &self,
        pattern: &str,
        exclude: &[&str],
        limit: usize,
    ) -> io::Result<Vec<PathBuf>> {
        let root_path = self.root_path.clone();
        let pattern = pattern.to_string();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();

        tokio::task::spawn_blocking(move || {
            scanner::find_files(&root_path, &pattern, &exclude, limit)
        })
        .await
        .map_err(io::Error::other)?
    }

    async fn read_text(&self, path: &Path) -> io::Result<String> {
        let full_path = self.resolve(path).await?;
        debug!("Reading {}", full_path.display());
        tokio::fs::read_to_string(&full_path).await
    }
}

/// Find files whose name starts with `query`, for the attach-file picker.
///
/// An empty query yields no results.
pub async fn search_files(fs: &dyn FileSystem, query: &str) -> io::Result<Vec<PathBuf>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let pattern = format!("**/{}*", query);
    fs.list_files(&pattern, SEARCH_EXCLUDES, SEARCH_LIMIT).await
}

/// Render a project-relative path with forward slashes.
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
