//! Example test discovery and manifest reading.
//!
//! Both feed the prompt as style hints only, so every failure here degrades to
//! "nothing found" and is logged rather than returned.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::FileSystem;

/// Glob for files following a `.test.` / `.spec.` naming convention.
pub const EXAMPLE_TEST_PATTERN: &str = "*.{test,spec}.*";

/// Directories never searched for example tests.
pub const EXAMPLE_EXCLUDES: &[&str] = &["node_modules"];

/// Maximum number of example tests included in a prompt.
pub const MAX_EXAMPLE_TESTS: usize = 2;

/// Size of the first candidate listing; doubled while candidates keep failing to read.
const INITIAL_EXAMPLE_CANDIDATES: usize = 16;

/// Dependency manifests consulted, in order, when no example tests exist.
pub const MANIFEST_FILES: &[&str] = &["package.json", "Cargo.toml", "pyproject.toml", "go.mod"];

/// An existing test file from the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleTest {
    pub path: PathBuf,
    pub content: String,
}

/// Up to [`MAX_EXAMPLE_TESTS`] example tests, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleTestSet {
    tests: Vec<ExampleTest>,
}

impl ExampleTestSet {
    pub fn new(mut tests: Vec<ExampleTest>) -> Self {
        tests.truncate(MAX_EXAMPLE_TESTS);
        Self { tests }
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExampleTest> {
        self.tests.iter()
    }
}

/// The project's dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub file_name: String,
    pub content: String,
}

/// Finds existing tests in the project to steer the model's style.
pub struct ExampleCorpusScanner<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> ExampleCorpusScanner<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Collect the first readable example tests, in lexicographic walk order.
    ///
    /// Unreadable candidates are skipped. When a listing runs out before two
    /// tests were read, a larger listing is requested until the walk is
    /// exhausted.
    pub async fn scan(&self) -> ExampleTestSet {
        let mut tests = Vec::new();
        let mut tried = 0usize;
        let mut limit = INITIAL_EXAMPLE_CANDIDATES;

        loop {
            let candidates = match self
                .fs
                .list_files(EXAMPLE_TEST_PATTERN, EXAMPLE_EXCLUDES, limit)
                .await
            {
                Ok(paths) => paths,
                Err(e) => {
                    warn!("Failed to search for example tests: {}", e);
                    break;
                }
            };
            let exhausted = candidates.len() < limit;

            for path in candidates.into_iter().skip(tried) {
                if tests.len() >= MAX_EXAMPLE_TESTS {
                    break;
                }
                tried += 1;

                match self.fs.read_text(&path).await {
                    Ok(content) => tests.push(ExampleTest { path, content }),
                    Err(e) => warn!("Skipping example test {}: {}", path.display(), e),
                }
            }

            if tests.len() >= MAX_EXAMPLE_TESTS || exhausted {
                break;
            }
            limit = limit.saturating_mul(2);
        }

        debug!("Found {} example tests after {} candidates", tests.len(), tried);
        ExampleTestSet::new(tests)
    }
}

/// Read the first non-empty manifest at the project root, if any.
pub async fn read_manifest(fs: &dyn FileSystem) -> Option<Manifest> {
    for file_name in MANIFEST_FILES {
        match fs.read_text(Path::new(file_name)).await {
            Ok(content) if !content.trim().is_empty() => {
                debug!("Using {} as manifest", file_name);
                return Some(Manifest {
                    file_name: file_name.to_string(),
                    content,
                });
            }
            Ok(_) => debug!("Manifest {} is empty", file_name),
            Err(e) => debug!("No manifest at {}: {}", file_name, e),
        }
    }

    None
}
