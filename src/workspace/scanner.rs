//! File enumeration for the project tree.
//!
//! Uses `ignore::WalkBuilder` so `.gitignore` rules are honoured, with an
//! additional set of directory names that are always skipped. The walk is
//! sorted by file name, making the discovery order deterministic.

use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

fn glob_error(err: ignore::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
}

/// Check if any component of `relative` is one of the excluded directory names.
pub fn is_excluded(relative: &Path, exclude: &HashSet<String>) -> bool {
    relative.components().any(|c| {
        if let Some(s) = c.as_os_str().to_str() {
            exclude.contains(s)
        } else {
            false
        }
    })
}

/// Compile a gitignore-style glob into a matcher rooted at `root_path`.
fn build_matcher(root_path: &Path, pattern: &str) -> io::Result<Override> {
    let mut builder = OverrideBuilder::new(root_path);
    builder.add(pattern).map_err(glob_error)?;
    builder.build().map_err(glob_error)
}

fn build_walker(root_path: &Path, exclude: HashSet<String>) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root_path);

    builder.standard_filters(true);
    builder.follow_links(false);
    builder.sort_by_file_name(|a, b| a.cmp(b));

    let root = root_path.to_path_buf();
    builder.filter_entry(move |entry| {
        let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
        !is_excluded(relative, &exclude)
    });

    builder
}

/// Walk `root_path` and collect up to `limit` files matching `pattern`.
///
/// Returned paths are relative to `root_path`.
pub fn find_files(
    root_path: &Path,
    pattern: &str,
    exclude: &[String],
    limit: usize,
) -> io::Result<Vec<PathBuf>> {
    let matcher = build_matcher(root_path, pattern)?;
    let exclude: HashSet<String> = exclude.iter().cloned().collect();
    let mut found = Vec::new();

    if limit == 0 {
        return Ok(found);
    }

    debug!("Searching {} for {}", root_path.display(), pattern);

    for entry in build_walker(root_path, exclude).build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error walking directory: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        if !matcher.matched(path, false).is_whitelist() {
            continue;
        }

        match path.strip_prefix(root_path) {
            Ok(relative) => found.push(relative.to_path_buf()),
            Err(_) => {
                warn!("Failed to get relative path for {}", path.display());
                continue;
            }
        }

        if found.len() >= limit {
            break;
        }
    }

    debug!("Found {} files matching {}", found.len(), pattern);

    Ok(found)
}
