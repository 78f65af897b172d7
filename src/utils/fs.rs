//! Filesystem helpers for scrape output directories.

use std::io::ErrorKind;
use std::path::Path;

use log::{error, info, warn};

/// Returns the name of the first entry in `directory` starting with `prefix`.
///
/// Entries are compared in sorted order so the result does not depend on the
/// filesystem's listing order. Read errors are logged and yield `None`.
pub async fn find_file_name_by_prefix(directory: impl AsRef<Path>, prefix: &str) -> Option<String> {
    let directory = directory.as_ref();
    let mut entries = match tokio::fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(e) => {
            error!("Error reading directory {}: {}", directory.display(), e);
            return None;
        }
    };

    let mut names = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => names.push(entry.file_name().to_string_lossy().into_owned()),
            Ok(None) => break,
            Err(e) => {
                error!("Error reading directory {}: {}", directory.display(), e);
                return None;
            }
        }
    }

    names.sort();
    names.into_iter().find(|name| name.starts_with(prefix))
}

/// Deletes every file or directory matching the glob `pattern`.
///
/// Directories are removed recursively; paths that vanish in the meantime are
/// ignored. Failures are logged and skipped. Returns the number of paths
/// removed.
pub async fn clean_paths(pattern: &str) -> usize {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(e) => {
            error!("Error removing files: invalid pattern {}: {}", pattern, e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                continue;
            }
        };

        let result = if path.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };

        match result {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => error!("Error removing {}: {}", path.display(), e),
        }
    }

    info!("Cleaned {} ({} path(s) removed)", pattern, removed);
    removed
}
