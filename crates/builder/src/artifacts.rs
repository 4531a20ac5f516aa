//! Lazy traversal of the build output directory.
//!
//! [`artifact_files`] yields one [`ArtifactFile`] per regular file under the
//! output root, sorted by file name at every level so runs are
//! reproducible. Directories are descended into but never yielded.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

/// A build output file ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Absolute (or root-relative) path on disk.
    pub path: PathBuf,
    /// Path below the output root with `/` separators, e.g. `static/app.js`.
    pub relative_path: String,
    /// MIME type inferred from the extension.
    pub content_type: String,
}

/// Walk `root` and yield every regular file beneath it.
///
/// Symlinks are not followed. An unreadable entry (including a missing
/// root) is yielded as an error.
pub fn artifact_files(root: &Path) -> impl Iterator<Item = Result<ArtifactFile, walkdir::Error>> {
    let root = root.to_path_buf();
    WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(Ok(describe(&root, entry.path()))),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
}

/// Content type for a file name, falling back to `application/octet-stream`.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn describe(root: &Path, path: &Path) -> ArtifactFile {
    let relative = path.strip_prefix(root).unwrap_or(path);
    ArtifactFile {
        path: path.to_path_buf(),
        relative_path: to_key_path(relative),
        content_type: content_type_for(path),
    }
}

/// Join normal path components with `/` regardless of platform.
fn to_key_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
