//! Tree scanner: lazy enumeration of regular files under a root, one filesystem only.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::CksumError;

/// Enumerate regular files under `root` as root-relative paths, in deterministic
/// file-name order, without crossing mount points.
///
/// Restartable: holds no cursor; every call re-walks the current on-disk state.
/// `skip` (the database location) is pruned when it falls under the root.
/// Enumeration errors are yielded as per-path values so the caller's policy
/// machinery treats them like any other file failure.
pub fn scan_tree(
    root: &Path,
    follow_links: bool,
    skip: Option<&Path>,
) -> impl Iterator<Item = Result<PathBuf, CksumError>> + Send + use<> {
    let base = root.to_path_buf();
    let skip = skip.map(Path::to_path_buf);
    WalkDir::new(&base)
        .follow_links(follow_links)
        .same_file_system(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| Some(e.path()) != skip.as_deref())
        .filter_map(move |r| match r {
            Ok(entry) if entry.file_type().is_file() => entry
                .path()
                .strip_prefix(&base)
                .ok()
                .map(|rel| Ok(rel.to_path_buf())),
            Ok(_) => None,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| base.clone());
                Some(Err(CksumError::UnreadableFile {
                    path,
                    source: err.into(),
                }))
            }
        })
}
