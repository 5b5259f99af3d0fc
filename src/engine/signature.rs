//! Change-detection signatures: `"<mtime_ns>_<size>"`.

use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::CksumError;

/// Compose the stored signature string from raw metadata values.
/// Never contains a space, so the record line's single separator stays unambiguous.
/// i128 holds any `SystemTime` in nanoseconds, so garbage far-future mtimes
/// some filesystems surface stay exact instead of wrapping.
pub fn format_signature(mtime_ns: i128, size: u64) -> String {
    format!("{mtime_ns}_{size}")
}

/// Cheap modification signature for `path`: mtime in nanoseconds plus byte size.
/// One `stat`, no content read. A matching signature means "probably unchanged";
/// it is never a substitute for the digest check.
pub fn signature_of(path: &Path) -> Result<String, CksumError> {
    let meta = std::fs::metadata(path).map_err(|e| CksumError::unreadable(path, e))?;
    let mtime_ns = match meta.modified() {
        Ok(t) => match t.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_nanos() as i128,
            // pre-epoch mtimes encode as negative nanoseconds
            Err(e) => -(e.duration().as_nanos() as i128),
        },
        Err(_) => 0,
    };
    Ok(format_signature(mtime_ns, meta.len()))
}
