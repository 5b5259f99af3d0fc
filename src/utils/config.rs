//! Application configuration constants.
//! Naming and tuning in one place.

use std::sync::OnceLock;

// ---- Package / naming (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    xattr_signature: String,
    xattr_digest: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                xattr_signature: format!("user.{pkg}.mtime_size"),
                xattr_digest: format!("user.{pkg}.cksum"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Tag in the database directory name next to the scanned root.
    pub fn db_tag(&self) -> &str {
        self.pkg_name
    }

    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Attribute holding the modification signature (in-place backend).
    pub fn xattr_signature(&self) -> &str {
        &self.xattr_signature
    }

    /// Attribute holding the content digest (in-place backend).
    pub fn xattr_digest(&self) -> &str {
        &self.xattr_digest
    }
}

// ---- Hashing ----

/// Digest I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which digesting uses memory-mapped I/O (bytes). 100 MB.
    pub const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for reading files below the mmap threshold (bytes). 1 MB.
    pub const READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- Scheduler ----

/// Worker pool tuning.
pub struct SchedulerConsts;

impl SchedulerConsts {
    /// Paths per worker batch when `--jobs` does not name one.
    pub const DEFAULT_BATCH_SIZE: usize = 8;
    /// Capacity of the outcome channel between workers and the aggregating thread.
    pub const OUTCOME_CHANNEL_CAP: usize = 1024;
}
