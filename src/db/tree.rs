//! Mirrored-tree backend: one record file per tracked path in a shadow directory.
//!
//! The shadow tree mirrors the source tree's structure; directories exist only
//! to preserve that structure, never to store data. Records live at the same
//! relative path as their source file, one line each, human-inspectable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{Backend, Field, join_record, split_record};
use crate::error::CksumError;

pub struct TreeBackend {
    shadow: PathBuf,
    root: PathBuf,
}

impl TreeBackend {
    pub fn new(shadow: &Path, root: &Path) -> Self {
        Self {
            shadow: shadow.to_path_buf(),
            root: root.to_path_buf(),
        }
    }

    fn record_path(&self, rel: &Path) -> PathBuf {
        self.shadow.join(rel)
    }

    /// Resynchronize shadow structure to current source existence: mirror the
    /// source directory hierarchy in, then prune every shadow entry whose
    /// source path no longer exists. Record files whose source still exists
    /// are not touched.
    fn sync_structure(&self) -> Result<(), CksumError> {
        let walker = WalkDir::new(&self.root)
            .same_file_system(true)
            .into_iter()
            .filter_entry(|e| e.path() != self.shadow);
        for entry in walker {
            let entry = entry.map_err(|e| {
                CksumError::db_io(
                    format!("walk {} for resync", self.root.display()),
                    e.into(),
                )
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let target = self.shadow.join(rel);
            if target.is_file() {
                // a stale record occupies the path where a directory now lives
                fs::remove_file(&target).map_err(|e| {
                    CksumError::db_io(format!("clear stale record {}", target.display()), e)
                })?;
            }
            fs::create_dir_all(&target).map_err(|e| {
                CksumError::db_io(format!("mirror directory {}", target.display()), e)
            })?;
        }

        let mut it = WalkDir::new(&self.shadow).into_iter();
        while let Some(entry) = it.next() {
            let entry = entry.map_err(|e| {
                CksumError::db_io(
                    format!("walk {} for pruning", self.shadow.display()),
                    e.into(),
                )
            })?;
            let Ok(rel) = entry.path().strip_prefix(&self.shadow) else {
                continue;
            };
            if rel.as_os_str().is_empty() {
                continue;
            }
            if self.root.join(rel).exists() {
                continue;
            }
            if entry.file_type().is_dir() {
                fs::remove_dir_all(entry.path()).map_err(|e| {
                    CksumError::db_io(format!("prune {}", entry.path().display()), e)
                })?;
                it.skip_current_dir();
            } else {
                fs::remove_file(entry.path()).map_err(|e| {
                    CksumError::db_io(format!("prune {}", entry.path().display()), e)
                })?;
            }
        }
        Ok(())
    }
}

impl Backend for TreeBackend {
    fn initialize(&self, sync_structure: bool) -> Result<(), CksumError> {
        if self.shadow.exists() && !self.shadow.is_dir() {
            return Err(CksumError::db(format!(
                "{}: exists and is not a directory",
                self.shadow.display()
            )));
        }
        fs::create_dir_all(&self.shadow)
            .map_err(|e| CksumError::db_io(format!("create {}", self.shadow.display()), e))?;
        if sync_structure {
            self.sync_structure()?;
        }
        Ok(())
    }

    fn get(&self, rel: &Path, field: Field) -> Result<Option<String>, CksumError> {
        let path = self.record_path(rel);
        let line = match fs::read_to_string(&path) {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CksumError::db_io(
                    format!("read record {}", path.display()),
                    e,
                ));
            }
        };
        let Some((signature, digest)) = split_record(&line) else {
            return Err(CksumError::db(format!(
                "{}: malformed record (no separator)",
                path.display()
            )));
        };
        Ok(Some(match field {
            Field::Signature => signature.to_string(),
            Field::Digest => digest.to_string(),
        }))
    }

    /// Whole-line replace. A missing parent directory surfaces as the
    /// underlying io error; parents are created by the structural resync,
    /// never here.
    fn set(&self, rel: &Path, signature: &str, digest: &str) -> Result<(), CksumError> {
        let path = self.record_path(rel);
        if path.is_dir() {
            // stale structural artifact occupying the record's path
            fs::remove_dir_all(&path).map_err(|e| {
                CksumError::db_io(format!("replace stale directory {}", path.display()), e)
            })?;
        }
        fs::write(&path, join_record(signature, digest))
            .map_err(|e| CksumError::db_io(format!("write record {}", path.display()), e))
    }
}
