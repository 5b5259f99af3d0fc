//! In-place backend: records stored as extended attributes on the source files.
//!
//! No shadow tree exists; the signature and digest live in two `user.*`
//! attributes on each tracked file.

use std::path::{Path, PathBuf};

use super::{Backend, Field};
use crate::error::CksumError;
#[cfg(any(target_os = "linux", target_os = "macos"))]
use crate::utils::config::PackagePaths;

pub struct XattrBackend {
    root: PathBuf,
}

impl XattrBackend {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    fn attr_name(field: Field) -> &'static str {
        let paths = PackagePaths::get();
        match field {
            Field::Signature => paths.xattr_signature(),
            Field::Digest => paths.xattr_digest(),
        }
    }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
mod sys {
    use std::ffi::CString;
    use std::io;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    #[cfg(target_os = "linux")]
    const ENOATTR: i32 = libc::ENODATA;
    #[cfg(target_os = "macos")]
    const ENOATTR: i32 = libc::ENOATTR;

    #[cfg(target_os = "linux")]
    unsafe fn getxattr_raw(
        path: *const libc::c_char,
        name: *const libc::c_char,
        value: *mut libc::c_void,
        size: usize,
    ) -> isize {
        unsafe { libc::getxattr(path, name, value, size) }
    }

    #[cfg(target_os = "macos")]
    unsafe fn getxattr_raw(
        path: *const libc::c_char,
        name: *const libc::c_char,
        value: *mut libc::c_void,
        size: usize,
    ) -> isize {
        unsafe { libc::getxattr(path, name, value, size, 0, 0) }
    }

    #[cfg(target_os = "linux")]
    unsafe fn setxattr_raw(
        path: *const libc::c_char,
        name: *const libc::c_char,
        value: *const libc::c_void,
        size: usize,
    ) -> i32 {
        unsafe { libc::setxattr(path, name, value, size, 0) }
    }

    #[cfg(target_os = "macos")]
    unsafe fn setxattr_raw(
        path: *const libc::c_char,
        name: *const libc::c_char,
        value: *const libc::c_void,
        size: usize,
    ) -> i32 {
        unsafe { libc::setxattr(path, name, value, size, 0, 0) }
    }

    fn cstr_path(path: &Path) -> io::Result<CString> {
        CString::new(path.as_os_str().as_bytes())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))
    }

    fn cstr_name(name: &str) -> io::Result<CString> {
        CString::new(name)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "attribute name contains NUL"))
    }

    fn absent_or_err(err: io::Error) -> io::Result<Option<String>> {
        if err.raw_os_error() == Some(ENOATTR) {
            Ok(None)
        } else {
            Err(err)
        }
    }

    /// Read one attribute as UTF-8. `Ok(None)` when the attribute is absent.
    pub fn read_attr(path: &Path, name: &str) -> io::Result<Option<String>> {
        let cpath = cstr_path(path)?;
        let cname = cstr_name(name)?;
        let size = unsafe { getxattr_raw(cpath.as_ptr(), cname.as_ptr(), std::ptr::null_mut(), 0) };
        if size < 0 {
            return absent_or_err(io::Error::last_os_error());
        }
        let mut buf = vec![0u8; size as usize];
        let n = unsafe {
            getxattr_raw(
                cpath.as_ptr(),
                cname.as_ptr(),
                buf.as_mut_ptr().cast(),
                buf.len(),
            )
        };
        if n < 0 {
            return absent_or_err(io::Error::last_os_error());
        }
        buf.truncate(n as usize);
        String::from_utf8(buf)
            .map(Some)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "attribute is not valid UTF-8"))
    }

    pub fn write_attr(path: &Path, name: &str, value: &str) -> io::Result<()> {
        let cpath = cstr_path(path)?;
        let cname = cstr_name(name)?;
        let rc = unsafe {
            setxattr_raw(
                cpath.as_ptr(),
                cname.as_ptr(),
                value.as_bytes().as_ptr().cast(),
                value.len(),
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Probe whether the filesystem under `path` supports user extended
    /// attributes. `ENOTSUP` means no; an absent attribute means yes.
    pub fn supported(path: &Path, name: &str) -> io::Result<bool> {
        match read_attr(path, name) {
            Ok(_) => Ok(true),
            Err(e) if e.raw_os_error() == Some(libc::ENOTSUP) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
impl Backend for XattrBackend {
    fn initialize(&self, _sync_structure: bool) -> Result<(), CksumError> {
        let supported = sys::supported(&self.root, PackagePaths::get().xattr_signature())
            .map_err(|e| {
                CksumError::db_io(
                    format!("probe extended attributes on {}", self.root.display()),
                    e,
                )
            })?;
        if !supported {
            return Err(CksumError::Environment(format!(
                "{}: filesystem does not support user extended attributes",
                self.root.display()
            )));
        }
        Ok(())
    }

    fn get(&self, rel: &Path, field: Field) -> Result<Option<String>, CksumError> {
        let abs = self.root.join(rel);
        sys::read_attr(&abs, Self::attr_name(field))
            .map_err(|e| CksumError::db_io(format!("read attribute on {}", abs.display()), e))
    }

    /// Writes both attributes. A failure after the first write leaves the
    /// record half-updated; nothing rolls the first attribute back.
    fn set(&self, rel: &Path, signature: &str, digest: &str) -> Result<(), CksumError> {
        let abs = self.root.join(rel);
        let paths = PackagePaths::get();
        sys::write_attr(&abs, paths.xattr_signature(), signature)
            .and_then(|()| sys::write_attr(&abs, paths.xattr_digest(), digest))
            .map_err(|e| CksumError::db_io(format!("write attributes on {}", abs.display()), e))
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
impl Backend for XattrBackend {
    fn initialize(&self, _sync_structure: bool) -> Result<(), CksumError> {
        Err(CksumError::Environment(
            "extended attributes are not supported on this platform".into(),
        ))
    }

    fn get(&self, _rel: &Path, _field: Field) -> Result<Option<String>, CksumError> {
        Err(CksumError::Environment(
            "extended attributes are not supported on this platform".into(),
        ))
    }

    fn set(&self, _rel: &Path, _signature: &str, _digest: &str) -> Result<(), CksumError> {
        Err(CksumError::Environment(
            "extended attributes are not supported on this platform".into(),
        ))
    }
}
